use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::codec;

/// Groups need this many members before a dictionary is derived.
pub const DICTIONARY_GROUP_MIN: usize = 3;

/// A dictionary keeps the most frequent patterns, at most this many.
pub const DICTIONARY_MAX_PATTERNS: usize = 50;

/// Group members above this size are not buffered. Oversized text files
/// still compress normally, they just never contribute to a dictionary.
const GROUP_MEMBER_CAP: usize = 1 << 20;

/// Import/require statement lines and function-signature-like lines are
/// what similar source files share most.
const IMPORT_PATTERN: &str =
    r"(?m)^[ \t]*(?:import|from|export|use|using|require|include|#include|pragma)\b[^\n]*";
const FUNCTION_PATTERN: &str = r"(?m)^[ \t]*(?:(?:pub|public|private|internal|external|static|async|unsafe|override|virtual)[ \t]+)*(?:function|fn|def|func)[ \t]+\w+[^\n]*";

lazy_static! {
    static ref PATTERN_SCANNERS: Vec<Regex> = [IMPORT_PATTERN, FUNCTION_PATTERN]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect();
}

/// Per-extension grouping buffer, scoped to one build. Members are kept in
/// encounter order.
#[derive(Default)]
pub struct ExtensionGroups {
    groups: HashMap<String, Vec<String>>,
}

impl ExtensionGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a group member. Oversized texts are silently skipped so the
    /// buffer stays bounded on big trees.
    pub fn push(&mut self, ext: &str, text: &str) {
        if text.len() > GROUP_MEMBER_CAP {
            return;
        }
        self.groups
            .entry(ext.to_string())
            .or_default()
            .push(text.to_string());
    }

    pub fn member_count(&self, ext: &str) -> usize {
        self.groups.get(ext).map_or(0, |g| g.len())
    }

    /// Dictionary bytes for this extension, once the group is big enough
    /// and the members actually share patterns.
    pub fn dictionary_for(&self, ext: &str) -> Option<Vec<u8>> {
        let members = self.groups.get(ext)?;
        if members.len() < DICTIONARY_GROUP_MIN {
            return None;
        }
        let patterns = derive_patterns(members);
        if patterns.is_empty() {
            return None;
        }
        Some(patterns.join("\n").into_bytes())
    }
}

/// Scan member texts for import statements and function signatures, count
/// exact-match frequency, keep the top patterns. Ties break lexicographically
/// so the derived dictionary is deterministic.
pub fn derive_patterns(members: &[String]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for text in members {
        for re in PATTERN_SCANNERS.iter() {
            for m in re.find_iter(text) {
                let pattern = m.as_str().trim_end();
                if pattern.is_empty() {
                    continue;
                }
                *counts.entry(pattern).or_insert(0) += 1;
            }
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(DICTIONARY_MAX_PATTERNS)
        .map(|(p, _)| p.to_string())
        .collect()
}

/// Best-effort dictionary compression attempt: compress
/// `dictionary + "\n" + content`. The caller keeps the result only if it
/// beats the plain compression; any failure here means "no benefit".
pub fn try_dictionary(dictionary: &[u8], content: &[u8], level: u32) -> Option<Vec<u8>> {
    let mut combined = Vec::with_capacity(dictionary.len() + 1 + content.len());
    combined.extend_from_slice(dictionary);
    combined.push(b'\n');
    combined.extend_from_slice(content);
    codec::compress_bytes(&combined, level).ok()
}
