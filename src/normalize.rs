use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

/// Extensions treated as text: source, docs, config, contract artifacts.
/// Everything else takes the binary path.
const TEXT_EXTENSIONS: &[&str] = &[
    "rs", "c", "h", "cpp", "hpp", "cc", "cs", "java", "kt", "swift", "go", "py", "rb", "php",
    "js", "jsx", "ts", "tsx", "mjs", "cjs", "sol", "vy", "abi", "json", "yaml", "yml", "toml",
    "xml", "html", "htm", "css", "scss", "md", "markdown", "txt", "csv", "tsv", "ini", "cfg",
    "conf", "sql", "sh", "bash", "bat", "ps1", "proto", "graphql", "svg", "lock",
];

/// Keyword shapes that mark text as source code rather than prose/config.
const SOURCE_HINT_PATTERNS: &[&str] = &[
    r"(?m)^\s*import\b",
    r"(?m)^\s*export\b",
    r"(?m)^\s*from\s+\S+\s+import\b",
    r"\bfunction\s+\w+",
    r"\bclass\s+\w+",
    r"\bcontract\s+\w+",
    r"\bfn\s+\w+\s*\(",
    r"(?m)^\s*def\s+\w+\s*\(",
    r"\brequire\s*\(",
];

lazy_static! {
    static ref SOURCE_HINTS: Vec<Regex> = SOURCE_HINT_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect();
}

/// Lowercased extension of a path, if any.
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

pub fn is_text_extension(ext: &str) -> bool {
    let ext = ext.to_ascii_lowercase();
    TEXT_EXTENSIONS.contains(&ext.as_str())
}

pub fn is_text_path(path: &Path) -> bool {
    file_extension(path).is_some_and(|e| is_text_extension(&e))
}

pub fn looks_like_source(text: &str) -> bool {
    SOURCE_HINTS.iter().any(|re| re.is_match(text))
}

/// Lossy text normalization: unify line endings, strip trailing whitespace,
/// collapse runs of 3+ blank lines to one; for source-like text additionally
/// strip comments and all blank lines. Idempotent.
pub fn normalize_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let cleaned = collapse_blank_runs(&unified);
    if looks_like_source(&cleaned) {
        strip_source_decorations(&cleaned)
    } else {
        cleaned
    }
}

/// Trailing-whitespace strip plus 3+ blank-line collapse. Runs of one or
/// two blank lines are left alone. Trailing blank lines are dropped.
fn collapse_blank_runs(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut blanks = 0usize;
    for line in text.split('\n') {
        let line = line.trim_end();
        if line.is_empty() {
            blanks += 1;
            continue;
        }
        let keep = if blanks >= 3 { 1 } else { blanks };
        for _ in 0..keep {
            kept.push("");
        }
        blanks = 0;
        kept.push(line);
    }
    kept.join("\n")
}

/// Remove `//` line comments and `/* */` block comments (string-literal
/// aware), then drop blank lines. Newlines inside block comments are kept
/// so surrounding lines do not merge.
fn strip_source_decorations(text: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str(char),
        StrEscape(char),
    }

    let mut stripped = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                '"' | '\'' | '`' => {
                    state = State::Str(c);
                    stripped.push(c);
                }
                _ => stripped.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    stripped.push('\n');
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if c == '\n' {
                    stripped.push('\n');
                } else if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                }
            }
            State::Str(q) => {
                stripped.push(c);
                if c == '\\' {
                    state = State::StrEscape(q);
                } else if c == q || c == '\n' {
                    state = State::Code;
                }
            }
            State::StrEscape(q) => {
                stripped.push(c);
                state = State::Str(q);
            }
        }
    }

    let kept: Vec<&str> = stripped
        .split('\n')
        .map(|l| l.trim_end())
        .filter(|l| !l.is_empty())
        .collect();
    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_text_extensions() {
        assert!(is_text_path(Path::new("contracts/Token.sol")));
        assert!(is_text_path(Path::new("out/Token.abi")));
        assert!(is_text_path(Path::new("README.MD")));
        assert!(!is_text_path(Path::new("build/app.wasm")));
        assert!(!is_text_path(Path::new("no_extension")));
    }

    #[test]
    fn unifies_line_endings_and_trailing_whitespace() {
        let input = "alpha  \r\nbeta\t\rgamma\n";
        assert_eq!(normalize_text(input), "alpha\nbeta\ngamma");
    }

    #[test]
    fn collapses_long_blank_runs_only() {
        // Runs of one or two blank lines stay; three or more become one.
        let input = "one\n\n\ntwo\n\n\n\n\nthree\n\nfour";
        assert_eq!(normalize_text(input), "one\n\n\ntwo\n\nthree\n\nfour");
        assert_eq!(normalize_text("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_text("a\n\n\nb"), "a\n\n\nb");
    }

    #[test]
    fn strips_comments_from_source_like_text() {
        let input = "import x from 'y';\n// gone\nfunction f() { /* gone\ntoo */ return 1; }\n";
        let out = normalize_text(input);
        assert_eq!(out, "import x from 'y';\nfunction f() {\n return 1; }");
    }

    #[test]
    fn comment_markers_inside_strings_survive() {
        let input = "import a from 'b';\nlet url = \"https://example.com\"; // real comment\n";
        let out = normalize_text(input);
        assert_eq!(out, "import a from 'b';\nlet url = \"https://example.com\";");
    }

    #[test]
    fn prose_keeps_its_slashes() {
        let input = "notes // not source\nmore / text\n";
        assert_eq!(normalize_text(input), "notes // not source\nmore / text");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "import x;\n\n\n\n// c\nfunction f() {}\n",
            "plain\r\ntext  \r\n\r\n\r\n\r\nend",
            "",
            "let s = `tpl // keep`;\nexport default s;\n",
        ];
        for s in samples {
            let once = normalize_text(s);
            assert_eq!(normalize_text(&once), once, "not idempotent for {s:?}");
        }
    }
}
