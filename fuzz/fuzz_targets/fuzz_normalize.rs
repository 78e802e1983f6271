use honggfuzz::fuzz;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let text = String::from_utf8_lossy(data);
            let once = amber::normalize::normalize_text(&text);
            let twice = amber::normalize::normalize_text(&once);
            assert_eq!(once, twice);
        });
    }
}
