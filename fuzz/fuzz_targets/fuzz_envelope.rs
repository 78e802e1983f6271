use honggfuzz::fuzz;

// Arbitrary bytes fed to the envelope decoder must error, never panic.
fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let _ = amber::Archive::from_bytes(data);
        });
    }
}
