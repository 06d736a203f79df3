#![no_main]

use glossa::Manifest;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Arbitrary documents may be rejected but must never panic.
    let _ = Manifest::parse(text);
});
