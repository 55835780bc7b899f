#![no_main]

use libfuzzer_sys::fuzz_target;
use pgnkit::san::San;

fuzz_target!(|data: &[u8]| {
    let Ok(san) = San::from_ascii(data) else {
        return;
    };
    let roundtripped = San::from_ascii(san.to_string().as_bytes()).expect("roundtrip");
    assert_eq!(san, roundtripped);
});
