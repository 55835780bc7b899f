#![no_main]

use libfuzzer_sys::fuzz_target;
use pgnkit::Position;

fuzz_target!(|data: &[u8]| {
    let mut lines = data.split(|&ch| ch == b'\n');
    let mut pos = match lines.next().map(String::from_utf8_lossy) {
        Some(fen) if !fen.is_empty() => match Position::from_fen(&fen) {
            Ok(pos) => pos,
            Err(_) => return,
        },
        _ => Position::default(),
    };

    for san in lines {
        let before = pos.clone();
        match pos.play_ascii(san) {
            Ok(fen) => assert_eq!(fen, pos.fen()),
            Err(_) => assert_eq!(pos, before),
        }
    }
});
