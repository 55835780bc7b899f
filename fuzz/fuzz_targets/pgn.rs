#![no_main]

use std::{fmt, io};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pgnkit::pgn::{self, ErrorPolicy, Parser};

/// Hands out at most `chunk` bytes per read.
struct Chunked<'a> {
    bytes: &'a [u8],
    chunk: usize,
}

impl io::Read for Chunked<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.bytes.len());
        buf[..n].copy_from_slice(&self.bytes[..n]);
        self.bytes = &self.bytes[n..];
        Ok(n)
    }
}

#[derive(Arbitrary)]
struct TestCase {
    pgn: Vec<u8>,
    chunk: u8,
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("pgn", &String::from_utf8_lossy(&self.pgn))
            .field("chunk", &self.chunk)
            .finish()
    }
}

fuzz_target!(|data: TestCase| {
    // Resync must terminate and account for every failure.
    let mut parser = Parser::new(&data.pgn).with_policy(ErrorPolicy::Resync);
    let games: Vec<_> = parser.by_ref().map(|game| game.expect("resync")).collect();
    for skipped in parser.skipped() {
        assert!(skipped.range.start <= skipped.error.offset);
        assert!(skipped.range.end <= data.pgn.len());
    }

    // Reading through a chunked reader changes nothing.
    let from_slice = pgn::parse(&data.pgn);
    let from_reader = pgn::read_games(Chunked {
        bytes: &data.pgn,
        chunk: usize::from(data.chunk).max(1),
    });
    match (&from_slice, &from_reader) {
        (Ok(left), Ok(right)) => assert_eq!(left, right),
        (Err(left), Err(pgn::Error::Syntax(right))) => assert_eq!(left, right),
        _ => panic!("slice and reader disagree"),
    }

    // Written games read back with the same mainline.
    if let Ok(parsed) = from_slice {
        assert_eq!(parsed, games);
        for game in parsed {
            let written = game.to_string();
            let reparsed = pgn::parse(written.as_bytes()).expect("written pgn parses");
            assert_eq!(reparsed.len(), 1, "{written}");
            let texts = |game: &pgn::Game<'_>| -> Vec<String> {
                game.mainline().map(|mv| mv.text_lossy().into_owned()).collect()
            };
            assert_eq!(texts(&reparsed[0]), texts(&game), "{written}");
        }
    }
});
