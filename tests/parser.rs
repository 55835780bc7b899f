use std::io::{self, Read};

use pgnkit::{
    filter::{GameFilter, MoveCount, TagFilter},
    pgn::{self, ErrorPolicy, GameResult, Lexer, Nag, Parser, SyntaxErrorKind, TokenKind},
};

const OPERA: &[u8] = b"[Event \"Paris\"]
[Site \"Paris FRA\"]
[Date \"1858.??.??\"]
[White \"Paul Morphy\"]
[Black \"Duke Karl / Count Isouard\"]
[Result \"1-0\"]

1. e4 e5 2. Nf3 d6 3. d4 Bg4 {This is a weak move already.} 4. dxe5 Bxf3
5. Qxf3 dxe5 6. Bc4 Nf6 7. Qb3 Qe7 8. Nc3 c6 9. Bg5 {Black is in what's
like a zugzwang position here.} b5 10. Nxb5! cxb5 11. Bxb5+ Nbd7 12. O-O-O
Rd8 13. Rxd7 Rxd7 14. Rd1 Qe6 15. Bxd7+ Nxd7 (15... Qxd7 16. Qb8+ Qd8 17.
Rxd8#) 16. Qb8+ $1 Nxb8 17. Rd8# 1-0

[Event \"Casual\"]
[White \"A\"]
[Black \"B\"]
[FEN \"4k3/8/8/8/8/8/4P3/4K3 w - - 0 1\"]

{White to play} 1. e4 Kd7 ; heading for the pawn
2. Kf2 $10 *
";

/// Hands out at most `chunk` bytes per read.
struct Chunked<'a> {
    bytes: &'a [u8],
    chunk: usize,
}

impl Read for Chunked<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.bytes.len());
        buf[..n].copy_from_slice(&self.bytes[..n]);
        self.bytes = &self.bytes[n..];
        Ok(n)
    }
}

struct Broken;

impl Read for Broken {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated archive"))
    }
}

#[test]
fn test_opera_game() {
    let games = pgn::parse(OPERA).expect("valid pgn");
    assert_eq!(games.len(), 2);

    let opera = &games[0];
    assert_eq!(opera.tags().len(), 6);
    assert_eq!(
        opera.tag("Black").map(|tag| tag.value_utf8_lossy().into_owned()),
        Some("Duke Karl / Count Isouard".to_owned())
    );
    assert_eq!(opera.moves().len(), 17);
    assert_eq!(opera.mainline().count(), 33);
    assert_eq!(opera.result(), GameResult::White);

    let bg4 = opera.moves()[2].black().expect("black move");
    assert_eq!(bg4.comment(), "This is a weak move already.");

    let nxb5 = opera.moves()[9].white().expect("white move");
    assert_eq!(nxb5.text(), b"Nxb5");
    assert_eq!(nxb5.nags(), &[Nag::GOOD_MOVE]);

    let nxd7 = opera.moves()[14].black().expect("black move");
    let variation = &nxd7.variations()[0];
    assert_eq!(variation.len(), 3);
    assert_eq!(variation[0].number(), 15);
    assert_eq!(variation[0].black().map(|mv| mv.text()), Some(&b"Qxd7"[..]));
    assert_eq!(variation[2].white().map(|mv| mv.text()), Some(&b"Rxd8#"[..]));

    let fens = opera.replay().expect("playable");
    assert_eq!(
        fens.last().map(String::as_str),
        Some("1n1Rkb1r/p4ppp/4q3/4p1B1/4P3/8/PPP2PPP/2K5 b k - 1 17")
    );
}

#[test]
fn test_game_comment_and_fen_tag() {
    let games = pgn::parse(OPERA).expect("valid pgn");
    let casual = &games[1];
    assert_eq!(casual.comment(), "White to play");
    assert_eq!(
        casual.moves()[0].black().map(|mv| mv.comment()),
        Some("heading for the pawn")
    );
    assert_eq!(
        casual.moves()[1].white().map(|mv| mv.nags().to_vec()),
        Some(vec![Nag(10)])
    );
    assert_eq!(
        casual.replay().expect("playable"),
        [
            "4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1",
            "8/3k4/8/8/4P3/8/8/4K3 w - - 1 2",
            "8/3k4/8/8/4P3/8/5K2/8 b - - 2 2",
        ]
    );
}

#[test]
fn test_slice_and_chunked_reader_agree() {
    let from_slice = pgn::parse(OPERA).expect("valid pgn");

    for chunk in [1, 7, 64, 4096] {
        let from_reader = pgn::read_games(Chunked {
            bytes: OPERA,
            chunk,
        })
        .expect("valid pgn");
        assert_eq!(from_reader, from_slice, "chunk size {chunk}");

        let mut buffered = Vec::new();
        Chunked {
            bytes: OPERA,
            chunk,
        }
        .read_to_end(&mut buffered)
        .expect("read");
        let tokens = |bytes: &[u8]| -> Vec<_> {
            Lexer::new(bytes)
                .map(|token| token.map(|token| (token.kind, token.bytes.to_vec())))
                .collect::<Result<_, _>>()
                .expect("valid tokens")
        };
        assert_eq!(tokens(&buffered), tokens(OPERA), "chunk size {chunk}");
    }
}

#[test]
fn test_io_error() {
    assert!(matches!(pgn::read_games(Broken), Err(pgn::Error::Io(_))));
    assert!(matches!(
        pgn::read_games(&b"1. e4 (e5"[..]),
        Err(pgn::Error::Syntax(_))
    ));
}

#[test]
fn test_display_reparses() {
    let games = pgn::parse(OPERA).expect("valid pgn");
    for game in &games {
        let written = game.to_string();
        let reparsed = pgn::parse(written.as_bytes()).expect("written pgn parses");
        assert_eq!(reparsed.len(), 1);
        assert_eq!(&reparsed[0], game, "{written}");
    }
}

#[test]
fn test_error_reports_location() {
    let pgn = b"[Event \"x\"]\n\n1. e4 e5\n2. Nf3 ((Nc6) *\n";
    let err = pgn::parse(pgn).expect_err("orphan variation");
    assert_eq!(err.kind, SyntaxErrorKind::OrphanVariation);
    assert_eq!((err.line, err.column), (4, 9));
    assert_eq!(err.text, "2. Nf3 ((Nc6) *");

    let err = pgn::parse(b"[Event \"x\"]\n1. e4 {unclosed\n").expect_err("truncated");
    assert_eq!(err.kind, SyntaxErrorKind::UnterminatedComment);
    assert_eq!((err.line, err.column), (2, 8));

    let err = pgn::parse(b"1. e4 (1... e5").expect_err("truncated");
    assert_eq!(
        err.kind,
        SyntaxErrorKind::EndOfInput {
            expected: TokenKind::VariationEnd
        }
    );
}

#[test]
fn test_resync_skips_malformed_games() {
    let mut pgn = Vec::new();
    pgn.extend_from_slice(b"[Event \"broken\"]\n1. e4 ) e5 1-0\n\n");
    pgn.extend_from_slice(OPERA);
    pgn.extend_from_slice(b"\n[Event \"also broken\"]\n[Site \"x]\n");

    let mut fail_fast = Parser::new(&pgn);
    assert!(matches!(fail_fast.next(), Some(Err(_))));
    assert!(fail_fast.next().is_none());

    let mut parser = Parser::new(&pgn).with_policy(ErrorPolicy::Resync);
    let games: Vec<_> = parser
        .by_ref()
        .collect::<Result<_, _>>()
        .expect("errors are skipped");
    assert_eq!(games.len(), 2);
    assert_eq!(games[1].comment(), "White to play");

    let skipped = parser.skipped();
    assert_eq!(skipped.len(), 2);
    assert_eq!(skipped[0].range.start, 0);
    assert_eq!(skipped[0].error.line, 2);
    assert_eq!(skipped[1].error.kind, SyntaxErrorKind::UnterminatedString);
    assert_eq!(skipped[1].range.end, pgn.len());
}

#[test]
fn test_result_from_tag() {
    let games = pgn::parse(b"[Result \"1/2-1/2\"]\n1. e4 e5 *\n[Result \"0-1\"]\n1. d4\n")
        .expect("valid pgn");
    assert_eq!(games[0].result(), GameResult::Draw);
    assert_eq!(games[1].result(), GameResult::Black);
}

#[test]
fn test_filters() {
    let games = pgn::parse(OPERA).expect("valid pgn");
    let count = |filter: &dyn GameFilter| games.iter().filter(|game| filter.accept(game)).count();

    assert_eq!(count(&MoveCount::Exactly(17)), 1);
    assert_eq!(count(&MoveCount::Exactly(2)), 1);
    assert_eq!(count(&MoveCount::LessThan(17)), 1);
    assert_eq!(count(&MoveCount::AtMost(17)), 2);
    assert_eq!(count(&MoveCount::GreaterThan(2)), 1);
    assert_eq!(count(&MoveCount::AtLeast(2)), 2);
    assert_eq!(count(&TagFilter::new("White", "Paul Morphy")), 1);
    assert_eq!(count(&[MoveCount::AtLeast(2), MoveCount::AtMost(2)]), 1);
}
