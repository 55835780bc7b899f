// This file is part of the pgnkit library.
// Copyright (C) 2026 pgnkit contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! Recursive descent from tokens to games.
//!
//! ```text
//! game            := tagPairSection movetextSection termination
//! tagPairSection  := { '[' SYMBOL STRING ']' }
//! movetextSection := { moveNumber '.'+ move [move] }
//! move            := MOVE { comment | NAG | variation }
//! variation       := '(' movetextSection ')'
//! termination     := '1-0' | '0-1' | '1/2-1/2' | '*'
//! ```

use std::{borrow::Cow, io, io::Read, mem, ops::Range};

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::pgn::{
    game::{Game, GameResult},
    lexer::{LexError, Lexer, Location, TokenKind},
    movetext::{append_comment, Move, MoveError, MoveText},
    nag::Nag,
    tag::TagPair,
};

/// What went wrong in a [`SyntaxError`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SyntaxErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
    },
    #[error("unexpected end of input, expected {expected}")]
    EndOfInput { expected: TokenKind },
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("invalid annotation glyph")]
    InvalidNag,
    #[error("{0}")]
    InvalidMove(MoveError),
    #[error("variation does not follow a move")]
    OrphanVariation,
}

/// A syntax error with its location in the input.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{kind} at line {line}, column {column}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub line: usize,
    pub column: usize,
    /// Byte offset in the input.
    pub offset: usize,
    /// The line containing the error.
    pub text: String,
}

/// Error when reading games from an [`io::Read`].
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// How the [`Parser`] deals with a malformed game.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ErrorPolicy {
    /// Yield the error and stop.
    #[default]
    FailFast,
    /// Log and record the error, then continue with the next game.
    Resync,
}

/// A malformed game that was skipped under [`ErrorPolicy::Resync`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Skipped {
    /// Bytes that were discarded.
    pub range: Range<usize>,
    pub error: SyntaxError,
}

/// Error kind and offset, before the location is worked out.
#[derive(Debug)]
struct Failure {
    kind: SyntaxErrorKind,
    offset: usize,
}

impl Failure {
    fn new(kind: SyntaxErrorKind, offset: usize) -> Failure {
        Failure { kind, offset }
    }
}

impl From<LexError> for Failure {
    fn from(err: LexError) -> Failure {
        let kind = match err {
            LexError::UnexpectedToken {
                expected, found, ..
            } => SyntaxErrorKind::UnexpectedToken { expected, found },
            LexError::EndOfInput { expected, .. } => SyntaxErrorKind::EndOfInput { expected },
            LexError::UnterminatedString { .. } => SyntaxErrorKind::UnterminatedString,
            LexError::UnterminatedComment { .. } => SyntaxErrorKind::UnterminatedComment,
            LexError::InvalidNag { .. } => SyntaxErrorKind::InvalidNag,
        };
        Failure::new(kind, err.offset())
    }
}

/// Reads games one by one.
///
/// Variations are read recursively, one stack frame per nesting level, and
/// their depth is not limited. Input with tens of thousands of nested `(`
/// can overflow the stack of the calling thread. Parse untrusted input on a
/// thread with a larger stack if that matters.
///
/// # Examples
///
/// ```
/// use pgnkit::pgn::{GameResult, Parser};
///
/// let pgn = b"[White \"Morphy\"]\n\n1. e4 e5 (1... c5) 2. Nf3 1-0\n";
///
/// let mut games = Parser::new(pgn);
/// let game = games.next().expect("one game")?;
/// assert_eq!(game.result(), GameResult::White);
/// assert_eq!(game.moves().len(), 2);
/// assert!(games.next().is_none());
/// # Ok::<_, pgnkit::pgn::SyntaxError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    policy: ErrorPolicy,
    skipped: Vec<Skipped>,
    done: bool,
}

impl<'a> Parser<'a> {
    pub fn new(bytes: &'a [u8]) -> Parser<'a> {
        Parser {
            lexer: Lexer::new(bytes),
            policy: ErrorPolicy::default(),
            skipped: Vec::new(),
            done: false,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Parser<'a> {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Games skipped so far under [`ErrorPolicy::Resync`].
    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    fn syntax_error(&self, failure: Failure) -> SyntaxError {
        let input = self.lexer.input();
        let Location { line, column } = Location::of(input, failure.offset);
        SyntaxError {
            kind: failure.kind,
            line,
            column,
            offset: failure.offset,
            text: String::from_utf8_lossy(Location::line_text(input, failure.offset))
                .into_owned(),
        }
    }

    fn read_game(&mut self) -> Result<Game<'a>, Failure> {
        let tags = self.read_tags()?;
        let (moves, comment) = self.read_line(0, 0)?;

        let termination = if self.lexer.peek() == TokenKind::Termination {
            GameResult::from_ascii(self.lexer.next(TokenKind::Termination)?.bytes)
        } else {
            None
        };
        let result = termination
            .filter(|&result| result != GameResult::Unknown)
            .or_else(|| {
                tags.iter()
                    .find(|tag| tag.is("Result"))
                    .and_then(|tag| GameResult::from_ascii(tag.value()))
            })
            .unwrap_or_default();

        Ok(Game::new(tags, moves, result).with_comment(comment))
    }

    fn read_tags(&mut self) -> Result<Vec<TagPair<'a>>, Failure> {
        let mut tags = Vec::new();
        while self.lexer.peek() == TokenKind::TagPairBegin {
            self.lexer.next(TokenKind::TagPairBegin)?;
            let name = self.lexer.next(TokenKind::Symbol)?;
            let value = self.lexer.next(TokenKind::String)?;
            self.lexer.next(TokenKind::TagPairEnd)?;
            tags.push(TagPair::from_raw(name.bytes, value.bytes));
        }
        Ok(tags)
    }

    fn read_comment(&mut self) -> Result<Cow<'a, str>, Failure> {
        let text = if self.lexer.peek() == TokenKind::RolComment {
            self.lexer.next(TokenKind::RolComment)?.bytes
        } else {
            self.lexer.next(TokenKind::CommentBegin)?;
            let body = self.lexer.comment_body()?;
            self.lexer.next(TokenKind::CommentEnd)?;
            body
        };
        Ok(String::from_utf8_lossy(text.trim_ascii()))
    }

    /// Reads a movetext section starting at `ply` (0 is white's first
    /// move). Also returns comments that came before the first move.
    fn read_line(
        &mut self,
        mut ply: u32,
        depth: usize,
    ) -> Result<(Vec<MoveText<'a>>, Cow<'a, str>), Failure> {
        let mut plies: Vec<(u32, Move<'a>)> = Vec::new();
        let mut leading = Cow::Borrowed("");

        loop {
            let kind = self.lexer.peek();
            let offset = self.lexer.offset();
            match kind {
                TokenKind::Symbol => {
                    let number = self.lexer.next(TokenKind::Symbol)?;
                    let black = if self.lexer.peek() == TokenKind::Period {
                        self.lexer.next(TokenKind::Period)?.bytes.len() > 1
                    } else {
                        false
                    };
                    if let Some(n) = btoi::btou::<u32>(number.bytes)
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                    {
                        ply = n.saturating_mul(2).saturating_add(u32::from(black));
                    }
                }
                TokenKind::Period => {
                    self.lexer.next(TokenKind::Period)?;
                }
                TokenKind::Move => {
                    let token = self.lexer.next(TokenKind::Move)?;
                    let mv = Move::new(token.bytes).map_err(|err| {
                        Failure::new(SyntaxErrorKind::InvalidMove(err), token.offset)
                    })?;
                    let mv = if depth > 0 && plies.is_empty() {
                        mv.with_comment(mem::take(&mut leading))
                    } else {
                        mv
                    };
                    plies.push((ply, mv));
                    ply = ply.saturating_add(1);
                }
                TokenKind::Nag => {
                    let token = self.lexer.next(TokenKind::Nag)?;
                    let nag = Nag::from_ascii(token.bytes)
                        .map_err(|_| Failure::new(SyntaxErrorKind::InvalidNag, token.offset))?;
                    match plies.last_mut() {
                        Some((_, mv)) => mv.push_nag(nag),
                        None => {
                            return Err(Failure::new(
                                SyntaxErrorKind::UnexpectedToken {
                                    expected: TokenKind::Move,
                                    found: TokenKind::Nag,
                                },
                                token.offset,
                            ))
                        }
                    }
                }
                TokenKind::CommentBegin | TokenKind::RolComment => {
                    let comment = self.read_comment()?;
                    match plies.last_mut() {
                        Some((_, mv)) => mv.push_comment(comment),
                        None => append_comment(&mut leading, comment),
                    }
                }
                TokenKind::VariationBegin => {
                    let Some((parent_ply, parent)) = plies.last_mut() else {
                        return Err(Failure::new(SyntaxErrorKind::OrphanVariation, offset));
                    };
                    self.lexer.next(TokenKind::VariationBegin)?;
                    trace!(depth = depth + 1, ply = *parent_ply, "variation");
                    let (variation, leftover) = self.read_line(*parent_ply, depth + 1)?;
                    self.lexer.next(TokenKind::VariationEnd)?;
                    parent.push_comment(leftover);
                    if !variation.is_empty() {
                        parent.push_variation(variation);
                    }
                }
                TokenKind::VariationEnd if depth > 0 => break,
                TokenKind::Termination | TokenKind::TagPairBegin | TokenKind::Eof
                    if depth == 0 =>
                {
                    break
                }
                found => {
                    let expected = if depth > 0 {
                        TokenKind::VariationEnd
                    } else {
                        TokenKind::Move
                    };
                    let kind = if found == TokenKind::Eof {
                        SyntaxErrorKind::EndOfInput { expected }
                    } else {
                        SyntaxErrorKind::UnexpectedToken { expected, found }
                    };
                    return Err(Failure::new(kind, offset));
                }
            }
        }

        Ok((group(plies), leading))
    }
}

/// Groups plies into numbered pairs. A black ply joins the white ply of the
/// same move number if that pair has no black ply yet.
fn group(plies: Vec<(u32, Move<'_>)>) -> Vec<MoveText<'_>> {
    let mut line: Vec<MoveText<'_>> = Vec::with_capacity(plies.len() / 2 + 1);
    for (ply, mv) in plies {
        let number = ply / 2 + 1;
        if ply % 2 == 0 {
            line.extend(MoveText::new(number, Some(mv), None));
            continue;
        }
        match line.last_mut() {
            Some(last) if last.number() == number && last.black().is_none() => {
                *last.black_mut() = Some(mv);
            }
            _ => line.extend(MoveText::new(number, None, Some(mv))),
        }
    }
    line
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<Game<'a>, SyntaxError>;

    fn next(&mut self) -> Option<Result<Game<'a>, SyntaxError>> {
        while !self.done {
            if self.lexer.peek() == TokenKind::Eof {
                self.done = true;
                break;
            }

            let start = self.lexer.offset();
            match self.read_game() {
                Ok(game) => {
                    debug!(
                        offset = start,
                        tags = game.tags().len(),
                        moves = game.moves().len(),
                        result = %game.result(),
                        "parsed game"
                    );
                    return Some(Ok(game));
                }
                Err(failure) => {
                    let error = self.syntax_error(failure);
                    match self.policy {
                        ErrorPolicy::FailFast => {
                            self.done = true;
                            return Some(Err(error));
                        }
                        ErrorPolicy::Resync => {
                            self.lexer.resync(start);
                            let range = start..self.lexer.offset();
                            warn!(%error, text = %error.text, ?range, "skipping malformed game");
                            self.skipped.push(Skipped { range, error });
                        }
                    }
                }
            }
        }
        None
    }
}

/// Parses all games in `bytes`, borrowing from it.
///
/// # Errors
///
/// Returns the first [`SyntaxError`].
pub fn parse(bytes: &[u8]) -> Result<Vec<Game<'_>>, SyntaxError> {
    Parser::new(bytes).collect()
}

/// Reads all games from `reader`.
///
/// Any decoder that implements [`io::Read`] can be plugged in. The input is
/// buffered in full before parsing.
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails, or [`Error::Syntax`] for the
/// first malformed game.
pub fn read_games<R: Read>(mut reader: R) -> Result<Vec<Game<'static>>, Error> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Parser::new(&bytes)
        .map(|game| game.map(Game::into_owned).map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(pgn: &[u8]) -> Game<'_> {
        let mut games = parse(pgn).expect("valid pgn");
        assert_eq!(games.len(), 1);
        games.remove(0)
    }

    fn sans(line: &[MoveText<'_>]) -> Vec<String> {
        line.iter()
            .flat_map(MoveText::plies)
            .map(|mv| mv.text_lossy().into_owned())
            .collect()
    }

    fn error(pgn: &[u8]) -> SyntaxError {
        match Parser::new(pgn).find_map(Result::err) {
            Some(err) => err,
            None => panic!("expected syntax error"),
        }
    }

    #[test]
    fn test_tags_and_moves() {
        let game = one(b"[Event \"Paris\"]\n[White \"Morphy\"]\n\n1. e4 e5 2. Nf3 d6 *\n");
        assert_eq!(game.tags().len(), 2);
        assert_eq!(game.tag("White").map(TagPair::value), Some(&b"Morphy"[..]));
        assert_eq!(sans(game.moves()), ["e4", "e5", "Nf3", "d6"]);
        assert_eq!(game.moves()[1].number(), 2);
        assert_eq!(game.result(), GameResult::Unknown);
    }

    #[test]
    fn test_result_fallback() {
        assert_eq!(one(b"[Result \"0-1\"]\n1. d4 *").result(), GameResult::Black);
        assert_eq!(one(b"[Result \"0-1\"]\n1. d4").result(), GameResult::Black);
        assert_eq!(one(b"[Result \"0-1\"]\n1. d4 1/2-1/2").result(), GameResult::Draw);
        assert_eq!(one(b"1. d4").result(), GameResult::Unknown);
    }

    #[test]
    fn test_annotations() {
        let game = one(b"{Intro} 1. e4! {good} {really} $14 e5?! ; solid\n2. Nf3 1-0");
        assert_eq!(game.comment(), "Intro");
        let e4 = game.moves()[0].white().expect("white move");
        assert_eq!(e4.comment(), "good really");
        assert_eq!(e4.nags(), &[Nag::GOOD_MOVE, Nag(14)]);
        let e5 = game.moves()[0].black().expect("black move");
        assert_eq!(e5.nags(), &[Nag::DUBIOUS_MOVE]);
        assert_eq!(e5.comment(), "solid");
    }

    #[test]
    fn test_variations() {
        let game = one(b"1. e4 e5 (1... c5 2. Nf3 (2. c3 d5) 2... d6) (1... e6) 2. Nf3 *");
        let e5 = game.moves()[0].black().expect("black move");
        assert_eq!(e5.variations().len(), 2);

        let sicilian = &e5.variations()[0];
        assert_eq!(sans(sicilian), ["c5", "Nf3", "d6"]);
        assert_eq!(sicilian[0].number(), 1);
        assert!(sicilian[0].white().is_none());

        let nf3 = sicilian[1].white().expect("white move");
        assert_eq!(sans(&nf3.variations()[0]), ["c3", "d5"]);
        assert_eq!(sans(game.moves()), ["e4", "e5", "Nf3"]);
    }

    #[test]
    fn test_black_to_move_first() {
        let game = one(b"[FEN \"4k3/8/8/8/8/8/4P3/4K3 b - - 0 1\"]\n1... Kd7 2. e4 *");
        assert!(game.moves()[0].white().is_none());
        assert_eq!(sans(game.moves()), ["Kd7", "e4"]);
        assert_eq!(game.moves()[1].number(), 2);
    }

    #[test]
    fn test_several_games() {
        let games =
            parse(b"[Event \"a\"]\n1. e4 1-0\n\n[Event \"b\"]\n1. d4 0-1\n").expect("valid");
        assert_eq!(games.len(), 2);
        assert_eq!(games[1].result(), GameResult::Black);

        // A record without termination ends at the next tag section.
        let games = parse(b"[Event \"a\"]\n1. e4\n[Event \"b\"]\n1. d4 *").expect("valid");
        assert_eq!(games.len(), 2);
        assert_eq!(sans(games[0].moves()), ["e4"]);
    }

    #[test]
    fn test_error_location() {
        let err = error(b"[Event \"x\"]\n\n1. e4 e5\n2. Nf3 ]\n");
        assert_eq!(err.line, 4);
        assert_eq!(err.column, 8);
        assert_eq!(err.text, "2. Nf3 ]");
        assert_eq!(
            err.kind,
            SyntaxErrorKind::UnexpectedToken {
                expected: TokenKind::Move,
                found: TokenKind::TagPairEnd
            }
        );
        assert_eq!(err.to_string(), "expected move, found ']' at line 4, column 8");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            error(b"1. e4 (1. d4").kind,
            SyntaxErrorKind::EndOfInput {
                expected: TokenKind::VariationEnd
            }
        );
        assert_eq!(error(b"1. e4 {open").kind, SyntaxErrorKind::UnterminatedComment);
        assert_eq!(error(b"[Event \"open\n1. e4").kind, SyntaxErrorKind::UnterminatedString);
        assert_eq!(error(b"1. e4 $300").kind, SyntaxErrorKind::InvalidNag);
        assert_eq!(error(b"(1. d4) 1. e4").kind, SyntaxErrorKind::OrphanVariation);
        assert!(matches!(
            error(b"1. e4 N e5").kind,
            SyntaxErrorKind::InvalidMove(MoveError::TooShort { .. })
        ));
        assert_eq!(
            error(b"[Event]").kind,
            SyntaxErrorKind::UnexpectedToken {
                expected: TokenKind::String,
                found: TokenKind::TagPairEnd
            }
        );
    }

    #[test]
    fn test_fail_fast_stops() {
        let mut parser = Parser::new(b"1. e4 ) *\n\n[Event \"b\"]\n1. d4 *");
        assert!(matches!(parser.next(), Some(Err(_))));
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_resync() {
        let pgn = b"[Event \"a\"]\n1. e4 ) e5 *\n\n[Event \"b\"]\n1. d4 *\n";
        let mut parser = Parser::new(pgn).with_policy(ErrorPolicy::Resync);
        let games: Vec<_> = parser.by_ref().collect::<Result<_, _>>().expect("resynced");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].tag("Event").map(TagPair::value), Some(&b"b"[..]));

        let skipped = parser.skipped();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].range, 0..24);
        assert_eq!(skipped[0].error.line, 2);
    }

    #[test]
    fn test_resync_after_unclosed_variation() {
        let pgn = b"[Event \"a\"]\n1. e4 (1. d4\n[Event \"b\"]\n1. d4 *";
        let mut parser = Parser::new(pgn).with_policy(ErrorPolicy::Resync);
        let games: Vec<_> = parser.by_ref().collect::<Result<_, _>>().expect("resynced");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].tag("Event").map(TagPair::value), Some(&b"b"[..]));

        let skipped = parser.skipped();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].range, 0..25);
        assert_eq!(
            skipped[0].error.kind,
            SyntaxErrorKind::UnexpectedToken {
                expected: TokenKind::VariationEnd,
                found: TokenKind::TagPairBegin
            }
        );
        assert_eq!((skipped[0].error.line, skipped[0].error.column), (3, 1));
    }

    #[test]
    fn test_deeply_nested_variations() {
        let depth = 200;
        let mut pgn = b"1. e4".to_vec();
        for _ in 0..depth {
            pgn.extend_from_slice(b" (1. d4");
        }
        pgn.extend(std::iter::repeat_n(b')', depth));
        pgn.extend_from_slice(b" *");

        let game = one(&pgn);
        let mut nested = 0;
        let mut mv = game.moves()[0].white().expect("white move");
        while let Some(line) = mv.variations().first() {
            nested += 1;
            mv = line[0].white().expect("white move");
        }
        assert_eq!(nested, depth);
    }

    #[test]
    fn test_read_games_owned() {
        let pgn = b"[White \"A\"]\n1. e4 {hi} *".to_vec();
        let games = read_games(&pgn[..]).expect("valid");
        drop(pgn);
        assert_eq!(games[0].moves()[0].white().map(Move::comment), Some("hi"));
    }
}
