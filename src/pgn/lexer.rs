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

//! Split PGN into tokens.
//!
//! The lexer walks a byte slice with a cursor that only moves forward. It
//! knows nothing about the grammar: the parser asks for the kind of token
//! it expects next, and the lexer either supplies it or reports what it
//! found instead.
//!
//! # Examples
//!
//! ```
//! use pgnkit::pgn::{Lexer, TokenKind};
//!
//! let kinds: Vec<TokenKind> = Lexer::new(b"1. e4 {best} 1-0")
//!     .map(|token| token.map(|token| token.kind))
//!     .collect::<Result<_, _>>()?;
//!
//! assert_eq!(kinds, [
//!     TokenKind::Symbol,
//!     TokenKind::Period,
//!     TokenKind::Move,
//!     TokenKind::CommentBegin,
//!     TokenKind::CommentBody,
//!     TokenKind::CommentEnd,
//!     TokenKind::Termination,
//! ]);
//! # Ok::<_, pgnkit::pgn::LexError>(())
//! ```

use std::fmt;

use memchr::{memchr, memchr3, memrchr};
use thiserror::Error;

use crate::pgn::nag::Nag;

/// Classification of a token.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TokenKind {
    TagPairBegin,
    TagPairEnd,
    /// Quoted string, without the quotes and with escapes still in place.
    String,
    /// Tag name or move number.
    Symbol,
    /// One or more periods after a move number.
    Period,
    Move,
    CommentBegin,
    /// Text between the braces of a comment, read verbatim.
    CommentBody,
    CommentEnd,
    /// Rest of line comment, without the leading `;`.
    RolComment,
    Nag,
    VariationBegin,
    VariationEnd,
    Termination,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::TagPairBegin => "'['",
            TokenKind::TagPairEnd => "']'",
            TokenKind::String => "string",
            TokenKind::Symbol => "symbol",
            TokenKind::Period => "'.'",
            TokenKind::Move => "move",
            TokenKind::CommentBegin => "'{'",
            TokenKind::CommentBody => "comment",
            TokenKind::CommentEnd => "'}'",
            TokenKind::RolComment => "';' comment",
            TokenKind::Nag => "annotation glyph",
            TokenKind::VariationBegin => "'('",
            TokenKind::VariationEnd => "')'",
            TokenKind::Termination => "game termination",
            TokenKind::Eof => "end of input",
        })
    }
}

/// A classified slice of the input.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub bytes: &'a [u8],
    /// Byte offset of the token in the input.
    pub offset: usize,
}

/// Errors when the input cannot supply the requested token.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Error)]
pub enum LexError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        offset: usize,
    },
    #[error("expected {expected}, found end of input")]
    EndOfInput { expected: TokenKind, offset: usize },
    #[error("unterminated string")]
    UnterminatedString { offset: usize },
    #[error("unterminated comment")]
    UnterminatedComment { offset: usize },
    #[error("invalid annotation glyph")]
    InvalidNag { offset: usize },
}

impl LexError {
    /// Byte offset the error refers to.
    pub fn offset(&self) -> usize {
        match *self {
            LexError::UnexpectedToken { offset, .. }
            | LexError::EndOfInput { offset, .. }
            | LexError::UnterminatedString { offset }
            | LexError::UnterminatedComment { offset }
            | LexError::InvalidNag { offset } => offset,
        }
    }
}

/// Line and column of a byte offset, both starting at 1.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Finds the location of `offset` in `bytes`. Columns count characters,
    /// with each invalid UTF-8 sequence counting as one.
    pub fn of(bytes: &[u8], offset: usize) -> Location {
        let before = &bytes[..offset.min(bytes.len())];
        let line_start = memrchr(b'\n', before).map_or(0, |i| i + 1);
        let chars: usize = before[line_start..]
            .utf8_chunks()
            .map(|chunk| chunk.valid().chars().count() + usize::from(!chunk.invalid().is_empty()))
            .sum();
        Location {
            line: 1 + memchr::memchr_iter(b'\n', before).count(),
            column: 1 + chars,
        }
    }

    /// The full line of `bytes` that contains `offset`, without the line
    /// break.
    pub fn line_text(bytes: &[u8], offset: usize) -> &[u8] {
        let offset = offset.min(bytes.len());
        let start = memrchr(b'\n', &bytes[..offset]).map_or(0, |i| i + 1);
        let end = memchr(b'\n', &bytes[offset..]).map_or(bytes.len(), |i| offset + i);
        let line = &bytes[start..end];
        line.strip_suffix(b"\r").unwrap_or(line)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

const TERMINATIONS: [&[u8]; 4] = [b"1-0", b"0-1", b"1/2-1/2", b"*"];

/// Tests if a move ends before `ch`. This is the single place that decides
/// where a move ends.
#[inline]
pub fn is_move_boundary(ch: u8) -> bool {
    matches!(
        ch,
        b' ' | b'\t' | b'\r' | b'\n' | b'{' | b'(' | b')' | b'$' | b';' | b'*'
    )
}

fn is_symbol_byte(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, b'_' | b'+' | b'#' | b'=' | b':' | b'-' | b'/')
}

/// Tokenizer over an in-memory PGN.
#[derive(Clone, Debug)]
pub struct Lexer<'a> {
    bytes: &'a [u8],
    start: usize,
    pos: usize,
    in_tag_pair: bool,
    in_comment: bool,
    failed: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer, skipping a UTF-8 byte order mark.
    pub fn new(bytes: &'a [u8]) -> Lexer<'a> {
        let start = if bytes.starts_with(b"\xef\xbb\xbf") { 3 } else { 0 };
        Lexer {
            bytes,
            start,
            pos: start,
            in_tag_pair: false,
            in_comment: false,
            failed: false,
        }
    }

    /// The whole input.
    pub fn input(&self) -> &'a [u8] {
        self.bytes
    }

    /// Byte offset of the cursor.
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    fn at_line_start(&self) -> bool {
        self.pos == self.start || self.bytes[self.pos - 1] == b'\n'
    }

    fn skip_line(&mut self) {
        self.pos = memchr(b'\n', self.rest()).map_or(self.bytes.len(), |i| self.pos + i + 1);
    }

    /// Skips whitespace and `%` escape lines.
    pub fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.rest().first() {
            match ch {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b'%' if self.at_line_start() => self.skip_line(),
                _ => return,
            }
        }
    }

    /// Classifies the next token without consuming it.
    pub fn peek(&mut self) -> TokenKind {
        if self.in_comment {
            return TokenKind::CommentBody;
        }
        self.skip_whitespace();
        self.classify()
    }

    fn classify(&self) -> TokenKind {
        let rest = self.rest();
        let Some(&ch) = rest.first() else {
            return TokenKind::Eof;
        };
        match ch {
            b'[' => TokenKind::TagPairBegin,
            b']' => TokenKind::TagPairEnd,
            b'"' => TokenKind::String,
            b'.' => TokenKind::Period,
            b'{' => TokenKind::CommentBegin,
            b'}' => TokenKind::CommentEnd,
            b';' => TokenKind::RolComment,
            b'$' | b'!' | b'?' => TokenKind::Nag,
            b'(' => TokenKind::VariationBegin,
            b')' => TokenKind::VariationEnd,
            b'*' => TokenKind::Termination,
            _ if self.in_tag_pair && is_symbol_byte(ch) => TokenKind::Symbol,
            b'0'..=b'9' => {
                if termination_len(rest).is_some() {
                    return TokenKind::Termination;
                }
                let digits = rest.iter().take_while(|ch| ch.is_ascii_digit()).count();
                match rest.get(digits) {
                    None | Some(b'.') => TokenKind::Symbol,
                    Some(&next) if is_move_boundary(next) => TokenKind::Symbol,
                    Some(_) => TokenKind::Move,
                }
            }
            _ => TokenKind::Move,
        }
    }

    fn can_supply(&self, expected: TokenKind, found: TokenKind) -> bool {
        match expected {
            TokenKind::Symbol => self.rest().first().is_some_and(|&ch| is_symbol_byte(ch)),
            _ => expected == found,
        }
    }

    /// Reads a token of the `expected` kind.
    ///
    /// # Errors
    ///
    /// Fails without consuming anything if the input cannot supply a token
    /// of that kind.
    pub fn next(&mut self, expected: TokenKind) -> Result<Token<'a>, LexError> {
        let found = self.peek();
        let offset = self.pos;
        if found == TokenKind::Eof && expected != TokenKind::Eof {
            return Err(LexError::EndOfInput { expected, offset });
        }
        if !self.can_supply(expected, found) {
            return Err(LexError::UnexpectedToken {
                expected,
                found,
                offset,
            });
        }
        let len = self.token_len(expected)?;
        let bytes = &self.bytes[offset..offset + len];
        self.pos += len;
        self.in_comment = expected == TokenKind::CommentBegin;
        match expected {
            TokenKind::TagPairBegin => self.in_tag_pair = true,
            TokenKind::TagPairEnd => self.in_tag_pair = false,
            _ => (),
        }

        Ok(Token {
            kind: expected,
            bytes: match expected {
                TokenKind::String => &bytes[1..len - 1],
                TokenKind::RolComment => {
                    let text = &bytes[1..];
                    text.strip_suffix(b"\r").unwrap_or(text)
                }
                _ => bytes,
            },
            offset,
        })
    }

    /// Reads the text of a comment after [`TokenKind::CommentBegin`].
    ///
    /// # Errors
    ///
    /// Fails if the comment is not closed.
    pub fn comment_body(&mut self) -> Result<&'a [u8], LexError> {
        self.next(TokenKind::CommentBody).map(|token| token.bytes)
    }

    /// Length of the token of `kind` at the cursor.
    fn token_len(&self, kind: TokenKind) -> Result<usize, LexError> {
        let rest = self.rest();
        let offset = self.pos;
        Ok(match kind {
            TokenKind::Eof => 0,
            TokenKind::TagPairBegin
            | TokenKind::TagPairEnd
            | TokenKind::CommentBegin
            | TokenKind::CommentEnd
            | TokenKind::VariationBegin
            | TokenKind::VariationEnd => 1,
            TokenKind::Period => rest.iter().take_while(|&&ch| ch == b'.').count(),
            TokenKind::String => {
                let mut end = 1;
                loop {
                    match memchr3(b'\\', b'"', b'\n', &rest[end..]) {
                        Some(delta) if rest[end + delta] == b'"' => break end + delta + 1,
                        Some(delta) if rest[end + delta] == b'\\' => {
                            end = (end + delta + 2).min(rest.len());
                        }
                        _ => return Err(LexError::UnterminatedString { offset }),
                    }
                }
            }
            TokenKind::Symbol => rest.iter().take_while(|&&ch| is_symbol_byte(ch)).count(),
            TokenKind::Move => {
                let end = rest
                    .iter()
                    .position(|&ch| is_move_boundary(ch))
                    .unwrap_or(rest.len());
                // Trailing glyphs like the `!?` in `e4!?` are read as a NAG.
                let glyphs = rest[..end]
                    .iter()
                    .rev()
                    .take_while(|&&ch| ch == b'!' || ch == b'?')
                    .count();
                end - glyphs
            }
            TokenKind::CommentBody => memchr(b'}', rest)
                .ok_or(LexError::UnterminatedComment { offset })?,
            TokenKind::RolComment => memchr(b'\n', rest).unwrap_or(rest.len()),
            TokenKind::Nag => {
                let len = if rest[0] == b'$' {
                    1 + rest[1..].iter().take_while(|ch| ch.is_ascii_digit()).count()
                } else {
                    rest.iter().take_while(|&&ch| ch == b'!' || ch == b'?').count()
                };
                Nag::from_ascii(&rest[..len]).map_err(|_| LexError::InvalidNag { offset })?;
                len
            }
            TokenKind::Termination => {
                termination_len(rest).ok_or(LexError::UnexpectedToken {
                    expected: kind,
                    found: TokenKind::Move,
                    offset,
                })?
            }
        })
    }

    /// Moves the cursor to where the next record probably starts: the next
    /// `[` at the start of a line, or right after the next game termination.
    ///
    /// `record_start` is the offset the failed record began at. The scan
    /// starts at the cursor if it moved past that offset, so a `[` the cursor
    /// stopped on is found again. Otherwise it advances by at least one byte
    /// unless at the end.
    pub fn resync(&mut self, record_start: usize) {
        self.in_comment = false;
        self.in_tag_pair = false;
        let from = if self.pos > record_start {
            self.pos
        } else {
            record_start + 1
        };
        let mut i = from.min(self.bytes.len());
        while i < self.bytes.len() {
            let line_start = self.bytes[i - 1] == b'\n';
            let after_boundary = is_move_boundary(self.bytes[i - 1]);
            match self.bytes[i] {
                b'[' if line_start => {
                    self.pos = i;
                    return;
                }
                b'*' => {
                    self.pos = i + 1;
                    return;
                }
                b'0' | b'1' if after_boundary => {
                    if let Some(len) = termination_len(&self.bytes[i..]) {
                        self.pos = i + len;
                        return;
                    }
                }
                _ => (),
            }
            i += 1;
        }
        self.pos = self.bytes.len();
    }
}

/// Length of a game termination marker at the start of `bytes`, if it is
/// followed by a boundary.
fn termination_len(bytes: &[u8]) -> Option<usize> {
    TERMINATIONS
        .iter()
        .find(|t| {
            bytes.starts_with(t) && bytes.get(t.len()).is_none_or(|&ch| is_move_boundary(ch))
        })
        .map(|t| t.len())
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    /// Reads whatever token comes next. Stops at the end of input or after
    /// the first error.
    fn next(&mut self) -> Option<Result<Token<'a>, LexError>> {
        if self.failed {
            return None;
        }
        let kind = self.peek();
        if kind == TokenKind::Eof {
            return None;
        }
        let token = Lexer::next(self, kind);
        self.failed = token.is_err();
        Some(token)
    }
}
