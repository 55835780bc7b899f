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

//! Parse and write Forsyth-Edwards-Notation.
//!
//! # Examples
//!
//! ```
//! use pgnkit::fen::Fen;
//!
//! let fen: Fen = "rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 1".parse()?;
//! assert_eq!(fen.ep_square, Some("d3".parse::<pgnkit::Square>()?));
//!
//! let err = "8/8/8/8/8/8/8 w - - 0 1".parse::<Fen>().unwrap_err();
//! assert_eq!(err.to_string(), "row count mismatch: expected 8 rows, found 7");
//!
//! let err = "8/8/8/8/8/8/8/8 x - - 0 1".parse::<Fen>().unwrap_err();
//! assert_eq!(err.to_string(), "unexpected character 'x' at index 16");
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{
    board::Board,
    castling_side::Castles,
    color::Color,
    square::{file_from_ascii, rank_from_ascii, Square},
    types::Piece,
};

/// Printable name of a character in error messages.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CharName(pub char);

impl CharName {
    fn of(ch: &char) -> CharName {
        CharName(*ch)
    }
}

impl fmt::Display for CharName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ' ' => f.write_str("space"),
            '\t' => f.write_str("tab"),
            '\n' => f.write_str("line feed"),
            '\r' => f.write_str("carriage return"),
            ch if ch.is_control() => write!(f, "U+{:04X}", u32::from(ch)),
            ch => write!(f, "'{ch}'"),
        }
    }
}

/// Errors that can occur when parsing a FEN.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum FenError {
    #[error("row count mismatch: expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row} does not describe exactly 8 squares (at index {index})")]
    RowLength { row: usize, index: usize },
    #[error("unexpected character {} at index {index}", CharName::of(.ch))]
    UnexpectedCharacter { ch: char, index: usize },
    #[error("number out of range at index {index}")]
    InvalidNumber { index: usize },
}

impl FenError {
    fn unexpected(fen: &[u8], index: usize) -> FenError {
        let ch = fen[index..]
            .utf8_chunks()
            .next()
            .and_then(|chunk| chunk.valid().chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        FenError::UnexpectedCharacter { ch, index }
    }
}

/// A parsed FEN.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Fen {
    pub board: Board,
    pub turn: Color,
    pub castles: Castles,
    pub ep_square: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmoves: u32,
}

impl Default for Fen {
    /// The standard starting position.
    fn default() -> Fen {
        Fen {
            board: Board::default(),
            turn: Color::White,
            castles: Castles::all(),
            ep_square: None,
            halfmove_clock: 0,
            fullmoves: 1,
        }
    }
}

impl Fen {
    /// An empty board, white to move, no castling rights.
    pub fn empty() -> Fen {
        Fen {
            board: Board::empty(),
            castles: Castles::empty(),
            ..Fen::default()
        }
    }

    /// Parses a FEN. Missing trailing fields keep the defaults of
    /// [`Fen::empty()`].
    ///
    /// # Errors
    ///
    /// Returns [`FenError`] naming the first offending row or byte.
    pub fn from_ascii(fen: &[u8]) -> Result<Fen, FenError> {
        let mut result = Fen::empty();
        let mut fields = Fields::new(fen);

        let (_, board_part) = fields.next().unwrap_or((0, &[]));
        result.board = parse_board(fen, board_part)?;

        if let Some((start, turn_part)) = fields.next() {
            result.turn = match turn_part {
                b"w" => Color::White,
                b"b" => Color::Black,
                [b'w' | b'b', ..] => return Err(FenError::unexpected(fen, start + 1)),
                _ => return Err(FenError::unexpected(fen, start.min(fen.len() - 1))),
            };
        }

        if let Some((start, castling_part)) = fields.next() {
            if castling_part != b"-" {
                if castling_part.is_empty() {
                    return Err(FenError::unexpected(fen, start.min(fen.len() - 1)));
                }
                for (i, &ch) in castling_part.iter().enumerate() {
                    result.castles |= Castles::from_letter(ch)
                        .ok_or_else(|| FenError::unexpected(fen, start + i))?;
                }
            }
        }

        if let Some((start, ep_part)) = fields.next() {
            if ep_part != b"-" {
                result.ep_square = Some(parse_ep_square(fen, ep_part, start)?);
            }
        }

        if let Some((start, halfmoves_part)) = fields.next() {
            result.halfmove_clock = parse_number(fen, halfmoves_part, start)?;
        }

        if let Some((start, fullmoves_part)) = fields.next() {
            result.fullmoves = parse_number(fen, fullmoves_part, start)?;
        }

        if let Some((start, _)) = fields.next() {
            return Err(FenError::unexpected(fen, start.min(fen.len() - 1)));
        }

        Ok(result)
    }
}

/// Space separated fields with their byte offsets.
struct Fields<'a> {
    fen: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Fields<'a> {
    fn new(fen: &'a [u8]) -> Fields<'a> {
        Fields {
            fen,
            pos: 0,
            done: false,
        }
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = (usize, &'a [u8]);

    fn next(&mut self) -> Option<(usize, &'a [u8])> {
        if self.done {
            return None;
        }
        let start = self.pos;
        let rest = &self.fen[start..];
        match memchr::memchr(b' ', rest) {
            Some(len) => {
                self.pos = start + len + 1;
                Some((start, &rest[..len]))
            }
            None => {
                self.done = true;
                Some((start, rest))
            }
        }
    }
}

fn parse_board(fen: &[u8], board_part: &[u8]) -> Result<Board, FenError> {
    let found = board_part.split(|&ch| ch == b'/').count();
    if found != 8 {
        return Err(FenError::RowCount { expected: 8, found });
    }

    let mut board = Board::empty();
    let mut index = 0;
    for (row, part) in board_part.split(|&ch| ch == b'/').enumerate() {
        let rank = 7 - row as u8;
        let mut file = 0u8;
        for &ch in part {
            if let b'1'..=b'8' = ch {
                file += ch - b'0';
            } else {
                let piece = Piece::from_char(char::from(ch))
                    .ok_or_else(|| FenError::unexpected(fen, index))?;
                if file < 8 {
                    board.put(Square::new(file, rank), Some(piece), &mut ());
                }
                file += 1;
            }
            if file > 8 {
                return Err(FenError::RowLength { row: row + 1, index });
            }
            index += 1;
        }
        if file != 8 {
            return Err(FenError::RowLength { row: row + 1, index });
        }
        index += 1;
    }

    Ok(board)
}

fn parse_ep_square(fen: &[u8], part: &[u8], start: usize) -> Result<Square, FenError> {
    let [file, rank, rest @ ..] = part else {
        return Err(FenError::unexpected(fen, (start + part.len()).min(fen.len() - 1)));
    };
    let file = file_from_ascii(*file).ok_or_else(|| FenError::unexpected(fen, start))?;
    let rank = rank_from_ascii(*rank)
        .filter(|&rank| rank == 2 || rank == 5)
        .ok_or_else(|| FenError::unexpected(fen, start + 1))?;
    if !rest.is_empty() {
        return Err(FenError::unexpected(fen, start + 2));
    }
    Ok(Square::new(file, rank))
}

fn parse_number(fen: &[u8], part: &[u8], start: usize) -> Result<u32, FenError> {
    if part.is_empty() {
        return Err(FenError::unexpected(fen, start.min(fen.len() - 1)));
    }
    if let Some(i) = part.iter().position(|ch| !ch.is_ascii_digit()) {
        return Err(FenError::unexpected(fen, start + i));
    }
    btoi::btou(part).map_err(|_| FenError::InvalidNumber { index: start })
}

impl FromStr for Fen {
    type Err = FenError;

    fn from_str(fen: &str) -> Result<Fen, FenError> {
        Fen::from_ascii(fen.as_bytes())
    }
}

impl fmt::Display for Fen {
    /// Writes a FEN such as
    /// `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ",
            self.board.board_fen(),
            self.turn.char(),
            self.castles
        )?;
        match self.ep_square {
            Some(sq) => write!(f, "{sq}")?,
            None => f.write_str("-")?,
        }
        write!(f, " {} {}", self.halfmove_clock, self.fullmoves)
    }
}
