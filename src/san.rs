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

//! Read and write Standard Algebraic Notation.
//!
//! # Examples
//!
//! ```
//! use pgnkit::san::San;
//!
//! let san: San = "Nbd7".parse()?;
//! assert_eq!(san.to_string(), "Nbd7");
//!
//! // Check, mate and annotation suffixes are accepted and dropped.
//! let san: San = "exd5+!?".parse()?;
//! assert_eq!(san.to_string(), "exd5");
//! # Ok::<_, pgnkit::san::ParseSanError>(())
//! ```

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{
    castling_side::CastlingSide,
    role::Role,
    square::{file_from_ascii, rank_from_ascii, Square},
};

/// Error when parsing a syntactically invalid SAN.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("invalid san")]
pub struct ParseSanError;

/// A move in Standard Algebraic Notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum San {
    Normal {
        role: Role,
        file: Option<u8>,
        rank: Option<u8>,
        capture: bool,
        to: Square,
        promotion: Option<Role>,
    },
    Castle(CastlingSide),
}

impl San {
    /// Parses the given ASCII bytes as a move in SAN. Ignores a possible
    /// check or checkmate suffix and trailing annotation glyphs.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSanError`] if `ascii` is not syntactically valid.
    pub fn from_ascii(ascii: &[u8]) -> Result<San, ParseSanError> {
        let mut reader = Reader::new(ascii);
        let san = reader.read_san().ok_or(ParseSanError)?;
        let _ = reader.eat(b'+') || reader.eat(b'#');
        while reader.eat(b'!') || reader.eat(b'?') {}
        if reader.remaining() != 0 {
            return Err(ParseSanError);
        }
        Ok(san)
    }

    /// The role of the moving piece.
    pub fn role(self) -> Role {
        match self {
            San::Normal { role, .. } => role,
            San::Castle(_) => Role::King,
        }
    }
}

impl FromStr for San {
    type Err = ParseSanError;

    fn from_str(san: &str) -> Result<San, ParseSanError> {
        San::from_ascii(san.as_bytes())
    }
}

impl fmt::Display for San {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            San::Normal {
                role,
                file,
                rank,
                capture,
                to,
                promotion,
            } => {
                if role != Role::Pawn {
                    write!(f, "{}", role.upper_char())?;
                }
                if let Some(file) = file {
                    write!(f, "{}", char::from(b'a' + file))?;
                }
                if let Some(rank) = rank {
                    write!(f, "{}", char::from(b'1' + rank))?;
                }
                if capture {
                    f.write_str("x")?;
                }
                write!(f, "{to}")?;
                if let Some(promotion) = promotion {
                    write!(f, "={}", promotion.upper_char())?;
                }
                Ok(())
            }
            San::Castle(side) => write!(f, "{side}"),
        }
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
}

impl Reader<'_> {
    #[inline]
    fn new(bytes: &[u8]) -> Reader<'_> {
        Reader { bytes }
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.first().copied()
    }

    #[inline]
    fn bump(&mut self) {
        self.bytes = &self.bytes[1..];
    }

    #[inline]
    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.bump();
            true
        } else {
            false
        }
    }

    #[inline]
    fn next(&mut self) -> Option<u8> {
        let byte = self.peek();
        if byte.is_some() {
            self.bump();
        }
        byte
    }

    fn read_square(&mut self) -> Option<Square> {
        let file = file_from_ascii(self.next()?)?;
        let rank = rank_from_ascii(self.next()?)?;
        Some(Square::new(file, rank))
    }

    /// Reads `O-O`, `O-O-O` or the variants written with zeros.
    fn read_castle(&mut self, letter: u8) -> Option<San> {
        self.bump();
        if !self.eat(b'-') || !self.eat(letter) {
            return None;
        }
        if !self.eat(b'-') {
            return Some(San::Castle(CastlingSide::KingSide));
        }
        if !self.eat(letter) {
            return None;
        }
        Some(San::Castle(CastlingSide::QueenSide))
    }

    fn read_san(&mut self) -> Option<San> {
        let role = match self.peek()? {
            b'N' => Role::Knight,
            b'B' => Role::Bishop,
            b'R' => Role::Rook,
            b'Q' => Role::Queen,
            b'K' => Role::King,
            b'P' => Role::Pawn,
            letter @ (b'O' | b'0') => return self.read_castle(letter),
            _ => {
                return self.read_normal(Role::Pawn);
            }
        };
        self.bump();
        self.read_normal(role)
    }

    fn read_normal(&mut self, role: Role) -> Option<San> {
        let file = self.peek().and_then(file_from_ascii);
        if file.is_some() {
            self.bump();
        }

        let rank = self.peek().and_then(rank_from_ascii);
        if rank.is_some() {
            self.bump();
        }

        let (file, rank, capture, to) = if self.eat(b'x') {
            (file, rank, true, self.read_square()?)
        } else if let Some(to_file) = self.peek().and_then(file_from_ascii) {
            self.bump();
            let to_rank = rank_from_ascii(self.next()?)?;
            (file, rank, false, Square::new(to_file, to_rank))
        } else {
            (None, None, false, Square::new(file?, rank?))
        };

        let promotion = if self.eat(b'=') {
            if to.rank() != 0 && to.rank() != 7 {
                return None;
            }
            Some(
                Role::from_char(char::from(self.next()?))
                    .filter(|&role| role != Role::Pawn && role != Role::King)?,
            )
        } else {
            None
        };

        Some(San::Normal {
            role,
            file,
            rank,
            capture,
            to,
            promotion,
        })
    }
}
