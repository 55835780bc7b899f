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

use std::fmt;

use bitflags::bitflags;

use crate::{color::Color, square::Square};

/// `KingSide` (O-O) or `QueenSide` (O-O-O).
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum CastlingSide {
    KingSide,
    QueenSide,
}

impl CastlingSide {
    #[inline]
    pub const fn is_king_side(self) -> bool {
        matches!(self, CastlingSide::KingSide)
    }

    const fn king_to_file(self) -> u8 {
        match self {
            CastlingSide::KingSide => 6,
            CastlingSide::QueenSide => 2,
        }
    }

    const fn rook_to_file(self) -> u8 {
        match self {
            CastlingSide::KingSide => 5,
            CastlingSide::QueenSide => 3,
        }
    }

    const fn rook_from_file(self) -> u8 {
        match self {
            CastlingSide::KingSide => 7,
            CastlingSide::QueenSide => 0,
        }
    }

    pub fn king_from(color: Color) -> Square {
        Square::new(4, color.backrank())
    }

    pub fn king_to(self, color: Color) -> Square {
        Square::new(self.king_to_file(), color.backrank())
    }

    pub fn rook_from(self, color: Color) -> Square {
        Square::new(self.rook_from_file(), color.backrank())
    }

    pub fn rook_to(self, color: Color) -> Square {
        Square::new(self.rook_to_file(), color.backrank())
    }

    /// `KingSide` and `QueenSide`, in this order.
    pub const ALL: [CastlingSide; 2] = [CastlingSide::KingSide, CastlingSide::QueenSide];
}

impl fmt::Display for CastlingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CastlingSide::KingSide => "O-O",
            CastlingSide::QueenSide => "O-O-O",
        })
    }
}

bitflags! {
    /// Castling rights, one bit per color and side.
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct Castles: u8 {
        const WHITE_KING_SIDE = 1;
        const WHITE_QUEEN_SIDE = 2;
        const BLACK_KING_SIDE = 4;
        const BLACK_QUEEN_SIDE = 8;
    }
}

impl Castles {
    /// The single right for `color` castling to `side`.
    pub fn right(color: Color, side: CastlingSide) -> Castles {
        match (color, side) {
            (Color::White, CastlingSide::KingSide) => Castles::WHITE_KING_SIDE,
            (Color::White, CastlingSide::QueenSide) => Castles::WHITE_QUEEN_SIDE,
            (Color::Black, CastlingSide::KingSide) => Castles::BLACK_KING_SIDE,
            (Color::Black, CastlingSide::QueenSide) => Castles::BLACK_QUEEN_SIDE,
        }
    }

    /// Both rights of `color`.
    pub fn of(color: Color) -> Castles {
        Castles::right(color, CastlingSide::KingSide)
            | Castles::right(color, CastlingSide::QueenSide)
    }

    /// The right that depends on a rook standing on `square`, if any.
    pub fn for_rook_square(square: Square) -> Castles {
        Color::ALL
            .into_iter()
            .flat_map(|color| CastlingSide::ALL.map(|side| (color, side)))
            .filter(|&(color, side)| side.rook_from(color) == square)
            .fold(Castles::empty(), |acc, (color, side)| {
                acc | Castles::right(color, side)
            })
    }

    /// FEN letter of a single right.
    fn letter(self) -> Option<char> {
        Some(match self {
            Castles::WHITE_KING_SIDE => 'K',
            Castles::WHITE_QUEEN_SIDE => 'Q',
            Castles::BLACK_KING_SIDE => 'k',
            Castles::BLACK_QUEEN_SIDE => 'q',
            _ => return None,
        })
    }

    /// Parses a single FEN castling letter.
    pub fn from_letter(ch: u8) -> Option<Castles> {
        Some(match ch {
            b'K' => Castles::WHITE_KING_SIDE,
            b'Q' => Castles::WHITE_QUEEN_SIDE,
            b'k' => Castles::BLACK_KING_SIDE,
            b'q' => Castles::BLACK_QUEEN_SIDE,
            _ => return None,
        })
    }
}

impl fmt::Display for Castles {
    /// Writes the FEN castling field, `KQkq` order, or `-` if empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for right in self.iter() {
            if let Some(ch) = right.letter() {
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_castles_display() {
        assert_eq!(Castles::all().to_string(), "KQkq");
        assert_eq!(Castles::empty().to_string(), "-");
        assert_eq!(
            (Castles::WHITE_QUEEN_SIDE | Castles::BLACK_KING_SIDE).to_string(),
            "Qk"
        );
    }

    #[test]
    fn test_for_rook_square() {
        assert_eq!(Castles::for_rook_square(Square::H1), Castles::WHITE_KING_SIDE);
        assert_eq!(Castles::for_rook_square(Square::A8), Castles::BLACK_QUEEN_SIDE);
        assert_eq!(Castles::for_rook_square(Square::E1), Castles::empty());
    }

    #[test]
    fn test_squares() {
        assert_eq!(CastlingSide::KingSide.king_to(Color::White), Square::G1);
        assert_eq!(CastlingSide::QueenSide.rook_to(Color::Black), Square::D8);
        assert_eq!(CastlingSide::king_from(Color::Black), Square::E8);
    }
}
