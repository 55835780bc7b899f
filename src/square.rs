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

use std::{cmp::max, fmt, str::FromStr};

use thiserror::Error;

/// Error when parsing an invalid square name.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("invalid square name")]
pub struct ParseSquareError;

/// A square index. `A1` is 0, `B1` is 1 and `H8` is 63.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Square(u8);

impl Square {
    /// Creates a square from file and rank indexes, both in `0..8`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn new(file: u8, rank: u8) -> Square {
        assert!(file < 8 && rank < 8, "square out of range");
        Square(file | (rank << 3))
    }

    /// Creates a square from signed coordinates, or `None` if they are off
    /// the board.
    #[inline]
    pub fn from_coords(file: i8, rank: i8) -> Option<Square> {
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square::new(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// Parses a square name such as `e4`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pgnkit::Square;
    ///
    /// let sq = Square::from_ascii(b"e4")?;
    /// assert_eq!(sq.file(), 4);
    /// assert_eq!(sq.rank(), 3);
    /// # Ok::<_, pgnkit::ParseSquareError>(())
    /// ```
    pub fn from_ascii(s: &[u8]) -> Result<Square, ParseSquareError> {
        match *s {
            [file, rank] => match (file_from_ascii(file), rank_from_ascii(rank)) {
                (Some(file), Some(rank)) => Ok(Square::new(file, rank)),
                _ => Err(ParseSquareError),
            },
            _ => Err(ParseSquareError),
        }
    }

    #[inline]
    pub const fn file(self) -> u8 {
        self.0 & 7
    }

    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 >> 3
    }

    /// The square `df` files and `dr` ranks away, if it is on the board.
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        Square::from_coords(self.file() as i8 + df, self.rank() as i8 + dr)
    }

    /// Chebyshev distance, the number of king steps between two squares.
    pub fn distance(self, other: Square) -> u8 {
        max(
            self.file().abs_diff(other.file()),
            self.rank().abs_diff(other.rank()),
        )
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const A1: Square = Square(0);
    pub const C1: Square = Square(2);
    pub const D1: Square = Square(3);
    pub const E1: Square = Square(4);
    pub const F1: Square = Square(5);
    pub const G1: Square = Square(6);
    pub const H1: Square = Square(7);
    pub const A8: Square = Square(56);
    pub const C8: Square = Square(58);
    pub const D8: Square = Square(59);
    pub const E8: Square = Square(60);
    pub const F8: Square = Square(61);
    pub const G8: Square = Square(62);
    pub const H8: Square = Square(63);
}

/// Parses a file letter `a`..=`h` into its index.
#[inline]
pub(crate) fn file_from_ascii(ch: u8) -> Option<u8> {
    (b'a'..=b'h').contains(&ch).then(|| ch - b'a')
}

/// Parses a rank digit `1`..=`8` into its index.
#[inline]
pub(crate) fn rank_from_ascii(ch: u8) -> Option<u8> {
    (b'1'..=b'8').contains(&ch).then(|| ch - b'1')
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Square, ParseSquareError> {
        Square::from_ascii(s.as_bytes())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            char::from(b'a' + self.file()),
            char::from(b'1' + self.rank())
        )
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square() {
        for file in 0..8 {
            for rank in 0..8 {
                let square = Square::new(file, rank);
                assert_eq!(square.file(), file);
                assert_eq!(square.rank(), rank);
            }
        }
    }

    #[test]
    fn test_distance() {
        let d2: Square = "d2".parse().expect("valid square");
        let g3: Square = "g3".parse().expect("valid square");
        assert_eq!(d2.distance(g3), 3);
    }

    #[test]
    fn test_offset() {
        assert_eq!(Square::H8.offset(1, 0), None);
        assert_eq!(Square::A1.offset(7, 7), Some(Square::H8));
        assert_eq!(Square::E1.offset(-4, 0), Some(Square::A1));
    }

    #[test]
    fn test_display() {
        assert_eq!(Square::E8.to_string(), "e8");
        assert_eq!(format!("{:?}", Square::C1), "C1");
        assert_eq!("i1".parse::<Square>(), Err(ParseSquareError));
        assert_eq!("e".parse::<Square>(), Err(ParseSquareError));
    }
}
