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

//! Moves, their annotations and the numbered pairs they are grouped in.

use std::{borrow::Cow, fmt};

use thiserror::Error;

use crate::{
    pgn::nag::Nag,
    san::{ParseSanError, San},
};

/// Error when constructing a [`Move`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum MoveError {
    #[error("move text {text:?} is too short, expected at least 2 bytes")]
    TooShort { text: String },
}

/// A single ply with everything attached to it.
///
/// The move text is either borrowed from the input or owned. Accessors and
/// equality do not depend on which.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Move<'a> {
    text: Cow<'a, [u8]>,
    comment: Cow<'a, str>,
    nags: Vec<Nag>,
    variations: Vec<Vec<MoveText<'a>>>,
}

impl<'a> Move<'a> {
    /// Creates a move that borrows its text.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::TooShort`] for text shorter than any SAN.
    ///
    /// # Examples
    ///
    /// ```
    /// use pgnkit::pgn::{Move, MoveError};
    ///
    /// let buffer = b"Nbd7".to_vec();
    /// let borrowed = Move::new(&buffer)?;
    /// assert_eq!(borrowed, Move::owned("Nbd7")?);
    ///
    /// assert!(matches!(Move::new(b"e"), Err(MoveError::TooShort { .. })));
    /// # Ok::<_, MoveError>(())
    /// ```
    pub fn new(text: &'a [u8]) -> Result<Move<'a>, MoveError> {
        Move::from_cow(Cow::Borrowed(text))
    }

    /// Creates a move with its own copy of the text.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::TooShort`] for text shorter than any SAN.
    pub fn owned(text: impl Into<Vec<u8>>) -> Result<Move<'static>, MoveError> {
        Move::from_cow(Cow::Owned(text.into()))
    }

    fn from_cow(text: Cow<'a, [u8]>) -> Result<Move<'a>, MoveError> {
        if text.len() < 2 {
            return Err(MoveError::TooShort {
                text: String::from_utf8_lossy(&text).into_owned(),
            });
        }
        Ok(Move {
            text,
            comment: Cow::Borrowed(""),
            nags: Vec::new(),
            variations: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<Cow<'a, str>>) -> Move<'a> {
        self.comment = comment.into();
        self
    }

    #[must_use]
    pub fn with_nag(mut self, nag: Nag) -> Move<'a> {
        self.nags.push(nag);
        self
    }

    #[must_use]
    pub fn with_variation(mut self, variation: Vec<MoveText<'a>>) -> Move<'a> {
        self.variations.push(variation);
        self
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// The move text, lossily decoded.
    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }

    /// Parses the move text as SAN.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSanError`] if the text is not SAN.
    pub fn san(&self) -> Result<San, ParseSanError> {
        San::from_ascii(&self.text)
    }

    /// The comment after the move. Empty if there is none.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn nags(&self) -> &[Nag] {
        &self.nags
    }

    /// Alternatives to this move, each starting at the ply of this move.
    pub fn variations(&self) -> &[Vec<MoveText<'a>>] {
        &self.variations
    }

    /// Appends to the comment, separated by a space from what is already
    /// there.
    pub(crate) fn push_comment(&mut self, comment: Cow<'a, str>) {
        append_comment(&mut self.comment, comment);
    }

    pub(crate) fn push_nag(&mut self, nag: Nag) {
        self.nags.push(nag);
    }

    pub(crate) fn push_variation(&mut self, variation: Vec<MoveText<'a>>) {
        self.variations.push(variation);
    }

    /// Detaches the move from the buffer it was parsed from.
    pub fn into_owned(self) -> Move<'static> {
        Move {
            text: Cow::Owned(self.text.into_owned()),
            comment: Cow::Owned(self.comment.into_owned()),
            nags: self.nags,
            variations: self
                .variations
                .into_iter()
                .map(|line| line.into_iter().map(MoveText::into_owned).collect())
                .collect(),
        }
    }
}

pub(crate) fn append_comment<'a>(target: &mut Cow<'a, str>, comment: Cow<'a, str>) {
    if target.is_empty() {
        *target = comment;
    } else if !comment.is_empty() {
        let joined = target.to_mut();
        joined.push(' ');
        joined.push_str(&comment);
    }
}

impl fmt::Display for Move<'_> {
    /// Writes the move text only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text_lossy())
    }
}

/// One full move number with the white and/or the black ply.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MoveText<'a> {
    number: u32,
    white: Option<Move<'a>>,
    black: Option<Move<'a>>,
}

impl<'a> MoveText<'a> {
    /// Creates a move pair. Returns `None` if both plies are missing.
    pub fn new(
        number: u32,
        white: Option<Move<'a>>,
        black: Option<Move<'a>>,
    ) -> Option<MoveText<'a>> {
        (white.is_some() || black.is_some()).then_some(MoveText {
            number,
            white,
            black,
        })
    }

    /// Pairs up a flat sequence of plies that starts with a white move, as
    /// indices 0 and 1, 2 and 3, and so on.
    ///
    /// # Examples
    ///
    /// ```
    /// use pgnkit::pgn::{Move, MoveText};
    ///
    /// let moves = ["e4", "e5", "Nf3"].map(|san| Move::owned(san).unwrap());
    /// let pairs = MoveText::pair(moves, 1);
    /// assert_eq!(pairs.len(), 2);
    /// assert_eq!(pairs[1].number(), 2);
    /// assert!(pairs[1].black().is_none());
    /// ```
    pub fn pair<I>(moves: I, first_number: u32) -> Vec<MoveText<'a>>
    where
        I: IntoIterator<Item = Move<'a>>,
    {
        let mut moves = moves.into_iter();
        let mut pairs = Vec::new();
        let mut number = first_number;
        while let Some(white) = moves.next() {
            pairs.push(MoveText {
                number,
                white: Some(white),
                black: moves.next(),
            });
            number = number.saturating_add(1);
        }
        pairs
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn white(&self) -> Option<&Move<'a>> {
        self.white.as_ref()
    }

    pub fn black(&self) -> Option<&Move<'a>> {
        self.black.as_ref()
    }

    pub(crate) fn black_mut(&mut self) -> &mut Option<Move<'a>> {
        &mut self.black
    }

    /// The white ply, then the black ply, skipping a missing one.
    pub fn plies(&self) -> impl Iterator<Item = &Move<'a>> {
        self.white.iter().chain(self.black.iter())
    }

    pub fn into_owned(self) -> MoveText<'static> {
        MoveText {
            number: self.number,
            white: self.white.map(Move::into_owned),
            black: self.black.map(Move::into_owned),
        }
    }
}
