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

use std::{borrow::Cow, fmt, str::FromStr};

use thiserror::Error;

use crate::{
    fen::FenError,
    pgn::{
        movetext::{Move, MoveText},
        tag::TagPair,
    },
    position::{PlayError, Position},
};

/// Outcome of a game as given by its termination marker.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum GameResult {
    /// `1-0`
    White,
    /// `0-1`
    Black,
    /// `1/2-1/2`
    Draw,
    /// `*`, or no result at all.
    #[default]
    Unknown,
}

impl GameResult {
    /// Parses a termination marker. Anything else is `None`.
    pub fn from_ascii(s: &[u8]) -> Option<GameResult> {
        Some(match s {
            b"1-0" => GameResult::White,
            b"0-1" => GameResult::Black,
            b"1/2-1/2" => GameResult::Draw,
            b"*" => GameResult::Unknown,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::White => "1-0",
            GameResult::Black => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unknown => "*",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing a [`GameResult`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("invalid game result")]
pub struct ParseGameResultError;

impl FromStr for GameResult {
    type Err = ParseGameResultError;

    fn from_str(s: &str) -> Result<GameResult, ParseGameResultError> {
        GameResult::from_ascii(s.as_bytes()).ok_or(ParseGameResultError)
    }
}

/// Error when replaying the mainline of a game.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ReplayError {
    #[error("invalid FEN tag: {0}")]
    InvalidFen(#[from] FenError),
    #[error("cannot play ply {ply} ({san}): {source}")]
    Ply {
        /// Index of the failing ply, counting from 0.
        ply: usize,
        san: String,
        source: PlayError,
    },
}

/// A parsed game.
///
/// Tags and moves are borrowed from the input where possible. Use
/// [`Game::into_owned()`] to keep a game beyond the lifetime of the input.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Game<'a> {
    tags: Vec<TagPair<'a>>,
    moves: Vec<MoveText<'a>>,
    result: GameResult,
    comment: Cow<'a, str>,
}

impl<'a> Game<'a> {
    pub fn new(tags: Vec<TagPair<'a>>, moves: Vec<MoveText<'a>>, result: GameResult) -> Game<'a> {
        Game {
            tags,
            moves,
            result,
            comment: Cow::Borrowed(""),
        }
    }

    /// Sets the comment that comes before the first move.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<Cow<'a, str>>) -> Game<'a> {
        self.comment = comment.into();
        self
    }

    pub fn tags(&self) -> &[TagPair<'a>] {
        &self.tags
    }

    /// Finds the first tag pair with the given name.
    pub fn tag(&self, name: &str) -> Option<&TagPair<'a>> {
        self.tags.iter().find(|tag| tag.is(name))
    }

    /// The numbered moves of the mainline.
    pub fn moves(&self) -> &[MoveText<'a>] {
        &self.moves
    }

    /// The plies of the mainline in order.
    pub fn mainline(&self) -> impl Iterator<Item = &Move<'a>> {
        self.moves.iter().flat_map(MoveText::plies)
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    /// The comment before the first move. Empty if there is none.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// The position the game starts from: the `FEN` tag if there is one,
    /// else the standard starting position.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidFen`] if the `FEN` tag does not parse.
    pub fn initial_position(&self) -> Result<Position, ReplayError> {
        match self.tag("FEN") {
            Some(fen) => Ok(Position::from_fen(&fen.value_utf8_lossy())?),
            None => Ok(Position::default()),
        }
    }

    /// Replays the mainline and returns the FEN after every ply.
    ///
    /// # Errors
    ///
    /// Fails on an invalid `FEN` tag or on the first ply that cannot be
    /// played.
    pub fn replay(&self) -> Result<Vec<String>, ReplayError> {
        let mut pos = self.initial_position()?;
        self.mainline()
            .enumerate()
            .map(|(ply, mv)| {
                pos.play_ascii(mv.text()).map_err(|source| ReplayError::Ply {
                    ply,
                    san: mv.text_lossy().into_owned(),
                    source,
                })
            })
            .collect()
    }

    /// Detaches the game from the input it was parsed from.
    pub fn into_owned(self) -> Game<'static> {
        Game {
            tags: self.tags.into_iter().map(TagPair::into_owned).collect(),
            moves: self.moves.into_iter().map(MoveText::into_owned).collect(),
            result: self.result,
            comment: Cow::Owned(self.comment.into_owned()),
        }
    }
}

/// Writes a comment, keeping braces inside it from ending it early.
fn write_comment(f: &mut fmt::Formatter<'_>, comment: &str) -> fmt::Result {
    if comment.is_empty() {
        return Ok(());
    }
    write!(f, " {{{}}}", comment.replace('}', ")"))
}

/// Writes a move with its annotations. Returns whether the next black move
/// needs its number repeated.
fn write_move(f: &mut fmt::Formatter<'_>, mv: &Move<'_>) -> Result<bool, fmt::Error> {
    write!(f, "{mv}")?;
    for nag in mv.nags() {
        write!(f, " {nag}")?;
    }
    write_comment(f, mv.comment())?;
    for variation in mv.variations() {
        f.write_str(" (")?;
        write_line(f, variation)?;
        f.write_str(")")?;
    }
    Ok(!mv.comment().is_empty() || !mv.variations().is_empty())
}

fn write_line(f: &mut fmt::Formatter<'_>, line: &[MoveText<'_>]) -> fmt::Result {
    let mut first = true;
    for pair in line {
        let mut repeat_number = true;
        if let Some(white) = pair.white() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}. ", pair.number())?;
            repeat_number = write_move(f, white)?;
            first = false;
        }
        if let Some(black) = pair.black() {
            if !first {
                f.write_str(" ")?;
            }
            if repeat_number {
                write!(f, "{}... ", pair.number())?;
            }
            write_move(f, black)?;
            first = false;
        }
    }
    Ok(())
}

impl fmt::Display for Game<'_> {
    /// Writes the game as PGN: tag pairs, a blank line, then the movetext on
    /// a single line followed by the result.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tag in &self.tags {
            writeln!(f, "{tag}")?;
        }
        if !self.tags.is_empty() {
            writeln!(f)?;
        }
        if !self.comment.is_empty() {
            write!(f, "{{{}}} ", self.comment.replace('}', ")"))?;
        }
        write_line(f, &self.moves)?;
        if !self.moves.is_empty() {
            f.write_str(" ")?;
        }
        writeln!(f, "{}", self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pgn::nag::Nag;

    fn mv(san: &'static str) -> Move<'static> {
        Move::owned(san).expect("long enough")
    }

    fn sample() -> Game<'static> {
        let white = mv("e4")
            .with_nag(Nag::GOOD_MOVE)
            .with_variation(MoveText::pair([mv("d4"), mv("d5")], 1));
        let moves = vec![
            MoveText::new(1, Some(white), Some(mv("e5").with_comment("solid")))
                .expect("non-empty"),
            MoveText::new(2, Some(mv("Nf3")), None).expect("non-empty"),
        ];
        Game::new(
            vec![
                TagPair::new("White", "A"),
                TagPair::new("Black", "B"),
            ],
            moves,
            GameResult::White,
        )
    }

    #[test]
    fn test_result() {
        assert_eq!("1/2-1/2".parse(), Ok(GameResult::Draw));
        assert_eq!(GameResult::from_ascii(b"1-1"), None);
        assert_eq!(GameResult::default().to_string(), "*");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample().to_string(),
            "[White \"A\"]\n[Black \"B\"]\n\n1. e4 $1 (1. d4 d5) 1... e5 {solid} 2. Nf3 1-0\n"
        );
        assert_eq!(Game::default().to_string(), "*\n");
    }

    #[test]
    fn test_tag_lookup() {
        let game = sample();
        assert_eq!(game.tag("Black").map(TagPair::value), Some(&b"B"[..]));
        assert!(game.tag("Event").is_none());
    }

    #[test]
    fn test_replay() {
        let fens = sample().replay().expect("playable");
        assert_eq!(fens.len(), 3);
        assert_eq!(
            fens[2],
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn test_replay_from_fen_tag() {
        let game = Game::new(
            vec![TagPair::new("FEN", "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1")],
            MoveText::pair([mv("e4"), mv("Kd7")], 1),
            GameResult::Unknown,
        );
        assert_eq!(
            game.replay().expect("playable"),
            [
                "4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1",
                "8/3k4/8/8/4P3/8/8/4K3 w - - 1 2"
            ]
        );

        let broken = Game::new(
            vec![TagPair::new("FEN", "8/8 w - - 0 1")],
            Vec::new(),
            GameResult::Unknown,
        );
        assert!(matches!(broken.replay(), Err(ReplayError::InvalidFen(_))));
    }

    #[test]
    fn test_replay_reports_ply() {
        let game = Game::new(
            Vec::new(),
            MoveText::pair([mv("e4"), mv("e5"), mv("Ke3")], 1),
            GameResult::Unknown,
        );
        match game.replay() {
            Err(ReplayError::Ply { ply, san, .. }) => {
                assert_eq!(ply, 2);
                assert_eq!(san, "Ke3");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
