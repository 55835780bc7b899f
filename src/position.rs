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

//! Replay SAN moves and track the state around the board.
//!
//! A [`Position`] does not check legality. It finds the piece a SAN move
//! refers to, moves it, and keeps castling rights, the en passant square
//! and the move counters up to date.
//!
//! # Examples
//!
//! ```
//! use pgnkit::Position;
//!
//! let mut pos = Position::default();
//! assert_eq!(
//!     pos.play("d4")?,
//!     "rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 1"
//! );
//! assert_eq!(
//!     pos.play("Nf6")?,
//!     "rnbqkb1r/pppppppp/5n2/8/3P4/8/PPP1PPPP/RNBQKBNR w KQkq - 1 2"
//! );
//! # Ok::<_, pgnkit::PlayError>(())
//! ```

use std::{fmt, str::FromStr};

use thiserror::Error;
use tracing::trace;

use crate::{
    board::{Board, BoardError, Observer, Origin},
    castling_side::Castles,
    color::Color,
    fen::{Fen, FenError},
    role::Role,
    san::{ParseSanError, San},
    square::Square,
    types::Piece,
};

/// Error when a move cannot be played.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PlayError {
    #[error("invalid san: {san:?}")]
    InvalidSan { san: String, source: ParseSanError },
    #[error(transparent)]
    Board(#[from] BoardError),
}

impl Observer for Castles {
    fn rook_removed(&mut self, square: Square, _rook: Piece) {
        self.remove(Castles::for_rook_square(square));
    }
}

/// Board, side to move, castling rights, en passant square and move
/// counters.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Position {
    board: Board,
    turn: Color,
    castles: Castles,
    ep_square: Option<Square>,
    halfmove_clock: u32,
    fullmoves: u32,
}

impl Default for Position {
    fn default() -> Position {
        Position::from_setup(Fen::default())
    }
}

impl Position {
    pub fn from_setup(setup: Fen) -> Position {
        Position {
            board: setup.board,
            turn: setup.turn,
            castles: setup.castles,
            ep_square: setup.ep_square,
            halfmove_clock: setup.halfmove_clock,
            fullmoves: setup.fullmoves,
        }
    }

    /// Parses a position from a FEN.
    ///
    /// # Errors
    ///
    /// See [`Fen::from_ascii()`].
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        Fen::from_ascii(fen.as_bytes()).map(Position::from_setup)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn castles(&self) -> Castles {
        self.castles
    }

    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmoves(&self) -> u32 {
        self.fullmoves
    }

    pub fn to_setup(&self) -> Fen {
        Fen {
            board: self.board.clone(),
            turn: self.turn,
            castles: self.castles,
            ep_square: self.ep_square,
            halfmove_clock: self.halfmove_clock,
            fullmoves: self.fullmoves,
        }
    }

    /// The current position as a FEN.
    pub fn fen(&self) -> String {
        self.to_string()
    }

    /// Plays a move given in SAN and returns the FEN of the resulting
    /// position.
    ///
    /// # Errors
    ///
    /// Fails if the SAN is malformed or does not fit the board. The
    /// position is left unchanged in that case.
    pub fn play(&mut self, san: &str) -> Result<String, PlayError> {
        self.play_ascii(san.as_bytes())
    }

    /// Same as [`Position::play()`], for SAN given as bytes.
    ///
    /// # Errors
    ///
    /// See [`Position::play()`].
    pub fn play_ascii(&mut self, san: &[u8]) -> Result<String, PlayError> {
        let parsed = San::from_ascii(san).map_err(|source| PlayError::InvalidSan {
            san: String::from_utf8_lossy(san).into_owned(),
            source,
        })?;
        self.play_san(parsed)?;
        let fen = self.fen();
        trace!(san = %parsed, %fen, "played");
        Ok(fen)
    }

    /// Plays a parsed move.
    ///
    /// # Errors
    ///
    /// Returns a [`BoardError`] if the move does not fit the board. The
    /// position is left unchanged in that case.
    pub fn play_san(&mut self, san: San) -> Result<(), BoardError> {
        let mut next = self.clone();
        next.apply(san)?;
        *self = next;
        Ok(())
    }

    /// Plays each move in turn and collects the FEN after every ply.
    ///
    /// # Errors
    ///
    /// Stops at the first move that cannot be played. The position keeps
    /// all moves played before it.
    pub fn replay<I>(&mut self, sans: I) -> Result<Vec<String>, PlayError>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        sans.into_iter()
            .map(|san| self.play_ascii(san.as_ref()))
            .collect()
    }

    fn apply(&mut self, san: San) -> Result<(), BoardError> {
        let turn = self.turn;
        let ep_square = self.ep_square.take();
        let mut castles = self.castles;

        match san {
            San::Castle(side) => {
                if !castles.contains(Castles::right(turn, side)) {
                    return Err(BoardError::IllegalCastling { color: turn, side });
                }
                self.board.castle(turn, side, &mut castles)?;
                castles.remove(Castles::of(turn));
                self.halfmove_clock = self.halfmove_clock.saturating_add(1);
            }
            San::Normal {
                role: Role::Pawn,
                file,
                to,
                promotion,
                ..
            } => {
                let pawn_move = self.board.move_pawn(
                    turn,
                    to,
                    file,
                    promotion,
                    ep_square,
                    &mut castles,
                )?;
                if pawn_move.double_step {
                    self.ep_square = to.offset(0, -turn.forward());
                }
                self.halfmove_clock = 0;
            }
            San::Normal {
                role,
                file,
                rank,
                to,
                ..
            } => {
                let origin = Origin { file, rank };
                let moved = self.board.move_piece(role.of(turn), to, origin, &mut castles)?;
                if role == Role::King {
                    castles.remove(Castles::of(turn));
                }
                if moved.captured.is_some() {
                    self.halfmove_clock = 0;
                } else {
                    self.halfmove_clock = self.halfmove_clock.saturating_add(1);
                }
            }
        }

        self.castles = castles;
        if turn.is_black() {
            self.fullmoves = self.fullmoves.saturating_add(1);
        }
        self.turn = !turn;
        Ok(())
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(fen: &str) -> Result<Position, FenError> {
        Position::from_fen(fen)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_setup())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::castling_side::CastlingSide;

    fn replay_from(fen: &str, sans: &[&str]) -> Position {
        let mut pos: Position = fen.parse().expect("valid fen");
        pos.replay(sans).expect("playable moves");
        pos
    }

    #[test]
    fn test_counters() {
        let mut pos = Position::default();
        pos.play("e4").expect("e4");
        pos.play("e5").expect("e5");
        assert_eq!(
            pos.play("Nf3").expect("Nf3"),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
        assert_eq!(pos.halfmove_clock(), 1);
        assert_eq!(pos.fullmoves(), 2);
        assert_eq!(pos.turn(), Color::Black);
    }

    #[test]
    fn test_en_passant() {
        let pos = replay_from(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &["e4", "a6", "e5", "d5"],
        );
        assert_eq!(pos.ep_square(), Some("d6".parse().expect("square")));

        let mut pos = pos;
        assert_eq!(
            pos.play("exd6").expect("en passant"),
            "rnbqkbnr/1pp1pppp/p2P4/8/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3"
        );
    }

    #[test]
    fn test_en_passant_expires() {
        let mut pos = replay_from(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &["e4", "a6", "e5", "d5", "a3", "a5"],
        );
        assert_eq!(pos.ep_square(), None);
        assert!(matches!(
            pos.play("exd6"),
            Err(PlayError::Board(BoardError::NothingToCapture { .. }))
        ));
    }

    #[test]
    fn test_castling_rights() {
        let mut pos: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().expect("fen");
        pos.play("Rxa8").expect("rook takes rook");
        assert_eq!(pos.castles(), Castles::WHITE_KING_SIDE | Castles::BLACK_KING_SIDE);

        pos.play("Kf8").expect("king moves");
        assert_eq!(pos.castles(), Castles::WHITE_KING_SIDE);

        pos.play("O-O").expect("castles");
        assert_eq!(pos.castles(), Castles::empty());
        assert_eq!(pos.fen(), "R4k2/8/8/8/8/8/8/5RK1 b - - 2 2");
    }

    #[test]
    fn test_castling_after_king_returns() {
        let mut pos: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().expect("fen");
        pos.replay(["Kf1", "Kd8", "Ke1", "Kd7"]).expect("king walks");
        assert_eq!(pos.castles(), Castles::empty());

        let before = pos.clone();
        assert_eq!(
            pos.play("O-O"),
            Err(PlayError::Board(BoardError::IllegalCastling {
                color: Color::White,
                side: CastlingSide::KingSide
            }))
        );
        assert_eq!(pos, before);
    }

    #[test]
    fn test_castling_after_rook_returns() {
        let mut pos: Position = "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1".parse().expect("fen");
        pos.replay(["Rb8", "Kd1", "Ra8", "Ke1"]).expect("pieces walk");
        assert_eq!(pos.castles(), Castles::BLACK_KING_SIDE);
        assert!(pos.play("O-O-O").is_err());
        pos.play("O-O").expect("king side right kept");
    }

    #[test]
    fn test_promotion() {
        let mut pos: Position = "8/4P3/8/8/8/8/k7/4K3 w - - 5 60".parse().expect("fen");
        assert_eq!(
            pos.play("e8=N").expect("promotes"),
            "4N3/8/8/8/8/8/k7/4K3 b - - 0 60"
        );
    }

    #[test]
    fn test_error_leaves_position_unchanged() {
        let mut pos = Position::default();
        let before = pos.clone();

        assert!(matches!(
            pos.play("Nd4"),
            Err(PlayError::Board(BoardError::PieceNotFound { .. }))
        ));
        assert!(matches!(pos.play("Xy9"), Err(PlayError::InvalidSan { .. })));
        assert!(matches!(
            pos.play("O-O"),
            Err(PlayError::Board(BoardError::IllegalCastling { .. }))
        ));
        assert_eq!(pos, before);
    }

    #[test]
    fn test_replay_stops_at_error() {
        let mut pos = Position::default();
        let err = pos.replay(["e4", "e5", "Bb6"]).unwrap_err();
        assert!(matches!(err, PlayError::Board(BoardError::PieceNotFound { .. })));
        assert_eq!(pos.fullmoves(), 2);
        assert_eq!(pos.turn(), Color::White);
    }

    #[test]
    fn test_ambiguous() {
        let mut pos: Position = "k7/8/8/8/8/8/4K3/R6R w - - 0 1".parse().expect("fen");
        assert!(matches!(
            pos.play("Rd1"),
            Err(PlayError::Board(BoardError::Ambiguous { .. }))
        ));
        assert_eq!(
            pos.play("Rad1").expect("disambiguated"),
            "k7/8/8/8/8/8/4K3/3R3R b - - 1 1"
        );
    }
}
