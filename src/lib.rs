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

//! Read chess games in PGN and replay them to FEN.
//!
//! # Examples
//!
//! Parse games and walk their movetext:
//!
//! ```
//! let pgn = b"[Event \"Casual\"]\n\n1. e4 e5 2. Nf3 {Develops} Nc6 (2... d6) 1-0\n";
//!
//! let games = pgnkit::parse(pgn)?;
//! assert_eq!(games.len(), 1);
//!
//! let game = &games[0];
//! assert_eq!(game.result(), pgnkit::GameResult::White);
//! assert_eq!(game.mainline().count(), 4);
//! # Ok::<_, pgnkit::SyntaxError>(())
//! ```
//!
//! Play moves in standard algebraic notation:
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
//!
//! Moves are only checked as far as needed to find the piece that makes
//! them. There is no legal move generation, and check is never detected.
//!
//! # Feature flags
//!
//! * `std`: Enables `std` support in the byte scanning dependencies.
//!   Enabled by default.

#![doc(html_root_url = "https://docs.rs/pgnkit/0.1.0")]
#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]
#![cfg_attr(docs_rs, feature(doc_auto_cfg))]

mod castling_side;
mod color;
mod role;
mod square;
mod types;

pub mod board;
pub mod fen;
pub mod filter;
pub mod pgn;
pub mod position;
pub mod san;

pub use castling_side::{CastlingSide, Castles};
pub use color::{Color, ParseColorError};
pub use role::Role;
pub use square::{ParseSquareError, Square};
pub use types::Piece;

pub use board::{Board, BoardError};
pub use fen::{Fen, FenError};
pub use pgn::{parse, read_games, Error, Game, GameResult, SyntaxError};
pub use position::{PlayError, Position};
pub use san::{ParseSanError, San};
