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

//! Read games in [PGN](http://www.saremba.de/chessgml/standards/pgn/pgn-complete.htm).
//!
//! The [`Lexer`] splits the input into tokens, the [`Parser`] assembles
//! them into [`Game`]s. Parsed entities borrow from the input; call
//! [`Game::into_owned()`] to keep them around.
//!
//! # Examples
//!
//! ```
//! use pgnkit::pgn;
//!
//! let pgn = b"[White \"Kasparov\"]\n1. e4 {The king pawn} e5 $1 (1... c5) 1/2-1/2";
//! let games = pgn::parse(pgn)?;
//!
//! let game = &games[0];
//! assert_eq!(game.tag("White").map(|tag| tag.value()), Some(&b"Kasparov"[..]));
//! assert_eq!(game.result(), pgn::GameResult::Draw);
//!
//! let e5 = game.moves()[0].black().expect("black move");
//! assert_eq!(e5.nags(), &[pgn::Nag::GOOD_MOVE]);
//! assert_eq!(e5.variations().len(), 1);
//! # Ok::<_, pgn::SyntaxError>(())
//! ```

mod game;
mod lexer;
mod movetext;
mod nag;
mod parser;
mod tag;

pub use game::{Game, GameResult, ParseGameResultError, ReplayError};
pub use lexer::{is_move_boundary, LexError, Lexer, Location, Token, TokenKind};
pub use movetext::{Move, MoveError, MoveText};
pub use nag::{InvalidNag, Nag};
pub use parser::{
    parse, read_games, Error, ErrorPolicy, Parser, Skipped, SyntaxError, SyntaxErrorKind,
};
pub use tag::TagPair;
