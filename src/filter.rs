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

//! Predicates over parsed games.
//!
//! # Examples
//!
//! ```
//! use pgnkit::{
//!     filter::{GameFilter, MoveCount, TagFilter},
//!     pgn,
//! };
//!
//! let games = pgn::parse(b"[White \"Tal\"]\n1. e4 e5 2. Nf3 *\n[White \"Petrosian\"]\n1. c4 *")?;
//! let filter = [
//!     Box::new(MoveCount::AtLeast(2)) as Box<dyn GameFilter>,
//!     Box::new(TagFilter::new("White", "Tal")),
//! ];
//!
//! let kept: Vec<_> = games.iter().filter(|game| filter.accept(game)).collect();
//! assert_eq!(kept.len(), 1);
//! # Ok::<_, pgn::SyntaxError>(())
//! ```

use std::borrow::Cow;

use crate::pgn::Game;

/// Decides whether a game is kept.
pub trait GameFilter {
    fn accept(&self, game: &Game<'_>) -> bool;
}

/// Compares the number of numbered moves of the mainline, as given by
/// [`Game::moves()`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MoveCount {
    Exactly(usize),
    LessThan(usize),
    AtMost(usize),
    GreaterThan(usize),
    AtLeast(usize),
}

impl MoveCount {
    pub fn matches(self, moves: usize) -> bool {
        match self {
            MoveCount::Exactly(n) => moves == n,
            MoveCount::LessThan(n) => moves < n,
            MoveCount::AtMost(n) => moves <= n,
            MoveCount::GreaterThan(n) => moves > n,
            MoveCount::AtLeast(n) => moves >= n,
        }
    }
}

impl GameFilter for MoveCount {
    fn accept(&self, game: &Game<'_>) -> bool {
        self.matches(game.moves().len())
    }
}

/// Keeps games that have a tag pair with the given name and value.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TagFilter {
    name: Cow<'static, str>,
    value: Cow<'static, str>,
}

impl TagFilter {
    pub fn new<N, V>(name: N, value: V) -> TagFilter
    where
        N: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
    {
        TagFilter {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl GameFilter for TagFilter {
    fn accept(&self, game: &Game<'_>) -> bool {
        game.tags()
            .iter()
            .any(|tag| tag.is(&self.name) && tag.value() == self.value.as_bytes())
    }
}

impl<F: GameFilter + ?Sized> GameFilter for &F {
    fn accept(&self, game: &Game<'_>) -> bool {
        (**self).accept(game)
    }
}

impl<F: GameFilter + ?Sized> GameFilter for Box<F> {
    fn accept(&self, game: &Game<'_>) -> bool {
        (**self).accept(game)
    }
}

/// No filter keeps everything.
impl<F: GameFilter> GameFilter for Option<F> {
    fn accept(&self, game: &Game<'_>) -> bool {
        self.as_ref().is_none_or(|filter| filter.accept(game))
    }
}

/// Keeps games accepted by every filter.
impl<F: GameFilter> GameFilter for [F] {
    fn accept(&self, game: &Game<'_>) -> bool {
        self.iter().all(|filter| filter.accept(game))
    }
}

impl<F: GameFilter, const N: usize> GameFilter for [F; N] {
    fn accept(&self, game: &Game<'_>) -> bool {
        self[..].accept(game)
    }
}

impl<F: GameFilter> GameFilter for Vec<F> {
    fn accept(&self, game: &Game<'_>) -> bool {
        self[..].accept(game)
    }
}
