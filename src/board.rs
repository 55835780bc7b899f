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

//! Piece placement and origin search.
//!
//! SAN names the destination of a move but only as much of the origin as is
//! needed to tell candidates apart. The [`Board`] recovers the origin by
//! searching outward from the destination, using the geometry of the moving
//! piece.
//!
//! # Examples
//!
//! ```
//! use pgnkit::{Board, Color, Square};
//! use pgnkit::board::Origin;
//!
//! let mut board = Board::default();
//! let to: Square = "f3".parse()?;
//! let moved = board.move_knight(Color::White, to, Origin::ANY, &mut ())?;
//! assert_eq!(moved.from, "g1".parse::<Square>()?);
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

use std::fmt;

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::{
    castling_side::CastlingSide,
    color::Color,
    role::Role,
    square::Square,
    types::Piece,
};

/// Notified by the board whenever a rook leaves a square, whether it moved
/// away or was captured.
pub trait Observer {
    fn rook_removed(&mut self, square: Square, rook: Piece);
}

impl Observer for () {
    fn rook_removed(&mut self, _square: Square, _rook: Piece) {}
}

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Errors when a move cannot be placed on the board.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BoardError {
    #[error("cannot find {piece} that can move to {to}")]
    PieceNotFound { piece: Piece, to: Square },
    #[error("ambiguous move: more than one {piece} can move to {to}")]
    Ambiguous { piece: Piece, to: Square },
    #[error("no piece to capture on {to}")]
    NothingToCapture { to: Square },
    #[error("pawn move to {to} requires a promotion")]
    MissingPromotion { to: Square },
    #[error("pawn move to {to} cannot promote")]
    UnexpectedPromotion { to: Square },
    #[error(
        "illegal state: {color} cannot castle {side}, king or rook is not on its original square"
    )]
    IllegalCastling { color: Color, side: CastlingSide },
}

/// Partial origin given by a SAN move, like the `b` in `Nbd7`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Origin {
    pub file: Option<u8>,
    pub rank: Option<u8>,
}

impl Origin {
    /// No hint at all.
    pub const ANY: Origin = Origin {
        file: None,
        rank: None,
    };

    pub fn matches(self, sq: Square) -> bool {
        self.file.is_none_or(|file| file == sq.file())
            && self.rank.is_none_or(|rank| rank == sq.rank())
    }
}

/// Where a piece came from and what it captured.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Moved {
    pub from: Square,
    pub captured: Option<Piece>,
}

/// Outcome of a pawn move.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PawnMove {
    pub from: Square,
    pub captured: Option<Piece>,
    /// The pawn advanced two ranks from its starting rank.
    pub double_step: bool,
}

/// An 8x8 grid of pieces.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Board {
    squares: [Option<Piece>; 64],
}

impl Board {
    pub fn empty() -> Board {
        Board {
            squares: [None; 64],
        }
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    /// Writes a square and returns its previous occupant. This is the only
    /// path that modifies the board, so the observer sees every rook that
    /// is moved or captured.
    pub fn put<O: Observer>(
        &mut self,
        sq: Square,
        piece: Option<Piece>,
        observer: &mut O,
    ) -> Option<Piece> {
        let previous = std::mem::replace(&mut self.squares[sq.index()], piece);
        if let Some(rook) = previous.filter(|p| p.role == Role::Rook) {
            observer.rook_removed(sq, rook);
        }
        previous
    }

    /// Finds the square of the king of `color`, if there is one.
    pub fn king_of(&self, color: Color) -> Option<Square> {
        (0..64)
            .map(|i| Square::new(i % 8, i / 8))
            .find(|&sq| self.piece_at(sq) == Some(color.king()))
    }

    pub fn move_knight<O: Observer>(
        &mut self,
        color: Color,
        to: Square,
        origin: Origin,
        observer: &mut O,
    ) -> Result<Moved, BoardError> {
        self.move_piece(Role::Knight.of(color), to, origin, observer)
    }

    pub fn move_bishop<O: Observer>(
        &mut self,
        color: Color,
        to: Square,
        origin: Origin,
        observer: &mut O,
    ) -> Result<Moved, BoardError> {
        self.move_piece(Role::Bishop.of(color), to, origin, observer)
    }

    pub fn move_rook<O: Observer>(
        &mut self,
        color: Color,
        to: Square,
        origin: Origin,
        observer: &mut O,
    ) -> Result<Moved, BoardError> {
        self.move_piece(Role::Rook.of(color), to, origin, observer)
    }

    pub fn move_queen<O: Observer>(
        &mut self,
        color: Color,
        to: Square,
        origin: Origin,
        observer: &mut O,
    ) -> Result<Moved, BoardError> {
        self.move_piece(Role::Queen.of(color), to, origin, observer)
    }

    pub fn move_king<O: Observer>(
        &mut self,
        color: Color,
        to: Square,
        observer: &mut O,
    ) -> Result<Moved, BoardError> {
        self.move_piece(color.king(), to, Origin::ANY, observer)
    }

    /// Moves a piece other than a pawn to `to`, searching for its origin.
    pub fn move_piece<O: Observer>(
        &mut self,
        piece: Piece,
        to: Square,
        origin: Origin,
        observer: &mut O,
    ) -> Result<Moved, BoardError> {
        debug_assert_ne!(piece.role, Role::Pawn);
        let from = self.find_origin(piece, to, origin)?;
        self.put(from, None, observer);
        let captured = self.put(to, Some(piece), observer);
        Ok(Moved { from, captured })
    }

    /// Finds the unique square from which `piece` can reach `to`.
    pub fn find_origin(
        &self,
        piece: Piece,
        to: Square,
        origin: Origin,
    ) -> Result<Square, BoardError> {
        let candidates = self.candidates(piece, to, origin);
        match candidates[..] {
            [] => Err(BoardError::PieceNotFound { piece, to }),
            [from] => Ok(from),
            _ => {
                // SAN does not disambiguate against pinned pieces.
                let unpinned: ArrayVec<Square, 8> = candidates
                    .iter()
                    .copied()
                    .filter(|&from| !self.exposes_king(piece, from, to))
                    .collect();
                match unpinned[..] {
                    [from] => Ok(from),
                    _ => Err(BoardError::Ambiguous { piece, to }),
                }
            }
        }
    }

    fn candidates(&self, piece: Piece, to: Square, origin: Origin) -> ArrayVec<Square, 8> {
        let mut candidates = ArrayVec::new();
        match piece.role {
            Role::Knight | Role::King => {
                let deltas = if piece.role == Role::Knight {
                    &KNIGHT_DELTAS
                } else {
                    &KING_DELTAS
                };
                for &(df, dr) in deltas {
                    if let Some(sq) = to.offset(df, dr) {
                        if self.piece_at(sq) == Some(piece) && origin.matches(sq) {
                            candidates.push(sq);
                        }
                    }
                }
            }
            Role::Bishop | Role::Rook | Role::Queen => {
                for &(df, dr) in piece.role.rays() {
                    if let Some(sq) = self.first_occupied(to, df, dr) {
                        if self.piece_at(sq) == Some(piece) && origin.matches(sq) {
                            candidates.push(sq);
                        }
                    }
                }
            }
            Role::Pawn => {}
        }
        candidates
    }

    /// Walks from `from` (exclusive) along a ray and returns the first
    /// occupied square.
    fn first_occupied(&self, from: Square, df: i8, dr: i8) -> Option<Square> {
        let mut sq = from;
        loop {
            sq = sq.offset(df, dr)?;
            if self.piece_at(sq).is_some() {
                return Some(sq);
            }
        }
    }

    /// Tests if moving `piece` from `from` to `to` would open a line from an
    /// enemy slider to the own king.
    fn exposes_king(&self, piece: Piece, from: Square, to: Square) -> bool {
        let Some(king) = self.king_of(piece.color) else {
            return false;
        };
        let df = from.file() as i8 - king.file() as i8;
        let dr = from.rank() as i8 - king.rank() as i8;
        if (df, dr) == (0, 0) || (df != 0 && dr != 0 && df.abs() != dr.abs()) {
            return false;
        }
        let (df, dr) = (df.signum(), dr.signum());

        let mut after = self.clone();
        after.squares[from.index()] = None;
        after.squares[to.index()] = Some(piece);

        let Some(sq) = after.first_occupied(king, df, dr) else {
            return false;
        };
        match after.piece_at(sq) {
            Some(attacker) if attacker.color != piece.color => {
                let slides_here = if df == 0 || dr == 0 {
                    Role::Rook
                } else {
                    Role::Bishop
                };
                attacker.role == slides_here || attacker.role == Role::Queen
            }
            _ => false,
        }
    }

    /// Moves a pawn of `color` to `to`. A `from_file` other than the file
    /// of `to` makes it a capture, possibly en passant against `ep_square`.
    pub fn move_pawn<O: Observer>(
        &mut self,
        color: Color,
        to: Square,
        from_file: Option<u8>,
        promotion: Option<Role>,
        ep_square: Option<Square>,
        observer: &mut O,
    ) -> Result<PawnMove, BoardError> {
        let pawn = color.pawn();
        let back = -color.forward();
        let not_found = BoardError::PieceNotFound { piece: pawn, to };

        let last_rank = (!color).backrank();
        match (to.rank() == last_rank, promotion) {
            (true, None) => return Err(BoardError::MissingPromotion { to }),
            (false, Some(_)) => return Err(BoardError::UnexpectedPromotion { to }),
            _ => (),
        }
        let placed = Piece {
            color,
            role: if to.rank() == last_rank {
                promotion.unwrap_or(Role::Queen)
            } else {
                Role::Pawn
            },
        };

        match from_file.filter(|&file| file != to.file()) {
            Some(file) => {
                let from = Square::from_coords(file as i8, to.rank() as i8 + back)
                    .filter(|&sq| self.piece_at(sq) == Some(pawn) && sq.distance(to) == 1)
                    .ok_or(not_found)?;

                let captured = if self.piece_at(to).is_some() {
                    self.put(to, Some(placed), observer)
                } else if Some(to) == ep_square {
                    let victim = Square::new(to.file(), from.rank());
                    let captured = self.put(victim, None, observer);
                    self.put(to, Some(placed), observer);
                    captured
                } else {
                    return Err(BoardError::NothingToCapture { to });
                };
                self.put(from, None, observer);

                Ok(PawnMove {
                    from,
                    captured,
                    double_step: false,
                })
            }
            None => {
                if self.piece_at(to).is_some() {
                    return Err(not_found);
                }
                let one = to.offset(0, back).ok_or(not_found.clone())?;
                let (from, double_step) = if self.piece_at(one) == Some(pawn) {
                    (one, false)
                } else {
                    let double_rank = color.fold(3, 4);
                    let two = one.offset(0, back);
                    match two {
                        Some(two)
                            if to.rank() == double_rank
                                && self.piece_at(one).is_none()
                                && self.piece_at(two) == Some(pawn) =>
                        {
                            (two, true)
                        }
                        _ => return Err(not_found),
                    }
                };
                self.put(from, None, observer);
                self.put(to, Some(placed), observer);

                Ok(PawnMove {
                    from,
                    captured: None,
                    double_step,
                })
            }
        }
    }

    /// Castles `color` to `side`, relocating king and rook.
    pub fn castle<O: Observer>(
        &mut self,
        color: Color,
        side: CastlingSide,
        observer: &mut O,
    ) -> Result<(), BoardError> {
        let illegal = BoardError::IllegalCastling { color, side };

        let king_from = CastlingSide::king_from(color);
        let rook_from = side.rook_from(color);
        if self.piece_at(king_from) != Some(color.king())
            || self.piece_at(rook_from) != Some(color.rook())
        {
            return Err(illegal);
        }

        let (low, high) = if king_from < rook_from {
            (king_from, rook_from)
        } else {
            (rook_from, king_from)
        };
        let blocked = (low.file() + 1..high.file())
            .any(|file| self.piece_at(Square::new(file, low.rank())).is_some());
        if blocked {
            return Err(illegal);
        }

        self.put(king_from, None, observer);
        self.put(rook_from, None, observer);
        self.put(side.king_to(color), Some(color.king()), observer);
        self.put(side.rook_to(color), Some(color.rook()), observer);
        Ok(())
    }

    /// Renders the piece placement part of a FEN.
    ///
    /// # Examples
    ///
    /// ```
    /// use pgnkit::Board;
    ///
    /// assert_eq!(
    ///     Board::default().board_fen(),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
    /// );
    /// ```
    pub fn board_fen(&self) -> String {
        let mut fen = String::with_capacity(64 + 7);

        for rank in (0..8).rev() {
            let mut empty = 0;

            for file in 0..8 {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        fen.push(piece.char());
                    }
                    None => empty += 1,
                }
            }

            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }

            if rank > 0 {
                fen.push('/');
            }
        }

        fen
    }
}

impl Default for Board {
    /// The standard starting position.
    fn default() -> Board {
        let mut board = Board::empty();
        let back = [
            Role::Rook,
            Role::Knight,
            Role::Bishop,
            Role::Queen,
            Role::King,
            Role::Bishop,
            Role::Knight,
            Role::Rook,
        ];
        for (file, role) in (0..8).zip(back) {
            for color in Color::ALL {
                let pawn_rank = (color.backrank() as i8 + color.forward()) as u8;
                board.squares[Square::new(file, color.backrank()).index()] = Some(role.of(color));
                board.squares[Square::new(file, pawn_rank).index()] = Some(color.pawn());
            }
        }
        board
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Board").field(&self.board_fen()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().expect("valid square")
    }

    fn board(placement: &[(&str, char)]) -> Board {
        let mut board = Board::empty();
        for &(name, ch) in placement {
            board.put(sq(name), Piece::from_char(ch), &mut ());
        }
        board
    }

    #[derive(Default)]
    struct Recorder(Vec<(Square, Piece)>);

    impl Observer for Recorder {
        fn rook_removed(&mut self, square: Square, rook: Piece) {
            self.0.push((square, rook));
        }
    }

    #[test]
    fn test_default_board_fen() {
        assert_eq!(
            Board::default().board_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
        assert_eq!(Board::empty().board_fen(), "8/8/8/8/8/8/8/8");
    }

    #[test]
    fn test_knight_with_file_hint() {
        let mut b = board(&[("b8", 'n'), ("f6", 'n')]);
        assert_eq!(
            b.move_knight(Color::Black, sq("d7"), Origin::ANY, &mut ()),
            Err(BoardError::Ambiguous {
                piece: Role::Knight.of(Color::Black),
                to: sq("d7")
            })
        );
        let origin = Origin {
            file: Some(1),
            rank: None,
        };
        let moved = b.move_knight(Color::Black, sq("d7"), origin, &mut ()).expect("nbd7");
        assert_eq!(moved.from, sq("b8"));
        assert_eq!(b.piece_at(sq("b8")), None);
        assert_eq!(b.piece_at(sq("d7")), Piece::from_char('n'));
    }

    #[test]
    fn test_knight_not_found() {
        let mut b = board(&[("g1", 'N')]);
        assert_eq!(
            b.move_knight(Color::White, sq("e4"), Origin::ANY, &mut ()),
            Err(BoardError::PieceNotFound {
                piece: Role::Knight.of(Color::White),
                to: sq("e4")
            })
        );
    }

    #[test]
    fn test_sliders_are_blocked() {
        let mut b = board(&[("a1", 'R'), ("a4", 'P'), ("h8", 'R')]);
        // The rook on a1 is blocked by the pawn on a4.
        let moved = b.move_rook(Color::White, sq("a8"), Origin::ANY, &mut ()).expect("ra8");
        assert_eq!(moved.from, sq("h8"));

        let mut b = board(&[("c1", 'B'), ("d2", 'P')]);
        assert!(b.move_bishop(Color::White, sq("g5"), Origin::ANY, &mut ()).is_err());
    }

    #[test]
    fn test_queen_rank_hint() {
        let mut b = board(&[("h4", 'Q'), ("h1", 'Q'), ("a1", 'K'), ("a8", 'k')]);
        let origin = Origin {
            file: None,
            rank: Some(3),
        };
        let moved = b.move_queen(Color::White, sq("e1"), origin, &mut ()).expect("q4e1");
        assert_eq!(moved.from, sq("h4"));
    }

    #[test]
    fn test_pinned_candidate_is_skipped() {
        // The knight on c3 is pinned by the bishop on b4.
        let mut b = board(&[("e1", 'K'), ("c3", 'N'), ("b4", 'b'), ("g1", 'N')]);
        let moved = b.move_knight(Color::White, sq("e2"), Origin::ANY, &mut ()).expect("ne2");
        assert_eq!(moved.from, sq("g1"));
    }

    #[test]
    fn test_king_adjacent() {
        let mut b = board(&[("e1", 'K')]);
        assert!(b.move_king(Color::White, sq("e3"), &mut ()).is_err());
        assert_eq!(b.move_king(Color::White, sq("f2"), &mut ()).expect("kf2").from, sq("e1"));
    }

    #[test]
    fn test_pawn_moves() {
        let mut b = Board::default();
        let m = b.move_pawn(Color::White, sq("e4"), None, None, None, &mut ()).expect("e4");
        assert_eq!(m.from, sq("e2"));
        assert!(m.double_step);

        let m = b.move_pawn(Color::Black, sq("d6"), None, None, None, &mut ()).expect("d6");
        assert_eq!(m.from, sq("d7"));
        assert!(!m.double_step);

        assert!(b.move_pawn(Color::White, sq("e6"), None, None, None, &mut ()).is_err());
    }

    #[test]
    fn test_en_passant() {
        let mut b = board(&[("e5", 'P'), ("d5", 'p')]);
        let m = b
            .move_pawn(Color::White, sq("d6"), Some(4), None, Some(sq("d6")), &mut ())
            .expect("exd6");
        assert_eq!(m.from, sq("e5"));
        assert_eq!(m.captured, Piece::from_char('p'));
        assert_eq!(b.piece_at(sq("d5")), None);
        assert_eq!(b.piece_at(sq("d6")), Piece::from_char('P'));
    }

    #[test]
    fn test_promotion() {
        let mut b = board(&[("g7", 'P'), ("h8", 'r')]);
        assert_eq!(
            b.move_pawn(Color::White, sq("h8"), Some(6), None, None, &mut ()),
            Err(BoardError::MissingPromotion { to: sq("h8") })
        );
        let mut recorder = Recorder::default();
        let m = b
            .move_pawn(Color::White, sq("h8"), Some(6), Some(Role::Queen), None, &mut recorder)
            .expect("gxh8=Q");
        assert_eq!(m.captured, Piece::from_char('r'));
        assert_eq!(b.piece_at(sq("h8")), Piece::from_char('Q'));
        assert_eq!(recorder.0, vec![(sq("h8"), Role::Rook.of(Color::Black))]);
    }

    #[test]
    fn test_promotion_off_last_rank() {
        let mut b = board(&[("e2", 'P')]);
        assert_eq!(
            b.move_pawn(Color::White, sq("e1"), None, Some(Role::Queen), None, &mut ()),
            Err(BoardError::UnexpectedPromotion { to: sq("e1") })
        );
        assert_eq!(
            b.move_pawn(Color::White, sq("e3"), None, Some(Role::Queen), None, &mut ()),
            Err(BoardError::UnexpectedPromotion { to: sq("e3") })
        );
        assert_eq!(b.piece_at(sq("e2")), Piece::from_char('P'));
    }

    #[test]
    fn test_castle_notifies_observer() {
        let mut b = board(&[("e1", 'K'), ("h1", 'R'), ("a1", 'R')]);
        let mut recorder = Recorder::default();
        b.castle(Color::White, CastlingSide::KingSide, &mut recorder).expect("o-o");
        assert_eq!(b.piece_at(Square::G1), Piece::from_char('K'));
        assert_eq!(b.piece_at(Square::F1), Piece::from_char('R'));
        assert_eq!(b.piece_at(Square::H1), None);
        assert_eq!(recorder.0, vec![(Square::H1, Role::Rook.of(Color::White))]);
    }

    #[test]
    fn test_castle_illegal_state() {
        let mut b = board(&[("f1", 'K'), ("h1", 'R')]);
        assert_eq!(
            b.castle(Color::White, CastlingSide::KingSide, &mut ()),
            Err(BoardError::IllegalCastling {
                color: Color::White,
                side: CastlingSide::KingSide
            })
        );

        let mut b = board(&[("e8", 'k'), ("a8", 'r'), ("b8", 'n')]);
        assert!(b.castle(Color::Black, CastlingSide::QueenSide, &mut ()).is_err());
    }
}
