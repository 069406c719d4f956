/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Not, str::FromStr};

use anyhow::{bail, Result};

use super::{movegen, tables::CIRCLES, Bitboard, Square};

/// One of the two sides of the game.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Player {
    #[default]
    White,
    Black,
}

impl Player {
    /// The other player.
    #[inline(always)]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl Not for Player {
    type Output = Self;

    /// `!player` is the opponent; applying it twice gets back to `player`.
    #[inline(always)]
    fn not(self) -> Self {
        self.opponent()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "White"),
            Self::Black => write!(f, "Black"),
        }
    }
}

impl FromStr for Player {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" | "white" => Ok(Self::White),
            "b" | "black" => Ok(Self::Black),
            _ => bail!("invalid player {s:?}"),
        }
    }
}

/// How a game stands, or how it ended.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum GameOutcome {
    #[default]
    Ongoing,
    WhiteWins,
    BlackWins,
    Draw,
}

/// The pieces of both players.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Board {
    pub white: Bitboard,
    pub black: Bitboard,
}

impl Board {
    /// The standard starting material: White on columns B-G of rows 1 and 8,
    /// Black on rows 2-7 of columns A and H. Twelve pieces each.
    ///
    /// ```text
    /// 8| . w w w w w w .
    /// 7| b . . . . . . b
    /// 6| b . . . . . . b
    /// 5| b . . . . . . b
    /// 4| b . . . . . . b
    /// 3| b . . . . . . b
    /// 2| b . . . . . . b
    /// 1| . w w w w w w .
    /// ```
    pub const STANDARD: Self = Self {
        white: Bitboard::new(0x7E0000000000007E),
        black: Bitboard::new(0x0081818181818100),
    };

    /// Constructs a new [`Board`] from both players' pieces.
    ///
    /// The two sets must be disjoint.
    #[inline(always)]
    pub fn new(white: Bitboard, black: Bitboard) -> Self {
        debug_assert!(
            (white & black).is_empty(),
            "a square cannot hold pieces of both players"
        );
        Self { white, black }
    }

    /// The pieces of `player`.
    #[inline(always)]
    pub const fn pieces(&self, player: Player) -> Bitboard {
        match player {
            Player::White => self.white,
            Player::Black => self.black,
        }
    }

    /// All occupied squares.
    #[inline(always)]
    pub fn occupied(&self) -> Bitboard {
        self.white | self.black
    }

    /// Parses a board from an 8x8 character diagram, rank 8 first.
    ///
    /// `w`/`W` places a White piece, `b`/`B` a Black one, and anything else
    /// leaves the square empty. Newlines are ignored.
    pub fn from_diagram(diagram: &str) -> Result<Self> {
        let mut white = Bitboard::EMPTY;
        let mut black = Bitboard::EMPTY;
        let mut cells = diagram.chars().filter(|&ch| ch != '\n');

        for y in (0..8).rev() {
            for x in 0..8 {
                match cells.next() {
                    Some('w') | Some('W') => white |= Square::from_xy(x, y).bitboard(),
                    Some('b') | Some('B') => black |= Square::from_xy(x, y).bitboard(),
                    Some(_) => (),
                    None => bail!("board diagram ended early at {}", Square::from_xy(x, y)),
                }
            }
        }

        Ok(Self::new(white, black))
    }

    /// Serializes the board in FEN style: `P` for White, `p` for Black,
    /// digit runs for empty squares, ranks from 8 down to 1 joined by `/`.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for y in (0..8).rev() {
            let mut gap = 0;
            for x in 0..8 {
                let square = Square::from_xy(x, y);
                let piece = if self.white.contains(square) {
                    'P'
                } else if self.black.contains(square) {
                    'p'
                } else {
                    gap += 1;
                    continue;
                };

                if gap > 0 {
                    fen.push(char::from_digit(gap, 10).unwrap_or('8'));
                    gap = 0;
                }
                fen.push(piece);
            }
            if gap > 0 {
                fen.push(char::from_digit(gap, 10).unwrap_or('8'));
            }
            if y > 0 {
                fen.push('/');
            }
        }

        fen
    }

    /// Parses a board from the FEN-style text produced by [`Board::to_fen`].
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut white = Bitboard::EMPTY;
        let mut black = Bitboard::EMPTY;
        let mut x: u8 = 0;
        let mut y: u8 = 7;

        for ch in fen.trim().chars() {
            match ch {
                '/' => {
                    if y == 0 {
                        bail!("too many ranks in FEN {fen:?}");
                    }
                    x = 0;
                    y -= 1;
                    continue;
                }
                'P' | 'p' if x < 8 => {
                    let bit = Square::from_xy(x, y).bitboard();
                    if ch == 'P' {
                        white |= bit;
                    } else {
                        black |= bit;
                    }
                    x += 1;
                }
                '1'..='8' => {
                    x += ch as u8 - b'0';
                    if x > 8 {
                        bail!("rank overflow in FEN {fen:?}");
                    }
                }
                _ => bail!("unexpected character {ch:?} in FEN {fen:?}"),
            }
        }

        Ok(Self::new(white, black))
    }
}

impl fmt::Display for Board {
    /// Prints the board as an 8x8 grid of `w`, `b` and `.`, rank 8 first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..8).rev() {
            write!(f, "{}| ", y + 1)?;
            for x in 0..8 {
                let square = Square::from_xy(x, y);
                let ch = if self.white.contains(square) {
                    'w'
                } else if self.black.contains(square) {
                    'b'
                } else {
                    '.'
                };
                write!(f, "{ch}")?;
                if x < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, " +----------------\n   A B C D E F G H")
    }
}

/// A [`Board`] together with the player to move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    board: Board,
    to_move: Player,
}

impl Position {
    /// The standard starting position: [`Board::STANDARD`], White to move.
    pub const STANDARD: Self = Self {
        board: Board::STANDARD,
        to_move: Player::White,
    };

    /// Constructs a new [`Position`].
    #[inline(always)]
    pub const fn new(board: Board, to_move: Player) -> Self {
        Self { board, to_move }
    }

    /// The board of this position.
    #[inline(always)]
    pub const fn board(&self) -> Board {
        self.board
    }

    /// The player to move.
    #[inline(always)]
    pub const fn to_move(&self) -> Player {
        self.to_move
    }

    /// The mover's and the opponent's pieces, in that order.
    #[inline(always)]
    pub(crate) fn split(&self) -> (Bitboard, Bitboard) {
        (
            self.board.pieces(self.to_move),
            self.board.pieces(self.to_move.opponent()),
        )
    }

    /// Derives the outcome of the game at this position.
    ///
    /// The mover wins by connecting all their pieces; if both sides are
    /// connected at once (a capture can connect the opponent), or the mover
    /// has no legal move, the game is drawn.
    pub fn outcome(&self) -> GameOutcome {
        let white_together = is_connected(self.board.white);
        let black_together = is_connected(self.board.black);

        if white_together && !black_together {
            return GameOutcome::WhiteWins;
        }
        if black_together && !white_together {
            return GameOutcome::BlackWins;
        }

        let (friends, enemies) = self.split();
        if (white_together && black_together) || movegen::has_no_legal_moves(friends, enemies) {
            return GameOutcome::Draw;
        }

        GameOutcome::Ongoing
    }
}

impl Default for Position {
    #[inline(always)]
    fn default() -> Self {
        Self::STANDARD
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.board)?;
        write!(f, "{} to move", self.to_move)
    }
}

/// Returns `true` if all set bits of `board` form one group under king-move
/// adjacency. Empty and single-piece boards count as connected.
pub fn is_connected(board: Bitboard) -> bool {
    if board.is_empty() {
        return true;
    }

    // Flood-fill outward from the lowest piece, one ring of neighbours per
    // pass, until the group stops growing.
    let mut group = board.lsb();
    let mut frontier = group;

    while !frontier.is_empty() {
        let mut grown = Bitboard::EMPTY;
        let mut scan = frontier;
        while !scan.is_empty() {
            grown |= CIRCLES[scan.pop_lsb().to_square().index()][1];
        }

        frontier = grown & board & !group;
        group |= frontier;
    }

    group == board
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_is_involutive() {
        assert_eq!(!Player::White, Player::Black);
        assert_eq!(!!Player::Black, Player::Black);
    }

    #[test]
    fn standard_board_matches_its_diagram() {
        let parsed = Board::from_diagram(
            ".wwwwww.\n\
             b......b\n\
             b......b\n\
             b......b\n\
             b......b\n\
             b......b\n\
             b......b\n\
             .wwwwww.",
        )
        .unwrap();

        assert_eq!(parsed, Board::STANDARD);
        assert_eq!(Board::STANDARD.white.population(), 12);
        assert_eq!(Board::STANDARD.black.population(), 12);
        assert!((Board::STANDARD.white & Board::STANDARD.black).is_empty());
    }

    #[test]
    fn fen_round_trip() {
        let fen = Board::STANDARD.to_fen();
        assert_eq!(fen, "1PPPPPP1/p6p/p6p/p6p/p6p/p6p/p6p/1PPPPPP1");
        assert_eq!(Board::from_fen(&fen).unwrap(), Board::STANDARD);
    }

    #[test]
    fn fen_rejects_garbage() {
        assert!(Board::from_fen("9/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("K7/8/8/8/8/8/8/8").is_err());
    }

    #[test]
    fn connectivity_of_small_groups() {
        assert!(is_connected(Bitboard::EMPTY));
        assert!(is_connected(Square::D4.bitboard()));

        // Diagonal touch counts.
        assert!(is_connected(
            Square::D4.bitboard() | Square::E5.bitboard() | Square::F6.bitboard()
        ));

        // A one-square gap does not.
        assert!(!is_connected(Square::D4.bitboard() | Square::D6.bitboard()));
    }

    #[test]
    fn starting_rows_are_connected_but_sides_are_not() {
        assert!(!is_connected(Board::STANDARD.white));
        assert!(!is_connected(Board::STANDARD.black));
        assert_eq!(Position::STANDARD.outcome(), GameOutcome::Ongoing);
    }

    #[test]
    fn connected_white_wins() {
        let board = Board::from_diagram(
            "........\n\
             ........\n\
             ...ww...\n\
             ...ww...\n\
             ........\n\
             .b......\n\
             ........\n\
             ......b.",
        )
        .unwrap();

        let position = Position::new(board, Player::White);
        assert_eq!(position.outcome(), GameOutcome::WhiteWins);
    }

    #[test]
    fn both_connected_is_a_draw() {
        let board = Board::from_diagram(
            "........\n\
             ........\n\
             ...ww...\n\
             ...ww...\n\
             .bb.....\n\
             .bb.....\n\
             ........\n\
             ........",
        )
        .unwrap();

        assert_eq!(
            Position::new(board, Player::White).outcome(),
            GameOutcome::Draw
        );
        assert_eq!(
            Position::new(board, Player::Black).outcome(),
            GameOutcome::Draw
        );
    }
}
