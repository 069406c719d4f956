/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! A bitboard engine and position analyzer for Romanian checkers.
//!
//! Both players try to gather all of their pieces into one group connected
//! king-style; a piece moves along a row, column or diagonal by exactly as
//! many squares as there are pieces on that line, may jump its own pieces
//! but not the opponent's, and captures by landing on an opponent's piece.
//!
//! The crate provides the full rules layer ([`Position`], [`Move`],
//! [`Game`]) on top of plain 64-bit [`Bitboard`]s, plus a negamax searcher
//! behind three analysis front ends: fixed-depth [`analyze_position`],
//! difficulty-scaled [`analyze_with_ai_level`], and the cancellable
//! [`GameAnalyzer`] for "think until told otherwise" analysis.
//!
//! ```
//! use tabla::{analyze_position, Position};
//!
//! let analysis = analyze_position(&Position::STANDARD, 3);
//! let best = analysis.best_move.expect("the starting position is playable");
//! assert!(Position::STANDARD.is_legal(best));
//! ```

/// Fixed-depth and per-move analysis, softmax selection, difficulty levels.
mod analysis;

/// The long-running cancellable analyzer.
mod analyzer;

/// Board representation, move generation and game rules.
mod board;

/// Static evaluation of leaf positions.
mod eval;

/// Move history with undo/redo.
mod game;

/// The negamax searcher.
mod search;

/// The transposition table.
mod ttable;

pub use analysis::{
    analyze_available_moves, analyze_position, analyze_with_ai_level,
    select_analysis_with_softmax, select_analysis_with_softmax_using, PositionAnalysis,
};
pub use analyzer::{GameAnalyzer, ReportCallback, StopHandle};
pub use board::{
    is_connected, perft, splitperft, Bitboard, Board, GameOutcome, Move, Player, Position,
    Square, MAX_PIECES,
};
pub use eval::{Score, WIN};
pub use game::Game;
