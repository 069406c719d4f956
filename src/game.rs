/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::board::{GameOutcome, Move, Position};

/// A game in progress: the current position plus the move history, with
/// undo and redo.
///
/// The history is a list of positions with a cursor into it. Making a move
/// first discards any positions ahead of the cursor (the redo tail), so the
/// history always describes a single line of play.
#[derive(Clone, Debug)]
pub struct Game {
    history: Vec<Position>,
    moves: Vec<Move>,
    cursor: usize,
}

impl Game {
    /// Starts a new game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::STANDARD)
    }

    /// Starts a game from an arbitrary position.
    pub fn from_position(position: Position) -> Self {
        Self {
            history: vec![position],
            moves: Vec::new(),
            cursor: 0,
        }
    }

    /// Number of moves played up to the cursor.
    pub fn moves_played(&self) -> usize {
        self.cursor
    }

    /// The position at the cursor.
    pub fn current_position(&self) -> &Position {
        &self.history[self.cursor]
    }

    /// The outcome at the cursor.
    pub fn current_status(&self) -> GameOutcome {
        self.current_position().outcome()
    }

    /// The move that led to the current position, if any move has been
    /// played.
    pub fn most_recent_move(&self) -> Option<Move> {
        self.cursor.checked_sub(1).map(|i| self.moves[i])
    }

    /// Plays `mv` if it is legal, discarding any undone moves.
    ///
    /// Returns `false` (and changes nothing) if the move is illegal.
    pub fn make_move(&mut self, mv: Move) -> bool {
        if !self.current_position().is_legal(mv) {
            return false;
        }

        self.history.truncate(self.cursor + 1);
        self.moves.truncate(self.cursor);

        self.history.push(self.current_position().with_move(mv));
        self.moves.push(mv);
        self.cursor += 1;

        true
    }

    /// Steps one move back, returning the move that was undone.
    pub fn undo_move(&mut self) -> Option<Move> {
        let undone = self.most_recent_move()?;
        self.cursor -= 1;
        Some(undone)
    }

    /// Steps one move forward again, returning the move that was replayed.
    pub fn redo_move(&mut self) -> Option<Move> {
        if self.cursor + 1 >= self.history.len() {
            return None;
        }
        self.cursor += 1;
        self.most_recent_move()
    }

    /// Moves the cursor back to the first position without forgetting the
    /// line, so it can be replayed with [`Self::redo_move`].
    pub fn reset_to_start(&mut self) {
        self.cursor = 0;
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{GameOutcome, Square};

    #[test]
    fn rejects_illegal_moves() {
        let mut game = Game::new();
        assert!(!game.make_move(Move::new(Square::B1, Square::B2)));
        assert_eq!(game.moves_played(), 0);
    }

    #[test]
    fn make_undo_redo_round_trip() {
        let mut game = Game::new();
        let start = *game.current_position();

        let mv = game.current_position().legal_moves()[0];
        assert!(game.make_move(mv));
        assert_eq!(game.moves_played(), 1);
        assert_eq!(game.most_recent_move(), Some(mv));

        assert_eq!(game.undo_move(), Some(mv));
        assert_eq!(game.current_position(), &start);
        assert_eq!(game.moves_played(), 0);

        assert_eq!(game.redo_move(), Some(mv));
        assert_eq!(game.current_position(), &start.with_move(mv));
    }

    #[test]
    fn making_a_move_truncates_the_redo_tail() {
        let mut game = Game::new();

        let first = game.current_position().legal_moves()[0];
        game.make_move(first);
        game.undo_move();

        let second = game.current_position().legal_moves()[1];
        assert!(game.make_move(second));
        assert_eq!(game.redo_move(), None, "the old line is gone");
        assert_eq!(game.most_recent_move(), Some(second));
    }

    #[test]
    fn fresh_game_is_ongoing() {
        let mut game = Game::new();
        assert_eq!(game.current_status(), GameOutcome::Ongoing);
        assert_eq!(game.most_recent_move(), None);
        assert_eq!(game.undo_move(), None);
        assert_eq!(game.moves_played(), 0);
    }
}
