/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    board::{
        apply_move_bits, generate_moves, is_connected, is_move_set_legal, Bitboard, MoveSet,
    },
    eval::{evaluate_leaf, evaluate_leaf_with, Score, WIN},
    ttable::{NodeType, Recommendation, TTable, TTableEntry},
};

/// Shallowest frame depth at which the stop flag is polled. Frames below
/// this finish their whole subtree; it is too small to matter and keeps the
/// polling overhead out of the leaves.
pub(crate) const MIN_STOP_DEPTH: u32 = 5;

/// Executes fixed-depth negamax searches against one transposition table.
///
/// The search is fail-soft alpha-beta with a NegaScout zero-window probe on
/// non-first children, a killer-move heuristic plumbed per frame, and the
/// table consulted before anything else. Within one search the move order
/// at a node is deterministic: table move, killer move, then generated
/// moves by source and destination square.
pub(crate) struct Search<'a> {
    ttable: &'a mut TTable,

    /// Cooperative cancellation flag, polled between sibling moves at
    /// depths of [`MIN_STOP_DEPTH`] and above. Relaxed ordering is enough:
    /// only eventual visibility is needed.
    stop: &'a AtomicBool,

    /// Number of moves processed, for diagnostics.
    nodes: u64,
}

/// What a frame should do after processing one move.
enum Step {
    /// Keep going with the next move.
    Searched,

    /// Beta cutoff; stop processing moves and record the frame.
    Cutoff,

    /// The stop flag interrupted this move's subtree; unwind.
    Aborted,
}

/// The mutable state of one recursion frame.
struct Frame {
    friends: Bitboard,
    enemies: Bitboard,
    depth: u32,
    alpha: Score,
    beta: Score,

    /// Killer move supplied by the parent frame, tried right after the
    /// table move.
    killer: MoveSet,

    /// Best response seen in any child so far; becomes the killer move of
    /// subsequent children.
    next_killer: MoveSet,

    best: Recommendation,
    node_type: NodeType,
    move_count: u32,
}

impl Frame {
    fn new(
        friends: Bitboard,
        enemies: Bitboard,
        depth: u32,
        alpha: Score,
        beta: Score,
        killer: MoveSet,
    ) -> Self {
        Self {
            friends,
            enemies,
            depth,
            alpha,
            beta,
            killer,
            next_killer: MoveSet::EMPTY,
            best: Recommendation {
                mv: MoveSet::EMPTY,
                score: -2 * WIN,
            },
            node_type: NodeType::All,
            move_count: 0,
        }
    }
}

impl<'a> Search<'a> {
    pub(crate) fn new(ttable: &'a mut TTable, stop: &'a AtomicBool) -> Self {
        Self {
            ttable,
            stop,
            nodes: 0,
        }
    }

    /// Number of moves processed since construction.
    pub(crate) fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Searches `depth` plies ahead and returns the best move and score
    /// from the mover's perspective, fail-soft (the score may fall outside
    /// the `(alpha, beta)` window).
    ///
    /// Returns `None` only when the stop flag fired before this frame could
    /// finish a single move; the caller must fall back on its own best
    /// result so far.
    pub(crate) fn negamax(
        &mut self,
        friends: Bitboard,
        enemies: Bitboard,
        depth: u32,
        alpha: Score,
        beta: Score,
        killer: MoveSet,
    ) -> Option<Recommendation> {
        if depth == 0 {
            return Some(Recommendation {
                mv: MoveSet::EMPTY,
                score: evaluate_leaf(friends, enemies),
            });
        }

        let mut frame = Frame::new(friends, enemies, depth, alpha, beta, killer);

        if self.run_frame(&mut frame) {
            // Completed frames go to the table; interrupted ones must not,
            // or a partial score would pose as a finished search of this
            // depth.
            self.ttable.store(TTableEntry::new(
                frame.friends,
                frame.enemies,
                frame.best,
                frame.depth,
                frame.node_type,
            ));
            Some(frame.best)
        } else if frame.move_count > 0 {
            Some(frame.best)
        } else {
            None
        }
    }

    /// Runs the main search of one frame. Returns `false` if the frame was
    /// interrupted by the stop flag.
    fn run_frame(&mut self, frame: &mut Frame) -> bool {
        // Check the table before checking whether the game is over; a hit
        // is cheaper than the connectivity tests.
        let mut tt_move = MoveSet::EMPTY;
        if let Some(entry) = self.ttable.probe(frame.friends, frame.enemies) {
            tt_move = entry.rec.mv;

            // A previous result can be returned outright if it is exact: a
            // PV score from at least this depth, or a terminal evaluation
            // (stored with the empty move). Anything else is only safe as
            // an ordering hint, since it was obtained under different
            // cutoff bounds.
            if tt_move.is_empty() || (entry.node_type == NodeType::Pv && entry.depth >= frame.depth)
            {
                frame.best = entry.rec;
                return true;
            }

            if self.stop_requested(frame.depth) {
                return false;
            }
            match self.process_move(frame, tt_move) {
                Step::Cutoff => return true,
                Step::Aborted => return false,
                Step::Searched => (),
            }
        }

        let killer = frame.killer;
        if !killer.is_empty() && is_move_set_legal(killer, frame.friends, frame.enemies) {
            if self.stop_requested(frame.depth) {
                return false;
            }
            match self.process_move(frame, killer) {
                Step::Cutoff => return true,
                Step::Aborted => return false,
                Step::Searched => (),
            }
        }

        let moves = generate_moves(frame.friends, frame.enemies);

        // If the game is over here, this is a leaf no matter the depth.
        {
            let friends_together = is_connected(frame.friends);
            let enemies_together = is_connected(frame.enemies);
            let no_moves = moves.iter().all(|move_set| move_set.to.is_empty());

            if friends_together || enemies_together || no_moves {
                frame.best = Recommendation {
                    mv: MoveSet::EMPTY,
                    score: evaluate_leaf_with(
                        frame.friends,
                        frame.enemies,
                        friends_together,
                        enemies_together,
                        no_moves,
                    ),
                };
                return true;
            }
        }

        for move_set in &moves {
            let mut destinations = move_set.to;
            while !destinations.is_empty() {
                let mv = MoveSet::new(move_set.from, destinations.pop_lsb());

                // Already processed above.
                if mv == tt_move || mv == frame.killer {
                    continue;
                }

                if self.stop_requested(frame.depth) {
                    return false;
                }
                match self.process_move(frame, mv) {
                    Step::Cutoff => return true,
                    Step::Aborted => return false,
                    Step::Searched => (),
                }
            }
        }

        // Fail-soft: an all-node may report a score below alpha.
        true
    }

    /// Searches one child move and folds the result into the frame.
    fn process_move(&mut self, frame: &mut Frame, mv: MoveSet) -> Step {
        let mut friends = frame.friends;
        let mut enemies = frame.enemies;
        apply_move_bits(mv.from, mv.to, &mut friends, &mut enemies);

        let child_depth = frame.depth - 1;
        let child_killer = frame.next_killer;

        // The roles swap on recursion: the child's friends are our enemies.
        let (child, score) = if frame.move_count > 0 {
            // NegaScout: probe non-first children with a zero-width window
            // around alpha. Most fail low and are proven inferior cheaply;
            // the occasional one that lands inside the window is re-searched
            // with the full window.
            let probe = match self.negamax(
                enemies,
                friends,
                child_depth,
                -frame.alpha - 1,
                -frame.alpha,
                child_killer,
            ) {
                Some(child) => child,
                None => return Step::Aborted,
            };
            let probe_score = -probe.score;

            if frame.alpha < probe_score && probe_score < frame.beta {
                match self.negamax(
                    enemies,
                    friends,
                    child_depth,
                    -frame.beta,
                    -frame.alpha,
                    child_killer,
                ) {
                    Some(child) => (child, -child.score),
                    None => return Step::Aborted,
                }
            } else {
                (probe, probe_score)
            }
        } else {
            match self.negamax(
                enemies,
                friends,
                child_depth,
                -frame.beta,
                -frame.alpha,
                child_killer,
            ) {
                Some(child) => (child, -child.score),
                None => return Step::Aborted,
            }
        };

        self.nodes += 1;

        if score > frame.best.score {
            frame.best = Recommendation { mv, score };
            // The child's best reply refuted every weaker sibling; try it
            // first in their subtrees.
            frame.next_killer = child.mv;
        }

        if frame.best.score > frame.alpha {
            // Until this happens, we are an all-node. Now we may be a PV
            // node, or...
            frame.alpha = frame.best.score;
            frame.node_type = NodeType::Pv;
        }

        frame.move_count += 1;

        if frame.alpha >= frame.beta {
            // ...if this happens, we are a cut-node.
            frame.node_type = NodeType::Cut;
            Step::Cutoff
        } else {
            Step::Searched
        }
    }

    #[inline(always)]
    fn stop_requested(&self, depth: u32) -> bool {
        depth >= MIN_STOP_DEPTH && self.stop.load(Ordering::Relaxed)
    }
}
