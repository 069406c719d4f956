/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{collections::BTreeMap, sync::atomic::AtomicBool};

use rand::Rng;

use crate::{
    board::{apply_move_bits, Bitboard, GameOutcome, Move, MoveSet, Player, Position},
    eval::{evaluate_leaf, Score, WIN},
    search::Search,
    ttable::{NodeType, Recommendation, TTable},
};

/// The result of analyzing a position.
///
/// The score is normalized so that positive always favours White, no matter
/// who is to move. `best_move` is `None` exactly when the position is
/// terminal.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PositionAnalysis {
    /// The move the analysis recommends, if the game is still going.
    pub best_move: Option<Move>,

    /// The expected continuation, starting with `best_move`.
    pub principal_variation: Vec<Move>,

    /// Normalized score: positive favours White.
    pub score: Score,
}

/// Analyzes a position to a fixed depth and returns the best move, the
/// principal variation and a normalized score.
///
/// Runs iterative deepening from 1 to `depth` over a fresh transposition
/// table; earlier iterations seed the move ordering of later ones. On a
/// terminal position the analysis has no best move and an empty variation.
pub fn analyze_position(position: &Position, depth: u32) -> PositionAnalysis {
    debug_assert!(depth >= 1, "analysis requires at least one ply of search");

    let mut ttable = TTable::default();
    analyze_with_table(&mut ttable, position, depth)
}

/// Separately analyzes the position reached by each legal move, `depth - 1`
/// plies deep, keyed by the move.
///
/// This takes considerably longer than analyzing the root alone, but yields
/// an accurate score for every move, which is what the softmax selector
/// needs. All scores are normalized (positive favours White); negate as
/// needed for the mover's point of view.
pub fn analyze_available_moves(
    position: &Position,
    depth: u32,
) -> BTreeMap<Move, PositionAnalysis> {
    debug_assert!(depth >= 1, "analysis requires at least one ply of search");

    position
        .legal_moves()
        .into_iter()
        .map(|mv| {
            let child = position.with_move(mv);
            let analysis = if depth == 1 {
                // One ply deep there is nothing left to search below the
                // move; the children are plain leaf evaluations.
                leaf_analysis(&child)
            } else {
                analyze_position(&child, depth - 1)
            };
            (mv, analysis)
        })
        .collect()
}

/// Selects one of the per-move analyses at random, weighting move `i` by
/// `exp(sharpness * 0.1 * score_i)`, using the process RNG.
///
/// With `sharpness` 0 every move is equally likely; as `sharpness` grows the
/// choice converges on the entry with the highest score. Returns `None` for
/// an empty map.
///
/// The returned analysis is the chosen entry's analysis with the chosen
/// move set as `best_move` and prepended to the variation.
pub fn select_analysis_with_softmax(
    analyses: &BTreeMap<Move, PositionAnalysis>,
    sharpness: f64,
) -> Option<PositionAnalysis> {
    select_analysis_with_softmax_using(analyses, sharpness, &mut rand::thread_rng())
}

/// [`select_analysis_with_softmax`] drawing from a caller-supplied RNG, so
/// selection can be made deterministic.
pub fn select_analysis_with_softmax_using<R: Rng + ?Sized>(
    analyses: &BTreeMap<Move, PositionAnalysis>,
    sharpness: f64,
    rng: &mut R,
) -> Option<PositionAnalysis> {
    debug_assert!(sharpness >= 0.0, "softmax sharpness must be non-negative");

    let top_score = analyses.values().map(|analysis| analysis.score).max()?;

    // Weights are shifted by the best score so the largest exponent is
    // exactly zero; raw exponents of decisive scores would overflow to
    // infinity long before sharpness gets interesting.
    let weight = |score: Score| -> f64 {
        if score == top_score {
            1.0
        } else {
            (sharpness * 0.1 * (score - top_score) as f64).exp()
        }
    };

    let total: f64 = analyses
        .values()
        .map(|analysis| weight(analysis.score))
        .sum();
    let mut remaining = rng.gen::<f64>() * total;

    let mut chosen = None;
    for (mv, analysis) in analyses {
        chosen = Some((mv, analysis));
        remaining -= weight(analysis.score);
        if remaining < 0.0 {
            break;
        }
    }

    // Rounding can leave a sliver of `remaining`; the last entry absorbs it.
    chosen.map(|(&mv, analysis)| {
        let mut result = analysis.clone();
        result.best_move = Some(mv);
        result.principal_variation.insert(0, mv);
        result
    })
}

/// Per-level search depth and softmax sharpness for [`analyze_with_ai_level`].
const DIFFICULTY: [(u32, f64); 10] = [
    (1, 0.0),
    (1, 0.2),
    (2, 0.4),
    (3, 0.6),
    (3, 0.8),
    (3, 1.0),
    (4, 1.5),
    (4, 3.0),
    (5, 4.5),
    (6, 8.0),
];

/// Analyzes a position with strength scaled to `ai_level`.
///
/// Levels 0 through 9 run per-move analysis at increasing depths and pick a
/// move by softmax with increasing sharpness, so low levels play loosely and
/// high levels rarely stray from the best move. Level 10 and above skip the
/// randomness entirely and analyze at depth `6 + (ai_level - 10)`; expect
/// those to take noticeably longer as the level grows.
pub fn analyze_with_ai_level(position: &Position, ai_level: u32) -> PositionAnalysis {
    if ai_level >= 10 {
        return analyze_position(position, 6 + (ai_level - 10));
    }

    let (depth, sharpness) = DIFFICULTY[ai_level as usize];

    if position.outcome() != GameOutcome::Ongoing {
        return analyze_position(position, depth);
    }

    // The softmax weights must favour the mover, and normalized scores
    // favour White; flip for Black, select, then flip the winner back.
    let black = position.to_move() == Player::Black;
    let mut analyses = analyze_available_moves(position, depth);
    if black {
        for analysis in analyses.values_mut() {
            analysis.score = -analysis.score;
        }
    }

    match select_analysis_with_softmax(&analyses, sharpness) {
        Some(mut selected) => {
            if black {
                selected.score = -selected.score;
            }
            selected
        }
        // Unreachable on an ongoing position, but a straight analysis is a
        // sound answer regardless.
        None => analyze_position(position, depth),
    }
}

/// Analysis of a position as a bare leaf, with no search at all.
fn leaf_analysis(position: &Position) -> PositionAnalysis {
    let (friends, enemies) = position.split();
    PositionAnalysis {
        best_move: None,
        principal_variation: Vec::new(),
        score: normalize(evaluate_leaf(friends, enemies), position),
    }
}

/// Iterative deepening over a caller-owned table.
pub(crate) fn analyze_with_table(
    ttable: &mut TTable,
    position: &Position,
    depth: u32,
) -> PositionAnalysis {
    let (friends, enemies) = position.split();

    let stop = AtomicBool::new(false);
    let mut rec = Recommendation::default();

    for current in 1..=depth {
        let mut search = Search::new(ttable, &stop);
        if let Some(result) =
            search.negamax(friends, enemies, current, -2 * WIN, 2 * WIN, MoveSet::EMPTY)
        {
            log::debug!(
                "depth {current}: score {} after {} nodes",
                result.score,
                search.nodes()
            );
            rec = result;
        }
    }

    finish_analysis(ttable, position, rec)
}

/// Builds the public analysis from a root recommendation: converts the move,
/// walks the principal variation out of the table and normalizes the score.
pub(crate) fn finish_analysis(
    ttable: &TTable,
    position: &Position,
    rec: Recommendation,
) -> PositionAnalysis {
    PositionAnalysis {
        best_move: rec.mv.to_move(),
        principal_variation: principal_variation(ttable, position),
        score: normalize(rec.score, position),
    }
}

/// Sign-flips a mover-relative score so that positive favours White.
#[inline(always)]
pub(crate) fn normalize(score: Score, position: &Position) -> Score {
    match position.to_move() {
        Player::White => score,
        Player::Black => -score,
    }
}

/// Reconstructs the principal variation by following PV entries through the
/// table from `position`.
///
/// Stops on a table miss, a non-PV entry, an empty move, or a position seen
/// earlier in the walk (index collisions could otherwise splice the line
/// into a cycle).
fn principal_variation(ttable: &TTable, position: &Position) -> Vec<Move> {
    let (mut friends, mut enemies) = position.split();
    let mut visited: Vec<(Bitboard, Bitboard)> = Vec::new();
    let mut line = Vec::new();

    while let Some(entry) = ttable.probe(friends, enemies) {
        if entry.node_type != NodeType::Pv || entry.rec.mv.is_empty() {
            break;
        }
        if visited.contains(&(friends, enemies)) {
            break;
        }
        visited.push((friends, enemies));

        let Some(mv) = entry.rec.mv.to_move() else {
            break;
        };
        line.push(mv);

        apply_move_bits(entry.rec.mv.from, entry.rec.mv.to, &mut friends, &mut enemies);
        std::mem::swap(&mut friends, &mut enemies);
    }

    line
}
