/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    analysis::{finish_analysis, PositionAnalysis},
    board::{MoveSet, Position},
    eval::WIN,
    search::{Search, MIN_STOP_DEPTH},
    ttable::{Recommendation, TTable},
};

/// Callback invoked on the searching thread after every completed depth.
pub type ReportCallback = Box<dyn FnMut(&GameAnalyzer) + Send>;

/// A cloneable handle that can cancel a running analysis from any thread.
///
/// The handle shares the analyzer's stop flag — the single piece of state
/// that crosses threads. Stopping is advisory: the search finishes the move
/// subtree it is in before winding down, and the last completed depth stays
/// retrievable through [`GameAnalyzer::best_analysis_so_far`].
#[derive(Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Requests that the analysis stop as soon as practical.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// A long-running, cancellable position analyzer.
///
/// The analyzer owns its transposition table and deepens the search one ply
/// at a time until it reaches the configured maximum depth (100 by default,
/// effectively "until stopped") or the stop flag is raised. After every
/// completed depth the report callback, if any, runs on the searching
/// thread and may read the analyzer or stop it.
///
/// [`GameAnalyzer::analyze_position`] blocks its caller; drive it from a
/// thread you own and cancel it from elsewhere through a [`StopHandle`]:
///
/// ```no_run
/// use tabla::{GameAnalyzer, Position};
///
/// let mut analyzer = GameAnalyzer::new();
/// let handle = analyzer.stop_handle();
///
/// let worker = std::thread::spawn(move || {
///     analyzer.analyze_position(&Position::STANDARD);
///     analyzer
/// });
///
/// std::thread::sleep(std::time::Duration::from_millis(100));
/// handle.stop();
///
/// let analyzer = worker.join().unwrap();
/// if let Some(analysis) = analyzer.best_analysis_so_far() {
///     println!("best after {} plies: {:?}", analyzer.current_depth(), analysis.best_move);
/// }
/// ```
pub struct GameAnalyzer {
    ttable: TTable,
    stop: Arc<AtomicBool>,
    max_depth: u32,
    report: Option<ReportCallback>,
    best: Option<PositionAnalysis>,
    best_raw: Option<Recommendation>,
    current_depth: u32,
    ongoing: bool,
}

impl GameAnalyzer {
    /// Depth cap used when none is configured; deep enough that in practice
    /// only the stop flag ends the analysis.
    pub const DEFAULT_MAX_DEPTH: u32 = 100;

    pub fn new() -> Self {
        Self {
            ttable: TTable::default(),
            stop: Arc::new(AtomicBool::new(false)),
            max_depth: Self::DEFAULT_MAX_DEPTH,
            report: None,
            best: None,
            best_raw: None,
            current_depth: 0,
            ongoing: false,
        }
    }

    /// A handle for stopping this analyzer from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.stop))
    }

    /// Caps the iterative deepening at `depth` plies.
    pub fn set_max_depth(&mut self, depth: u32) {
        self.max_depth = depth;
    }

    /// Installs a callback to run after every completed depth.
    pub fn set_report_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&GameAnalyzer) + Send + 'static,
    {
        self.report = Some(Box::new(callback));
    }

    /// Analyzes `position` by iterative deepening, blocking until the
    /// configured maximum depth is reached or the analysis is stopped.
    ///
    /// Progress is observable through the report callback while this runs,
    /// and through [`Self::best_analysis_so_far`]/[`Self::current_depth`]
    /// afterwards. When the stop flag interrupts a depth midway, its
    /// partial result replaces the previous depth's only if it scores
    /// better.
    pub fn analyze_position(&mut self, position: &Position) {
        self.stop.store(false, Ordering::Relaxed);
        self.ttable.reset();
        self.best = None;
        self.best_raw = None;
        self.current_depth = 0;
        self.ongoing = true;

        // The callback borrows the whole analyzer, so it cannot stay inside
        // it while running.
        let mut report = self.report.take();
        let (friends, enemies) = position.split();

        for depth in 1..=self.max_depth {
            let mut search = Search::new(&mut self.ttable, &self.stop);
            let result =
                search.negamax(friends, enemies, depth, -2 * WIN, 2 * WIN, MoveSet::EMPTY);
            let nodes = search.nodes();

            let Some(rec) = result else {
                // Stopped before the first root move finished; the previous
                // depth stands.
                break;
            };

            let stopped = self.stop.load(Ordering::Relaxed);
            if stopped && depth >= MIN_STOP_DEPTH {
                // A partial sweep of the root moves still found `rec`; keep
                // it only if it beats what a full previous depth produced.
                if self.best_raw.map_or(true, |best| rec.score > best.score) {
                    let mut analysis = finish_analysis(&self.ttable, position, rec);
                    // The table still describes the previous depth's line;
                    // don't pair a new best move with someone else's tail.
                    if let Some(best) = analysis.best_move {
                        if analysis.principal_variation.first() != Some(&best) {
                            analysis.principal_variation = vec![best];
                        }
                    }
                    self.best = Some(analysis);
                    self.best_raw = Some(rec);
                }
                break;
            }

            log::debug!(
                "completed depth {depth} with score {} after {nodes} nodes",
                rec.score
            );
            self.best = Some(finish_analysis(&self.ttable, position, rec));
            self.best_raw = Some(rec);
            self.current_depth = depth;

            if let Some(callback) = report.as_mut() {
                callback(&*self);
            }

            // Depths below the polling threshold always run to completion,
            // so a stop observed there still adopted a full result.
            if stopped || self.stop.load(Ordering::Relaxed) {
                break;
            }

            // A terminal position cannot get a different answer from a
            // deeper search.
            if rec.mv.is_empty() {
                break;
            }
        }

        self.report = report;
        self.ongoing = false;
    }

    /// Raises the stop flag. Equivalent to [`StopHandle::stop`].
    pub fn stop_analysis(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Returns `true` while [`Self::analyze_position`] is running.
    pub fn is_analysis_ongoing(&self) -> bool {
        self.ongoing
    }

    /// The best analysis any completed (or improving partial) depth has
    /// produced, or `None` before the first depth finishes.
    pub fn best_analysis_so_far(&self) -> Option<PositionAnalysis> {
        self.best.clone()
    }

    /// The deepest fully completed search depth of the current analysis.
    pub fn current_depth(&self) -> u32 {
        self.current_depth
    }
}

impl Default for GameAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
