//! Convergence tracking for iterative algorithms.
//!
//! PageRank, HITS and CLOPE all run until a fixed point or an iteration cap.
//! `IterativeState` keeps the bookkeeping uniform so every iterative kernel
//! reports the same `ConvergenceSummary`.

use serde::{Deserialize, Serialize};

/// Pass counter and stopping rule for a fixed-point loop.
///
/// A run converges once a recorded delta falls strictly below `threshold`;
/// it stops unconverged after `cap` passes.
#[derive(Debug, Clone)]
pub struct IterativeState {
    passes: u64,
    delta: f64,
    threshold: f64,
    cap: u64,
}

impl IterativeState {
    /// Tracker with the given threshold and pass cap.
    pub fn new(threshold: f64, cap: u64) -> Self {
        Self {
            passes: 0,
            delta: f64::INFINITY,
            threshold,
            cap,
        }
    }

    /// Passes recorded so far.
    pub fn iteration(&self) -> u64 {
        self.passes
    }

    /// Whether the last recorded delta was below the threshold.
    pub fn converged(&self) -> bool {
        self.delta < self.threshold
    }

    /// Record the delta of one pass; returns [`Self::converged`].
    pub fn update(&mut self, delta: f64) -> bool {
        self.passes += 1;
        self.delta = delta;
        self.converged()
    }

    /// Whether the loop should run another pass.
    pub fn should_continue(&self) -> bool {
        !self.converged() && self.passes < self.cap
    }

    /// Snapshot of the run so far.
    pub fn summary(&self) -> ConvergenceSummary {
        let converged = self.converged();
        ConvergenceSummary {
            iterations: self.passes,
            final_delta: if self.passes == 0 { 0.0 } else { self.delta },
            converged,
            reached_max: !converged && self.passes >= self.cap,
        }
    }
}

/// How an iterative run ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceSummary {
    /// Passes executed.
    pub iterations: u64,
    /// Delta of the last pass.
    pub final_delta: f64,
    /// Whether the fixed point was reached.
    pub converged: bool,
    /// Whether the pass cap ended the run.
    pub reached_max: bool,
}

impl ConvergenceSummary {
    /// Summary for an input with nothing to iterate over.
    #[must_use]
    pub fn trivial() -> Self {
        Self {
            iterations: 0,
            final_delta: 0.0,
            converged: true,
            reached_max: false,
        }
    }
}

impl Default for ConvergenceSummary {
    fn default() -> Self {
        Self::trivial()
    }
}
