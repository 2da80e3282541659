//! Frame-to-frame reuse of vertex samples, and the frame budget that decides
//! when reuse is worth it.

use std::collections::VecDeque;

use glam::DVec2;

use crate::config::CachePolicy;
use crate::source::FieldSourceSet;

/// Source positions recorded at the last resample.
///
/// The anchor is only replaced on [`SampleCache::record`], so slow drift
/// accumulates across skipped frames until it exceeds the tolerance.
#[derive(Debug, Clone)]
pub struct SampleCache {
    anchor: Vec<DVec2>,
    tolerance: f64,
    valid: bool,
}

impl SampleCache {
    pub fn new(tolerance: f64) -> Self {
        Self {
            anchor: Vec::new(),
            tolerance,
            valid: false,
        }
    }

    /// Records the current positions as the new anchor.
    pub fn record(&mut self, sources: &FieldSourceSet) {
        self.anchor.clear();
        self.anchor
            .extend(sources.sources().iter().map(|s| s.position));
        self.valid = true;
    }

    /// Forces the next freshness check to fail.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Whether the samples taken at the anchor still stand in for `sources`.
    pub fn is_fresh(&self, sources: &FieldSourceSet) -> bool {
        self.valid
            && self.anchor.len() == sources.len()
            && sources.displacement_from(&self.anchor) <= self.tolerance
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn anchor(&self) -> &[DVec2] {
        &self.anchor
    }
}

/// Trailing window of frame times.
#[derive(Debug, Clone)]
pub struct FrameBudget {
    samples: VecDeque<f64>,
    window: usize,
    target_ms: f64,
}

impl FrameBudget {
    /// The deque grows with recorded frames, so `window` costs nothing up
    /// front.
    pub fn new(window: usize, target_ms: f64) -> Self {
        Self {
            samples: VecDeque::new(),
            window,
            target_ms,
        }
    }

    /// Adds a frame time, dropping the oldest once the window is full.
    pub fn record(&mut self, frame_ms: f64) {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(frame_ms);
    }

    /// Mean of the recorded frames, 0 when empty.
    pub fn average_ms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Full window whose average exceeds the target.
    pub fn is_over_budget(&self) -> bool {
        self.samples.len() == self.window && self.average_ms() > self.target_ms
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn target_ms(&self) -> f64 {
        self.target_ms
    }
}

/// Whether `policy` allows cache reuse given the current budget state.
pub fn caching_wanted(policy: CachePolicy, budget: &FrameBudget) -> bool {
    match policy {
        CachePolicy::Disabled => false,
        CachePolicy::Always => true,
        CachePolicy::Adaptive => budget.is_over_budget(),
    }
}
