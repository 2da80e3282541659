//! The per-frame driver: owns the sources, the contour grid and the segment
//! buffer, and decides each frame whether to resample or reuse.

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::assembly::assemble;
use crate::cache::{caching_wanted, FrameBudget, SampleCache};
use crate::config::SceneConfig;
use crate::error::EngineError;
use crate::grid::ContourGrid;
use crate::lattice::Lattice;
use crate::prng::Xorshift64;
use crate::segment::Segment;
use crate::source::{FieldSourceSet, Source};

/// What happened during one [`Scene::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameStats {
    /// 1-based frame number.
    pub frame: u64,
    /// False when the previous frame's samples and segments were reused.
    pub resampled: bool,
    pub segment_count: usize,
    /// Wall time of the frame in milliseconds.
    pub elapsed_ms: f64,
    /// Whether reuse is allowed for the next frame.
    pub caching: bool,
}

/// A running metaball scene.
///
/// `segments()` is valid from construction on; every [`advance`](Self::advance)
/// replaces it.
#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    sources: FieldSourceSet,
    grid: ContourGrid,
    segments: Vec<Segment>,
    cache: SampleCache,
    budget: FrameBudget,
    caching: bool,
    frame: u64,
    last_frame: Option<FrameStats>,
}

impl Scene {
    /// Builds a scene with random sources seeded from `config.seed`.
    pub fn new(config: SceneConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let mut rng = Xorshift64::new(config.seed);
        let sources = FieldSourceSet::random(&config, &mut rng)
            .with_influence_cutoff(config.influence_cutoff)?;
        Self::build(config, sources)
    }

    /// Builds a scene around explicit sources. `config.source_count` and the
    /// radius and speed ranges are ignored.
    pub fn with_sources(config: SceneConfig, sources: Vec<Source>) -> Result<Self, EngineError> {
        config.validate()?;
        let sources = FieldSourceSet::new(sources, config.bounds(), config.kernel)
            .with_influence_cutoff(config.influence_cutoff)?;
        Self::build(config, sources)
    }

    fn build(config: SceneConfig, sources: FieldSourceSet) -> Result<Self, EngineError> {
        let lattice = Lattice::new(config.width, config.height, config.spacing)?;
        let grid = ContourGrid::new(lattice, config.threshold)?;
        tracing::debug!(
            sources = sources.len(),
            cols = lattice.cols(),
            rows = lattice.rows(),
            seed = config.seed,
            "scene created"
        );
        let mut scene = Self {
            cache: SampleCache::new(config.cache_tolerance),
            budget: FrameBudget::new(config.budget_window, config.frame_budget_ms),
            caching: false,
            config,
            sources,
            grid,
            segments: Vec::new(),
            frame: 0,
            last_frame: None,
        };
        scene.resample();
        Ok(scene)
    }

    /// Steps the sources by `dt` seconds and refreshes the contour.
    pub fn advance(&mut self, dt: f64) -> FrameStats {
        let started = Instant::now();

        self.sources.step(dt);
        let reuse = self.caching && self.cache.is_fresh(&self.sources);
        if !reuse {
            self.resample();
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.budget.record(elapsed_ms);
        let caching = caching_wanted(self.config.cache, &self.budget);
        if caching != self.caching {
            tracing::debug!(
                frame = self.frame + 1,
                caching,
                average_ms = self.budget.average_ms(),
                "sample cache toggled"
            );
            self.caching = caching;
        }

        self.frame += 1;
        let stats = FrameStats {
            frame: self.frame,
            resampled: !reuse,
            segment_count: self.segments.len(),
            elapsed_ms,
            caching,
        };
        tracing::trace!(
            frame = stats.frame,
            resampled = stats.resampled,
            segments = stats.segment_count,
            elapsed_ms,
            "frame"
        );
        self.last_frame = Some(stats);
        stats
    }

    fn resample(&mut self) {
        self.grid.update(&self.sources);
        assemble(
            &self.grid,
            self.config.assembly,
            self.config.boundary,
            &mut self.segments,
        );
        self.cache.record(&self.sources);
    }

    /// Contour of the current frame.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn sources(&self) -> &FieldSourceSet {
        &self.sources
    }

    pub fn grid(&self) -> &ContourGrid {
        &self.grid
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Number of frames advanced so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn last_frame(&self) -> Option<&FrameStats> {
        self.last_frame.as_ref()
    }

    /// Whether the next frame may reuse samples.
    pub fn caching_active(&self) -> bool {
        self.caching
    }

    /// Current configuration as JSON.
    pub fn params(&self) -> Value {
        self.config.to_json()
    }

    pub fn param_schema(&self) -> Value {
        SceneConfig::param_schema()
    }
}
