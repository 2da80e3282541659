//! Moving field sources and the scalar field they produce.
//!
//! A [`FieldSourceSet`] owns every [`Source`] in the scene, advances them with
//! lossless wall reflection, and answers field-value queries through the
//! [`ScalarField`] trait. The contour grid only ever sees the trait, so any
//! `Fn(DVec2) -> f64` closure can stand in for the sources.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::SceneConfig;
use crate::error::EngineError;
use crate::prng::Xorshift64;

/// Keeps the inverse-distance kernel finite at a source center.
pub const DISTANCE_EPS: f64 = 1e-4;

/// Lower bound on squared distance for the inverse-square kernel.
pub const SQUARED_DISTANCE_FLOOR: f64 = 1.0;

/// Largest total field error an influence cutoff may introduce at any point.
pub const CUTOFF_TOLERANCE: f64 = 1e-6;

/// A scalar field that can be sampled anywhere in the plane.
///
/// Implementations must be deterministic: the same point always yields the
/// same value for the same state.
pub trait ScalarField: Send + Sync {
    /// Field value at `point`.
    fn value_at(&self, point: DVec2) -> f64;

    /// Writes `value_at(points[i])` into `out[i]`.
    ///
    /// Overrides must stay numerically identical to the scalar query.
    fn values_at(&self, points: &[DVec2], out: &mut [f64]) {
        for (slot, &point) in out.iter_mut().zip(points) {
            *slot = self.value_at(point);
        }
    }
}

impl<F> ScalarField for F
where
    F: Fn(DVec2) -> f64 + Send + Sync,
{
    fn value_at(&self, point: DVec2) -> f64 {
        self(point)
    }
}

/// Falloff function turning a source's radius and distance into a field
/// contribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    /// `radius / (distance + 1e-4)`.
    #[default]
    InverseDistance,
    /// `radius / max(distance², 1)`.
    InverseSquare,
}

const KERNEL_NAMES: &[&str] = &["inverse_distance", "inverse_square"];

impl Kernel {
    /// Parses a kernel name as used in configuration and on the CLI.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "inverse_distance" => Ok(Kernel::InverseDistance),
            "inverse_square" => Ok(Kernel::InverseSquare),
            _ => Err(EngineError::UnknownKernel(name.to_string())),
        }
    }

    /// Configuration name of this kernel.
    pub fn name(self) -> &'static str {
        match self {
            Kernel::InverseDistance => "inverse_distance",
            Kernel::InverseSquare => "inverse_square",
        }
    }

    /// All recognized kernel names.
    pub fn list_names() -> &'static [&'static str] {
        KERNEL_NAMES
    }

    /// Contribution of a source of `radius` at squared distance `dist_sq`.
    #[inline]
    pub fn contribution(self, radius: f64, dist_sq: f64) -> f64 {
        match self {
            Kernel::InverseDistance => radius / (dist_sq.sqrt() + DISTANCE_EPS),
            Kernel::InverseSquare => radius / dist_sq.max(SQUARED_DISTANCE_FLOOR),
        }
    }
}

/// A moving circular field source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub position: DVec2,
    /// Strength proxy: contributions scale linearly with it.
    pub radius: f64,
    pub velocity: DVec2,
}

impl Source {
    pub fn new(position: DVec2, radius: f64, velocity: DVec2) -> Self {
        Self {
            position,
            radius,
            velocity,
        }
    }

    /// Moves by `velocity * dt` and reflects off the walls of `[0, bounds]`.
    ///
    /// An axis reflects when the source sits on or past a wall while moving
    /// outward, so an exact touch also reflects.
    pub fn step(&mut self, dt: f64, bounds: DVec2) {
        self.position += self.velocity * dt;
        self.velocity.x = reflect(self.position.x, self.velocity.x, bounds.x);
        self.velocity.y = reflect(self.position.y, self.velocity.y, bounds.y);
    }
}

fn reflect(position: f64, velocity: f64, upper: f64) -> f64 {
    if (position >= upper && velocity > 0.0) || (position <= 0.0 && velocity < 0.0) {
        -velocity
    } else {
        velocity
    }
}

/// Every source in the scene plus the kernel used to sum them.
#[derive(Debug, Clone)]
pub struct FieldSourceSet {
    sources: Vec<Source>,
    bounds: DVec2,
    kernel: Kernel,
    influence_cutoff: Option<f64>,
}

impl FieldSourceSet {
    /// Wraps explicit sources moving inside `[0, bounds.x] × [0, bounds.y]`.
    pub fn new(sources: Vec<Source>, bounds: DVec2, kernel: Kernel) -> Self {
        Self {
            sources,
            bounds,
            kernel,
            influence_cutoff: None,
        }
    }

    /// Skips sources farther than `radius * cutoff` from a query point.
    ///
    /// A skipped source contributes less than `1 / cutoff` under either
    /// kernel, so the cutoff must be at least
    /// [`min_influence_cutoff`](Self::min_influence_cutoff) for the current
    /// source count. Vertex classification then only differs from the exact
    /// sum for values within [`CUTOFF_TOLERANCE`] of the threshold.
    pub fn with_influence_cutoff(mut self, cutoff: Option<f64>) -> Result<Self, EngineError> {
        if let Some(cutoff) = cutoff {
            let min = Self::min_influence_cutoff(self.sources.len());
            if !(cutoff.is_finite() && cutoff > 0.0 && cutoff >= min) {
                return Err(EngineError::InvalidCutoff { cutoff, min });
            }
        }
        self.influence_cutoff = cutoff;
        Ok(self)
    }

    /// Smallest cutoff multiplier whose skipped contributions sum to at most
    /// [`CUTOFF_TOLERANCE`] for `source_count` sources.
    pub fn min_influence_cutoff(source_count: usize) -> f64 {
        source_count as f64 / CUTOFF_TOLERANCE
    }

    /// Seeded random sources following the config's radius and speed ranges.
    ///
    /// Positions are uniform over the domain; each velocity component has a
    /// magnitude in `[min_speed, max_speed)` and an independent random sign.
    pub fn random(config: &SceneConfig, rng: &mut Xorshift64) -> Self {
        let sources = (0..config.source_count)
            .map(|_| {
                let position = DVec2::new(
                    rng.next_range(0.0, config.width),
                    rng.next_range(0.0, config.height),
                );
                let radius = rng.next_range(config.min_radius, config.max_radius);
                let velocity = DVec2::new(
                    rng.next_signed_range(config.min_speed, config.max_speed),
                    rng.next_signed_range(config.min_speed, config.max_speed),
                );
                Source::new(position, radius, velocity)
            })
            .collect();
        Self::new(sources, config.bounds(), config.kernel)
    }

    /// Advances every source by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        let bounds = self.bounds;
        for source in &mut self.sources {
            source.step(dt, bounds);
        }
    }

    /// Summed field value at `point`.
    pub fn field_value_at(&self, point: DVec2) -> f64 {
        let kernel = self.kernel;
        match self.influence_cutoff {
            None => self.sources.iter().fold(0.0, |acc, s| {
                acc + kernel.contribution(s.radius, s.position.distance_squared(point))
            }),
            Some(cutoff) => self.sources.iter().fold(0.0, |acc, s| {
                let dist_sq = s.position.distance_squared(point);
                let reach = s.radius * cutoff;
                if dist_sq > reach * reach {
                    acc
                } else {
                    acc + kernel.contribution(s.radius, dist_sq)
                }
            }),
        }
    }

    /// Batched [`field_value_at`](Self::field_value_at).
    ///
    /// With the `parallel` feature the points are split across rayon workers;
    /// every slot is still computed by the scalar query.
    pub fn field_values_at(&self, points: &[DVec2], out: &mut [f64]) {
        debug_assert_eq!(points.len(), out.len());
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            out.par_iter_mut()
                .zip(points.par_iter())
                .for_each(|(slot, &point)| *slot = self.field_value_at(point));
        }
        #[cfg(not(feature = "parallel"))]
        for (slot, &point) in out.iter_mut().zip(points) {
            *slot = self.field_value_at(point);
        }
    }

    /// Sum of absolute coordinate deltas between current positions and
    /// `anchor`. Sources beyond the shorter list are ignored.
    pub fn displacement_from(&self, anchor: &[DVec2]) -> f64 {
        self.sources
            .iter()
            .zip(anchor)
            .map(|(s, a)| {
                let d = (s.position - *a).abs();
                d.x + d.y
            })
            .sum()
    }

    /// Snapshot of current positions, in source order.
    pub fn positions(&self) -> Vec<DVec2> {
        self.sources.iter().map(|s| s.position).collect()
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    pub fn bounds(&self) -> DVec2 {
        self.bounds
    }
}

impl ScalarField for FieldSourceSet {
    fn value_at(&self, point: DVec2) -> f64 {
        self.field_value_at(point)
    }

    fn values_at(&self, points: &[DVec2], out: &mut [f64]) {
        self.field_values_at(points, out);
    }
}
