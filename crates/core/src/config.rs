//! Construction-time scene configuration.
//!
//! A [`SceneConfig`] is immutable once a scene is built: changing the grid
//! spacing or domain means building a new scene. Defaults reproduce the
//! classic demo (1280×720 domain, 10-unit grid, 15 sources, threshold 2.5).

use glam::DVec2;
use serde_json::{json, Map, Value};

use crate::assembly::AssemblyStrategy;
use crate::error::EngineError;
use crate::params::{param_f64, param_opt_f64, param_string, param_u64, param_usize};
use crate::source::{FieldSourceSet, Kernel};

const DEFAULT_WIDTH: f64 = 1280.0;
const DEFAULT_HEIGHT: f64 = 720.0;
const DEFAULT_SPACING: f64 = 10.0;
const DEFAULT_SOURCE_COUNT: usize = 15;
const DEFAULT_MIN_RADIUS: f64 = 15.0;
const DEFAULT_MAX_RADIUS: f64 = 45.0;
const DEFAULT_MIN_SPEED: f64 = 0.0;
const DEFAULT_MAX_SPEED: f64 = 150.0;
const DEFAULT_THRESHOLD: f64 = 2.5;
/// Summed absolute source displacement below which cached samples are reused.
const DEFAULT_CACHE_TOLERANCE: f64 = 0.1;
const DEFAULT_FRAME_BUDGET_MS: f64 = 10.0;
const DEFAULT_BUDGET_WINDOW: usize = 60;
const DEFAULT_SEED: u64 = 42;

/// What happens where a contour runs into the edge of the lattice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Contours cut by the border stay open.
    #[default]
    Open,
    /// Border edges carry segments along their active part, closing every
    /// contour against the frame.
    Closed,
}

const BOUNDARY_NAMES: &[&str] = &["open", "closed"];

impl BoundaryPolicy {
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "open" => Ok(BoundaryPolicy::Open),
            "closed" => Ok(BoundaryPolicy::Closed),
            _ => Err(EngineError::UnknownBoundary(name.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BoundaryPolicy::Open => "open",
            BoundaryPolicy::Closed => "closed",
        }
    }

    pub fn list_names() -> &'static [&'static str] {
        BOUNDARY_NAMES
    }
}

/// When the scene may reuse last frame's vertex samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Always resample.
    Disabled,
    /// Reuse samples whenever the sources are within tolerance of the last
    /// resample.
    Always,
    /// Like `Always`, but only while recent frames run over budget.
    #[default]
    Adaptive,
}

const CACHE_POLICY_NAMES: &[&str] = &["disabled", "always", "adaptive"];

impl CachePolicy {
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "disabled" => Ok(CachePolicy::Disabled),
            "always" => Ok(CachePolicy::Always),
            "adaptive" => Ok(CachePolicy::Adaptive),
            _ => Err(EngineError::UnknownCachePolicy(name.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CachePolicy::Disabled => "disabled",
            CachePolicy::Always => "always",
            CachePolicy::Adaptive => "adaptive",
        }
    }

    pub fn list_names() -> &'static [&'static str] {
        CACHE_POLICY_NAMES
    }
}

/// Everything needed to build a scene. Fixed for the scene's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Domain width; sources move inside `[0, width]`.
    pub width: f64,
    /// Domain height; sources move inside `[0, height]`.
    pub height: f64,
    /// Lattice spacing between neighboring sample vertices.
    pub spacing: f64,
    pub source_count: usize,
    pub min_radius: f64,
    pub max_radius: f64,
    /// Lower bound on each velocity component's magnitude.
    pub min_speed: f64,
    /// Upper bound (exclusive) on each velocity component's magnitude.
    pub max_speed: f64,
    /// Iso-value of the extracted contour.
    pub threshold: f64,
    pub kernel: Kernel,
    pub boundary: BoundaryPolicy,
    pub assembly: AssemblyStrategy,
    /// Multiple of a source's radius beyond which it is ignored. `None`
    /// sums every source at every vertex.
    pub influence_cutoff: Option<f64>,
    pub cache: CachePolicy,
    pub cache_tolerance: f64,
    pub frame_budget_ms: f64,
    /// Number of trailing frames averaged by the frame budget.
    pub budget_window: usize,
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            spacing: DEFAULT_SPACING,
            source_count: DEFAULT_SOURCE_COUNT,
            min_radius: DEFAULT_MIN_RADIUS,
            max_radius: DEFAULT_MAX_RADIUS,
            min_speed: DEFAULT_MIN_SPEED,
            max_speed: DEFAULT_MAX_SPEED,
            threshold: DEFAULT_THRESHOLD,
            kernel: Kernel::default(),
            boundary: BoundaryPolicy::default(),
            assembly: AssemblyStrategy::default(),
            influence_cutoff: None,
            cache: CachePolicy::default(),
            cache_tolerance: DEFAULT_CACHE_TOLERANCE,
            frame_budget_ms: DEFAULT_FRAME_BUDGET_MS,
            budget_window: DEFAULT_BUDGET_WINDOW,
            seed: DEFAULT_SEED,
        }
    }
}

impl SceneConfig {
    /// Reads a config from a JSON object and validates it.
    ///
    /// Numeric keys that are missing or mistyped fall back to defaults.
    /// Name-valued keys (`kernel`, `boundary`, `assembly`, `cache`) must name
    /// a known variant when present.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        let d = Self::default();
        let config = Self {
            width: param_f64(params, "width", d.width),
            height: param_f64(params, "height", d.height),
            spacing: param_f64(params, "spacing", d.spacing),
            source_count: param_usize(params, "source_count", d.source_count),
            min_radius: param_f64(params, "min_radius", d.min_radius),
            max_radius: param_f64(params, "max_radius", d.max_radius),
            min_speed: param_f64(params, "min_speed", d.min_speed),
            max_speed: param_f64(params, "max_speed", d.max_speed),
            threshold: param_f64(params, "threshold", d.threshold),
            kernel: Kernel::from_name(&param_string(params, "kernel", d.kernel.name()))?,
            boundary: BoundaryPolicy::from_name(&param_string(
                params,
                "boundary",
                d.boundary.name(),
            ))?,
            assembly: AssemblyStrategy::from_name(&param_string(
                params,
                "assembly",
                d.assembly.name(),
            ))?,
            influence_cutoff: param_opt_f64(params, "influence_cutoff", d.influence_cutoff),
            cache: CachePolicy::from_name(&param_string(params, "cache", d.cache.name()))?,
            cache_tolerance: param_f64(params, "cache_tolerance", d.cache_tolerance),
            frame_budget_ms: param_f64(params, "frame_budget_ms", d.frame_budget_ms),
            budget_window: param_usize(params, "budget_window", d.budget_window),
            seed: param_u64(params, "seed", d.seed),
        };
        config.validate()?;
        Ok(config)
    }

    /// Current values as a JSON object accepted by [`from_json`](Self::from_json).
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("width".into(), json!(self.width));
        map.insert("height".into(), json!(self.height));
        map.insert("spacing".into(), json!(self.spacing));
        map.insert("source_count".into(), json!(self.source_count));
        map.insert("min_radius".into(), json!(self.min_radius));
        map.insert("max_radius".into(), json!(self.max_radius));
        map.insert("min_speed".into(), json!(self.min_speed));
        map.insert("max_speed".into(), json!(self.max_speed));
        map.insert("threshold".into(), json!(self.threshold));
        map.insert("kernel".into(), json!(self.kernel.name()));
        map.insert("boundary".into(), json!(self.boundary.name()));
        map.insert("assembly".into(), json!(self.assembly.name()));
        map.insert("influence_cutoff".into(), json!(self.influence_cutoff));
        map.insert("cache".into(), json!(self.cache.name()));
        map.insert("cache_tolerance".into(), json!(self.cache_tolerance));
        map.insert("frame_budget_ms".into(), json!(self.frame_budget_ms));
        map.insert("budget_window".into(), json!(self.budget_window));
        map.insert("seed".into(), json!(self.seed));
        Value::Object(map)
    }

    /// Rejects configurations that cannot produce a scene.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(is_positive(self.width) && is_positive(self.height)) {
            return Err(EngineError::InvalidDomain {
                width: self.width,
                height: self.height,
            });
        }
        if !is_positive(self.spacing) {
            return Err(EngineError::InvalidSpacing(self.spacing));
        }
        if !is_positive(self.threshold) {
            return Err(EngineError::InvalidThreshold(self.threshold));
        }
        if !(is_positive(self.min_radius)
            && self.max_radius.is_finite()
            && self.min_radius <= self.max_radius)
        {
            return Err(EngineError::InvalidRadiusRange {
                min: self.min_radius,
                max: self.max_radius,
            });
        }
        if !(self.min_speed >= 0.0 && self.max_speed.is_finite() && self.min_speed <= self.max_speed)
        {
            return Err(EngineError::InvalidSpeedRange {
                min: self.min_speed,
                max: self.max_speed,
            });
        }
        if let Some(cutoff) = self.influence_cutoff {
            let min = FieldSourceSet::min_influence_cutoff(self.source_count);
            if !(is_positive(cutoff) && cutoff >= min) {
                return Err(EngineError::InvalidCutoff { cutoff, min });
            }
        }
        if !(self.cache_tolerance >= 0.0 && self.cache_tolerance.is_finite()) {
            return Err(EngineError::InvalidCacheSettings(format!(
                "cache_tolerance {} must be non-negative",
                self.cache_tolerance
            )));
        }
        if !is_positive(self.frame_budget_ms) {
            return Err(EngineError::InvalidCacheSettings(format!(
                "frame_budget_ms {} must be positive",
                self.frame_budget_ms
            )));
        }
        if self.budget_window == 0 {
            return Err(EngineError::InvalidCacheSettings(
                "budget_window must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Upper corner of the domain.
    pub fn bounds(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Schema of every key [`from_json`](Self::from_json) understands.
    pub fn param_schema() -> Value {
        let d = Self::default();
        let mut schema = Map::new();
        let mut number = |key: &str, default: Value, min: f64, description: &str| {
            schema.insert(
                key.to_string(),
                json!({"type": "number", "default": default, "min": min, "description": description}),
            );
        };
        number("width", json!(d.width), 0.0, "Domain width");
        number("height", json!(d.height), 0.0, "Domain height");
        number("spacing", json!(d.spacing), 0.0, "Distance between neighboring lattice vertices");
        number("min_radius", json!(d.min_radius), 0.0, "Smallest source radius");
        number("max_radius", json!(d.max_radius), 0.0, "Largest source radius");
        number("min_speed", json!(d.min_speed), 0.0, "Smallest velocity component magnitude");
        number("max_speed", json!(d.max_speed), 0.0, "Largest velocity component magnitude");
        number("threshold", json!(d.threshold), 0.0, "Iso-value of the extracted contour");
        number(
            "influence_cutoff",
            Value::Null,
            0.0,
            "Ignore sources farther than this multiple of their radius; at least source_count / 1e-6 (null sums all)",
        );
        number(
            "cache_tolerance",
            json!(d.cache_tolerance),
            0.0,
            "Summed source displacement that invalidates cached samples",
        );
        number(
            "frame_budget_ms",
            json!(d.frame_budget_ms),
            0.0,
            "Frame time above which adaptive caching turns on",
        );

        let integers = [
            ("source_count", d.source_count as u64, 0, "Number of moving field sources"),
            ("budget_window", d.budget_window as u64, 1, "Frames averaged by the adaptive cache"),
            ("seed", d.seed, 0, "PRNG seed for the initial sources"),
        ];
        for (key, default, min, description) in integers {
            schema.insert(
                key.to_string(),
                json!({"type": "integer", "default": default, "min": min, "description": description}),
            );
        }

        let choices: [(&str, &str, &[&str], &str); 4] = [
            ("kernel", d.kernel.name(), Kernel::list_names(), "Field falloff kernel"),
            (
                "boundary",
                d.boundary.name(),
                BoundaryPolicy::list_names(),
                "Whether contours are closed along the lattice border",
            ),
            (
                "assembly",
                d.assembly.name(),
                AssemblyStrategy::list_names(),
                "Segment assembly strategy",
            ),
            ("cache", d.cache.name(), CachePolicy::list_names(), "Vertex sample reuse policy"),
        ];
        for (key, default, options, description) in choices {
            schema.insert(
                key.to_string(),
                json!({"type": "string", "default": default, "options": options, "description": description}),
            );
        }

        Value::Object(schema)
    }
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn from_empty_json_gives_defaults() {
        let config = SceneConfig::from_json(&json!({})).unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn from_json_reads_overrides() {
        let config = SceneConfig::from_json(&json!({
            "width": 400,
            "height": 300.5,
            "spacing": 5,
            "source_count": 3,
            "threshold": 1.25,
            "kernel": "inverse_square",
            "boundary": "closed",
            "assembly": "marching_cells",
            "influence_cutoff": 1e7,
            "cache": "disabled",
            "seed": 7,
        }))
        .unwrap();
        assert_eq!(config.width, 400.0);
        assert_eq!(config.height, 300.5);
        assert_eq!(config.spacing, 5.0);
        assert_eq!(config.source_count, 3);
        assert_eq!(config.threshold, 1.25);
        assert_eq!(config.kernel, Kernel::InverseSquare);
        assert_eq!(config.boundary, BoundaryPolicy::Closed);
        assert_eq!(config.assembly, AssemblyStrategy::MarchingCells);
        assert_eq!(config.influence_cutoff, Some(1e7));
        assert_eq!(config.cache, CachePolicy::Disabled);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn to_json_round_trips() {
        let config = SceneConfig {
            width: 640.0,
            kernel: Kernel::InverseSquare,
            influence_cutoff: Some(3e7),
            cache: CachePolicy::Always,
            ..SceneConfig::default()
        };
        let restored = SceneConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(matches!(
            SceneConfig::from_json(&json!({"kernel": "cubic"})),
            Err(EngineError::UnknownKernel(_))
        ));
        assert!(matches!(
            SceneConfig::from_json(&json!({"boundary": "wrap"})),
            Err(EngineError::UnknownBoundary(_))
        ));
        assert!(matches!(
            SceneConfig::from_json(&json!({"assembly": "triangles"})),
            Err(EngineError::UnknownStrategy(_))
        ));
        assert!(matches!(
            SceneConfig::from_json(&json!({"cache": "sometimes"})),
            Err(EngineError::UnknownCachePolicy(_))
        ));
    }

    #[test]
    fn non_positive_domain_is_rejected() {
        for (w, h) in [(0.0, 10.0), (10.0, -1.0), (f64::NAN, 10.0), (f64::INFINITY, 10.0)] {
            let config = SceneConfig {
                width: w,
                height: h,
                ..SceneConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(EngineError::InvalidDomain { .. })),
                "accepted domain {w}x{h}"
            );
        }
    }

    #[test]
    fn non_positive_spacing_is_rejected() {
        for spacing in [0.0, -5.0, f64::NAN] {
            let config = SceneConfig {
                spacing,
                ..SceneConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(EngineError::InvalidSpacing(_))
            ));
        }
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let radius = SceneConfig {
            min_radius: 50.0,
            max_radius: 10.0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            radius.validate(),
            Err(EngineError::InvalidRadiusRange { .. })
        ));
        let speed = SceneConfig {
            min_speed: -1.0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            speed.validate(),
            Err(EngineError::InvalidSpeedRange { .. })
        ));
    }

    #[test]
    fn bad_cutoff_and_cache_settings_are_rejected() {
        let cutoff = SceneConfig {
            influence_cutoff: Some(0.0),
            ..SceneConfig::default()
        };
        assert!(matches!(
            cutoff.validate(),
            Err(EngineError::InvalidCutoff { .. })
        ));
        // 15 sources need a multiplier of at least 1.5e7.
        let short = SceneConfig {
            influence_cutoff: Some(1.0e7),
            ..SceneConfig::default()
        };
        assert!(matches!(
            short.validate(),
            Err(EngineError::InvalidCutoff { min, .. }) if (min - 1.5e7).abs() < 1.0
        ));
        let enough = SceneConfig {
            influence_cutoff: Some(1.5e7),
            ..SceneConfig::default()
        };
        assert!(enough.validate().is_ok());
        let window = SceneConfig {
            budget_window: 0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            window.validate(),
            Err(EngineError::InvalidCacheSettings(_))
        ));
    }

    #[test]
    fn zero_sources_is_valid() {
        let config = SceneConfig {
            source_count: 0,
            ..SceneConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn param_schema_covers_every_json_key() {
        let schema = SceneConfig::param_schema();
        let values = SceneConfig::default().to_json();
        for key in values.as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "schema missing {key}");
            assert!(schema[key].get("description").is_some(), "{key} missing description");
        }
    }
}
