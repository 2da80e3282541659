//! Error types for the metaball core.
//!
//! Every variant is a construction-time or I/O failure. Once a [`Scene`](crate::Scene)
//! is built, stepping and contour extraction cannot fail.

use thiserror::Error;

/// Errors produced while configuring or snapshotting a scene.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Domain width or height was not a positive finite number.
    #[error("invalid domain {width}x{height}: width and height must be positive and finite")]
    InvalidDomain { width: f64, height: f64 },

    /// Grid spacing was not a positive finite number.
    #[error("invalid grid spacing {0}: must be positive and finite")]
    InvalidSpacing(f64),

    /// Field threshold was not a positive finite number.
    #[error("invalid threshold {0}: must be positive and finite")]
    InvalidThreshold(f64),

    /// Source radius range was empty, negative, or non-finite.
    #[error("invalid radius range [{min}, {max}]: need 0 < min <= max")]
    InvalidRadiusRange { min: f64, max: f64 },

    /// Source speed range was empty, negative, or non-finite.
    #[error("invalid speed range [{min}, {max}]: need 0 <= min <= max")]
    InvalidSpeedRange { min: f64, max: f64 },

    /// Influence cutoff multiplier was non-finite or small enough that the
    /// skipped sources could move a vertex across the threshold.
    #[error("invalid influence cutoff {cutoff}: must be finite and at least {min}")]
    InvalidCutoff { cutoff: f64, min: f64 },

    /// Cache tolerance, frame budget, or budget window was out of range.
    #[error("invalid cache settings: {0}")]
    InvalidCacheSettings(String),

    /// The lattice would need more vertices than can be indexed.
    #[error("grid of {cols}x{rows} vertices is too large")]
    GridTooLarge { cols: usize, rows: usize },

    /// No segment assembly strategy with this name.
    #[error("unknown assembly strategy: {0}")]
    UnknownStrategy(String),

    /// No field kernel with this name.
    #[error("unknown field kernel: {0}")]
    UnknownKernel(String),

    /// No boundary policy with this name.
    #[error("unknown boundary policy: {0}")]
    UnknownBoundary(String),

    /// No cache policy with this name.
    #[error("unknown cache policy: {0}")]
    UnknownCachePolicy(String),

    /// No snapshot format with this name or extension.
    #[error("unknown snapshot format: {0}")]
    UnknownFormat(String),

    /// Writing a snapshot failed.
    #[error("i/o error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_domain_includes_dimensions() {
        let err = EngineError::InvalidDomain {
            width: -3.0,
            height: 720.0,
        };
        let msg = format!("{err}");
        assert!(msg.contains("-3"), "missing width in: {msg}");
        assert!(msg.contains("720"), "missing height in: {msg}");
    }

    #[test]
    fn invalid_spacing_includes_value() {
        let msg = format!("{}", EngineError::InvalidSpacing(0.0));
        assert!(msg.contains("spacing"), "expected 'spacing' in: {msg}");
    }

    #[test]
    fn invalid_radius_range_includes_bounds() {
        let err = EngineError::InvalidRadiusRange {
            min: 45.0,
            max: 15.0,
        };
        let msg = format!("{err}");
        assert!(msg.contains("45"), "missing min in: {msg}");
        assert!(msg.contains("15"), "missing max in: {msg}");
    }

    #[test]
    fn grid_too_large_includes_vertex_counts() {
        let err = EngineError::GridTooLarge {
            cols: 123_456,
            rows: 654_321,
        };
        let msg = format!("{err}");
        assert!(msg.contains("123456"), "missing cols in: {msg}");
        assert!(msg.contains("654321"), "missing rows in: {msg}");
    }

    #[test]
    fn unknown_names_are_echoed() {
        let cases = [
            EngineError::UnknownStrategy("zigzag".into()),
            EngineError::UnknownKernel("zigzag".into()),
            EngineError::UnknownBoundary("zigzag".into()),
            EngineError::UnknownCachePolicy("zigzag".into()),
            EngineError::UnknownFormat("zigzag".into()),
        ];
        for err in cases {
            let msg = format!("{err}");
            assert!(msg.contains("zigzag"), "missing name in: {msg}");
        }
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
