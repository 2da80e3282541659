#![deny(unsafe_code)]
//! Offline snapshots of a metaball frame.
//!
//! Turns the segment list of a [`Scene`](metaball_core::Scene) into a PNG, SVG
//! or JSON file. The CLI picks the format from the output file's extension
//! through [`SnapshotFormat::from_path`]. PNG and SVG can also carry a
//! [`DebugOverlay`] of the lattice and the sources.

pub mod overlay;
pub mod pixel;
pub mod svg;

#[cfg(feature = "png")]
pub mod snapshot;

use std::path::Path;

use metaball_core::{EngineError, Segment};

pub use overlay::{DebugOverlay, OverlayStyle};
pub use pixel::{LineStyle, MAX_RASTER_PIXELS};

const FORMAT_NAMES: &[&str] = &["png", "svg", "json"];

/// Output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Png,
    Svg,
    Json,
}

impl SnapshotFormat {
    /// Looks a format up by name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Ok(SnapshotFormat::Png),
            "svg" => Ok(SnapshotFormat::Svg),
            "json" => Ok(SnapshotFormat::Json),
            _ => Err(EngineError::UnknownFormat(name.to_string())),
        }
    }

    /// Format implied by the extension of `path`.
    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| EngineError::UnknownFormat(path.display().to_string()))
            .and_then(Self::from_name)
    }

    pub fn name(self) -> &'static str {
        match self {
            SnapshotFormat::Png => "png",
            SnapshotFormat::Svg => "svg",
            SnapshotFormat::Json => "json",
        }
    }

    pub fn list_names() -> &'static [&'static str] {
        FORMAT_NAMES
    }
}

/// Writes the segments as a pretty-printed JSON array of
/// `{"start": [x, y], "end": [x, y]}` objects.
pub fn write_json(segments: &[Segment], path: &Path) -> Result<(), EngineError> {
    let text =
        serde_json::to_string_pretty(segments).map_err(|e| EngineError::Io(e.to_string()))?;
    std::fs::write(path, text).map_err(|e| EngineError::Io(e.to_string()))
}

/// Writes one frame in `format` with the default line style.
///
/// `width` and `height` are the domain size; raster formats round them up to
/// whole pixels. JSON output holds the segments only and ignores `overlay`.
pub fn write_snapshot(
    format: SnapshotFormat,
    segments: &[Segment],
    overlay: Option<&DebugOverlay>,
    width: f64,
    height: f64,
    path: &Path,
) -> Result<(), EngineError> {
    let style = LineStyle::default();
    match format {
        SnapshotFormat::Png => write_raster(segments, overlay, width, height, &style, path),
        SnapshotFormat::Svg => svg::write_svg(segments, overlay, width, height, &style, path),
        SnapshotFormat::Json => write_json(segments, path),
    }
}

#[cfg(feature = "png")]
fn write_raster(
    segments: &[Segment],
    overlay: Option<&DebugOverlay>,
    width: f64,
    height: f64,
    style: &LineStyle,
    path: &Path,
) -> Result<(), EngineError> {
    let (w, h) = raster_size(width, height)?;
    snapshot::write_png(segments, overlay, w, h, style, path)
}

#[cfg(not(feature = "png"))]
fn write_raster(
    _segments: &[Segment],
    _overlay: Option<&DebugOverlay>,
    _width: f64,
    _height: f64,
    _style: &LineStyle,
    _path: &Path,
) -> Result<(), EngineError> {
    Err(EngineError::UnknownFormat(
        "png (built without the `png` feature)".into(),
    ))
}

/// Pixel dimensions covering a `width` x `height` domain, at most
/// [`MAX_RASTER_PIXELS`] in total.
#[cfg_attr(not(feature = "png"), allow(dead_code))]
fn raster_size(width: f64, height: f64) -> Result<(u32, u32), EngineError> {
    let fits = |v: f64| v.is_finite() && v > 0.0 && v.ceil() <= f64::from(u32::MAX);
    if !(fits(width) && fits(height)) {
        return Err(EngineError::InvalidDomain { width, height });
    }
    let (w, h) = (width.ceil() as u32, height.ceil() as u32);
    pixel::check_raster_size(w, h).map_err(|_| EngineError::InvalidDomain { width, height })?;
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaball_core::{DVec2, Scene, SceneConfig, Source};

    fn frame() -> (Vec<Segment>, f64, f64) {
        let config = SceneConfig {
            width: 120.0,
            height: 80.0,
            ..SceneConfig::default()
        };
        let source = Source::new(DVec2::new(60.0, 40.0), 40.0, DVec2::ZERO);
        let scene = Scene::with_sources(config, vec![source]).unwrap();
        (scene.segments().to_vec(), 120.0, 80.0)
    }

    // -- Format registry --

    #[test]
    fn from_name_accepts_every_listed_name() {
        for &name in SnapshotFormat::list_names() {
            assert_eq!(SnapshotFormat::from_name(name).unwrap().name(), name);
        }
        assert_eq!(SnapshotFormat::from_name("SVG").unwrap(), SnapshotFormat::Svg);
    }

    #[test]
    fn from_name_unknown_returns_error() {
        assert!(matches!(
            SnapshotFormat::from_name("gif"),
            Err(EngineError::UnknownFormat(_))
        ));
    }

    #[test]
    fn from_path_uses_extension() {
        assert_eq!(
            SnapshotFormat::from_path(Path::new("out/frame.png")).unwrap(),
            SnapshotFormat::Png
        );
        assert_eq!(
            SnapshotFormat::from_path(Path::new("frame.JSON")).unwrap(),
            SnapshotFormat::Json
        );
        assert!(matches!(
            SnapshotFormat::from_path(Path::new("frame")),
            Err(EngineError::UnknownFormat(_))
        ));
    }

    // -- Writers --

    #[test]
    fn write_json_round_trips_segments() {
        let (segments, _, _) = frame();
        assert!(!segments.is_empty());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.json");
        write_json(&segments, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: Vec<Segment> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, segments);
    }

    #[test]
    fn write_snapshot_svg_contains_every_segment() {
        let (segments, w, h) = frame();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.svg");
        write_snapshot(SnapshotFormat::Svg, &segments, None, w, h, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("<line ").count(), segments.len());
    }

    #[cfg(feature = "png")]
    #[test]
    fn write_snapshot_png_rounds_size_up() {
        let (segments, _, _) = frame();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        write_snapshot(SnapshotFormat::Png, &segments, None, 120.5, 80.0, &path).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (121, 80));
    }

    #[test]
    fn raster_size_rejects_bad_domain() {
        assert!(matches!(
            raster_size(0.0, 10.0),
            Err(EngineError::InvalidDomain { .. })
        ));
        assert_eq!(raster_size(10.2, 3.0).unwrap(), (11, 3));
    }

    #[test]
    fn raster_size_rejects_huge_domain() {
        assert!(matches!(
            raster_size(1e9, 720.0),
            Err(EngineError::InvalidDomain { .. })
        ));
        assert!(raster_size(8192.0, 8192.0).is_ok());
    }

    #[cfg(feature = "png")]
    #[test]
    fn write_snapshot_png_of_huge_domain_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        let result = write_snapshot(SnapshotFormat::Png, &[], None, 1e9, 720.0, &path);
        assert!(matches!(result, Err(EngineError::InvalidDomain { .. })));
    }

    #[test]
    fn write_snapshot_svg_with_overlay() {
        let config = SceneConfig {
            width: 120.0,
            height: 80.0,
            ..SceneConfig::default()
        };
        let source = Source::new(DVec2::new(60.0, 40.0), 40.0, DVec2::ZERO);
        let scene = Scene::with_sources(config, vec![source]).unwrap();
        let overlay = DebugOverlay::from_scene(&scene);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.svg");
        write_snapshot(SnapshotFormat::Svg, scene.segments(), Some(&overlay), 120.0, 80.0, &path)
            .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.matches("<line ").count(),
            scene.segments().len() + overlay.grid_lines.len()
        );
        assert_eq!(
            text.matches("<circle ").count(),
            overlay.vertices.len() + 2
        );
    }
}
