//! PNG output of a contour frame.
//!
//! Feature-gated behind `png` (default on) so consumers that only need SVG or
//! JSON skip the `image` crate. Rasterization lives in [`crate::pixel`].

use std::path::Path;

use metaball_core::{EngineError, Segment};

use crate::overlay::DebugOverlay;
use crate::pixel::{check_raster_size, frame_to_rgba, LineStyle};

/// Rasterizes `segments` (and the overlay, if any) into a `width` x `height`
/// image and saves it as PNG.
///
/// Returns `EngineError::InvalidDomain` for rasters over the pixel limit and
/// `EngineError::Io` on write failure.
pub fn write_png(
    segments: &[Segment],
    overlay: Option<&DebugOverlay>,
    width: u32,
    height: u32,
    style: &LineStyle,
    path: &Path,
) -> Result<(), EngineError> {
    check_raster_size(width, height)?;
    let rgba = frame_to_rgba(segments, overlay, width, height, style);
    let img = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::OverlayStyle;
    use metaball_core::DVec2;

    #[test]
    fn write_png_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let style = LineStyle::default();
        let seg = Segment::new(DVec2::new(0.5, 4.5), DVec2::new(15.5, 4.5));

        write_png(&[seg], None, 16, 12, &style, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 12);
        assert_eq!(img.get_pixel(8, 4).0, style.stroke);
        assert_eq!(img.get_pixel(8, 0).0, style.background);
    }

    #[test]
    fn write_png_to_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.png");
        let result = write_png(&[], None, 4, 4, &LineStyle::default(), &path);
        assert!(matches!(result, Err(EngineError::Io(_))));
    }

    #[test]
    fn oversized_raster_is_rejected_before_allocating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        let result = write_png(&[], None, 1_000_000_000, 1_000, &LineStyle::default(), &path);
        assert!(matches!(result, Err(EngineError::InvalidDomain { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn write_png_draws_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.png");
        let overlay = DebugOverlay {
            grid_lines: Vec::new(),
            vertices: vec![(DVec2::new(6.0, 6.0), true)],
            sources: Vec::new(),
            style: OverlayStyle::default(),
        };
        write_png(&[], Some(&overlay), 12, 12, &LineStyle::default(), &path).unwrap();
        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(6, 6).0, overlay.style.active_vertex);
    }
}
