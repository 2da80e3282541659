//! Rasterizes contour segments, and optionally a debug overlay, into an RGBA8
//! pixel buffer.
//!
//! Always available (no feature gate); the PNG writer is a thin layer on top.

use metaball_core::{DVec2, EngineError, Segment};

use crate::overlay::{DebugOverlay, SOURCE_DOT_RADIUS, VERTEX_DOT_RADIUS};

/// Largest raster a snapshot may allocate (256 MiB of RGBA).
pub const MAX_RASTER_PIXELS: u64 = 1 << 26;

/// Colors used when rasterizing segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    pub background: [u8; 4],
    pub stroke: [u8; 4],
}

impl Default for LineStyle {
    /// Green lines on black.
    fn default() -> Self {
        Self {
            background: [0, 0, 0, 255],
            stroke: [0, 255, 0, 255],
        }
    }
}

/// Rejects empty rasters and rasters above [`MAX_RASTER_PIXELS`].
pub fn check_raster_size(width: u32, height: u32) -> Result<(), EngineError> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels == 0 || pixels > MAX_RASTER_PIXELS {
        return Err(EngineError::InvalidDomain {
            width: f64::from(width),
            height: f64::from(height),
        });
    }
    Ok(())
}

struct Raster {
    width: usize,
    height: usize,
    buf: Vec<u8>,
}

impl Raster {
    fn new(width: u32, height: u32, background: [u8; 4]) -> Self {
        let (width, height) = (width as usize, height as usize);
        let buf = std::iter::repeat(background)
            .take(width * height)
            .flatten()
            .collect();
        Self { width, height, buf }
    }

    fn plot(&mut self, p: DVec2, color: [u8; 4]) {
        let (x, y) = (p.x.floor(), p.y.floor());
        if x >= 0.0 && y >= 0.0 && x < self.width as f64 && y < self.height as f64 {
            let offset = (y as usize * self.width + x as usize) * 4;
            self.buf[offset..offset + 4].copy_from_slice(&color);
        }
    }

    /// DDA walk from start to end, clipped to the image first.
    fn line(&mut self, segment: &Segment, color: [u8; 4]) {
        let Some(segment) = clip(segment, self.width as f64, self.height as f64) else {
            return;
        };
        let delta = segment.end - segment.start;
        let steps = delta.x.abs().max(delta.y.abs()).ceil();
        if !steps.is_finite() {
            return;
        }
        let steps = steps as usize;
        if steps == 0 {
            self.plot(segment.start, color);
            return;
        }
        let step = delta / steps as f64;
        for k in 0..=steps {
            self.plot(segment.start + step * k as f64, color);
        }
    }

    /// Fills every pixel whose center lies within `radius` of `center`.
    fn disc(&mut self, center: DVec2, radius: f64, color: [u8; 4]) {
        let x0 = (center.x - radius).floor().max(0.0);
        let y0 = (center.y - radius).floor().max(0.0);
        let x1 = (center.x + radius).ceil().min(self.width as f64);
        let y1 = (center.y + radius).ceil().min(self.height as f64);
        if !(x0 < x1 && y0 < y1) {
            return;
        }
        for y in y0 as usize..y1 as usize {
            for x in x0 as usize..x1 as usize {
                let p = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                if p.distance_squared(center) <= radius * radius {
                    self.plot(p, color);
                }
            }
        }
    }

    /// Circle outline as a closed polyline of about one-pixel chords.
    fn ring(&mut self, center: DVec2, radius: f64, color: [u8; 4]) {
        let chords = (std::f64::consts::TAU * radius).ceil();
        if !chords.is_finite() {
            return;
        }
        let chords = (chords as usize).clamp(16, 1 << 16);
        let point = |k: usize| {
            let angle = std::f64::consts::TAU * k as f64 / chords as f64;
            center + DVec2::new(angle.cos(), angle.sin()) * radius
        };
        for k in 0..chords {
            self.line(&Segment::new(point(k), point(k + 1)), color);
        }
    }
}

/// Liang-Barsky clip of `segment` to `[0, width] x [0, height]`.
fn clip(segment: &Segment, width: f64, height: f64) -> Option<Segment> {
    let (p, d) = (segment.start, segment.end - segment.start);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (q, r) in [
        (-d.x, p.x),
        (d.x, width - p.x),
        (-d.y, p.y),
        (d.y, height - p.y),
    ] {
        if q == 0.0 {
            if r < 0.0 {
                return None;
            }
        } else {
            let t = r / q;
            if q < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
        }
    }
    if !(t0 <= t1) {
        return None;
    }
    Some(Segment::new(p + d * t0, p + d * t1))
}

/// Draws `segments` into a `width * height * 4` byte buffer.
///
/// One domain unit maps to one pixel. Lines are plotted with a DDA walk;
/// points outside the image are dropped. Callers bound the size with
/// [`check_raster_size`].
pub fn segments_to_rgba(segments: &[Segment], width: u32, height: u32, style: &LineStyle) -> Vec<u8> {
    frame_to_rgba(segments, None, width, height, style)
}

/// [`segments_to_rgba`] with an optional debug overlay.
///
/// Layers, bottom to top: background, lattice lines, vertex dots, contour
/// segments, source centers and radius rings.
pub fn frame_to_rgba(
    segments: &[Segment],
    overlay: Option<&DebugOverlay>,
    width: u32,
    height: u32,
    style: &LineStyle,
) -> Vec<u8> {
    let mut raster = Raster::new(width, height, style.background);

    if let Some(overlay) = overlay {
        for line in &overlay.grid_lines {
            raster.line(line, overlay.style.grid);
        }
        for &(position, active) in &overlay.vertices {
            raster.disc(position, VERTEX_DOT_RADIUS, overlay.vertex_color(active));
        }
    }

    for segment in segments {
        raster.line(segment, style.stroke);
    }

    if let Some(overlay) = overlay {
        for &(center, radius) in &overlay.sources {
            raster.disc(center, SOURCE_DOT_RADIUS, overlay.style.source_center);
            raster.ring(center, radius, overlay.style.source_ring);
        }
    }
    raster.buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::OverlayStyle;

    fn pixel(buf: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        [buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]
    }

    #[test]
    fn buffer_has_rgba_length_and_background() {
        let style = LineStyle::default();
        let buf = segments_to_rgba(&[], 8, 4, &style);
        assert_eq!(buf.len(), 8 * 4 * 4);
        assert!(buf.chunks(4).all(|px| px == style.background));
    }

    #[test]
    fn horizontal_segment_sets_every_pixel_along_it() {
        let style = LineStyle::default();
        let seg = Segment::new(DVec2::new(1.5, 2.5), DVec2::new(6.5, 2.5));
        let buf = segments_to_rgba(&[seg], 10, 5, &style);
        for x in 1..=6 {
            assert_eq!(pixel(&buf, 10, x, 2), style.stroke, "x = {x}");
        }
        assert_eq!(pixel(&buf, 10, 0, 2), style.background);
        assert_eq!(pixel(&buf, 10, 7, 2), style.background);
        assert_eq!(pixel(&buf, 10, 3, 1), style.background);
    }

    #[test]
    fn diagonal_segment_is_connected() {
        let style = LineStyle::default();
        let seg = Segment::new(DVec2::new(0.5, 0.5), DVec2::new(7.5, 7.5));
        let buf = segments_to_rgba(&[seg], 8, 8, &style);
        for i in 0..8 {
            assert_eq!(pixel(&buf, 8, i, i), style.stroke);
        }
    }

    #[test]
    fn degenerate_segment_plots_one_pixel() {
        let style = LineStyle::default();
        let seg = Segment::new(DVec2::new(3.2, 1.7), DVec2::new(3.2, 1.7));
        let buf = segments_to_rgba(&[seg], 5, 5, &style);
        let lit = buf.chunks(4).filter(|px| *px == style.stroke).count();
        assert_eq!(lit, 1);
        assert_eq!(pixel(&buf, 5, 3, 1), style.stroke);
    }

    #[test]
    fn custom_style_is_used() {
        let style = LineStyle {
            background: [255, 255, 255, 255],
            stroke: [200, 0, 0, 128],
        };
        let seg = Segment::new(DVec2::new(0.5, 0.5), DVec2::new(0.5, 0.5));
        let buf = segments_to_rgba(&[seg], 2, 1, &style);
        assert_eq!(pixel(&buf, 2, 0, 0), style.stroke);
        assert_eq!(pixel(&buf, 2, 1, 0), style.background);
    }

    #[test]
    fn far_outside_segment_is_clipped_away() {
        let style = LineStyle::default();
        let seg = Segment::new(DVec2::new(-1e12, -5.0), DVec2::new(1e12, -5.0));
        let buf = segments_to_rgba(&[seg], 4, 4, &style);
        assert!(buf.chunks(4).all(|px| px == style.background));
    }

    #[test]
    fn long_segment_through_image_is_drawn() {
        let style = LineStyle::default();
        let seg = Segment::new(DVec2::new(-1e12, 1.5), DVec2::new(1e12, 1.5));
        let buf = segments_to_rgba(&[seg], 6, 3, &style);
        for x in 0..6 {
            assert_eq!(pixel(&buf, 6, x, 1), style.stroke, "x = {x}");
        }
    }

    // -- Size limit --

    #[test]
    fn raster_size_limit() {
        assert!(check_raster_size(1280, 720).is_ok());
        assert!(check_raster_size(1 << 13, 1 << 13).is_ok());
        assert!(matches!(
            check_raster_size(1 << 13, (1 << 13) + 1),
            Err(EngineError::InvalidDomain { .. })
        ));
        assert!(matches!(
            check_raster_size(u32::MAX, u32::MAX),
            Err(EngineError::InvalidDomain { .. })
        ));
        assert!(check_raster_size(0, 10).is_err());
    }

    // -- Debug overlay --

    fn overlay() -> DebugOverlay {
        DebugOverlay {
            grid_lines: vec![Segment::new(DVec2::new(0.0, 0.5), DVec2::new(31.0, 0.5))],
            vertices: vec![(DVec2::new(4.0, 10.0), true), (DVec2::new(10.0, 10.0), false)],
            sources: vec![(DVec2::new(20.0, 20.0), 8.0)],
            style: OverlayStyle::default(),
        }
    }

    #[test]
    fn overlay_layers_are_drawn() {
        let style = LineStyle::default();
        let overlay = overlay();
        let buf = frame_to_rgba(&[], Some(&overlay), 32, 32, &style);
        assert_eq!(pixel(&buf, 32, 15, 0), overlay.style.grid);
        assert_eq!(pixel(&buf, 32, 4, 10), overlay.style.active_vertex);
        assert_eq!(pixel(&buf, 32, 10, 10), overlay.style.inactive_vertex);
        assert_eq!(pixel(&buf, 32, 20, 20), overlay.style.source_center);
        // Rightmost point of the ring.
        assert_eq!(pixel(&buf, 32, 28, 20), overlay.style.source_ring);
        assert_eq!(pixel(&buf, 32, 24, 20), style.background);
    }

    #[test]
    fn contour_is_drawn_over_grid_and_under_sources() {
        let style = LineStyle::default();
        let overlay = overlay();
        let contour = [
            Segment::new(DVec2::new(15.5, 0.0), DVec2::new(15.5, 31.0)),
        ];
        let buf = frame_to_rgba(&contour, Some(&overlay), 32, 32, &style);
        assert_eq!(pixel(&buf, 32, 15, 0), style.stroke);
        let plain = segments_to_rgba(&contour, 32, 32, &style);
        assert_eq!(pixel(&plain, 32, 15, 5), style.stroke);
        assert_eq!(pixel(&plain, 32, 20, 20), style.background);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn out_of_range_segments_never_panic(
                x0 in -100.0_f64..100.0, y0 in -100.0_f64..100.0,
                x1 in -100.0_f64..100.0, y1 in -100.0_f64..100.0,
            ) {
                let seg = Segment::new(DVec2::new(x0, y0), DVec2::new(x1, y1));
                let buf = segments_to_rgba(&[seg], 16, 16, &LineStyle::default());
                prop_assert_eq!(buf.len(), 16 * 16 * 4);
            }
        }
    }
}
