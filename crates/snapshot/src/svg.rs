//! SVG output: one `<line>` per segment over a filled background, with an
//! optional debug overlay.

use std::fmt::Write as _;
use std::path::Path;

use metaball_core::{EngineError, Segment};

use crate::overlay::{DebugOverlay, SOURCE_DOT_RADIUS, VERTEX_DOT_RADIUS};
use crate::pixel::LineStyle;

fn css_color([r, g, b, a]: [u8; 4]) -> String {
    format!("rgba({r}, {g}, {b}, {:.3})", f64::from(a) / 255.0)
}

// Writing to a String cannot fail, so the `writeln!` results below are ignored.
fn push_lines(svg: &mut String, segments: &[Segment]) {
    for s in segments {
        let _ = writeln!(
            svg,
            r#"    <line x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" />"#,
            s.start.x, s.start.y, s.end.x, s.end.y
        );
    }
}

/// Builds an SVG document whose view box is `[0, width] x [0, height]`.
pub fn segments_to_svg(segments: &[Segment], width: f64, height: f64, style: &LineStyle) -> String {
    frame_to_svg(segments, None, width, height, style)
}

/// [`segments_to_svg`] with an optional debug overlay, layered like
/// [`frame_to_rgba`](crate::pixel::frame_to_rgba).
pub fn frame_to_svg(
    segments: &[Segment],
    overlay: Option<&DebugOverlay>,
    width: f64,
    height: f64,
    style: &LineStyle,
) -> String {
    let background = css_color(style.background);
    let stroke = css_color(style.stroke);
    let mut svg = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg width="{width}" height="{height}" viewBox="0 0 {width} {height}" xmlns="http://www.w3.org/2000/svg">
  <rect x="0" y="0" width="{width}" height="{height}" fill="{background}" />
"#
    );

    if let Some(overlay) = overlay {
        let _ = writeln!(
            svg,
            r#"  <g class="grid" stroke="{}" stroke-width="1" fill="none">"#,
            css_color(overlay.style.grid)
        );
        push_lines(&mut svg, &overlay.grid_lines);
        svg.push_str("  </g>\n  <g class=\"vertices\">\n");
        for &(p, active) in &overlay.vertices {
            let _ = writeln!(
                svg,
                r#"    <circle cx="{:.3}" cy="{:.3}" r="{VERTEX_DOT_RADIUS}" fill="{}" />"#,
                p.x,
                p.y,
                css_color(overlay.vertex_color(active))
            );
        }
        svg.push_str("  </g>\n");
    }

    let _ = writeln!(
        svg,
        r#"  <g class="contour" stroke="{stroke}" stroke-width="1" stroke-linecap="round" fill="none">"#
    );
    push_lines(&mut svg, segments);
    svg.push_str("  </g>\n");

    if let Some(overlay) = overlay {
        let center = css_color(overlay.style.source_center);
        let ring = css_color(overlay.style.source_ring);
        svg.push_str("  <g class=\"sources\">\n");
        for &(c, radius) in &overlay.sources {
            let _ = writeln!(
                svg,
                r#"    <circle cx="{:.3}" cy="{:.3}" r="{SOURCE_DOT_RADIUS}" fill="{center}" />"#,
                c.x, c.y
            );
            let _ = writeln!(
                svg,
                r#"    <circle cx="{:.3}" cy="{:.3}" r="{radius:.3}" fill="none" stroke="{ring}" stroke-width="1" />"#,
                c.x, c.y
            );
        }
        svg.push_str("  </g>\n");
    }

    svg.push_str("</svg>\n");
    svg
}

/// Writes [`frame_to_svg`] output to `path`.
pub fn write_svg(
    segments: &[Segment],
    overlay: Option<&DebugOverlay>,
    width: f64,
    height: f64,
    style: &LineStyle,
    path: &Path,
) -> Result<(), EngineError> {
    std::fs::write(path, frame_to_svg(segments, overlay, width, height, style))
        .map_err(|e| EngineError::Io(e.to_string()))
}
