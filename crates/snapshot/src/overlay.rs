//! Debug overlay: the lattice, every vertex colored by its active state, and
//! each source's center and radius ring.

use metaball_core::{ContourGrid, DVec2, FieldSourceSet, Scene, Segment};

/// Overlay colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyle {
    pub grid: [u8; 4],
    pub active_vertex: [u8; 4],
    pub inactive_vertex: [u8; 4],
    pub source_center: [u8; 4],
    pub source_ring: [u8; 4],
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            grid: [50, 50, 70, 255],
            active_vertex: [0, 255, 0, 255],
            inactive_vertex: [50, 50, 70, 255],
            source_center: [255, 0, 0, 255],
            source_ring: [255, 255, 255, 255],
        }
    }
}

/// Radius of the dot drawn on each lattice vertex.
pub const VERTEX_DOT_RADIUS: f64 = 2.0;

/// Radius of the dot drawn on each source center.
pub const SOURCE_DOT_RADIUS: f64 = 3.0;

/// Geometry of one frame's debug overlay, captured from a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugOverlay {
    /// One segment per lattice row and column.
    pub grid_lines: Vec<Segment>,
    /// Vertex position and active flag.
    pub vertices: Vec<(DVec2, bool)>,
    /// Source center and radius.
    pub sources: Vec<(DVec2, f64)>,
    pub style: OverlayStyle,
}

impl DebugOverlay {
    /// Captures the scene's current lattice state and source positions.
    pub fn from_scene(scene: &Scene) -> Self {
        Self::from_parts(scene.grid(), scene.sources())
    }

    pub fn from_parts(grid: &ContourGrid, sources: &FieldSourceSet) -> Self {
        let lattice = grid.lattice();
        let s = lattice.spacing();
        let right = (lattice.cols() - 1) as f64 * s;
        let bottom = (lattice.rows() - 1) as f64 * s;

        let rows = (0..lattice.rows()).map(|j| {
            let y = j as f64 * s;
            Segment::new(DVec2::new(0.0, y), DVec2::new(right, y))
        });
        let cols = (0..lattice.cols()).map(|i| {
            let x = i as f64 * s;
            Segment::new(DVec2::new(x, 0.0), DVec2::new(x, bottom))
        });

        Self {
            grid_lines: rows.chain(cols).collect(),
            vertices: grid
                .vertices()
                .iter()
                .enumerate()
                .map(|(i, v)| (grid.vertex_position(i), v.active))
                .collect(),
            sources: sources
                .sources()
                .iter()
                .map(|src| (src.position, src.radius))
                .collect(),
            style: OverlayStyle::default(),
        }
    }

    pub fn vertex_color(&self, active: bool) -> [u8; 4] {
        if active {
            self.style.active_vertex
        } else {
            self.style.inactive_vertex
        }
    }
}
