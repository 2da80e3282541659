//! Static lattice topology: integer addressing of vertices, edges and cells.
//!
//! The lattice covers `[0, width] × [0, height]` with spacing `s`. It has
//! `cols = ceil(width / s) + 1` columns and `rows = ceil(height / s) + 1` rows
//! of vertices, so when `s` does not divide the domain the last column or row
//! sits just past the far wall.
//!
//! Index layout (all row-major):
//!
//! ```text
//!   vertex (i, j)           -> j * cols + i
//!   horizontal edge (i, j)  -> j * (cols - 1) + i              (i, j)-(i+1, j)
//!   vertical edge (i, j)    -> H + j * cols + i                (i, j)-(i, j+1)
//!   cell (i, j)             -> j * (cols - 1) + i              corners (i, j)..(i+1, j+1)
//! ```
//!
//! where `H = (cols - 1) * rows` is the number of horizontal edges.

use glam::DVec2;

use crate::error::EngineError;

/// Vertex indices are stored as `u32` in the edge tables.
const MAX_VERTICES: usize = u32::MAX as usize;

/// Direction of a lattice edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Cell corners in clockwise order starting top-left (y grows downward).
pub const TOP_LEFT: usize = 0;
pub const TOP_RIGHT: usize = 1;
pub const BOTTOM_RIGHT: usize = 2;
pub const BOTTOM_LEFT: usize = 3;

/// Cell sides in clockwise order starting at the top. Side `k` runs from
/// corner `k` to corner `(k + 1) % 4`.
pub const TOP: usize = 0;
pub const RIGHT: usize = 1;
pub const BOTTOM: usize = 2;
pub const LEFT: usize = 3;

/// Dimensions and index arithmetic of a regular sampling lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    cols: usize,
    rows: usize,
    spacing: f64,
}

impl Lattice {
    /// Builds the lattice covering `[0, width] × [0, height]`.
    ///
    /// Fails on a non-positive domain or spacing, or when the vertex count
    /// does not fit the index type.
    pub fn new(width: f64, height: f64, spacing: f64) -> Result<Self, EngineError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(EngineError::InvalidDomain { width, height });
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(EngineError::InvalidSpacing(spacing));
        }
        let steps_x = (width / spacing).ceil();
        let steps_y = (height / spacing).ceil();
        if steps_x >= MAX_VERTICES as f64 || steps_y >= MAX_VERTICES as f64 {
            return Err(EngineError::GridTooLarge {
                cols: usize::MAX,
                rows: usize::MAX,
            });
        }
        let cols = steps_x as usize + 1;
        let rows = steps_y as usize + 1;
        match cols.checked_mul(rows) {
            Some(n) if n <= MAX_VERTICES => Ok(Self {
                cols,
                rows,
                spacing,
            }),
            _ => Err(EngineError::GridTooLarge { cols, rows }),
        }
    }

    /// Vertices per row.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Vertices per column.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn vertex_count(&self) -> usize {
        self.cols * self.rows
    }

    pub fn horizontal_edge_count(&self) -> usize {
        (self.cols - 1) * self.rows
    }

    pub fn vertical_edge_count(&self) -> usize {
        self.cols * (self.rows - 1)
    }

    pub fn edge_count(&self) -> usize {
        self.horizontal_edge_count() + self.vertical_edge_count()
    }

    pub fn cell_count(&self) -> usize {
        (self.cols - 1) * (self.rows - 1)
    }

    #[inline]
    pub fn vertex_index(&self, i: usize, j: usize) -> usize {
        j * self.cols + i
    }

    /// Lattice coordinates of a vertex index.
    #[inline]
    pub fn vertex_coords(&self, vertex: usize) -> (usize, usize) {
        (vertex % self.cols, vertex / self.cols)
    }

    #[inline]
    pub fn vertex_position(&self, vertex: usize) -> DVec2 {
        let (i, j) = self.vertex_coords(vertex);
        DVec2::new(i as f64 * self.spacing, j as f64 * self.spacing)
    }

    /// Edge from vertex `(i, j)` to `(i + 1, j)`.
    #[inline]
    pub fn horizontal_edge(&self, i: usize, j: usize) -> usize {
        j * (self.cols - 1) + i
    }

    /// Edge from vertex `(i, j)` to `(i, j + 1)`.
    #[inline]
    pub fn vertical_edge(&self, i: usize, j: usize) -> usize {
        self.horizontal_edge_count() + j * self.cols + i
    }

    pub fn edge_orientation(&self, edge: usize) -> Orientation {
        if edge < self.horizontal_edge_count() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    /// Lattice coordinates of an edge's first (left or top) vertex.
    pub fn edge_origin(&self, edge: usize) -> (usize, usize) {
        let h = self.horizontal_edge_count();
        if edge < h {
            (edge % (self.cols - 1), edge / (self.cols - 1))
        } else {
            let v = edge - h;
            (v % self.cols, v / self.cols)
        }
    }

    /// Vertex indices at either end, left/top first.
    pub fn edge_endpoints(&self, edge: usize) -> (usize, usize) {
        let (i, j) = self.edge_origin(edge);
        match self.edge_orientation(edge) {
            Orientation::Horizontal => (self.vertex_index(i, j), self.vertex_index(i + 1, j)),
            Orientation::Vertical => (self.vertex_index(i, j), self.vertex_index(i, j + 1)),
        }
    }

    /// Half-spacing offset point along the edge; stable geometric key.
    pub fn edge_midpoint(&self, edge: usize) -> DVec2 {
        let (a, b) = self.edge_endpoints(edge);
        (self.vertex_position(a) + self.vertex_position(b)) * 0.5
    }

    /// Whether the edge lies on the outer ring of the lattice.
    pub fn is_border_edge(&self, edge: usize) -> bool {
        let (i, j) = self.edge_origin(edge);
        match self.edge_orientation(edge) {
            Orientation::Horizontal => j == 0 || j == self.rows - 1,
            Orientation::Vertical => i == 0 || i == self.cols - 1,
        }
    }

    #[inline]
    pub fn cell_index(&self, i: usize, j: usize) -> usize {
        j * (self.cols - 1) + i
    }

    #[inline]
    pub fn cell_coords(&self, cell: usize) -> (usize, usize) {
        (cell % (self.cols - 1), cell / (self.cols - 1))
    }

    /// Corner vertices, indexed by [`TOP_LEFT`]..[`BOTTOM_LEFT`].
    pub fn cell_corners(&self, cell: usize) -> [usize; 4] {
        let (i, j) = self.cell_coords(cell);
        [
            self.vertex_index(i, j),
            self.vertex_index(i + 1, j),
            self.vertex_index(i + 1, j + 1),
            self.vertex_index(i, j + 1),
        ]
    }

    /// Side edges, indexed by [`TOP`]..[`LEFT`].
    pub fn cell_edges(&self, cell: usize) -> [usize; 4] {
        let (i, j) = self.cell_coords(cell);
        [
            self.horizontal_edge(i, j),
            self.vertical_edge(i + 1, j),
            self.horizontal_edge(i, j + 1),
            self.vertical_edge(i, j),
        ]
    }

    /// The one or two cells an edge borders.
    pub fn edge_cells(&self, edge: usize) -> impl Iterator<Item = usize> {
        let (i, j) = self.edge_origin(edge);
        let (before, after) = match self.edge_orientation(edge) {
            // Cells above and below.
            Orientation::Horizontal => (
                (j > 0).then(|| self.cell_index(i, j - 1)),
                (j < self.rows - 1).then(|| self.cell_index(i, j)),
            ),
            // Cells left and right.
            Orientation::Vertical => (
                (i > 0).then(|| self.cell_index(i - 1, j)),
                (i < self.cols - 1).then(|| self.cell_index(i, j)),
            ),
        };
        before.into_iter().chain(after)
    }
}
