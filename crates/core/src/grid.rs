//! Sampled contour grid: per-vertex field values, edge crossings, and the
//! static edge adjacency used to stitch segments together.

use std::cell::Cell;

use glam::DVec2;

use crate::error::EngineError;
use crate::lattice::{Lattice, Orientation};
use crate::source::ScalarField;

/// Case bits of a cell's corners, in [`Lattice::cell_corners`] order.
const CORNER_BITS: [u8; 4] = [8, 4, 2, 1];

/// Field sample at one lattice vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub value: f64,
    /// `value >= threshold`.
    pub active: bool,
}

/// One lattice edge. Endpoints and orientation never change; the crossing
/// flag and cached point are refreshed on every [`ContourGrid::update`].
#[derive(Debug, Clone)]
pub struct Edge {
    a: u32,
    b: u32,
    orientation: Orientation,
    crossing: bool,
    point: Cell<Option<DVec2>>,
}

impl Edge {
    /// Endpoint vertex indices, left/top first.
    pub fn endpoints(&self) -> (usize, usize) {
        (self.a as usize, self.b as usize)
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Whether exactly one endpoint is active.
    pub fn is_crossing(&self) -> bool {
        self.crossing
    }
}

/// Link from an edge to another edge of a cell they share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeLink {
    pub edge: u32,
    pub cell: u32,
}

/// Linear estimate of where the field reaches `threshold` between an
/// inactive point `off` and an active point `on`.
///
/// `t` is clamped to `[0, 1]` so the result always lies on the segment.
/// Equal values fall back to the midpoint.
pub fn interpolate_crossing(off: DVec2, v_off: f64, on: DVec2, v_on: f64, threshold: f64) -> DVec2 {
    let denom = v_on - v_off;
    if denom.abs() < f64::EPSILON {
        return (off + on) * 0.5;
    }
    let t = ((threshold - v_off) / denom).clamp(0.0, 1.0);
    off + (on - off) * t
}

/// The sampled lattice.
///
/// Topology (positions, edge endpoints, neighbor links) is built once in
/// [`ContourGrid::new`]. [`ContourGrid::update`] resamples values and
/// reclassifies every vertex and edge.
#[derive(Debug, Clone)]
pub struct ContourGrid {
    lattice: Lattice,
    threshold: f64,
    positions: Vec<DVec2>,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    /// CSR offsets into `links`, one more entry than there are edges.
    link_offsets: Vec<u32>,
    links: Vec<EdgeLink>,
    /// Crossing edges in ascending index order.
    active_edges: Vec<u32>,
    samples: Vec<f64>,
}

impl ContourGrid {
    /// Builds the topology for `lattice`. All vertices start at value 0.
    pub fn new(lattice: Lattice, threshold: f64) -> Result<Self, EngineError> {
        if !threshold.is_finite() {
            return Err(EngineError::InvalidThreshold(threshold));
        }
        // Edge and link indices share the u32 space with vertices.
        let edge_count = lattice.edge_count();
        if edge_count.saturating_mul(6) > u32::MAX as usize {
            return Err(EngineError::GridTooLarge {
                cols: lattice.cols(),
                rows: lattice.rows(),
            });
        }

        let positions: Vec<DVec2> = (0..lattice.vertex_count())
            .map(|v| lattice.vertex_position(v))
            .collect();

        let edges: Vec<Edge> = (0..edge_count)
            .map(|e| {
                let (a, b) = lattice.edge_endpoints(e);
                Edge {
                    a: a as u32,
                    b: b as u32,
                    orientation: lattice.edge_orientation(e),
                    crossing: false,
                    point: Cell::new(None),
                }
            })
            .collect();

        let mut link_offsets = Vec::with_capacity(edge_count + 1);
        let mut links = Vec::with_capacity(edge_count * 6);
        link_offsets.push(0);
        for e in 0..edge_count {
            for cell in lattice.edge_cells(e) {
                for f in lattice.cell_edges(cell) {
                    if f != e {
                        links.push(EdgeLink {
                            edge: f as u32,
                            cell: cell as u32,
                        });
                    }
                }
            }
            link_offsets.push(links.len() as u32);
        }

        let vertex_count = positions.len();
        tracing::debug!(
            cols = lattice.cols(),
            rows = lattice.rows(),
            edges = edge_count,
            "built contour grid"
        );

        Ok(Self {
            lattice,
            threshold,
            positions,
            vertices: vec![Vertex::default(); vertex_count],
            edges,
            link_offsets,
            links,
            active_edges: Vec::new(),
            samples: vec![0.0; vertex_count],
        })
    }

    /// Resamples `field` at every vertex and reclassifies vertices and edges.
    ///
    /// Clears every cached crossing point.
    pub fn update<F: ScalarField + ?Sized>(&mut self, field: &F) {
        field.values_at(&self.positions, &mut self.samples);

        let threshold = self.threshold;
        for (vertex, &value) in self.vertices.iter_mut().zip(&self.samples) {
            vertex.value = value;
            vertex.active = value >= threshold;
        }

        self.active_edges.clear();
        for (index, edge) in self.edges.iter_mut().enumerate() {
            edge.crossing =
                self.vertices[edge.a as usize].active != self.vertices[edge.b as usize].active;
            *edge.point.get_mut() = None;
            if edge.crossing {
                self.active_edges.push(index as u32);
            }
        }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex(&self, vertex: usize) -> Vertex {
        self.vertices[vertex]
    }

    pub fn vertex_position(&self, vertex: usize) -> DVec2 {
        self.positions[vertex]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, edge: usize) -> &Edge {
        &self.edges[edge]
    }

    /// Indices of crossing edges, ascending.
    pub fn active_edges(&self) -> &[u32] {
        &self.active_edges
    }

    /// Other edges of the cells bordering `edge`, tagged with the shared cell.
    pub fn neighbors(&self, edge: usize) -> &[EdgeLink] {
        let start = self.link_offsets[edge] as usize;
        let end = self.link_offsets[edge + 1] as usize;
        &self.links[start..end]
    }

    /// 4-bit mask of active corners: top-left 8, top-right 4,
    /// bottom-right 2, bottom-left 1.
    pub fn cell_case(&self, cell: usize) -> u8 {
        self.lattice
            .cell_corners(cell)
            .iter()
            .zip(CORNER_BITS)
            .filter(|&(&v, _)| self.vertices[v].active)
            .fold(0u8, |case, (_, bit)| case | bit)
    }

    /// Two diagonally opposite active corners.
    pub fn is_saddle(&self, cell: usize) -> bool {
        matches!(self.cell_case(cell), 5 | 10)
    }

    /// Corner values in top-left, top-right, bottom-right, bottom-left order.
    pub fn cell_values(&self, cell: usize) -> [f64; 4] {
        self.lattice
            .cell_corners(cell)
            .map(|v| self.vertices[v].value)
    }

    /// Where the contour crosses `edge`, or `None` if it does not.
    ///
    /// Computed on first request after an update and cached until the next.
    pub fn crossing_point(&self, edge: usize) -> Option<DVec2> {
        let e = &self.edges[edge];
        if !e.crossing {
            return None;
        }
        if let Some(point) = e.point.get() {
            return Some(point);
        }
        let (a, b) = (e.a as usize, e.b as usize);
        let (off, on) = if self.vertices[a].active { (b, a) } else { (a, b) };
        let point = interpolate_crossing(
            self.positions[off],
            self.vertices[off].value,
            self.positions[on],
            self.vertices[on].value,
            self.threshold,
        );
        e.point.set(Some(point));
        Some(point)
    }
}
