//! Segment assembly: turning a classified [`ContourGrid`] into line segments.
//!
//! Two strategies walk the same crossings and emit the same segment set:
//!
//! - [`AssemblyStrategy::EdgeAdjacency`] walks the active-edge list and pairs
//!   each crossing edge with later crossing edges of a shared cell.
//! - [`AssemblyStrategy::MarchingCells`] walks every cell and looks at which
//!   of its four sides cross.
//!
//! Saddle cells (two diagonally opposite active corners) have four crossings
//! and two ways to pair them. Both strategies hand them to the same resolver,
//! which decides from the average of the four corner values.

use serde::{Deserialize, Serialize};

use crate::config::BoundaryPolicy;
use crate::error::EngineError;
use crate::grid::ContourGrid;
use crate::lattice::{BOTTOM, LEFT, RIGHT, TOP};
use crate::segment::Segment;

/// How crossing points are joined into segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyStrategy {
    /// Follow the edge neighbor table from each active edge.
    #[default]
    EdgeAdjacency,
    /// Classic per-cell case lookup.
    MarchingCells,
}

const STRATEGY_NAMES: &[&str] = &["edge_adjacency", "marching_cells"];

impl AssemblyStrategy {
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "edge_adjacency" => Ok(AssemblyStrategy::EdgeAdjacency),
            "marching_cells" => Ok(AssemblyStrategy::MarchingCells),
            _ => Err(EngineError::UnknownStrategy(name.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AssemblyStrategy::EdgeAdjacency => "edge_adjacency",
            AssemblyStrategy::MarchingCells => "marching_cells",
        }
    }

    pub fn list_names() -> &'static [&'static str] {
        STRATEGY_NAMES
    }
}

/// How a saddle cell's four crossing points are joined.
///
/// Points are numbered clockwise from the first side whose leading corner is
/// inactive (see [`saddle_order`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaddlePairing {
    /// Points 0–3 and 1–2. The two active corners connect through the center.
    Diagonal,
    /// Points 0–1 and 2–3. The two active corners stay separate.
    Adjacent,
}

/// Decides a saddle from its corner values (top-left, top-right,
/// bottom-right, bottom-left).
///
/// The average estimates the value at the cell center.
pub fn saddle_pairing(values: [f64; 4], threshold: f64) -> SaddlePairing {
    let average = values.iter().sum::<f64>() / 4.0;
    if average >= threshold {
        SaddlePairing::Diagonal
    } else {
        SaddlePairing::Adjacent
    }
}

/// Cell sides in resolver order for saddle `case`.
///
/// Case 5 (top-left inactive) starts at the top side; case 10 starts at the
/// right side, whose leading corner (top-right) is the first inactive one.
/// This numbering is what makes the "0–3 and 1–2" pairing connect the two
/// active corners in both cases. A fixed top-first order would split them in
/// case 10.
pub fn saddle_order(case: u8) -> [usize; 4] {
    if case & 8 == 0 {
        [TOP, RIGHT, BOTTOM, LEFT]
    } else {
        [RIGHT, BOTTOM, LEFT, TOP]
    }
}

/// Clears `out` and fills it with the contour segments of `grid`.
///
/// `grid` must have been updated since its last topology change; crossing
/// points are computed on demand.
pub fn assemble(
    grid: &ContourGrid,
    strategy: AssemblyStrategy,
    boundary: BoundaryPolicy,
    out: &mut Vec<Segment>,
) {
    out.clear();
    match strategy {
        AssemblyStrategy::EdgeAdjacency => assemble_edge_adjacency(grid, out),
        AssemblyStrategy::MarchingCells => assemble_marching_cells(grid, out),
    }
    if boundary == BoundaryPolicy::Closed {
        close_boundary(grid, out);
    }
}

fn assemble_edge_adjacency(grid: &ContourGrid, out: &mut Vec<Segment>) {
    for &e in grid.active_edges() {
        let e = e as usize;
        for link in grid.neighbors(e) {
            let f = link.edge as usize;
            if f <= e || !grid.edge(f).is_crossing() {
                continue;
            }
            let cell = link.cell as usize;
            if grid.is_saddle(cell) {
                // Top edge to bottom edge is the one link visited once per cell.
                let sides = grid.lattice().cell_edges(cell);
                if e == sides[TOP] && f == sides[BOTTOM] {
                    resolve_saddle(grid, cell, out);
                }
                continue;
            }
            push_between(grid, e, f, out);
        }
    }
}

fn assemble_marching_cells(grid: &ContourGrid, out: &mut Vec<Segment>) {
    for cell in 0..grid.lattice().cell_count() {
        let case = grid.cell_case(cell);
        if case == 0 || case == 15 {
            continue;
        }
        let sides = grid.lattice().cell_edges(cell);
        let mut crossing = [0usize; 4];
        let mut count = 0;
        for edge in sides {
            if grid.edge(edge).is_crossing() {
                crossing[count] = edge;
                count += 1;
            }
        }
        debug_assert!(
            count == 2 || count == 4,
            "cell {cell} case {case} has {count} crossings"
        );
        match count {
            2 => push_between(grid, crossing[0], crossing[1], out),
            4 => resolve_saddle(grid, cell, out),
            _ => tracing::warn!(cell, case, count, "odd crossing count, skipping cell"),
        }
    }
}

/// Emits the two segments of saddle `cell`.
fn resolve_saddle(grid: &ContourGrid, cell: usize, out: &mut Vec<Segment>) {
    let sides = grid.lattice().cell_edges(cell);
    let order = saddle_order(grid.cell_case(cell));
    let p = order.map(|side| sides[side]);
    match saddle_pairing(grid.cell_values(cell), grid.threshold()) {
        SaddlePairing::Diagonal => {
            push_between(grid, p[0], p[3], out);
            push_between(grid, p[1], p[2], out);
        }
        SaddlePairing::Adjacent => {
            push_between(grid, p[0], p[1], out);
            push_between(grid, p[2], p[3], out);
        }
    }
}

/// Joins the crossing points of `e` and `f`. Points that coincide (a vertex
/// sitting exactly on the threshold) produce no segment.
fn push_between(grid: &ContourGrid, e: usize, f: usize, out: &mut Vec<Segment>) {
    if let (Some(a), Some(b)) = (grid.crossing_point(e), grid.crossing_point(f)) {
        if a != b {
            out.push(Segment::new(a, b));
        }
    }
}

/// Appends segments along the active part of every border edge.
///
/// Contours cut by the lattice border are closed against the frame: the
/// border between two active vertices is drawn in full, and a border edge
/// with a crossing is drawn from its active vertex to the crossing point.
pub fn close_boundary(grid: &ContourGrid, out: &mut Vec<Segment>) {
    let lattice = grid.lattice();
    for e in (0..lattice.edge_count()).filter(|&e| lattice.is_border_edge(e)) {
        let (a, b) = grid.edge(e).endpoints();
        let pa = grid.vertex_position(a);
        let pb = grid.vertex_position(b);
        match (grid.vertex(a).active, grid.vertex(b).active) {
            (true, true) => out.push(Segment::new(pa, pb)),
            (true, false) | (false, true) => {
                let on = if grid.vertex(a).active { pa } else { pb };
                match grid.crossing_point(e) {
                    Some(point) if point != on => out.push(Segment::new(on, point)),
                    _ => {}
                }
            }
            (false, false) => {}
        }
    }
}
