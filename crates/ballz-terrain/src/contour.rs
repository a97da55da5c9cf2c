//! Marching squares over the density grid.
//!
//! Every cell is turned into one or two polygons covering its solid part,
//! wound counter-clockwise. Contour crossings are keyed by the grid edge
//! they sit on, and their positions are computed from that edge alone, so
//! the two cells sharing an edge always agree on the crossing point.

use glam::Vec2;

use ballz_core::constants::TERRAIN_ISO_LEVEL;

use crate::grid::TerrainGrid;

/// A grid edge. Horizontal edges run from vertex `(x, y)` to `(x + 1, y)`,
/// vertical ones from `(x, y)` to `(x, y + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct EdgeKey {
    pub y: i32,
    pub x: i32,
    pub vertical: bool,
}

impl EdgeKey {
    fn horizontal(x: i32, y: i32) -> Self {
        Self { x, y, vertical: false }
    }

    fn vertical(x: i32, y: i32) -> Self {
        Self { x, y, vertical: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum CellVertex {
    Corner(Vec2),
    Crossing(EdgeKey, Vec2),
}

impl CellVertex {
    pub fn position(&self) -> Vec2 {
        match *self {
            CellVertex::Corner(p) | CellVertex::Crossing(_, p) => p,
        }
    }
}

/// A directed piece of the contour with solid material on its left.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Segment {
    pub start: EdgeKey,
    pub end: EdgeKey,
    pub from: Vec2,
}

/// Range of cell indices to visit. Includes a ring of cells around the
/// grid so that material touching the border still gets a closed contour.
pub(crate) fn cell_range(grid: &TerrainGrid) -> impl Iterator<Item = (i32, i32)> {
    let w = grid.width() as i32;
    let h = grid.height() as i32;
    (-1..h).flat_map(move |cy| (-1..w).map(move |cx| (cx, cy)))
}

fn solid(d: f32) -> bool {
    d >= TERRAIN_ISO_LEVEL
}

/// Where the iso contour crosses `edge`.
fn crossing(grid: &TerrainGrid, edge: EdgeKey) -> Vec2 {
    let (bx, by) = if edge.vertical {
        (edge.x, edge.y + 1)
    } else {
        (edge.x + 1, edge.y)
    };
    let da = grid.sample(edge.x, edge.y);
    let db = grid.sample(bx, by);
    let t = if (db - da).abs() > 1e-6 {
        ((TERRAIN_ISO_LEVEL - da) / (db - da)).clamp(0.0, 1.0)
    } else {
        0.5
    };
    let a = grid.vertex_position(edge.x, edge.y);
    let b = grid.vertex_position(bx, by);
    a + (b - a) * t
}

/// Solid polygons of cell `(cx, cy)`, the cell whose bottom-left vertex is
/// `(cx, cy)`. Empty if no corner is solid.
pub(crate) fn cell_polygons(grid: &TerrainGrid, cx: i32, cy: i32) -> Vec<Vec<CellVertex>> {
    let corners = [(cx, cy), (cx + 1, cy), (cx + 1, cy + 1), (cx, cy + 1)];
    let density = corners.map(|(x, y)| grid.sample(x, y));
    let inside = density.map(solid);

    let case = inside
        .iter()
        .enumerate()
        .fold(0u8, |acc, (i, &s)| acc | ((s as u8) << i));
    if case == 0 {
        return Vec::new();
    }

    // Edge i joins corner i and corner i + 1.
    let edges = [
        EdgeKey::horizontal(cx, cy),
        EdgeKey::vertical(cx + 1, cy),
        EdgeKey::horizontal(cx, cy + 1),
        EdgeKey::vertical(cx, cy),
    ];
    let corner = |i: usize| CellVertex::Corner(grid.vertex_position(corners[i].0, corners[i].1));
    let cross = |i: usize| CellVertex::Crossing(edges[i], crossing(grid, edges[i]));

    // Saddles: two opposite corners solid. The cell average decides whether
    // the solid corners join through the middle.
    let saddle_separated =
        (case == 0b0101 || case == 0b1010) && density.iter().sum::<f32>() / 4.0 < TERRAIN_ISO_LEVEL;
    if saddle_separated {
        return if case == 0b0101 {
            vec![
                vec![corner(0), cross(0), cross(3)],
                vec![cross(1), corner(2), cross(2)],
            ]
        } else {
            vec![
                vec![cross(0), corner(1), cross(1)],
                vec![cross(2), corner(3), cross(3)],
            ]
        };
    }

    let mut polygon = Vec::with_capacity(6);
    for i in 0..4 {
        if inside[i] {
            polygon.push(corner(i));
        }
        if inside[i] != inside[(i + 1) % 4] {
            polygon.push(cross(i));
        }
    }
    vec![polygon]
}

/// Contour pieces of every cell, each oriented with solid on the left.
pub(crate) fn boundary_segments(grid: &TerrainGrid) -> Vec<Segment> {
    let mut segments = Vec::new();
    for (cx, cy) in cell_range(grid) {
        for polygon in cell_polygons(grid, cx, cy) {
            let n = polygon.len();
            for i in 0..n {
                if let (CellVertex::Crossing(start, from), CellVertex::Crossing(end, _)) =
                    (polygon[i], polygon[(i + 1) % n])
                {
                    segments.push(Segment { start, end, from });
                }
            }
        }
    }
    segments
}
