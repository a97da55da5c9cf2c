//! Boundary outline of the solid region.
//!
//! Contour segments from the marching-squares pass are chained into closed
//! loops and simplified. Outer boundaries wind counter-clockwise and holes
//! clockwise, so the solid side is always on the left.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::contour::{self, EdgeKey};
use crate::grid::TerrainGrid;
use crate::simplify::simplify_closed;

/// A chain of world-space points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Vec2>,
    /// The last point connects back to the first.
    pub closed: bool,
}

impl Polyline {
    /// Shoelace area. Positive for counter-clockwise loops.
    pub fn signed_area(&self) -> f32 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f32 = (0..n)
            .map(|i| self.points[i].perp_dot(self.points[(i + 1) % n]))
            .sum();
        twice * 0.5
    }

    pub fn is_hole(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// Point pairs along the chain, including the closing pair.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.points.len();
        let count = if self.closed { n } else { n.saturating_sub(1) };
        (0..count).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

/// Chain the grid's contour into loops and simplify them with `tolerance`
/// (world units). Loops left with fewer than three points are dropped.
pub(crate) fn extract_outline(grid: &TerrainGrid, tolerance: f32) -> Vec<Polyline> {
    let mut next: BTreeMap<EdgeKey, (EdgeKey, Vec2)> = contour::boundary_segments(grid)
        .into_iter()
        .map(|s| (s.start, (s.end, s.from)))
        .collect();

    let mut loops = Vec::new();
    while let Some((&first, _)) = next.iter().next() {
        let mut points = Vec::new();
        let mut key = first;
        let mut closed = false;
        while let Some((end, from)) = next.remove(&key) {
            points.push(from);
            if end == first {
                closed = true;
                break;
            }
            key = end;
        }
        if !closed {
            warn!(points = points.len(), "terrain contour did not close");
        }

        let points = if closed {
            simplify_closed(&points, tolerance)
        } else {
            points
        };
        if points.len() >= 3 {
            loops.push(Polyline { points, closed });
        }
    }
    loops
}
