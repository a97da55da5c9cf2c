//! Render triangles for the solid region.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::contour;
use crate::grid::TerrainGrid;

/// One world-space triangle, wound counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub a: Vec2,
    pub b: Vec2,
    pub c: Vec2,
}

impl Triangle {
    pub fn area(&self) -> f32 {
        (self.b - self.a).perp_dot(self.c - self.a) * 0.5
    }
}

/// Fan-triangulate every cell polygon of the grid.
pub(crate) fn triangulate(grid: &TerrainGrid) -> Vec<Triangle> {
    let mut triangles = Vec::new();
    for (cx, cy) in contour::cell_range(grid) {
        for polygon in contour::cell_polygons(grid, cx, cy) {
            let Some(first) = polygon.first().map(|v| v.position()) else {
                continue;
            };
            for pair in polygon[1..].windows(2) {
                let tri = Triangle {
                    a: first,
                    b: pair[0].position(),
                    c: pair[1].position(),
                };
                if tri.area() > f32::EPSILON {
                    triangles.push(tri);
                }
            }
        }
    }
    triangles
}

/// Total area covered by `triangles`.
pub fn total_area(triangles: &[Triangle]) -> f32 {
    triangles.iter().map(Triangle::area).sum()
}
