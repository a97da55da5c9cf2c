//! TerrainGrid: revisioned density field with circular subtraction.

use glam::Vec2;
use thiserror::Error;
use tracing::debug;

use ballz_core::constants::{OUTLINE_SIMPLIFY_CELLS, TERRAIN_ISO_LEVEL};

use crate::mesh::{self, Triangle};
use crate::outline::{self, Polyline};

#[derive(Debug, Error, PartialEq)]
pub enum TerrainError {
    #[error("terrain grid needs at least 2x2 samples, got {width}x{height}")]
    TooSmall { width: usize, height: usize },
    #[error("density buffer has {actual} samples, expected {expected}")]
    DensityLength { expected: usize, actual: usize },
    #[error("terrain scale must be positive, got {0}")]
    BadScale(f32),
}

/// Destructible terrain.
///
/// Densities live on grid vertices, row-major from the bottom row up.
/// Vertex `(x, y)` sits at `origin + (x, y) * scale` in world space.
/// Samples outside the grid read as empty, so outlines always close.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    width: usize,
    height: usize,
    scale: f32,
    origin: Vec2,
    density: Vec<f32>,
    revision: u64,
    /// Outline simplification tolerance in world units.
    simplify_tolerance: f32,
    outline: Vec<Polyline>,
}

impl TerrainGrid {
    /// Build a grid from a density buffer (`width * height` samples in 0..=1).
    pub fn from_density(
        width: usize,
        height: usize,
        scale: f32,
        origin: Vec2,
        density: Vec<f32>,
    ) -> Result<Self, TerrainError> {
        if width < 2 || height < 2 {
            return Err(TerrainError::TooSmall { width, height });
        }
        if !(scale > 0.0) {
            return Err(TerrainError::BadScale(scale));
        }
        if density.len() != width * height {
            return Err(TerrainError::DensityLength {
                expected: width * height,
                actual: density.len(),
            });
        }

        let mut grid = Self {
            width,
            height,
            scale,
            origin,
            density: density.into_iter().map(|d| d.clamp(0.0, 1.0)).collect(),
            revision: 0,
            simplify_tolerance: OUTLINE_SIMPLIFY_CELLS * scale,
            outline: Vec::new(),
        };
        grid.rebuild_outline();
        Ok(grid)
    }

    /// A grid that is solid at every sample.
    pub fn solid(width: usize, height: usize, scale: f32, origin: Vec2) -> Result<Self, TerrainError> {
        Self::from_density(width, height, scale, origin, vec![1.0; width * height])
    }

    /// A grid with no material at all.
    pub fn empty(width: usize, height: usize, scale: f32, origin: Vec2) -> Result<Self, TerrainError> {
        Self::from_density(width, height, scale, origin, vec![0.0; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// World units per grid cell.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Geometry revision. Strictly increases with every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// World-space corners (min, max) of the sampled area.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let max = self.vertex_position(self.width as i32 - 1, self.height as i32 - 1);
        (self.origin, max)
    }

    /// Change how aggressively outlines are simplified (in cells).
    /// Changes collision geometry, so it bumps the revision.
    pub fn set_simplify_tolerance_cells(&mut self, cells: f32) {
        self.simplify_tolerance = cells.max(0.0) * self.scale;
        self.rebuild_outline();
        self.revision += 1;
    }

    /// World position of grid vertex `(x, y)`. Accepts out-of-grid indices.
    pub fn vertex_position(&self, x: i32, y: i32) -> Vec2 {
        self.origin + Vec2::new(x as f32, y as f32) * self.scale
    }

    /// Density at a grid vertex; zero outside the grid.
    pub fn sample(&self, x: i32, y: i32) -> f32 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0.0;
        }
        self.density[y as usize * self.width + x as usize]
    }

    /// Bilinearly interpolated density at a world position.
    pub fn density_at(&self, pos: Vec2) -> f32 {
        let g = (pos - self.origin) / self.scale;
        let x0 = g.x.floor();
        let y0 = g.y.floor();
        let fx = g.x - x0;
        let fy = g.y - y0;
        let (x0, y0) = (x0 as i32, y0 as i32);

        let d00 = self.sample(x0, y0);
        let d10 = self.sample(x0 + 1, y0);
        let d01 = self.sample(x0, y0 + 1);
        let d11 = self.sample(x0 + 1, y0 + 1);

        let bottom = d00 * (1.0 - fx) + d10 * fx;
        let top = d01 * (1.0 - fx) + d11 * fx;
        bottom * (1.0 - fy) + top * fy
    }

    /// Whether a world position lies inside solid material.
    pub fn is_solid(&self, pos: Vec2) -> bool {
        self.density_at(pos) >= TERRAIN_ISO_LEVEL
    }

    /// Remove a disc of material, recompute the outline, bump the revision.
    ///
    /// The parts of the disc outside the grid are ignored. A non-positive
    /// radius carves nothing but still counts as a mutation.
    pub fn subtract_circle(&mut self, center: Vec2, radius: f32) {
        if radius > 0.0 {
            let carved = self.carve(center, radius);
            debug!(
                x = center.x,
                y = center.y,
                radius,
                carved,
                "terrain circle subtracted"
            );
            if carved > 0 {
                self.rebuild_outline();
            }
        }
        self.revision += 1;
    }

    /// Lower densities inside the disc. Returns how many samples changed.
    fn carve(&mut self, center: Vec2, radius: f32) -> usize {
        // Densities ramp from 0 to 1 over one cell around the circle, so
        // contour interpolation lands on the circle itself.
        let reach = radius + self.scale;
        let lo = ((center - Vec2::splat(reach) - self.origin) / self.scale).floor();
        let hi = ((center + Vec2::splat(reach) - self.origin) / self.scale).ceil();

        let x0 = lo.x.max(0.0) as usize;
        let y0 = lo.y.max(0.0) as usize;
        if hi.x < 0.0 || hi.y < 0.0 {
            return 0;
        }
        let x1 = (hi.x as usize).min(self.width - 1);
        let y1 = (hi.y as usize).min(self.height - 1);

        let mut changed = 0;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let pos = self.vertex_position(x as i32, y as i32);
                let dist = pos.distance(center);
                let ramp = (TERRAIN_ISO_LEVEL + (dist - radius) / self.scale).clamp(0.0, 1.0);
                let cell = &mut self.density[y * self.width + x];
                if ramp < *cell {
                    *cell = ramp;
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Simplified boundary polylines of the solid region, in world space.
    pub fn outline(&self) -> &[Polyline] {
        &self.outline
    }

    /// Triangle mesh of the solid region, in world space. Render-only;
    /// callers cache it by revision.
    pub fn triangles(&self) -> Vec<Triangle> {
        mesh::triangulate(self)
    }

    fn rebuild_outline(&mut self) {
        self.outline = outline::extract_outline(self, self.simplify_tolerance);
    }
}
