//! Fluid coupling.
//!
//! The engine steps a `FluidField` once per tick, after the physics step.
//! Fields may read the entity set and the terrain but never change them;
//! renderers query the field for visualization.

use glam::Vec2;

use ballz_core::state::EntityState;
use ballz_terrain::TerrainGrid;

/// What a fluid field may read during its step.
pub struct FluidContext<'a> {
    /// Live entities ordered by id.
    pub entities: &'a [EntityState],
    pub terrain: &'a TerrainGrid,
}

pub trait FluidField {
    fn step(&mut self, ctx: &FluidContext<'_>, dt: f32);

    /// Fluid velocity at a world position.
    fn velocity_at(&self, position: Vec2) -> Vec2;

    /// Fraction (0..=1) of the fluid cell at `position` blocked by terrain.
    fn solid_fraction_at(&self, position: Vec2) -> f32;
}

/// A fluid that never moves.
#[derive(Debug, Default, Clone, Copy)]
pub struct StillWater;

impl FluidField for StillWater {
    fn step(&mut self, _ctx: &FluidContext<'_>, _dt: f32) {}

    fn velocity_at(&self, _position: Vec2) -> Vec2 {
        Vec2::ZERO
    }

    fn solid_fraction_at(&self, _position: Vec2) -> f32 {
        0.0
    }
}

/// Tuning for `WaterGrid`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterParams {
    /// How strongly a moving entity drags the water in its cell (1/s).
    pub stir_rate: f32,
    /// Fraction of the neighbour average blended in per second.
    pub diffusion: f32,
    /// Velocity lost per second.
    pub damping: f32,
}

impl Default for WaterParams {
    fn default() -> Self {
        Self {
            stir_rate: 4.0,
            diffusion: 2.0,
            damping: 0.5,
        }
    }
}

/// Coarse velocity grid stirred by moving entities.
///
/// Cell `(x, y)` covers `origin + [x, x+1) * cell_size` horizontally and
/// likewise vertically. Cells inside terrain hold no velocity.
#[derive(Debug, Clone)]
pub struct WaterGrid {
    origin: Vec2,
    cell_size: f32,
    width: usize,
    height: usize,
    params: WaterParams,
    velocity: Vec<Vec2>,
    solid: Vec<f32>,
    scratch: Vec<Vec2>,
}

impl WaterGrid {
    pub fn new(origin: Vec2, cell_size: f32, width: usize, height: usize) -> Self {
        Self::with_params(origin, cell_size, width, height, WaterParams::default())
    }

    pub fn with_params(
        origin: Vec2,
        cell_size: f32,
        width: usize,
        height: usize,
        params: WaterParams,
    ) -> Self {
        debug_assert!(cell_size > 0.0);
        let n = width * height;
        Self {
            origin,
            cell_size,
            width,
            height,
            params,
            velocity: vec![Vec2::ZERO; n],
            solid: vec![0.0; n],
            scratch: vec![Vec2::ZERO; n],
        }
    }

    /// A grid covering the terrain's bounds with cells of `cell_size`.
    pub fn covering(terrain: &TerrainGrid, cell_size: f32) -> Self {
        let (min, max) = terrain.bounds();
        let size = ((max - min) / cell_size).ceil().max(Vec2::ONE);
        Self::new(min, cell_size, size.x as usize, size.y as usize)
    }

    fn cell_of(&self, position: Vec2) -> Option<usize> {
        let g = ((position - self.origin) / self.cell_size).floor();
        if g.x < 0.0 || g.y < 0.0 {
            return None;
        }
        let (x, y) = (g.x as usize, g.y as usize);
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    fn cell_center(&self, idx: usize) -> Vec2 {
        let x = (idx % self.width) as f32 + 0.5;
        let y = (idx / self.width) as f32 + 0.5;
        self.origin + Vec2::new(x, y) * self.cell_size
    }

    fn sample_solid(&mut self, terrain: &TerrainGrid) {
        let quarter = self.cell_size * 0.25;
        let offsets = [
            Vec2::new(-quarter, -quarter),
            Vec2::new(quarter, -quarter),
            Vec2::new(quarter, quarter),
            Vec2::new(-quarter, quarter),
        ];
        for idx in 0..self.solid.len() {
            let center = self.cell_center(idx);
            let inside = offsets
                .iter()
                .filter(|&&o| terrain.is_solid(center + o))
                .count();
            self.solid[idx] = inside as f32 / offsets.len() as f32;
        }
    }

    fn stir(&mut self, entities: &[EntityState], dt: f32) {
        let rate = (self.params.stir_rate * dt).min(1.0);
        for e in entities.iter().filter(|e| !e.is_static) {
            if let Some(idx) = self.cell_of(e.position) {
                let v = self.velocity[idx];
                self.velocity[idx] = v + (e.velocity - v) * rate;
            }
        }
    }

    fn diffuse(&mut self, dt: f32) {
        let blend = (self.params.diffusion * dt).min(1.0);
        let (w, h) = (self.width, self.height);
        for y in 0..h {
            for x in 0..w {
                let idx = y * w + x;
                let mut sum = Vec2::ZERO;
                let mut count = 0.0;
                let neighbours = [
                    (x > 0).then(|| idx - 1),
                    (x + 1 < w).then(|| idx + 1),
                    (y > 0).then(|| idx - w),
                    (y + 1 < h).then(|| idx + w),
                ];
                for n in neighbours.into_iter().flatten() {
                    sum += self.velocity[n];
                    count += 1.0;
                }
                let avg = if count > 0.0 { sum / count } else { self.velocity[idx] };
                self.scratch[idx] = self.velocity[idx].lerp(avg, blend);
            }
        }
        std::mem::swap(&mut self.velocity, &mut self.scratch);
    }
}

impl FluidField for WaterGrid {
    fn step(&mut self, ctx: &FluidContext<'_>, dt: f32) {
        if self.velocity.is_empty() {
            return;
        }
        self.sample_solid(ctx.terrain);
        self.stir(ctx.entities, dt);
        self.diffuse(dt);
        let keep = (1.0 - self.params.damping * dt).max(0.0);
        for (v, solid) in self.velocity.iter_mut().zip(&self.solid) {
            *v *= keep * (1.0 - solid);
        }
    }

    fn velocity_at(&self, position: Vec2) -> Vec2 {
        self.cell_of(position)
            .map(|idx| self.velocity[idx])
            .unwrap_or(Vec2::ZERO)
    }

    fn solid_fraction_at(&self, position: Vec2) -> f32 {
        self.cell_of(position).map(|idx| self.solid[idx]).unwrap_or(0.0)
    }
}
