use std::f32::consts::PI;

use ballz_terrain::{mesh, parse_map, TerrainGrid};
use glam::Vec2;
use proptest::prelude::*;

fn square_terrain() -> TerrainGrid {
    TerrainGrid::solid(81, 81, 0.05, Vec2::new(-2.0, -2.0)).unwrap()
}

#[test]
fn carved_hole_matches_circle_area() {
    let mut grid = square_terrain();
    grid.subtract_circle(Vec2::ZERO, 1.0);

    let holes: Vec<_> = grid.outline().iter().filter(|p| p.is_hole()).collect();
    assert_eq!(holes.len(), 1);
    let hole_area = -holes[0].signed_area();
    assert!(
        (hole_area - PI).abs() / PI < 0.05,
        "hole area {hole_area}, expected about {PI}"
    );

    // Every hole point lies on the circle, within a cell.
    for p in &holes[0].points {
        assert!((p.length() - 1.0).abs() < 0.05, "point {p} off the circle");
    }
}

#[test]
fn outer_boundary_is_ccw_and_hole_is_cw() {
    let mut grid = square_terrain();
    grid.subtract_circle(Vec2::ZERO, 1.0);
    let outer: Vec<_> = grid.outline().iter().filter(|p| !p.is_hole()).collect();
    assert_eq!(outer.len(), 1);
    assert!(outer[0].signed_area() > 15.0);
}

#[test]
fn edge_crater_opens_the_boundary() {
    let mut grid = square_terrain();
    grid.subtract_circle(Vec2::new(2.0, 2.0), 1.0);
    // Cutting the corner leaves one outer loop and no hole.
    assert_eq!(grid.outline().len(), 1);
    assert!(!grid.is_solid(Vec2::new(1.8, 1.8)));
    assert!(grid.is_solid(Vec2::new(-1.8, -1.8)));
}

#[test]
fn mesh_tracks_carved_area() {
    let mut grid = square_terrain();
    let before = mesh::total_area(&grid.triangles());
    grid.subtract_circle(Vec2::ZERO, 1.0);
    let after = mesh::total_area(&grid.triangles());
    assert!(((before - after) - PI).abs() / PI < 0.05);
}

#[test]
fn outline_is_deterministic() {
    let mut a = square_terrain();
    let mut b = square_terrain();
    for grid in [&mut a, &mut b] {
        grid.subtract_circle(Vec2::new(-0.7, 0.3), 0.6);
        grid.subtract_circle(Vec2::new(0.9, -1.1), 0.8);
    }
    assert_eq!(a.outline(), b.outline());
}

#[test]
fn map_terrain_can_be_carved() {
    let mut map = parse_map("S......S\n########\n########\n########", 0.5).unwrap();
    let center = map.grid.vertex_position(3, 1);
    let before = map.grid.revision();
    map.grid.subtract_circle(center, 0.6);
    assert_eq!(map.grid.revision(), before + 1);
    assert!(!map.grid.is_solid(center));
}

proptest! {
    #[test]
    fn revision_strictly_increases(
        craters in prop::collection::vec((-3.0f32..3.0, -3.0f32..3.0, -0.5f32..1.5), 1..12)
    ) {
        let mut grid = square_terrain();
        let mut last = grid.revision();
        for (x, y, r) in craters {
            grid.subtract_circle(Vec2::new(x, y), r);
            prop_assert!(grid.revision() > last);
            last = grid.revision();
        }
    }

    #[test]
    fn outline_loops_are_closed_rings(
        craters in prop::collection::vec((-2.0f32..2.0, -2.0f32..2.0, 0.1f32..1.0), 1..6)
    ) {
        let mut grid = square_terrain();
        for (x, y, r) in craters {
            grid.subtract_circle(Vec2::new(x, y), r);
        }
        for poly in grid.outline() {
            prop_assert!(poly.closed);
            prop_assert!(poly.points.len() >= 3);
        }
    }

    #[test]
    fn carving_never_adds_material(x in -2.0f32..2.0, y in -2.0f32..2.0, r in 0.0f32..2.0) {
        let mut grid = square_terrain();
        let probe = Vec2::new(-1.9, -1.9);
        let before = grid.density_at(probe);
        grid.subtract_circle(Vec2::new(x, y), r);
        prop_assert!(grid.density_at(probe) <= before);
    }
}
