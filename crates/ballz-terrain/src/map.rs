//! Text terrain maps.
//!
//! One glyph per grid vertex, top row first:
//!
//! ```text
//! ..S.....S..
//! ..##...###.
//! ###########
//! ```
//!
//! `#` and `X` are solid, `.` and space are empty, `S` is an empty sample
//! marking a ball spawn point. Short rows are padded with empty samples.
//! The map is centred on the world origin.

use std::path::Path;

use glam::Vec2;
use thiserror::Error;
use tracing::info;

use crate::grid::{TerrainError, TerrainGrid};

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map: {0}")]
    Io(#[from] std::io::Error),
    #[error("map has no rows")]
    Empty,
    #[error("unknown map glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { row: usize, col: usize, glyph: char },
    #[error(transparent)]
    Terrain(#[from] TerrainError),
}

/// A parsed map: terrain plus the spawn points it declares.
#[derive(Debug, Clone)]
pub struct TerrainMap {
    pub grid: TerrainGrid,
    /// World positions of `S` glyphs, in reading order.
    pub spawn_points: Vec<Vec2>,
}

/// Parse a map from text. `scale` is world units per glyph.
pub fn parse_map(text: &str, scale: f32) -> Result<TerrainMap, MapError> {
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .skip_while(|l| l.is_empty())
        .collect();
    let rows: Vec<&str> = match rows.iter().rposition(|l| !l.is_empty()) {
        Some(last) => rows[..=last].to_vec(),
        None => return Err(MapError::Empty),
    };

    let height = rows.len();
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    let mut density = vec![0.0f32; width * height];
    let mut spawn_cells = Vec::new();

    for (row, line) in rows.iter().enumerate() {
        let y = height - 1 - row;
        for (col, glyph) in line.chars().enumerate() {
            match glyph {
                '#' | 'X' => density[y * width + col] = 1.0,
                '.' | ' ' => {}
                'S' => spawn_cells.push((col, y)),
                _ => return Err(MapError::UnknownGlyph { row, col, glyph }),
            }
        }
    }

    let origin = -Vec2::new((width.max(1) - 1) as f32, (height - 1) as f32) * scale * 0.5;
    let grid = TerrainGrid::from_density(width, height, scale, origin, density)?;
    let spawn_points = spawn_cells
        .into_iter()
        .map(|(x, y)| grid.vertex_position(x as i32, y as i32))
        .collect();

    Ok(TerrainMap { grid, spawn_points })
}

/// Load and parse a map file.
pub fn load_map(path: &Path, scale: f32) -> Result<TerrainMap, MapError> {
    let text = std::fs::read_to_string(path)?;
    let map = parse_map(&text, scale)?;
    info!(
        path = %path.display(),
        width = map.grid.width(),
        height = map.grid.height(),
        spawns = map.spawn_points.len(),
        "terrain map loaded"
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = "
S...S
.###.
#####
";

    #[test]
    fn test_parse_layout() {
        let map = parse_map(MAP, 1.0).unwrap();
        assert_eq!(map.grid.width(), 5);
        assert_eq!(map.grid.height(), 3);
        // Bottom row is fully solid, top row is empty.
        assert_eq!(map.grid.sample(0, 0), 1.0);
        assert_eq!(map.grid.sample(0, 1), 0.0);
        assert_eq!(map.grid.sample(2, 1), 1.0);
        assert_eq!(map.grid.sample(0, 2), 0.0);
    }

    #[test]
    fn test_parse_centres_on_origin() {
        let map = parse_map(MAP, 2.0).unwrap();
        let (min, max) = map.grid.bounds();
        assert_eq!(min, Vec2::new(-4.0, -2.0));
        assert_eq!(max, Vec2::new(4.0, 2.0));
        assert_eq!(
            map.spawn_points,
            vec![Vec2::new(-4.0, 2.0), Vec2::new(4.0, 2.0)]
        );
    }

    #[test]
    fn test_short_rows_are_padded() {
        let map = parse_map("##\n####\n####", 1.0).unwrap();
        assert_eq!(map.grid.width(), 4);
        assert_eq!(map.grid.sample(3, 2), 0.0);
        assert_eq!(map.grid.sample(1, 2), 1.0);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_map("\n  \n", 1.0), Err(MapError::Empty)));
        assert!(matches!(
            parse_map("##\n#?", 1.0),
            Err(MapError::UnknownGlyph {
                row: 1,
                col: 1,
                glyph: '?'
            })
        ));
        assert!(matches!(
            parse_map("#", 1.0),
            Err(MapError::Terrain(TerrainError::TooSmall { .. }))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_map(Path::new("/nonexistent/map.txt"), 1.0).unwrap_err();
        assert!(matches!(err, MapError::Io(_)));
    }
}
