//! terrain-prep: ASCII map inspection, carving and outline export.
//!
//! Usage:
//!   terrain-prep inspect --map arena.txt
//!   terrain-prep carve --map arena.txt --at 0,-1 --radius 1.5 --output carved.json
//!   terrain-prep outline --map arena.txt --output outline.json
//!   terrain-prep synthetic --size 64x24 --output hills.txt

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use glam::Vec2;
use serde::Serialize;
use tracing::{error, info};

use ballz_core::config::SimConfig;
use ballz_terrain::mesh::total_area;
use ballz_terrain::{load_map, Polyline, TerrainGrid, TerrainMap, Triangle};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "inspect" => cmd_inspect(&args[2..]),
        "carve" => cmd_carve(&args[2..]),
        "outline" => cmd_outline(&args[2..]),
        "synthetic" => cmd_synthetic(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        error!("{e:#}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn print_usage() {
    eprintln!(
        "terrain-prep: Ballz terrain map tool\n\
         \n\
         Commands:\n\
         \n\
         inspect   Print grid size, spawn points, outline and mesh statistics\n\
         \n\
           --map <path>       ASCII map file\n\
           --scale <units>    World units per glyph (default: 1)\n\
           --config <path>    SimConfig JSON for the outline tolerance (optional)\n\
         \n\
         carve     Carve craters, then write the resulting geometry as JSON\n\
         \n\
           --map <path>       ASCII map file\n\
           --at <x,y>         Crater centre (can specify multiple)\n\
           --radius <r>       Crater radius (default: 1)\n\
           --output <path>    Output JSON path (default: stdout)\n\
         \n\
         outline   Write the outline and triangle mesh of a map as JSON\n\
         \n\
           --map <path>       ASCII map file\n\
           --output <path>    Output JSON path (default: stdout)\n\
         \n\
         synthetic Generate a rolling-hills ASCII map\n\
         \n\
           --size <WxH>       Map size in glyphs (default: 64x24)\n\
           --spawns <N>       Spawn points along the surface (default: 4)\n\
           --output <path>    Output map path (default: stdout)\n\
         \n\
         Set RUST_LOG=debug for more detail.\n"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn flag_values<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.windows(2)
        .filter(|w| w[0] == flag)
        .map(|w| w[1].as_str())
        .collect()
}

fn parse_pair<T: std::str::FromStr>(text: &str, sep: char) -> Option<(T, T)> {
    let (a, b) = text.split_once(sep)?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn parse_f32(args: &[String], flag: &str, default: f32) -> Result<f32> {
    match flag_value(args, flag) {
        Some(v) => v.parse().with_context(|| format!("{flag} expects a number, got {v:?}")),
        None => Ok(default),
    }
}

fn parse_output(args: &[String]) -> Option<PathBuf> {
    flag_value(args, "--output").map(PathBuf::from)
}

/// Load the `--map` file with `--scale` and the optional `--config` tolerance.
fn load_terrain(args: &[String]) -> Result<TerrainMap> {
    let Some(path) = flag_value(args, "--map") else {
        bail!("--map <path> is required");
    };
    let scale = parse_f32(args, "--scale", 1.0)?;
    let mut map =
        load_map(path.as_ref(), scale).with_context(|| format!("loading map {path}"))?;

    let config = match flag_value(args, "--config") {
        Some(p) => SimConfig::load(p.as_ref()).with_context(|| format!("loading config {p}"))?,
        None => SimConfig::default(),
    };
    map.grid
        .set_simplify_tolerance_cells(config.outline_simplify_cells);
    Ok(map)
}

fn write_text(output: Option<PathBuf>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), bytes = text.len(), "output written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Geometry dump shared by `carve` and `outline`.
#[derive(Serialize)]
struct GeometryDump<'a> {
    width: usize,
    height: usize,
    scale: f32,
    origin: Vec2,
    revision: u64,
    spawn_points: &'a [Vec2],
    outline: &'a [Polyline],
    triangles: Vec<Triangle>,
}

impl<'a> GeometryDump<'a> {
    fn new(grid: &'a TerrainGrid, spawn_points: &'a [Vec2]) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            scale: grid.scale(),
            origin: grid.origin(),
            revision: grid.revision(),
            spawn_points,
            outline: grid.outline(),
            triangles: grid.triangles(),
        }
    }
}

// --- Inspect command ---

fn cmd_inspect(args: &[String]) -> Result<()> {
    let map = load_terrain(args)?;
    let grid = &map.grid;
    let (min, max) = grid.bounds();
    let holes = grid.outline().iter().filter(|p| p.is_hole()).count();
    let points: usize = grid.outline().iter().map(|p| p.points.len()).sum();
    let triangles = grid.triangles();

    println!("grid:         {}x{} samples, scale {}", grid.width(), grid.height(), grid.scale());
    println!("bounds:       ({}, {}) .. ({}, {})", min.x, min.y, max.x, max.y);
    println!("spawn points: {}", map.spawn_points.len());
    for p in &map.spawn_points {
        println!("  ({:.2}, {:.2})", p.x, p.y);
    }
    println!(
        "outline:      {} loops ({} holes), {} points",
        grid.outline().len(),
        holes,
        points
    );
    println!(
        "mesh:         {} triangles, solid area {:.3}",
        triangles.len(),
        total_area(&triangles)
    );
    Ok(())
}

// --- Carve command ---

fn cmd_carve(args: &[String]) -> Result<()> {
    let mut map = load_terrain(args)?;
    let radius = parse_f32(args, "--radius", 1.0)?;

    let centres = flag_values(args, "--at");
    if centres.is_empty() {
        bail!("--at <x,y> is required");
    }
    for text in centres {
        let Some((x, y)) = parse_pair::<f32>(text, ',') else {
            bail!("--at expects x,y, got {text:?}");
        };
        map.grid.subtract_circle(Vec2::new(x, y), radius);
        info!(x, y, radius, revision = map.grid.revision(), "crater carved");
    }

    let dump = GeometryDump::new(&map.grid, &map.spawn_points);
    write_text(parse_output(args), &serde_json::to_string_pretty(&dump)?)
}

// --- Outline command ---

fn cmd_outline(args: &[String]) -> Result<()> {
    let map = load_terrain(args)?;
    let dump = GeometryDump::new(&map.grid, &map.spawn_points);
    info!(
        loops = dump.outline.len(),
        triangles = dump.triangles.len(),
        "geometry extracted"
    );
    write_text(parse_output(args), &serde_json::to_string_pretty(&dump)?)
}

// --- Synthetic map command ---

fn cmd_synthetic(args: &[String]) -> Result<()> {
    let (width, height) = match flag_value(args, "--size") {
        Some(text) => parse_pair::<usize>(text, 'x')
            .with_context(|| format!("--size expects WxH, got {text:?}"))?,
        None => (64, 24),
    };
    if width < 4 || height < 6 {
        bail!("--size must be at least 4x6");
    }
    let spawns = match flag_value(args, "--spawns") {
        Some(v) => v
            .parse::<usize>()
            .with_context(|| format!("--spawns expects a count, got {v:?}"))?,
        None => 4,
    };

    let text = synthetic_hills(width, height, spawns);
    info!(width, height, spawns, "synthetic map generated");
    write_text(parse_output(args), &text)
}

/// Rolling hills with a floating ledge, spawn points evenly spaced two
/// glyphs above the surface.
fn synthetic_hills(width: usize, height: usize, spawns: usize) -> String {
    let surface: Vec<usize> = (0..width)
        .map(|col| {
            let nx = col as f64 / width as f64;
            let h = 0.35 + 0.12 * (nx * 9.0).sin() + 0.05 * (nx * 23.0).cos();
            ((h * height as f64) as usize).clamp(1, height - 4)
        })
        .collect();

    let mut rows = vec![vec!['.'; width]; height];
    for (col, &top) in surface.iter().enumerate() {
        for y in 0..=top {
            rows[height - 1 - y][col] = '#';
        }
    }

    // A ledge over the middle leaves a cave beneath it.
    let ledge_y = (height * 3 / 4).min(height - 2);
    for cell in rows[height - 1 - ledge_y]
        .iter_mut()
        .take(width * 3 / 5)
        .skip(width * 2 / 5)
    {
        *cell = '#';
    }

    for i in 0..spawns {
        let col = (i * 2 + 1) * width / (spawns * 2);
        let y = surface[col] + 2;
        let row = &mut rows[height - 1 - y];
        if row[col] == '.' {
            row[col] = 'S';
        }
    }

    rows.into_iter()
        .map(|r| r.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
