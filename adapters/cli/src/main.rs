#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads Gridcast levels, renders a frame as text
//! and prints NPC paths.

mod settings;
mod terminal;

use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec2;
use gridcast_core::{CellCoord, Command};
use gridcast_rendering::{project_columns, DepthBuffer, RenderingBackend, Viewport};
use gridcast_system_path_finding::{Connectivity, PathFinder};
use gridcast_system_ray_casting::RayCaster;
use gridcast_world::{apply, query, Engine, LevelCatalog, LevelDescription};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{settings::Settings, terminal::TerminalBackend};

#[derive(Parser)]
#[command(name = "gridcast", about = "Grid ray casting and path finding toolkit")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file; defaults apply when it does not exist
    #[arg(long, global = true, default_value = "gridcast.toml")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the levels found in a directory, in play order
    Levels {
        /// Directory holding the level files
        #[arg(short, long, default_value = "levels")]
        dir: PathBuf,
    },
    /// Cast a frame from the player spawn and print it as text
    Render {
        /// Directory holding the level files
        #[arg(short, long, default_value = "levels")]
        dir: PathBuf,
        /// Level number; wraps around the catalog
        #[arg(short, long, default_value = "0")]
        level: usize,
        /// Frame width in characters
        #[arg(long)]
        columns: Option<u32>,
        /// Frame height in lines
        #[arg(long)]
        rows: Option<u32>,
        /// Camera facing, in degrees clockwise from east
        #[arg(short, long, allow_hyphen_values = true)]
        angle: Option<f32>,
        /// Camera position as X,Y in world units; defaults to the player spawn
        #[arg(short, long, value_parser = parse_position)]
        position: Option<Vec2>,
    },
    /// Print the path an NPC would follow between two cells
    Path {
        /// Directory holding the level files
        #[arg(short, long, default_value = "levels")]
        dir: PathBuf,
        /// Level number; wraps around the catalog
        #[arg(short, long, default_value = "0")]
        level: usize,
        /// Start cell as COLUMN,ROW
        #[arg(long, value_parser = parse_cell)]
        from: CellCoord,
        /// Goal cell as COLUMN,ROW
        #[arg(long, value_parser = parse_cell)]
        to: CellCoord,
        /// Restrict movement to cardinal steps
        #[arg(long)]
        four: bool,
    },
}

/// Entry point for the Gridcast command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::load(&cli.settings)?;

    match cli.command {
        Commands::Levels { dir } => list_levels(&dir),
        Commands::Render {
            dir,
            level,
            columns,
            rows,
            angle,
            position,
        } => {
            let viewport = Viewport::new(
                columns.unwrap_or(settings.screen_columns),
                rows.unwrap_or(settings.screen_rows),
            )?;
            render(&settings, &dir, level, viewport, angle, position)
        }
        Commands::Path {
            dir,
            level,
            from,
            to,
            four,
        } => {
            let connectivity = if four {
                Connectivity::Four
            } else {
                settings.connectivity
            };
            print_path(&settings, &dir, level, from, to, connectivity)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected COLUMN,ROW, got `{value}`"))?;
    let column = column
        .trim()
        .parse()
        .map_err(|error| format!("invalid column `{column}`: {error}"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|error| format!("invalid row `{row}`: {error}"))?;
    Ok(CellCoord::new(column, row))
}

fn parse_position(value: &str) -> Result<Vec2, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got `{value}`"))?;
    let x: f32 = x
        .trim()
        .parse()
        .map_err(|error| format!("invalid x `{x}`: {error}"))?;
    let y: f32 = y
        .trim()
        .parse()
        .map_err(|error| format!("invalid y `{y}`: {error}"))?;
    Ok(Vec2::new(x, y))
}

fn discover(dir: &Path) -> Result<LevelCatalog> {
    LevelCatalog::discover(dir).with_context(|| format!("failed to open levels in {}", dir.display()))
}

fn start(settings: &Settings, dir: &Path, level: usize) -> Result<Engine> {
    let catalog = discover(dir)?;
    let mut engine = Engine::new_game(&catalog, level, settings.fov())
        .with_context(|| format!("failed to start level {level}"))?;
    let mut events = Vec::new();
    engine.update(&mut events);
    Ok(engine)
}

fn list_levels(dir: &Path) -> Result<()> {
    let catalog = discover(dir)?;
    for (index, path) in catalog.levels().iter().enumerate() {
        let description = LevelDescription::from_path(path)?;
        println!("{index}: {} ({})", description.name, path.display());
    }
    Ok(())
}

fn render(
    settings: &Settings,
    dir: &Path,
    level: usize,
    viewport: Viewport,
    angle: Option<f32>,
    position: Option<Vec2>,
) -> Result<()> {
    let mut engine = start(settings, dir, level)?;
    let mut pose = query::camera_pose(&engine);
    if let Some(position) = position {
        let level_map = query::level_map(&engine);
        ensure!(
            level_map.cell_at(position).is_some(),
            "camera position ({}, {}) lies outside level {}",
            position.x,
            position.y,
            level_map.name()
        );
        pose = pose.with_position(position);
    }
    if let Some(degrees) = angle {
        pose = pose.with_angle(degrees.to_radians());
    }
    if pose != query::camera_pose(&engine) {
        let mut events = Vec::new();
        apply(&mut engine, Command::SetCameraPose { pose }, &mut events);
    }

    let frame = engine.frame();
    let mut hits = Vec::new();
    let mut strips = Vec::new();
    let mut depth = DepthBuffer::new();
    RayCaster::new(settings.ray_cast_config()).cast_columns(
        frame.level,
        &frame.pose,
        viewport.columns() as usize,
        &mut hits,
    );
    project_columns(&hits, viewport.rows(), &mut strips);
    depth.fill(&strips);

    info!(
        level = frame.level.name(),
        columns = viewport.columns(),
        rows = viewport.rows(),
        "rendering frame"
    );
    let stdout = io::stdout();
    TerminalBackend::new(stdout.lock(), viewport, settings.max_ray_distance)
        .present(&strips, &depth)
}

fn print_path(
    settings: &Settings,
    dir: &Path,
    level: usize,
    from: CellCoord,
    to: CellCoord,
    connectivity: Connectivity,
) -> Result<()> {
    let engine = start(settings, dir, level)?;
    let level_map = query::level_map(&engine);
    let requester = level_map.occupant(from);
    let path = PathFinder::new(connectivity)
        .find_level_path(level_map, requester, from, to)
        .context("path request rejected")?;

    match path {
        Some(path) if path.is_empty() => println!("already at goal"),
        Some(path) => {
            let steps: Vec<String> = std::iter::once(from)
                .chain(path.waypoints().iter().copied())
                .map(|cell| format!("({}, {})", cell.column(), cell.row()))
                .collect();
            println!("{} steps: {}", path.len(), steps.join(" -> "));
        }
        None => println!("no path"),
    }
    Ok(())
}
