use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::IVec3;
use tracing_subscriber::EnvFilter;
use voxelspace_kernel::{Engine, EngineConfig};
use voxelspace_mesh::{Mesh, rebuild_mesh};
use voxelspace_octree::Octree;
use voxelspace_tools::{EngineInspector, MapInspector, MeshInspector};
use voxelspace_voxel::{VoxelMap, fill_heightfield};

/// Clock step used by `run` when the configuration leaves it open.
const DEFAULT_STEP_US: u64 = 16_667;

#[derive(Parser)]
#[command(name = "voxelspace-cli", about = "Headless driver for the voxel engine")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML engine configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Print the effective configuration as YAML
    Config,
    /// Run the headless engine with a fixed timestep
    Run {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate terrain, extract its surface and summarise both
    Mesh {
        /// Terrain columns along X and Y (overrides the configuration)
        #[arg(short, long)]
        extent: Option<i32>,
        /// Print the summaries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Exercise the octree with pseudo-random points
    Octree {
        /// Number of points to insert
        #[arg(short = 'n', long, default_value = "1000")]
        count: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    tracing::debug!(?config, "effective configuration");

    match cli.command {
        Commands::Info => {
            println!("voxelspace-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", voxelspace_common::crate_info());
            println!("ecs: {}", voxelspace_ecs::crate_info());
            println!("octree: {}", voxelspace_octree::crate_info());
            println!("voxel: {}", voxelspace_voxel::crate_info());
            println!("mesh: {}", voxelspace_mesh::crate_info());
            println!("input: {}", voxelspace_input::crate_info());
            println!("render: {}", voxelspace_render::crate_info());
            println!("kernel: {}", voxelspace_kernel::crate_info());
            println!("tools: {}", voxelspace_tools::crate_info());
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
        Commands::Run { ticks, json } => {
            let config = EngineConfig {
                fixed_timestep_us: config.fixed_timestep_us.or(Some(DEFAULT_STEP_US)),
                max_ticks: Some(ticks),
                ..config
            };
            let mut engine = Engine::headless(config)?;
            let report = engine.run()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
                println!("{}", EngineInspector::summary(&engine));
            }
        }
        Commands::Mesh { extent, json } => {
            let mut terrain = config.terrain.clone();
            if let Some(extent) = extent {
                anyhow::ensure!(extent >= 0, "extent must be non-negative, got {extent}");
                terrain.extent = extent;
            }
            let mut map = VoxelMap::with_min_node_size(config.chunk_size, config.chunk_min_node_size)?;
            fill_heightfield(&mut map, &terrain)?;
            let mut mesh = Mesh::new();
            rebuild_mesh(&map, &mut mesh);

            let map_summary = MapInspector::summary(&map);
            let mesh_summary = MeshInspector::summary(&mesh);
            if json {
                let value = serde_json::json!({ "map": map_summary, "mesh": mesh_summary });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{map_summary}");
                for chunk in MapInspector::list_chunks(&map) {
                    println!("  {chunk}");
                }
                println!("{mesh_summary}");
            }
        }
        Commands::Octree { count } => {
            println!("Octree demo: inserting {count} points");
            let mut octree = Octree::new(16, IVec3::ZERO, 1);
            let points = scatter(count);
            for (i, &pos) in points.iter().enumerate() {
                octree.add(i, pos)?;
            }
            let bounds = octree.max_bounds();
            println!(
                "After insert: count={}, bounds min={} max={}",
                octree.len(),
                bounds.min(),
                bounds.max()
            );

            let nearby = octree.get_nearby(IVec3::ZERO, 16.0);
            println!("Within 16 of the origin: {}", nearby.len());

            let missing = points
                .iter()
                .filter(|&&pos| octree.remove(pos).is_none())
                .count();
            let bounds = octree.max_bounds();
            println!(
                "After removal: count={}, missing={missing}, bounds min={} max={}",
                octree.len(),
                bounds.min(),
                bounds.max()
            );
        }
    }

    Ok(())
}

/// Deterministic points spread over roughly `[-512, 512)` on each axis.
fn scatter(count: usize) -> Vec<IVec3> {
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 33) % 1024) as i32 - 512
    };
    (0..count)
        .map(|_| IVec3::new(next(), next(), next()))
        .collect()
}
