//! Packline headless demo
//!
//! Runs two chained conveyor lanes feeding a single bag. An automatic packer
//! stands in for the player: it takes items that stopped at the end of the
//! last lane and drops them into the first column where they fit, turning
//! them when needed.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p packline-demo -- [OPTIONS]
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

mod packer;

use glam::{IVec2, IVec3, Vec3};
use packline_core::Frame;
use packline_grid::Shape;
use packline_sim::{Container, ContainerConfig, Conveyor, ItemDefinition, LaneConfig, TickReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::packer::AutoPacker;

const CELL_SIZE: f32 = 0.1;
const TICK_RATE: f32 = 30.0;

/// Run parameters (from CLI or defaults).
#[derive(Debug, Clone)]
struct DemoParams {
    ticks: u32,
    seed: u64,
}

impl Default for DemoParams {
    fn default() -> Self {
        Self {
            ticks: 3000,
            seed: 42,
        }
    }
}

impl DemoParams {
    fn from_args() -> Self {
        let mut params = Self::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--ticks" => {
                    if let Some(v) = args.get(i + 1).and_then(|a| a.parse().ok()) {
                        params.ticks = v;
                        i += 1;
                    }
                }
                "--seed" => {
                    if let Some(v) = args.get(i + 1).and_then(|a| a.parse().ok()) {
                        params.seed = v;
                        i += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        params
    }
}

fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "-h" || arg == "--help") {
        print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let params = DemoParams::from_args();
    info!(ticks = params.ticks, seed = params.seed, "Packline demo");

    let definitions = vec![
        ItemDefinition::new("cube", Shape::unit()),
        ItemDefinition::new("plank", Shape::cuboid(IVec3::new(2, 1, 1))?),
        ItemDefinition::new(
            "corner",
            Shape::new(vec![
                IVec3::new(0, 0, 0),
                IVec3::new(1, 0, 0),
                IVec3::new(0, 0, 1),
                IVec3::new(0, 1, 0),
            ])?,
        ),
    ];

    let feed_size = IVec2::new(3, 8);
    let feed_length = feed_size.y as f32 * CELL_SIZE;
    let lanes = [
        LaneConfig {
            size: feed_size,
            cell_size: CELL_SIZE,
            definitions,
            downstream: Some(1),
            seed: params.seed,
            ..Default::default()
        },
        LaneConfig {
            frame: Frame::from_translation(Vec3::new(-feed_length, 0.0, 0.0)),
            size: IVec2::new(3, 6),
            cell_size: CELL_SIZE,
            spawning_enabled: false,
            ..Default::default()
        },
    ];
    let mut conveyor = Conveyor::new(&lanes)?;

    let mut bags = vec![Container::new(&ContainerConfig {
        frame: Frame::from_translation(Vec3::new(-1.0, 0.0, 0.6)),
        size: IVec3::new(4, 4, 4),
        cell_size: CELL_SIZE,
    })?];

    let mut packer = AutoPacker::new(conveyor.len() - 1, 0);
    let dt = 1.0 / TICK_RATE;
    let mut totals = TickReport::default();

    for tick in 0..params.ticks {
        totals.merge(conveyor.tick(dt));
        if !packer.step(&mut conveyor, &mut bags)? {
            info!(tick, "bag is full, stopping");
            conveyor.halt();
            packer.stop();
            break;
        }
    }

    let bag = &bags[0];
    let capacity = bag.size().x * bag.size().y * bag.size().z;
    info!(
        spawned = totals.spawned.len(),
        transferred = totals.transferred.len(),
        stopped = totals.stopped.len(),
        packed = bag.len(),
        filled = bag.occupancy().occupied_count(),
        capacity,
        "run finished"
    );
    for item in bag.items() {
        info!(item = item.name(), position = %item.position(), "packed");
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        "Packline headless demo

USAGE:
    cargo run -p packline-demo -- [OPTIONS]

OPTIONS:
    --ticks <N>             Number of simulation ticks at 30 Hz (default: 3000)
    --seed <N>              Spawner seed (default: 42)
    -h, --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log level (e.g., info, debug, trace)"
    );
}
