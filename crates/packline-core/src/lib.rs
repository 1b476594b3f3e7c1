//! Core types, ids, and coordinate frames for the Packline simulation.
//!
//! This crate provides the foundational types shared by the grid and
//! simulation crates:
//! - Item identifiers
//! - Bag and lane coordinate frames (world <-> grid)
//! - The error type for configuration and consistency faults

pub mod coords;
pub mod error;
pub mod math;
pub mod types;

pub use coords::{BagFrame, LaneFrame};
pub use error::{Error, Result};
pub use math::Frame;
pub use types::ItemId;

/// Simulation-wide constants
pub mod constants {
    /// Default edge length of one grid cell in world units
    pub const DEFAULT_CELL_SIZE: f32 = 0.1;
    /// Default lane movement speed in world units per second
    pub const DEFAULT_LANE_SPEED: f32 = 0.25;
    /// Default seconds between spawn attempts on a lane
    pub const DEFAULT_SPAWN_INTERVAL: f32 = 2.0;
}
