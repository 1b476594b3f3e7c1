//! Bag packing and conveyor transport for the Packline simulation.
//!
//! The crate is pure state-transition logic. A presentation layer drives it
//! with ticks and pick/drop events and reads item positions back for
//! rendering:
//! - [`Container`]: a bag with gravity stacking and top-only removal
//! - [`ConveyorLane`]: a belt that spawns, moves and hands off items
//! - [`Conveyor`]: a chain of lanes stepped in declaration order
//! - [`PlacementController`]: pick-up, drag, rotate and drop of one held item

pub mod config;
pub mod container;
pub mod controller;
pub mod conveyor;
pub mod item;
pub mod lane;

pub use config::{ContainerConfig, ItemDefinition, LaneConfig};
pub use container::Container;
pub use controller::{PendingDrop, PlacementController};
pub use conveyor::Conveyor;
pub use item::{Item, Placement};
pub use lane::{ConveyorLane, TickReport};
