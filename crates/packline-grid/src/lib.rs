//! Item shapes and occupancy grids for the Packline simulation.

pub mod lane_grid;
pub mod shape;
pub mod volume;

pub use lane_grid::GridOccupancy2d;
pub use shape::Shape;
pub use volume::GridOccupancy3d;
