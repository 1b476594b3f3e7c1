//! Coordinate systems for bags and conveyor lanes.
//!
//! Both grids are placed in the world by a [`Frame`] plus a uniform cell size.
//! World to grid conversion always rounds to the nearest cell
//! ([`f32::round`]), for hit points as well as for moving items.

use glam::{IVec2, IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::Frame;

fn validate_cell_size(cell_size: f32) -> Result<()> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "cell size must be positive and finite, got {cell_size}"
        )))
    }
}

#[inline]
fn round_to_cell(v: f32) -> i32 {
    v.round() as i32
}

/// Placement of a 3D bag grid in the world.
///
/// The frame origin sits at the horizontal center and the vertical bottom of
/// the grid. Grid X maps to local X, grid Y to local Y (up), grid Z to local Z.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BagFrame {
    frame: Frame,
    size: IVec3,
    cell_size: f32,
}

impl BagFrame {
    /// Create a new bag frame.
    pub fn new(frame: Frame, size: IVec3, cell_size: f32) -> Result<Self> {
        if size.min_element() <= 0 {
            return Err(Error::InvalidConfig(format!(
                "bag dimensions must be positive, got {size}"
            )));
        }
        validate_cell_size(cell_size)?;
        Ok(Self {
            frame,
            size,
            cell_size,
        })
    }

    /// World placement of the grid
    #[inline]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Grid dimensions in cells
    #[inline]
    pub fn size(&self) -> IVec3 {
        self.size
    }

    /// Edge length of one cell
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World position of a cell's minimum corner.
    pub fn cell_to_world(&self, cell: IVec3) -> Vec3 {
        let local = Vec3::new(
            (cell.x as f32 - self.size.x as f32 * 0.5) * self.cell_size,
            cell.y as f32 * self.cell_size,
            (cell.z as f32 - self.size.z as f32 * 0.5) * self.cell_size,
        );
        self.frame.transform_point(local)
    }

    /// Nearest cell to a world position.
    pub fn world_to_cell(&self, world: Vec3) -> IVec3 {
        let local = self.frame.inverse_transform_point(world);
        IVec3::new(
            round_to_cell(local.x / self.cell_size + self.size.x as f32 * 0.5),
            round_to_cell(local.y / self.cell_size),
            round_to_cell(local.z / self.cell_size + self.size.z as f32 * 0.5),
        )
    }

    /// Nearest `(x, z)` column to a world position, ignoring height.
    pub fn world_to_column(&self, world: Vec3) -> IVec2 {
        let cell = self.world_to_cell(world);
        IVec2::new(cell.x, cell.z)
    }
}

/// Placement of a 2D conveyor lane in the world.
///
/// The frame origin sits at the middle of the entry edge. Grid X (across the
/// belt) maps to local +Z; grid Y (along the belt) maps to local -X, which is
/// also the direction items travel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneFrame {
    frame: Frame,
    size: IVec2,
    cell_size: f32,
}

impl LaneFrame {
    /// Create a new lane frame.
    pub fn new(frame: Frame, size: IVec2, cell_size: f32) -> Result<Self> {
        if size.min_element() <= 0 {
            return Err(Error::InvalidConfig(format!(
                "lane dimensions must be positive, got {size}"
            )));
        }
        validate_cell_size(cell_size)?;
        Ok(Self {
            frame,
            size,
            cell_size,
        })
    }

    /// World placement of the lane
    #[inline]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Grid dimensions in cells
    #[inline]
    pub fn size(&self) -> IVec2 {
        self.size
    }

    /// Edge length of one cell
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World-space unit direction of travel.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.frame.transform_vector(Vec3::NEG_X)
    }

    /// World position of a lane cell.
    pub fn cell_to_world(&self, cell: IVec2) -> Vec3 {
        let local = Vec3::new(
            -(cell.y as f32) * self.cell_size,
            0.0,
            (cell.x as f32 - self.size.x as f32 * 0.5) * self.cell_size,
        );
        self.frame.transform_point(local)
    }

    /// Nearest lane cell to a world position.
    pub fn world_to_cell(&self, world: Vec3) -> IVec2 {
        let local = self.frame.inverse_transform_point(world);
        IVec2::new(
            round_to_cell(local.z / self.cell_size + self.size.x as f32 * 0.5),
            round_to_cell(-local.x / self.cell_size),
        )
    }
}
