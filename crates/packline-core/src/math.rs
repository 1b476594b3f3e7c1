//! Rigid transforms used to place grids in the world.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of a grid in world space.
///
/// Scale is deliberately absent; grids carry their own cell size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// World-space origin of the frame
    pub position: Vec3,
    /// World-space orientation of the frame
    pub rotation: Quat,
}

impl Default for Frame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Frame {
    /// Frame at the world origin with no rotation
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a new frame
    #[inline]
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation: rotation.normalize(),
        }
    }

    /// Frame translated to `position` with no rotation
    #[inline]
    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Map a local point into world space
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Map a world point into local space
    #[inline]
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Map a local direction into world space
    #[inline]
    pub fn transform_vector(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }
}
