//! Construction-time configuration.
//!
//! All values are fixed once a container or lane is built.

use glam::{IVec2, IVec3};
use packline_core::constants::{DEFAULT_CELL_SIZE, DEFAULT_LANE_SPEED, DEFAULT_SPAWN_INTERVAL};
use packline_core::{Error, Frame, Result};
use packline_grid::Shape;
use serde::{Deserialize, Serialize};

/// An item type that lanes can spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Type name, used as the prefix of spawned item names.
    pub name: String,
    /// Occupied cells at the default orientation.
    pub shape: Shape,
    /// Opaque key the presentation layer resolves to a visual.
    #[serde(default)]
    pub prefab: String,
}

impl ItemDefinition {
    /// Create a definition whose prefab key equals its name.
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        let name = name.into();
        Self {
            prefab: name.clone(),
            name,
            shape,
        }
    }
}

/// Bag configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// World placement; origin at the horizontal center, vertical bottom.
    pub frame: Frame,
    /// Dimensions in cells.
    pub size: IVec3,
    /// Edge length of one cell.
    pub cell_size: f32,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            frame: Frame::IDENTITY,
            size: IVec3::new(4, 4, 4),
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

/// Conveyor lane configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneConfig {
    /// World placement; origin at the middle of the entry edge.
    pub frame: Frame,
    /// Dimensions in cells: `x` across the belt, `y` along it.
    pub size: IVec2,
    /// Edge length of one cell.
    pub cell_size: f32,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Seconds between spawn attempts.
    pub spawn_interval: f32,
    /// Item types to spawn. An empty list disables spawning.
    pub definitions: Vec<ItemDefinition>,
    /// Index of the lane that receives items leaving this one, when the lane
    /// is part of a [`crate::Conveyor`].
    pub downstream: Option<usize>,
    /// Remove items that leave the lane when there is no downstream lane,
    /// instead of stopping them at the end.
    pub despawn_at_end: bool,
    /// Whether the spawner starts enabled.
    pub spawning_enabled: bool,
    /// Seed for spawn choices.
    pub seed: u64,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            frame: Frame::IDENTITY,
            size: IVec2::new(4, 12),
            cell_size: DEFAULT_CELL_SIZE,
            speed: DEFAULT_LANE_SPEED,
            spawn_interval: DEFAULT_SPAWN_INTERVAL,
            definitions: Vec::new(),
            downstream: None,
            despawn_at_end: false,
            spawning_enabled: true,
            seed: 0,
        }
    }
}

impl LaneConfig {
    /// Check the values that the lane frame does not validate itself.
    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "lane speed must be finite and non-negative, got {}",
                self.speed
            )));
        }
        if !self.spawn_interval.is_finite() || self.spawn_interval <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "spawn interval must be positive, got {}",
                self.spawn_interval
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(LaneConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_negative_speed_and_zero_interval() {
        let config = LaneConfig {
            speed: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LaneConfig {
            spawn_interval: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn definition_prefab_defaults_to_name() {
        let def = ItemDefinition::new("apple", Shape::unit());
        assert_eq!(def.prefab, "apple");
    }
}
