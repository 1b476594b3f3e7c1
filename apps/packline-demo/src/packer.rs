//! Automatic stand-in for the player.

use glam::{IVec3, Vec3};
use packline_core::{Error, ItemId, Result};
use packline_sim::{Container, Conveyor, PlacementController};
use tracing::{debug, info};

/// Moves stopped items from one lane into one bag.
pub struct AutoPacker {
    controller: PlacementController,
    lane: usize,
    bag: usize,
}

impl AutoPacker {
    /// Packer taking items from lane index `lane` into bag index `bag`.
    pub fn new(lane: usize, bag: usize) -> Self {
        Self {
            controller: PlacementController::new(),
            lane,
            bag,
        }
    }

    /// Stop handling items, as when the player presses the pack button.
    pub fn stop(&mut self) {
        self.controller.set_enabled(false);
    }

    /// Pick up a waiting item and try to pack it.
    ///
    /// Returns false once an item fits nowhere in the bag at any rotation.
    pub fn step(&mut self, conveyor: &mut Conveyor, bags: &mut [Container]) -> Result<bool> {
        if !self.controller.is_holding() {
            let lane = conveyor.lane_mut(self.lane)?;
            let waiting = lane.items().iter().find(|item| item.is_static());
            let Some(id) = waiting.map(|item| item.id()) else {
                return Ok(true);
            };
            self.controller.pick_from_lane(lane, id);
        }

        for _ in 0..4 {
            if let Some(id) = self.try_columns(bags)? {
                info!(%id, "packed item");
                return Ok(true);
            }
            self.controller.rotate_held(bags);
        }

        debug!("held item fits nowhere");
        Ok(false)
    }

    /// Hover every column in order and drop into the first that fits.
    fn try_columns(&mut self, bags: &mut [Container]) -> Result<Option<ItemId>> {
        let Some(size) = self.controller.held().map(|item| item.shape().size()) else {
            return Ok(None);
        };
        let bag = bags.get(self.bag).ok_or(Error::UnknownContainer(self.bag))?;
        let cell_size = bag.frame().cell_size();
        let half = bag
            .frame()
            .frame()
            .transform_vector(Vec3::new(size.x as f32, 0.0, size.z as f32) * (cell_size * 0.5));
        let extent = bag.size();

        for z in 0..extent.z {
            for x in 0..extent.x {
                let hit = bags[self.bag].grid_to_world(IVec3::new(x, 0, z)) + half;
                if self.controller.hover(bags, self.bag, hit, Vec3::ZERO)?.is_some() {
                    return self.controller.release(bags);
                }
            }
        }
        Ok(None)
    }
}
