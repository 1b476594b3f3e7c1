//! Pick-up, drag and drop of a single held item.
//!
//! The controller does no input handling or ray casting. The presentation
//! layer resolves clicks and hovers to a lane item or a world-space hit point
//! and calls in here; the controller owns the item while it is held.

use glam::{IVec2, Vec3};
use packline_core::{Error, ItemId, Result};
use tracing::debug;

use crate::container::Container;
use crate::item::Item;
use crate::lane::ConveyorLane;

/// Column of a bag the held item would be dropped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingDrop {
    /// Index of the bag in the slice passed to [`PlacementController::release`]
    pub bag: usize,
    /// Anchor column
    pub column: IVec2,
    /// Where the item will settle
    pub preview: Vec3,
}

/// Holds at most one item between pick-up and drop.
#[derive(Debug)]
pub struct PlacementController {
    held: Option<Item>,
    pending: Option<PendingDrop>,
    enabled: bool,
}

impl Default for PlacementController {
    fn default() -> Self {
        Self {
            held: None,
            pending: None,
            enabled: true,
        }
    }
}

impl PlacementController {
    /// Create an enabled controller holding nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether picks, moves and drops are accepted
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stop or resume accepting player actions, e.g. once the bag is packed.
    ///
    /// A held item stays held while disabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pending = None;
        }
    }

    #[inline]
    pub fn held(&self) -> Option<&Item> {
        self.held.as_ref()
    }

    #[inline]
    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    #[inline]
    pub fn pending_drop(&self) -> Option<PendingDrop> {
        self.pending
    }

    /// Take item `id` off `lane`. The item becomes static.
    ///
    /// Returns false when something is already held or the lane does not have
    /// the item.
    pub fn pick_from_lane(&mut self, lane: &mut ConveyorLane, id: ItemId) -> bool {
        if !self.enabled || self.held.is_some() {
            return false;
        }
        let Some(mut item) = lane.remove_item(id) else {
            return false;
        };
        item.make_static();
        debug!(item = item.name(), "picked up item from lane");
        self.held = Some(item);
        self.pending = None;
        true
    }

    /// Take the topmost removable item under `hit_point` out of `bag`.
    pub fn pick_from_bag(
        &mut self,
        bag: &mut Container,
        hit_point: Vec3,
    ) -> Result<Option<ItemId>> {
        if !self.enabled || self.held.is_some() {
            return Ok(None);
        }
        let column = bag.world_to_column(hit_point);
        let Some(item) = bag.try_remove_item(column.x, column.y)? else {
            return Ok(None);
        };
        let id = item.id();
        debug!(item = item.name(), %column, "picked up item from bag");
        self.held = Some(item);
        self.pending = None;
        Ok(Some(id))
    }

    /// Move the held item freely, away from any bag.
    pub fn drag_to(&mut self, world: Vec3) {
        if !self.enabled {
            return;
        }
        if let Some(item) = self.held.as_mut() {
            item.set_position(world);
        }
        self.pending = None;
    }

    /// Hover the held item over `bags[bag]` at `hit_point`.
    ///
    /// The hit point is taken as the center of the item's footprint. On a
    /// valid column the item snaps to its preview position and the column is
    /// remembered for [`release`](Self::release); otherwise the item follows
    /// `fallback` and nothing is remembered.
    pub fn hover(
        &mut self,
        bags: &[Container],
        bag: usize,
        hit_point: Vec3,
        fallback: Vec3,
    ) -> Result<Option<Vec3>> {
        let target = bags.get(bag).ok_or(Error::UnknownContainer(bag))?;
        if !self.enabled {
            return Ok(None);
        }
        let Some(item) = self.held.as_mut() else {
            return Ok(None);
        };

        let size = item.shape().size();
        let half =
            Vec3::new(size.x as f32, 0.0, size.z as f32) * (target.frame().cell_size() * 0.5);
        let corner = hit_point - target.frame().frame().transform_vector(half);
        let column = target.world_to_column(corner);

        match target.try_get_preview_position(item, column.x, column.y) {
            Some(preview) => {
                item.set_position(preview);
                self.pending = Some(PendingDrop {
                    bag,
                    column,
                    preview,
                });
                Ok(Some(preview))
            }
            None => {
                item.set_position(fallback);
                self.pending = None;
                Ok(None)
            }
        }
    }

    /// Turn the held item a quarter turn and revalidate the pending drop.
    ///
    /// Returns the new preview position if the remembered column still fits.
    pub fn rotate_held(&mut self, bags: &[Container]) -> Option<Vec3> {
        if !self.enabled {
            return None;
        }
        let item = self.held.as_mut()?;
        item.rotate_clockwise_90();
        debug!(item = item.name(), "rotated held item");

        let pending = self.pending.take()?;
        let bag = bags.get(pending.bag)?;
        let preview =
            bag.try_get_preview_position(item, pending.column.x, pending.column.y)?;
        item.set_position(preview);
        self.pending = Some(PendingDrop { preview, ..pending });
        Some(preview)
    }

    /// Drop the held item into the remembered bag column.
    ///
    /// Returns the placed item's id; `None` leaves the item held.
    pub fn release(&mut self, bags: &mut [Container]) -> Result<Option<ItemId>> {
        if !self.enabled {
            return Ok(None);
        }
        let Some(pending) = self.pending else {
            debug!("release outside a bag, keep dragging");
            return Ok(None);
        };
        let Some(item) = self.held.take() else {
            return Ok(None);
        };
        let Some(bag) = bags.get_mut(pending.bag) else {
            self.held = Some(item);
            return Err(Error::UnknownContainer(pending.bag));
        };

        match bag.try_add_item(item, pending.column.x, pending.column.y) {
            Ok(id) => {
                self.pending = None;
                Ok(Some(id))
            }
            Err(item) => {
                debug!(item = item.name(), "failed to place item in bag");
                self.held = Some(item);
                Ok(None)
            }
        }
    }

    /// Put the held item back onto a lane at `world`.
    pub fn release_onto_lane(&mut self, lane: &mut ConveyorLane, world: Vec3) -> Option<ItemId> {
        if !self.enabled {
            return None;
        }
        let item = self.held.take()?;
        match lane.try_add_item_from_external(item, world) {
            Ok(id) => {
                self.pending = None;
                Some(id)
            }
            Err(item) => {
                self.held = Some(item);
                None
            }
        }
    }
}
