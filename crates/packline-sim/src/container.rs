//! Bags: 3D containers with gravity stacking.
//!
//! Items are dropped into a column and settle at the lowest height where they
//! fit without anything above them. Only items with nothing stacked on top of
//! any of their columns can be taken out again.

use glam::{IVec2, IVec3, Vec3};
use hashbrown::HashMap;
use packline_core::{BagFrame, Error, ItemId, Result};
use packline_grid::GridOccupancy3d;
use tracing::{debug, error};

use crate::config::ContainerConfig;
use crate::item::{Item, Placement};

/// A bag that owns its occupancy grid and the items packed into it.
#[derive(Debug)]
pub struct Container {
    frame: BagFrame,
    grid: GridOccupancy3d,
    items: HashMap<ItemId, Item>,
}

impl Container {
    /// Create an empty bag.
    pub fn new(config: &ContainerConfig) -> Result<Self> {
        let frame = BagFrame::new(config.frame, config.size, config.cell_size)?;
        let grid = GridOccupancy3d::new(config.size)?;
        Ok(Self {
            frame,
            grid,
            items: HashMap::new(),
        })
    }

    /// World placement and cell metrics
    #[inline]
    pub fn frame(&self) -> &BagFrame {
        &self.frame
    }

    /// Read-only view of the occupancy grid
    #[inline]
    pub fn occupancy(&self) -> &GridOccupancy3d {
        &self.grid
    }

    /// Grid dimensions in cells
    #[inline]
    pub fn size(&self) -> IVec3 {
        self.grid.size()
    }

    /// Number of packed items
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether item `id` is packed in this bag.
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Packed item by id.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Packed items in no particular order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Column under a world-space hit point.
    pub fn world_to_column(&self, world: Vec3) -> IVec2 {
        self.frame.world_to_column(world)
    }

    /// World position of a cell's minimum corner.
    pub fn grid_to_world(&self, cell: IVec3) -> Vec3 {
        self.frame.cell_to_world(cell)
    }

    /// Drop `item` into the bag with its anchor at column `(grid_x, grid_z)`.
    ///
    /// The item settles at the lowest supported height. On success the bag
    /// takes ownership and returns the item's id; when there is no room the
    /// item is handed back untouched.
    pub fn try_add_item(
        &mut self,
        mut item: Item,
        grid_x: i32,
        grid_z: i32,
    ) -> std::result::Result<ItemId, Item> {
        if self.items.contains_key(&item.id()) {
            error!(id = %item.id(), "item is already packed in this bag");
            return Err(item);
        }
        let Some(grid_y) = self.grid.find_lowest_available_y(grid_x, grid_z, item.shape()) else {
            debug!(
                item = item.name(),
                grid_x, grid_z, "cannot add item, no space available"
            );
            return Err(item);
        };

        let anchor = IVec3::new(grid_x, grid_y, grid_z);
        let cells = item.shape().cells_at(anchor);
        self.grid.occupy_cells(&cells, item.id());

        let world = self.frame.cell_to_world(anchor);
        item.set_position(world);
        item.set_placement(Placement::Bag { anchor, cells });

        debug!(item = item.name(), %anchor, %world, "added item to bag");

        let id = item.id();
        self.items.insert(id, item);
        Ok(id)
    }

    /// Take the topmost item out of column `(grid_x, grid_z)`.
    ///
    /// Returns `Ok(None)` when the column is empty or the item has others
    /// stacked on it. An item whose recorded cells are missing is an
    /// internal fault and is reported as [`Error::Inconsistent`].
    pub fn try_remove_item(&mut self, grid_x: i32, grid_z: i32) -> Result<Option<Item>> {
        let Some(id) = self.grid.find_topmost_item_at_column(grid_x, grid_z) else {
            debug!(grid_x, grid_z, "no item at column");
            return Ok(None);
        };

        let Some(item) = self.items.get(&id) else {
            error!(%id, grid_x, grid_z, "grid references an item the bag does not hold");
            return Err(Error::Inconsistent(format!(
                "cell owner {id} is not packed in this bag"
            )));
        };

        let cells = match item.bag_cells() {
            Some(cells) if !cells.is_empty() => cells,
            _ => {
                error!(item = item.name(), "item has no stored cells, cannot remove");
                return Err(Error::Inconsistent(format!(
                    "item {} has no recorded bag cells",
                    item.name()
                )));
            }
        };

        if !self.grid.can_remove(id, cells) {
            debug!(
                item = item.name(),
                grid_x, grid_z, "cannot remove item, items are stacked above it"
            );
            return Ok(None);
        }

        self.grid.free_cells(cells);
        let freed = cells.len();

        let Some(mut item) = self.items.remove(&id) else {
            return Err(Error::Inconsistent(format!(
                "item {id} vanished during removal"
            )));
        };
        item.detach();
        debug!(item = item.name(), grid_x, grid_z, freed, "removed item from bag");
        Ok(Some(item))
    }

    /// World position `item` would settle at if dropped at column
    /// `(grid_x, grid_z)`, without changing the bag.
    ///
    /// `None` when any part of the footprint falls outside the bag or there is
    /// no room in the column.
    pub fn try_get_preview_position(&self, item: &Item, grid_x: i32, grid_z: i32) -> Option<Vec3> {
        let shape = item.shape();
        let size = self.grid.size();
        let inside = shape
            .footprint_at(IVec2::new(grid_x, grid_z))
            .iter()
            .all(|c| c.x >= 0 && c.x < size.x && c.y >= 0 && c.y < size.z);
        if !inside {
            return None;
        }

        let grid_y = self.grid.find_lowest_available_y(grid_x, grid_z, shape)?;
        let anchor = IVec3::new(grid_x, grid_y, grid_z);
        if !self.grid.are_all_cells_free(&shape.cells_at(anchor)) {
            return None;
        }
        Some(self.frame.cell_to_world(anchor))
    }
}
