//! Conveyor lanes.
//!
//! Items move continuously along the lane but only touch the occupancy grid
//! when they cross a cell boundary. Each crossing is re-evaluated: the item
//! either advances, leaves the lane for the downstream one, or stops.

use glam::{IVec2, Vec3};
use packline_core::{Error, ItemId, LaneFrame, Result};
use packline_grid::GridOccupancy2d;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, trace};

use crate::config::{ItemDefinition, LaneConfig};
use crate::item::{Item, Placement};

/// What happened to items during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Items created by the spawner.
    pub spawned: Vec<ItemId>,
    /// Items handed to a downstream lane.
    pub transferred: Vec<ItemId>,
    /// Items that stopped and became static.
    pub stopped: Vec<ItemId>,
    /// Items removed after leaving a lane with nowhere to go.
    pub despawned: Vec<ItemId>,
}

impl TickReport {
    /// True when nothing changed state.
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty()
            && self.transferred.is_empty()
            && self.stopped.is_empty()
            && self.despawned.is_empty()
    }

    /// Append another report's events.
    pub fn merge(&mut self, other: Self) {
        self.spawned.extend(other.spawned);
        self.transferred.extend(other.transferred);
        self.stopped.extend(other.stopped);
        self.despawned.extend(other.despawned);
    }
}

/// Result of re-evaluating one moving item.
enum Step {
    /// Still inside the same cells.
    Glide,
    /// Crossed into free cells.
    Advance { anchor: IVec2, cells: Vec<IVec2> },
    /// Every candidate cell is past the lane edge.
    Exit,
    /// A candidate cell is held by another item.
    Blocked,
}

/// A conveyor belt that owns its occupancy grid and resident items.
#[derive(Debug)]
pub struct ConveyorLane {
    frame: LaneFrame,
    grid: GridOccupancy2d,
    items: Vec<Item>,
    definitions: Vec<ItemDefinition>,
    speed: f32,
    spawn_interval: f32,
    spawn_timer: f32,
    spawn_count: u64,
    /// Items handed over by an upstream lane since this lane last moved.
    /// They already travelled for the current step.
    arrivals: Vec<ItemId>,
    spawning_enabled: bool,
    movement_enabled: bool,
    despawn_at_end: bool,
    rng: StdRng,
}

impl ConveyorLane {
    /// Create an empty lane.
    pub fn new(config: &LaneConfig) -> Result<Self> {
        config.validate()?;
        let frame = LaneFrame::new(config.frame, config.size, config.cell_size)?;
        let grid = GridOccupancy2d::new(config.size)?;
        Ok(Self {
            frame,
            grid,
            items: Vec::new(),
            definitions: config.definitions.clone(),
            speed: config.speed,
            spawn_interval: config.spawn_interval,
            spawn_timer: 0.0,
            spawn_count: 0,
            arrivals: Vec::new(),
            spawning_enabled: config.spawning_enabled,
            movement_enabled: true,
            despawn_at_end: config.despawn_at_end,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// World placement and cell metrics
    #[inline]
    pub fn frame(&self) -> &LaneFrame {
        &self.frame
    }

    /// Read-only view of the occupancy grid
    #[inline]
    pub fn occupancy(&self) -> &GridOccupancy2d {
        &self.grid
    }

    /// Resident items in insertion order
    #[inline]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Resident item by id.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether item `id` is on this lane.
    pub fn contains(&self, id: ItemId) -> bool {
        self.item(id).is_some()
    }

    /// Number of resident items
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Nearest lane cell to a world position.
    pub fn world_to_cell(&self, world: Vec3) -> IVec2 {
        self.frame.world_to_cell(world)
    }

    /// World position of a lane cell.
    pub fn cell_to_world(&self, cell: IVec2) -> Vec3 {
        self.frame.cell_to_world(cell)
    }

    /// Whether the spawner runs on tick
    pub fn spawning_enabled(&self) -> bool {
        self.spawning_enabled
    }

    /// Turn the spawner on or off; the spawn timer keeps its value.
    pub fn set_spawning_enabled(&mut self, enabled: bool) {
        self.spawning_enabled = enabled;
    }

    /// Whether items move on tick
    pub fn movement_enabled(&self) -> bool {
        self.movement_enabled
    }

    pub fn set_movement_enabled(&mut self, enabled: bool) {
        self.movement_enabled = enabled;
    }

    /// Advance the lane by `dt` seconds.
    ///
    /// Items leaving the far edge are offered to `downstream`. Items are
    /// visited newest first so removals during the pass never skip an entry.
    ///
    /// Items handed over by an upstream lane during the current step have
    /// already moved for it and are left alone.
    #[cfg_attr(feature = "profiling", tracing::instrument(level = "trace", skip_all))]
    pub fn tick(&mut self, dt: f32, downstream: Option<&mut ConveyorLane>) -> TickReport {
        let mut report = TickReport::default();

        if self.spawning_enabled {
            self.spawn_timer += dt;
            if self.spawn_timer >= self.spawn_interval {
                self.spawn_timer = 0.0;
                if let Some(id) = self.try_spawn() {
                    report.spawned.push(id);
                }
            }
        }

        if self.movement_enabled {
            self.move_items(dt, downstream, &mut report);
        }
        self.arrivals.clear();

        report
    }

    /// Spawn a random definition at a random free offset of the entry row.
    ///
    /// Returns `None` when there are no definitions or no offset fits.
    pub fn try_spawn(&mut self) -> Option<ItemId> {
        if self.definitions.is_empty() {
            return None;
        }
        let choice = self.rng.gen_range(0..self.definitions.len());
        let definition = &self.definitions[choice];
        let footprint = definition.shape.footprint();

        let free_offsets: Vec<i32> = (0..self.grid.size().x)
            .filter(|&x| {
                let cells = offset_cells(&footprint, IVec2::new(x, 0));
                self.grid.are_all_cells_free(&cells)
            })
            .collect();
        if free_offsets.is_empty() {
            trace!(definition = %definition.name, "no free spawn offset");
            return None;
        }

        let x = free_offsets[self.rng.gen_range(0..free_offsets.len())];
        let anchor = IVec2::new(x, 0);
        let cells = offset_cells(&footprint, anchor);

        self.spawn_count += 1;
        let mut item = Item::from_definition(definition, self.spawn_count);
        let world = self.frame.cell_to_world(anchor);
        item.set_position(world);
        self.grid.occupy_cells(&cells);
        item.set_placement(Placement::Lane { anchor, cells });

        debug!(item = item.name(), grid_x = x, %world, "spawned item");

        let id = item.id();
        self.items.push(item);
        Some(id)
    }

    /// Accept an item arriving at `world`, from another lane or the player.
    ///
    /// Rejected (and handed back) when none of its cells lands on the lane or
    /// any of them is already occupied. Accepted items start moving.
    pub fn try_add_item_from_external(
        &mut self,
        mut item: Item,
        world: Vec3,
    ) -> std::result::Result<ItemId, Item> {
        if self.contains(item.id()) {
            error!(id = %item.id(), "item is already on this lane");
            return Err(item);
        }
        let anchor = self.frame.world_to_cell(world);
        let cells = offset_cells(&item.shape().footprint(), anchor);

        if !self.grid.any_in_bounds(&cells) {
            trace!(item = item.name(), %anchor, "rejected item, no cell on lane");
            return Err(item);
        }
        if cells.iter().any(|&c| self.grid.is_cell_occupied(c)) {
            trace!(item = item.name(), %anchor, "rejected item, cells occupied");
            return Err(item);
        }

        self.grid.occupy_cells(&cells);
        item.set_position(world);
        item.set_moving();
        item.set_placement(Placement::Lane { anchor, cells });

        debug!(item = item.name(), %anchor, "accepted item onto lane");

        let id = item.id();
        self.items.push(item);
        Ok(id)
    }

    /// Start a new conveyor step: nothing counts as freshly handed over.
    pub(crate) fn begin_step(&mut self) {
        self.arrivals.clear();
    }

    /// Accept an item leaving an upstream lane during its tick.
    fn receive(&mut self, item: Item, world: Vec3) -> std::result::Result<ItemId, Item> {
        let id = self.try_add_item_from_external(item, world)?;
        self.arrivals.push(id);
        Ok(id)
    }

    /// Take a resident item off the lane, freeing its cells.
    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        let mut item = self.items.remove(index);
        if let Some(cells) = item.lane_cells() {
            self.grid.free_cells(cells);
        }
        item.detach();
        debug!(item = item.name(), "removed item from lane");
        Some(item)
    }

    fn move_items(
        &mut self,
        dt: f32,
        mut downstream: Option<&mut ConveyorLane>,
        report: &mut TickReport,
    ) {
        let delta = self.frame.forward() * (self.speed * dt);

        for index in (0..self.items.len()).rev() {
            let item = &self.items[index];
            if item.is_static() || self.arrivals.contains(&item.id()) {
                continue;
            }

            let candidate = self.items[index].position() + delta;
            match self.evaluate(&self.items[index], candidate) {
                Ok(Step::Glide) => self.items[index].set_position(candidate),
                Ok(Step::Advance { anchor, cells }) => {
                    let item = &mut self.items[index];
                    if let Some(old) = item.lane_cells() {
                        self.grid.free_cells(old);
                    }
                    self.grid.occupy_cells(&cells);
                    item.set_position(candidate);
                    item.set_placement(Placement::Lane { anchor, cells });
                    trace!(item = item.name(), %anchor, "item advanced");
                }
                Ok(Step::Exit) => {
                    self.exit(index, candidate, downstream.as_deref_mut(), report);
                }
                Ok(Step::Blocked) => {
                    self.freeze(index);
                    report.stopped.push(self.items[index].id());
                }
                Err(err) => {
                    error!(item = self.items[index].name(), %err, "lane item lost its cells");
                    self.freeze(index);
                    report.stopped.push(self.items[index].id());
                }
            }
        }
    }

    fn evaluate(&self, item: &Item, candidate: Vec3) -> Result<Step> {
        let current = item.lane_cells().ok_or_else(|| {
            Error::Inconsistent(format!("moving item {} has no lane cells", item.name()))
        })?;

        let anchor = self.frame.world_to_cell(candidate);
        let cells = offset_cells(&item.shape().footprint(), anchor);

        if cells == current {
            return Ok(Step::Glide);
        }
        if !self.grid.any_in_bounds(&cells) {
            return Ok(Step::Exit);
        }
        let blocked = cells
            .iter()
            .any(|c| self.grid.is_cell_occupied(*c) && !current.contains(c));
        if blocked {
            return Ok(Step::Blocked);
        }
        Ok(Step::Advance { anchor, cells })
    }

    /// Hand an item that left the lane to `downstream`, or despawn or stop it.
    fn exit(
        &mut self,
        index: usize,
        candidate: Vec3,
        downstream: Option<&mut ConveyorLane>,
        report: &mut TickReport,
    ) {
        let Some(downstream) = downstream else {
            if self.despawn_at_end {
                let item = self.items.remove(index);
                if let Some(cells) = item.lane_cells() {
                    self.grid.free_cells(cells);
                }
                debug!(item = item.name(), "despawned item at end of lane");
                report.despawned.push(item.id());
            } else {
                self.freeze(index);
                report.stopped.push(self.items[index].id());
            }
            return;
        };

        let item = self.items.remove(index);
        let old_cells = item.lane_cells().map(<[IVec2]>::to_vec);
        match downstream.receive(item, candidate) {
            Ok(id) => {
                if let Some(cells) = old_cells {
                    self.grid.free_cells(&cells);
                }
                debug!(%id, "handed item to downstream lane");
                report.transferred.push(id);
            }
            Err(item) => {
                self.items.insert(index, item);
                self.freeze(index);
                report.stopped.push(self.items[index].id());
            }
        }
    }

    /// Stop an item at its last cell-aligned position.
    fn freeze(&mut self, index: usize) {
        let item = &mut self.items[index];
        if let Some(anchor) = item.lane_anchor() {
            item.set_position(self.frame.cell_to_world(anchor));
        }
        item.make_static();
        debug!(item = item.name(), position = %item.position(), "item stopped");
    }
}

fn offset_cells(footprint: &[IVec2], anchor: IVec2) -> Vec<IVec2> {
    footprint.iter().map(|&c| anchor + c).collect()
}
