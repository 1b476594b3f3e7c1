//! 3D occupancy grid for bags.
//!
//! Every cell stores the id of the item occupying it, if any. The grid knows
//! nothing about the items themselves; callers keep each item's cell list and
//! pass it back on removal.

use glam::{IVec2, IVec3};
use hashbrown::HashMap;
use packline_core::{Error, ItemId, Result};

use crate::shape::Shape;

/// Fixed-size 3D occupancy map with one optional owner per cell.
#[derive(Clone, Debug)]
pub struct GridOccupancy3d {
    size: IVec3,
    cells: Vec<Option<ItemId>>,
}

impl GridOccupancy3d {
    /// Create an empty grid.
    pub fn new(size: IVec3) -> Result<Self> {
        if size.min_element() <= 0 {
            return Err(Error::InvalidConfig(format!(
                "grid dimensions must be positive, got {size}"
            )));
        }
        let volume = (size.x as usize) * (size.y as usize) * (size.z as usize);
        Ok(Self {
            size,
            cells: vec![None; volume],
        })
    }

    /// Grid dimensions
    #[inline]
    pub fn size(&self) -> IVec3 {
        self.size
    }

    #[inline]
    fn index(&self, cell: IVec3) -> usize {
        cell.x as usize
            + (cell.y as usize) * (self.size.x as usize)
            + (cell.z as usize) * (self.size.x as usize) * (self.size.y as usize)
    }

    /// Whether the cell lies inside the grid
    #[inline]
    pub fn is_cell_in_bounds(&self, cell: IVec3) -> bool {
        cell.cmpge(IVec3::ZERO).all() && cell.cmplt(self.size).all()
    }

    /// Occupant of a cell; `None` when empty or out of bounds.
    #[inline]
    pub fn owner_at(&self, cell: IVec3) -> Option<ItemId> {
        if self.is_cell_in_bounds(cell) {
            self.cells[self.index(cell)]
        } else {
            None
        }
    }

    /// Whether the cell holds an item. Out-of-bounds cells are never occupied.
    #[inline]
    pub fn is_cell_occupied(&self, cell: IVec3) -> bool {
        self.owner_at(cell).is_some()
    }

    /// True iff every cell is in bounds and unoccupied.
    pub fn are_all_cells_free(&self, cells: &[IVec3]) -> bool {
        cells
            .iter()
            .all(|&c| self.is_cell_in_bounds(c) && !self.is_cell_occupied(c))
    }

    /// Mark cells as owned by `owner`. Out-of-bounds cells are skipped.
    pub fn occupy_cells(&mut self, cells: &[IVec3], owner: ItemId) {
        for &cell in cells {
            if self.is_cell_in_bounds(cell) {
                let index = self.index(cell);
                self.cells[index] = Some(owner);
            }
        }
    }

    /// Clear cells. Out-of-bounds cells are skipped.
    pub fn free_cells(&mut self, cells: &[IVec3]) {
        for &cell in cells {
            if self.is_cell_in_bounds(cell) {
                let index = self.index(cell);
                self.cells[index] = None;
            }
        }
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// All cells currently owned by `owner`, in index order.
    pub fn cells_owned_by(&self, owner: ItemId) -> Vec<IVec3> {
        let mut owned = Vec::new();
        for z in 0..self.size.z {
            for y in 0..self.size.y {
                for x in 0..self.size.x {
                    let cell = IVec3::new(x, y, z);
                    if self.owner_at(cell) == Some(owner) {
                        owned.push(cell);
                    }
                }
            }
        }
        owned
    }

    /// Whether any column holds an item other than `ignore` strictly above
    /// that column's own top.
    fn blocked_above(&self, tops: &HashMap<IVec2, i32>, ignore: Option<ItemId>) -> bool {
        tops.iter().any(|(column, &top_y)| {
            ((top_y + 1).max(0)..self.size.y).any(|y| {
                match self.owner_at(IVec3::new(column.x, y, column.y)) {
                    Some(owner) => Some(owner) != ignore,
                    None => false,
                }
            })
        })
    }

    /// Lowest anchor height at which `shape`, anchored at column `(x, z)`,
    /// comes to rest.
    ///
    /// A height is accepted when all of the shape's cells are in bounds and
    /// free there, and nothing sits above the shape's top cell in any column
    /// of its footprint, so the item can be lowered into place from the top.
    /// The first accepted height scanning up from 0 wins.
    pub fn find_lowest_available_y(&self, x: i32, z: i32, shape: &Shape) -> Option<i32> {
        let anchor = IVec3::new(x, 0, z);
        let base = column_tops(shape.cells().iter().map(|&c| anchor + c));

        (0..self.size.y).find(|&y| {
            let cells = shape.cells_at(IVec3::new(x, y, z));
            let tops: HashMap<IVec2, i32> =
                base.iter().map(|(&column, &top)| (column, top + y)).collect();
            self.are_all_cells_free(&cells) && !self.blocked_above(&tops, None)
        })
    }

    /// Occupant of the highest occupied cell in column `(x, z)`.
    pub fn find_topmost_item_at_column(&self, x: i32, z: i32) -> Option<ItemId> {
        (0..self.size.y)
            .rev()
            .find_map(|y| self.owner_at(IVec3::new(x, y, z)))
    }

    /// Whether `owner`, occupying `cells`, can be lifted out.
    ///
    /// False when another item occupies any cell above the item's highest
    /// cell of that column, in any of its footprint columns, or when `cells`
    /// is empty.
    pub fn can_remove(&self, owner: ItemId, cells: &[IVec3]) -> bool {
        if cells.is_empty() {
            return false;
        }
        !self.blocked_above(&column_tops(cells.iter().copied()), Some(owner))
    }
}

/// Highest `y` per `(x, z)` column.
fn column_tops(cells: impl Iterator<Item = IVec3>) -> HashMap<IVec2, i32> {
    let mut tops = HashMap::new();
    for c in cells {
        tops.entry(IVec2::new(c.x, c.z))
            .and_modify(|top: &mut i32| *top = (*top).max(c.y))
            .or_insert(c.y);
    }
    tops
}
