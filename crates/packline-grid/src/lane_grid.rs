//! 2D occupancy grid for conveyor lanes.

use glam::IVec2;
use packline_core::{Error, Result};

/// Fixed-size boolean occupancy map.
///
/// Owners are not stored; the lane's resident list knows which item holds
/// which cells.
#[derive(Clone, Debug)]
pub struct GridOccupancy2d {
    size: IVec2,
    cells: Vec<bool>,
}

impl GridOccupancy2d {
    /// Create an empty grid.
    pub fn new(size: IVec2) -> Result<Self> {
        if size.min_element() <= 0 {
            return Err(Error::InvalidConfig(format!(
                "grid dimensions must be positive, got {size}"
            )));
        }
        Ok(Self {
            size,
            cells: vec![false; (size.x as usize) * (size.y as usize)],
        })
    }

    /// Grid dimensions
    #[inline]
    pub fn size(&self) -> IVec2 {
        self.size
    }

    #[inline]
    fn index(&self, cell: IVec2) -> usize {
        cell.x as usize + (cell.y as usize) * (self.size.x as usize)
    }

    /// Whether the cell lies inside the grid
    #[inline]
    pub fn is_cell_in_bounds(&self, cell: IVec2) -> bool {
        cell.cmpge(IVec2::ZERO).all() && cell.cmplt(self.size).all()
    }

    /// Whether the cell is occupied. Out-of-bounds cells are never occupied.
    #[inline]
    pub fn is_cell_occupied(&self, cell: IVec2) -> bool {
        self.is_cell_in_bounds(cell) && self.cells[self.index(cell)]
    }

    /// True iff every cell is in bounds and unoccupied.
    pub fn are_all_cells_free(&self, cells: &[IVec2]) -> bool {
        cells
            .iter()
            .all(|&c| self.is_cell_in_bounds(c) && !self.is_cell_occupied(c))
    }

    /// True iff at least one cell is in bounds.
    pub fn any_in_bounds(&self, cells: &[IVec2]) -> bool {
        cells.iter().any(|&c| self.is_cell_in_bounds(c))
    }

    /// Mark cells occupied. Out-of-bounds cells are skipped.
    pub fn occupy_cells(&mut self, cells: &[IVec2]) {
        self.set_cells(cells, true);
    }

    /// Mark cells free. Out-of-bounds cells are skipped.
    pub fn free_cells(&mut self, cells: &[IVec2]) {
        self.set_cells(cells, false);
    }

    fn set_cells(&mut self, cells: &[IVec2], occupied: bool) {
        for &cell in cells {
            if self.is_cell_in_bounds(cell) {
                let index = self.index(cell);
                self.cells[index] = occupied;
            }
        }
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}
