//! Multi-cell item shapes.
//!
//! A shape is an ordered list of integer cell offsets from an implicit anchor.
//! Each offset occupies the unit cube `[offset, offset + 1)`. Bags use the
//! offsets as-is; lanes use the shape's footprint, the distinct `(x, z)`
//! columns it touches.

use glam::{IVec2, IVec3};
use packline_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Cell offsets describing an item's occupied volume.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<IVec3>", into = "Vec<IVec3>")]
pub struct Shape {
    cells: Vec<IVec3>,
}

impl Shape {
    /// Create a shape from its cell offsets.
    ///
    /// Duplicate offsets are not checked for.
    pub fn new(cells: Vec<IVec3>) -> Result<Self> {
        if cells.is_empty() {
            return Err(Error::InvalidConfig("shape has no cells".to_string()));
        }
        Ok(Self { cells })
    }

    /// Single 1x1x1 cell at the anchor
    pub fn unit() -> Self {
        Self {
            cells: vec![IVec3::ZERO],
        }
    }

    /// Solid box with the given extents, anchored at its minimum corner.
    pub fn cuboid(size: IVec3) -> Result<Self> {
        if size.min_element() <= 0 {
            return Err(Error::InvalidConfig(format!(
                "cuboid extents must be positive, got {size}"
            )));
        }
        let mut cells = Vec::with_capacity((size.x * size.y * size.z) as usize);
        for y in 0..size.y {
            for z in 0..size.z {
                for x in 0..size.x {
                    cells.push(IVec3::new(x, y, z));
                }
            }
        }
        Ok(Self { cells })
    }

    /// Cell offsets in definition order
    #[inline]
    pub fn cells(&self) -> &[IVec3] {
        &self.cells
    }

    /// Number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a constructed shape
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Inclusive minimum and maximum offsets.
    pub fn bounds(&self) -> (IVec3, IVec3) {
        self.cells.iter().fold(
            (IVec3::splat(i32::MAX), IVec3::splat(i32::MIN)),
            |(min, max), &c| (min.min(c), max.max(c)),
        )
    }

    /// Bounding box extents in cells.
    pub fn size(&self) -> IVec3 {
        let (min, max) = self.bounds();
        max - min + IVec3::ONE
    }

    /// Distinct `(x, z)` columns, in order of first appearance.
    pub fn footprint(&self) -> Vec<IVec2> {
        let mut columns: Vec<IVec2> = Vec::with_capacity(self.cells.len());
        for c in &self.cells {
            let column = IVec2::new(c.x, c.z);
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        columns
    }

    /// Absolute cells with the anchor at `anchor`.
    pub fn cells_at(&self, anchor: IVec3) -> Vec<IVec3> {
        self.cells.iter().map(|&c| anchor + c).collect()
    }

    /// Absolute footprint columns with the anchor at `anchor`.
    pub fn footprint_at(&self, anchor: IVec2) -> Vec<IVec2> {
        self.footprint().into_iter().map(|c| anchor + c).collect()
    }

    /// Rotate a quarter turn clockwise about the vertical axis, in place.
    ///
    /// Each offset maps `(x, z) -> (z, -x)`; the result is shifted so the
    /// horizontal bounding box keeps its minimum corner. Heights are
    /// untouched. Width and depth swap.
    pub fn rotate_clockwise_90(&mut self) {
        let (min, _) = self.bounds();
        for c in &mut self.cells {
            *c = IVec3::new(c.z, c.y, -c.x);
        }
        let (rotated_min, _) = self.bounds();
        let shift = IVec3::new(min.x - rotated_min.x, 0, min.z - rotated_min.z);
        for c in &mut self.cells {
            *c += shift;
        }
    }

    /// Rotated copy, see [`Shape::rotate_clockwise_90`].
    #[must_use]
    pub fn rotated_clockwise_90(&self) -> Self {
        let mut rotated = self.clone();
        rotated.rotate_clockwise_90();
        rotated
    }
}

impl TryFrom<Vec<IVec3>> for Shape {
    type Error = Error;

    fn try_from(cells: Vec<IVec3>) -> Result<Self> {
        Self::new(cells)
    }
}

impl From<Shape> for Vec<IVec3> {
    fn from(shape: Shape) -> Self {
        shape.cells
    }
}
