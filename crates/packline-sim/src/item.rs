//! Item records.

use glam::{IVec2, IVec3, Vec3};
use packline_core::ItemId;
use packline_grid::Shape;

use crate::config::ItemDefinition;

/// Where an item currently lives and which cells it holds there.
///
/// An item is hosted by at most one grid at a time; the variant says which
/// kind, the host owning the item says which instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Placement {
    /// Not in any grid (held by the placement controller or freshly built).
    #[default]
    Detached,
    /// Resident on a conveyor lane.
    Lane {
        /// Lane cell of the shape's anchor
        anchor: IVec2,
        /// Absolute lane cells, possibly partly outside the lane
        cells: Vec<IVec2>,
    },
    /// Packed in a bag.
    Bag {
        /// Bag cell of the shape's anchor
        anchor: IVec3,
        /// Absolute bag cells
        cells: Vec<IVec3>,
    },
}

/// A single item instance.
///
/// An id names exactly one instance and whoever holds the value owns the
/// item, so `Item` is not `Clone`.
#[derive(Debug)]
pub struct Item {
    id: ItemId,
    name: String,
    prefab: String,
    shape: Shape,
    position: Vec3,
    is_static: bool,
    placement: Placement,
}

impl Item {
    /// Create a detached item at the world origin.
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        let name = name.into();
        Self {
            id: ItemId::next(),
            prefab: name.clone(),
            name,
            shape,
            position: Vec3::ZERO,
            is_static: false,
            placement: Placement::Detached,
        }
    }

    /// Instantiate a definition; the name becomes `<definition>_<serial>`.
    pub fn from_definition(definition: &ItemDefinition, serial: u64) -> Self {
        Self {
            id: ItemId::next(),
            name: format!("{}_{serial}", definition.name),
            prefab: definition.prefab.clone(),
            shape: definition.shape.clone(),
            position: Vec3::ZERO,
            is_static: false,
            placement: Placement::Detached,
        }
    }

    /// Unique id, stable for the item's lifetime
    #[inline]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Display name, `<definition>_<serial>` for spawned items
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key the presentation layer resolves to a visual
    #[inline]
    pub fn prefab(&self) -> &str {
        &self.prefab
    }

    /// Shape at the current rotation
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// World position of the shape's anchor
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move a detached item, e.g. while dragging. Hosted items are only moved
    /// by their host.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// True once the item has stopped on a lane or been picked up
    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Freeze the item.
    pub fn make_static(&mut self) {
        self.is_static = true;
    }

    /// Host kind and recorded cells
    #[inline]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Recorded bag cells, if packed in a bag.
    pub fn bag_cells(&self) -> Option<&[IVec3]> {
        match &self.placement {
            Placement::Bag { cells, .. } => Some(cells),
            _ => None,
        }
    }

    /// Recorded lane cells, if resident on a lane.
    pub fn lane_cells(&self) -> Option<&[IVec2]> {
        match &self.placement {
            Placement::Lane { cells, .. } => Some(cells),
            _ => None,
        }
    }

    /// Anchor cell on the hosting lane, if resident on a lane.
    pub fn lane_anchor(&self) -> Option<IVec2> {
        match &self.placement {
            Placement::Lane { anchor, .. } => Some(*anchor),
            _ => None,
        }
    }

    /// Rotate a quarter turn clockwise about the vertical axis.
    ///
    /// Only detached items can turn; the recorded cells of a hosted item
    /// must keep matching its shape. Returns whether the rotation happened.
    pub fn rotate_clockwise_90(&mut self) -> bool {
        if self.placement != Placement::Detached {
            return false;
        }
        self.shape.rotate_clockwise_90();
        true
    }

    /// Second instance sharing `id`, for exercising duplicate-id guards.
    #[cfg(test)]
    pub(crate) fn duplicate_of(other: &Self) -> Self {
        Self {
            id: other.id,
            name: other.name.clone(),
            prefab: other.prefab.clone(),
            shape: other.shape.clone(),
            position: other.position,
            is_static: other.is_static,
            placement: Placement::Detached,
        }
    }

    pub(crate) fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
    }

    pub(crate) fn set_moving(&mut self) {
        self.is_static = false;
    }

    pub(crate) fn detach(&mut self) {
        self.placement = Placement::Detached;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_names_include_serial() {
        let def = ItemDefinition::new("mug", Shape::unit());
        let item = Item::from_definition(&def, 3);
        assert_eq!(item.name(), "mug_3");
        assert_eq!(item.prefab(), "mug");
        assert!(!item.is_static());
        assert_eq!(item.placement(), &Placement::Detached);
    }

    #[test]
    fn hosted_items_do_not_rotate() {
        let shape = Shape::cuboid(IVec3::new(2, 1, 1)).unwrap();
        let mut item = Item::new("plank", shape.clone());
        item.set_placement(Placement::Bag {
            anchor: IVec3::ZERO,
            cells: shape.cells_at(IVec3::ZERO),
        });
        assert!(!item.rotate_clockwise_90());
        assert_eq!(item.shape(), &shape);

        item.detach();
        assert!(item.rotate_clockwise_90());
        assert_eq!(item.shape().size(), IVec3::new(1, 1, 2));
    }
}
