//! End-to-end runs of lanes, bags and the placement controller together.

use glam::{IVec2, IVec3, Vec3};
use packline_core::Frame;
use packline_grid::Shape;
use packline_sim::{
    Container, ContainerConfig, Conveyor, Item, ItemDefinition, LaneConfig, Placement,
    PlacementController,
};

fn lane_config(size: IVec2, origin: Vec3, downstream: Option<usize>) -> LaneConfig {
    LaneConfig {
        frame: Frame::from_translation(origin),
        size,
        cell_size: 1.0,
        speed: 1.0,
        spawn_interval: 1.0,
        downstream,
        spawning_enabled: false,
        ..Default::default()
    }
}

fn bag(size: IVec3) -> Container {
    Container::new(&ContainerConfig {
        frame: Frame::from_translation(Vec3::new(0.0, 0.0, 10.0)),
        size,
        cell_size: 1.0,
    })
    .unwrap()
}

#[test]
fn item_rides_two_lanes_and_stops_at_the_end() {
    let configs = [
        lane_config(IVec2::new(1, 2), Vec3::ZERO, Some(1)),
        lane_config(IVec2::new(1, 3), Vec3::new(-2.0, 0.0, 0.0), None),
    ];
    let mut conveyor = Conveyor::new(&configs).unwrap();
    let entry = conveyor.lane(0).unwrap().cell_to_world(IVec2::ZERO);
    let id = conveyor
        .lane_mut(0)
        .unwrap()
        .try_add_item_from_external(Item::new("parcel", Shape::unit()), entry)
        .unwrap();

    assert!(conveyor.tick(1.0).is_empty());
    assert_eq!(
        conveyor.lane(0).unwrap().item(id).unwrap().lane_anchor(),
        Some(IVec2::new(0, 1))
    );

    let report = conveyor.tick(1.0);
    assert_eq!(report.transferred, vec![id]);
    assert!(conveyor.lane(0).unwrap().is_empty());
    assert_eq!(conveyor.lane(0).unwrap().occupancy().occupied_count(), 0);
    // Handed over this step, so it has not moved on the second lane yet.
    assert_eq!(
        conveyor.lane(1).unwrap().item(id).unwrap().lane_anchor(),
        Some(IVec2::ZERO)
    );

    let mut stopped = Vec::new();
    for _ in 0..5 {
        stopped.extend(conveyor.tick(1.0).stopped);
    }
    assert_eq!(stopped, vec![id]);

    let last = conveyor.lane(1).unwrap();
    let item = last.item(id).unwrap();
    assert!(item.is_static());
    assert_eq!(item.lane_anchor(), Some(IVec2::new(0, 2)));
    assert_eq!(item.position(), last.cell_to_world(IVec2::new(0, 2)));
    assert_eq!(last.occupancy().occupied_count(), 1);
}

#[test]
fn queued_items_stop_behind_each_other() {
    let configs = [lane_config(IVec2::new(1, 4), Vec3::ZERO, None)];
    let mut conveyor = Conveyor::new(&configs).unwrap();
    let lane = conveyor.lane_mut(0).unwrap();
    let front_at = lane.cell_to_world(IVec2::new(0, 2));
    let front = lane
        .try_add_item_from_external(Item::new("front", Shape::unit()), front_at)
        .unwrap();
    let back_at = lane.cell_to_world(IVec2::ZERO);
    let back = lane
        .try_add_item_from_external(Item::new("back", Shape::unit()), back_at)
        .unwrap();

    for _ in 0..6 {
        conveyor.tick(1.0);
    }

    let lane = conveyor.lane(0).unwrap();
    assert_eq!(lane.item(front).unwrap().lane_anchor(), Some(IVec2::new(0, 3)));
    assert_eq!(lane.item(back).unwrap().lane_anchor(), Some(IVec2::new(0, 2)));
    assert!(lane.items().iter().all(Item::is_static));
    assert_eq!(lane.occupancy().occupied_count(), 2);
}

#[test]
fn spawned_item_is_packed_and_unpacked() {
    let mut config = lane_config(IVec2::new(2, 6), Vec3::ZERO, None);
    config.spawning_enabled = true;
    config.definitions = vec![ItemDefinition::new("crate", Shape::unit())];
    config.seed = 11;
    let mut conveyor = Conveyor::new(&[config]).unwrap();

    let spawned = conveyor.tick(1.0).spawned;
    assert_eq!(spawned.len(), 1);
    let id = spawned[0];

    let mut controller = PlacementController::new();
    assert!(controller.pick_from_lane(conveyor.lane_mut(0).unwrap(), id));
    assert!(controller.held().unwrap().is_static());

    let mut bags = vec![bag(IVec3::splat(3))];
    // Footprint center over column (2, 0).
    let hit = bags[0].grid_to_world(IVec3::new(2, 0, 0)) + Vec3::new(0.5, 0.0, 0.5);
    let preview = controller
        .hover(&bags, 0, hit, Vec3::ZERO)
        .unwrap()
        .unwrap();
    assert_eq!(preview, bags[0].grid_to_world(IVec3::new(2, 0, 0)));
    assert_eq!(controller.release(&mut bags).unwrap(), Some(id));
    assert!(!controller.is_holding());

    let placed = bags[0].item(id).unwrap();
    assert_eq!(placed.name(), "crate_1");
    assert_eq!(placed.bag_cells().unwrap(), &[IVec3::new(2, 0, 0)]);

    let click = preview + Vec3::new(0.3, 0.2, 0.3);
    let picked = controller.pick_from_bag(&mut bags[0], click).unwrap();
    assert_eq!(picked, Some(id));
    assert!(bags[0].is_empty());
    assert_eq!(bags[0].occupancy().occupied_count(), 0);
    assert_eq!(controller.held().unwrap().placement(), &Placement::Detached);
}

#[test]
fn full_column_rejects_drop_and_keeps_item_held() {
    let mut bags = vec![bag(IVec3::new(1, 2, 1))];
    for _ in 0..2 {
        bags[0]
            .try_add_item(Item::new("brick", Shape::unit()), 0, 0)
            .unwrap();
    }

    let mut controller = PlacementController::new();
    let configs = [lane_config(IVec2::new(1, 3), Vec3::ZERO, None)];
    let mut conveyor = Conveyor::new(&configs).unwrap();
    let lane = conveyor.lane_mut(0).unwrap();
    let entry = lane.cell_to_world(IVec2::ZERO);
    let id = lane
        .try_add_item_from_external(Item::new("brick", Shape::unit()), entry)
        .unwrap();
    assert!(controller.pick_from_lane(lane, id));

    let hit = bags[0].grid_to_world(IVec3::ZERO) + Vec3::new(0.5, 0.0, 0.5);
    let fallback = Vec3::new(0.0, 5.0, 0.0);
    assert_eq!(controller.hover(&bags, 0, hit, fallback).unwrap(), None);
    assert_eq!(controller.held().unwrap().position(), fallback);
    assert_eq!(controller.release(&mut bags).unwrap(), None);
    assert!(controller.is_holding());
    assert_eq!(bags[0].len(), 2);
}

#[test]
fn stack_in_small_bag_comes_out_top_first() {
    let mut bag = bag(IVec3::splat(3));
    let ids: Vec<_> = (0..3)
        .map(|n| {
            bag.try_add_item(Item::new(format!("layer{n}"), Shape::unit()), 1, 1)
                .unwrap()
        })
        .collect();
    assert!(bag
        .try_add_item(Item::new("extra", Shape::unit()), 1, 1)
        .is_err());

    for &expected in ids.iter().rev() {
        let item = bag.try_remove_item(1, 1).unwrap().unwrap();
        assert_eq!(item.id(), expected);
    }
    assert!(bag.try_remove_item(1, 1).unwrap().is_none());
}

#[test]
fn rotated_item_fits_where_original_did_not() {
    let mut bag = bag(IVec3::new(1, 2, 3));
    let mut plank = Item::new("plank", Shape::cuboid(IVec3::new(3, 1, 1)).unwrap());
    assert!(bag.try_get_preview_position(&plank, 0, 0).is_none());

    assert!(plank.rotate_clockwise_90());
    assert_eq!(plank.shape().size(), IVec3::new(1, 1, 3));
    let id = bag.try_add_item(plank, 0, 0).unwrap();
    assert_eq!(bag.occupancy().cells_owned_by(id).len(), 3);

    let mut plank = bag.try_remove_item(0, 0).unwrap().unwrap();
    let original = plank.shape().clone();
    for _ in 0..4 {
        plank.rotate_clockwise_90();
    }
    assert_eq!(plank.shape(), &original);
}
