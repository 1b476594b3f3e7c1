//! Chains of conveyor lanes.

use packline_core::{Error, Result};
use tracing::debug;

use crate::config::LaneConfig;
use crate::lane::{ConveyorLane, TickReport};

/// All lanes of a scene, stepped together in declaration order.
#[derive(Debug)]
pub struct Conveyor {
    lanes: Vec<ConveyorLane>,
    downstream: Vec<Option<usize>>,
}

impl Conveyor {
    /// Build every lane and check the downstream links.
    pub fn new(configs: &[LaneConfig]) -> Result<Self> {
        let mut lanes = Vec::with_capacity(configs.len());
        let mut downstream = Vec::with_capacity(configs.len());
        for (index, config) in configs.iter().enumerate() {
            if let Some(next) = config.downstream {
                if next == index {
                    return Err(Error::InvalidConfig(format!(
                        "lane {index} lists itself as downstream"
                    )));
                }
                if next >= configs.len() {
                    return Err(Error::UnknownLane(next));
                }
            }
            lanes.push(ConveyorLane::new(config)?);
            downstream.push(config.downstream);
        }
        debug!(lanes = lanes.len(), "built conveyor");
        Ok(Self { lanes, downstream })
    }

    /// Number of lanes
    #[inline]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// All lanes in declaration order
    pub fn lanes(&self) -> &[ConveyorLane] {
        &self.lanes
    }

    /// Lane by declaration index.
    pub fn lane(&self, index: usize) -> Result<&ConveyorLane> {
        self.lanes.get(index).ok_or(Error::UnknownLane(index))
    }

    /// Mutable lane by declaration index, e.g. to pick items off it.
    pub fn lane_mut(&mut self, index: usize) -> Result<&mut ConveyorLane> {
        self.lanes.get_mut(index).ok_or(Error::UnknownLane(index))
    }

    /// Downstream link of a lane.
    pub fn downstream_of(&self, index: usize) -> Result<Option<usize>> {
        self.downstream
            .get(index)
            .copied()
            .ok_or(Error::UnknownLane(index))
    }

    /// Step every lane once, in declaration order.
    ///
    /// An item handed to another lane moves once per step whichever order
    /// the two lanes were declared in.
    #[cfg_attr(feature = "profiling", tracing::instrument(level = "trace", skip_all))]
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let mut report = TickReport::default();
        for lane in &mut self.lanes {
            lane.begin_step();
        }
        for index in 0..self.lanes.len() {
            let (lane, next) = split_lane(&mut self.lanes, index, self.downstream[index]);
            report.merge(lane.tick(dt, next));
        }
        report
    }

    /// Stop spawning and moving on every lane.
    pub fn halt(&mut self) {
        for lane in &mut self.lanes {
            lane.set_spawning_enabled(false);
            lane.set_movement_enabled(false);
        }
        debug!("conveyor halted");
    }
}

/// Borrow a lane together with its downstream lane.
fn split_lane(
    lanes: &mut [ConveyorLane],
    index: usize,
    downstream: Option<usize>,
) -> (&mut ConveyorLane, Option<&mut ConveyorLane>) {
    match downstream {
        Some(next) if next > index => {
            let (head, tail) = lanes.split_at_mut(next);
            (&mut head[index], Some(&mut tail[0]))
        }
        Some(next) if next < index => {
            let (head, tail) = lanes.split_at_mut(index);
            (&mut tail[0], Some(&mut head[next]))
        }
        _ => (&mut lanes[index], None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use glam::{IVec2, Vec3};
    use packline_core::Frame;
    use packline_grid::Shape;

    fn config(size: IVec2, origin: Vec3, downstream: Option<usize>) -> LaneConfig {
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

    #[test]
    fn rejects_bad_links() {
        let own = [config(IVec2::new(1, 2), Vec3::ZERO, Some(0))];
        assert!(matches!(Conveyor::new(&own), Err(Error::InvalidConfig(_))));

        let dangling = [config(IVec2::new(1, 2), Vec3::ZERO, Some(3))];
        assert_eq!(Conveyor::new(&dangling).unwrap_err(), Error::UnknownLane(3));
    }

    #[test]
    fn split_lane_handles_both_directions() {
        let configs = [
            config(IVec2::new(1, 2), Vec3::ZERO, None),
            config(IVec2::new(1, 2), Vec3::ZERO, None),
            config(IVec2::new(1, 2), Vec3::ZERO, None),
        ];
        let mut conveyor = Conveyor::new(&configs).unwrap();
        let (_, next) = split_lane(&mut conveyor.lanes, 0, Some(2));
        assert!(next.is_some());
        let (_, next) = split_lane(&mut conveyor.lanes, 2, Some(1));
        assert!(next.is_some());
        let (_, next) = split_lane(&mut conveyor.lanes, 1, None);
        assert!(next.is_none());
    }

    fn carry_across(configs: &[LaneConfig], from: usize, to: usize) {
        let mut conveyor = Conveyor::new(configs).unwrap();
        let start = conveyor.lane(from).unwrap().cell_to_world(IVec2::new(0, 1));
        let id = conveyor
            .lane_mut(from)
            .unwrap()
            .try_add_item_from_external(Item::new("parcel", Shape::unit()), start)
            .unwrap();

        let report = conveyor.tick(1.0);
        assert_eq!(report.transferred, vec![id]);
        let item = conveyor.lane(to).unwrap().item(id).unwrap();
        assert_eq!(item.lane_anchor(), Some(IVec2::ZERO));

        conveyor.tick(1.0);
        let item = conveyor.lane(to).unwrap().item(id).unwrap();
        assert_eq!(item.lane_anchor(), Some(IVec2::new(0, 1)));
    }

    #[test]
    fn handoff_moves_one_cell_per_step_forward_link() {
        let configs = [
            config(IVec2::new(1, 2), Vec3::ZERO, Some(1)),
            config(IVec2::new(1, 3), Vec3::new(-2.0, 0.0, 0.0), None),
        ];
        carry_across(&configs, 0, 1);
    }

    #[test]
    fn handoff_moves_one_cell_per_step_backward_link() {
        let configs = [
            config(IVec2::new(1, 3), Vec3::new(-2.0, 0.0, 0.0), None),
            config(IVec2::new(1, 2), Vec3::ZERO, Some(0)),
        ];
        carry_across(&configs, 1, 0);
    }

    #[test]
    fn halt_stops_all_lanes() {
        let configs = [
            config(IVec2::new(1, 2), Vec3::ZERO, Some(1)),
            config(IVec2::new(1, 2), Vec3::new(-2.0, 0.0, 0.0), None),
        ];
        let mut conveyor = Conveyor::new(&configs).unwrap();
        conveyor.halt();
        assert!(conveyor
            .lanes()
            .iter()
            .all(|lane| !lane.spawning_enabled() && !lane.movement_enabled()));
        assert!(conveyor.tick(1.0).is_empty());
        assert!(conveyor.lane(2).is_err());
        assert_eq!(conveyor.downstream_of(0).unwrap(), Some(1));
    }
}
