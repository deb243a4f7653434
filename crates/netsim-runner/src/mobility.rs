//! Random-waypoint movement.

use netsim_grid::{NodeId, Position, SimNode};
use rand::Rng;

/// A node heading for a random waypoint at a fixed speed.
///
/// On arrival it picks a new waypoint and a new speed.
#[derive(Debug, Clone)]
pub struct Walker {
    pub node: SimNode,
    waypoint: Position,
    speed: f64,
}

/// Extent per axis; `0.0` on z keeps walkers in the plane.
pub type Extent = [f64; 3];

fn random_position(extent: Extent, rng: &mut impl Rng) -> Position {
    let mut axis = |max: f64| if max > 0.0 { rng.gen_range(0.0..=max) } else { 0.0 };
    Position::new(axis(extent[0]), axis(extent[1]), axis(extent[2]))
}

impl Walker {
    pub fn spawn(id: NodeId, extent: Extent, max_speed: f64, rng: &mut impl Rng) -> Self {
        let node = SimNode::new(id, random_position(extent, rng));
        let waypoint = random_position(extent, rng);
        Self {
            node,
            waypoint,
            speed: rng.gen_range(max_speed / 10.0..=max_speed),
        }
    }

    /// Advance one round.
    pub fn step(&mut self, extent: Extent, max_speed: f64, rng: &mut impl Rng) {
        let here = self.node.position;
        let remaining = here.distance(&self.waypoint);

        if remaining <= self.speed {
            self.node.move_to(self.waypoint);
            self.waypoint = random_position(extent, rng);
            self.speed = rng.gen_range(max_speed / 10.0..=max_speed);
            return;
        }

        let t = self.speed / remaining;
        let lerp = |from: f64, to: f64, max: f64| (from + (to - from) * t).clamp(0.0, max);
        self.node.move_to(Position::new(
            lerp(here.x, self.waypoint.x, extent[0]),
            lerp(here.y, self.waypoint.y, extent[1]),
            lerp(here.z, self.waypoint.z, extent[2]),
        ));
    }
}
