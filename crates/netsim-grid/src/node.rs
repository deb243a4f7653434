//! Node identity and position.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a simulated node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Get the raw identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position in the deployment volume. Planar deployments leave `z` at 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Create a new position
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Position in the `z = 0` plane.
    #[must_use]
    pub const fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Component by axis (0 = x, 1 = y, anything else = z).
    #[must_use]
    pub const fn axis(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

/// Something the grid can index: an identity plus a current position.
///
/// The grid reads the position on `insert`, `update` and neighbour queries;
/// it never notices position changes on its own.
pub trait Locatable {
    fn node_id(&self) -> NodeId;
    fn position(&self) -> Position;
}

impl<L: Locatable + ?Sized> Locatable for &L {
    fn node_id(&self) -> NodeId {
        (**self).node_id()
    }

    fn position(&self) -> Position {
        (**self).position()
    }
}

/// Minimal node: an id and a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimNode {
    pub id: NodeId,
    pub position: Position,
}

impl SimNode {
    #[must_use]
    pub const fn new(id: NodeId, position: Position) -> Self {
        Self { id, position }
    }

    /// Move the node. The grid must be told with `update` afterwards.
    pub fn move_to(&mut self, position: Position) {
        self.position = position;
    }
}

impl Locatable for SimNode {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn position(&self) -> Position {
        self.position
    }
}
