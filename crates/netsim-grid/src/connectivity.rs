//! Link evaluation on top of the candidate sets.

use std::ops::AddAssign;

use crate::{
    GridError, GridIndex, GridResult, Locatable, NeighborCursor, NodeId, Position, SimNode,
};

/// Decides whether two positions are close enough to communicate.
///
/// The grid only guarantees that nodes within `cell_side` of each other are
/// candidates, so a model must never report links longer than that.
pub trait ConnectivityModel {
    fn is_within_range(&self, a: &Position, b: &Position) -> bool;
}

impl<F> ConnectivityModel for F
where
    F: Fn(&Position, &Position) -> bool,
{
    fn is_within_range(&self, a: &Position, b: &Position) -> bool {
        self(a, b)
    }
}

/// Links every pair at most `range` apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitDiskGraph {
    pub range: f64,
}

impl UnitDiskGraph {
    #[must_use]
    pub const fn new(range: f64) -> Self {
        Self { range }
    }
}

impl ConnectivityModel for UnitDiskGraph {
    fn is_within_range(&self, a: &Position, b: &Position) -> bool {
        a.distance_squared(b) <= self.range * self.range
    }
}

/// How much work a link evaluation did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Candidate pairs handed to the model, self pairs excluded.
    pub candidates: usize,
    /// Pairs the model accepted.
    pub links: usize,
}

impl AddAssign for LinkStats {
    fn add_assign(&mut self, rhs: Self) {
        self.candidates += rhs.candidates;
        self.links += rhs.links;
    }
}

/// Evaluates a [`ConnectivityModel`] over grid candidates with one reused
/// [`NeighborCursor`].
#[derive(Debug)]
pub struct Links<M> {
    model: M,
    cursor: NeighborCursor,
}

impl<M: ConnectivityModel> Links<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            cursor: NeighborCursor::new(),
        }
    }

    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Call `visit` for every node linked to `node`.
    ///
    /// `position_of` resolves candidate ids to their current positions.
    pub fn for_each_neighbor<P>(
        &mut self,
        grid: &GridIndex,
        node: &impl Locatable,
        mut position_of: P,
        mut visit: impl FnMut(NodeId),
    ) -> GridResult<LinkStats>
    where
        P: FnMut(NodeId) -> Option<Position>,
    {
        let (id, origin) = (node.node_id(), node.position());
        self.cursor.reset_for_node(grid, node)?;
        let mut stats = LinkStats::default();
        for other in self.cursor.candidates(grid) {
            if other == id {
                continue;
            }
            let position = position_of(other).ok_or(GridError::MissingPosition(other))?;
            stats.candidates += 1;
            if self.model.is_within_range(&origin, &position) {
                stats.links += 1;
                visit(other);
            }
        }
        Ok(stats)
    }

    /// Call `visit(a, b)` once per linked pair, with `a < b`.
    pub fn for_each_link<P>(
        &mut self,
        grid: &GridIndex,
        mut position_of: P,
        mut visit: impl FnMut(NodeId, NodeId),
    ) -> GridResult<LinkStats>
    where
        P: FnMut(NodeId) -> Option<Position>,
    {
        let mut total = LinkStats::default();
        for id in grid.nodes() {
            let position = position_of(id).ok_or(GridError::MissingPosition(id))?;
            let node = SimNode::new(id, position);
            self.cursor.reset_for_node(grid, &node)?;

            for other in self.cursor.candidates(grid) {
                if other <= id {
                    continue;
                }
                let other_position =
                    position_of(other).ok_or(GridError::MissingPosition(other))?;
                total.candidates += 1;
                if self.model.is_within_range(&position, &other_position) {
                    total.links += 1;
                    visit(id, other);
                }
            }
        }
        Ok(total)
    }
}
