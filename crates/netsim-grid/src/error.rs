//! Grid error types.

use netsim_list::ListError;
use thiserror::Error;

use crate::{CellCoord, GridDims, NodeId, Position};

/// Invalid construction parameters. The grid is not built.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// No cell side (maximum connectivity range) was given.
    #[error("cell side (maximum connectivity range) is not set")]
    MissingCellSide,

    /// Cell side is zero, negative or not finite.
    #[error("cell side must be positive and finite, got {0}")]
    InvalidCellSide(f64),

    /// A deployment extent is zero, negative or not finite.
    #[error("extent along {axis} must be positive and finite, got {value}")]
    InvalidExtent { axis: char, value: f64 },

    /// The extents and cell side describe more cells than can be indexed.
    #[error("grid of {cells} cells is too large to pre-allocate")]
    TooManyCells { cells: f64 },
}

/// More coordinates offered to a position buffer than it has slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("position buffer is full ({capacity} slots)")]
pub struct CapacityError {
    pub capacity: usize,
}

/// Index corruption and caller contract violations.
///
/// None of these are recoverable: the index no longer agrees with the
/// simulation, and continuing would hand out wrong candidate sets.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// `insert` of a node the grid already holds.
    #[error("node {0} is already held by the grid")]
    AlreadyHeld(NodeId),

    /// `remove`/`update` of a node the grid does not hold.
    #[error("node {0} is not held by the grid")]
    NotHeld(NodeId),

    /// The node's record and the cell or registry lists disagree.
    #[error("node {node} is out of sync with cell {cell:?}: {source}")]
    Desynchronized {
        node: NodeId,
        cell: CellCoord,
        #[source]
        source: ListError,
    },

    /// Position outside the deployment volume (or not finite).
    #[error("node {node} at {position:?} lies outside the deployment area")]
    OutOfBounds { node: NodeId, position: Position },

    /// A cell coordinate outside the grid's dimensions.
    #[error("cell {cell:?} lies outside a grid of {dims:?}")]
    CellOutOfBounds { cell: CellCoord, dims: GridDims },

    /// The caller's node lookup has no position for a node the grid holds.
    #[error("no position known for node {0}")]
    MissingPosition(NodeId),

    /// The neighbour-cell scratch buffer overflowed.
    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;
