//! Uniform grid over the deployment volume with O(1) membership churn.
//!
//! ```text
//!   cells (dense, x fastest)                 registry (insertion order)
//!  ┌──────┬──────┬──────┐
//!  │ 3, 9 │      │  4   │                    3 ⇄ 9 ⇄ 4 ⇄ 1 ⇄ 7
//!  ├──────┼──────┼──────┤
//!  │      │ 1, 7 │      │      records: node → (cell coord, tokens)
//!  └──────┴──────┴──────┘
//! ```
//!
//! Every held node sits in exactly one cell list and in the registry. Its
//! record remembers which cell that is, so `remove` never has to look at
//! the (possibly already changed) position.

use std::fmt;

use hashbrown::HashMap;
use netsim_list::{ListError, ListId, RecyclableList, TokenSet};
use rand::Rng;
use rustc_hash::FxBuildHasher;
use tracing::{debug, error, trace};

use crate::neighbors::{NeighborCursor, PossibleNeighbors};
use crate::{
    CellCoord, ConfigError, GridConfig, GridDims, GridError, GridResult, GridShape, Locatable,
    NodeId, Position,
};

#[derive(Debug, Default)]
struct NodeRecord {
    /// `Some` while the grid holds the node.
    cell: Option<CellCoord>,
    /// Last cell left while `keep_cell_tokens` is on; its slot is retained.
    parked: Option<CellCoord>,
    tokens: TokenSet,
}

/// Spatial index answering "which nodes could be in range of this one".
pub struct GridIndex {
    shape: GridShape,
    cells: Vec<RecyclableList<NodeId>>,
    keep_cell_tokens: bool,
    registry: RecyclableList<NodeId>,
    records: HashMap<NodeId, NodeRecord, FxBuildHasher>,
    /// Bumped whenever registry membership changes.
    revision: u64,
}

/// Log and wrap a list failure that means the index is corrupt.
fn desync(node: NodeId, cell: CellCoord, source: ListError) -> GridError {
    error!(%node, ?cell, %source, "spatial index out of sync");
    GridError::Desynchronized { node, cell, source }
}

/// Make `left` the node's only retained cell slot.
///
/// Keeps a node's token set at registry, current cell and one parked cell
/// however far it travels.
fn park(
    cells: &mut [RecyclableList<NodeId>],
    dims: GridDims,
    record: &mut NodeRecord,
    left: CellCoord,
) {
    if let Some(previous) = record.parked.replace(left) {
        if previous != left {
            cells[dims.index_of(previous)].release(&mut record.tokens);
        }
    }
}

impl GridIndex {
    /// Build the grid, pre-allocating every cell.
    pub fn new(config: &GridConfig) -> Result<Self, ConfigError> {
        let shape = config.validate()?;
        let count = shape.dims.cell_count();

        let cells: Vec<RecyclableList<NodeId>> = (0..count)
            .map(|_| RecyclableList::new(config.keep_cell_tokens))
            .collect();

        debug!(
            dims = ?shape.dims,
            cell_side = shape.cell_side,
            keep_cell_tokens = config.keep_cell_tokens,
            "built spatial grid"
        );

        Ok(Self {
            shape,
            cells,
            keep_cell_tokens: config.keep_cell_tokens,
            registry: RecyclableList::new(true),
            records: HashMap::default(),
            revision: 0,
        })
    }

    #[must_use]
    pub const fn shape(&self) -> &GridShape {
        &self.shape
    }

    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.shape.dims
    }

    /// Side of a cell, equal to the maximum connectivity range.
    #[must_use]
    pub const fn cell_side(&self) -> f64 {
        self.shape.cell_side
    }

    #[must_use]
    pub const fn is_planar(&self) -> bool {
        self.shape.planar
    }

    /// Number of held nodes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Changes whenever a node is inserted or removed.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) const fn registry_id(&self) -> ListId {
        self.registry.id()
    }

    /// Cell containing `position`.
    ///
    /// Positions exactly on the far boundary belong to the last cell; planar
    /// grids ignore `z`.
    pub fn cell_at(&self, position: &Position) -> Option<CellCoord> {
        let axes = if self.shape.planar { 2 } else { 3 };
        let mut coord = [0_u32; 3];
        for (axis, slot) in coord.iter_mut().enumerate().take(axes) {
            let value = position.axis(axis);
            let extent = self.shape.extent[axis];
            if !(value.is_finite() && (0.0..=extent).contains(&value)) {
                return None;
            }
            let cell = (value / self.shape.cell_side).floor() as u32;
            *slot = cell.min(self.shape.dims.axis(axis) - 1);
        }
        Some(CellCoord::new(coord[0], coord[1], coord[2]))
    }

    pub(crate) fn coord_of(&self, node: &impl Locatable) -> GridResult<CellCoord> {
        let position = node.position();
        self.cell_at(&position).ok_or(GridError::OutOfBounds {
            node: node.node_id(),
            position,
        })
    }

    /// Start indexing `node` at its current position.
    pub fn insert(&mut self, node: &impl Locatable) -> GridResult<CellCoord> {
        let id = node.node_id();
        let coord = self.coord_of(node)?;
        let index = self.shape.dims.index_of(coord);

        let record = self.records.entry(id).or_default();
        if record.cell.is_some() {
            return Err(GridError::AlreadyHeld(id));
        }

        self.cells[index]
            .append(id, &mut record.tokens)
            .map_err(|e| desync(id, coord, e))?;
        self.registry
            .append(id, &mut record.tokens)
            .map_err(|e| desync(id, coord, e))?;

        if record.parked == Some(coord) {
            record.parked = None;
        }
        record.cell = Some(coord);
        self.revision += 1;
        Ok(coord)
    }

    /// Stop indexing `id`, using the cell recorded at the last insert/update.
    pub fn remove(&mut self, id: NodeId) -> GridResult<CellCoord> {
        let record = self.records.get_mut(&id).ok_or(GridError::NotHeld(id))?;
        let coord = record.cell.ok_or(GridError::NotHeld(id))?;
        let index = self.shape.dims.index_of(coord);

        self.cells[index]
            .remove(&mut record.tokens)
            .map_err(|e| desync(id, coord, e))?;
        self.registry
            .remove(&mut record.tokens)
            .map_err(|e| desync(id, coord, e))?;

        if self.keep_cell_tokens {
            park(&mut self.cells, self.shape.dims, record, coord);
        }
        record.cell = None;
        self.revision += 1;
        Ok(coord)
    }

    /// Re-file `node` after it moved. Returns whether it changed cell.
    pub fn update(&mut self, node: &impl Locatable) -> GridResult<bool> {
        let id = node.node_id();
        let coord = self.coord_of(node)?;

        let record = self.records.get_mut(&id).ok_or(GridError::NotHeld(id))?;
        let old = record.cell.ok_or(GridError::NotHeld(id))?;
        if old == coord {
            return Ok(false);
        }

        let dims = self.shape.dims;
        self.cells[dims.index_of(old)]
            .remove(&mut record.tokens)
            .map_err(|e| desync(id, old, e))?;
        self.cells[dims.index_of(coord)]
            .append(id, &mut record.tokens)
            .map_err(|e| desync(id, coord, e))?;

        if self.keep_cell_tokens {
            if record.parked == Some(coord) {
                record.parked = None;
            }
            park(&mut self.cells, dims, record, old);
        }
        record.cell = Some(coord);
        trace!(node = %id, from = ?old, to = ?coord, "node changed cell");
        Ok(true)
    }

    /// Drop all bookkeeping for a removed node that will not come back.
    ///
    /// Gives slots retained for the node back to the registry and, with
    /// `keep_cell_tokens`, to the cell it left last.
    pub fn purge(&mut self, id: NodeId) -> GridResult<()> {
        let Some(record) = self.records.get(&id) else {
            return Ok(());
        };
        if record.cell.is_some() {
            return Err(GridError::AlreadyHeld(id));
        }
        let Some(mut record) = self.records.remove(&id) else {
            return Ok(());
        };

        self.registry.release(&mut record.tokens);
        if let Some(parked) = record.parked {
            self.cells[self.shape.dims.index_of(parked)].release(&mut record.tokens);
        }
        Ok(())
    }

    /// Whether the grid currently holds `id`.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.cell_of(id).is_some()
    }

    /// Cell recorded for `id`, if held.
    #[must_use]
    pub fn cell_of(&self, id: NodeId) -> Option<CellCoord> {
        self.records.get(&id).and_then(|r| r.cell)
    }

    pub(crate) fn cell_list(&self, coord: CellCoord) -> &RecyclableList<NodeId> {
        &self.cells[self.shape.dims.index_of(coord)]
    }

    /// Nodes filed under `coord`, or `None` if the cell is out of bounds.
    pub fn cell_members(&self, coord: CellCoord) -> Option<impl Iterator<Item = NodeId> + '_> {
        self.shape
            .dims
            .contains(coord)
            .then(|| self.cell_list(coord).iter().copied())
    }

    /// Every held node, in insertion order.
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.registry.iter().copied()
    }

    /// Uniformly random held node.
    pub fn random_node<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<NodeId> {
        self.registry.random(rng).copied()
    }

    /// Candidate neighbours of `node`: everything in its cell and the
    /// in-bounds cells around it, `node` itself included.
    pub fn possible_neighbors(&self, node: &impl Locatable) -> GridResult<PossibleNeighbors<'_>> {
        let mut cursor = NeighborCursor::new();
        cursor.reset_for_node(self, node)?;
        Ok(PossibleNeighbors::new(cursor, self))
    }

    /// Verify that registry, cells and records agree.
    ///
    /// Walks the whole index, so this is for tests and periodic audits.
    pub fn check_invariants(&self) -> GridResult<()> {
        // Every cell member points back at that cell.
        for (index, cell) in self.cells.iter().enumerate() {
            let coord = self.shape.dims.coord_of(index);
            for &id in cell {
                let record = self.records.get(&id).ok_or(GridError::NotHeld(id))?;
                if record.cell != Some(coord) {
                    return Err(desync(id, coord, ListError::NotAMember(cell.id())));
                }
            }
        }

        // Every held node is linked in its cell and in the registry.
        for (&id, record) in &self.records {
            let Some(coord) = record.cell else { continue };
            let cell = self.cell_list(coord);
            if !cell.contains(&record.tokens) {
                return Err(desync(id, coord, ListError::NotAMember(cell.id())));
            }
            if !self.registry.contains(&record.tokens) {
                return Err(desync(id, coord, ListError::NotAMember(self.registry.id())));
            }
        }

        // And nothing else is in the registry.
        for id in self.nodes() {
            if !self.contains(id) {
                return Err(GridError::NotHeld(id));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for GridIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridIndex")
            .field("dims", &self.shape.dims)
            .field("cell_side", &self.shape.cell_side)
            .field("nodes", &self.registry.len())
            .field("revision", &self.revision)
            .finish()
    }
}
