//! Candidate-neighbour enumeration over the 3×3(×3) cell neighbourhood.
//!
//! ```text
//!   dz = -1          dz = 0           dz = +1
//! ┌───┬───┬───┐    ┌───┬───┬───┐    ┌───┬───┬───┐
//! │ 0 │ 1 │ 2 │    │ 9 │10 │11 │    │18 │19 │20 │
//! ├───┼───┼───┤    ├───┼───┼───┤    ├───┼───┼───┤
//! │ 3 │ 4 │ 5 │    │12 │13 │14 │    │21 │22 │23 │
//! ├───┼───┼───┤    ├───┼───┼───┤    ├───┼───┼───┤
//! │ 6 │ 7 │ 8 │    │15 │16 │17 │    │24 │25 │26 │
//! └───┴───┴───┘    └───┴───┴───┘    └───┴───┴───┘
//! ```
//!
//! Bit 13 is the centre cell. Bits that would leave the grid are cleared by
//! [`GridDims::boundary_mask`]; each surviving layer fills one
//! [`PositionBuffer`].

use std::borrow::BorrowMut;
use std::iter::FusedIterator;

use netsim_list::Iter;

use crate::{
    CellCoord, GridDims, GridError, GridIndex, GridResult, Locatable, NeighborMask, NodeId,
    PositionBuffer,
};

/// Reusable neighbourhood state for one centre cell at a time.
///
/// Owned by the caller and re-targeted with [`NeighborCursor::reset_for_node`],
/// so a round over every node allocates nothing.
#[derive(Debug, Clone, Default)]
pub struct NeighborCursor {
    center: Option<CellCoord>,
    dims: Option<GridDims>,
    mask: NeighborMask,
    layers: [PositionBuffer; 3],
    layer_count: usize,
    layer: usize,
    slot: usize,
}

impl NeighborCursor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Aim the cursor at the cell holding `node`'s current position.
    pub fn reset_for_node(&mut self, grid: &GridIndex, node: &impl Locatable) -> GridResult<()> {
        let coord = grid.coord_of(node)?;
        self.reset_for_cell(grid.dims(), coord)
    }

    /// Aim the cursor at `coord` in a grid of `dims`.
    ///
    /// A coordinate outside `dims` leaves the cursor empty.
    pub fn reset_for_cell(&mut self, dims: GridDims, coord: CellCoord) -> GridResult<()> {
        self.center = None;
        self.layer_count = 0;
        self.rewind();
        if !dims.contains(coord) {
            return Err(GridError::CellOutOfBounds { cell: coord, dims });
        }

        let mask = dims.boundary_mask(coord);
        for dz in -1..=1 {
            let bits = mask.layer(dz);
            if bits == 0 {
                continue;
            }
            let buffer = &mut self.layers[self.layer_count];
            buffer.clear();
            for bit in 0..9 {
                if bits & (1 << bit) != 0 {
                    let (dx, dy) = NeighborMask::layer_offset(bit);
                    buffer.add(coord.offset(dx, dy, dz))?;
                }
            }
            self.layer_count += 1;
        }

        self.center = Some(coord);
        self.dims = Some(dims);
        self.mask = mask;
        Ok(())
    }

    /// Centre cell of the last successful reset.
    #[must_use]
    pub const fn center(&self) -> Option<CellCoord> {
        self.center
    }

    #[must_use]
    pub const fn mask(&self) -> NeighborMask {
        self.mask
    }

    /// In-bounds cells of the neighbourhood, layer by layer.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.layers[..self.layer_count]
            .iter()
            .flat_map(|layer| layer.elements())
    }

    /// Walk the nodes of every cell in the neighbourhood from the start.
    ///
    /// The grid stays borrowed until the traversal is dropped, so it cannot
    /// be mutated mid-walk.
    pub fn candidates<'g>(&'g mut self, grid: &'g GridIndex) -> Candidates<'g, &'g mut Self> {
        Candidates::new(self, grid)
    }

    fn rewind(&mut self) {
        self.layer = 0;
        self.slot = 0;
    }

    fn next_cell(&mut self) -> Option<CellCoord> {
        while self.layer < self.layer_count {
            if let Some(coord) = self.layers[self.layer].get(self.slot) {
                self.slot += 1;
                return Some(coord);
            }
            self.layer += 1;
            self.slot = 0;
        }
        None
    }
}

/// Candidate neighbours, flattened across the cursor's cells.
///
/// Empty cells are skipped. A cursor that was reset against a grid of other
/// dimensions yields nothing.
pub struct Candidates<'g, C: BorrowMut<NeighborCursor>> {
    grid: &'g GridIndex,
    cursor: C,
    members: Option<Iter<'g, NodeId>>,
}

/// Candidates that own their cursor, as returned by
/// [`GridIndex::possible_neighbors`].
pub type PossibleNeighbors<'g> = Candidates<'g, NeighborCursor>;

impl<'g, C: BorrowMut<NeighborCursor>> Candidates<'g, C> {
    pub(crate) fn new(mut cursor: C, grid: &'g GridIndex) -> Self {
        let state = cursor.borrow_mut();
        state.rewind();
        if state.dims != Some(grid.dims()) {
            state.layer = state.layer_count;
        }
        Self {
            grid,
            cursor,
            members: None,
        }
    }

    pub fn cursor(&self) -> &NeighborCursor {
        self.cursor.borrow()
    }
}

impl<C: BorrowMut<NeighborCursor>> Iterator for Candidates<'_, C> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            if let Some(&id) = self.members.as_mut().and_then(Iterator::next) {
                return Some(id);
            }
            let coord = self.cursor.borrow_mut().next_cell()?;
            let cell = self.grid.cell_list(coord);
            self.members = (!cell.is_empty()).then(|| cell.iter());
        }
    }
}

impl<C: BorrowMut<NeighborCursor>> FusedIterator for Candidates<'_, C> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GridConfig, Position, SimNode};

    fn node(id: u32, x: f64, y: f64) -> SimNode {
        SimNode::new(NodeId(id), Position::planar(x, y))
    }

    fn sorted(ids: impl Iterator<Item = NodeId>) -> Vec<u32> {
        let mut ids: Vec<u32> = ids.map(NodeId::get).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_interior_and_corner_cells() {
        let dims = GridDims::new(10, 10, 1);
        let mut cursor = NeighborCursor::new();

        cursor.reset_for_cell(dims, CellCoord::planar(4, 4)).unwrap();
        assert_eq!(cursor.cells().count(), 9);
        assert!(cursor.cells().all(|c| c.z == 0));

        cursor.reset_for_cell(dims, CellCoord::planar(0, 0)).unwrap();
        let cells: Vec<CellCoord> = cursor.cells().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::planar(0, 0),
                CellCoord::planar(1, 0),
                CellCoord::planar(0, 1),
                CellCoord::planar(1, 1),
            ]
        );
        assert_eq!(cursor.center(), Some(CellCoord::planar(0, 0)));
    }

    #[test]
    fn test_volumetric_neighbourhood() {
        let dims = GridDims::new(4, 4, 4);
        let mut cursor = NeighborCursor::new();

        cursor.reset_for_cell(dims, CellCoord::new(1, 1, 1)).unwrap();
        assert_eq!(cursor.cells().count(), 27);

        cursor.reset_for_cell(dims, CellCoord::new(3, 0, 3)).unwrap();
        assert_eq!(cursor.cells().count(), 8);
        assert!(cursor.cells().all(|c| dims.contains(c)));
    }

    #[test]
    fn test_candidates_cover_adjacent_cells_only() {
        let mut grid = GridIndex::new(&GridConfig::planar(100.0, 100.0).with_cell_side(10.0)).unwrap();
        let a = node(1, 15.0, 15.0);
        grid.insert(&a).unwrap();
        grid.insert(&node(2, 25.0, 25.0)).unwrap();
        grid.insert(&node(3, 5.0, 15.0)).unwrap();
        grid.insert(&node(4, 35.0, 15.0)).unwrap();
        grid.insert(&node(5, 15.0, 95.0)).unwrap();

        let mut cursor = NeighborCursor::new();
        cursor.reset_for_node(&grid, &a).unwrap();
        assert_eq!(sorted(cursor.candidates(&grid)), vec![1, 2, 3]);

        // A second walk starts from the beginning again.
        assert_eq!(cursor.candidates(&grid).count(), 3);
    }

    #[test]
    fn test_cursor_reuse_across_nodes() {
        let mut grid = GridIndex::new(&GridConfig::planar(50.0, 50.0).with_cell_side(10.0)).unwrap();
        let a = node(1, 1.0, 1.0);
        let b = node(2, 49.0, 49.0);
        grid.insert(&a).unwrap();
        grid.insert(&b).unwrap();

        let mut cursor = NeighborCursor::new();
        cursor.reset_for_node(&grid, &a).unwrap();
        assert_eq!(sorted(cursor.candidates(&grid)), vec![1]);
        cursor.reset_for_node(&grid, &b).unwrap();
        assert_eq!(sorted(cursor.candidates(&grid)), vec![2]);
    }

    #[test]
    fn test_fresh_cursor_yields_nothing() {
        let grid = GridIndex::new(&GridConfig::planar(10.0, 10.0).with_cell_side(5.0)).unwrap();
        let mut cursor = NeighborCursor::new();
        assert_eq!(cursor.candidates(&grid).next(), None);
    }

    #[test]
    fn test_cursor_from_other_grid_yields_nothing() {
        let mut small = GridIndex::new(&GridConfig::planar(20.0, 20.0).with_cell_side(10.0)).unwrap();
        let big = GridIndex::new(&GridConfig::planar(90.0, 90.0).with_cell_side(10.0)).unwrap();
        small.insert(&node(1, 5.0, 5.0)).unwrap();

        let mut cursor = NeighborCursor::new();
        cursor.reset_for_cell(big.dims(), CellCoord::planar(0, 0)).unwrap();
        assert_eq!(cursor.candidates(&small).count(), 0);
    }

    #[test]
    fn test_reset_for_cell_outside_grid_is_rejected() {
        let mut grid = GridIndex::new(&GridConfig::planar(100.0, 100.0).with_cell_side(10.0)).unwrap();
        grid.insert(&node(7, 5.0, 15.0)).unwrap();

        let mut cursor = NeighborCursor::new();
        cursor.reset_for_cell(grid.dims(), CellCoord::planar(1, 1)).unwrap();
        assert_eq!(sorted(cursor.candidates(&grid)), vec![7]);

        // x == width would alias onto the next row.
        assert_eq!(
            cursor.reset_for_cell(grid.dims(), CellCoord::planar(10, 0)),
            Err(GridError::CellOutOfBounds {
                cell: CellCoord::planar(10, 0),
                dims: grid.dims(),
            })
        );
        assert_eq!(cursor.center(), None);
        assert_eq!(cursor.cells().count(), 0);
        assert_eq!(cursor.candidates(&grid).count(), 0);

        assert!(cursor.reset_for_cell(grid.dims(), CellCoord::planar(11, 0)).is_err());
        assert!(cursor.reset_for_cell(grid.dims(), CellCoord::new(0, 0, 1)).is_err());
        assert_eq!(cursor.candidates(&grid).count(), 0);
    }

    #[test]
    fn test_reset_out_of_bounds_node() {
        let grid = GridIndex::new(&GridConfig::planar(10.0, 10.0).with_cell_side(5.0)).unwrap();
        let mut cursor = NeighborCursor::new();
        assert!(cursor.reset_for_node(&grid, &node(9, 11.0, 1.0)).is_err());
    }
}
