//! Fixed-size scratch buffer of cell coordinates.

use crate::{CapacityError, CellCoord};

/// One 3×3 layer of a neighbourhood.
pub const POSITION_SLOTS: usize = 9;

/// Nine `(used, coordinate)` slots, filled in order and cleared in place.
///
/// Holds the in-bounds cells of one neighbourhood layer. Never allocates.
#[derive(Debug, Clone, Copy)]
pub struct PositionBuffer {
    slots: [Option<CellCoord>; POSITION_SLOTS],
    len: usize,
}

impl Default for PositionBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [None; POSITION_SLOTS],
            len: 0,
        }
    }

    /// Append `coord` to the next free slot.
    pub fn add(&mut self, coord: CellCoord) -> Result<(), CapacityError> {
        let slot = self.slots.get_mut(self.len).ok_or(CapacityError {
            capacity: POSITION_SLOTS,
        })?;
        *slot = Some(coord);
        self.len += 1;
        Ok(())
    }

    /// Mark every slot unused. Stale entries are overwritten by later adds.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Coordinate in slot `index`, if that slot is used.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<CellCoord> {
        self.slots[..self.len].get(index).copied().flatten()
    }

    /// Used slots in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.slots[..self.len].iter().flatten().copied()
    }
}
