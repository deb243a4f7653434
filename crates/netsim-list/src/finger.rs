//! Position tokens ("fingers") with generational slot handles.
//!
//! A finger names one slot in one list's arena. Slots are recycled through a
//! free chain, and every time a slot goes back to the free chain its
//! generation is bumped so that fingers handed out earlier stop resolving.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Generation counter to detect stale fingers.
/// Incremented each time a slot is returned to the free chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Generation(u32);

impl Generation {
    /// Create a new generation (starts at 0).
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Increment the generation counter.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Get the raw generation value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Raw slot index into a list's arena.
pub type SlotIndex = u32;

static NEXT_LIST_ID: AtomicU32 = AtomicU32::new(0);

/// Identity of one list, unique for the lifetime of the process.
///
/// Token sets are keyed by this, which is what lets a single element carry
/// fingers for several lists at once.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId(u32);

impl ListId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw list identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Handle to an element's slot within one specific list.
///
/// Carries the owning list, so a finger presented to the wrong list is
/// rejected instead of silently addressing an unrelated slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Finger {
    list: ListId,
    index: SlotIndex,
    generation: Generation,
}

impl Finger {
    pub(crate) const fn new(list: ListId, index: SlotIndex, generation: Generation) -> Self {
        Self {
            list,
            index,
            generation,
        }
    }

    /// The list this finger points into.
    #[must_use]
    pub const fn list(self) -> ListId {
        self.list
    }

    /// The slot index within that list.
    #[must_use]
    pub const fn index(self) -> SlotIndex {
        self.index
    }

    /// The generation of the slot when the finger was issued.
    #[must_use]
    pub const fn generation(self) -> Generation {
        self.generation
    }
}

impl fmt::Debug for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Finger({:?}#{}v{})",
            self.list, self.index, self.generation.0
        )
    }
}
