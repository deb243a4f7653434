//! Per-element position tokens, one per list the element belongs to.

use smallvec::SmallVec;

use crate::{Finger, ListId};

/// Nodes normally sit in exactly two lists: their cell bucket and the
/// flat registry.
const INLINE_TOKENS: usize = 2;

/// Small map from list identity to the element's finger in that list.
///
/// Lookups are a linear scan; the set rarely holds more than two entries.
/// A finger stored here may be stale (its slot was recycled). Lists detect
/// that through the generation and treat the element as absent.
#[derive(Clone, Debug, Default)]
pub struct TokenSet {
    fingers: SmallVec<[Finger; INLINE_TOKENS]>,
}

impl TokenSet {
    /// Create an empty token set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finger recorded for `list`, if any.
    #[must_use]
    pub fn get(&self, list: ListId) -> Option<Finger> {
        self.fingers.iter().copied().find(|f| f.list() == list)
    }

    /// Record `finger`, replacing any older finger for the same list.
    pub(crate) fn set(&mut self, finger: Finger) {
        match self.fingers.iter_mut().find(|f| f.list() == finger.list()) {
            Some(slot) => *slot = finger,
            None => self.fingers.push(finger),
        }
    }

    /// Forget the finger for `list`.
    pub(crate) fn take(&mut self, list: ListId) -> Option<Finger> {
        let pos = self.fingers.iter().position(|f| f.list() == list)?;
        Some(self.fingers.swap_remove(pos))
    }

    /// Number of recorded fingers (live, retained or stale).
    #[must_use]
    pub fn len(&self) -> usize {
        self.fingers.len()
    }

    /// Check if no fingers are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fingers.is_empty()
    }

    /// Whether the fingers still fit the inline storage.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        !self.fingers.spilled()
    }

    /// Iterate over recorded fingers.
    pub fn iter(&self) -> impl Iterator<Item = Finger> + '_ {
        self.fingers.iter().copied()
    }
}
