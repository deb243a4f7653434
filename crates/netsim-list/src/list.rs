//! Doubly linked list over a slot arena with O(1) removal of known elements.
//!
//! ```text
//!            head                          tail
//!             │                              │
//!  slots: [ A ⇄ C ⇄ B ]   free chain: 3 → 5 → ∅   retained: 4 (reserved for D)
//! ```
//!
//! Elements do not carry links themselves. Each element owns a [`TokenSet`]
//! holding one [`Finger`] per list it belongs to; the finger addresses the
//! element's slot, so removing a known element is pointer surgery on the
//! arena rather than a search.
//!
//! With `keep_tokens` enabled, removing an element parks its slot as
//! *retained* instead of returning it to the free chain. The next insertion
//! of the same element into the same list reuses that slot and finger
//! unchanged, which keeps hot leave/re-enter cycles free of any bookkeeping
//! beyond relinking.

use std::fmt;

use rand::Rng;

use crate::{Finger, Generation, ListError, ListId, ListResult, SlotIndex, TokenSet};

/// Probes of the arena before `random` falls back to walking the list.
const RANDOM_PROBES: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    Linked,
    Retained,
    Vacant,
}

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    prev: Option<SlotIndex>,
    /// Successor while linked, next free slot while vacant.
    next: Option<SlotIndex>,
    generation: Generation,
    state: SlotState,
}

/// An ordered list whose elements are addressed through per-element fingers.
pub struct RecyclableList<T> {
    id: ListId,
    slots: Vec<Slot<T>>,
    head: Option<SlotIndex>,
    tail: Option<SlotIndex>,
    free_head: Option<SlotIndex>,
    len: usize,
    retained: usize,
    keep_tokens: bool,
    /// Bumped on every structural change; cursors compare against it.
    modifications: u64,
}

impl<T> RecyclableList<T> {
    /// Create an empty list with the given token recycling policy.
    #[must_use]
    pub fn new(keep_tokens: bool) -> Self {
        Self::with_capacity(0, keep_tokens)
    }

    /// Create an empty list with room for `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize, keep_tokens: bool) -> Self {
        Self {
            id: ListId::fresh(),
            slots: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free_head: None,
            len: 0,
            retained: 0,
            keep_tokens,
            modifications: 0,
        }
    }

    /// This list's identity.
    #[must_use]
    pub const fn id(&self) -> ListId {
        self.id
    }

    /// Whether removed elements keep their slot reserved.
    #[must_use]
    pub const fn keeps_tokens(&self) -> bool {
        self.keep_tokens
    }

    /// Number of elements in the list.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the list is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of arena slots ever allocated (linked, retained or free).
    #[must_use]
    pub fn slot_capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots parked for elements that were removed under
    /// `keep_tokens`.
    #[must_use]
    pub const fn retained(&self) -> usize {
        self.retained
    }

    pub(crate) const fn modifications(&self) -> u64 {
        self.modifications
    }

    pub(crate) const fn head(&self) -> Option<SlotIndex> {
        self.head
    }

    pub(crate) const fn tail(&self) -> Option<SlotIndex> {
        self.tail
    }

    pub(crate) fn next_of(&self, idx: SlotIndex) -> Option<SlotIndex> {
        self.slots[idx as usize].next
    }

    pub(crate) fn prev_of(&self, idx: SlotIndex) -> Option<SlotIndex> {
        self.slots[idx as usize].prev
    }

    pub(crate) fn value_at(&self, idx: SlotIndex) -> Option<&T> {
        self.slots[idx as usize].value.as_ref()
    }

    /// Slot addressed by `finger` if the finger belongs here and is not stale.
    fn resolve(&self, finger: Finger) -> Option<SlotIndex> {
        let slot = self.slots.get(finger.index() as usize)?;
        (finger.list() == self.id && slot.generation == finger.generation())
            .then_some(finger.index())
    }

    fn linked_index(&self, finger: Finger) -> Option<SlotIndex> {
        self.resolve(finger)
            .filter(|&idx| self.slots[idx as usize].state == SlotState::Linked)
    }

    pub(crate) fn linked_slot(&self, tokens: &TokenSet) -> Option<SlotIndex> {
        tokens.get(self.id).and_then(|f| self.linked_index(f))
    }

    /// Check if the element owning `tokens` is currently in this list.
    #[must_use]
    pub fn contains(&self, tokens: &TokenSet) -> bool {
        self.linked_slot(tokens).is_some()
    }

    /// The element's live finger for this list, if it is a member.
    #[must_use]
    pub fn finger_of(&self, tokens: &TokenSet) -> Option<Finger> {
        tokens
            .get(self.id)
            .filter(|&f| self.linked_index(f).is_some())
    }

    /// Element addressed by a live finger.
    #[must_use]
    pub fn get(&self, finger: Finger) -> Option<&T> {
        let idx = self.linked_index(finger)?;
        self.value_at(idx)
    }

    /// Claim a slot for `value`: the element's retained slot if it has one,
    /// otherwise the head of the free chain, otherwise a fresh slot.
    fn acquire(&mut self, value: T, tokens: &mut TokenSet) -> ListResult<SlotIndex> {
        if let Some(idx) = tokens.get(self.id).and_then(|f| self.resolve(f)) {
            let slot = &mut self.slots[idx as usize];
            match slot.state {
                SlotState::Linked => return Err(ListError::AlreadyMember(self.id)),
                SlotState::Retained => {
                    slot.value = Some(value);
                    slot.state = SlotState::Linked;
                    self.retained -= 1;
                    return Ok(idx);
                }
                // A vacant slot always carries a newer generation than any
                // finger that was issued for it.
                SlotState::Vacant => {}
            }
        }

        let idx = match self.free_head {
            Some(idx) => {
                let slot = &mut self.slots[idx as usize];
                self.free_head = slot.next;
                slot.value = Some(value);
                slot.state = SlotState::Linked;
                idx
            }
            None => {
                let idx = self.slots.len() as SlotIndex;
                self.slots.push(Slot {
                    value: Some(value),
                    prev: None,
                    next: None,
                    generation: Generation::new(),
                    state: SlotState::Linked,
                });
                idx
            }
        };

        let generation = self.slots[idx as usize].generation;
        tokens.set(Finger::new(self.id, idx, generation));
        Ok(idx)
    }

    fn link_between(&mut self, idx: SlotIndex, prev: Option<SlotIndex>, next: Option<SlotIndex>) {
        {
            let slot = &mut self.slots[idx as usize];
            slot.prev = prev;
            slot.next = next;
        }
        match prev {
            Some(p) => self.slots[p as usize].next = Some(idx),
            None => self.head = Some(idx),
        }
        match next {
            Some(n) => self.slots[n as usize].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.len += 1;
        self.modifications += 1;
    }

    fn unlink(&mut self, idx: SlotIndex) {
        let (prev, next) = {
            let slot = &self.slots[idx as usize];
            (slot.prev, slot.next)
        };
        match prev {
            Some(p) => self.slots[p as usize].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n as usize].prev = prev,
            None => self.tail = prev,
        }
        let slot = &mut self.slots[idx as usize];
        slot.prev = None;
        slot.next = None;
        self.len -= 1;
        self.modifications += 1;
    }

    /// Return an unlinked slot to the free chain, invalidating its fingers.
    fn free_slot(&mut self, idx: SlotIndex) -> Option<T> {
        let slot = &mut self.slots[idx as usize];
        let value = slot.value.take();
        slot.generation = slot.generation.next();
        slot.state = SlotState::Vacant;
        slot.prev = None;
        slot.next = self.free_head;
        self.free_head = Some(idx);
        value
    }

    /// Dispose of a slot that was just unlinked, honoring the policy.
    ///
    /// Under `keep_tokens` the element's finger stays valid and points to a
    /// retained slot; otherwise the slot is freed and the finger dropped
    /// from `tokens` (when the caller has them at hand).
    fn vacate(&mut self, idx: SlotIndex, tokens: Option<&mut TokenSet>) -> Option<T> {
        if self.keep_tokens {
            let slot = &mut self.slots[idx as usize];
            slot.state = SlotState::Retained;
            self.retained += 1;
            return slot.value.take();
        }
        if let Some(tokens) = tokens {
            tokens.take(self.id);
        }
        self.free_slot(idx)
    }

    /// Append `value` at the back.
    pub fn append(&mut self, value: T, tokens: &mut TokenSet) -> ListResult<Finger> {
        let idx = self.acquire(value, tokens)?;
        self.link_between(idx, self.tail, None);
        Ok(self.finger_at(idx))
    }

    /// Insert `value` at the front.
    pub fn push_front(&mut self, value: T, tokens: &mut TokenSet) -> ListResult<Finger> {
        let idx = self.acquire(value, tokens)?;
        self.link_between(idx, None, self.head);
        Ok(self.finger_at(idx))
    }

    /// Insert `value` directly before the element addressed by `reference`.
    pub fn insert_before(
        &mut self,
        value: T,
        tokens: &mut TokenSet,
        reference: Finger,
    ) -> ListResult<Finger> {
        let anchor = self.anchor(reference)?;
        let idx = self.acquire(value, tokens)?;
        let prev = self.slots[anchor as usize].prev;
        self.link_between(idx, prev, Some(anchor));
        Ok(self.finger_at(idx))
    }

    /// Insert `value` directly after the element addressed by `reference`.
    pub fn insert_after(
        &mut self,
        value: T,
        tokens: &mut TokenSet,
        reference: Finger,
    ) -> ListResult<Finger> {
        let anchor = self.anchor(reference)?;
        let idx = self.acquire(value, tokens)?;
        let next = self.slots[anchor as usize].next;
        self.link_between(idx, Some(anchor), next);
        Ok(self.finger_at(idx))
    }

    fn anchor(&self, reference: Finger) -> ListResult<SlotIndex> {
        if reference.list() != self.id {
            return Err(ListError::WrongList {
                expected: self.id,
                found: reference.list(),
            });
        }
        self.linked_index(reference)
            .ok_or(ListError::NotAMember(self.id))
    }

    fn finger_at(&self, idx: SlotIndex) -> Finger {
        Finger::new(self.id, idx, self.slots[idx as usize].generation)
    }

    /// Remove the element owning `tokens` and return it.
    pub fn remove(&mut self, tokens: &mut TokenSet) -> ListResult<T> {
        let idx = self
            .linked_slot(tokens)
            .ok_or(ListError::NotAMember(self.id))?;
        self.unlink(idx);
        self.vacate(idx, Some(tokens))
            .ok_or(ListError::NotAMember(self.id))
    }

    /// Give a retained slot back to the free chain.
    ///
    /// Returns `false` if the element has no retained slot in this list.
    pub fn release(&mut self, tokens: &mut TokenSet) -> bool {
        let Some(idx) = tokens.get(self.id).and_then(|f| self.resolve(f)) else {
            return false;
        };
        if self.slots[idx as usize].state != SlotState::Retained {
            return false;
        }
        self.retained -= 1;
        tokens.take(self.id);
        self.free_slot(idx);
        true
    }

    /// First element, if any.
    #[must_use]
    pub fn peek_first(&self) -> Option<&T> {
        self.head.and_then(|idx| self.value_at(idx))
    }

    /// Last element, if any.
    #[must_use]
    pub fn peek_last(&self) -> Option<&T> {
        self.tail.and_then(|idx| self.value_at(idx))
    }

    /// Remove and return the first element.
    ///
    /// The element's token set is not at hand here. Without `keep_tokens`
    /// its finger for this list simply goes stale; with `keep_tokens` it
    /// keeps addressing the now retained slot.
    pub fn pop_first(&mut self) -> Option<T> {
        let idx = self.head?;
        self.unlink(idx);
        self.vacate(idx, None)
    }

    /// Remove every element. All fingers into this list go stale.
    pub fn clear(&mut self) {
        self.head = None;
        self.tail = None;
        self.free_head = None;
        for idx in (0..self.slots.len()).rev() {
            let slot = &mut self.slots[idx];
            if slot.state != SlotState::Vacant {
                slot.generation = slot.generation.next();
                slot.state = SlotState::Vacant;
            }
            slot.value = None;
            slot.prev = None;
            slot.next = self.free_head;
            self.free_head = Some(idx as SlotIndex);
        }
        self.len = 0;
        self.retained = 0;
        self.modifications += 1;
    }

    /// Element at position `k` in list order, walking from the nearer end.
    #[must_use]
    pub fn nth(&self, k: usize) -> Option<&T> {
        if k >= self.len {
            return None;
        }
        if k <= self.len / 2 {
            self.iter().nth(k)
        } else {
            self.iter().rev().nth(self.len - 1 - k)
        }
    }

    /// Uniformly random element.
    ///
    /// Probes random arena slots first (cheap while the arena is dense) and
    /// falls back to walking to a random position.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        for _ in 0..RANDOM_PROBES {
            let idx = rng.gen_range(0..self.slots.len());
            let slot = &self.slots[idx];
            if slot.state == SlotState::Linked {
                return slot.value.as_ref();
            }
        }
        self.nth(rng.gen_range(0..self.len))
    }

    /// Swap the element in a linked slot for a new one, keeping its position.
    ///
    /// The old element's finger is invalidated, the new element gets a finger
    /// for the same slot.
    pub(crate) fn replace_at(
        &mut self,
        idx: SlotIndex,
        value: T,
        old_tokens: &mut TokenSet,
        new_tokens: &mut TokenSet,
    ) -> ListResult<T> {
        if self.contains(new_tokens) {
            return Err(ListError::AlreadyMember(self.id));
        }
        if self.linked_slot(old_tokens) != Some(idx) {
            return Err(ListError::NotAMember(self.id));
        }
        // A retained slot of the incoming element would otherwise leak.
        self.release(new_tokens);

        old_tokens.take(self.id);
        let slot = &mut self.slots[idx as usize];
        slot.generation = slot.generation.next();
        let old = slot.value.replace(value);
        let finger = Finger::new(self.id, idx, slot.generation);
        new_tokens.set(finger);
        old.ok_or(ListError::NotAMember(self.id))
    }

    /// Iterate over elements in list order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }
}

impl<T> fmt::Debug for RecyclableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecyclableList")
            .field("id", &self.id)
            .field("len", &self.len)
            .field("slots", &self.slots.len())
            .field("retained", &self.retained)
            .field("keep_tokens", &self.keep_tokens)
            .finish()
    }
}

/// Borrowing iterator over a [`RecyclableList`].
pub struct Iter<'a, T> {
    list: &'a RecyclableList<T>,
    front: Option<SlotIndex>,
    back: Option<SlotIndex>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.front?;
        self.front = self.list.next_of(idx);
        self.remaining -= 1;
        self.list.value_at(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.back?;
        self.back = self.list.prev_of(idx);
        self.remaining -= 1;
        self.list.value_at(idx)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a RecyclableList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
