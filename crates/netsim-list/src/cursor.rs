//! Detached, reusable cursor over a [`RecyclableList`].
//!
//! The cursor does not borrow the list between calls, so it can live in a
//! long-lived struct and be rewound with [`ListCursor::reset`] without
//! allocating. The price is that the list may change behind its back: every
//! call compares the list's modification counter with the one recorded at
//! the cursor's last step and fails with [`ListError::CursorInvalidated`] on
//! a mismatch. Changes made *through* the cursor keep it valid.
//!
//! The cursor sits between two elements. `next` returns the element after
//! the gap and moves forward; `prev` returns the element before it and moves
//! back. The element returned last is the *current* one, which
//! `remove_current` and `replace_current` act on.

use crate::{ListError, ListId, ListResult, RecyclableList, SlotIndex, TokenSet};

/// Bidirectional cursor with in-place removal and replacement.
#[derive(Debug, Clone, Default)]
pub struct ListCursor {
    list: Option<ListId>,
    /// Slot `next` would return; `None` past the back.
    upcoming: Option<SlotIndex>,
    current: Option<SlotIndex>,
    expected: u64,
}

impl ListCursor {
    /// Create a cursor not yet attached to any list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            list: None,
            upcoming: None,
            current: None,
            expected: 0,
        }
    }

    /// Rewind to the front of `list`.
    pub fn reset<T>(&mut self, list: &RecyclableList<T>) {
        self.attach(list);
        self.upcoming = list.head();
    }

    /// Position past the back of `list`, ready to walk backwards.
    pub fn reset_back<T>(&mut self, list: &RecyclableList<T>) {
        self.attach(list);
        self.upcoming = None;
    }

    fn attach<T>(&mut self, list: &RecyclableList<T>) {
        self.list = Some(list.id());
        self.current = None;
        self.expected = list.modifications();
    }

    fn check<T>(&self, list: &RecyclableList<T>) -> ListResult<()> {
        match self.list {
            Some(id) if id != list.id() => Err(ListError::WrongList {
                expected: id,
                found: list.id(),
            }),
            Some(_) if self.expected == list.modifications() => Ok(()),
            _ => Err(ListError::CursorInvalidated(list.id())),
        }
    }

    /// Whether `next` would yield an element.
    pub fn has_next<T>(&self, list: &RecyclableList<T>) -> ListResult<bool> {
        self.check(list)?;
        Ok(self.upcoming.is_some())
    }

    /// Whether `prev` would yield an element.
    pub fn has_prev<T>(&self, list: &RecyclableList<T>) -> ListResult<bool> {
        self.check(list)?;
        Ok(self.before(list).is_some())
    }

    fn before<T>(&self, list: &RecyclableList<T>) -> Option<SlotIndex> {
        match self.upcoming {
            Some(idx) => list.prev_of(idx),
            None => list.tail(),
        }
    }

    /// Step forward, returning the element passed over.
    pub fn next<'a, T>(&mut self, list: &'a RecyclableList<T>) -> ListResult<Option<&'a T>> {
        self.check(list)?;
        let Some(idx) = self.upcoming else {
            self.current = None;
            return Ok(None);
        };
        self.upcoming = list.next_of(idx);
        self.current = Some(idx);
        Ok(list.value_at(idx))
    }

    /// Step backward, returning the element passed over.
    pub fn prev<'a, T>(&mut self, list: &'a RecyclableList<T>) -> ListResult<Option<&'a T>> {
        self.check(list)?;
        let Some(idx) = self.before(list) else {
            self.current = None;
            return Ok(None);
        };
        self.upcoming = Some(idx);
        self.current = Some(idx);
        Ok(list.value_at(idx))
    }

    /// Remove the current element. `tokens` must be that element's tokens.
    pub fn remove_current<T>(
        &mut self,
        list: &mut RecyclableList<T>,
        tokens: &mut TokenSet,
    ) -> ListResult<T> {
        self.check(list)?;
        let idx = self.current.ok_or(ListError::NoCurrent)?;
        if list.linked_slot(tokens) != Some(idx) {
            return Err(ListError::NotAMember(list.id()));
        }
        if self.upcoming == Some(idx) {
            self.upcoming = list.next_of(idx);
        }
        let value = list.remove(tokens)?;
        self.current = None;
        self.expected = list.modifications();
        Ok(value)
    }

    /// Put `value` in the current element's place and return the old one.
    ///
    /// `old_tokens` belong to the element being replaced, `new_tokens` to the
    /// incoming one. The incoming element must not already be a member.
    pub fn replace_current<T>(
        &mut self,
        list: &mut RecyclableList<T>,
        value: T,
        old_tokens: &mut TokenSet,
        new_tokens: &mut TokenSet,
    ) -> ListResult<T> {
        self.check(list)?;
        let idx = self.current.ok_or(ListError::NoCurrent)?;
        let old = list.replace_at(idx, value, old_tokens, new_tokens)?;
        self.expected = list.modifications();
        Ok(old)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: u32) -> (RecyclableList<u32>, Vec<TokenSet>) {
        let mut list = RecyclableList::new(false);
        let mut tokens: Vec<TokenSet> = (0..n).map(|_| TokenSet::new()).collect();
        for (i, t) in tokens.iter_mut().enumerate() {
            list.append(i as u32, t).unwrap();
        }
        (list, tokens)
    }

    #[test]
    fn test_forward_and_backward() {
        let (list, _tokens) = filled(3);
        let mut cursor = ListCursor::new();

        cursor.reset(&list);
        assert_eq!(cursor.next(&list), Ok(Some(&0)));
        assert_eq!(cursor.next(&list), Ok(Some(&1)));
        assert_eq!(cursor.prev(&list), Ok(Some(&1)));
        assert_eq!(cursor.prev(&list), Ok(Some(&0)));
        assert_eq!(cursor.prev(&list), Ok(None));
        assert_eq!(cursor.has_next(&list), Ok(true));

        cursor.reset_back(&list);
        assert_eq!(cursor.has_prev(&list), Ok(true));
        assert_eq!(cursor.prev(&list), Ok(Some(&2)));
    }

    #[test]
    fn test_reset_reuses_cursor() {
        let (list, _tokens) = filled(2);
        let mut cursor = ListCursor::new();

        for _ in 0..3 {
            cursor.reset(&list);
            let mut seen = Vec::new();
            while let Some(v) = cursor.next(&list).unwrap() {
                seen.push(*v);
            }
            assert_eq!(seen, vec![0, 1]);
        }
    }

    #[test]
    fn test_remove_during_iteration() {
        let (mut list, mut tokens) = filled(5);
        let mut cursor = ListCursor::new();

        cursor.reset(&list);
        loop {
            let Some(&v) = cursor.next(&list).unwrap() else {
                break;
            };
            if v % 2 == 1 {
                let removed = cursor
                    .remove_current(&mut list, &mut tokens[v as usize])
                    .unwrap();
                assert_eq!(removed, v);
            }
        }

        let rest: Vec<u32> = list.iter().copied().collect();
        assert_eq!(rest, vec![0, 2, 4]);
    }

    #[test]
    fn test_remove_after_prev() {
        let (mut list, mut tokens) = filled(3);
        let mut cursor = ListCursor::new();

        cursor.reset_back(&list);
        assert_eq!(cursor.prev(&list), Ok(Some(&2)));
        assert_eq!(cursor.prev(&list), Ok(Some(&1)));
        cursor.remove_current(&mut list, &mut tokens[1]).unwrap();
        assert_eq!(cursor.next(&list), Ok(Some(&2)));
        assert_eq!(cursor.prev(&list), Ok(Some(&2)));
        assert_eq!(cursor.prev(&list), Ok(Some(&0)));
    }

    #[test]
    fn test_remove_without_current_fails() {
        let (mut list, mut tokens) = filled(2);
        let mut cursor = ListCursor::new();

        cursor.reset(&list);
        assert_eq!(
            cursor.remove_current(&mut list, &mut tokens[0]),
            Err(ListError::NoCurrent)
        );

        cursor.next(&list).unwrap();
        // Tokens of a different element than the current one.
        assert_eq!(
            cursor.remove_current(&mut list, &mut tokens[1]),
            Err(ListError::NotAMember(list.id()))
        );
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_outside_modification_invalidates() {
        let (mut list, mut tokens) = filled(3);
        let mut cursor = ListCursor::new();

        cursor.reset(&list);
        cursor.next(&list).unwrap();
        list.remove(&mut tokens[2]).unwrap();

        assert_eq!(
            cursor.next(&list),
            Err(ListError::CursorInvalidated(list.id()))
        );

        cursor.reset(&list);
        assert_eq!(cursor.next(&list), Ok(Some(&0)));
    }

    #[test]
    fn test_unattached_and_foreign_cursor() {
        let (list, _tokens) = filled(1);
        let (other, _other_tokens) = filled(1);
        let mut cursor = ListCursor::new();

        assert_eq!(
            cursor.next(&list),
            Err(ListError::CursorInvalidated(list.id()))
        );

        cursor.reset(&list);
        assert_eq!(
            cursor.next(&other),
            Err(ListError::WrongList {
                expected: list.id(),
                found: other.id(),
            })
        );
    }

    #[test]
    fn test_replace_current() {
        let (mut list, mut tokens) = filled(3);
        let mut newcomer = TokenSet::new();
        let mut cursor = ListCursor::new();

        cursor.reset(&list);
        cursor.next(&list).unwrap();
        cursor.next(&list).unwrap();
        let old = cursor
            .replace_current(&mut list, 42, &mut tokens[1], &mut newcomer)
            .unwrap();

        assert_eq!(old, 1);
        assert!(!list.contains(&tokens[1]));
        assert!(list.contains(&newcomer));
        assert_eq!(cursor.next(&list), Ok(Some(&2)));

        let all: Vec<u32> = list.iter().copied().collect();
        assert_eq!(all, vec![0, 42, 2]);
    }

    #[test]
    fn test_replace_with_member_rejected() {
        let (mut list, mut tokens) = filled(2);
        let mut cursor = ListCursor::new();

        cursor.reset(&list);
        cursor.next(&list).unwrap();
        let (first, second) = tokens.split_at_mut(1);
        assert_eq!(
            cursor.replace_current(&mut list, 1, &mut first[0], &mut second[0]),
            Err(ListError::AlreadyMember(list.id()))
        );
    }
}
