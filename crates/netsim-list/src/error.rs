//! List error types.

use thiserror::Error;

use crate::ListId;

/// List error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ListError {
    /// The element already holds a live finger for this list.
    #[error("element is already a member of list {0}")]
    AlreadyMember(ListId),

    /// The element (or reference element) is not currently in this list.
    #[error("element is not a member of list {0}")]
    NotAMember(ListId),

    /// A finger or cursor issued by another list was presented.
    #[error("handle belongs to list {found}, not list {expected}")]
    WrongList { expected: ListId, found: ListId },

    /// The list changed structurally behind a live cursor.
    #[error("list {0} was modified outside the cursor")]
    CursorInvalidated(ListId),

    /// `remove_current`/`replace_current` without a preceding `next`/`prev`.
    #[error("cursor has no current element")]
    NoCurrent,
}

/// Result type for list operations.
pub type ListResult<T> = Result<T, ListError>;
