//! Recyclable ordered lists with per-list position tokens.
//!
//! An element can belong to several [`RecyclableList`]s at the same time.
//! Instead of embedding link pointers in the element, every list keeps its
//! own slot arena and hands the element a [`Finger`] into it. The element
//! stores its fingers in a [`TokenSet`], keyed by [`ListId`]:
//!
//! ```text
//! node 17 ── TokenSet ─┬─ L3 (cell 4,2) → Finger(#8 v1)
//!                      └─ L0 (registry) → Finger(#17 v0)
//! ```
//!
//! Insertion, removal of a known element, and relinking are all O(1), and
//! with `keep_tokens` a removed element's slot stays reserved for it so hot
//! leave/re-enter cycles never touch the free chain.
//!
//! # Example
//!
//! ```
//! use netsim_list::{RecyclableList, TokenSet};
//!
//! let mut list = RecyclableList::new(true);
//! let mut a = TokenSet::new();
//! let mut b = TokenSet::new();
//!
//! list.append("a", &mut a)?;
//! list.append("b", &mut b)?;
//! assert_eq!(list.remove(&mut a)?, "a");
//! list.push_front("a", &mut a)?;
//!
//! assert_eq!(list.iter().copied().collect::<Vec<_>>(), ["a", "b"]);
//! assert_eq!(list.slot_capacity(), 2);
//! # Ok::<(), netsim_list::ListError>(())
//! ```

mod cursor;
mod error;
mod finger;
mod list;
mod tokens;

pub use cursor::ListCursor;
pub use error::{ListError, ListResult};
pub use finger::{Finger, Generation, ListId, SlotIndex};
pub use list::{Iter, RecyclableList};
pub use tokens::TokenSet;
