//! Registry snapshot ordered by a caller key, rebuilt only when stale.

use netsim_list::ListId;

use crate::{GridIndex, NodeId};

/// Cached ordering of every held node.
///
/// The cache is rebuilt when grid membership changes or when the caller
/// passes a different `view_version`. Callers whose key depends on
/// something else, node positions for instance, bump the version when that
/// changes.
#[derive(Debug, Default)]
pub struct SortedView {
    keyed: Vec<(f64, NodeId)>,
    ids: Vec<NodeId>,
    /// `(registry, revision, view_version)` the cache was built for.
    built_for: Option<(ListId, u64, u64)>,
}

impl SortedView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the next [`SortedView::get`] would rebuild.
    #[must_use]
    pub fn is_stale(&self, grid: &GridIndex, view_version: u64) -> bool {
        self.built_for != Some(Self::stamp(grid, view_version))
    }

    /// Force a rebuild on next access.
    pub fn invalidate(&mut self) {
        self.built_for = None;
    }

    /// Held nodes in ascending `key` order; ties keep insertion order.
    pub fn get(
        &mut self,
        grid: &GridIndex,
        view_version: u64,
        mut key: impl FnMut(NodeId) -> f64,
    ) -> &[NodeId] {
        let stamp = Self::stamp(grid, view_version);
        if self.built_for != Some(stamp) {
            self.keyed.clear();
            self.keyed.extend(grid.nodes().map(|id| (key(id), id)));
            self.keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

            self.ids.clear();
            self.ids.extend(self.keyed.iter().map(|&(_, id)| id));
            self.built_for = Some(stamp);
        }
        &self.ids
    }

    fn stamp(grid: &GridIndex, view_version: u64) -> (ListId, u64, u64) {
        (grid.registry_id(), grid.revision(), view_version)
    }
}
