use std::collections::HashMap;

use crate::dom::{Element, NodeId, WeakElement};

/// Set membership that does not keep elements alive. An element dropped
/// from the page is no longer a member, and its slot is reclaimed by
/// [`prune`](WeakSet::prune).
#[derive(Default)]
pub struct WeakSet {
    entries: HashMap<NodeId, WeakElement>,
}

impl WeakSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, el: &Element) -> bool {
        self.entries
            .get(&el.node_id())
            .is_some_and(|w| w.upgrade().is_some())
    }

    /// Returns false if `el` was already a member.
    pub fn insert(&mut self, el: &Element) -> bool {
        if self.contains(el) {
            return false;
        }
        self.entries.insert(el.node_id(), el.downgrade());
        true
    }

    /// Drops entries whose element is gone; returns how many.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, w| w.upgrade().is_some());
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
