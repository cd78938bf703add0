//! Storage for information-state accumulators.
//!
//! The table maps information-state keys to [`InfoStateNode`]s. It is owned by
//! a single solver and only grows: nodes are created lazily the first time a
//! traversal reaches their key and are never removed.

use rustc_hash::FxHashMap;

use crate::cfr::node::InfoStateNode;

/// Mapping from information-state key to its accumulators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoStateTable {
    /// info_key -> node
    nodes: FxHashMap<String, InfoStateNode>,
}

impl InfoStateTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Look up the node for `info_key`, creating it if it does not exist yet.
    ///
    /// `actions` is only called when the node is created.
    pub fn get_or_create<F>(&mut self, info_key: String, actions: F) -> &mut InfoStateNode
    where
        F: FnOnce() -> Vec<String>,
    {
        self.nodes
            .entry(info_key)
            .or_insert_with(|| InfoStateNode::new(actions()))
    }

    /// Insert a fully built node. Returns the node it replaced, if any.
    pub fn insert(&mut self, info_key: String, node: InfoStateNode) -> Option<InfoStateNode> {
        self.nodes.insert(info_key, node)
    }

    /// Node for an information state, if it has been visited.
    pub fn get(&self, info_key: &str) -> Option<&InfoStateNode> {
        self.nodes.get(info_key)
    }

    /// Check if an info set exists in the table.
    pub fn contains(&self, info_key: &str) -> bool {
        self.nodes.contains_key(info_key)
    }

    /// Number of information states stored.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if no information state has been visited.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all `(key, node)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &InfoStateNode)> {
        self.nodes.iter()
    }

    /// All entries sorted by key.
    ///
    /// Serialization uses this order so that equal tables encode identically.
    pub fn sorted(&self) -> Vec<(&String, &InfoStateNode)> {
        let mut entries: Vec<_> = self.nodes.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Get total memory usage estimate in bytes.
    pub fn memory_usage(&self) -> usize {
        self.nodes
            .iter()
            .map(|(k, node)| {
                k.len()
                    + node.actions().iter().map(String::len).sum::<usize>()
                    + 2 * node.num_actions() * std::mem::size_of::<f64>()
            })
            .sum()
    }
}
