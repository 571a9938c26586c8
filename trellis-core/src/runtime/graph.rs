//! Callback Dependency Graph
//!
//! The local substrate keeps registered callbacks in a dependency graph:
//! an edge runs from callback A to callback B when one of A's output cells
//! is watched by B. Firing a cell then reduces to:
//!
//! 1. Seed with the callbacks watching the fired cell.
//! 2. Propagate reachability forward over the edges (BFS).
//! 3. Sort the collected set topologically so writers always run before
//!    their readers (Kahn's algorithm).
//!
//! Callbacks caught in a dependency cycle never reach in-degree zero and
//! are dropped from the order rather than run forever.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating unique callback IDs.
static CALLBACK_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for a registered callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

impl CallbackId {
    /// Allocate the next callback ID.
    pub fn new() -> Self {
        Self(CALLBACK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value, for logging.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for CallbackId {
    fn default() -> Self {
        Self::new()
    }
}

/// Edges of one callback within the graph.
#[derive(Debug, Default)]
struct CallbackNode {
    /// Upstream callbacks whose outputs this callback watches.
    dependencies: HashSet<CallbackId>,

    /// Downstream callbacks watching this callback's outputs.
    dependents: HashSet<CallbackId>,
}

/// Dependency graph over registered callbacks.
#[derive(Debug, Default)]
pub(crate) struct CallbackGraph {
    nodes: HashMap<CallbackId, CallbackNode>,
}

impl CallbackGraph {
    /// Add a callback to the graph with no edges yet.
    pub fn add_node(&mut self, id: CallbackId) {
        self.nodes.entry(id).or_default();
    }

    /// Add a dependency edge: `downstream` watches an output of `upstream`.
    pub fn add_edge(&mut self, upstream: CallbackId, downstream: CallbackId) {
        if let Some(node) = self.nodes.get_mut(&upstream) {
            node.dependents.insert(downstream);
        }
        if let Some(node) = self.nodes.get_mut(&downstream) {
            node.dependencies.insert(upstream);
        }
    }

    /// Collect every callback reachable from `seeds` (the seeds included)
    /// and return them in dependency order.
    pub fn affected_from(&self, seeds: impl IntoIterator<Item = CallbackId>) -> Vec<CallbackId> {
        let mut collected = Vec::new();
        let mut visited = HashSet::new();
        let mut queue: VecDeque<CallbackId> = seeds.into_iter().collect();

        // BFS over dependents
        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(&id) {
                collected.push(id);
                for &dependent in &node.dependents {
                    queue.push_back(dependent);
                }
            }
        }

        self.topological_sort(collected)
    }

    /// Perform a topological sort of the given callbacks.
    ///
    /// Returns them in order such that dependencies come before dependents.
    /// Only edges within the given set are considered.
    fn topological_sort(&self, ids: Vec<CallbackId>) -> Vec<CallbackId> {
        let id_set: HashSet<_> = ids.iter().copied().collect();
        let mut in_degree: HashMap<CallbackId, usize> = HashMap::new();
        let mut result = Vec::new();
        let mut queue = VecDeque::new();

        // Calculate in-degrees, counting only edges within the set
        for &id in &ids {
            if let Some(node) = self.nodes.get(&id) {
                let degree = node
                    .dependencies
                    .iter()
                    .filter(|d| id_set.contains(d))
                    .count();
                in_degree.insert(id, degree);
                if degree == 0 {
                    queue.push_back(id);
                }
            }
        }

        // Kahn's algorithm
        while let Some(id) = queue.pop_front() {
            result.push(id);

            if let Some(node) = self.nodes.get(&id) {
                for &dependent in &node.dependents {
                    if let Some(degree) = in_degree.get_mut(&dependent) {
                        *degree = degree.saturating_sub(1);
                        if *degree == 0 {
                            queue.push_back(dependent);
                        }
                    }
                }
            }
        }

        result
    }

    /// Total number of callbacks in the graph.
    #[cfg(test)]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
