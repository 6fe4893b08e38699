//! The serialization graph: a directed multigraph over transaction ids,
//! used solely to detect cycles at commit time (§3, §4.4).

use rustc_hash::FxHashMap;
use ssi_sim_core::TxnId;

/// Why an edge exists between two transactions, per the R/W table in §4.4.
/// Purely diagnostic — cycle detection only cares about the edge's
/// existence, and edges are deduplicated by `(source, target)` regardless
/// of label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeLabel {
    /// write-write: both transactions wrote the same variable.
    Ww,
    /// write-read: the other transaction wrote what this one read.
    Wr,
    /// read-write: this transaction wrote what the other one read.
    Rw,
}

/// A directed multigraph over transaction ids. Owned and mutated only by
/// the coordinator.
#[derive(Debug, Default)]
pub struct SerializationGraph {
    adjacency: FxHashMap<TxnId, FxHashMap<TxnId, EdgeLabel>>,
}

impl SerializationGraph {
    /// An empty graph.
    pub fn new() -> Self {
        SerializationGraph::default()
    }

    /// Add `txn` as a node with no edges, if it isn't already present.
    pub fn add_node(&mut self, txn: TxnId) {
        self.adjacency.entry(txn).or_default();
    }

    /// Add a `src -> dst` edge labeled `label`. Self-edges are forbidden
    /// (silently dropped); repeated edges between the same ordered pair are
    /// deduplicated (the label of the last call wins, but existence is
    /// what matters for cycle detection).
    pub fn add_edge(&mut self, src: TxnId, dst: TxnId, label: EdgeLabel) {
        if src == dst {
            return;
        }
        self.adjacency.entry(src).or_default();
        self.adjacency.entry(dst).or_default();
        self.adjacency.get_mut(&src).unwrap().insert(dst, label);
    }

    /// Remove `txn` and every edge touching it. Aborted transactions can
    /// never be chosen as a future cycle victim, so purging them keeps the
    /// graph small and DFS cheap (§9 open question, resolved in DESIGN.md).
    pub fn remove_node(&mut self, txn: TxnId) {
        self.adjacency.remove(&txn);
        for edges in self.adjacency.values_mut() {
            edges.remove(&txn);
        }
    }

    /// All nodes currently in the graph, in ascending id order (for
    /// deterministic DFS traversal order).
    fn sorted_nodes(&self) -> Vec<TxnId> {
        let mut nodes: Vec<TxnId> = self.adjacency.keys().copied().collect();
        nodes.sort();
        nodes
    }

    fn neighbors(&self, txn: TxnId) -> Vec<TxnId> {
        let mut out: Vec<TxnId> = self
            .adjacency
            .get(&txn)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    /// Find any cycle reachable via DFS and return the transactions on it,
    /// or `None` if the graph is acyclic. Deterministic: traverses nodes
    /// and their neighbors in ascending id order.
    pub fn find_cycle(&self) -> Option<Vec<TxnId>> {
        #[derive(PartialEq, Eq, Clone, Copy)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let mut color: FxHashMap<TxnId, Color> = self
            .adjacency
            .keys()
            .map(|&t| (t, Color::White))
            .collect();
        let mut path: Vec<TxnId> = Vec::new();

        fn visit(
            node: TxnId,
            graph: &SerializationGraph,
            color: &mut FxHashMap<TxnId, Color>,
            path: &mut Vec<TxnId>,
        ) -> Option<Vec<TxnId>> {
            color.insert(node, Color::Gray);
            path.push(node);

            for next in graph.neighbors(node) {
                match color.get(&next).copied().unwrap_or(Color::White) {
                    Color::White => {
                        if let Some(cycle) = visit(next, graph, color, path) {
                            return Some(cycle);
                        }
                    }
                    Color::Gray => {
                        let start = path.iter().position(|&t| t == next).unwrap();
                        return Some(path[start..].to_vec());
                    }
                    Color::Black => {}
                }
            }

            path.pop();
            color.insert(node, Color::Black);
            None
        }

        for node in self.sorted_nodes() {
            if color.get(&node).copied() == Some(Color::White) {
                if let Some(cycle) = visit(node, self, &mut color, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }
}
