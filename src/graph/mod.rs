//! Item-transition graph construction from interaction sequences.
//!
//! Every consecutive pair in a sequence contributes one directed edge
//! occurrence; occurrences are counted globally across all sequences and
//! normalized per source into transition probabilities. The same pass yields
//! the start distribution used to seed random walks: each item's probability
//! of being a walk start is its share of all observed transitions.
//!
//! The graph is a plain mapping structure (source id to a sorted list of
//! weighted destinations) rather than an adjacency-index representation;
//! walks enumerate outgoing edges in sorted-destination order, which keeps
//! roulette-wheel selection deterministic for a fixed random stream.
//!
//! # Examples
//!
//! ```
//! use caminar::graph::TransitionGraph;
//!
//! let sequences = vec![
//!     vec!["A".to_string(), "B".to_string(), "C".to_string()],
//!     vec!["A".to_string(), "B".to_string(), "D".to_string()],
//! ];
//! let (graph, start) = TransitionGraph::from_sequences(&sequences).unwrap();
//!
//! assert_eq!(graph.probability("A", "B"), Some(1.0));
//! assert_eq!(graph.num_edges(), 3);
//! assert!(!start.is_empty());
//! ```

use crate::error::{CaminarError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Catalog item identifier. Opaque; no ordering semantics beyond the
/// stable enumeration order used internally.
pub type ItemId = String;

/// Time-ordered interaction history of one actor.
pub type Sequence = Vec<ItemId>;

/// Directed weighted transition graph over catalog items.
///
/// For every source item, outgoing probabilities sum to 1.0. Read-only after
/// construction; shareable across concurrent walk workers without locking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionGraph {
    /// Source item to outgoing (destination, probability) pairs, sorted by
    /// destination id. Sorted order is the enumeration order for sampling.
    edges: HashMap<ItemId, Vec<(ItemId, f64)>>,
    n_nodes: usize,
    n_edges: usize,
}

/// Probability of each item being chosen as a walk's starting node.
///
/// Contains exactly the items that appear as the source of at least one
/// edge; probabilities sum to 1.0 whenever the graph has edges. Items seen
/// only as terminal nodes are absent (start probability zero).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartDistribution {
    /// (item, probability) pairs sorted by item id.
    entries: Vec<(ItemId, f64)>,
}

impl TransitionGraph {
    /// Build a graph and start distribution from sequences in one call.
    ///
    /// # Errors
    ///
    /// Returns [`CaminarError::MalformedInput`] if any sequence contains an
    /// empty item id; no partial graph is produced.
    pub fn from_sequences(sequences: &[Sequence]) -> Result<(Self, StartDistribution)> {
        let mut builder = TransitionGraphBuilder::new();
        builder.extend(sequences)?;
        Ok(builder.build())
    }

    /// Outgoing (destination, probability) pairs for `item`, sorted by
    /// destination id, or `None` if the item has no outgoing edges.
    ///
    /// Absorbing nodes (items seen only at the end of sequences) return
    /// `None`; a walk reaching one stops early.
    #[must_use]
    pub fn outgoing(&self, item: &str) -> Option<&[(ItemId, f64)]> {
        self.edges.get(item).map(Vec::as_slice)
    }

    /// Transition probability from `source` to `destination`, if the edge
    /// exists.
    #[must_use]
    pub fn probability(&self, source: &str, destination: &str) -> Option<f64> {
        self.edges.get(source)?.iter().find_map(|(dst, p)| {
            if dst == destination {
                Some(*p)
            } else {
                None
            }
        })
    }

    /// Number of distinct items appearing in the graph (as source or
    /// destination).
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Number of distinct directed edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.n_edges
    }

    /// True if the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_edges == 0
    }

    /// Iterator over source item ids (arbitrary order).
    pub fn sources(&self) -> impl Iterator<Item = &ItemId> {
        self.edges.keys()
    }
}

impl StartDistribution {
    /// (item, probability) entries sorted by item id. Sorted order is the
    /// enumeration order for sampling.
    #[must_use]
    pub fn entries(&self) -> &[(ItemId, f64)] {
        &self.entries
    }

    /// Start probability of `item`; 0.0 for items never seen as a source.
    #[must_use]
    pub fn probability(&self, item: &str) -> f64 {
        self.entries
            .binary_search_by(|(id, _)| id.as_str().cmp(item))
            .map(|idx| self.entries[idx].1)
            .unwrap_or(0.0)
    }

    /// Number of items with non-zero start probability.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True iff the graph the distribution was built from has zero edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accumulates sequences into edge-occurrence counts and normalizes them
/// into a [`TransitionGraph`] and [`StartDistribution`].
///
/// Counting is commutative, so the result is independent of the order in
/// which sequences are added.
///
/// # Examples
///
/// ```
/// use caminar::graph::TransitionGraphBuilder;
///
/// let mut builder = TransitionGraphBuilder::new();
/// builder.add_sequence(&["A".to_string(), "B".to_string()]).unwrap();
/// builder.add_sequence(&["B".to_string(), "C".to_string()]).unwrap();
/// let (graph, start) = builder.build();
///
/// assert_eq!(graph.num_edges(), 2);
/// assert_eq!(start.probability("A"), 0.5);
/// ```
#[derive(Debug, Default)]
pub struct TransitionGraphBuilder {
    counts: HashMap<ItemId, HashMap<ItemId, u64>>,
}

impl TransitionGraphBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the consecutive-pair edges of one sequence.
    ///
    /// Sequences of length 1 are accepted and contribute no edges.
    ///
    /// # Errors
    ///
    /// Returns [`CaminarError::MalformedInput`] if the sequence contains an
    /// empty item id. The sequence is validated before any of its edges are
    /// counted, so a failed call leaves the builder unchanged.
    pub fn add_sequence(&mut self, sequence: &[ItemId]) -> Result<()> {
        if let Some(position) = sequence.iter().position(String::is_empty) {
            return Err(CaminarError::malformed_input(format!(
                "empty item id at position {position}"
            )));
        }

        for pair in sequence.windows(2) {
            *self
                .counts
                .entry(pair[0].clone())
                .or_default()
                .entry(pair[1].clone())
                .or_insert(0) += 1;
        }
        Ok(())
    }

    /// Count the edges of every sequence in `sequences`.
    ///
    /// # Errors
    ///
    /// Returns [`CaminarError::MalformedInput`] on the first malformed
    /// sequence; sequences before it are already counted, the malformed one
    /// is not.
    pub fn extend(&mut self, sequences: &[Sequence]) -> Result<()> {
        for sequence in sequences {
            self.add_sequence(sequence)?;
        }
        Ok(())
    }

    /// Normalize the accumulated counts into a graph and start distribution.
    ///
    /// Degenerate input (no sequence of length ≥ 2) yields an empty graph
    /// and an empty distribution; downstream sampling treats that as "no
    /// walk possible" rather than an error.
    #[must_use]
    pub fn build(self) -> (TransitionGraph, StartDistribution) {
        let mut total_transitions = 0u64;
        let mut n_edges = 0usize;

        let mut edges: HashMap<ItemId, Vec<(ItemId, f64)>> =
            HashMap::with_capacity(self.counts.len());
        let mut start_entries: Vec<(ItemId, f64)> = Vec::with_capacity(self.counts.len());

        let mut nodes: HashSet<ItemId> = HashSet::new();

        for (source, outgoing) in &self.counts {
            let out_total: u64 = outgoing.values().sum();
            total_transitions += out_total;
            n_edges += outgoing.len();

            let mut weighted: Vec<(ItemId, f64)> = outgoing
                .iter()
                .map(|(dst, cnt)| (dst.clone(), *cnt as f64 / out_total as f64))
                .collect();
            weighted.sort_by(|a, b| a.0.cmp(&b.0));

            for (dst, _) in &weighted {
                nodes.insert(dst.clone());
            }
            nodes.insert(source.clone());
            edges.insert(source.clone(), weighted);
            start_entries.push((source.clone(), out_total as f64));
        }

        for entry in &mut start_entries {
            entry.1 /= total_transitions as f64;
        }
        start_entries.sort_by(|a, b| a.0.cmp(&b.0));

        let n_nodes = nodes.len();

        (
            TransitionGraph {
                edges,
                n_nodes,
                n_edges,
            },
            StartDistribution {
                entries: start_entries,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(items: &[&str]) -> Sequence {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    const TOL: f64 = 1e-9;

    #[test]
    fn test_transition_probabilities_from_three_sequences() {
        // A->B twice, B->C twice, B->D once across the corpus.
        let sequences = vec![seq(&["A", "B", "C"]), seq(&["A", "B", "D"]), seq(&["B", "C"])];
        let (graph, start) = TransitionGraph::from_sequences(&sequences).unwrap();

        assert!((graph.probability("A", "B").unwrap() - 1.0).abs() < TOL);
        assert!((graph.probability("B", "C").unwrap() - 2.0 / 3.0).abs() < TOL);
        assert!((graph.probability("B", "D").unwrap() - 1.0 / 3.0).abs() < TOL);
        assert_eq!(graph.num_edges(), 3);
        assert_eq!(graph.num_nodes(), 4);

        // 5 transitions total: A sourced 2, B sourced 3.
        assert!((start.probability("A") - 2.0 / 5.0).abs() < TOL);
        assert!((start.probability("B") - 3.0 / 5.0).abs() < TOL);
        assert_eq!(start.probability("C"), 0.0);
        assert_eq!(start.probability("D"), 0.0);
    }

    #[test]
    fn test_outgoing_probabilities_sum_to_one() {
        let sequences = vec![
            seq(&["a", "b", "c", "a", "b"]),
            seq(&["b", "a", "c"]),
            seq(&["c", "c", "c"]),
        ];
        let (graph, start) = TransitionGraph::from_sequences(&sequences).unwrap();

        for source in graph.sources() {
            let sum: f64 = graph.outgoing(source).unwrap().iter().map(|(_, p)| p).sum();
            assert!((sum - 1.0).abs() < TOL, "source {source} sums to {sum}");
        }
        let start_sum: f64 = start.entries().iter().map(|(_, p)| p).sum();
        assert!((start_sum - 1.0).abs() < TOL);
    }

    #[test]
    fn test_edge_occurrences_count_across_sequences() {
        // The same edge in two different sequences counts twice.
        let sequences = vec![seq(&["x", "y"]), seq(&["x", "y"]), seq(&["x", "z"])];
        let (graph, _) = TransitionGraph::from_sequences(&sequences).unwrap();
        assert!((graph.probability("x", "y").unwrap() - 2.0 / 3.0).abs() < TOL);
        assert!((graph.probability("x", "z").unwrap() - 1.0 / 3.0).abs() < TOL);
    }

    #[test]
    fn test_single_item_sequences_contribute_no_edges() {
        let sequences = vec![seq(&["solo"]), seq(&["solo"])];
        let (graph, start) = TransitionGraph::from_sequences(&sequences).unwrap();
        assert!(graph.is_empty());
        assert!(start.is_empty());
        assert_eq!(graph.num_edges(), 0);
    }

    #[test]
    fn test_empty_input_yields_empty_graph_and_distribution() {
        let (graph, start) = TransitionGraph::from_sequences(&[]).unwrap();
        assert!(graph.is_empty());
        assert!(start.is_empty());
        assert_eq!(start.len(), 0);
    }

    #[test]
    fn test_start_distribution_empty_iff_graph_empty() {
        let (graph, start) = TransitionGraph::from_sequences(&[seq(&["a", "b"])]).unwrap();
        assert!(!graph.is_empty());
        assert!(!start.is_empty());
    }

    #[test]
    fn test_empty_item_id_is_malformed() {
        let mut builder = TransitionGraphBuilder::new();
        let err = builder.add_sequence(&seq(&["a", "", "b"])).unwrap_err();
        assert!(err.to_string().contains("position 1"));

        // The failed sequence left no partial counts behind.
        let (graph, start) = builder.build();
        assert!(graph.is_empty());
        assert!(start.is_empty());
    }

    #[test]
    fn test_build_is_order_independent() {
        let forward = vec![seq(&["a", "b", "c"]), seq(&["c", "a"]), seq(&["b", "b"])];
        let mut reversed = forward.clone();
        reversed.reverse();

        let (g1, s1) = TransitionGraph::from_sequences(&forward).unwrap();
        let (g2, s2) = TransitionGraph::from_sequences(&reversed).unwrap();

        assert_eq!(s1.entries(), s2.entries());
        for source in g1.sources() {
            assert_eq!(g1.outgoing(source), g2.outgoing(source));
        }
    }

    #[test]
    fn test_outgoing_sorted_by_destination() {
        let sequences = vec![seq(&["s", "z"]), seq(&["s", "a"]), seq(&["s", "m"])];
        let (graph, _) = TransitionGraph::from_sequences(&sequences).unwrap();
        let destinations: Vec<&str> = graph
            .outgoing("s")
            .unwrap()
            .iter()
            .map(|(d, _)| d.as_str())
            .collect();
        assert_eq!(destinations, vec!["a", "m", "z"]);
    }

    #[test]
    fn test_absorbing_node_has_no_outgoing() {
        let (graph, _) = TransitionGraph::from_sequences(&[seq(&["a", "b"])]).unwrap();
        assert!(graph.outgoing("b").is_none());
    }

    #[test]
    fn test_self_loop_edge() {
        let (graph, start) = TransitionGraph::from_sequences(&[seq(&["a", "a", "a"])]).unwrap();
        assert!((graph.probability("a", "a").unwrap() - 1.0).abs() < TOL);
        assert!((start.probability("a") - 1.0).abs() < TOL);
    }
}
