//! Weighted random walks over a transition graph.
//!
//! Walks synthesize training sequences beyond the observed data: a start
//! node is drawn from the start distribution, then each step follows the
//! current node's outgoing probabilities until the requested length is
//! reached or the walk hits an absorbing node (no outgoing edges), which
//! truncates the walk early. Truncation is normal sparse-data behavior, not
//! an error.
//!
//! Selection uses cumulative-probability ("roulette wheel") sampling over an
//! explicit random source, so walks are deterministic under a fixed seed and
//! safe to run concurrently with per-walk generators.
//!
//! # Examples
//!
//! ```
//! use caminar::graph::TransitionGraph;
//! use caminar::walk::RandomWalkSampler;
//!
//! let sequences = vec![vec!["A".to_string(), "B".to_string(), "C".to_string()]];
//! let (graph, start) = TransitionGraph::from_sequences(&sequences).unwrap();
//!
//! let sampler = RandomWalkSampler::new(5, 10).unwrap().with_seed(42);
//! let walks = sampler.sample(&graph, &start);
//!
//! assert_eq!(walks.len(), 5);
//! assert!(walks.iter().all(|w| w.len() <= 10 && !w.is_empty()));
//! ```

use crate::error::{CaminarError, Result};
use crate::graph::{ItemId, Sequence, StartDistribution, TransitionGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Roulette-wheel selection over `(item, probability)` entries.
///
/// Draws a uniform threshold in [0, 1) and returns the first entry whose
/// accumulated probability mass reaches it, walking the slice in order.
/// Accumulated floating-point mass can fall short of 1.0; the last entry
/// absorbs the residual so a non-empty slice always selects. Returns `None`
/// only for an empty slice.
///
/// Stateless over an explicit random source: seeded generators make the
/// draw reproducible, per-thread generators make it contention-free.
pub fn pick_weighted<'a, R: Rng + ?Sized>(
    rng: &mut R,
    entries: &'a [(ItemId, f64)],
) -> Option<&'a ItemId> {
    if entries.is_empty() {
        return None;
    }
    let threshold: f64 = rng.gen_range(0.0..1.0);
    let mut accumulated = 0.0;
    for (item, probability) in entries {
        accumulated += probability;
        if accumulated >= threshold {
            return Some(item);
        }
    }
    entries.last().map(|(item, _)| item)
}

/// Perform one random walk of at most `length` nodes.
///
/// The start node is drawn from `start`; each subsequent node from the
/// current node's outgoing distribution. An absorbing node ends the walk
/// early. An empty start distribution yields an empty walk; callers filter
/// empty walks before handing sequences to an embedder.
#[must_use]
pub fn random_walk<R: Rng + ?Sized>(
    graph: &TransitionGraph,
    start: &StartDistribution,
    length: usize,
    rng: &mut R,
) -> Sequence {
    let mut walk = Vec::new();
    if length == 0 {
        return walk;
    }
    let Some(first) = pick_weighted(rng, start.entries()) else {
        return walk;
    };
    walk.push(first.clone());

    let mut current = first;
    for _ in 1..length {
        let Some(outgoing) = graph.outgoing(current) else {
            break;
        };
        let Some(next) = pick_weighted(rng, outgoing) else {
            break;
        };
        walk.push(next.clone());
        current = next;
    }
    walk
}

/// Batch sampler producing many mutually independent walks.
///
/// Each walk gets its own generator seeded from the base seed plus the walk
/// index, so the corpus is identical whether walks run sequentially or on
/// the rayon pool (`parallel` feature), and reproducible for a fixed seed.
///
/// # Examples
///
/// ```
/// use caminar::graph::TransitionGraph;
/// use caminar::walk::RandomWalkSampler;
///
/// let (graph, start) =
///     TransitionGraph::from_sequences(&[vec!["a".to_string(), "b".to_string()]]).unwrap();
///
/// let sampler = RandomWalkSampler::new(3, 4).unwrap().with_seed(7);
/// assert_eq!(sampler.sample(&graph, &start), sampler.sample(&graph, &start));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomWalkSampler {
    sample_count: usize,
    sample_length: usize,
    seed: Option<u64>,
}

impl RandomWalkSampler {
    /// Create a sampler producing `sample_count` walks of at most
    /// `sample_length` nodes each.
    ///
    /// # Errors
    ///
    /// Returns [`CaminarError::InvalidHyperparameter`] if either argument
    /// is zero.
    pub fn new(sample_count: usize, sample_length: usize) -> Result<Self> {
        if sample_count == 0 {
            return Err(CaminarError::invalid_hyperparameter(
                "sample_count",
                sample_count,
                ">0",
            ));
        }
        if sample_length == 0 {
            return Err(CaminarError::invalid_hyperparameter(
                "sample_length",
                sample_length,
                ">0",
            ));
        }
        Ok(Self {
            sample_count,
            sample_length,
            seed: None,
        })
    }

    /// Fix the base seed for reproducible corpora.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of walks per [`sample`](Self::sample) call.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Maximum walk length.
    #[must_use]
    pub fn sample_length(&self) -> usize {
        self.sample_length
    }

    /// Run the configured number of independent walks.
    ///
    /// An empty start distribution (graph with zero edges) deterministically
    /// yields an empty corpus.
    #[must_use]
    pub fn sample(&self, graph: &TransitionGraph, start: &StartDistribution) -> Vec<Sequence> {
        if start.is_empty() {
            return Vec::new();
        }
        let base_seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());

        // Golden-ratio stride keeps per-walk streams disjoint even across
        // adjacent base seeds.
        let one_walk = |index: usize| {
            let walk_seed =
                base_seed.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
            let mut rng = StdRng::seed_from_u64(walk_seed);
            random_walk(graph, start, self.sample_length, &mut rng)
        };

        #[cfg(feature = "parallel")]
        {
            (0..self.sample_count).into_par_iter().map(one_walk).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..self.sample_count).map(one_walk).collect()
        }
    }
}
