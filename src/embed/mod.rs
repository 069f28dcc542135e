//! Sequence embedding: the trainer boundary and the item-vector table.
//!
//! The actual sequence-embedding trainer (a skip-gram / word-embedding
//! model) is an external collaborator. This module defines the seam — the
//! [`SequenceEmbedder`] trait — plus the [`EmbeddingTable`] every conforming
//! trainer produces, and a deterministic [`HashEmbedder`] stand-in so the
//! pipeline, tests, and benches run without an external trainer. Any
//! conforming implementation can be substituted.

use crate::error::{CaminarError, Result};
use crate::graph::Sequence;
use crate::primitives::Vector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Black-box trainer fitting one vector per distinct item in a corpus of
/// sequences.
///
/// Hyperparameters beyond the vector dimension (context window, iteration
/// count) belong to the implementation, which treats them as opaque
/// pass-through values.
pub trait SequenceEmbedder {
    /// Fit `dimension`-length vectors to the items of `sequences`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid hyperparameters or malformed input;
    /// implementations must produce vectors of identical length.
    fn fit(&self, sequences: &[Sequence], dimension: usize) -> Result<EmbeddingTable>;
}

/// Mapping from identifier to embedding vector with a uniform dimension.
///
/// Used for both item tables (produced by a [`SequenceEmbedder`]) and user
/// tables (produced by aggregation). Immutable by convention once a
/// producer hands it off; readers share it freely.
///
/// # Examples
///
/// ```
/// use caminar::embed::EmbeddingTable;
/// use caminar::primitives::Vector;
///
/// let mut table = EmbeddingTable::new(2);
/// table.insert("m1", Vector::from_slice(&[1.0, 0.0])).unwrap();
/// assert_eq!(table.len(), 1);
/// assert!(table.insert("bad", Vector::from_slice(&[1.0])).is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingTable {
    dimension: usize,
    vectors: HashMap<String, Vector<f32>>,
}

impl EmbeddingTable {
    /// Create an empty table whose vectors all have length `dimension`.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
        }
    }

    /// Insert a vector, enforcing the uniform-dimension invariant.
    ///
    /// # Errors
    ///
    /// Returns [`CaminarError::DimensionMismatch`] if the vector length
    /// differs from the table dimension.
    pub fn insert(&mut self, id: impl Into<String>, vector: Vector<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(CaminarError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.vectors.insert(id.into(), vector);
        Ok(())
    }

    /// Vector for `id`, if present.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Vector<f32>> {
        self.vectors.get(id)
    }

    /// True if `id` has a vector.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.vectors.contains_key(id)
    }

    /// Shared vector length.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// True if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Iterator over (id, vector) entries (arbitrary order).
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vector<f32>)> {
        self.vectors.iter()
    }

    /// Iterator over ids (arbitrary order).
    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.vectors.keys()
    }

    /// Exact top-`n` most similar entries to `id` by cosine similarity,
    /// descending, excluding `id` itself. Ties break on id so the order is
    /// stable. Unknown ids yield an empty result.
    ///
    /// This is the exact counterpart to the approximate similarity index:
    /// O(n·d) per probe, every entry considered.
    #[must_use]
    pub fn nearest(&self, id: &str, n: usize) -> Vec<(String, f32)> {
        let Some(probe) = self.vectors.get(id) else {
            return Vec::new();
        };
        let mut scored: Vec<(String, f32)> = self
            .vectors
            .iter()
            .filter(|(other_id, _)| other_id.as_str() != id)
            .map(|(other_id, vector)| (other_id.clone(), probe.cosine_similarity(vector)))
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(n);
        scored
    }
}

/// Deterministic embedding oracle keyed by hashed item id.
///
/// Each distinct item gets a Gaussian vector drawn from a generator seeded
/// with the hash of (embedder seed, item id): the same item always maps to
/// the same vector, regardless of corpus order or sequence multiplicity.
/// Not a trained model — it stands in for the external skip-gram trainer
/// wherever a conforming [`SequenceEmbedder`] is needed.
///
/// # Examples
///
/// ```
/// use caminar::embed::{HashEmbedder, SequenceEmbedder};
///
/// let corpus = vec![vec!["a".to_string(), "b".to_string()]];
/// let table = HashEmbedder::new().with_seed(42).fit(&corpus, 8).unwrap();
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.get("a").unwrap().len(), 8);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HashEmbedder {
    seed: u64,
}

impl HashEmbedder {
    /// Create an embedder with seed 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the seed; distinct seeds produce unrelated tables.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn item_vector(&self, item: &str, dimension: usize) -> Vector<f32> {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        item.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());

        // Box-Muller draws scaled so the expected norm is ~1 at any
        // dimension.
        let scale = 1.0 / (dimension as f32).sqrt();
        let components: Vec<f32> = (0..dimension)
            .map(|_| {
                let u1: f32 = rng.gen_range(0.0001_f32..1.0_f32);
                let u2: f32 = rng.gen_range(0.0_f32..1.0_f32);
                let z = (-2.0_f32 * u1.ln()).sqrt() * (2.0_f32 * std::f32::consts::PI * u2).cos();
                scale * z
            })
            .collect();
        Vector::from_vec(components)
    }
}

impl SequenceEmbedder for HashEmbedder {
    fn fit(&self, sequences: &[Sequence], dimension: usize) -> Result<EmbeddingTable> {
        if dimension == 0 {
            return Err(CaminarError::invalid_hyperparameter(
                "dimension",
                dimension,
                ">0",
            ));
        }
        let mut table = EmbeddingTable::new(dimension);
        for sequence in sequences {
            for item in sequence {
                if item.is_empty() {
                    return Err(CaminarError::malformed_input("empty item id in corpus"));
                }
                if !table.contains(item) {
                    table.insert(item.clone(), self.item_vector(item, dimension))?;
                }
            }
        }
        Ok(table)
    }
}
