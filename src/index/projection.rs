//! Bucketed random-projection (LSH) index.
//!
//! Each hash table projects a vector onto a handful of random directions
//! and floor-divides every projection by the bucket width; the resulting
//! integer tuple is the vector's bucket id in that table. Vectors landing
//! in the same bucket in *any* table become query candidates, and only
//! candidates pay the exact-distance cost. True neighbors falling outside
//! every matching bucket are missed — recall is traded for speed, and both
//! more tables and wider buckets buy recall back at the cost of larger
//! candidate sets.

use crate::embed::EmbeddingTable;
use crate::error::{CaminarError, Result};
use crate::graph::ItemId;
use crate::primitives::Vector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One hash table: its projection directions and the populated buckets.
#[derive(Debug, Clone)]
struct HashTable {
    projections: Vec<Vector<f32>>,
    buckets: HashMap<Vec<i64>, Vec<ItemId>>,
}

impl HashTable {
    fn bucket_key(&self, vector: &Vector<f32>, bucket_width: f32) -> Vec<i64> {
        self.projections
            .iter()
            .map(|p| (p.dot(vector) / bucket_width).floor() as i64)
            .collect()
    }
}

/// Approximate nearest-neighbor index over an [`EmbeddingTable`].
///
/// Built once from a table and immutable afterwards (no incremental insert
/// or delete); queries are read-only and safe to issue concurrently.
///
/// Projection directions for table `t` are drawn from a generator seeded
/// with `base_seed + t`, never from the total table count: for a fixed
/// seed, the candidate set of a query can only grow when `num_hash_tables`
/// grows.
///
/// # Configuration
///
/// - `num_hash_tables`: independent tables (default 3); more tables raise
///   recall and memory
/// - `bucket_width`: radial bucket size (default 0.1); wider buckets raise
///   recall and candidate-set size
///
/// # Examples
///
/// ```
/// use caminar::embed::EmbeddingTable;
/// use caminar::index::RandomProjectionIndex;
/// use caminar::primitives::Vector;
///
/// let mut items = EmbeddingTable::new(2);
/// items.insert("a", Vector::from_slice(&[1.0, 0.0])).unwrap();
/// items.insert("b", Vector::from_slice(&[0.0, 1.0])).unwrap();
///
/// let mut index = RandomProjectionIndex::new(3, 0.1).with_seed(0);
/// index.fit(&items).unwrap();
/// assert_eq!(index.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct RandomProjectionIndex {
    num_hash_tables: usize,
    bucket_width: f32,
    projections_per_table: usize,
    seed: Option<u64>,
    dimension: usize,
    tables: Vec<HashTable>,
    vectors: HashMap<ItemId, Vector<f32>>,
}

impl RandomProjectionIndex {
    /// Create an unfitted index configuration.
    #[must_use]
    pub fn new(num_hash_tables: usize, bucket_width: f32) -> Self {
        Self {
            num_hash_tables,
            bucket_width,
            projections_per_table: 1,
            seed: None,
            dimension: 0,
            tables: Vec::new(),
            vectors: HashMap::new(),
        }
    }

    /// Fix the seed for reproducible projections.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of projection directions per table (default 1). More
    /// directions make buckets tighter, lowering recall per table.
    #[must_use]
    pub fn with_projections_per_table(mut self, n: usize) -> Self {
        self.projections_per_table = n;
        self
    }

    /// Build the buckets from an embedding table.
    ///
    /// Refitting replaces any previously built state.
    ///
    /// # Errors
    ///
    /// Returns [`CaminarError::InvalidHyperparameter`] for a zero table
    /// count, zero projections per table, or a non-positive or non-finite
    /// bucket width.
    pub fn fit(&mut self, items: &EmbeddingTable) -> Result<()> {
        if self.num_hash_tables == 0 {
            return Err(CaminarError::invalid_hyperparameter(
                "num_hash_tables",
                self.num_hash_tables,
                ">0",
            ));
        }
        if !(self.bucket_width > 0.0 && self.bucket_width.is_finite()) {
            return Err(CaminarError::invalid_hyperparameter(
                "bucket_width",
                self.bucket_width,
                ">0",
            ));
        }
        if self.projections_per_table == 0 {
            return Err(CaminarError::invalid_hyperparameter(
                "projections_per_table",
                self.projections_per_table,
                ">0",
            ));
        }

        self.dimension = items.dimension();
        self.vectors = items
            .iter()
            .map(|(id, v)| (id.clone(), v.clone()))
            .collect();

        let base_seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let dimension = self.dimension;
        let projections_per_table = self.projections_per_table;
        let bucket_width = self.bucket_width;

        self.tables = (0..self.num_hash_tables)
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(t as u64));
                let projections = (0..projections_per_table)
                    .map(|_| gaussian_direction(&mut rng, dimension))
                    .collect();
                let mut table = HashTable {
                    projections,
                    buckets: HashMap::new(),
                };
                for (id, key) in assign_buckets(&table, items, bucket_width) {
                    table.buckets.entry(key).or_default().push(id);
                }
                table
            })
            .collect();
        Ok(())
    }

    /// Item ids sharing a bucket with `query` in at least one table,
    /// sorted by id.
    ///
    /// Exposed so that recall behavior (candidate-set growth with more
    /// tables or wider buckets) is directly observable.
    #[must_use]
    pub fn candidates(&self, query: &Vector<f32>) -> Vec<ItemId> {
        if self.vectors.is_empty() || query.len() != self.dimension {
            return Vec::new();
        }
        let mut found: HashSet<&ItemId> = HashSet::new();
        for table in &self.tables {
            let key = table.bucket_key(query, self.bucket_width);
            if let Some(bucket) = table.buckets.get(&key) {
                found.extend(bucket.iter());
            }
        }
        let mut ids: Vec<ItemId> = found.into_iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Approximate `k` nearest neighbors of `query` by Euclidean distance,
    /// ascending.
    ///
    /// Exact distances are computed only over the candidate set; if the
    /// buckets hold fewer than `k` candidates, whatever exists is returned
    /// (an empty result when no bucket matches). Ties break on item id so
    /// the order is stable.
    ///
    /// # Errors
    ///
    /// Returns [`CaminarError::InvalidHyperparameter`] for `k == 0` and
    /// [`CaminarError::DimensionMismatch`] when the query dimension differs
    /// from the indexed vectors'.
    pub fn query(&self, query: &Vector<f32>, k: usize) -> Result<Vec<(ItemId, f32)>> {
        if k == 0 {
            return Err(CaminarError::invalid_hyperparameter("k", k, ">0"));
        }
        if self.vectors.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(CaminarError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(ItemId, f32)> = self
            .candidates(query)
            .into_iter()
            .map(|id| {
                let distance = self.vectors[&id].euclidean_distance(query);
                (id, distance)
            })
            .collect();
        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);
        Ok(scored)
    }

    /// Number of indexed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// True if nothing has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Configured number of hash tables.
    #[must_use]
    pub fn num_hash_tables(&self) -> usize {
        self.num_hash_tables
    }

    /// Configured bucket width.
    #[must_use]
    pub fn bucket_width(&self) -> f32 {
        self.bucket_width
    }

    /// Dimension of the indexed vectors (0 before fitting).
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Standard-normal direction via Box-Muller draws.
fn gaussian_direction<R: Rng + ?Sized>(rng: &mut R, dimension: usize) -> Vector<f32> {
    let components: Vec<f32> = (0..dimension)
        .map(|_| {
            let u1: f32 = rng.gen_range(0.0001_f32..1.0_f32);
            let u2: f32 = rng.gen_range(0.0_f32..1.0_f32);
            (-2.0_f32 * u1.ln()).sqrt() * (2.0_f32 * std::f32::consts::PI * u2).cos()
        })
        .collect();
    Vector::from_vec(components)
}

/// Bucket assignment for every item of a table; per-item work is
/// independent, so the batch fans out on the rayon pool when enabled.
fn assign_buckets(
    table: &HashTable,
    items: &EmbeddingTable,
    bucket_width: f32,
) -> Vec<(ItemId, Vec<i64>)> {
    let entries: Vec<(&String, &Vector<f32>)> = items.iter().collect();

    #[cfg(feature = "parallel")]
    {
        entries
            .into_par_iter()
            .map(|(id, v)| (id.clone(), table.bucket_key(v, bucket_width)))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        entries
            .into_iter()
            .map(|(id, v)| (id.clone(), table.bucket_key(v, bucket_width)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_of(entries: &[(&str, &[f32])]) -> EmbeddingTable {
        let dimension = entries[0].1.len();
        let mut table = EmbeddingTable::new(dimension);
        for (id, components) in entries {
            table.insert(*id, Vector::from_slice(components)).unwrap();
        }
        table
    }

    #[test]
    fn test_fit_rejects_invalid_parameters() {
        let items = table_of(&[("a", &[1.0])]);
        assert!(RandomProjectionIndex::new(0, 0.1).fit(&items).is_err());
        assert!(RandomProjectionIndex::new(3, 0.0).fit(&items).is_err());
        assert!(RandomProjectionIndex::new(3, -1.0).fit(&items).is_err());
        assert!(RandomProjectionIndex::new(3, 0.1)
            .with_projections_per_table(0)
            .fit(&items)
            .is_err());
    }

    #[test]
    fn test_query_rejects_zero_k() {
        let items = table_of(&[("a", &[1.0, 2.0])]);
        let mut index = RandomProjectionIndex::new(3, 0.1).with_seed(0);
        index.fit(&items).unwrap();
        assert!(index.query(&Vector::from_slice(&[1.0, 2.0]), 0).is_err());
    }

    #[test]
    fn test_query_rejects_dimension_mismatch() {
        let items = table_of(&[("a", &[1.0, 2.0])]);
        let mut index = RandomProjectionIndex::new(3, 0.1).with_seed(0);
        index.fit(&items).unwrap();
        let err = index.query(&Vector::from_slice(&[1.0]), 1).unwrap_err();
        assert!(matches!(err, CaminarError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_empty_index_returns_empty_results() {
        let mut index = RandomProjectionIndex::new(3, 0.1).with_seed(0);
        index.fit(&EmbeddingTable::new(2)).unwrap();
        assert!(index.is_empty());
        let results = index.query(&Vector::from_slice(&[1.0, 1.0]), 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_indexed_vector_always_finds_itself() {
        // Identical input vectors get identical bucket keys in every
        // table, so probing with an indexed vector cannot miss it.
        let items = table_of(&[("origin", &[0.0, 0.0]), ("far", &[10.0, 10.0])]);
        let mut index = RandomProjectionIndex::new(3, 0.1).with_seed(42);
        index.fit(&items).unwrap();

        let results = index.query(&Vector::from_slice(&[0.0, 0.0]), 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "origin");
        assert!(results[0].1 < 1e-6);
    }

    #[test]
    fn test_near_query_returns_nearest_of_two() {
        // Wide buckets and many tables make the near item a candidate;
        // exact re-ranking then puts it first.
        let items = table_of(&[("origin", &[0.0, 0.0]), ("far", &[10.0, 10.0])]);
        let mut index = RandomProjectionIndex::new(16, 1.0).with_seed(7);
        index.fit(&items).unwrap();

        let results = index.query(&Vector::from_slice(&[0.1, 0.1]), 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "origin");
    }

    #[test]
    fn test_k_larger_than_catalog_returns_all() {
        // Identical vectors share every bucket, so all three are
        // candidates and k=10 degrades to the full catalog.
        let items = table_of(&[("a", &[5.0, 5.0]), ("b", &[5.0, 5.0]), ("c", &[5.0, 5.0])]);
        let mut index = RandomProjectionIndex::new(3, 0.1).with_seed(1);
        index.fit(&items).unwrap();

        let results = index.query(&Vector::from_slice(&[5.0, 5.0]), 10).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_results_sorted_ascending_with_stable_ties() {
        let items = table_of(&[
            ("near", &[1.0, 1.0]),
            ("tie_a", &[2.0, 2.0]),
            ("tie_b", &[2.0, 2.0]),
        ]);
        let mut index = RandomProjectionIndex::new(4, 50.0).with_seed(3);
        index.fit(&items).unwrap();

        let results = index.query(&Vector::from_slice(&[1.0, 1.0]), 3).unwrap();
        assert!(!results.is_empty());
        for pair in results.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
        if results.len() == 3 {
            assert_eq!(results[0].0, "near");
            assert_eq!(results[1].0, "tie_a");
            assert_eq!(results[2].0, "tie_b");
        }
    }

    #[test]
    fn test_candidates_monotonic_in_table_count() {
        let items = table_of(&[
            ("a", &[1.0, 0.5]),
            ("b", &[0.5, 1.0]),
            ("c", &[-1.0, -0.5]),
            ("d", &[3.0, 3.0]),
        ]);
        let query = Vector::from_slice(&[0.8, 0.8]);

        let mut few = RandomProjectionIndex::new(2, 0.5).with_seed(9);
        few.fit(&items).unwrap();
        let mut many = RandomProjectionIndex::new(6, 0.5).with_seed(9);
        many.fit(&items).unwrap();

        let few_set: HashSet<ItemId> = few.candidates(&query).into_iter().collect();
        let many_set: HashSet<ItemId> = many.candidates(&query).into_iter().collect();
        assert!(
            few_set.is_subset(&many_set),
            "candidates shrank when tables grew: {few_set:?} vs {many_set:?}"
        );
    }

    #[test]
    fn test_candidates_monotonic_in_bucket_width() {
        // Coordinates are tiny, so every projection lands strictly inside
        // one bucket span at either width and the bucket key depends only
        // on the projection sign; widening cannot lose candidates.
        let items = table_of(&[
            ("a", &[1e-6, 2e-6]),
            ("b", &[2e-6, 1e-6]),
            ("c", &[-1e-6, -2e-6]),
        ]);
        let query = Vector::from_slice(&[1.5e-6, 1.5e-6]);

        let mut narrow = RandomProjectionIndex::new(3, 0.1).with_seed(11);
        narrow.fit(&items).unwrap();
        let mut wide = RandomProjectionIndex::new(3, 10.0).with_seed(11);
        wide.fit(&items).unwrap();

        let narrow_set: HashSet<ItemId> = narrow.candidates(&query).into_iter().collect();
        let wide_set: HashSet<ItemId> = wide.candidates(&query).into_iter().collect();
        assert!(
            narrow_set.is_subset(&wide_set),
            "candidates shrank when buckets widened: {narrow_set:?} vs {wide_set:?}"
        );
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let items = table_of(&[("a", &[1.0, 2.0]), ("b", &[2.0, 1.0]), ("c", &[9.0, 9.0])]);
        let query = Vector::from_slice(&[1.1, 1.9]);

        let mut first = RandomProjectionIndex::new(4, 0.5).with_seed(21);
        first.fit(&items).unwrap();
        let mut second = RandomProjectionIndex::new(4, 0.5).with_seed(21);
        second.fit(&items).unwrap();

        assert_eq!(first.candidates(&query), second.candidates(&query));
        assert_eq!(
            first.query(&query, 3).unwrap(),
            second.query(&query, 3).unwrap()
        );
    }

    #[test]
    fn test_refit_replaces_previous_state() {
        let first = table_of(&[("a", &[1.0, 1.0])]);
        let second = table_of(&[("x", &[2.0, 2.0]), ("y", &[3.0, 3.0])]);

        let mut index = RandomProjectionIndex::new(3, 0.1).with_seed(5);
        index.fit(&first).unwrap();
        assert_eq!(index.len(), 1);

        index.fit(&second).unwrap();
        assert_eq!(index.len(), 2);
        let results = index.query(&Vector::from_slice(&[2.0, 2.0]), 5).unwrap();
        assert!(results.iter().all(|(id, _)| id == "x" || id == "y"));
    }

    #[test]
    fn test_parameter_getters() {
        let index = RandomProjectionIndex::new(5, 0.25);
        assert_eq!(index.num_hash_tables(), 5);
        assert!((index.bucket_width() - 0.25).abs() < f32::EPSILON);
        assert_eq!(index.dimension(), 0);
    }
}
