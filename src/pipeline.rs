//! End-to-end graph-embedding pipeline.
//!
//! Wires the components in their strict data-flow order: sequences build
//! the transition graph, walks over the graph synthesize a training corpus,
//! the embedder turns the corpus into item vectors, and the item vectors
//! feed both user-vector aggregation and the similarity index. The pipeline
//! owns no algorithm of its own — it is the driver the components plug
//! into, parameterized by one [`PipelineConfig`].
//!
//! # Examples
//!
//! ```
//! use caminar::embed::HashEmbedder;
//! use caminar::pipeline::{EmbeddingPipeline, PipelineConfig};
//!
//! let config = PipelineConfig {
//!     emb_length: 8,
//!     sample_count: 50,
//!     sample_length: 5,
//!     seed: Some(42),
//!     ..PipelineConfig::default()
//! };
//! let pipeline = EmbeddingPipeline::new(HashEmbedder::new())
//!     .with_config(config)
//!     .unwrap();
//!
//! let sequences = vec![
//!     vec!["a".to_string(), "b".to_string(), "c".to_string()],
//!     vec!["b".to_string(), "c".to_string()],
//! ];
//! let items = pipeline.graph_embeddings(&sequences).unwrap();
//! assert!(items.contains("a"));
//! ```

use crate::aggregate::{aggregate_users, UserId};
use crate::embed::{EmbeddingTable, SequenceEmbedder};
use crate::error::{CaminarError, Result};
use crate::graph::{ItemId, Sequence, TransitionGraph};
use crate::index::RandomProjectionIndex;
use crate::walk::RandomWalkSampler;
use serde::{Deserialize, Serialize};

/// Hyperparameters of one pipeline run.
///
/// Defaults match the production training job: 10-dimensional vectors,
/// 20000 walks of length 10, three hash tables of width 0.1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Embedding dimensionality (typical domain 10-300).
    pub emb_length: usize,
    /// Number of synthetic walks per run.
    pub sample_count: usize,
    /// Maximum walk length.
    pub sample_length: usize,
    /// Bucket width of the similarity index.
    pub bucket_width: f32,
    /// Number of hash tables in the similarity index.
    pub num_hash_tables: usize,
    /// Base seed for walks and projections; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            emb_length: 10,
            sample_count: 20_000,
            sample_length: 10,
            bucket_width: 0.1,
            num_hash_tables: 3,
            seed: None,
        }
    }
}

impl PipelineConfig {
    /// Reject invalid hyperparameters eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`CaminarError::InvalidHyperparameter`] for any non-positive
    /// count, length, dimension, or bucket width.
    pub fn validate(&self) -> Result<()> {
        if self.emb_length == 0 {
            return Err(CaminarError::invalid_hyperparameter(
                "emb_length",
                self.emb_length,
                ">0",
            ));
        }
        if self.sample_count == 0 {
            return Err(CaminarError::invalid_hyperparameter(
                "sample_count",
                self.sample_count,
                ">0",
            ));
        }
        if self.sample_length == 0 {
            return Err(CaminarError::invalid_hyperparameter(
                "sample_length",
                self.sample_length,
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
        if self.num_hash_tables == 0 {
            return Err(CaminarError::invalid_hyperparameter(
                "num_hash_tables",
                self.num_hash_tables,
                ">0",
            ));
        }
        Ok(())
    }
}

/// Everything a training run produces for the serving side.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Item id to embedding vector.
    pub item_embeddings: EmbeddingTable,
    /// User id to summed embedding vector.
    pub user_embeddings: EmbeddingTable,
    /// Queryable approximate-similarity index over the item vectors.
    pub index: RandomProjectionIndex,
}

/// Pipeline driver over any conforming [`SequenceEmbedder`].
#[derive(Debug, Clone)]
pub struct EmbeddingPipeline<E> {
    config: PipelineConfig,
    embedder: E,
}

impl<E: SequenceEmbedder> EmbeddingPipeline<E> {
    /// Create a pipeline with default hyperparameters.
    #[must_use]
    pub fn new(embedder: E) -> Self {
        Self {
            config: PipelineConfig::default(),
            embedder,
        }
    }

    /// Replace the configuration, validating it eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`CaminarError::InvalidHyperparameter`] for invalid values.
    pub fn with_config(mut self, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fit item vectors directly on the observed sequences.
    ///
    /// # Errors
    ///
    /// Propagates embedder and validation failures.
    pub fn item_embeddings(&self, sequences: &[Sequence]) -> Result<EmbeddingTable> {
        self.config.validate()?;
        self.embedder.fit(sequences, self.config.emb_length)
    }

    /// Fit item vectors on a random-walk corpus synthesized from the
    /// sequences' transition graph.
    ///
    /// Zero-length walks (possible only when the graph has no edges) are
    /// filtered before the embedder sees the corpus; a degenerate corpus
    /// yields an empty table rather than an error.
    ///
    /// # Errors
    ///
    /// Propagates malformed-sequence, embedder, and validation failures.
    pub fn graph_embeddings(&self, sequences: &[Sequence]) -> Result<EmbeddingTable> {
        self.config.validate()?;
        let (graph, start) = TransitionGraph::from_sequences(sequences)?;

        let mut sampler =
            RandomWalkSampler::new(self.config.sample_count, self.config.sample_length)?;
        if let Some(seed) = self.config.seed {
            sampler = sampler.with_seed(seed);
        }

        let mut walks = sampler.sample(&graph, &start);
        walks.retain(|walk| !walk.is_empty());
        if walks.is_empty() {
            return Ok(EmbeddingTable::new(self.config.emb_length));
        }
        self.embedder.fit(&walks, self.config.emb_length)
    }

    /// Aggregate user vectors from interactions and a fitted item table.
    ///
    /// # Errors
    ///
    /// Returns [`CaminarError::MalformedInput`] for empty ids.
    pub fn user_embeddings(
        &self,
        interactions: &[(UserId, ItemId)],
        items: &EmbeddingTable,
    ) -> Result<EmbeddingTable> {
        aggregate_users(interactions, items)
    }

    /// Build the similarity index over a fitted item table.
    ///
    /// # Errors
    ///
    /// Propagates index parameter validation failures.
    pub fn index(&self, items: &EmbeddingTable) -> Result<RandomProjectionIndex> {
        let mut index =
            RandomProjectionIndex::new(self.config.num_hash_tables, self.config.bucket_width);
        if let Some(seed) = self.config.seed {
            index = index.with_seed(seed);
        }
        index.fit(items)?;
        Ok(index)
    }

    /// Full training run: graph embeddings, user aggregation, index build.
    ///
    /// # Errors
    ///
    /// Propagates failures from any stage; sparse-data conditions produce
    /// smaller artifacts instead of failing.
    pub fn run(
        &self,
        sequences: &[Sequence],
        interactions: &[(UserId, ItemId)],
    ) -> Result<PipelineOutput> {
        let item_embeddings = self.graph_embeddings(sequences)?;
        let user_embeddings = self.user_embeddings(interactions, &item_embeddings)?;
        let index = self.index(&item_embeddings)?;
        Ok(PipelineOutput {
            item_embeddings,
            user_embeddings,
            index,
        })
    }
}
