//! Caminar: graph-based item and user embeddings in pure Rust.
//!
//! Caminar turns behavioral interaction sequences into low-dimensional
//! vector representations and indexes them for fast approximate similarity
//! lookup. The pipeline builds a weighted item-transition graph from
//! observed sequences, synthesizes additional training sequences with
//! biased random walks over that graph, hands the corpus to a pluggable
//! sequence embedder, and exposes the resulting vectors through user-level
//! aggregation and a bucketed random-projection (LSH) index.
//!
//! # Quick Start
//!
//! ```
//! use caminar::prelude::*;
//!
//! // Observed interaction sequences (already ordered and filtered).
//! let sequences = vec![
//!     vec!["A".to_string(), "B".to_string(), "C".to_string()],
//!     vec!["A".to_string(), "B".to_string(), "D".to_string()],
//!     vec!["B".to_string(), "C".to_string()],
//! ];
//!
//! // Transition graph plus the distribution walks start from.
//! let (graph, start) = TransitionGraph::from_sequences(&sequences).unwrap();
//! assert_eq!(graph.probability("A", "B"), Some(1.0));
//!
//! // Synthesize a walk corpus.
//! let sampler = RandomWalkSampler::new(100, 10).unwrap().with_seed(42);
//! let walks = sampler.sample(&graph, &start);
//! assert_eq!(walks.len(), 100);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: the embedding `Vector` type
//! - [`graph`]: transition-graph construction from sequences
//! - [`walk`]: weighted random walks and batch sampling
//! - [`embed`]: the sequence-embedder seam and the embedding table
//! - [`aggregate`]: user-vector aggregation by summation
//! - [`index`]: approximate nearest-neighbor search (random-projection LSH)
//! - [`pipeline`]: the end-to-end driver
//!
//! The external collaborators — the ETL layer producing ordered sequences,
//! the skip-gram trainer behind [`embed::SequenceEmbedder`], and the
//! persistence/serving side consuming the outputs — stay outside this
//! crate.

pub mod aggregate;
pub mod embed;
pub mod error;
pub mod graph;
pub mod index;
pub mod pipeline;
pub mod prelude;
pub mod primitives;
pub mod walk;

pub use error::{CaminarError, Result};
pub use graph::{ItemId, Sequence};
pub use primitives::Vector;
