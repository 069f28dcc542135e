//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use caminar::prelude::*;
//! ```

pub use crate::aggregate::{aggregate_users, UserId};
pub use crate::embed::{EmbeddingTable, HashEmbedder, SequenceEmbedder};
pub use crate::error::{CaminarError, Result};
pub use crate::graph::{
    ItemId, Sequence, StartDistribution, TransitionGraph, TransitionGraphBuilder,
};
pub use crate::index::RandomProjectionIndex;
pub use crate::pipeline::{EmbeddingPipeline, PipelineConfig, PipelineOutput};
pub use crate::primitives::Vector;
pub use crate::walk::{pick_weighted, random_walk, RandomWalkSampler};
