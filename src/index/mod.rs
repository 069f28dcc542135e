//! Approximate nearest neighbor search over embedding tables.
//!
//! # Algorithms
//!
//! - **Random-projection bucketing** (LSH): sub-linear approximate queries
//!   by hashing vectors into buckets along random directions
//!
//! # Quick Start
//!
//! ```
//! use caminar::embed::EmbeddingTable;
//! use caminar::index::RandomProjectionIndex;
//! use caminar::primitives::Vector;
//!
//! let mut items = EmbeddingTable::new(2);
//! items.insert("origin", Vector::from_slice(&[0.0, 0.0])).unwrap();
//! items.insert("far", Vector::from_slice(&[10.0, 10.0])).unwrap();
//!
//! let mut index = RandomProjectionIndex::new(3, 0.1).with_seed(42);
//! index.fit(&items).unwrap();
//!
//! // Probing with an indexed vector always finds it first.
//! let results = index.query(&Vector::from_slice(&[0.0, 0.0]), 1).unwrap();
//! assert_eq!(results[0].0, "origin");
//! ```

mod projection;

pub use projection::RandomProjectionIndex;
