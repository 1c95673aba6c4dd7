//! kbase-index
//!
//! Exact (brute-force) vector index pairing embeddings with their documents.

pub mod distance;
pub mod flat;

pub use distance::{similarity_from_distance, squared_l2};
pub use flat::FlatL2Index;
