use std::cmp::Ordering;

use tracing::debug;

use kbase_core::types::{Document, RetrievalResult};
use kbase_core::{Error, Result};

use crate::distance::{similarity_from_distance, squared_l2};

/// Exact nearest-neighbour index over squared L2 distance.
///
/// Vectors live in one contiguous buffer; row `i` of that buffer and
/// `documents[i]` always describe the same article. Rows are only ever
/// appended, so positions are stable for the life of the index.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dim: usize,
    vectors: Vec<f32>,
    documents: Vec<Document>,
}

impl FlatL2Index {
    pub fn new(dim: usize) -> Self {
        Self { dim, vectors: Vec::new(), documents: Vec::new() }
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn documents(&self) -> &[Document] { &self.documents }

    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dim)?;
        self.vectors.get(start..start + self.dim)
    }

    /// Appends `vectors[i]` paired with `documents[i]`.
    ///
    /// The whole batch is checked before anything is stored, so a rejected
    /// batch leaves the index untouched.
    pub fn add(&mut self, vectors: Vec<Vec<f32>>, documents: Vec<Document>) -> Result<()> {
        if vectors.len() != documents.len() {
            return Err(Error::LengthMismatch { vectors: vectors.len(), documents: documents.len() });
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dim) {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: bad.len() });
        }
        self.vectors.reserve(vectors.len() * self.dim);
        for v in &vectors {
            self.vectors.extend_from_slice(v);
        }
        self.documents.extend(documents);
        debug!("Index now holds {} documents", self.documents.len());
        Ok(())
    }

    /// Returns up to `k` documents ordered by ascending distance, ties going
    /// to the earlier insertion. An empty index yields an empty list.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievalResult>> {
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query.len() });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(i, row)| (squared_l2(query, row), i))
            .collect();

        let by_distance = |a: &(f32, usize), b: &(f32, usize)| -> Ordering { a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)) };
        let take = k.min(scored.len());
        if take < scored.len() {
            scored.select_nth_unstable_by(take - 1, by_distance);
            scored.truncate(take);
        }
        scored.sort_unstable_by(by_distance);

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(i, (distance, position))| RetrievalResult {
                rank: i + 1,
                document: self.documents[position].clone(),
                distance,
                similarity_score: similarity_from_distance(distance),
            })
            .collect())
    }
}
