// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store backends and the brute-force ranking they share.

mod memory;
mod sqlite;

pub use memory::InMemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use memora_core::{MemoraError, PayloadFilter, VectorHit, VectorRecord};

/// Convert f32 vector to SQLite BLOB (little-endian bytes).
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert SQLite BLOB back to f32 vector. Trailing partial chunks are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Cosine similarity in `[-1, 1]`. Zero-length or zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Rejects vectors whose length differs from the collection dimension.
pub(crate) fn check_dimensions(expected: usize, vector: &[f32]) -> Result<(), MemoraError> {
    if vector.len() != expected {
        return Err(MemoraError::VectorStore {
            message: format!(
                "dimension mismatch: collection expects {expected}, got {}",
                vector.len()
            ),
            source: None,
        });
    }
    Ok(())
}

/// Scores every record matching `filter` against `query` and keeps the
/// `limit` closest, highest similarity first.
pub(crate) fn rank<I>(records: I, query: &[f32], limit: usize, filter: &PayloadFilter) -> Vec<VectorHit>
where
    I: IntoIterator<Item = VectorRecord>,
{
    let mut hits: Vec<VectorHit> = records
        .into_iter()
        .filter(|record| filter.matches(&record.payload))
        .map(|record| VectorHit {
            score: cosine_similarity(query, &record.vector),
            id: record.id,
            payload: record.payload,
        })
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(limit);
    hits
}
