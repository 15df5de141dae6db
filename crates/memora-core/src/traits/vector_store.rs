// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store adapter trait.

use async_trait::async_trait;

use crate::error::MemoraError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CollectionInfo, Payload, PayloadFilter, VectorHit, VectorRecord};

/// Adapter for a vector store bound to a single named collection.
///
/// Operations on ids that do not exist return [`MemoraError::NotFound`].
/// Vectors whose length differs from the collection dimension are rejected
/// with [`MemoraError::VectorStore`].
#[async_trait]
pub trait VectorStoreAdapter: PluginAdapter {
    /// Creates the collection if it does not exist. Idempotent.
    async fn create_collection(&self, dimensions: usize) -> Result<(), MemoraError>;

    /// Inserts records. An existing id is overwritten.
    async fn insert(&self, records: Vec<VectorRecord>) -> Result<(), MemoraError>;

    /// Returns up to `limit` hits ordered by descending similarity,
    /// restricted to records whose payload matches `filter`.
    async fn search(
        &self,
        query: &[f32],
        limit: usize,
        filter: &PayloadFilter,
    ) -> Result<Vec<VectorHit>, MemoraError>;

    /// Replaces the vector and/or payload of an existing record.
    async fn update(
        &self,
        id: &str,
        vector: Option<Vec<f32>>,
        payload: Option<Payload>,
    ) -> Result<(), MemoraError>;

    /// Removes a record.
    async fn delete(&self, id: &str) -> Result<(), MemoraError>;

    /// Fetches a record by id.
    async fn get(&self, id: &str) -> Result<VectorRecord, MemoraError>;

    /// Lists up to `limit` records matching `filter`.
    async fn list(
        &self,
        filter: &PayloadFilter,
        limit: usize,
    ) -> Result<Vec<VectorRecord>, MemoraError>;

    /// Describes the bound collection.
    async fn collection_info(&self) -> Result<CollectionInfo, MemoraError>;
}
