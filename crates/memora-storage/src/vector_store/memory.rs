// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ephemeral vector store held entirely in process memory.

use std::collections::HashMap;

use async_trait::async_trait;
use memora_core::{
    AdapterType, CollectionInfo, MemoraError, Payload, PayloadFilter, PluginAdapter, VectorHit,
    VectorRecord, VectorStoreAdapter,
};
use tokio::sync::RwLock;

use super::{check_dimensions, rank};

struct Collection {
    dimensions: usize,
    records: HashMap<String, VectorRecord>,
}

/// Vector store over a `RwLock<HashMap>`. Contents are lost on drop.
pub struct InMemoryVectorStore {
    name: String,
    inner: RwLock<Option<Collection>>,
}

impl InMemoryVectorStore {
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            name: collection_name.into(),
            inner: RwLock::new(None),
        }
    }

    fn not_created(&self) -> MemoraError {
        MemoraError::VectorStore {
            message: format!("collection '{}' has not been created", self.name),
            source: None,
        }
    }
}

impl PluginAdapter for InMemoryVectorStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorStore
    }
}

#[async_trait]
impl VectorStoreAdapter for InMemoryVectorStore {
    async fn create_collection(&self, dimensions: usize) -> Result<(), MemoraError> {
        let mut inner = self.inner.write().await;
        match inner.as_ref() {
            Some(existing) if existing.dimensions != dimensions => {
                Err(MemoraError::VectorStore {
                    message: format!(
                        "collection '{}' already exists with {} dimensions, requested {dimensions}",
                        self.name, existing.dimensions
                    ),
                    source: None,
                })
            }
            Some(_) => Ok(()),
            None => {
                *inner = Some(Collection {
                    dimensions,
                    records: HashMap::new(),
                });
                Ok(())
            }
        }
    }

    async fn insert(&self, records: Vec<VectorRecord>) -> Result<(), MemoraError> {
        let mut inner = self.inner.write().await;
        let collection = inner.as_mut().ok_or_else(|| self.not_created())?;
        for record in &records {
            check_dimensions(collection.dimensions, &record.vector)?;
        }
        for record in records {
            collection.records.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &[f32],
        limit: usize,
        filter: &PayloadFilter,
    ) -> Result<Vec<VectorHit>, MemoraError> {
        let inner = self.inner.read().await;
        let collection = inner.as_ref().ok_or_else(|| self.not_created())?;
        check_dimensions(collection.dimensions, query)?;
        Ok(rank(
            collection.records.values().cloned(),
            query,
            limit,
            filter,
        ))
    }

    async fn update(
        &self,
        id: &str,
        vector: Option<Vec<f32>>,
        payload: Option<Payload>,
    ) -> Result<(), MemoraError> {
        let mut inner = self.inner.write().await;
        let collection = inner.as_mut().ok_or_else(|| self.not_created())?;
        if let Some(v) = &vector {
            check_dimensions(collection.dimensions, v)?;
        }
        let record = collection
            .records
            .get_mut(id)
            .ok_or_else(|| MemoraError::memory_not_found(id))?;
        if let Some(v) = vector {
            record.vector = v;
        }
        if let Some(p) = payload {
            record.payload = p;
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), MemoraError> {
        let mut inner = self.inner.write().await;
        let collection = inner.as_mut().ok_or_else(|| self.not_created())?;
        collection
            .records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| MemoraError::memory_not_found(id))
    }

    async fn get(&self, id: &str) -> Result<VectorRecord, MemoraError> {
        let inner = self.inner.read().await;
        let collection = inner.as_ref().ok_or_else(|| self.not_created())?;
        collection
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| MemoraError::memory_not_found(id))
    }

    async fn list(
        &self,
        filter: &PayloadFilter,
        limit: usize,
    ) -> Result<Vec<VectorRecord>, MemoraError> {
        let inner = self.inner.read().await;
        let collection = inner.as_ref().ok_or_else(|| self.not_created())?;
        let mut records: Vec<VectorRecord> = collection
            .records
            .values()
            .filter(|r| filter.matches(&r.payload))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records.truncate(limit);
        Ok(records)
    }

    async fn collection_info(&self) -> Result<CollectionInfo, MemoraError> {
        let inner = self.inner.read().await;
        let collection = inner.as_ref().ok_or_else(|| self.not_created())?;
        Ok(CollectionInfo {
            name: self.name.clone(),
            dimensions: collection.dimensions,
            count: collection.records.len(),
        })
    }
}
