// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed vector store with vector BLOB storage and brute-force search.

use async_trait::async_trait;
use memora_core::{
    AdapterType, CollectionInfo, HealthStatus, MemoraError, Payload, PayloadFilter, PluginAdapter,
    VectorHit, VectorRecord, VectorStoreAdapter,
};
use rusqlite::params;
use tracing::debug;

use super::{blob_to_vec, check_dimensions, rank, vec_to_blob};
use crate::database::{Database, map_tr_err};

/// Raw row as read from the `vectors` table.
type RawRow = (String, Vec<u8>, String);

/// Persistent vector store bound to one collection of the `vectors` table.
///
/// Embeddings are stored as little-endian f32 BLOBs and payloads as JSON
/// text. Search loads every row of the collection and ranks by cosine
/// similarity, which is adequate for the per-user memory sizes this store
/// targets.
pub struct SqliteVectorStore {
    db: Database,
    collection: String,
}

impl SqliteVectorStore {
    pub fn new(db: Database, collection_name: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection_name.into(),
        }
    }

    /// Dimension of the bound collection, or an error if it was never created.
    async fn dimensions(&self) -> Result<usize, MemoraError> {
        let name = self.collection.clone();
        let dims: Option<i64> = self
            .db
            .connection()
            .call(move |conn| {
                let result = conn.query_row(
                    "SELECT dimensions FROM collections WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                );
                match result {
                    Ok(d) => Ok(Some(d)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(map_tr_err)?;

        dims.map(|d| d as usize)
            .ok_or_else(|| MemoraError::VectorStore {
                message: format!("collection '{}' has not been created", self.collection),
                source: None,
            })
    }

    async fn fetch_rows(&self, id: Option<String>) -> Result<Vec<RawRow>, MemoraError> {
        let name = self.collection.clone();
        self.db
            .connection()
            .call(move |conn| {
                let rows = match id {
                    Some(id) => {
                        let mut stmt = conn.prepare(
                            "SELECT id, embedding, payload FROM vectors
                             WHERE collection = ?1 AND id = ?2",
                        )?;
                        stmt.query_map(params![name, id], |row| {
                            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                        })?
                        .collect::<Result<Vec<RawRow>, _>>()?
                    }
                    None => {
                        let mut stmt = conn.prepare(
                            "SELECT id, embedding, payload FROM vectors
                             WHERE collection = ?1 ORDER BY id",
                        )?;
                        stmt.query_map(params![name], |row| {
                            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                        })?
                        .collect::<Result<Vec<RawRow>, _>>()?
                    }
                };
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn all_records(&self) -> Result<Vec<VectorRecord>, MemoraError> {
        self.fetch_rows(None)
            .await?
            .into_iter()
            .map(row_to_record)
            .collect()
    }
}

fn row_to_record((id, blob, payload): RawRow) -> Result<VectorRecord, MemoraError> {
    let payload: Payload =
        serde_json::from_str(&payload).map_err(|e| MemoraError::VectorStore {
            message: format!("corrupt payload for vector {id}"),
            source: Some(Box::new(e)),
        })?;
    Ok(VectorRecord {
        id,
        vector: blob_to_vec(&blob),
        payload,
    })
}

fn encode_payload(payload: &Payload) -> Result<String, MemoraError> {
    serde_json::to_string(payload).map_err(|e| MemoraError::VectorStore {
        message: "payload is not serializable".to_string(),
        source: Some(Box::new(e)),
    })
}

#[async_trait]
impl PluginAdapter for SqliteVectorStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorStore
    }

    /// Unhealthy when the database is unreachable, degraded while the bound
    /// collection has not been created yet.
    async fn health_check(&self) -> Result<HealthStatus, MemoraError> {
        Ok(match self.dimensions().await {
            Ok(_) => HealthStatus::Healthy,
            Err(MemoraError::Storage { source }) => HealthStatus::Unhealthy(source.to_string()),
            Err(e) => HealthStatus::Degraded(e.to_string()),
        })
    }
}

#[async_trait]
impl VectorStoreAdapter for SqliteVectorStore {
    async fn create_collection(&self, dimensions: usize) -> Result<(), MemoraError> {
        let name = self.collection.clone();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT OR IGNORE INTO collections (name, dimensions) VALUES (?1, ?2)",
                    params![name, dimensions as i64],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        let existing = self.dimensions().await?;
        if existing != dimensions {
            return Err(MemoraError::VectorStore {
                message: format!(
                    "collection '{}' already exists with {existing} dimensions, requested {dimensions}",
                    self.collection
                ),
                source: None,
            });
        }
        debug!(collection = %self.collection, dimensions, "vector collection ready");
        Ok(())
    }

    async fn insert(&self, records: Vec<VectorRecord>) -> Result<(), MemoraError> {
        let dims = self.dimensions().await?;
        let mut rows = Vec::with_capacity(records.len());
        for record in &records {
            check_dimensions(dims, &record.vector)?;
            rows.push((
                record.id.clone(),
                vec_to_blob(&record.vector),
                encode_payload(&record.payload)?,
            ));
        }

        let name = self.collection.clone();
        self.db
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;
                for (id, blob, payload) in &rows {
                    tx.execute(
                        "INSERT OR REPLACE INTO vectors (collection, id, embedding, payload, updated_at)
                         VALUES (?1, ?2, ?3, ?4, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                        params![name, id, blob, payload],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn search(
        &self,
        query: &[f32],
        limit: usize,
        filter: &PayloadFilter,
    ) -> Result<Vec<VectorHit>, MemoraError> {
        let dims = self.dimensions().await?;
        check_dimensions(dims, query)?;
        let records = self.all_records().await?;
        Ok(rank(records, query, limit, filter))
    }

    async fn update(
        &self,
        id: &str,
        vector: Option<Vec<f32>>,
        payload: Option<Payload>,
    ) -> Result<(), MemoraError> {
        if let Some(v) = &vector {
            check_dimensions(self.dimensions().await?, v)?;
        }
        let blob = vector.as_deref().map(vec_to_blob);
        let payload = payload.as_ref().map(encode_payload).transpose()?;

        let name = self.collection.clone();
        let row_id = id.to_string();
        let changed = self
            .db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE vectors SET
                        embedding = COALESCE(?3, embedding),
                        payload = COALESCE(?4, payload),
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE collection = ?1 AND id = ?2",
                    params![name, row_id, blob, payload],
                )
            })
            .await
            .map_err(map_tr_err)?;

        if changed == 0 {
            return Err(MemoraError::memory_not_found(id));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), MemoraError> {
        let name = self.collection.clone();
        let row_id = id.to_string();
        let changed = self
            .db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "DELETE FROM vectors WHERE collection = ?1 AND id = ?2",
                    params![name, row_id],
                )
            })
            .await
            .map_err(map_tr_err)?;

        if changed == 0 {
            return Err(MemoraError::memory_not_found(id));
        }
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<VectorRecord, MemoraError> {
        let row = self
            .fetch_rows(Some(id.to_string()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MemoraError::memory_not_found(id))?;
        row_to_record(row)
    }

    async fn list(
        &self,
        filter: &PayloadFilter,
        limit: usize,
    ) -> Result<Vec<VectorRecord>, MemoraError> {
        let mut records: Vec<VectorRecord> = self
            .all_records()
            .await?
            .into_iter()
            .filter(|r| filter.matches(&r.payload))
            .collect();
        records.truncate(limit);
        Ok(records)
    }

    async fn collection_info(&self) -> Result<CollectionInfo, MemoraError> {
        let dimensions = self.dimensions().await?;
        let name = self.collection.clone();
        let count: i64 = self
            .db
            .connection()
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM vectors WHERE collection = ?1",
                    params![name],
                    |row| row.get(0),
                )
            })
            .await
            .map_err(map_tr_err)?;
        Ok(CollectionInfo {
            name: self.collection.clone(),
            dimensions,
            count: count as usize,
        })
    }
}
