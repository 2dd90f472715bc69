//! Blocking HTTP client for the vector index.

use std::thread;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use engram_core::config::VectorIndexConfig;
use engram_core::errors::{EngramResult, IndexError};

use crate::types::{
    DeleteRequest, FetchResponse, IndexMatch, QueryRequest, QueryResponse, UpdateRequest,
    UpsertRequest, VectorRecord,
};

/// Client over the remote index's HTTP API. Cheap to construct, holds no
/// state beyond the connection pool.
pub struct VectorIndexClient {
    client: reqwest::blocking::Client,
    config: VectorIndexConfig,
}

impl VectorIndexClient {
    pub fn new(config: VectorIndexConfig) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            config,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.config.namespace.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.endpoint.trim_end_matches('/'))
    }

    fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> EngramResult<R> {
        let request_id = uuid::Uuid::new_v4();
        debug!(%request_id, path, "index request");
        let response = self
            .client
            .post(self.url(path))
            .header("Api-Key", &self.config.api_key)
            .json(body)
            .send()
            .map_err(|e| IndexError::transport(e.to_string()))?;
        Self::decode(response)
    }

    fn get_json<R: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> EngramResult<R> {
        let response = self
            .client
            .get(self.url(path))
            .header("Api-Key", &self.config.api_key)
            .query(query)
            .send()
            .map_err(|e| IndexError::transport(e.to_string()))?;
        Self::decode(response)
    }

    fn decode<R: DeserializeOwned>(response: reqwest::blocking::Response) -> EngramResult<R> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(IndexError::Http { status: status.as_u16(), body }.into());
        }
        response
            .json()
            .map_err(|e| IndexError::transport(format!("decoding response: {e}")).into())
    }

    /// Insert or overwrite vectors in one call.
    pub fn upsert(&self, vectors: &[VectorRecord]) -> EngramResult<()> {
        let _: serde_json::Value = self.post(
            "/vectors/upsert",
            &UpsertRequest { vectors, namespace: self.namespace() },
        )?;
        Ok(())
    }

    /// Upsert in fixed-size batches with a pause between them, bounding
    /// request rate. A failure in any batch aborts the remaining ones.
    pub fn batch_upsert(&self, vectors: &[VectorRecord]) -> EngramResult<usize> {
        let batch_size = self.config.batch_size.max(1);
        let mut upserted = 0;
        for (i, batch) in vectors.chunks(batch_size).enumerate() {
            if i > 0 {
                thread::sleep(Duration::from_millis(self.config.batch_delay_ms));
            }
            self.upsert(batch)?;
            upserted += batch.len();
            debug!(batch = i, upserted, total = vectors.len(), "batch upserted");
        }
        Ok(upserted)
    }

    /// Ranked nearest-neighbor query.
    pub fn query(&self, mut request: QueryRequest) -> EngramResult<Vec<IndexMatch>> {
        if request.namespace.is_none() {
            request.namespace = self.config.namespace.clone();
        }
        let response: QueryResponse = self.post("/query", &request)?;
        Ok(response.matches)
    }

    pub fn delete_by_ids(&self, ids: &[String]) -> EngramResult<()> {
        let _: serde_json::Value = self.post(
            "/vectors/delete",
            &DeleteRequest {
                ids: Some(ids),
                filter: None,
                delete_all: None,
                namespace: self.namespace(),
            },
        )?;
        Ok(())
    }

    /// Delete every vector matching a metadata filter; the path entity
    /// deletion uses to drop all chunks via `originalId`.
    pub fn delete_by_filter(&self, filter: &serde_json::Value) -> EngramResult<()> {
        let _: serde_json::Value = self.post(
            "/vectors/delete",
            &DeleteRequest {
                ids: None,
                filter: Some(filter),
                delete_all: None,
                namespace: self.namespace(),
            },
        )?;
        Ok(())
    }

    pub fn delete_all(&self) -> EngramResult<()> {
        warn!("deleting all vectors in namespace {:?}", self.config.namespace);
        let _: serde_json::Value = self.post(
            "/vectors/delete",
            &DeleteRequest {
                ids: None,
                filter: None,
                delete_all: Some(true),
                namespace: self.namespace(),
            },
        )?;
        Ok(())
    }

    pub fn fetch(&self, ids: &[String]) -> EngramResult<FetchResponse> {
        self.get_json("/vectors/fetch", &[("ids", ids.join(","))])
    }

    /// Raw index statistics, passed through untyped.
    pub fn stats(&self) -> EngramResult<serde_json::Value> {
        self.get_json("/describe_index_stats", &[])
    }

    pub fn update_metadata(&self, id: &str, patch: &serde_json::Value) -> EngramResult<()> {
        let _: serde_json::Value =
            self.post("/vectors/update", &UpdateRequest { id, set_metadata: patch })?;
        Ok(())
    }
}

/// Filter matching every chunk derived from one entity.
pub fn original_id_filter(entity_id: &str) -> serde_json::Value {
    serde_json::json!({ "originalId": { "$eq": entity_id } })
}
