//! Generic paged CRUD client built per entity from its base path.

use crate::config::EntitySchema;
use crate::error::{ConfigError, ScaffoldError};
use crate::record::{Record, RecordId};
use crate::response::{classify, decode_code, decode_paged, decode_record, PagedResult};
use crate::transport::{ApiRequest, Method, Transport};
use std::sync::Arc;
use url::Url;

/// Seed sent to the code generator when the caller does not supply one.
pub const DEFAULT_CODE_SEED: &str = "MAIN";

pub const CODE_GENERATE_PATH: &str = "/code/generate";

/// Uniform async operation set for one entity. Failures propagate unchanged:
/// no retry, no caching.
#[derive(Clone)]
pub struct CrudClient {
    transport: Arc<dyn Transport>,
    base_path: String,
    entity_tag: Option<String>,
}

impl CrudClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        base_path: impl Into<String>,
        entity_tag: Option<String>,
    ) -> Self {
        CrudClient {
            transport,
            base_path: base_path.into().trim_end_matches('/').to_string(),
            entity_tag,
        }
    }

    pub fn for_entity(transport: Arc<dyn Transport>, schema: &EntitySchema) -> Self {
        CrudClient::new(transport, schema.base_path.clone(), schema.entity_tag.clone())
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn supports_code_generation(&self) -> bool {
        self.entity_tag.is_some()
    }

    /// `page` is 1-based here; callers holding a 0-based page index add one.
    pub async fn list_paged(
        &self,
        page: u32,
        page_size: u32,
        search: &str,
    ) -> Result<PagedResult, ScaffoldError> {
        if page == 0 || page_size == 0 {
            return Err(ConfigError::Validation(format!(
                "page and page size must be at least 1 (got page={}, page_size={})",
                page, page_size
            ))
            .into());
        }
        let req = ApiRequest::new(Method::Get, format!("{}/paged", self.base_path))
            .query("page", page)
            .query("pageSize", page_size)
            .query("search", search);
        let body = classify(self.transport.execute(req).await?)?;
        decode_paged(body)
    }

    pub async fn get_by_id(&self, id: &RecordId) -> Result<Record, ScaffoldError> {
        let req = ApiRequest::new(Method::Get, self.item_path(id)?);
        decode_record(classify(self.transport.execute(req).await?)?)
    }

    /// The server assigns `id` and server-owned fields; the returned record carries them.
    pub async fn create(&self, record: &Record) -> Result<Record, ScaffoldError> {
        let req = ApiRequest::new(Method::Post, self.base_path.clone()).json(record.clone().into_value());
        let created = decode_record(classify(self.transport.execute(req).await?)?)?;
        tracing::info!(path = %self.base_path, id = ?created.id(), "record created");
        Ok(created)
    }

    pub async fn update(&self, id: &RecordId, record: &Record) -> Result<Record, ScaffoldError> {
        let req = ApiRequest::new(Method::Put, self.item_path(id)?).json(record.clone().into_value());
        let updated = decode_record(classify(self.transport.execute(req).await?)?)?;
        tracing::info!(path = %self.base_path, id = %id, "record updated");
        Ok(updated)
    }

    pub async fn remove(&self, id: &RecordId) -> Result<(), ScaffoldError> {
        let req = ApiRequest::new(Method::Delete, self.item_path(id)?);
        classify(self.transport.execute(req).await?)?;
        tracing::info!(path = %self.base_path, id = %id, "record deleted");
        Ok(())
    }

    /// Ask the server for the next code; only available when built with an entity tag.
    pub async fn generate_code(&self, seed: Option<&str>) -> Result<String, ScaffoldError> {
        let tag = self
            .entity_tag
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEntityTag(self.base_path.clone()))?;
        let req = ApiRequest::new(Method::Get, CODE_GENERATE_PATH)
            .query("storeCode", seed.unwrap_or(DEFAULT_CODE_SEED))
            .query("entityType", tag);
        decode_code(classify(self.transport.execute(req).await?)?)
    }

    /// Text ids are percent-encoded as a single path segment.
    fn item_path(&self, id: &RecordId) -> Result<String, ScaffoldError> {
        let segment = match id {
            RecordId::Int(n) => n.to_string(),
            RecordId::Text(s) => {
                let mut scratch = Url::parse("http://localhost/")
                    .map_err(|e| ConfigError::Validation(format!("record id '{}': {}", s, e)))?;
                scratch
                    .path_segments_mut()
                    .map_err(|_| ConfigError::Validation(format!("record id '{}' cannot be encoded", s)))?
                    .pop_if_empty()
                    .push(s);
                scratch.path().trim_start_matches('/').to_string()
            }
        };
        Ok(format!("{}/{}", self.base_path, segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryBackend;
    use serde_json::json;

    fn client(backend: &Arc<MemoryBackend>, tag: Option<&str>) -> CrudClient {
        CrudClient::new(backend.clone(), "/branches", tag.map(str::to_string))
    }

    #[tokio::test]
    async fn list_paged_sends_one_based_page_and_search() {
        let backend = MemoryBackend::seeded("/branches", 37);
        let c = client(&backend, None);
        let page = c.list_paged(2, 10, "").await.unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total_count, 37);
        let last = backend.last_request().unwrap();
        assert_eq!(last.path, "/branches/paged");
        assert!(last.query.contains(&("page".into(), "2".into())));
        assert!(last.query.contains(&("pageSize".into(), "10".into())));
        assert!(last.query.contains(&("search".into(), "".into())));
    }

    #[tokio::test]
    async fn list_paged_rejects_zero_page() {
        let backend = MemoryBackend::seeded("/branches", 1);
        let err = client(&backend, None).list_paged(0, 10, "").await.unwrap_err();
        assert!(matches!(err, ScaffoldError::Config(_)));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn create_returns_server_assigned_id() {
        let backend = MemoryBackend::new("/branches");
        let c = client(&backend, None);
        let record = Record::from_value(json!({ "code": "BR1", "name": "Main" })).unwrap();
        let created = c.create(&record).await.unwrap();
        assert!(created.id().is_some());
        assert!(created.get("createdAt").is_some());
        let fetched = c.get_by_id(&created.id().unwrap()).await.unwrap();
        assert_eq!(fetched.str("code"), Some("BR1"));
    }

    #[tokio::test]
    async fn update_and_remove_hit_item_path() {
        let backend = MemoryBackend::seeded("/branches", 3);
        let c = client(&backend, None);
        let id = RecordId::Int(2);
        let patch = Record::from_value(json!({ "code": "X", "name": "Renamed" })).unwrap();
        let updated = c.update(&id, &patch).await.unwrap();
        assert_eq!(updated.str("name"), Some("Renamed"));
        assert_eq!(backend.last_request().unwrap().path, "/branches/2");
        c.remove(&id).await.unwrap();
        assert_eq!(backend.len(), 2);
    }

    #[tokio::test]
    async fn text_ids_stay_one_path_segment() {
        let backend = MemoryBackend::seeded("/branches", 1);
        let c = client(&backend, None);
        let _ = c.remove(&RecordId::Text("a/../x?y#z".into())).await;
        assert_eq!(backend.last_request().unwrap().path, "/branches/a%2F..%2Fx%3Fy%23z");
        let _ = c.get_by_id(&RecordId::Text("BR 1".into())).await;
        assert_eq!(backend.last_request().unwrap().path, "/branches/BR%201");
    }

    #[tokio::test]
    async fn transport_failures_propagate_unchanged() {
        let backend = MemoryBackend::seeded("/branches", 3);
        backend.fail_next(503, json!({ "message": "down" }));
        let err = client(&backend, None).list_paged(1, 10, "").await.unwrap_err();
        assert!(matches!(err, ScaffoldError::Remote { status: 503, .. }));
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn generate_code_requires_entity_tag() {
        let backend = MemoryBackend::new("/branches");
        let err = client(&backend, None).generate_code(None).await.unwrap_err();
        assert!(matches!(
            err,
            ScaffoldError::Config(ConfigError::MissingEntityTag(_))
        ));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn generate_code_sends_seed_and_tag() {
        let backend = MemoryBackend::new("/branches");
        let code = client(&backend, Some("BRANCH")).generate_code(None).await.unwrap();
        assert_eq!(code, "BRANCH-0001");
        let last = backend.last_request().unwrap();
        assert_eq!(last.path, CODE_GENERATE_PATH);
        assert!(last.query.contains(&("storeCode".into(), DEFAULT_CODE_SEED.into())));
        assert!(last.query.contains(&("entityType".into(), "BRANCH".into())));
    }
}
