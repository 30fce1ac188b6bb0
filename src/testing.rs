//! In-memory REST backend used by unit tests. Follows the paged CRUD conventions,
//! records every request and can be told to fail or stall.

use crate::error::ScaffoldError;
use crate::record::{Record, RecordId};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct State {
    records: BTreeMap<i64, Record>,
    next_id: i64,
    next_code: u32,
    lookups: HashMap<String, Value>,
    failing: HashMap<String, (u16, Value)>,
    fail_next: Option<(u16, Value)>,
    delays: HashMap<String, Duration>,
    requests: Vec<ApiRequest>,
}

pub struct MemoryBackend {
    base_path: String,
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new(base_path: &str) -> Arc<Self> {
        Arc::new(MemoryBackend {
            base_path: base_path.to_string(),
            state: Mutex::new(State {
                next_id: 1,
                ..State::default()
            }),
        })
    }

    /// `count` records with ids 1..=count, codes `C001`.. and names `Record 1`..
    pub fn seeded(base_path: &str, count: i64) -> Arc<Self> {
        let backend = MemoryBackend::new(base_path);
        for i in 1..=count {
            backend.insert(json!({ "code": format!("C{:03}", i), "name": format!("Record {}", i) }));
        }
        backend
    }

    pub fn insert(&self, value: Value) -> Record {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        let mut record = Record::from_value(value).unwrap_or_default();
        record.set("id", json!(id));
        record.set("createdAt", json!("2024-03-05T09:07:00"));
        state.records.insert(id, record.clone());
        record
    }

    pub fn with_lookup(&self, path: &str, options: Value) {
        self.lock().lookups.insert(path.to_string(), options);
    }

    pub fn fail_path(&self, path: &str, status: u16, body: Value) {
        self.lock().failing.insert(path.to_string(), (status, body));
    }

    pub fn fail_next(&self, status: u16, body: Value) {
        self.lock().fail_next = Some((status, body));
    }

    pub fn delay(&self, path: &str, delay: Duration) {
        self.lock().delays.insert(path.to_string(), delay);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.lock().requests.last().cloned()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn record(&self, id: i64) -> Option<Record> {
        self.lock().records.get(&id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn handle(&self, state: &mut State, req: &ApiRequest) -> ApiResponse {
        if let Some((status, body)) = state.fail_next.take() {
            return reply(status, body);
        }
        if let Some((status, body)) = state.failing.get(&req.path) {
            return reply(*status, body.clone());
        }
        if req.path == "/code/generate" {
            state.next_code += 1;
            let tag = query(req, "entityType").unwrap_or_default();
            return reply(200, json!({ "code": format!("{}-{:04}", tag, state.next_code) }));
        }
        if let Some(options) = state.lookups.get(&req.path) {
            return reply(200, options.clone());
        }

        let paged = format!("{}/paged", self.base_path);
        if req.path == paged && req.method == Method::Get {
            return list(state, req);
        }
        if req.path == self.base_path && req.method == Method::Post {
            let mut record = req
                .body
                .clone()
                .and_then(Record::from_value)
                .unwrap_or_default();
            if let Some(conflict) = code_conflict(state, &record, None) {
                return conflict;
            }
            let id = state.next_id;
            state.next_id += 1;
            record.set("id", json!(id));
            record.set("createdAt", json!("2024-03-05T09:07:00"));
            state.records.insert(id, record.clone());
            return reply(201, record.into_value());
        }

        let prefix = format!("{}/", self.base_path);
        let Some(raw_id) = req.path.strip_prefix(&prefix) else {
            return reply(404, json!({ "message": "no route" }));
        };
        let Ok(id) = raw_id.parse::<i64>() else {
            return reply(404, json!({ "message": "bad id" }));
        };
        match req.method {
            Method::Get => match state.records.get(&id) {
                Some(r) => reply(200, r.clone().into_value()),
                None => reply(404, json!({ "message": "not found" })),
            },
            Method::Put => {
                let Some(existing) = state.records.get(&id).cloned() else {
                    return reply(404, json!({ "message": "not found" }));
                };
                let patch = req.body.clone().and_then(Record::from_value).unwrap_or_default();
                if let Some(conflict) = code_conflict(state, &patch, Some(id)) {
                    return conflict;
                }
                let mut merged = existing;
                for (k, v) in patch.fields() {
                    merged.set(k.clone(), v.clone());
                }
                merged.set("id", json!(id));
                state.records.insert(id, merged.clone());
                reply(200, merged.into_value())
            }
            Method::Delete => match state.records.remove(&id) {
                Some(_) => ApiResponse {
                    status: 204,
                    body: None,
                },
                None => reply(404, json!({ "message": "not found" })),
            },
            Method::Post => reply(405, json!({ "message": "method not allowed" })),
        }
    }
}

fn reply(status: u16, body: Value) -> ApiResponse {
    ApiResponse {
        status,
        body: Some(body),
    }
}

fn query(req: &ApiRequest, key: &str) -> Option<String> {
    req.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
}

fn code_conflict(state: &State, record: &Record, except: Option<i64>) -> Option<ApiResponse> {
    let code = record.str("code")?;
    let taken = state
        .records
        .iter()
        .any(|(id, r)| Some(*id) != except && r.str("code") == Some(code));
    taken.then(|| reply(409, json!({ "message": format!("Code {} already exists", code) })))
}

fn list(state: &State, req: &ApiRequest) -> ApiResponse {
    let page: usize = query(req, "page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let size: usize = query(req, "pageSize").and_then(|p| p.parse().ok()).unwrap_or(10);
    let search = query(req, "search").unwrap_or_default().to_lowercase();
    let matches: Vec<&Record> = state
        .records
        .values()
        .filter(|r| {
            search.is_empty()
                || r.fields()
                    .any(|(_, v)| v.as_str().map(|s| s.to_lowercase().contains(&search)).unwrap_or(false))
        })
        .collect();
    let items: Vec<Value> = matches
        .iter()
        .skip(page.saturating_sub(1) * size)
        .take(size)
        .map(|r| (*r).clone().into_value())
        .collect();
    reply(200, json!({ "items": items, "totalCount": matches.len() }))
}

#[async_trait]
impl Transport for MemoryBackend {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ScaffoldError> {
        let delay = {
            let mut state = self.lock();
            state.requests.push(request.clone());
            state.delays.get(&request.path).copied()
        };
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        let mut state = self.lock();
        Ok(self.handle(&mut state, &request))
    }
}

/// Wrap an id for assertions.
pub fn id(n: i64) -> RecordId {
    RecordId::Int(n)
}
