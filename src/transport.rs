//! Transport seam: one request in, one response out. The HTTP implementation injects
//! the bearer credential and tenant database header on every request.

use crate::error::{ConfigError, ScaffoldError};
use crate::settings::ClientSettings;
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

/// Header carrying the tenant database discriminator.
pub const TENANT_DB_HEADER: &str = "DbName";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, e.g. `/branches/paged`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; non-JSON text is kept as a string value.
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes requests. Non-2xx statuses are returned as responses, not errors;
/// only transport-level failures (and authentication) are errors here.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ScaffoldError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    db_name: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpTransport {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            db_name: None,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Self {
        let mut t = HttpTransport::new(settings.base_url.clone());
        t.token = settings.token.clone();
        t.db_name = settings.db_name.clone();
        t
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_db_name(mut self, db_name: impl Into<String>) -> Self {
        self.db_name = Some(db_name.into());
        self
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, ScaffoldError> {
        let raw = if request.path.starts_with("http://") || request.path.starts_with("https://") {
            request.path.clone()
        } else if request.path.starts_with('/') {
            format!("{}{}", self.base_url, request.path)
        } else {
            format!("{}/{}", self.base_url, request.path)
        };
        let mut url = Url::parse(&raw)
            .map_err(|e| ConfigError::Settings(format!("invalid url '{}': {}", raw, e)))?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &request.query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ScaffoldError> {
        let url = self.url_for(&request)?;
        tracing::debug!(method = ?request.method, url = %url, "request");

        let mut builder = self.client.request(request.method.into(), url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(db) = &self.db_name {
            builder = builder.header(TENANT_DB_HEADER, db);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        if status == 401 {
            tracing::warn!(path = %request.path, "authentication failed");
            return Err(ScaffoldError::Unauthorized);
        }
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
        };
        Ok(ApiResponse { status, body })
    }
}
