//! Option lists for select fields (`GET {options_url}` returning an array of records).

use crate::config::OptionsSource;
use crate::error::ScaffoldError;
use crate::record::{OptionKey, RecordId};
use crate::response::classify;
use crate::transport::{ApiRequest, Method, Transport};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub key: OptionKey,
    pub label: String,
}

#[derive(Clone)]
pub struct LookupClient {
    transport: Arc<dyn Transport>,
}

impl LookupClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        LookupClient { transport }
    }

    /// Entries without a usable value key are skipped; a missing label falls back to the key.
    pub async fn fetch_options(&self, source: &OptionsSource) -> Result<Vec<SelectOption>, ScaffoldError> {
        let req = ApiRequest::new(Method::Get, source.url.clone());
        let body = classify(self.transport.execute(req).await?)?;
        Ok(parse_options(&body, &source.value_key, &source.label_key))
    }
}

pub fn parse_options(body: &Value, value_key: &str, label_key: &str) -> Vec<SelectOption> {
    let Some(entries) = body.as_array() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let key = RecordId::from_value(entry.get(value_key)?)?;
            let label = match entry.get(label_key) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => key.to_string(),
                Some(other) => other.to_string(),
            };
            Some(SelectOption { key, label })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryBackend;
    use serde_json::json;

    #[test]
    fn parses_configured_keys() {
        let body = json!([
            { "id": 1, "code": "KG" },
            { "id": "g-2", "code": null },
            { "code": "orphan" }
        ]);
        let opts = parse_options(&body, "id", "code");
        assert_eq!(
            opts,
            vec![
                SelectOption { key: RecordId::Int(1), label: "KG".into() },
                SelectOption { key: RecordId::Text("g-2".into()), label: "g-2".into() },
            ]
        );
    }

    #[test]
    fn non_array_body_yields_nothing() {
        assert!(parse_options(&json!({ "items": [] }), "id", "name").is_empty());
    }

    #[tokio::test]
    async fn fetches_from_options_url() {
        let backend = MemoryBackend::new("/users");
        backend.with_lookup("/roles", json!([{ "id": 1, "name": "Admin" }]));
        let lookups = LookupClient::new(backend.clone());
        let source = OptionsSource {
            url: "/roles".into(),
            value_key: "id".into(),
            label_key: "name".into(),
        };
        let opts = lookups.fetch_options(&source).await.unwrap();
        assert_eq!(opts.len(), 1);
        assert_eq!(opts[0].label, "Admin");
    }
}
