//! Response envelopes and status classification for the paged REST backend.

use crate::error::ScaffoldError;
use crate::record::Record;
use crate::transport::ApiResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of records plus the total match count for the active search filter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<Record>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_count: u64,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Record>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Record>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
struct GeneratedCode {
    code: String,
}

/// Turn a raw response into its body, or into a typed error for non-2xx statuses.
/// 409 becomes `Conflict` carrying the server's `message` when one is present.
pub fn classify(response: ApiResponse) -> Result<Value, ScaffoldError> {
    if response.is_success() {
        return Ok(response.body.unwrap_or(Value::Null));
    }
    let message = error_message(response.body.as_ref()).unwrap_or_default();
    if response.status == 409 {
        return Err(ScaffoldError::Conflict { message });
    }
    Err(ScaffoldError::Remote {
        status: response.status,
        message,
    })
}

/// `message` (or `title`, as ASP.NET problem details use) from an error payload; plain text bodies as-is.
pub fn error_message(body: Option<&Value>) -> Option<String> {
    match body? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("title"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

pub fn decode_paged(body: Value) -> Result<PagedResult, ScaffoldError> {
    if body.is_null() {
        return Ok(PagedResult::default());
    }
    Ok(serde_json::from_value(body)?)
}

pub fn decode_record(body: Value) -> Result<Record, ScaffoldError> {
    if body.is_null() {
        return Ok(Record::new());
    }
    Ok(serde_json::from_value(body)?)
}

pub fn decode_code(body: Value) -> Result<String, ScaffoldError> {
    if let Value::String(code) = body {
        return Ok(code);
    }
    let generated: GeneratedCode = serde_json::from_value(body)?;
    Ok(generated.code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: Value) -> ApiResponse {
        ApiResponse {
            status,
            body: Some(body),
        }
    }

    #[test]
    fn conflict_carries_server_message() {
        let err = classify(response(409, json!({ "message": "Code BR1 exists" }))).unwrap_err();
        assert!(matches!(err, ScaffoldError::Conflict { ref message } if message == "Code BR1 exists"));
    }

    #[test]
    fn other_failures_are_remote() {
        let err = classify(response(500, json!("boom"))).unwrap_err();
        assert!(matches!(err, ScaffoldError::Remote { status: 500, ref message } if message == "boom"));
    }

    #[test]
    fn paged_tolerates_missing_and_null_fields() {
        assert_eq!(decode_paged(json!({})).unwrap(), PagedResult::default());
        let page = decode_paged(json!({ "items": null, "totalCount": null })).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
    }

    #[test]
    fn code_accepts_object_or_string() {
        assert_eq!(decode_code(json!({ "code": "SC-0001" })).unwrap(), "SC-0001");
        assert_eq!(decode_code(json!("SC-0002")).unwrap(), "SC-0002");
    }
}
