//! Wire contracts for the platform status endpoint and the query service.
//!
//! These types mirror the JSON exchanged over HTTP and are shared between the
//! HTTP client and anything that needs to fabricate payloads in tests. Field
//! names follow the remote services (camelCase for the query service).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default public status document.
pub const DEFAULT_STATUS_URL: &str = "https://status.dynatrace.com/api/v2/status.json";

/// Human-facing status page used as a fallback link when the document can't be loaded.
pub const DEFAULT_STATUS_PAGE_URL: &str = "https://dynatrace.status.io/";

/// Path of the synchronous query endpoint, relative to the environment URL.
pub const QUERY_EXECUTE_PATH: &str = "platform/storage/query/v1/query:execute";

/// Body of `GET /api/v2/status.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusDocument {
    pub status: StatusSummary,
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
}

/// Roll-up indicator for the whole platform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    /// One of `none`, `minor`, `major`, `critical`; anything else is tolerated.
    pub indicator: String,
    #[serde(default)]
    pub description: String,
}

/// Status of a single platform component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentEntry {
    pub name: String,
    pub status: String,
}

/// Request payload for `query:execute`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    /// Query text, passed through verbatim.
    pub query: String,
    pub request_timeout_milliseconds: u64,
    pub enable_preview: bool,
}

/// Response payload for `query:execute`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ExecutionState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultPayload>,
}

/// Lifecycle state reported alongside a query response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionState {
    NotStarted,
    Running,
    Succeeded,
    ResultGone,
    Cancelled,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Result section of a query response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultPayload {
    /// Records in service order. The service may emit `null` placeholders.
    #[serde(default)]
    pub records: Vec<Option<Map<String, Value>>>,
}

/// Error envelope returned by platform APIs on failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ServiceError,
}

/// Structured service error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceError {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_document_without_components() {
        let doc: StatusDocument = serde_json::from_value(json!({
            "page": { "id": "x", "name": "Dynatrace" },
            "status": { "indicator": "none", "description": "All Systems Operational" }
        }))
        .expect("status document");

        assert_eq!(doc.status.indicator, "none");
        assert!(doc.components.is_empty());
    }

    #[test]
    fn status_document_requires_status_block() {
        let result = serde_json::from_value::<StatusDocument>(json!({ "components": [] }));
        assert!(result.is_err());
    }

    #[test]
    fn execute_request_uses_camel_case() {
        let request = ExecuteRequest {
            query: "fetch logs".to_string(),
            request_timeout_milliseconds: 30_000,
            enable_preview: true,
        };

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            json!({
                "query": "fetch logs",
                "requestTimeoutMilliseconds": 30000,
                "enablePreview": true
            })
        );
    }

    #[test]
    fn execute_response_keeps_record_key_order() {
        let raw = r#"{"state":"SUCCEEDED","result":{"records":[{"zeta":1,"alpha":2},null]}}"#;
        let response: ExecuteResponse = serde_json::from_str(raw).expect("response");

        assert_eq!(response.state, Some(ExecutionState::Succeeded));
        let records = response.result.expect("result").records;
        let first = records[0].as_ref().expect("first record");
        let keys: Vec<&str> = first.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha"]);
        assert!(records[1].is_none());
    }

    #[test]
    fn unknown_execution_state_is_tolerated() {
        let response: ExecuteResponse =
            serde_json::from_str(r#"{"state":"SOMETHING_NEW"}"#).expect("response");
        assert_eq!(response.state, Some(ExecutionState::Unknown));
        assert!(response.result.is_none());
    }
}
