mod error;

use std::sync::Arc;

use console_interface::{
    ComponentStatus, FetchError, Indicator, QueryError, QueryRecord, QueryRequest, QueryService,
    StatusSnapshot, StatusSource,
};
use futures::{FutureExt, future::BoxFuture};
use reqwest::{Client, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};
use url::Url;

use dt_protocol::{
    DEFAULT_STATUS_URL, ErrorEnvelope, ExecuteRequest, ExecuteResponse, ExecutionState,
    QUERY_EXECUTE_PATH, StatusDocument,
};

pub use error::ClientError;

/// Connection settings for [`PlatformClients`].
#[derive(Clone, Debug)]
pub struct ClientSettings {
    pub status_url: String,
    /// Base URL of the environment hosting the query service.
    pub environment_url: Option<String>,
    /// Session token forwarded as a bearer token to the query service.
    pub platform_token: Option<String>,
    pub use_system_proxy: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            status_url: DEFAULT_STATUS_URL.to_string(),
            environment_url: None,
            platform_token: None,
            use_system_proxy: true,
        }
    }
}

#[derive(Clone)]
pub struct PlatformClients {
    transport: Arc<Transport>,
    status_url: Url,
    query_url: Option<Url>,
}

impl PlatformClients {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        let status_url = Url::parse(&settings.status_url)?;
        let query_url = settings
            .environment_url
            .as_deref()
            .map(|raw| Ok::<_, ClientError>(normalize_base_url(raw)?.join(QUERY_EXECUTE_PATH)?))
            .transpose()?;

        let mut builder =
            Client::builder().user_agent(concat!("dt-console/", env!("CARGO_PKG_VERSION")));
        if !settings.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self {
            transport: Arc::new(Transport {
                client,
                token: settings.platform_token.clone(),
            }),
            status_url,
            query_url,
        })
    }

    pub fn status_source(&self) -> Arc<dyn StatusSource> {
        Arc::new(HttpStatusSource {
            transport: Arc::clone(&self.transport),
            url: self.status_url.clone(),
        })
    }

    pub fn query_service(&self) -> Arc<dyn QueryService> {
        match &self.query_url {
            Some(url) => Arc::new(HttpQueryService {
                transport: Arc::clone(&self.transport),
                url: url.clone(),
            }),
            None => Arc::new(UnconfiguredQueryService),
        }
    }

    pub fn query_url(&self) -> Option<&Url> {
        self.query_url.as_ref()
    }
}

struct Transport {
    client: Client,
    token: Option<String>,
}

impl Transport {
    async fn get<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ClientError> {
        let response = self.client.get(url.clone()).send().await?;
        decode_response(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<T, ClientError> {
        let mut request = self.client.post(url.clone()).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        });
    }
    Ok(serde_json::from_slice(&body)?)
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

fn normalize_base_url(raw: &str) -> Result<Url, ClientError> {
    let mut parsed = Url::parse(raw)?;
    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }
    Ok(parsed)
}

struct HttpStatusSource {
    transport: Arc<Transport>,
    url: Url,
}

impl StatusSource for HttpStatusSource {
    fn fetch_status(&self) -> BoxFuture<'_, Result<StatusSnapshot, FetchError>> {
        async move {
            debug!(target: "status_client", url = %self.url, "fetching status document");
            let document: StatusDocument = self.transport.get(&self.url).await?;
            Ok(map_status_to_snapshot(document))
        }
        .boxed()
    }
}

struct HttpQueryService {
    transport: Arc<Transport>,
    url: Url,
}

impl QueryService for HttpQueryService {
    fn execute(
        &self,
        request: QueryRequest,
    ) -> BoxFuture<'_, Result<Vec<QueryRecord>, QueryError>> {
        async move {
            let payload = ExecuteRequest {
                query: request.query,
                request_timeout_milliseconds: request.request_timeout_ms,
                enable_preview: request.enable_preview,
            };
            let response: ExecuteResponse = self.transport.post(&self.url, &payload).await?;
            Ok(map_records(response))
        }
        .boxed()
    }
}

struct UnconfiguredQueryService;

impl QueryService for UnconfiguredQueryService {
    fn execute(
        &self,
        _request: QueryRequest,
    ) -> BoxFuture<'_, Result<Vec<QueryRecord>, QueryError>> {
        futures::future::ready(Err(QueryError::Unconfigured)).boxed()
    }
}

fn map_status_to_snapshot(document: StatusDocument) -> StatusSnapshot {
    let components = document
        .components
        .into_iter()
        .map(|component| ComponentStatus::new(component.name, component.status))
        .collect();

    StatusSnapshot::new(
        Indicator::parse(&document.status.indicator),
        document.status.description,
        components,
    )
}

fn map_records(response: ExecuteResponse) -> Vec<QueryRecord> {
    if let Some(state) = response.state.filter(|s| *s != ExecutionState::Succeeded) {
        warn!(
            target: "query_client",
            ?state,
            request_token = response.request_token.as_deref().unwrap_or("-"),
            "query finished without success state"
        );
    }

    response
        .result
        .map(|result| {
            result
                .records
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_protocol::{ComponentEntry, ResultPayload, StatusSummary};
    use serde_json::json;

    #[test]
    fn status_document_maps_to_snapshot() {
        let document = StatusDocument {
            status: StatusSummary {
                indicator: "major".to_string(),
                description: "Partial outage".to_string(),
            },
            components: vec![ComponentEntry {
                name: "API".to_string(),
                status: "degraded".to_string(),
            }],
        };

        let snapshot = map_status_to_snapshot(document);
        assert_eq!(snapshot.indicator, Indicator::Major);
        assert_eq!(snapshot.headline(), "Major Service Outage");
        assert_eq!(snapshot.description, "Partial outage");
        assert_eq!(snapshot.components, vec![ComponentStatus::new("API", "degraded")]);
    }

    #[test]
    fn unknown_indicator_is_not_an_error() {
        let document: StatusDocument = serde_json::from_value(json!({
            "status": { "indicator": "maintenance", "description": "" }
        }))
        .expect("document");

        let snapshot = map_status_to_snapshot(document);
        assert_eq!(snapshot.indicator, Indicator::Unknown);
        assert!(snapshot.components.is_empty());
    }

    #[test]
    fn records_keep_order_and_null_placeholders_become_empty() {
        let response = ExecuteResponse {
            state: Some(ExecutionState::Succeeded),
            request_token: None,
            result: Some(ResultPayload {
                records: vec![
                    json!({ "ts": "t1" }).as_object().cloned(),
                    None,
                    json!({ "ts": "t2" }).as_object().cloned(),
                ],
            }),
        };

        let records = map_records(response);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["ts"], "t1");
        assert!(records[1].is_empty());
        assert_eq!(records[2]["ts"], "t2");
    }

    #[test]
    fn missing_result_yields_no_records() {
        assert!(map_records(ExecuteResponse::default()).is_empty());
    }

    #[test]
    fn query_url_is_joined_to_environment() {
        let clients = PlatformClients::new(&ClientSettings {
            environment_url: Some("https://abc123.apps.example.com".to_string()),
            ..ClientSettings::default()
        })
        .expect("clients");

        assert_eq!(
            clients.query_url().map(Url::as_str),
            Some("https://abc123.apps.example.com/platform/storage/query/v1/query:execute")
        );
    }

    #[test]
    fn environment_path_prefix_is_kept() {
        let base = normalize_base_url("https://host.example.com/e/tenant").expect("url");
        assert_eq!(base.as_str(), "https://host.example.com/e/tenant/");
    }

    #[test]
    fn invalid_status_url_is_rejected() {
        let result = PlatformClients::new(&ClientSettings {
            status_url: "not a url".to_string(),
            ..ClientSettings::default()
        });
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn error_envelope_message_is_preferred() {
        let body = br#"{"error":{"code":400,"message":"PARSE_ERROR_UNEXPECTED_TOKEN"}}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            "PARSE_ERROR_UNEXPECTED_TOKEN"
        );
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, b"<html>"),
            "Service Unavailable"
        );
    }
}
