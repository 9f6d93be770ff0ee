use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use console_interface::{QueryError, QueryRequest, QueryResult, QueryService, QueryState};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::state::StateCell;

pub const DEFAULT_QUERY: &str = "fetch logs\n| limit 100";
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Submits query text to a [`QueryService`] and shapes the records into a [`QueryResult`].
#[derive(Clone)]
pub struct QueryExecutor {
    service: Arc<dyn QueryService>,
}

impl QueryExecutor {
    pub fn new(service: Arc<dyn QueryService>) -> Self {
        Self { service }
    }

    /// Runs `query_text` verbatim with preview features enabled. An empty
    /// record set is reported as [`QueryError::NoData`].
    pub async fn execute(
        &self,
        query_text: &str,
        timeout: Duration,
    ) -> Result<QueryResult, QueryError> {
        let request = QueryRequest {
            query: query_text.to_string(),
            request_timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            enable_preview: true,
        };
        debug!(target: "query", timeout_ms = request.request_timeout_ms, "submitting query");

        let records = self.service.execute(request).await?;
        if records.is_empty() {
            return Err(QueryError::NoData);
        }

        let result = QueryResult::from_records(records);
        info!(
            target: "query",
            rows = result.len(),
            columns = result.columns().len(),
            "query returned records"
        );
        Ok(result)
    }
}

/// Query panel state: editable text plus the observable outcome of the last run.
#[derive(Clone)]
pub struct QuerySession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    executor: QueryExecutor,
    timeout: Duration,
    text: Mutex<String>,
    state: StateCell<QueryState>,
}

impl QuerySession {
    pub fn new(executor: QueryExecutor, initial_query: impl Into<String>, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                executor,
                timeout,
                text: Mutex::new(initial_query.into()),
                state: StateCell::default(),
            }),
        }
    }

    pub fn query_text(&self) -> String {
        self.inner
            .text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_query_text(&self, text: impl Into<String>) {
        *self.inner.text.lock().unwrap_or_else(PoisonError::into_inner) = text.into();
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> QueryState {
        self.inner.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Claims the session for one run and captures the current query text.
    ///
    /// Fails with [`QueryError::InFlight`] while a run is pending, leaving the
    /// state untouched. On success the state is already `Running`.
    pub fn begin(&self) -> Result<QueryRun, QueryError> {
        let started = self.inner.state.update(|state| {
            if state.is_running() {
                return false;
            }
            *state = QueryState::Running;
            true
        });
        if !started {
            debug!(target: "query", "ignoring run request while a query is pending");
            return Err(QueryError::InFlight);
        }

        Ok(QueryRun {
            inner: Arc::clone(&self.inner),
            text: self.query_text(),
        })
    }

    /// Executes the current query text. The outcome is published as state.
    pub async fn run_query(&self) -> Result<(), QueryError> {
        self.begin()?.complete().await;
        Ok(())
    }
}

/// A claimed run holding the query text captured by [`QuerySession::begin`].
pub struct QueryRun {
    inner: Arc<SessionInner>,
    text: String,
}

impl QueryRun {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Executes the captured text and publishes `Ready` or `Failed`.
    pub async fn complete(self) {
        let next = match self.inner.executor.execute(&self.text, self.inner.timeout).await {
            Ok(result) => QueryState::Ready(result),
            Err(err) => {
                warn!(target: "query", error = %err, "query execution failed");
                QueryState::Failed(err.user_message())
            }
        };
        self.inner.state.set(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_interface::{MockQueryService, QueryRecord};
    use serde_json::{Value, json};

    fn records(values: Vec<Value>) -> Vec<QueryRecord> {
        values
            .into_iter()
            .map(|value| value.as_object().cloned().expect("object"))
            .collect()
    }

    fn session(service: Arc<MockQueryService>, query: &str) -> QuerySession {
        QuerySession::new(QueryExecutor::new(service), query, DEFAULT_QUERY_TIMEOUT)
    }

    #[tokio::test]
    async fn logs_query_end_to_end() {
        let service = Arc::new(MockQueryService::new());
        service.push_result(Ok(records(vec![
            json!({ "ts": "t1", "content": "x" }),
            json!({ "ts": "t2", "content": "y" }),
        ])));

        let session = session(service.clone(), "fetch logs | limit 100");
        session.run_query().await.expect("not in flight");

        let state = session.state();
        let result = state.result().expect("ready");
        let headers: Vec<&str> = result.columns().iter().map(|c| c.header.as_str()).collect();
        assert_eq!(headers, ["Ts", "Content"]);
        assert_eq!(
            result.table_data(),
            vec![
                json!({ "id": 0, "ts": "t1", "content": "x" }),
                json!({ "id": 1, "ts": "t2", "content": "y" }),
            ]
        );

        assert_eq!(
            service.requests(),
            vec![QueryRequest {
                query: "fetch logs | limit 100".to_string(),
                request_timeout_ms: 30_000,
                enable_preview: true,
            }]
        );
    }

    #[tokio::test]
    async fn empty_records_are_no_data() {
        let service = Arc::new(MockQueryService::new());
        service.push_result(Ok(Vec::new()));

        let executor = QueryExecutor::new(service);
        let err = executor
            .execute("fetch logs", DEFAULT_QUERY_TIMEOUT)
            .await
            .expect_err("empty result");
        assert!(matches!(err, QueryError::NoData));
        assert_eq!(err.to_string(), "no data returned");
    }

    #[tokio::test]
    async fn failure_clears_previous_table() {
        let service = Arc::new(MockQueryService::new());
        service.push_result(Ok(records(vec![json!({ "a": 1 })])));
        service.push_result(Ok(Vec::new()));
        service.push_result(Err(QueryError::Service {
            status: 400,
            message: "PARSE_ERROR".to_string(),
        }));

        let session = session(service, DEFAULT_QUERY);
        session.run_query().await.expect("first run");
        assert!(session.state().result().is_some());

        session.run_query().await.expect("second run");
        assert_eq!(
            session.state(),
            QueryState::Failed("No data returned from query".to_string())
        );

        session.run_query().await.expect("third run");
        assert_eq!(
            session.state().error(),
            Some("Failed to execute query: query service returned HTTP 400: PARSE_ERROR")
        );
    }

    #[tokio::test]
    async fn overlapping_run_is_rejected() {
        let service = Arc::new(MockQueryService::new());
        let held = service.hold_next();

        let session = session(service.clone(), DEFAULT_QUERY);
        let pending = tokio::spawn({
            let session = session.clone();
            async move { session.run_query().await }
        });
        while !session.is_running() {
            tokio::task::yield_now().await;
        }

        let err = session.run_query().await.expect_err("already running");
        assert!(matches!(err, QueryError::InFlight));
        assert!(session.is_running());
        assert_eq!(service.requests().len(), 1);

        assert!(held.send(Ok(records(vec![json!({ "k": "v" })]))).is_ok());
        pending.await.expect("join").expect("first run");
        assert_eq!(session.state().result().map(QueryResult::len), Some(1));
    }

    #[tokio::test]
    async fn begin_claims_run_and_captures_text() {
        let service = Arc::new(MockQueryService::new());
        service.push_result(Ok(records(vec![json!({ "n": 1 })])));

        let session = session(service.clone(), "fetch logs");
        let run = session.begin().expect("idle session");
        assert!(session.is_running());
        assert_eq!(run.text(), "fetch logs");

        session.set_query_text("fetch logsX");
        assert!(matches!(session.begin(), Err(QueryError::InFlight)));

        run.complete().await;
        assert_eq!(service.requests().len(), 1);
        assert_eq!(service.requests()[0].query, "fetch logs");
        assert!(session.state().result().is_some());
    }

    #[tokio::test]
    async fn text_edits_apply_to_next_run() {
        let service = Arc::new(MockQueryService::new());
        service.push_result(Ok(records(vec![json!({ "n": 1 })])));

        let session = session(service.clone(), DEFAULT_QUERY);
        assert_eq!(session.query_text(), "fetch logs\n| limit 100");
        session.set_query_text("fetch events");
        session.run_query().await.expect("run");

        assert_eq!(service.requests()[0].query, "fetch events");
    }
}
