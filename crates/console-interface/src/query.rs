//! Query results and column inference.

use serde_json::{Map, Value};

use crate::table::TableRow;

/// One loosely-typed result row. Key order follows the service response.
pub type QueryRecord = Map<String, Value>;

/// Parameters for one query submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: String,
    pub request_timeout_ms: u64,
    pub enable_preview: bool,
}

/// How one inferred field is rendered as a table column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub id: String,
    pub header: String,
    pub sortable: bool,
    pub resizable: bool,
}

impl ColumnDescriptor {
    pub fn for_key(key: &str) -> Self {
        Self {
            id: key.to_string(),
            header: header_for(key),
            sortable: true,
            resizable: true,
        }
    }
}

/// Key name with its first character upper-cased.
pub fn header_for(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derives columns from the keys of the first record only.
///
/// Records are assumed to share one shape. Keys that only appear in later
/// records are not represented.
pub fn infer_columns(records: &[QueryRecord]) -> Vec<ColumnDescriptor> {
    records
        .first()
        .map(|first| first.keys().map(|key| ColumnDescriptor::for_key(key)).collect())
        .unwrap_or_default()
}

/// Records of one successful execution plus the columns inferred from them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    records: Vec<QueryRecord>,
    columns: Vec<ColumnDescriptor>,
}

impl QueryResult {
    pub fn from_records(records: Vec<QueryRecord>) -> Self {
        let columns = infer_columns(&records);
        Self { records, columns }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows in record order, identified by position.
    pub fn rows(&self) -> Vec<TableRow<'_>> {
        self.records
            .iter()
            .enumerate()
            .map(|(id, record)| TableRow { id, record })
            .collect()
    }

    /// Row objects for the presenter, each carrying an `id` field.
    pub fn table_data(&self) -> Vec<Value> {
        self.rows().iter().map(TableRow::to_value).collect()
    }
}

/// Observable state of the query panel.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum QueryState {
    #[default]
    Idle,
    Running,
    Failed(String),
    Ready(QueryResult),
}

impl QueryState {
    pub fn is_running(&self) -> bool {
        matches!(self, QueryState::Running)
    }

    pub fn result(&self) -> Option<&QueryResult> {
        match self {
            QueryState::Ready(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            QueryState::Failed(message) => Some(message),
            _ => None,
        }
    }
}
