//! Request/response state machines behind the console views.
//!
//! Each machine publishes its state through a [`StateCell`]; renderers only
//! subscribe and never mutate it.

mod poller;
mod query;
mod state;

pub use poller::{DEFAULT_POLL_INTERVAL, MAX_POLL_INTERVAL, StatusPoller};
pub use query::{DEFAULT_QUERY, DEFAULT_QUERY_TIMEOUT, QueryExecutor, QueryRun, QuerySession};
pub use state::StateCell;
