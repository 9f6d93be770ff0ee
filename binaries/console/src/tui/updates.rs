use console_interface::{PollState, QueryState};

/// A state change published by one of the session machines.
#[derive(Debug, Clone)]
pub enum StateUpdate {
    StatusChanged(PollState),
    QueryChanged(QueryState),
}
