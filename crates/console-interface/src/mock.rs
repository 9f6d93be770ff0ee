//! Scripted service doubles for tests.
//!
//! Each call consumes the next scripted response. A held response stays
//! pending until the test resolves it through the returned sender; once the
//! script is exhausted, calls never resolve.

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};

use futures::{
    FutureExt,
    channel::oneshot,
    future::{self, BoxFuture},
};

use crate::{FetchError, QueryError, QueryRecord, QueryRequest, QueryService, StatusSnapshot, StatusSource};

enum Scripted<T, E> {
    Ready(Result<T, E>),
    Held(oneshot::Receiver<Result<T, E>>),
}

struct Script<T, E> {
    queue: VecDeque<Scripted<T, E>>,
    calls: usize,
}

impl<T, E> Default for Script<T, E> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            calls: 0,
        }
    }
}

impl<T: Send + 'static, E: Send + 'static> Script<T, E> {
    fn push(&mut self, result: Result<T, E>) {
        self.queue.push_back(Scripted::Ready(result));
    }

    fn hold(&mut self) -> oneshot::Sender<Result<T, E>> {
        let (tx, rx) = oneshot::channel();
        self.queue.push_back(Scripted::Held(rx));
        tx
    }

    fn next<'a>(&mut self) -> BoxFuture<'a, Result<T, E>> {
        self.calls += 1;
        match self.queue.pop_front() {
            Some(Scripted::Ready(result)) => future::ready(result).boxed(),
            Some(Scripted::Held(rx)) => async move {
                match rx.await {
                    Ok(result) => result,
                    Err(_) => future::pending().await,
                }
            }
            .boxed(),
            None => future::pending().boxed(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().expect("mock state poisoned")
}

#[derive(Default)]
pub struct MockStatusSource {
    script: Mutex<Script<StatusSnapshot, FetchError>>,
}

impl MockStatusSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_result(&self, result: Result<StatusSnapshot, FetchError>) {
        lock(&self.script).push(result);
    }

    /// Queues a response that stays in flight until the sender is used.
    pub fn hold_next(&self) -> oneshot::Sender<Result<StatusSnapshot, FetchError>> {
        lock(&self.script).hold()
    }

    pub fn calls(&self) -> usize {
        lock(&self.script).calls
    }
}

impl StatusSource for MockStatusSource {
    fn fetch_status(&self) -> BoxFuture<'_, Result<StatusSnapshot, FetchError>> {
        lock(&self.script).next()
    }
}

#[derive(Default)]
pub struct MockQueryService {
    script: Mutex<Script<Vec<QueryRecord>, QueryError>>,
    requests: Mutex<Vec<QueryRequest>>,
}

impl MockQueryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_result(&self, result: Result<Vec<QueryRecord>, QueryError>) {
        lock(&self.script).push(result);
    }

    pub fn hold_next(&self) -> oneshot::Sender<Result<Vec<QueryRecord>, QueryError>> {
        lock(&self.script).hold()
    }

    pub fn requests(&self) -> Vec<QueryRequest> {
        lock(&self.requests).clone()
    }
}

impl QueryService for MockQueryService {
    fn execute(&self, request: QueryRequest) -> BoxFuture<'_, Result<Vec<QueryRecord>, QueryError>> {
        lock(&self.requests).push(request);
        lock(&self.script).next()
    }
}
