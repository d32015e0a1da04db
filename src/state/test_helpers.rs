//! Mock collaborators for state and dashboard tests.
//!
//! `Gated*` mocks park every call on a oneshot until the test resolves it,
//! which lets tests choose the order in which responses arrive.
//! `Scripted*` mocks answer immediately from a queue.

use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::net::api::{ApiError, Classifier, RecordSource};
use crate::net::types::{ListQuery, Message, MessageId, Timestamp};

type Reply<T> = oneshot::Sender<Result<T, ApiError>>;

#[must_use]
pub fn message(id: i64, physician_id: i64) -> Message {
    Message {
        message_id: MessageId(id),
        physician_id,
        message_text: format!("message {id}"),
        timestamp: Timestamp::Text("2024-03-01T09:30:00Z".to_owned()),
        topic: Some("dosing".to_owned()),
        sentiment: None,
        channel: None,
        direction: None,
        campaign_id: None,
        compliance_tag: None,
        delivery_status: None,
        response_latency_sec: None,
    }
}

#[must_use]
pub fn server_error() -> ApiError {
    ApiError::Status { status: 500, body: "boom".to_owned() }
}

/// Yield to spawned tasks until `cond` holds.
pub async fn until(cond: impl Fn() -> bool) {
    for _ in 0..1000 {
        if cond() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

// =============================================================================
// GATED
// =============================================================================

#[derive(Default)]
pub struct GatedSource {
    calls: Mutex<Vec<(ListQuery, Option<Reply<Vec<Message>>>)>>,
}

impl GatedSource {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<ListQuery> {
        self.calls.lock().unwrap().iter().map(|(q, _)| q.clone()).collect()
    }

    /// Answer the `index`-th call (in issue order).
    pub fn resolve(&self, index: usize, result: Result<Vec<Message>, ApiError>) {
        let tx = self.calls.lock().unwrap()[index].1.take().expect("call already resolved");
        let _ = tx.send(result);
    }
}

#[async_trait::async_trait]
impl RecordSource for GatedSource {
    async fn list_messages(&self, query: &ListQuery) -> Result<Vec<Message>, ApiError> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push((query.clone(), Some(tx)));
        rx.await
            .unwrap_or_else(|_| Err(ApiError::Transport("reply dropped".to_owned())))
    }
}

#[derive(Default)]
pub struct GatedClassifier {
    calls: Mutex<Vec<(MessageId, Option<Reply<String>>)>>,
}

impl GatedClassifier {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Answer the oldest unanswered call for `id`.
    pub fn resolve(&self, id: MessageId, result: Result<String, ApiError>) {
        let tx = self
            .calls
            .lock()
            .unwrap()
            .iter_mut()
            .find(|(call_id, tx)| *call_id == id && tx.is_some())
            .and_then(|(_, tx)| tx.take())
            .expect("no pending call for id");
        let _ = tx.send(result);
    }
}

#[async_trait::async_trait]
impl Classifier for GatedClassifier {
    async fn classify(&self, id: MessageId) -> Result<String, ApiError> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push((id, Some(tx)));
        rx.await
            .unwrap_or_else(|_| Err(ApiError::Transport("reply dropped".to_owned())))
    }
}

// =============================================================================
// SCRIPTED
// =============================================================================

/// Answers list calls from a queue; an empty queue answers with no records.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<Vec<Result<Vec<Message>, ApiError>>>,
    queries: Mutex<Vec<ListQuery>>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<Vec<Message>, ApiError>>) -> Self {
        Self { responses: Mutex::new(responses), queries: Mutex::new(Vec::new()) }
    }

    pub fn queries(&self) -> Vec<ListQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RecordSource for ScriptedSource {
    async fn list_messages(&self, query: &ListQuery) -> Result<Vec<Message>, ApiError> {
        self.queries.lock().unwrap().push(query.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() { Ok(Vec::new()) } else { responses.remove(0) }
    }
}

/// Answers every classification with `"<rule> for <id>"`.
#[derive(Default)]
pub struct ScriptedClassifier {
    calls: Mutex<Vec<MessageId>>,
}

impl ScriptedClassifier {
    pub fn calls(&self) -> Vec<MessageId> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, id: MessageId) -> Result<String, ApiError> {
        self.calls.lock().unwrap().push(id);
        Ok(format!("Dosing escalate for {id}"))
    }
}
