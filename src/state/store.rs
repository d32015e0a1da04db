//! Snapshot store and the pure transition function.
//!
//! `Store` wraps a `watch` channel: `dispatch` applies one event under the
//! channel's lock and notifies subscribers, so each transition is observed
//! whole. Collections inside `DashboardState` are `Arc`-shared and updated
//! copy-on-write, which keeps snapshots already handed out unchanged.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::Arc;

use tokio::sync::watch;

use super::filter::FilterState;
use super::list::{FetchOrdering, FetchTicket, ListFetchState};
use super::ops::{OperationTracker, Outcome};
use crate::net::types::{Message, MessageId};

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Everything the rendering boundary can observe.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardState {
    pub records: Arc<Vec<Message>>,
    pub filter: FilterState,
    pub list: ListFetchState,
    pub ops: OperationTracker,
}

impl DashboardState {
    #[must_use]
    pub fn new(ordering: FetchOrdering) -> Self {
        Self { list: ListFetchState::new(ordering), ..Self::default() }
    }

    #[must_use]
    pub fn records(&self) -> &[Message] {
        &self.records
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.list.loading()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.list.error()
    }

    #[must_use]
    pub fn is_classifying(&self, id: MessageId) -> bool {
        self.ops.is_in_flight(id)
    }

    #[must_use]
    pub fn outcome(&self, id: MessageId) -> Option<&Outcome> {
        self.ops.outcome(id)
    }

    /// No list fetch outstanding and no message id marked in flight.
    ///
    /// A re-triggered id leaves the in-flight set when its first attempt
    /// resolves, so a later attempt for the same id may still be running.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self.loading() && self.ops.in_flight_count() == 0
    }
}

// =============================================================================
// EVENTS
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Raw physician filter text changed. Not trimmed until applied.
    FilterEdited(String),
    /// Raw date-range inputs changed.
    DateRangeEdited { from: String, to: String },
    /// Filter inputs reset to empty.
    FilterCleared,
    /// A list fetch was issued.
    ListFetchStarted,
    /// A list fetch completed. `Err` carries the display text.
    ListFetchResolved { ticket: FetchTicket, result: Result<Vec<Message>, String> },
    /// A list fetch was dropped before completing.
    ListFetchAbandoned { ticket: FetchTicket },
    /// Classification was triggered for a message.
    EntityOpTriggered(MessageId),
    /// A classification attempt completed.
    EntityOpResolved { id: MessageId, outcome: Outcome },
    /// A classification attempt was dropped before completing.
    EntityOpAbandoned(MessageId),
    /// Forget every stored classification outcome.
    Reset,
}

impl Event {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FilterEdited(_) => "filter-edited",
            Self::DateRangeEdited { .. } => "date-range-edited",
            Self::FilterCleared => "filter-cleared",
            Self::ListFetchStarted => "list-fetch-started",
            Self::ListFetchResolved { result: Ok(_), .. } => "list-fetch-succeeded",
            Self::ListFetchResolved { result: Err(_), .. } => "list-fetch-failed",
            Self::ListFetchAbandoned { .. } => "list-fetch-abandoned",
            Self::EntityOpTriggered(_) => "entity-op-triggered",
            Self::EntityOpResolved { .. } => "entity-op-resolved",
            Self::EntityOpAbandoned(_) => "entity-op-abandoned",
            Self::Reset => "reset",
        }
    }
}

/// Apply `event` to `state`, returning the next snapshot.
#[must_use]
pub fn reduce(state: &DashboardState, event: Event) -> DashboardState {
    let mut next = state.clone();
    match event {
        Event::FilterEdited(text) => next.filter.set_text(text),
        Event::DateRangeEdited { from, to } => next.filter.set_date_range(from, to),
        Event::FilterCleared => next.filter = FilterState::default(),
        Event::ListFetchStarted => next.list.start(),
        Event::ListFetchResolved { ticket, result } => {
            if next.list.accepts(ticket) {
                match result {
                    Ok(records) => {
                        next.records = Arc::new(records);
                        next.list.clear_error();
                    }
                    Err(error) => next.list.fail(error),
                }
            }
            next.list.settle();
        }
        Event::ListFetchAbandoned { .. } => next.list.settle(),
        Event::EntityOpTriggered(id) => next.ops.begin(id),
        Event::EntityOpResolved { id, outcome } => next.ops.resolve(id, outcome),
        Event::EntityOpAbandoned(id) => next.ops.settle(id),
        Event::Reset => next.ops.clear_outcomes(),
    }
    next
}

// =============================================================================
// STORE
// =============================================================================

/// Shared handle to the dashboard state. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    tx: Arc<watch::Sender<DashboardState>>,
}

impl Store {
    #[must_use]
    pub fn new(ordering: FetchOrdering) -> Self {
        let (tx, _rx) = watch::channel(DashboardState::new(ordering));
        Self { tx: Arc::new(tx) }
    }

    /// Apply one event and return the resulting snapshot.
    pub fn dispatch(&self, event: Event) -> DashboardState {
        tracing::trace!(event = event.kind(), "dispatch");
        let mut applied = None;
        self.tx.send_modify(|state| {
            let next = reduce(state, event);
            applied = Some(next.clone());
            *state = next;
        });
        applied.unwrap_or_else(|| self.snapshot())
    }

    #[must_use]
    pub fn snapshot(&self) -> DashboardState {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.tx.subscribe()
    }

    /// Wait until [`DashboardState::is_settled`] holds and return that snapshot.
    pub async fn settled(&self) -> DashboardState {
        let mut rx = self.subscribe();
        if let Ok(state) = rx.wait_for(DashboardState::is_settled).await {
            return state.clone();
        }
        self.snapshot()
    }
}
