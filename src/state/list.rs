//! List fetch coordination: loading/error state and record replacement.
//!
//! ORDERING
//! ========
//! Fetches are not single-flight. Under `LastResolvedWins` every resolution
//! is applied in arrival order, so the slowest response decides the final
//! list. `LatestRequestWins` tags each fetch with a ticket and drops any
//! resolution that is not for the most recently issued one. Either way
//! `loading` stays true until every outstanding fetch has settled.

#[cfg(test)]
#[path = "list_test.rs"]
mod list_test;

use std::sync::Arc;

use tracing::{info, warn};

use super::store::{Event, Store};
use crate::net::api::RecordSource;
use crate::net::types::{ListQuery, Message};

/// How concurrent list fetch resolutions are reconciled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FetchOrdering {
    #[default]
    LastResolvedWins,
    LatestRequestWins,
}

/// Sequence number of an issued list fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchTicket(pub u64);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListFetchState {
    pending: usize,
    error: Option<String>,
    issued: u64,
    ordering: FetchOrdering,
}

impl ListFetchState {
    #[must_use]
    pub fn new(ordering: FetchOrdering) -> Self {
        Self { ordering, ..Self::default() }
    }

    /// True exactly while at least one fetch is outstanding.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.pending > 0
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn ordering(&self) -> FetchOrdering {
        self.ordering
    }

    /// Ticket of the most recently issued fetch.
    #[must_use]
    pub fn latest_ticket(&self) -> FetchTicket {
        FetchTicket(self.issued)
    }

    pub(crate) fn start(&mut self) {
        self.pending += 1;
        self.issued += 1;
        self.error = None;
    }

    pub(crate) fn accepts(&self, ticket: FetchTicket) -> bool {
        match self.ordering {
            FetchOrdering::LastResolvedWins => true,
            FetchOrdering::LatestRequestWins => ticket == self.latest_ticket(),
        }
    }

    pub(crate) fn fail(&mut self, error: String) {
        self.error = Some(error);
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    pub(crate) fn settle(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }
}

// =============================================================================
// COORDINATOR
// =============================================================================

#[derive(Clone)]
pub struct ListFetchCoordinator {
    store: Store,
    source: Arc<dyn RecordSource>,
}

impl ListFetchCoordinator {
    #[must_use]
    pub fn new(store: Store, source: Arc<dyn RecordSource>) -> Self {
        Self { store, source }
    }

    /// Fetch the record list for `query` and fold the result into the store.
    ///
    /// Failures become the list error and leave the current records in place.
    pub async fn fetch_list(&self, query: ListQuery) {
        let pending = PendingFetch::start(&self.store);
        info!(%query, ticket = pending.ticket.0, "fetching messages");

        let result = match self.source.list_messages(&query).await {
            Ok(records) => {
                info!(count = records.len(), ticket = pending.ticket.0, "messages fetched");
                Ok(records)
            }
            Err(e) => {
                warn!(error = %e, ticket = pending.ticket.0, "message fetch failed");
                Err(format!("Failed to fetch messages: {e}"))
            }
        };

        pending.finish(result);
    }
}

/// Outstanding fetch. Settles `loading` on drop if never finished.
struct PendingFetch {
    store: Store,
    ticket: FetchTicket,
    finished: bool,
}

impl PendingFetch {
    fn start(store: &Store) -> Self {
        let ticket = store.dispatch(Event::ListFetchStarted).list.latest_ticket();
        Self { store: store.clone(), ticket, finished: false }
    }

    fn finish(mut self, result: Result<Vec<Message>, String>) {
        self.finished = true;
        self.store.dispatch(Event::ListFetchResolved { ticket: self.ticket, result });
    }
}

impl Drop for PendingFetch {
    fn drop(&mut self) {
        if !self.finished {
            self.store.dispatch(Event::ListFetchAbandoned { ticket: self.ticket });
        }
    }
}
