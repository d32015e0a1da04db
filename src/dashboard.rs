//! Dashboard controller: wires filter, list fetch, and classification
//! coordinators over one shared `Store`.
//!
//! SYSTEM CONTEXT
//! ==============
//! Front-ends hold a `Dashboard`, call its actions from user input, and
//! render from `snapshot()` or a `subscribe()` receiver. The controller owns
//! no state of its own beyond the one-shot activation flag.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::DashboardConfig;
use crate::net::api::{ApiError, Classifier, HttpApi, RecordSource};
use crate::net::types::{ListQuery, MessageId};
use crate::state::filter::FilterController;
use crate::state::list::{FetchOrdering, ListFetchCoordinator};
use crate::state::ops::ClassifyCoordinator;
use crate::state::store::{DashboardState, Event, Store};

#[derive(Clone)]
pub struct Dashboard {
    store: Store,
    filter: FilterController,
    lists: ListFetchCoordinator,
    ops: ClassifyCoordinator,
    activated: Arc<AtomicBool>,
}

impl Dashboard {
    #[must_use]
    pub fn new(source: Arc<dyn RecordSource>, classifier: Arc<dyn Classifier>, ordering: FetchOrdering) -> Self {
        let store = Store::new(ordering);
        let lists = ListFetchCoordinator::new(store.clone(), source);
        let filter = FilterController::new(store.clone(), lists.clone());
        let ops = ClassifyCoordinator::new(store.clone(), classifier);
        Self { store, filter, lists, ops, activated: Arc::new(AtomicBool::new(false)) }
    }

    /// Build a dashboard backed by the HTTP collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, ApiError> {
        let api = Arc::new(HttpApi::new(config)?);
        tracing::info!(base_url = api.base_url(), ordering = ?config.ordering, "dashboard configured");
        Ok(Self::new(api.clone(), api, config.ordering))
    }

    /// Run the initial unfiltered fetch. Only the first call fetches.
    pub async fn activate(&self) -> bool {
        if self.activated.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.lists.fetch_list(ListQuery::unfiltered()).await;
        true
    }

    #[must_use]
    pub fn snapshot(&self) -> DashboardState {
        self.store.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.store.subscribe()
    }

    pub fn set_filter(&self, text: impl Into<String>) {
        self.filter.set_text(text);
    }

    pub fn set_date_range(&self, from: impl Into<String>, to: impl Into<String>) {
        self.filter.set_date_range(from, to);
    }

    /// Apply the current filter inputs.
    pub async fn search(&self) {
        self.filter.apply().await;
    }

    pub async fn clear_filter(&self) {
        self.filter.clear().await;
    }

    pub async fn classify(&self, id: MessageId) {
        self.ops.trigger(id).await;
    }

    /// Start classifying `id` on the runtime and return immediately.
    pub fn spawn_classify(&self, id: MessageId) -> JoinHandle<()> {
        let ops = self.ops.clone();
        tokio::spawn(async move { ops.trigger(id).await })
    }

    /// Forget all stored classification outcomes.
    pub fn reset(&self) {
        self.store.dispatch(Event::Reset);
    }

    /// Wait until no list fetch is outstanding and no id is marked in flight.
    ///
    /// Overlapping attempts for one id are not tracked separately; the first
    /// to resolve clears the id.
    pub async fn settled(&self) -> DashboardState {
        self.store.settled().await
    }
}
