//! Per-message classification tracking.
//!
//! Each message id moves `Idle -> InFlight -> Resolved`. A new trigger puts a
//! resolved id back in flight while its previous outcome stays visible until
//! the new attempt lands. Ids never share state, so concurrent attempts on
//! different messages cannot affect each other.
//!
//! Re-triggering an id that is already in flight is allowed and races: the
//! last attempt to resolve owns the outcome, and the first to resolve clears
//! the in-flight flag.

#[cfg(test)]
#[path = "ops_test.rs"]
mod ops_test;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::store::{Event, Store};
use crate::net::api::Classifier;
use crate::net::types::MessageId;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result of the most recent completed classification for one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Classified(String),
    Failed(String),
}

impl Outcome {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Text as shown inline. Failures carry an `Error: ` prefix.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Classified(message) => message.clone(),
            Self::Failed(reason) => format!("Error: {reason}"),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

/// Where one message stands in its classification lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpPhase<'a> {
    Idle,
    InFlight { previous: Option<&'a Outcome> },
    Resolved(&'a Outcome),
}

// =============================================================================
// TRACKER STATE
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationTracker {
    in_flight: Arc<HashSet<MessageId>>,
    outcomes: Arc<HashMap<MessageId, Outcome>>,
    resolved_at: Arc<HashMap<MessageId, u64>>,
    resolutions: u64,
}

impl OperationTracker {
    #[must_use]
    pub fn is_in_flight(&self, id: MessageId) -> bool {
        self.in_flight.contains(&id)
    }

    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    #[must_use]
    pub fn outcome(&self, id: MessageId) -> Option<&Outcome> {
        self.outcomes.get(&id)
    }

    #[must_use]
    pub fn outcomes(&self) -> &HashMap<MessageId, Outcome> {
        &self.outcomes
    }

    /// Sequence number of the latest resolution recorded for `id`.
    ///
    /// Increases on every resolution, even when the outcome text repeats.
    #[must_use]
    pub fn resolution(&self, id: MessageId) -> Option<u64> {
        self.resolved_at.get(&id).copied()
    }

    #[must_use]
    pub fn phase(&self, id: MessageId) -> OpPhase<'_> {
        let previous = self.outcome(id);
        if self.is_in_flight(id) {
            return OpPhase::InFlight { previous };
        }
        match previous {
            Some(outcome) => OpPhase::Resolved(outcome),
            None => OpPhase::Idle,
        }
    }

    pub(crate) fn begin(&mut self, id: MessageId) {
        Arc::make_mut(&mut self.in_flight).insert(id);
    }

    pub(crate) fn resolve(&mut self, id: MessageId, outcome: Outcome) {
        Arc::make_mut(&mut self.outcomes).insert(id, outcome);
        self.resolutions += 1;
        Arc::make_mut(&mut self.resolved_at).insert(id, self.resolutions);
        self.settle(id);
    }

    pub(crate) fn settle(&mut self, id: MessageId) {
        if self.in_flight.contains(&id) {
            Arc::make_mut(&mut self.in_flight).remove(&id);
        }
    }

    pub(crate) fn clear_outcomes(&mut self) {
        self.outcomes = Arc::default();
        self.resolved_at = Arc::default();
    }
}

// =============================================================================
// COORDINATOR
// =============================================================================

#[derive(Clone)]
pub struct ClassifyCoordinator {
    store: Store,
    classifier: Arc<dyn Classifier>,
}

impl ClassifyCoordinator {
    #[must_use]
    pub fn new(store: Store, classifier: Arc<dyn Classifier>) -> Self {
        Self { store, classifier }
    }

    /// Classify one message and record its outcome. Never fails outward.
    pub async fn trigger(&self, id: MessageId) {
        let flight = InFlight::begin(&self.store, id);
        debug!(%id, "classifying message");

        let outcome = match self.classifier.classify(id).await {
            Ok(message) => {
                info!(%id, "message classified");
                Outcome::Classified(message)
            }
            Err(e) => {
                warn!(%id, error = %e, "classification failed");
                Outcome::Failed(format!("Classification failed: {e}"))
            }
        };

        flight.resolve(outcome);
    }
}

/// One outstanding attempt. Clears the in-flight flag on drop if unresolved.
struct InFlight {
    store: Store,
    id: MessageId,
    resolved: bool,
}

impl InFlight {
    fn begin(store: &Store, id: MessageId) -> Self {
        store.dispatch(Event::EntityOpTriggered(id));
        Self { store: store.clone(), id, resolved: false }
    }

    fn resolve(mut self, outcome: Outcome) {
        self.resolved = true;
        self.store.dispatch(Event::EntityOpResolved { id: self.id, outcome });
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.resolved {
            self.store.dispatch(Event::EntityOpAbandoned(self.id));
        }
    }
}
