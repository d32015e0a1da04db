#[cfg(test)]
#[path = "filter_test.rs"]
mod filter_test;

use super::list::ListFetchCoordinator;
use super::store::{Event, Store};
use crate::net::types::ListQuery;

/// Raw filter inputs as typed. Nothing is trimmed until the filter is applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    physician: String,
    from: String,
    to: String,
}

impl FilterState {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.physician
    }

    #[must_use]
    pub fn date_range(&self) -> (&str, &str) {
        (&self.from, &self.to)
    }

    /// Any input present, even whitespace. Drives the "Clear" affordance.
    #[must_use]
    pub fn has_input(&self) -> bool {
        !(self.physician.is_empty() && self.from.is_empty() && self.to.is_empty())
    }

    /// The constraints an apply would fetch with: trimmed, blanks omitted.
    #[must_use]
    pub fn criterion(&self) -> ListQuery {
        ListQuery { physician: non_blank(&self.physician), from: non_blank(&self.from), to: non_blank(&self.to) }
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.physician = text;
    }

    pub(crate) fn set_date_range(&mut self, from: String, to: String) {
        self.from = from;
        self.to = to;
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Filter input handling. Applying or clearing delegates to the list fetch.
#[derive(Clone)]
pub struct FilterController {
    store: Store,
    lists: ListFetchCoordinator,
}

impl FilterController {
    #[must_use]
    pub fn new(store: Store, lists: ListFetchCoordinator) -> Self {
        Self { store, lists }
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.store.dispatch(Event::FilterEdited(text.into()));
    }

    pub fn set_date_range(&self, from: impl Into<String>, to: impl Into<String>) {
        self.store.dispatch(Event::DateRangeEdited { from: from.into(), to: to.into() });
    }

    #[must_use]
    pub fn criterion(&self) -> ListQuery {
        self.store.snapshot().filter.criterion()
    }

    /// Fetch with the current inputs. Blank inputs fetch unfiltered.
    pub async fn apply(&self) {
        let query = self.criterion();
        self.lists.fetch_list(query).await;
    }

    /// Reset inputs to empty and fetch unfiltered.
    pub async fn clear(&self) {
        self.store.dispatch(Event::FilterCleared);
        self.lists.fetch_list(ListQuery::unfiltered()).await;
    }
}
