//! Dashboard state and the coordinators that drive it.
//!
//! DESIGN
//! ======
//! All state lives in one `Store` holding an immutable `DashboardState`
//! snapshot. Every change is an `Event` applied by the pure `store::reduce`.
//! State is split by concern (`filter`, `list`, `ops`) so each coordinator
//! only emits events for its own slice:
//!
//! - `filter::FilterController` edits the filter and asks for a list fetch.
//! - `list::ListFetchCoordinator` owns loading/error and the record list.
//! - `ops::ClassifyCoordinator` owns per-message in-flight and outcome state.
//!
//! Collaborator calls are the only suspension points. Completion goes
//! through Drop guards, so loading and in-flight state settle on every exit
//! path, including a dropped future.

pub mod filter;
pub mod list;
pub mod ops;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
