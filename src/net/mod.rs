//! Network boundary: wire types and the record/classification collaborators.
//!
//! DESIGN
//! ======
//! The dashboard core only sees the `RecordSource` and `Classifier` traits.
//! `HttpApi` is the production implementation over `reqwest`; tests swap in
//! mocks that resolve on demand.

pub mod api;
pub mod types;
