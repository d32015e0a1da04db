//! # message-dashboard
//!
//! Client-side core for the message management dashboard: lists physician
//! messages, filters them by physician id, and runs per-message
//! classification requests concurrently while tracking each one's
//! in-flight and outcome state.
//!
//! This crate contains the state container and its coordinators (`state`),
//! the dashboard controller that composes them (`dashboard`), wire types and
//! HTTP collaborators (`net`), and environment configuration (`config`).
//! Rendering lives in the consumers (see the `cli` crate).

pub mod config;
pub mod dashboard;
pub mod net;
pub mod state;

pub use dashboard::Dashboard;
