//! Dockwatch Daemon library - HTTP surface over the risk engine.
//!
//! Exposed as a library so the router can be exercised in tests.

pub mod error;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod store;

pub use error::ApiError;
pub use server::{router, run, AppState};
pub use store::{InMemoryStore, ProcessFilter, ProcessSource};
