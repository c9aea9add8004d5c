//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Recovery: handler panics and request timeouts become JSON error responses.
//! - Observability: request identifiers and per-request tracing spans.

mod observability;
mod recovery;

pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
