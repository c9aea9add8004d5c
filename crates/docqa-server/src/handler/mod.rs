//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod ask;
mod error;
mod monitors;
mod page;
mod view;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::ask::{AskRequest, AskResponse, SourceResponse};
pub use crate::handler::error::{Error, ErrorKind, ErrorResponse, Result};
pub use crate::handler::monitors::HealthResponse;
pub use crate::handler::page::{AskForm, EMPTY_QUESTION, SOURCES_HIDDEN, answer_question};
pub use crate::handler::view::{EXAMPLE_QUESTIONS, PageView, render_page};
use crate::service::ServiceState;

/// Tracing target for request handlers.
pub const TRACING_TARGET: &str = "docqa_server::handler";

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with every route of the front end.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(page::routes())
        .merge(ask::routes())
        .merge(monitors::routes())
        .fallback(handler)
}
