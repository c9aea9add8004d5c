//! HTTP server startup with lifecycle management.

mod error;
mod http_server;
mod lifecycle;

pub use error::{ServerError, ServerResult};
pub use http_server::serve_http;
