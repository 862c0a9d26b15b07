use axum::response::Response;
use std::error::Error;

pub mod context;
pub mod defaults;
pub mod http;
pub mod kind;
pub mod layer;
pub mod sink;
pub mod translator;

pub use context::ExceptionContext;
pub use defaults::{PreliminaryResponse, preliminary_response};
pub use http::HttpExceptionFilter;
pub use kind::{ApiException, ErrorKind};
pub use layer::{ExceptionLayer, ExceptionMiddleware};
pub use sink::{ErrorRecord, ErrorSink, TracingSink};
pub use translator::{ExceptionTranslator, message_for};

/// The ExceptionFilter trait
///
/// Filters handle errors thrown during request processing.
/// They must return a valid Response.
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Catch an exception and return a response
    fn catch(&self, error: Box<dyn Error + Send + Sync>, host: &ExceptionContext) -> Response;
}
