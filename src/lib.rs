//! # Faultline
//!
//! Exception translation for axum services.
//!
//! Handlers raise an [`ApiException`]. Faultline logs it once and answers the
//! client with a normalized error envelope:
//!
//! ```json
//! { "message": "Validation failed", "errors": { "email": ["Enter a valid email address."] }, "status_code": 400 }
//! ```
//!
//! ## Features
//!
//! - **Closed exception taxonomy**: validation, authentication, permission, not-found, throttling and more
//! - **Stable client messages**: well-known kinds always get the same human-readable message
//! - **Explicit debug mode**: raw exception text is exposed only when the caller asks for it
//! - **Injectable logging**: records go through an [`ErrorSink`], `tracing` by default
//! - **Tower integration**: [`ExceptionLayer`] attaches route and method context
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use faultline::prelude::*;
//! use axum::routing::get;
//!
//! async fn get_order(Path(id): Path<u64>) -> std::result::Result<Json<serde_json::Value>, ApiException> {
//!     if id == 0 {
//!         return Err(ApiException::validation("id must be positive"));
//!     }
//!     Err(ApiException::object_does_not_exist("Order"))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ConfigService::new();
//!     let app = Router::new()
//!         .route("/orders/{id}", get(get_order))
//!         .route_layer(ExceptionLayer::from_config(&config).unwrap());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod common;
pub mod config;
pub mod error;
pub mod exception;

// Re-export core types
pub use common::{ErrorPayload, error_response};
pub use config::ConfigService;
pub use error::{FaultlineError, Result};
pub use exception::{
    ApiException, ErrorKind, ErrorSink, ExceptionContext, ExceptionFilter, ExceptionLayer,
    ExceptionTranslator, HttpExceptionFilter, TracingSink,
};

// Re-export commonly used types from dependencies
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use faultline::prelude::*;
/// ```
pub mod prelude {
    pub use crate::common::{ErrorPayload, error_response};
    pub use crate::config::ConfigService;
    pub use crate::error::{FaultlineError, Result};
    pub use crate::exception::{
        ApiException, ErrorKind, ErrorRecord, ErrorSink, ExceptionContext, ExceptionFilter,
        ExceptionLayer, ExceptionTranslator, HttpExceptionFilter, TracingSink,
    };
    pub use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
