use axum::{
    Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

/// Normalized error envelope
///
/// Every failed request is answered with this shape:
///
/// ```json
/// {
///   "message": "Validation failed",
///   "errors": { "email": ["This field is required."] },
///   "status_code": 400
/// }
/// ```
///
/// `headers` travel with the payload to the HTTP response but are never
/// serialized into the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub message: String,

    pub errors: Map<String, Value>,

    pub status_code: u16,

    #[serde(skip)]
    pub headers: HeaderMap,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>, errors: Map<String, Value>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            errors,
            status_code,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// HTTP status for the response line; unknown codes fall back to 500.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ErrorPayload {
    fn into_response(mut self) -> Response {
        let status = self.status();
        let headers = std::mem::take(&mut self.headers);
        (status, headers, Json(self)).into_response()
    }
}

/// Build the standard error response.
///
/// # Example
/// ```
/// use faultline::common::error_response;
/// use serde_json::Map;
///
/// let response = error_response("An unexpected error occurred", Map::new(), 500);
/// assert_eq!(response.status().as_u16(), 500);
/// ```
pub fn error_response(
    message: impl Into<String>,
    errors: Map<String, Value>,
    status_code: u16,
) -> Response {
    ErrorPayload::new(message, errors, status_code).into_response()
}
