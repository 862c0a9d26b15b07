use super::defaults::{PreliminaryResponse, preliminary_response};
use super::sink::{ErrorRecord, ErrorSink, TracingSink};
use super::{ApiException, ErrorKind, ExceptionContext};
use crate::common::ErrorPayload;
use serde_json::{Map, Value};
use std::sync::Arc;

const UNEXPECTED_ERROR: &str = "An unexpected error occurred";
const FALLBACK_MESSAGE: &str = "Validation errors";

/// Client messages, checked top to bottom; the first kind the exception
/// satisfies wins.
const MESSAGE_RULES: [(ErrorKind, &str); 5] = [
    (ErrorKind::Validation, "Validation failed"),
    (ErrorKind::AuthenticationFailed, "Authentication failed"),
    (
        ErrorKind::PermissionDenied,
        "You do not have permission to perform this action",
    ),
    (
        ErrorKind::NotAuthenticated,
        "Authentication credentials were not provided",
    ),
    (ErrorKind::NotFound, "The requested resource was not found"),
];

/// Fixed client message for an exception, if its kind has one.
pub fn message_for(exception: &ApiException) -> Option<&'static str> {
    MESSAGE_RULES
        .iter()
        .find(|(kind, _)| exception.is(*kind))
        .map(|(_, message)| *message)
}

/// Turns raised exceptions into error envelopes.
///
/// Every call to [`translate`](Self::translate) writes exactly one record to
/// the sink. The debug flag is always supplied by the caller.
#[derive(Clone)]
pub struct ExceptionTranslator {
    sink: Arc<dyn ErrorSink>,
}

impl Default for ExceptionTranslator {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl ExceptionTranslator {
    pub fn new(sink: Arc<dyn ErrorSink>) -> Self {
        Self { sink }
    }

    /// Log the exception and build its envelope.
    pub fn translate(
        &self,
        exception: &ApiException,
        context: &ExceptionContext,
        debug: bool,
    ) -> ErrorPayload {
        let preliminary = preliminary_response(exception, context);
        self.sink.record(&ErrorRecord::new(context, exception));
        envelope(exception, preliminary, debug)
    }

    /// Build the envelope without logging.
    pub fn render(exception: &ApiException, context: &ExceptionContext, debug: bool) -> ErrorPayload {
        envelope(exception, preliminary_response(exception, context), debug)
    }
}

fn envelope(
    exception: &ApiException,
    preliminary: Option<PreliminaryResponse>,
    debug: bool,
) -> ErrorPayload {
    let Some(PreliminaryResponse {
        status,
        data: mut errors,
        headers,
    }) = preliminary
    else {
        return ErrorPayload::new(UNEXPECTED_ERROR, Map::new(), 500);
    };

    let detail = match errors.remove("detail") {
        Some(Value::String(detail)) => detail,
        Some(other) => other.to_string(),
        None => FALLBACK_MESSAGE.to_string(),
    };
    let message = message_for(exception).map_or(detail, str::to_string);

    if debug {
        errors.insert(
            "exception".to_string(),
            Value::String(exception.to_string()),
        );
    }

    ErrorPayload::new(message, errors, status.as_u16()).with_headers(headers)
}
