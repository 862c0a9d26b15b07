use super::{ApiException, ErrorKind, ExceptionContext};
use std::fmt;

const UNKNOWN: &str = "Unknown";

/// One handled exception, as seen by the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord<'a> {
    pub view: &'a str,
    pub method: &'a str,
    pub kind: ErrorKind,
    pub exception: String,
}

impl<'a> ErrorRecord<'a> {
    pub fn new(context: &'a ExceptionContext, exception: &ApiException) -> Self {
        Self {
            view: context.view().unwrap_or(UNKNOWN),
            method: context.method().map_or(UNKNOWN, |m| m.as_str()),
            kind: exception.kind(),
            exception: exception.to_string(),
        }
    }
}

impl fmt::Display for ErrorRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error occurred in view: {}, method: {}, exception: {}",
            self.view, self.method, self.exception
        )
    }
}

/// Destination for error records.
pub trait ErrorSink: Send + Sync + 'static {
    fn record(&self, record: &ErrorRecord<'_>);
}

/// Emits every record as an error-level `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn record(&self, record: &ErrorRecord<'_>) {
        tracing::error!(
            view = record.view,
            method = record.method,
            kind = record.kind.as_ref(),
            exception = %record.exception,
            "{record}"
        );
    }
}
