use crate::exception::layer::RaisedException;
use crate::exception::{ApiException, ExceptionContext, ExceptionFilter, ExceptionTranslator};
use axum::response::{IntoResponse, Response};
use std::error::Error;
use std::sync::Arc;

/// The default exception filter
///
/// Answers every error with the standard error envelope. Errors that are not
/// an [`ApiException`] are treated as unhandled.
#[derive(Clone, Default)]
pub struct HttpExceptionFilter {
    translator: Arc<ExceptionTranslator>,
    debug: bool,
}

impl HttpExceptionFilter {
    pub fn new(translator: Arc<ExceptionTranslator>, debug: bool) -> Self {
        Self { translator, debug }
    }

    fn respond(&self, exception: &ApiException, host: &ExceptionContext) -> Response {
        self.translator
            .translate(exception, host, self.debug)
            .into_response()
    }
}

impl ExceptionFilter for HttpExceptionFilter {
    fn catch(&self, error: Box<dyn Error + Send + Sync>, host: &ExceptionContext) -> Response {
        if let Some(exception) = error.downcast_ref::<ApiException>() {
            return self.respond(exception, host);
        }
        if let Some(RaisedException(exception)) = error.downcast_ref::<RaisedException>() {
            return self.respond(exception, host);
        }
        self.respond(&ApiException::from(error), host)
    }
}
