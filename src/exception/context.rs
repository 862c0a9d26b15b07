use axum::http::Method;

/// Request-side information available when an exception is handled.
///
/// Every field is optional: exceptions raised outside of routing carry no
/// view, and filters invoked by hand may not know the method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionContext {
    view: Option<String>,
    method: Option<Method>,
    authenticate_header: Option<String>,
}

impl ExceptionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier of the handler that raised, e.g. its route path.
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// `WWW-Authenticate` challenge of the active authentication scheme.
    ///
    /// Without one, authentication failures are answered with 403 instead of 401.
    pub fn with_authenticate_header(mut self, challenge: impl Into<String>) -> Self {
        self.authenticate_header = Some(challenge.into());
        self
    }

    pub fn view(&self) -> Option<&str> {
        self.view.as_deref()
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn authenticate_header(&self) -> Option<&str> {
        self.authenticate_header.as_deref()
    }
}
