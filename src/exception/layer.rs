use crate::config::ConfigService;
use crate::error::Result;
use crate::exception::{
    ApiException, ExceptionContext, ExceptionFilter, ExceptionTranslator, HttpExceptionFilter,
};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// An exception travelling on a response, waiting for [`ExceptionMiddleware`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub(crate) struct RaisedException(pub(crate) Arc<ApiException>);

/// Handlers can return `Result<T, ApiException>` directly.
///
/// Without an [`ExceptionLayer`] the client still receives the error envelope
/// (debug off, nothing logged). With one, the layer re-translates the
/// exception with the request context.
impl IntoResponse for ApiException {
    fn into_response(self) -> Response {
        let mut response =
            ExceptionTranslator::render(&self, &ExceptionContext::default(), false).into_response();
        response
            .extensions_mut()
            .insert(RaisedException(Arc::new(self)));
        response
    }
}

/// Largest rejection body read back as exception detail.
const REJECTION_BODY_LIMIT: usize = 16 * 1024;

/// Client errors produced by axum itself (extractor rejections, the 405 of a
/// method router) carry no exception and no JSON envelope.
fn is_framework_rejection(response: &Response) -> bool {
    let json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes().starts_with(b"application/json"));
    response.status().is_client_error() && !json
}

async fn rejection_to_exception(response: Response, method: &Method) -> ApiException {
    let status = response.status();
    let detail = match axum::body::to_bytes(response.into_body(), REJECTION_BODY_LIMIT).await {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).trim().to_string()),
        Err(e) => {
            tracing::debug!("Could not read rejection body: {}", e);
            None
        }
    }
    .filter(|detail| !detail.is_empty());

    if status == StatusCode::METHOD_NOT_ALLOWED {
        return ApiException::method_not_allowed(method);
    }
    match (status.as_u16(), detail) {
        (400, detail) => ApiException::ParseError { detail },
        (415, Some(detail)) => ApiException::UnsupportedMediaType { detail },
        (422, Some(detail)) => ApiException::validation(detail),
        (_, detail) => ApiException::Api { status, detail },
    }
}

/// Tower Layer that hands raised exceptions to an [`ExceptionFilter`]
///
/// Apply it with `Router::route_layer` so the matched route is known and can
/// be reported as the view. Client errors axum produces on its own, such as
/// extractor rejections and 405 responses, are turned into the matching
/// [`ApiException`] first. JSON error responses built by handlers pass through.
///
/// # Example
/// ```
/// use axum::{Router, routing::get};
/// use faultline::config::ConfigService;
/// use faultline::exception::{ApiException, ExceptionLayer};
///
/// async fn find_order() -> Result<String, ApiException> {
///     Err(ApiException::object_does_not_exist("Order"))
/// }
///
/// let layer = ExceptionLayer::from_config(&ConfigService::new()).unwrap();
/// let app: Router = Router::new()
///     .route("/orders/{id}", get(find_order))
///     .route_layer(layer);
/// ```
#[derive(Clone)]
pub struct ExceptionLayer {
    filter: Arc<dyn ExceptionFilter>,
    authenticate_header: Option<String>,
}

impl ExceptionLayer {
    pub fn new(filter: impl ExceptionFilter) -> Self {
        Self {
            filter: Arc::new(filter),
            authenticate_header: None,
        }
    }

    /// Use the [`HttpExceptionFilter`] with the configured debug flag.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let debug = config.debug()?;
        if debug {
            tracing::warn!("Debug mode is on; exception details will be sent to clients");
        }
        Ok(Self::new(HttpExceptionFilter::new(
            Arc::new(ExceptionTranslator::default()),
            debug,
        )))
    }

    /// Challenge reported to clients failing authentication.
    pub fn with_authenticate_header(mut self, challenge: impl Into<String>) -> Self {
        self.authenticate_header = Some(challenge.into());
        self
    }
}

impl<S> Layer<S> for ExceptionLayer {
    type Service = ExceptionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ExceptionMiddleware {
            inner,
            filter: self.filter.clone(),
            authenticate_header: self.authenticate_header.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ExceptionMiddleware<S> {
    inner: S,
    filter: Arc<dyn ExceptionFilter>,
    authenticate_header: Option<String>,
}

impl<S> ExceptionMiddleware<S> {
    fn context_for(&self, request: &Request<Body>) -> ExceptionContext {
        let mut context = ExceptionContext::new().with_method(request.method().clone());
        if let Some(path) = request.extensions().get::<MatchedPath>() {
            context = context.with_view(path.as_str());
        }
        if let Some(challenge) = &self.authenticate_header {
            context = context.with_authenticate_header(challenge.as_str());
        }
        context
    }
}

impl<S> Service<Request<Body>> for ExceptionMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let context = self.context_for(&request);
        let method = request.method().clone();
        let filter = self.filter.clone();

        // Keep the instance that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let mut response = inner.call(request).await?;
            if let Some(raised) = response.extensions_mut().remove::<RaisedException>() {
                return Ok(filter.catch(Box::new(raised), &context));
            }
            if !is_framework_rejection(&response) {
                return Ok(response);
            }

            let allow = response.headers().get(header::ALLOW).cloned();
            let exception = rejection_to_exception(response, &method).await;
            let mut response = filter.catch(Box::new(exception), &context);
            if let Some(allow) = allow {
                response.headers_mut().insert(header::ALLOW, allow);
            }
            Ok(response)
        })
    }
}
