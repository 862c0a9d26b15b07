//! The exception taxonomy handlers raise.

use axum::extract::rejection::JsonRejection;
use axum::http::{Method, StatusCode};
use serde_json::Value;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter};
use thiserror::Error;

const PARSE_ERROR: &str = "Malformed request.";
const AUTHENTICATION_FAILED: &str = "Incorrect authentication credentials.";
const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";
const NOT_FOUND: &str = "Not found.";
const NOT_ACCEPTABLE: &str = "Could not satisfy the request Accept header.";
const SERVER_ERROR: &str = "A server error occurred.";

/// Coarse classification of an exception.
///
/// Variants are declared in message-priority order. `Unhandled` is the
/// catch-all for everything without a dedicated client message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
pub enum ErrorKind {
    Validation,
    AuthenticationFailed,
    PermissionDenied,
    NotAuthenticated,
    NotFound,
    Unhandled,
}

/// An exception raised while handling a request.
///
/// `Display` is the exception's string form; it is what ends up in logs and,
/// in debug mode, under the `"exception"` key of the error envelope.
#[derive(Debug, Error)]
pub enum ApiException {
    /// `detail` is a message, a list of messages, or a field → messages object.
    #[error("{}", render_detail(.detail))]
    Validation { detail: Value },

    #[error("{}", .detail.as_deref().unwrap_or(PARSE_ERROR))]
    ParseError { detail: Option<String> },

    #[error("{}", .detail.as_deref().unwrap_or(AUTHENTICATION_FAILED))]
    AuthenticationFailed { detail: Option<String> },

    #[error("{}", .detail.as_deref().unwrap_or(NOT_AUTHENTICATED))]
    NotAuthenticated { detail: Option<String> },

    #[error("{}", .detail.as_deref().unwrap_or(PERMISSION_DENIED))]
    PermissionDenied { detail: Option<String> },

    #[error("{}", .detail.as_deref().unwrap_or(NOT_FOUND))]
    NotFound { detail: Option<String> },

    /// A lookup matched no record of `object`.
    #[error("No {object} matches the given query.")]
    ObjectDoesNotExist { object: String },

    #[error("{detail}")]
    MethodNotAllowed { detail: String },

    #[error("{}", .detail.as_deref().unwrap_or(NOT_ACCEPTABLE))]
    NotAcceptable { detail: Option<String> },

    #[error("{detail}")]
    UnsupportedMediaType { detail: String },

    /// `wait` is the number of seconds until the client may retry.
    #[error("{}", throttled_detail(.wait))]
    Throttled { wait: Option<u64> },

    /// Any other API-level failure with an explicit status.
    #[error("{}", .detail.as_deref().unwrap_or(SERVER_ERROR))]
    Api {
        status: StatusCode,
        detail: Option<String>,
    },

    /// Anything the framework has no mapping for.
    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

fn render_detail(detail: &Value) -> String {
    match detail {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    }
}

fn throttled_detail(wait: &Option<u64>) -> String {
    match wait {
        Some(1) => "Request was throttled. Expected available in 1 second.".to_string(),
        Some(seconds) => {
            format!("Request was throttled. Expected available in {seconds} seconds.")
        }
        None => "Request was throttled.".to_string(),
    }
}

impl ApiException {
    pub fn validation(detail: impl Into<Value>) -> Self {
        Self::Validation {
            detail: detail.into(),
        }
    }

    /// Validation failure keyed by field name.
    pub fn field_errors<I, K, M>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, M)>,
        K: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        let detail = fields
            .into_iter()
            .map(|(field, messages)| {
                let messages = messages
                    .into_iter()
                    .map(|m| Value::String(m.into()))
                    .collect();
                (field.into(), Value::Array(messages))
            })
            .collect();
        Self::Validation {
            detail: Value::Object(detail),
        }
    }

    pub fn parse_error() -> Self {
        Self::ParseError { detail: None }
    }

    pub fn authentication_failed() -> Self {
        Self::AuthenticationFailed { detail: None }
    }

    pub fn not_authenticated() -> Self {
        Self::NotAuthenticated { detail: None }
    }

    pub fn permission_denied() -> Self {
        Self::PermissionDenied { detail: None }
    }

    pub fn not_found() -> Self {
        Self::NotFound { detail: None }
    }

    pub fn object_does_not_exist(object: impl Into<String>) -> Self {
        Self::ObjectDoesNotExist {
            object: object.into(),
        }
    }

    pub fn method_not_allowed(method: &Method) -> Self {
        Self::MethodNotAllowed {
            detail: format!("Method \"{method}\" not allowed."),
        }
    }

    pub fn not_acceptable() -> Self {
        Self::NotAcceptable { detail: None }
    }

    pub fn unsupported_media_type(media_type: impl AsRef<str>) -> Self {
        Self::UnsupportedMediaType {
            detail: format!("Unsupported media type \"{}\" in request.", media_type.as_ref()),
        }
    }

    pub fn throttled(wait: Option<u64>) -> Self {
        Self::Throttled { wait }
    }

    pub fn api(status: StatusCode) -> Self {
        Self::Api {
            status,
            detail: None,
        }
    }

    /// Replace the default client-facing detail.
    ///
    /// Variants whose detail is derived from their fields are returned unchanged.
    pub fn with_detail(self, detail: impl Into<String>) -> Self {
        let detail = Some(detail.into());
        match self {
            Self::ParseError { .. } => Self::ParseError { detail },
            Self::AuthenticationFailed { .. } => Self::AuthenticationFailed { detail },
            Self::NotAuthenticated { .. } => Self::NotAuthenticated { detail },
            Self::PermissionDenied { .. } => Self::PermissionDenied { detail },
            Self::NotFound { .. } => Self::NotFound { detail },
            Self::NotAcceptable { .. } => Self::NotAcceptable { detail },
            Self::Api { status, .. } => Self::Api { status, detail },
            other => other,
        }
    }

    /// Status the framework assigns before any authentication coercion.
    /// `None` for unhandled exceptions.
    pub fn status_code(&self) -> Option<StatusCode> {
        let status = match self {
            Self::Validation { .. } | Self::ParseError { .. } => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailed { .. } | Self::NotAuthenticated { .. } => {
                StatusCode::UNAUTHORIZED
            }
            Self::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } | Self::ObjectDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotAcceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Api { status, .. } => *status,
            Self::Unhandled(_) => return None,
        };
        Some(status)
    }

    /// Whether this exception satisfies `kind`.
    ///
    /// One exception can satisfy several kinds; `Unhandled` holds only when
    /// no named kind does.
    pub fn is(&self, kind: ErrorKind) -> bool {
        match kind {
            ErrorKind::Validation => matches!(self, Self::Validation { .. }),
            ErrorKind::AuthenticationFailed => matches!(self, Self::AuthenticationFailed { .. }),
            ErrorKind::PermissionDenied => matches!(self, Self::PermissionDenied { .. }),
            ErrorKind::NotAuthenticated => matches!(self, Self::NotAuthenticated { .. }),
            ErrorKind::NotFound => {
                matches!(self, Self::NotFound { .. } | Self::ObjectDoesNotExist { .. })
            }
            ErrorKind::Unhandled => self.kind() == ErrorKind::Unhandled,
        }
    }

    /// The highest-priority kind this exception satisfies.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::iter()
            .filter(|kind| *kind != ErrorKind::Unhandled)
            .find(|kind| self.is(*kind))
            .unwrap_or(ErrorKind::Unhandled)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for ApiException {
    fn from(error: Box<dyn std::error::Error + Send + Sync>) -> Self {
        match error.downcast::<ApiException>() {
            Ok(exception) => *exception,
            Err(error) => Self::Unhandled(anyhow::anyhow!(error)),
        }
    }
}

impl From<JsonRejection> for ApiException {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => Self::validation(err.body_text()),
            JsonRejection::JsonSyntaxError(err) => Self::ParseError {
                detail: Some(err.body_text()),
            },
            JsonRejection::MissingJsonContentType(err) => Self::UnsupportedMediaType {
                detail: err.body_text(),
            },
            other => Self::ParseError {
                detail: Some(other.body_text()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_uses_default_detail() {
        assert_eq!(
            ApiException::permission_denied().to_string(),
            "You do not have permission to perform this action."
        );
        assert_eq!(ApiException::not_found().to_string(), "Not found.");
        assert_eq!(
            ApiException::not_found().with_detail("No such order").to_string(),
            "No such order"
        );
        assert_eq!(
            ApiException::api(StatusCode::BAD_GATEWAY).to_string(),
            "A server error occurred."
        );
    }

    #[test]
    fn test_display_of_validation_detail() {
        assert_eq!(
            ApiException::validation("field required").to_string(),
            "field required"
        );
        assert_eq!(
            ApiException::validation(json!(["a", "b"])).to_string(),
            r#"["a","b"]"#
        );
    }

    #[test]
    fn test_display_of_derived_details() {
        assert_eq!(
            ApiException::method_not_allowed(&Method::DELETE).to_string(),
            "Method \"DELETE\" not allowed."
        );
        assert_eq!(
            ApiException::unsupported_media_type("text/plain").to_string(),
            "Unsupported media type \"text/plain\" in request."
        );
        assert_eq!(
            ApiException::object_does_not_exist("Order").to_string(),
            "No Order matches the given query."
        );
        assert_eq!(
            ApiException::throttled(None).to_string(),
            "Request was throttled."
        );
        assert_eq!(
            ApiException::throttled(Some(1)).to_string(),
            "Request was throttled. Expected available in 1 second."
        );
        assert_eq!(
            ApiException::throttled(Some(30)).to_string(),
            "Request was throttled. Expected available in 30 seconds."
        );
    }

    #[test]
    fn test_with_detail_ignores_derived_variants() {
        let exception = ApiException::throttled(Some(5)).with_detail("slow down");
        assert!(matches!(exception, ApiException::Throttled { wait: Some(5) }));
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(ApiException::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(
            ApiException::authentication_failed().kind(),
            ErrorKind::AuthenticationFailed
        );
        assert_eq!(
            ApiException::permission_denied().kind(),
            ErrorKind::PermissionDenied
        );
        assert_eq!(
            ApiException::not_authenticated().kind(),
            ErrorKind::NotAuthenticated
        );
        assert_eq!(ApiException::not_found().kind(), ErrorKind::NotFound);
        assert_eq!(
            ApiException::object_does_not_exist("Order").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(ApiException::throttled(None).kind(), ErrorKind::Unhandled);
        assert_eq!(
            ApiException::from(anyhow::anyhow!("boom")).kind(),
            ErrorKind::Unhandled
        );
    }

    #[test]
    fn test_unhandled_only_when_nothing_else_matches() {
        let exception = ApiException::not_found();
        assert!(exception.is(ErrorKind::NotFound));
        assert!(!exception.is(ErrorKind::Unhandled));

        let exception = ApiException::parse_error();
        assert!(exception.is(ErrorKind::Unhandled));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiException::validation("x").status_code(),
            Some(StatusCode::BAD_REQUEST)
        );
        assert_eq!(
            ApiException::throttled(None).status_code(),
            Some(StatusCode::TOO_MANY_REQUESTS)
        );
        assert_eq!(
            ApiException::api(StatusCode::CONFLICT).status_code(),
            Some(StatusCode::CONFLICT)
        );
        assert_eq!(
            ApiException::from(anyhow::anyhow!("boom")).status_code(),
            None
        );
    }

    #[test]
    fn test_from_boxed_error() {
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(ApiException::not_found());
        assert!(matches!(
            ApiException::from(boxed),
            ApiException::NotFound { .. }
        ));

        let boxed: Box<dyn std::error::Error + Send + Sync> =
            Box::new(std::io::Error::other("disk on fire"));
        let exception = ApiException::from(boxed);
        assert!(matches!(exception, ApiException::Unhandled(_)));
        assert_eq!(exception.to_string(), "disk on fire");
    }

    #[test]
    fn test_field_errors() {
        let exception = ApiException::field_errors([("email", ["This field is required."])]);
        match exception {
            ApiException::Validation { detail } => {
                assert_eq!(detail, json!({ "email": ["This field is required."] }))
            }
            other => panic!("unexpected exception: {other:?}"),
        }
    }
}
