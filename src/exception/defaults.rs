//! Built-in exception → HTTP mapping applied before any customization.

use super::{ApiException, ExceptionContext};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use serde_json::{Map, Value};

/// Key that collects validation messages not tied to a single field.
pub const NON_FIELD_ERRORS_KEY: &str = "non_field_errors";

/// The framework's default answer to an exception.
#[derive(Debug, Clone, PartialEq)]
pub struct PreliminaryResponse {
    pub status: StatusCode,
    pub data: Map<String, Value>,
    pub headers: HeaderMap,
}

/// Map an exception to its default response.
///
/// Returns `None` for exceptions the framework has no mapping for.
pub fn preliminary_response(
    exception: &ApiException,
    context: &ExceptionContext,
) -> Option<PreliminaryResponse> {
    let mut status = exception.status_code()?;
    let mut headers = HeaderMap::new();

    let data = match exception {
        ApiException::Validation { detail } => validation_data(detail),
        other => detail_data(other),
    };

    match exception {
        ApiException::AuthenticationFailed { .. } | ApiException::NotAuthenticated { .. } => {
            match authenticate_header(context) {
                Some(challenge) => {
                    headers.insert(header::WWW_AUTHENTICATE, challenge);
                }
                None => status = StatusCode::FORBIDDEN,
            }
        }
        ApiException::Throttled { wait: Some(wait) } => {
            headers.insert(header::RETRY_AFTER, HeaderValue::from(*wait));
        }
        _ => {}
    }

    Some(PreliminaryResponse {
        status,
        data,
        headers,
    })
}

fn authenticate_header(context: &ExceptionContext) -> Option<HeaderValue> {
    let challenge = context.authenticate_header()?;
    match HeaderValue::from_str(challenge) {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(challenge, "Ignoring unusable WWW-Authenticate challenge");
            None
        }
    }
}

fn detail_data(exception: &ApiException) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("detail".to_string(), Value::String(exception.to_string()));
    data
}

fn validation_data(detail: &Value) -> Map<String, Value> {
    let messages = match detail {
        Value::Object(fields) => return fields.clone(),
        Value::Array(messages) => messages.clone(),
        Value::String(_) => vec![detail.clone()],
        other => vec![Value::String(other.to_string())],
    };

    let mut data = Map::new();
    data.insert(NON_FIELD_ERRORS_KEY.to_string(), Value::Array(messages));
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_unhandled_has_no_response() {
        let exception = ApiException::from(anyhow::anyhow!("boom"));
        assert!(preliminary_response(&exception, &ExceptionContext::new()).is_none());
    }

    #[test]
    fn test_validation_string_becomes_non_field_error() {
        let response = preliminary_response(
            &ApiException::validation("field required"),
            &ExceptionContext::new(),
        )
        .unwrap();

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.data,
            data(json!({ "non_field_errors": ["field required"] }))
        );
    }

    #[test]
    fn test_validation_object_is_kept() {
        let detail = json!({ "email": ["Enter a valid email address."] });
        let response = preliminary_response(
            &ApiException::validation(detail.clone()),
            &ExceptionContext::new(),
        )
        .unwrap();

        assert_eq!(response.data, data(detail));
    }

    #[test]
    fn test_detail_responses() {
        let cases = [
            (ApiException::parse_error(), 400, "Malformed request."),
            (
                ApiException::permission_denied(),
                403,
                "You do not have permission to perform this action.",
            ),
            (ApiException::not_found(), 404, "Not found."),
            (
                ApiException::object_does_not_exist("Order"),
                404,
                "No Order matches the given query.",
            ),
            (
                ApiException::method_not_allowed(&Method::PUT),
                405,
                "Method \"PUT\" not allowed.",
            ),
            (
                ApiException::not_acceptable(),
                406,
                "Could not satisfy the request Accept header.",
            ),
            (
                ApiException::unsupported_media_type("text/xml"),
                415,
                "Unsupported media type \"text/xml\" in request.",
            ),
            (
                ApiException::api(StatusCode::SERVICE_UNAVAILABLE).with_detail("Try later."),
                503,
                "Try later.",
            ),
        ];

        for (exception, status, detail) in cases {
            let response = preliminary_response(&exception, &ExceptionContext::new()).unwrap();
            assert_eq!(response.status.as_u16(), status, "{exception:?}");
            assert_eq!(response.data, data(json!({ "detail": detail })));
        }
    }

    #[test]
    fn test_authentication_without_challenge_is_forbidden() {
        for exception in [
            ApiException::not_authenticated(),
            ApiException::authentication_failed(),
        ] {
            let response = preliminary_response(&exception, &ExceptionContext::new()).unwrap();
            assert_eq!(response.status, StatusCode::FORBIDDEN);
            assert!(response.headers.get(header::WWW_AUTHENTICATE).is_none());
        }
    }

    #[test]
    fn test_authentication_with_challenge_is_unauthorized() {
        let context = ExceptionContext::new().with_authenticate_header("Bearer realm=\"api\"");
        let response = preliminary_response(&ApiException::not_authenticated(), &context).unwrap();

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers.get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer realm=\"api\""
        );
    }

    #[test]
    fn test_unusable_challenge_falls_back_to_forbidden() {
        let context = ExceptionContext::new().with_authenticate_header("Bearer\nrealm");
        let response =
            preliminary_response(&ApiException::authentication_failed(), &context).unwrap();
        assert_eq!(response.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_throttled_sets_retry_after() {
        let response =
            preliminary_response(&ApiException::throttled(Some(30)), &ExceptionContext::new())
                .unwrap();

        assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers.get(header::RETRY_AFTER).unwrap(), "30");

        let response =
            preliminary_response(&ApiException::throttled(None), &ExceptionContext::new())
                .unwrap();
        assert!(response.headers.get(header::RETRY_AFTER).is_none());
    }
}
