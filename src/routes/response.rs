//! Response builders shared by the route handlers
//!
//! Every response carries the permissive CORS headers storefront clients
//! rely on (`*` origin with credentials).

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderMap, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::HavenError;

pub type FullBody = Full<Bytes>;

/// Methods advertised in CORS preflight responses
pub const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// JSON response with CORS headers
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    match serde_json::to_string(body) {
        Ok(json) => raw_json_response(status, json),
        Err(_) => internal_error_response(),
    }
}

fn raw_json_response(status: StatusCode, json: String) -> Response<FullBody> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Credentials", "true")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|_| internal_error_response())
}

/// Plain text response with CORS headers
pub fn text_response(status: StatusCode, body: &'static str) -> Response<FullBody> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Credentials", "true")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| internal_error_response())
}

/// Error envelope response for a `HavenError`
pub fn error_response(err: HavenError) -> Response<FullBody> {
    let (status, body) = err.into_status_code_and_body();
    raw_json_response(status, body)
}

/// 404 for paths no handler claims
pub fn not_found_response(method: &hyper::Method, path: &str) -> Response<FullBody> {
    error_response(HavenError::NotFound(format!("Cannot {} {}", method, path)))
}

/// CORS preflight response
///
/// Reflects `Access-Control-Request-Headers` so clients can send
/// `Authorization` and `Content-Type`.
pub fn preflight_response(request_headers: &HeaderMap) -> Response<FullBody> {
    let allow_headers = request_headers
        .get("Access-Control-Request-Headers")
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("Authorization, Content-Type"));

    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Credentials", "true")
        .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
        .header("Access-Control-Allow-Headers", allow_headers)
        .header("Vary", "Access-Control-Request-Headers")
        .header("Content-Length", "0")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| internal_error_response())
}

/// Parse a request body as a JSON value. An empty body reads as `{}`.
pub fn parse_json_body(body: &[u8]) -> Result<Value, HavenError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    Ok(serde_json::from_slice(body)?)
}

fn internal_error_response() -> Response<FullBody> {
    let mut response = Response::new(Full::new(Bytes::from(
        r#"{"error":true,"message":"Failed to build response"}"#,
    )));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn body_json(response: Response<FullBody>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_json_response_has_cors_headers() {
        let response = json_response(StatusCode::OK, &json!({ "ok": true }));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(response.headers()["Access-Control-Allow-Credentials"], "true");
        assert_eq!(response.headers()["Content-Type"], "application/json");
        assert_eq!(body_json(response).await, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_error_response_envelope() {
        let response = error_response(HavenError::forbidden());
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            json!({ "error": true, "message": "forbidden access" })
        );
    }

    #[test]
    fn test_preflight_reflects_request_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "access-control-request-headers",
            HeaderValue::from_static("authorization, x-custom"),
        );

        let response = preflight_response(&headers);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()["Access-Control-Allow-Headers"],
            "authorization, x-custom"
        );
        assert_eq!(
            response.headers()["Access-Control-Allow-Methods"],
            ALLOWED_METHODS
        );
    }

    #[test]
    fn test_parse_json_body() {
        assert_eq!(parse_json_body(br#"{"a":1}"#).unwrap(), json!({ "a": 1 }));
        assert_eq!(parse_json_body(b"").unwrap(), json!({}));
        assert_eq!(parse_json_body(b" \r\n").unwrap(), json!({}));
        assert!(matches!(parse_json_body(b"{oops"), Err(HavenError::BadRequest(_))));
    }
}
