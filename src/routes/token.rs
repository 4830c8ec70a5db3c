//! Token issuance
//!
//! `POST /jwt` signs the posted JSON object and returns `{"token": ...}`.

use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::routes::response::{json_response, parse_json_body, FullBody};
use crate::routes::ApiRequest;
use crate::server::AppState;
use crate::types::HavenError;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Handle `POST /jwt`
pub fn issue_token(state: &AppState, req: &ApiRequest) -> Result<Response<FullBody>, HavenError> {
    let payload = match parse_json_body(&req.body)? {
        Value::Object(map) => map,
        _ => {
            return Err(HavenError::BadRequest(
                "Token payload must be a JSON object".into(),
            ))
        }
    };

    let subject = payload
        .get("email")
        .and_then(Value::as_str)
        .unwrap_or("<no email>")
        .to_string();
    let token = state.jwt.sign_payload(payload)?;
    debug!("Issued token for {}", subject);

    Ok(json_response(StatusCode::OK, &TokenResponse { token }))
}
