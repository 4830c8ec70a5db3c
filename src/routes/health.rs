//! Liveness endpoints

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::response::{json_response, text_response, FullBody};
use crate::server::AppState;

/// Body of `GET /`
pub const BANNER: &str = "sports haven Server is running..";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Backend in use (`mongodb` or `memory`)
    pub store: &'static str,
    pub version: &'static str,
    /// Current timestamp
    pub timestamp: String,
}

/// `GET /`
pub fn root_banner() -> Response<FullBody> {
    text_response(StatusCode::OK, BANNER)
}

/// `GET /health`. Does not touch the store.
pub fn health_check(state: &AppState) -> Response<FullBody> {
    json_response(
        StatusCode::OK,
        &HealthResponse {
            status: "ok",
            store: state.store.kind(),
            version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now().to_rfc3339(),
        },
    )
}
