//! Account endpoints
//!
//! Accounts are keyed by email and written only through the upsert in
//! `PUT /users/:email`. Neither endpoint checks that the caller owns the
//! email in the path.

use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::auth::guard::ADMIN_ROLE;
use crate::db::documents::{document_to_json, email_filter, id_filter, json_to_document};
use crate::db::{Collection, SortBy};
use crate::routes::response::{json_response, parse_json_body, FullBody};
use crate::routes::{admin_only, ApiRequest};
use crate::server::AppState;
use crate::types::HavenError;

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: bool,
}

/// `GET /admin/:email`: whether the account has the admin role
pub async fn check_admin(state: &AppState, email: &str) -> Result<Response<FullBody>, HavenError> {
    if email.is_empty() {
        return Ok(json_response(StatusCode::OK, &RoleResponse { role: false }));
    }

    let user = state
        .store
        .find_one(Collection::Users, email_filter(email))
        .await?;
    let role = user
        .as_ref()
        .and_then(|u| u.get_str("role").ok())
        .is_some_and(|role| role == ADMIN_ROLE);

    Ok(json_response(StatusCode::OK, &RoleResponse { role }))
}

/// `PUT /users/:email`: create or overwrite the account's fields
pub async fn upsert_user(
    state: &AppState,
    req: &ApiRequest,
    email: &str,
) -> Result<Response<FullBody>, HavenError> {
    let set = json_to_document(parse_json_body(&req.body)?)?;

    let result = state
        .store
        .upsert_set(Collection::Users, email_filter(email), set)
        .await?;

    if result.upserted_id.is_some() {
        info!("Created account {}", email);
    }

    Ok(json_response(StatusCode::OK, &result))
}

/// `GET /users` (admin): every account, newest first
pub async fn list_users(
    state: &AppState,
    req: &ApiRequest,
) -> Result<Response<FullBody>, HavenError> {
    admin_only(state, req).await?;

    let users = state
        .store
        .find(Collection::Users, bson::Document::new(), Some(SortBy::descending("date")))
        .await?;
    let body: Vec<Value> = users.iter().map(document_to_json).collect();

    Ok(json_response(StatusCode::OK, &body))
}

/// `GET /customer/:id`: one account by id, or `null`
pub async fn get_customer(state: &AppState, id: &str) -> Result<Response<FullBody>, HavenError> {
    let user = state
        .store
        .find_one(Collection::Users, id_filter(id)?)
        .await?;
    let body = user.as_ref().map(document_to_json).unwrap_or(Value::Null);

    Ok(json_response(StatusCode::OK, &body))
}
