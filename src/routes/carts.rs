//! Cart endpoints
//!
//! Anyone may add an item; reading and removing items needs a valid token.
//! The token's identity is not compared with the path.

use hyper::{Response, StatusCode};
use serde_json::Value;

use crate::auth::verify_request;
use crate::db::documents::{document_to_json, email_filter, id_filter, json_to_document};
use crate::db::Collection;
use crate::routes::response::{json_response, parse_json_body, FullBody};
use crate::routes::ApiRequest;
use crate::server::AppState;
use crate::types::HavenError;

/// `POST /carts`
pub async fn add_to_cart(
    state: &AppState,
    req: &ApiRequest,
) -> Result<Response<FullBody>, HavenError> {
    let item = json_to_document(parse_json_body(&req.body)?)?;
    let result = state.store.insert_one(Collection::Carts, item).await?;

    Ok(json_response(StatusCode::OK, &result))
}

/// `GET /carts/:email` (token)
pub async fn list_carts(
    state: &AppState,
    req: &ApiRequest,
    email: &str,
) -> Result<Response<FullBody>, HavenError> {
    verify_request(state, req)?;

    let items = state
        .store
        .find(Collection::Carts, email_filter(email), None)
        .await?;
    let body: Vec<Value> = items.iter().map(document_to_json).collect();

    Ok(json_response(StatusCode::OK, &body))
}

/// `DELETE /carts/:id` (token)
pub async fn delete_cart_item(
    state: &AppState,
    req: &ApiRequest,
    id: &str,
) -> Result<Response<FullBody>, HavenError> {
    verify_request(state, req)?;

    let result = state
        .store
        .delete_one(Collection::Carts, id_filter(id)?)
        .await?;

    Ok(json_response(StatusCode::OK, &result))
}
