//! Order endpoints
//!
//! Placing an order empties the buyer's cart and then stores the order as
//! two separate writes. If the insert fails after the purge, the cart items
//! are gone and no order exists; nothing compensates.

use bson::Document;
use hyper::{Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::verify_request;
use crate::db::documents::{document_to_json, email_filter, id_filter, json_to_document};
use crate::db::{Collection, SortBy};
use crate::routes::response::{json_response, parse_json_body, FullBody};
use crate::routes::{admin_only, ApiRequest};
use crate::server::AppState;
use crate::types::HavenError;

fn to_json_array(docs: &[Document]) -> Vec<Value> {
    docs.iter().map(document_to_json).collect()
}

/// `GET /orders/:email` (token): the buyer's orders, newest first
pub async fn list_user_orders(
    state: &AppState,
    req: &ApiRequest,
    email: &str,
) -> Result<Response<FullBody>, HavenError> {
    verify_request(state, req)?;

    let orders = state
        .store
        .find(Collection::Orders, email_filter(email), Some(SortBy::descending("date")))
        .await?;

    Ok(json_response(StatusCode::OK, &to_json_array(&orders)))
}

/// `GET /orders` (admin): every order, newest first
pub async fn list_orders(
    state: &AppState,
    req: &ApiRequest,
) -> Result<Response<FullBody>, HavenError> {
    admin_only(state, req).await?;

    let orders = state
        .store
        .find(Collection::Orders, Document::new(), Some(SortBy::descending("date")))
        .await?;

    Ok(json_response(StatusCode::OK, &to_json_array(&orders)))
}

/// `GET /orders/details/:id` (admin)
pub async fn get_order(
    state: &AppState,
    req: &ApiRequest,
    id: &str,
) -> Result<Response<FullBody>, HavenError> {
    admin_only(state, req).await?;

    let order = state
        .store
        .find_one(Collection::Orders, id_filter(id)?)
        .await?;
    let body = order.as_ref().map(document_to_json).unwrap_or(Value::Null);

    Ok(json_response(StatusCode::OK, &body))
}

/// `POST /orders/:email` (token): purge the cart, then record the order
pub async fn place_order(
    state: &AppState,
    req: &ApiRequest,
    email: &str,
) -> Result<Response<FullBody>, HavenError> {
    verify_request(state, req)?;
    let order = json_to_document(parse_json_body(&req.body)?)?;

    let purged = state
        .store
        .delete_many(Collection::Carts, email_filter(email))
        .await?;
    debug!("Removed {} cart item(s) for {}", purged.deleted_count, email);

    let result = state.store.insert_one(Collection::Orders, order).await?;
    info!("Order placed for {}", email);

    Ok(json_response(StatusCode::OK, &result))
}
