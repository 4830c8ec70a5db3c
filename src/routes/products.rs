//! Product catalogue endpoints. Reads are public, writes need an admin.

use bson::Document;
use hyper::{Response, StatusCode};
use serde_json::Value;
use tracing::info;

use crate::db::documents::{bson_to_json, document_to_json, id_filter, json_to_document};
use crate::db::Collection;
use crate::routes::response::{json_response, parse_json_body, FullBody};
use crate::routes::{admin_only, ApiRequest};
use crate::server::AppState;
use crate::types::HavenError;

/// `GET /products`
pub async fn list_products(state: &AppState) -> Result<Response<FullBody>, HavenError> {
    let products = state
        .store
        .find(Collection::Products, Document::new(), None)
        .await?;
    let body: Vec<Value> = products.iter().map(document_to_json).collect();

    Ok(json_response(StatusCode::OK, &body))
}

/// `GET /products/:id`
pub async fn get_product(state: &AppState, id: &str) -> Result<Response<FullBody>, HavenError> {
    let product = state
        .store
        .find_one(Collection::Products, id_filter(id)?)
        .await?;
    let body = product.as_ref().map(document_to_json).unwrap_or(Value::Null);

    Ok(json_response(StatusCode::OK, &body))
}

/// `POST /products` (admin)
pub async fn create_product(
    state: &AppState,
    req: &ApiRequest,
) -> Result<Response<FullBody>, HavenError> {
    let claims = admin_only(state, req).await?;
    let product = json_to_document(parse_json_body(&req.body)?)?;

    let result = state.store.insert_one(Collection::Products, product).await?;
    info!(
        "Product {} added by {}",
        bson_to_json(&result.inserted_id),
        claims.email.as_deref().unwrap_or("unknown")
    );

    Ok(json_response(StatusCode::OK, &result))
}

/// `DELETE /products/:id` (admin)
pub async fn delete_product(
    state: &AppState,
    req: &ApiRequest,
    id: &str,
) -> Result<Response<FullBody>, HavenError> {
    admin_only(state, req).await?;
    let filter = id_filter(id)?;

    let result = state.store.delete_one(Collection::Products, filter).await?;
    info!("Deleted {} product(s) with id {}", result.deleted_count, id);

    Ok(json_response(StatusCode::OK, &result))
}
