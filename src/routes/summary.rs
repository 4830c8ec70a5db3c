//! Admin dashboard counts

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::db::Collection;
use crate::routes::response::{json_response, FullBody};
use crate::routes::{admin_only, ApiRequest};
use crate::server::AppState;
use crate::types::HavenError;

/// Document counts per collection. Counts may be estimates.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_carts: u64,
    pub total_customer: u64,
    pub total_products: u64,
    pub total_orders: u64,
}

/// `GET /summary` (admin)
pub async fn summary(state: &AppState, req: &ApiRequest) -> Result<Response<FullBody>, HavenError> {
    admin_only(state, req).await?;

    let store = &state.store;
    let (carts, customers, products, orders) = tokio::try_join!(
        store.estimated_count(Collection::Carts),
        store.estimated_count(Collection::Users),
        store.estimated_count(Collection::Products),
        store.estimated_count(Collection::Orders),
    )?;

    Ok(json_response(
        StatusCode::OK,
        &Summary {
            total_carts: carts,
            total_customer: customers,
            total_products: products,
            total_orders: orders,
        },
    ))
}
