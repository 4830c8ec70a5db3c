//! HTTP routes for Sports Haven
//!
//! The server collects each request body up front and hands the dispatcher a
//! plain [`ApiRequest`]; handlers never touch hyper's streaming body.

pub mod carts;
pub mod health;
pub mod orders;
pub mod products;
pub mod response;
pub mod summary;
pub mod token;
pub mod users;

use bytes::Bytes;
use hyper::header::HeaderMap;
use hyper::{Method, Response};
use tracing::error;

use crate::server::AppState;
use crate::types::HavenError;
use response::{error_response, not_found_response, preflight_response, FullBody};

pub use health::{health_check, root_banner};
pub use response::json_response;

/// A fully received HTTP request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiRequest {
    /// Header value as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Split a path into percent-decoded segments.
///
/// One trailing slash is ignored, so `/products/` matches `/products`.
pub fn path_segments(path: &str) -> Vec<String> {
    let path = path.trim_start_matches('/');
    path.strip_suffix('/')
        .unwrap_or(path)
        .split('/')
        .map(|s| match urlencoding::decode(s) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => s.to_string(),
        })
        .collect()
}

/// Route a request to its handler and render the outcome
pub async fn dispatch(state: &AppState, req: ApiRequest) -> Response<FullBody> {
    if req.method == Method::OPTIONS {
        return preflight_response(&req.headers);
    }

    let segments = path_segments(&req.path);
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

    let result = match (req.method.clone(), segments.as_slice()) {
        (Method::GET, [""]) => Ok(root_banner()),
        (Method::GET, ["health"]) => Ok(health_check(state)),

        (Method::POST, ["jwt"]) => token::issue_token(state, &req),

        // `/admin/` carries an empty email
        (Method::GET, ["admin"]) => users::check_admin(state, "").await,
        (Method::GET, ["admin", email]) => users::check_admin(state, email).await,
        (Method::PUT, ["users", email]) => users::upsert_user(state, &req, email).await,
        (Method::GET, ["users"]) => users::list_users(state, &req).await,
        (Method::GET, ["customer", id]) => users::get_customer(state, id).await,

        (Method::GET, ["products"]) => products::list_products(state).await,
        (Method::GET, ["products", id]) => products::get_product(state, id).await,
        (Method::POST, ["products"]) => products::create_product(state, &req).await,
        (Method::DELETE, ["products", id]) => products::delete_product(state, &req, id).await,

        (Method::POST, ["carts"]) => carts::add_to_cart(state, &req).await,
        (Method::GET, ["carts", email]) => carts::list_carts(state, &req, email).await,
        (Method::DELETE, ["carts", id]) => carts::delete_cart_item(state, &req, id).await,

        (Method::GET, ["orders"]) => orders::list_orders(state, &req).await,
        (Method::GET, ["orders", "details", id]) => orders::get_order(state, &req, id).await,
        (Method::GET, ["orders", email]) => orders::list_user_orders(state, &req, email).await,
        (Method::POST, ["orders", email]) => orders::place_order(state, &req, email).await,

        (Method::GET, ["summary"]) => summary::summary(state, &req).await,

        _ => return not_found_response(&req.method, &req.path),
    };

    match result {
        Ok(response) => response,
        Err(err) => {
            if err.status_code().is_server_error() {
                error!("{} {} failed: {}", req.method, req.path, err);
            }
            error_response(err)
        }
    }
}

/// Run the Token Verifier, then the Role Guard
pub(crate) async fn admin_only(
    state: &AppState,
    req: &ApiRequest,
) -> Result<crate::auth::Claims, HavenError> {
    let claims = crate::auth::verify_request(state, req)?;
    crate::auth::require_admin(state, &claims).await?;
    Ok(claims)
}
