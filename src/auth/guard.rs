//! Request guards
//!
//! `verify_request` is the Token Verifier: it turns the bearer token on a
//! request into claims or a 401. `require_admin` is the Role Guard: one
//! `users` lookup per call, 403 unless the account's role is `"admin"`.

use tracing::{debug, warn};

use crate::auth::jwt::{extract_token_from_header, Claims};
use crate::db::documents::email_filter;
use crate::db::Collection;
use crate::routes::ApiRequest;
use crate::server::AppState;
use crate::types::HavenError;

/// Role value that grants access to admin routes
pub const ADMIN_ROLE: &str = "admin";

/// Verify the request's bearer token
pub fn verify_request(state: &AppState, req: &ApiRequest) -> Result<Claims, HavenError> {
    let token = match extract_token_from_header(req.header("authorization")) {
        Some(t) => t,
        None => {
            warn!("{} {}: missing bearer token", req.method, req.path);
            return Err(HavenError::unauthorized());
        }
    };

    let result = state.jwt.verify_token(token);
    match result.claims {
        Some(claims) if result.valid => Ok(claims),
        _ => {
            warn!(
                "{} {}: {}",
                req.method,
                req.path,
                result.error.as_deref().unwrap_or("Invalid token")
            );
            Err(HavenError::unauthorized())
        }
    }
}

/// Check that the verified identity belongs to an admin account
pub async fn require_admin(state: &AppState, claims: &Claims) -> Result<(), HavenError> {
    let email = match claims.email.as_deref() {
        Some(email) => email,
        None => {
            warn!("Admin check failed: token carries no email");
            return Err(HavenError::forbidden());
        }
    };

    let user = state
        .store
        .find_one(Collection::Users, email_filter(email))
        .await?;

    let is_admin = user
        .as_ref()
        .and_then(|u| u.get_str("role").ok())
        .is_some_and(|role| role == ADMIN_ROLE);

    if !is_admin {
        warn!("Admin check failed for {}", email);
        return Err(HavenError::forbidden());
    }

    debug!("Admin check passed for {}", email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DocumentStore, MemoryStore};
    use bson::doc;
    use bytes::Bytes;
    use hyper::header::{HeaderMap, HeaderValue};
    use hyper::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::for_tests(Arc::new(MemoryStore::new()))
    }

    fn request(auth: Option<&str>) -> ApiRequest {
        let mut headers = HeaderMap::new();
        if let Some(value) = auth {
            headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        }
        ApiRequest {
            method: Method::GET,
            path: "/users".into(),
            headers,
            body: Bytes::new(),
        }
    }

    fn token_for(state: &AppState, email: &str) -> String {
        let payload = json!({ "email": email });
        state
            .jwt
            .sign_payload(payload.as_object().cloned().unwrap())
            .unwrap()
    }

    #[test]
    fn test_verify_request() {
        let state = state();

        let err = verify_request(&state, &request(None)).unwrap_err();
        assert!(matches!(err, HavenError::Unauthorized(_)));

        let err = verify_request(&state, &request(Some("Bearer garbage"))).unwrap_err();
        assert!(matches!(err, HavenError::Unauthorized(_)));

        let token = token_for(&state, "buyer@example.com");
        let claims = verify_request(&state, &request(Some(&format!("Bearer {}", token)))).unwrap();
        assert_eq!(claims.email.as_deref(), Some("buyer@example.com"));
    }

    #[tokio::test]
    async fn test_require_admin() {
        let state = state();
        state
            .store
            .insert_one(
                Collection::Users,
                doc! { "email": "boss@example.com", "role": "admin" },
            )
            .await
            .unwrap();
        state
            .store
            .insert_one(Collection::Users, doc! { "email": "buyer@example.com" })
            .await
            .unwrap();

        let verify = |email: &str| {
            let token = token_for(&state, email);
            state.jwt.verify_token(&token).claims.unwrap()
        };

        assert!(require_admin(&state, &verify("boss@example.com")).await.is_ok());

        let err = require_admin(&state, &verify("buyer@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, HavenError::Forbidden(_)));

        let err = require_admin(&state, &verify("ghost@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, HavenError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_require_admin_without_email_claim() {
        let state = state();
        let token = state
            .jwt
            .sign_payload(json!({ "name": "anon" }).as_object().cloned().unwrap())
            .unwrap();
        let claims = state.jwt.verify_token(&token).claims.unwrap();

        let err = require_admin(&state, &claims).await.unwrap_err();
        assert!(matches!(err, HavenError::Forbidden(_)));
    }
}
