//! Authentication for Sports Haven
//!
//! - `jwt`: signing and verifying bearer tokens
//! - `guard`: Token Verifier and admin Role Guard applied by the routes

pub mod guard;
pub mod jwt;

pub use guard::{require_admin, verify_request};
pub use jwt::{extract_token_from_header, Claims, JwtValidator, TokenValidationResult};
