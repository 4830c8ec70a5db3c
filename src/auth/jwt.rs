//! JWT token handling
//!
//! Tokens are HS256-signed with the process-wide ACCESS_TOKEN secret.
//! `POST /jwt` signs whatever JSON object the caller sends, adding `iat` and
//! `exp`. Nothing checks that the caller owns the identity being signed.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::HavenError;

/// Below this length a secret is accepted but flagged at startup
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Decoded token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity the token was issued for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Any other caller-supplied claims
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of token validation
#[derive(Debug)]
pub struct TokenValidationResult {
    pub valid: bool,
    pub claims: Option<Claims>,
    pub error: Option<String>,
}

impl TokenValidationResult {
    pub fn valid(claims: Claims) -> Self {
        Self {
            valid: true,
            claims: Some(claims),
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            claims: None,
            error: Some(error.into()),
        }
    }
}

/// JWT signer and validator
#[derive(Clone)]
pub struct JwtValidator {
    secret: String,
    expiry_seconds: u64,
}

impl std::fmt::Debug for JwtValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtValidator")
            .field("expiry_seconds", &self.expiry_seconds)
            .finish_non_exhaustive()
    }
}

impl JwtValidator {
    /// Create a new JWT validator
    ///
    /// Returns an error if the secret is empty
    pub fn new(secret: String, expiry_seconds: u64) -> Result<Self, HavenError> {
        if secret.is_empty() {
            return Err(HavenError::Config("ACCESS_TOKEN must not be empty".into()));
        }

        Ok(Self {
            secret,
            expiry_seconds,
        })
    }

    /// Whether the secret is shorter than recommended
    pub fn is_weak(&self) -> bool {
        self.secret.len() < RECOMMENDED_SECRET_LEN
    }

    /// Sign a caller-supplied payload.
    ///
    /// A numeric `iat` in the payload is kept and `exp` is counted from it;
    /// otherwise `iat` is set to now. A payload that already carries `exp`,
    /// or whose `email` is not a string, is rejected.
    pub fn sign_payload(&self, mut payload: Map<String, Value>) -> Result<String, HavenError> {
        if payload.contains_key("exp") {
            return Err(HavenError::BadRequest(
                "payload already has an \"exp\" property".into(),
            ));
        }

        if let Some(email) = payload.get("email") {
            if !(email.is_string() || email.is_null()) {
                return Err(HavenError::BadRequest("\"email\" must be a string".into()));
            }
        }

        let iat = match payload.get("iat").and_then(Value::as_u64) {
            Some(iat) => iat,
            None => now()?,
        };
        let exp = iat.checked_add(self.expiry_seconds).ok_or_else(|| {
            HavenError::BadRequest("\"iat\" is too large to compute an expiry".into())
        })?;
        payload.insert("iat".into(), Value::from(iat));
        payload.insert("exp".into(), Value::from(exp));

        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify and decode a JWT token
    pub fn verify_token(&self, token: &str) -> TokenValidationResult {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(token_data) => TokenValidationResult::valid(token_data.claims),
            Err(err) => {
                use jsonwebtoken::errors::ErrorKind;
                let error_msg = match err.kind() {
                    ErrorKind::ExpiredSignature => "Token expired",
                    ErrorKind::InvalidToken => "Invalid token",
                    ErrorKind::InvalidSignature => "Invalid signature",
                    _ => "Token validation failed",
                };
                TokenValidationResult::invalid(error_msg)
            }
        }
    }
}

fn now() -> Result<u64, HavenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| HavenError::Internal(format!("System time error: {}", e)))
}

/// Extract token from an `Authorization: Bearer <token>` header.
pub fn extract_token_from_header(auth_header: Option<&str>) -> Option<&str> {
    let token = auth_header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
