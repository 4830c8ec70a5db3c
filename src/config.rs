//! Configuration for Sports Haven
//!
//! CLI arguments with environment variable fallbacks using clap.
//! A `.env` file is loaded by `main` before parsing.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

/// Secret used when running in dev mode without ACCESS_TOKEN
const DEV_SECRET: &str = "dev-only-insecure-secret-not-for-production";

/// Sports Haven storefront backend
#[derive(Parser, Debug, Clone)]
#[command(name = "sports-haven")]
#[command(about = "HTTP storefront backend for users, products, carts and orders")]
pub struct Args {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Full MongoDB connection string (takes precedence over the parts below)
    #[arg(long, env = "MONGODB_URI")]
    pub mongodb_uri: Option<String>,

    /// MongoDB username
    #[arg(long, env = "DB_USER")]
    pub db_user: Option<String>,

    /// MongoDB password
    #[arg(long, env = "DB_PASS")]
    pub db_pass: Option<String>,

    /// MongoDB host (with port unless using SRV)
    #[arg(long, env = "MONGODB_HOST", default_value = "localhost:27017")]
    pub mongodb_host: String,

    /// Use the mongodb+srv:// scheme (Atlas clusters)
    #[arg(long, env = "MONGODB_SRV", default_value = "false")]
    pub mongodb_srv: bool,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "sportsBD")]
    pub mongodb_db: String,

    /// Secret for signing access tokens (required unless dev mode)
    #[arg(long, env = "ACCESS_TOKEN")]
    pub access_token: Option<String>,

    /// Lifetime of issued tokens in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "7200")]
    pub jwt_expiry_seconds: u64,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "1048576")]
    pub max_body_bytes: usize,

    /// Development mode (in-memory store, fallback signing secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log line format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable lines
    Text,
    /// One JSON object per line
    Json,
}

impl Args {
    /// Socket address to bind
    pub fn listen_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid listen address {}:{}: {}", self.host, self.port, e))
    }

    /// Effective MongoDB connection string
    pub fn mongodb_connection_uri(&self) -> String {
        if let Some(ref uri) = self.mongodb_uri {
            return uri.clone();
        }

        let scheme = if self.mongodb_srv {
            "mongodb+srv"
        } else {
            "mongodb"
        };

        match (&self.db_user, &self.db_pass) {
            (Some(user), Some(pass)) => format!(
                "{}://{}:{}@{}/?retryWrites=true&w=majority",
                scheme,
                urlencoding::encode(user),
                urlencoding::encode(pass),
                self.mongodb_host
            ),
            _ => format!("{}://{}/?retryWrites=true&w=majority", scheme, self.mongodb_host),
        }
    }

    /// Connection string with the password masked, for logging
    pub fn redacted_mongodb_uri(&self) -> String {
        let uri = self.mongodb_connection_uri();
        match (uri.find("://"), uri.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                let creds = &uri[scheme_end + 3..at];
                let user = creds.split(':').next().unwrap_or("");
                format!("{}{}:****{}", &uri[..scheme_end + 3], user, &uri[at..])
            }
            _ => uri,
        }
    }

    /// Effective signing secret (falls back to a fixed secret in dev mode)
    pub fn signing_secret(&self) -> Option<String> {
        match self.access_token {
            Some(ref secret) if !secret.is_empty() => Some(secret.clone()),
            _ if self.dev_mode => Some(DEV_SECRET.to_string()),
            _ => None,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.signing_secret().is_none() {
            return Err("ACCESS_TOKEN is required in production mode".to_string());
        }

        if self.jwt_expiry_seconds == 0 {
            return Err("JWT_EXPIRY_SECONDS must be greater than zero".to_string());
        }

        if self.max_body_bytes == 0 {
            return Err("MAX_BODY_BYTES must be greater than zero".to_string());
        }

        self.listen_addr()?;

        Ok(())
    }
}
