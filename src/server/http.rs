//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Bodies are collected
//! (up to `max_body_bytes`) before dispatch.

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::JwtValidator;
use crate::config::Args;
use crate::db::DocumentStore;
use crate::routes::response::{error_response, FullBody};
use crate::routes::{self, ApiRequest};
use crate::types::HavenError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Backing document store (MongoDB, or memory in dev mode)
    pub store: Arc<dyn DocumentStore>,
    /// Token signer/verifier built from the configured secret
    pub jwt: JwtValidator,
}

impl AppState {
    /// Build state over an already connected store
    pub fn new(args: Args, store: Arc<dyn DocumentStore>) -> Result<Self, HavenError> {
        let secret = args.signing_secret().ok_or_else(|| {
            HavenError::Config("ACCESS_TOKEN is required in production mode".into())
        })?;
        let jwt = JwtValidator::new(secret, args.jwt_expiry_seconds)?;

        Ok(Self { args, store, jwt })
    }

    #[cfg(test)]
    pub(crate) fn for_tests(store: Arc<dyn DocumentStore>) -> Self {
        use clap::Parser;

        let args = Args::parse_from([
            "sports-haven",
            "--access-token",
            "unit-test-secret-that-is-at-least-32-chars",
        ]);
        Self::new(args, store).expect("test state")
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), HavenError> {
    let addr = state.args.listen_addr().map_err(HavenError::Config)?;
    let listener = TcpListener::bind(addr).await?;

    info!("Sports Haven listening on {} (store: {})", addr, state.store.kind());

    if state.args.dev_mode {
        warn!("Development mode enabled - data is not persisted");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Collect the body and hand the request to the dispatcher
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<FullBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let (parts, body) = req.into_parts();
    let limit = state.args.max_body_bytes;

    let body = match collect_body(body, limit).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("[{}] {} {}: {}", addr, method, path, err);
            return Ok(error_response(err));
        }
    };

    let request = ApiRequest {
        method,
        path,
        headers: parts.headers,
        body,
    };

    Ok(routes::dispatch(&state, request).await)
}

/// Read a whole body, refusing anything over `limit` bytes
async fn collect_body<B>(body: B, limit: usize) -> Result<Bytes, HavenError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(HavenError::PayloadTooLarge(limit))
        }
        Err(e) => Err(HavenError::BadRequest(format!(
            "Failed to read request body: {}",
            e
        ))),
    }
}
