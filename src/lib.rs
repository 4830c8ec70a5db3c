//! Sports Haven - storefront backend
//!
//! A thin HTTP layer over MongoDB for the Sports Haven shop. Every endpoint
//! maps a verb and path onto one or two document store operations and
//! returns the result as JSON.
//!
//! ## Components
//!
//! - **Token Verifier**: bearer JWT validation against one shared secret
//! - **Role Guard**: admin check against the `users` collection
//! - **Route Dispatcher**: `(Method, path)` table over the handlers in [`routes`]
//! - **Document Store**: [`db::DocumentStore`], backed by MongoDB or memory

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::HavenError;
