//! HTTP server for Sports Haven

pub mod http;

pub use http::{run, AppState};
