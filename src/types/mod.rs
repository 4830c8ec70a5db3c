//! Shared types for Sports Haven

pub mod error;

pub use error::HavenError;
