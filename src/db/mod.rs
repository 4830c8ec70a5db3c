//! Database layer for Sports Haven
//!
//! All persistence goes through the [`DocumentStore`] trait. [`MongoStore`]
//! is the production backend; [`MemoryStore`] serves dev mode and tests.

pub mod collections;
pub mod documents;
pub mod memory;
pub mod mongo;
pub mod mongo_store;
pub mod store;

pub use collections::Collection;
pub use memory::MemoryStore;
pub use mongo::MongoClient;
pub use mongo_store::MongoStore;
pub use store::{DeleteOutcome, DocumentStore, InsertOutcome, SortBy, UpdateOutcome};
