//! Document store abstraction
//!
//! Handlers only ever talk to a `DocumentStore`, so the backing database can
//! be swapped (MongoDB in production, memory in dev mode and tests).
//! Write results keep the driver's wire shape: camelCase counters plus an
//! `acknowledged` flag.

use bson::{Bson, Document};
use serde::Serialize;

use crate::db::collections::Collection;
use crate::db::documents::{serialize_bson, serialize_opt_bson};
use crate::types::HavenError;

/// Single-field sort specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortBy {
    pub field: &'static str,
    pub descending: bool,
}

impl SortBy {
    /// Sort by `field`, largest first
    pub fn descending(field: &'static str) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    /// Sort document for the driver (`{field: -1}` or `{field: 1}`)
    pub fn to_document(self) -> Document {
        let mut sort = Document::new();
        sort.insert(self.field, if self.descending { -1 } else { 1 });
        sort
    }
}

/// Result of inserting one document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    #[serde(serialize_with = "serialize_bson")]
    pub inserted_id: Bson,
}

/// Result of an update (possibly an upsert)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    #[serde(serialize_with = "serialize_opt_bson")]
    pub upserted_id: Option<Bson>,
}

/// Result of a delete
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Operations the storefront needs from its database.
///
/// Filters are plain equality documents (`{"email": ..}`, `{"_id": ..}`).
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short name of the backend, reported by `/health`
    fn kind(&self) -> &'static str;

    /// First document matching `filter`
    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, HavenError>;

    /// All documents matching `filter`, optionally sorted
    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        sort: Option<SortBy>,
    ) -> Result<Vec<Document>, HavenError>;

    /// Insert a document; the store assigns `_id` when absent
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertOutcome, HavenError>;

    /// `$set` the given fields on the first match, inserting when none matches
    async fn upsert_set(
        &self,
        collection: Collection,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, HavenError>;

    /// Delete the first document matching `filter`
    async fn delete_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<DeleteOutcome, HavenError>;

    /// Delete every document matching `filter`
    async fn delete_many(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<DeleteOutcome, HavenError>;

    /// Document count, possibly approximate
    async fn estimated_count(&self, collection: Collection) -> Result<u64, HavenError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};
    use serde_json::json;

    #[test]
    fn test_sort_document() {
        assert_eq!(SortBy::descending("date").to_document(), doc! { "date": -1 });
    }

    #[test]
    fn test_write_results_wire_shape() {
        let oid = ObjectId::new();

        let insert = InsertOutcome {
            acknowledged: true,
            inserted_id: Bson::ObjectId(oid),
        };
        assert_eq!(
            serde_json::to_value(&insert).unwrap(),
            json!({ "acknowledged": true, "insertedId": oid.to_hex() })
        );

        let update = UpdateOutcome {
            acknowledged: true,
            matched_count: 1,
            modified_count: 1,
            upserted_count: 0,
            upserted_id: None,
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({
                "acknowledged": true,
                "matchedCount": 1,
                "modifiedCount": 1,
                "upsertedCount": 0,
                "upsertedId": null
            })
        );

        let delete = DeleteOutcome {
            acknowledged: true,
            deleted_count: 2,
        };
        assert_eq!(
            serde_json::to_value(&delete).unwrap(),
            json!({ "acknowledged": true, "deletedCount": 2 })
        );
    }
}
