//! In-memory document store
//!
//! Backs dev mode (no MongoDB) and the test suite. Supports the equality
//! filters and single-field sorts the handlers issue. Each call locks one
//! collection shard for its duration; there is no multi-call atomicity.

use bson::{oid::ObjectId, Bson, Document};
use dashmap::DashMap;
use std::cmp::Ordering;
use tracing::warn;

use crate::db::collections::Collection;
use crate::db::store::{DeleteOutcome, DocumentStore, InsertOutcome, SortBy, UpdateOutcome};
use crate::types::HavenError;

/// Document store held entirely in process memory
pub struct MemoryStore {
    collections: DashMap<Collection, Vec<Document>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        warn!("Document store running in memory-only mode (no MongoDB)");
        Self {
            collections: DashMap::new(),
        }
    }
}

/// Whether `doc` satisfies every equality in `filter`.
/// A null filter value also matches a missing field.
fn matches_filter(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| match doc.get(key) {
        Some(actual) => bson_eq(actual, expected),
        None => matches!(expected, Bson::Null),
    })
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Equality with numeric types compared by value, as the server does
fn bson_eq(a: &Bson, b: &Bson) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Rank of a value's type in the server's cross-type sort order
fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) | Some(Bson::Undefined) => 1,
        Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Double(_)) => 2,
        Some(Bson::String(_)) | Some(Bson::Symbol(_)) => 3,
        Some(Bson::Document(_)) => 4,
        Some(Bson::Array(_)) => 5,
        Some(Bson::Binary(_)) => 6,
        Some(Bson::ObjectId(_)) => 7,
        Some(Bson::Boolean(_)) => 8,
        Some(Bson::DateTime(_)) => 9,
        Some(Bson::Timestamp(_)) => 10,
        Some(_) => 11,
    }
}

fn compare_field(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let by_type = type_rank(a).cmp(&type_rank(b));
    if by_type != Ordering::Equal {
        return by_type;
    }

    match (a, b) {
        (Some(x), Some(y)) => {
            if let (Some(x), Some(y)) = (as_f64(x), as_f64(y)) {
                return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            }
            match (x, y) {
                (Bson::String(x), Bson::String(y)) => x.cmp(y),
                (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
                (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
                (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
                (Bson::Timestamp(x), Bson::Timestamp(y)) => {
                    (x.time, x.increment).cmp(&(y.time, y.increment))
                }
                _ => Ordering::Equal,
            }
        }
        _ => Ordering::Equal,
    }
}

/// Fields an upsert copies from its filter into the new document
fn filter_equalities(filter: &Document) -> Document {
    filter
        .iter()
        .filter(|(key, value)| !key.starts_with('$') && !matches!(value, Bson::Document(_)))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn with_id_first(id: Bson, document: Document) -> Document {
    let mut stored = Document::new();
    stored.insert("_id", id);
    for (key, value) in document {
        if key != "_id" {
            stored.insert(key, value);
        }
    }
    stored
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, HavenError> {
        Ok(self
            .collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| matches_filter(d, &filter)).cloned()))
    }

    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        sort: Option<SortBy>,
    ) -> Result<Vec<Document>, HavenError> {
        let mut results: Vec<Document> = match self.collections.get(&collection) {
            Some(docs) => docs.iter().filter(|d| matches_filter(d, &filter)).cloned().collect(),
            None => Vec::new(),
        };

        if let Some(sort) = sort {
            results.sort_by(|a, b| {
                let ordering = compare_field(a.get(sort.field), b.get(sort.field));
                if sort.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        Ok(results)
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertOutcome, HavenError> {
        let id = document
            .get("_id")
            .cloned()
            .unwrap_or_else(|| Bson::ObjectId(ObjectId::new()));

        let mut docs = self.collections.entry(collection).or_default();
        if docs.iter().any(|d| d.get("_id").is_some_and(|existing| bson_eq(existing, &id))) {
            return Err(HavenError::Database(format!(
                "E11000 duplicate key error collection: {} index: _id_",
                collection
            )));
        }
        docs.push(with_id_first(id.clone(), document));

        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn upsert_set(
        &self,
        collection: Collection,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, HavenError> {
        let mut docs = self.collections.entry(collection).or_default();

        if let Some(existing) = docs.iter_mut().find(|d| matches_filter(d, &filter)) {
            if let (Some(new_id), Some(old_id)) = (set.get("_id"), existing.get("_id")) {
                if !bson_eq(new_id, old_id) {
                    return Err(HavenError::Database(
                        "Performing an update on the path '_id' would modify the immutable field '_id'"
                            .into(),
                    ));
                }
            }

            let mut modified = false;
            for (key, value) in set {
                if existing.get(&key) != Some(&value) {
                    existing.insert(key, value);
                    modified = true;
                }
            }

            return Ok(UpdateOutcome {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_count: 0,
                upserted_id: None,
            });
        }

        let mut fresh = filter_equalities(&filter);
        for (key, value) in set {
            fresh.insert(key, value);
        }
        let id = fresh
            .get("_id")
            .cloned()
            .unwrap_or_else(|| Bson::ObjectId(ObjectId::new()));
        docs.push(with_id_first(id.clone(), fresh));

        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id),
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<DeleteOutcome, HavenError> {
        let mut deleted_count = 0;
        if let Some(mut docs) = self.collections.get_mut(&collection) {
            if let Some(pos) = docs.iter().position(|d| matches_filter(d, &filter)) {
                docs.remove(pos);
                deleted_count = 1;
            }
        }

        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn delete_many(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<DeleteOutcome, HavenError> {
        let mut deleted_count = 0;
        if let Some(mut docs) = self.collections.get_mut(&collection) {
            let before = docs.len();
            docs.retain(|d| !matches_filter(d, &filter));
            deleted_count = (before - docs.len()) as u64;
        }

        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn estimated_count(&self, collection: Collection) -> Result<u64, HavenError> {
        Ok(self
            .collections
            .get(&collection)
            .map(|docs| docs.len() as u64)
            .unwrap_or(0))
    }
}
