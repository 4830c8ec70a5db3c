//! MongoDB-backed document store

use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::Database;

use crate::db::collections::Collection;
use crate::db::mongo::MongoClient;
use crate::db::store::{DeleteOutcome, DocumentStore, InsertOutcome, SortBy, UpdateOutcome};
use crate::types::HavenError;

/// [`DocumentStore`] over a live MongoDB database
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(client: &MongoClient) -> Self {
        Self {
            db: client.database(),
        }
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.db.collection::<Document>(collection.name())
    }
}

#[async_trait::async_trait]
impl DocumentStore for MongoStore {
    fn kind(&self) -> &'static str {
        "mongodb"
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, HavenError> {
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        sort: Option<SortBy>,
    ) -> Result<Vec<Document>, HavenError> {
        let coll = self.collection(collection);
        let find = coll.find(filter);
        let cursor = match sort {
            Some(sort) => find.sort(sort.to_document()).await?,
            None => find.await?,
        };

        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs)
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertOutcome, HavenError> {
        let result = self.collection(collection).insert_one(document).await?;

        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: result.inserted_id,
        })
    }

    async fn upsert_set(
        &self,
        collection: Collection,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, HavenError> {
        let result = self
            .collection(collection)
            .update_one(filter, doc! { "$set": set })
            .upsert(true)
            .await?;

        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(result.upserted_id.is_some()),
            upserted_id: result.upserted_id,
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<DeleteOutcome, HavenError> {
        let result = self.collection(collection).delete_one(filter).await?;

        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn delete_many(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<DeleteOutcome, HavenError> {
        let result = self.collection(collection).delete_many(filter).await?;

        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn estimated_count(&self, collection: Collection) -> Result<u64, HavenError> {
        Ok(self
            .collection(collection)
            .estimated_document_count()
            .await?)
    }
}
