//! MongoDB client wrapper

use bson::doc;
use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Database, IndexModel,
};
use tracing::{info, warn};

use crate::db::collections::Collection;
use crate::types::HavenError;

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and ping the deployment.
    ///
    /// `display_uri` is what gets logged; pass a redacted form.
    pub async fn new(uri: &str, display_uri: &str, db_name: &str) -> Result<Self, HavenError> {
        info!("Connecting to MongoDB at {}", display_uri);

        let timeout_uri = with_timeouts(uri);

        let mut options = ClientOptions::parse(&timeout_uri)
            .await
            .map_err(|e| HavenError::Database(format!("Invalid MongoDB URI: {}", e)))?;
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());

        let client = Client::with_options(options)
            .map_err(|e| HavenError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| HavenError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Pinged your deployment. Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Create the lookup indexes for every collection.
    ///
    /// Failures are logged and skipped; the server runs without them.
    pub async fn ensure_indexes(&self) {
        let db = self.database();

        for collection in Collection::ALL {
            let indexes: Vec<IndexModel> = collection
                .indexes()
                .into_iter()
                .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
                .collect();

            if indexes.is_empty() {
                continue;
            }

            match db
                .collection::<bson::Document>(collection.name())
                .create_indexes(indexes)
                .await
            {
                Ok(result) => info!(
                    "Ensured {} index(es) on '{}.{}'",
                    result.index_names.len(),
                    self.db_name(),
                    collection
                ),
                Err(e) => warn!("Failed to create indexes on '{}': {}", collection, e),
            }
        }
    }

    /// Handle to the configured database
    pub fn database(&self) -> Database {
        self.client.database(&self.db_name)
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Append connect and server selection timeouts to a connection string
fn with_timeouts(uri: &str) -> String {
    const TIMEOUTS: &str = "serverSelectionTimeoutMS=3000&connectTimeoutMS=3000";

    if uri.contains('?') {
        return format!("{}&{}", uri, TIMEOUTS);
    }

    let has_path = uri
        .split_once("://")
        .is_some_and(|(_, rest)| rest.contains('/'));
    if has_path {
        format!("{}?{}", uri, TIMEOUTS)
    } else {
        format!("{}/?{}", uri, TIMEOUTS)
    }
}
