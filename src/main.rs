//! Sports Haven - storefront backend

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

use sports_haven::{
    auth::jwt::RECOMMENDED_SECRET_LEN,
    config::Args,
    db::{DocumentStore, MemoryStore, MongoClient, MongoStore},
    logging, server,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init(&args.log_level, args.log_format);

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Sports Haven - storefront backend");
    info!("======================================");
    info!("Listen: {}:{}", args.host, args.port);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {}", args.redacted_mongodb_uri());
    info!("Database: {}", args.mongodb_db);
    info!("Token lifetime: {}s", args.jwt_expiry_seconds);
    info!("======================================");

    // MongoDB is required in production; dev mode falls back to memory
    let uri = args.mongodb_connection_uri();
    let store: Arc<dyn DocumentStore> =
        match MongoClient::new(&uri, &args.redacted_mongodb_uri(), &args.mongodb_db).await {
            Ok(client) => {
                client.ensure_indexes().await;
                Arc::new(MongoStore::new(&client))
            }
            Err(e) => {
                if args.dev_mode {
                    warn!("MongoDB connection failed (dev mode, continuing in memory): {}", e);
                    Arc::new(MemoryStore::new())
                } else {
                    error!("MongoDB connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        };

    let state = server::AppState::new(args, store)?;

    if state.jwt.is_weak() {
        warn!(
            "ACCESS_TOKEN is shorter than {} characters; use a longer secret in production",
            RECOMMENDED_SECRET_LEN
        );
    }

    if let Err(e) = server::run(Arc::new(state)).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
