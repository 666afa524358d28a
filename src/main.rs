//! Shloka - Bhagavad Gita guidance by emotion

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shloka::{
    config::Args,
    db::{DocumentStore, MemoryStore, MongoClient},
    seed, server,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing/logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("shloka={},info", args.log_level).into());
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Shloka - Bhagavad Gita guidance API");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Prefix: {}", args.api_prefix);
    info!("Seed policy: {}", args.seed_policy);
    if args.memory_store {
        info!("Store: in-memory (development)");
    } else {
        info!("MongoDB: {} / {}", args.mongo_url, args.db_name);
    }
    info!("======================================");

    if args.memory_store {
        warn!("In-memory store: content is re-seeded on every start and nothing is persisted");
        return boot(args, MemoryStore::new()).await;
    }

    let mongo = match MongoClient::connect(&args.mongo_url, &args.db_name).await {
        Ok(client) => client,
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    boot(args, mongo).await
}

/// Seed and index the store, then serve until Ctrl+C
async fn boot<S: DocumentStore>(args: Args, store: S) -> anyhow::Result<()> {
    if let Err(e) = seed::bootstrap(&store, args.seed_policy, args.max_list).await {
        error!("Store preparation failed, refusing to serve: {}", e);
        store.close().await;
        std::process::exit(1);
    }

    // Another instance may be mid-reconcile against the same store
    if let Err(e) = seed::verify(&store).await {
        warn!("Post-seed verification failed: {}", e);
    }

    let state = Arc::new(server::AppState::new(args, Arc::new(store)));

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutting down...");
    };

    let result = tokio::select! {
        result = server::run(Arc::clone(&state)) => result,
        _ = shutdown => Ok(()),
    };

    state.store.close().await;

    if let Err(e) = result {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
