use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing_subscriber::EnvFilter;

use pressroom::config::{AppState, Config};
use pressroom::services::storage_service::LocalBlobStore;
use pressroom::{build_app, seeders};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!("Startup failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BoxError> {
    let cfg = Config::init()?;
    tracing::info!("Starting pressroom...");

    // 1. Database
    let db = Database::connect(&cfg.database_url).await?;
    tracing::info!("Database connected");

    if cfg.run_migrations {
        Migrator::up(&db, None).await?;
        tracing::info!("Migrations applied");
    }

    // 2. Seeders
    seeders::run_seeders(&db, &cfg).await?;

    // 3. Blob storage
    tokio::fs::create_dir_all(&cfg.upload_dir).await?;
    let blob_store = Arc::new(LocalBlobStore::new(cfg.upload_dir.clone()));

    // 4. App state and router
    let state = AppState::new(&cfg, db, blob_store);
    let app = build_app(state);

    // 5. Serve
    let addr: SocketAddr = format!("{}:{}", cfg.server_host, cfg.server_port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
