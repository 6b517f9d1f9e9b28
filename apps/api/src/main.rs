mod config;
mod dashboard;
mod db;
mod editor;
mod errors;
mod export;
mod models;
mod render;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, S3Config};
use crate::db::create_pool;
use crate::editor::session::{spawn_autosave, SessionRegistry};
use crate::export::{ExportPipeline, ExportSink, FsExportSink, HttpRasterizer, S3ExportSink};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::remote::PgResumeStore;
use crate::storage::{LocalStore, ResumeStore, WriteThroughStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vitae API v{}", env!("CARGO_PKG_VERSION"));

    // Local store is always present; the remote one only when configured
    let local = LocalStore::open(&config.local_store_path)?;
    let remote: Option<Arc<dyn ResumeStore>> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            Some(Arc::new(PgResumeStore::new(pool)))
        }
        None => {
            info!("DATABASE_URL not set, running with the local store only");
            None
        }
    };
    let store = Arc::new(WriteThroughStore::new(local, remote));

    // Export pipeline: external rasterizer + S3 or filesystem sink
    let rasterizer = Arc::new(HttpRasterizer::new(config.rasterizer_url.clone())?);
    let sink: Arc<dyn ExportSink> = match &config.s3 {
        Some(s3) => {
            let client = build_s3_client(s3).await;
            info!("S3 export sink initialized (bucket: {})", s3.bucket);
            Arc::new(S3ExportSink::new(client, s3.bucket.clone()))
        }
        None => {
            info!("Exports will be written to {}", config.export_dir.display());
            Arc::new(FsExportSink::new(config.export_dir.clone()))
        }
    };
    let exporter = ExportPipeline::new(rasterizer, sink);

    let sessions = SessionRegistry::new(config.history_limit);
    spawn_autosave(sessions.clone(), Arc::clone(&store), config.autosave_interval);
    info!(
        "Auto-save every {}s, history limit {:?}",
        config.autosave_interval.as_secs(),
        config.history_limit
    );

    let state = AppState {
        store,
        sessions,
        exporter,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(s3: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &s3.access_key_id,
        &s3.secret_access_key,
        None,
        None,
        "vitae-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&s3.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
