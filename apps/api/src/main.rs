use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use versions_api::config::Config;
use versions_api::db::create_pool;
use versions_api::ids::RandomIds;
use versions_api::routes::build_router;
use versions_api::state::AppState;
use versions_api::store::{InMemoryResumeStore, PgResumeStore, ResumeStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume versions API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize record store
    let store: Arc<dyn ResumeStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.database_max_connections).await?;
            Arc::new(PgResumeStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            Arc::new(InMemoryResumeStore::new())
        }
    };

    // Build app state
    let state = AppState {
        store,
        ids: Arc::new(RandomIds),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        // TODO: restrict CORS origins once the web client's domain is fixed
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
