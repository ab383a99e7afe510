mod compiler;
mod config;
mod db;
mod errors;
mod models;
mod render;
mod routes;
mod state;
mod store;
mod workspace;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::compiler::LatexCompiler;
use crate::config::Config;
use crate::db::create_pool;
use crate::render::TemplateRenderer;
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;
use crate::store::PgResumeStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    let store = Arc::new(PgResumeStore::new(pool.clone()));

    // Scratch directory for per-request workspaces
    tokio::fs::create_dir_all(&config.scratch_dir)
        .await
        .with_context(|| {
            format!(
                "failed to create scratch directory {}",
                config.scratch_dir.display()
            )
        })?;
    info!("Scratch directory: {}", config.scratch_dir.display());

    // Template is compiled once; a broken template stops startup
    let renderer = Arc::new(TemplateRenderer::load(&config.template_path)?);

    let compiler = LatexCompiler::new(&config.latex);
    info!(
        "LaTeX compiler: {} (timeout {:?}, shell escape {})",
        config.latex.program.display(),
        config.latex.timeout,
        if config.latex.shell_escape { "on" } else { "off" }
    );

    let config = Arc::new(config);
    let state = AppState {
        config: config.clone(),
        store,
        renderer,
        compiler,
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.cors_allowed_origins)),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped; closing database connections");
    pool.close().await;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on CTRL+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for CTRL+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received CTRL+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
