//! Cinequery HTTP boundary
//!
//! `POST /api/chat`, `GET /api/search`, `GET /api/movies/:id` and
//! `GET /api/health` over a shared [`MoviePipeline`].

mod handlers;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use cinequery_core::MoviePipeline;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use handlers::{ChatRequest, SearchParams};

/// Build the router around a pipeline constructed once at startup
pub fn router(pipeline: Arc<MoviePipeline>) -> Router {
    Router::new()
        .route("/api/chat", post(handlers::chat))
        .route("/api/search", get(handlers::search))
        .route("/api/movies/:id", get(handlers::get_movie))
        .route("/api/health", get(handlers::health))
        .with_state(pipeline)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Serve until Ctrl-C or SIGTERM
pub async fn serve(pipeline: Arc<MoviePipeline>, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server is running on {}", listener.local_addr()?);
    tracing::info!("Health check available at http://{}/api/health", addr);

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl-C received, shutting down gracefully"),
        _ = terminate => tracing::info!("SIGTERM received, shutting down gracefully"),
    }
}
