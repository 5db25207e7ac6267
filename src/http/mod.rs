//! HTTP API surface.
//!
//! Routes are mounted under `/api`. Authentication is delegated to a
//! fronting proxy that validates the session and injects the reader's id
//! as an `x-user-id` header; handlers that need an account read it via
//! the [`auth::SessionUser`] extractor.

pub mod account;
pub mod articles;
mod auth;
mod error;
pub mod newsletter;

pub use error::ApiError;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method};
use axum::routing::{get, patch, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::relay::BrevoRelay;
use crate::storage::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub relay: BrevoRelay,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-user-id")]);

    Router::new()
        .route("/api/articles", get(articles::list_articles))
        .route("/api/articles/{slug}", get(articles::get_article))
        .route("/api/article-categories", get(articles::list_categories))
        .route("/api/newsletter", post(newsletter::subscribe))
        .route(
            "/api/account/recently-read",
            get(account::list_recently_read).post(account::record_read),
        )
        .route("/api/account/profile", patch(account::update_profile))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until SIGINT/SIGTERM.
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
