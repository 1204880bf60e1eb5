//! Minimal HTTP host for a published configuration document.
//!
//! The document is read from disk on every request, so edits are visible to
//! the next participant fetch without a restart.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::{debug, info, instrument, warn};

/// Default route the document is served at.
pub const DEFAULT_ROUTE: &str = "/bingo.json";

#[derive(Debug, Clone)]
struct DocumentState {
    path: Arc<PathBuf>,
}

/// Builds a router serving `document` at `route`, plus `/health`.
#[instrument(skip(document), fields(document = %document.display()))]
pub fn document_router(document: PathBuf, route: &str) -> Router {
    info!("Building document router");
    Router::new()
        .route("/health", get(health))
        .route(route, get(serve_document))
        .with_state(DocumentState {
            path: Arc::new(document),
        })
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn serve_document(State(state): State<DocumentState>) -> Response {
    match tokio::fs::read_to_string(state.path.as_ref()).await {
        Ok(body) => {
            debug!(bytes = body.len(), "Serving document");
            (
                [
                    (CONTENT_TYPE, "application/json; charset=utf-8"),
                    (CACHE_CONTROL, "no-store"),
                ],
                body,
            )
                .into_response()
        }
        Err(e) => {
            warn!(path = %state.path.display(), error = %e, "Document unavailable");
            (StatusCode::NOT_FOUND, "document not found").into_response()
        }
    }
}

/// Serves `document` at `route` on `host:port` until the process exits.
#[instrument(skip(document), fields(document = %document.display()))]
pub async fn serve(host: &str, port: u16, document: PathBuf, route: &str) -> anyhow::Result<()> {
    let app = document_router(document, route);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(
        "Serving config document at http://{}{}",
        listener.local_addr()?,
        route
    );
    axum::serve(listener, app).await?;
    Ok(())
}
