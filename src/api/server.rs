use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use axum::middleware;
use axum::{Router, extract::Request, response::Response};
use http::{HeaderValue, header};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::api::state::{AppState, SharedState};
use crate::core::AppConfig;
use crate::intake::EmailIntake;

async fn set_no_cache(request: Request, next: middleware::Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}

pub fn app(shared_state: SharedState) -> Router {
    let cors = CorsLayer::permissive();
    let static_dir = Path::new(&shared_state.config.static_dir).to_path_buf();

    Router::new()
        .merge(routes::router())
        // Landing page
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        // Static server of assets next to the landing page
        .fallback_service(ServeDir::new(&static_dir))
        .layer(middleware::from_fn(set_no_cache))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    if config.spreadsheet_id.is_none() {
        tracing::info!(
            "SPREADSHEET_ID not set. A new spreadsheet will be created on first email submission."
        );
    }

    let intake = EmailIntake::from_config(&config)?;
    let shared_state = Arc::new(AppState::new(intake, config));
    let app = app(shared_state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
