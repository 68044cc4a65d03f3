//! API routes module

pub mod submit;

use axum::Router;

use crate::api::state::SharedState;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Email intake routes
        .merge(submit::router())
}
