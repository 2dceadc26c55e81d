use axum::{Router, routing::get};

use crate::AppState;
use crate::handlers;

/// Create browser routes mounted under `browse_prefix` (e.g. `/browse`).
pub fn browser_routes(browse_prefix: &str) -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Bare root goes to the browse root
        .route("/", get(handlers::redirect_to_browse))
        // Browsing
        .route(browse_prefix, get(handlers::browse_root))
        .route(&format!("{browse_prefix}/"), get(handlers::browse_root))
        .route(
            &format!("{browse_prefix}/{{*path}}"),
            get(handlers::browse_path),
        )
}

/// Full application router for `state`.
pub fn app(state: AppState) -> Router {
    let prefix = state.config.browse_prefix.clone();
    browser_routes(&prefix).with_state(state)
}
