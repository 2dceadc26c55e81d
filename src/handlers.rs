use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AppState;
use crate::render::{render_error, render_page};

/// Query parameters accepted by the browse routes
#[derive(Debug, Deserialize, Default)]
pub struct BrowseQuery {
    /// `html` (default) renders a page, `json` returns the view model
    #[serde(default)]
    pub format: ViewFormat,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ViewFormat {
    #[default]
    Html,
    Json,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET / - Redirect to the browse root
pub async fn redirect_to_browse(State(state): State<AppState>) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, state.config.browse_prefix.clone())],
    )
        .into_response()
}

/// GET {prefix} and {prefix}/ - Browse the root directory
pub async fn browse_root(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> Response {
    browse(&state, "/", query.format).await
}

/// GET {prefix}/{*path} - Browse a path below the root
pub async fn browse_path(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<BrowseQuery>,
) -> Response {
    browse(&state, &format!("/{path}"), query.format).await
}

async fn browse(state: &AppState, request_path: &str, format: ViewFormat) -> Response {
    debug!("Browse {:?} as {:?}", request_path, format);

    let result = state.dispatcher.handle(request_path).await;
    match (format, result) {
        (ViewFormat::Html, Ok(view)) => {
            Html(render_page(&state.config.page_context(), &view)).into_response()
        }
        (ViewFormat::Html, Err(err)) => (
            err.status(),
            Html(render_error(&state.config.page_context(), &err)),
        )
            .into_response(),
        (ViewFormat::Json, Ok(view)) => Json(view).into_response(),
        (ViewFormat::Json, Err(err)) => err.into_response(),
    }
}
