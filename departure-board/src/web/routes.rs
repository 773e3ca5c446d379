//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use chrono::Local;
use tracing::error;

use crate::board::build_rows;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(board_page))
        .route("/departures", get(departures))
        .route("/health", get(health))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The board as an HTML table, evaluated at request time.
async fn board_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let now = Local::now().naive_local();
    let rows = state.board.rows(now, &state.config).await;

    let template = BoardTemplate {
        title: state.title.to_string(),
        refresh_secs: state.refresh.as_secs().max(1),
        loaded: rows.is_some(),
        display_icons: state.config.display_icons,
        table_width: state.config.table_width,
        headings: state.config.headings.clone(),
        rows: rows
            .unwrap_or_default()
            .into_iter()
            .map(|row| RowView::new(row, &state.config))
            .collect(),
    };

    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("template error: {e}"),
    })?;
    Ok(Html(html))
}

/// The board as JSON, evaluated at request time.
async fn departures(State(state): State<AppState>) -> Json<DeparturesResponse> {
    let now = Local::now().naive_local();
    let snapshot = state.board.get().await;

    let departures = snapshot
        .as_deref()
        .map(|s| build_rows(s, now, &state.config))
        .unwrap_or_default();

    Json(DeparturesResponse {
        loaded: snapshot.is_some(),
        fetched_at: snapshot.as_ref().map(|s| s.fetched_at.to_rfc3339()),
        feed_error: snapshot.as_ref().and_then(|s| s.feed_error.clone()),
        headings: state.config.headings.clone(),
        departures,
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    Internal { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        error!(%status, %message, "request failed");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
