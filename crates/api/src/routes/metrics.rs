use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::{routing::get, Router};

use crate::error::AppResult;
use crate::state::AppState;

/// GET /metrics -- Prometheus text exposition of every series.
async fn scrape(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let (body, content_type) = state.registry.render()?;
    Ok(([(CONTENT_TYPE, content_type)], body))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(scrape))
}
