use axum::response::Html;
use axum::{routing::get, Router};

use crate::state::AppState;

const INDEX_HTML: &str =
    "mget_exporter<br><br>Metrics are at <a href=\"/metrics\">/metrics</a>\n";

/// GET / -- landing page pointing at the scrape path.
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}
