use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::types::SharedState;

pub fn build_router(state: SharedState) -> Router {
    // Everything that is not an API call is a plain file under the document root.
    let statics = ServeDir::new(state.layout.docs()).append_index_html_on_directories(false);

    Router::new()
        .route("/", get(handlers::assets::landing))
        .route("/api/data/*path", get(handlers::data::get_data))
        .route("/api/save", post(handlers::files::save))
        .route("/api/delete", post(handlers::files::delete))
        .fallback_service(statics)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
