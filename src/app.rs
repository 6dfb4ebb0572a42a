use axum::Router;
use axum::extract::DefaultBodyLimit;
use crate::state::AppState;
use tower_http::trace::TraceLayer;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn create_app(state: AppState) -> Router {
    crate::routes::configure_routes()
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
