use axum::Router;
use axum::routing::{get, post};
use crate::state::AppState;

pub mod codec;
pub mod dto;
pub mod error;
pub mod events;
pub mod handler;
pub mod model;
pub mod ops;
pub mod pipeline;
pub mod repository;
pub mod service;
pub mod store;
#[cfg(test)]
pub mod testing;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::upload_image))
        .route("/{id}", get(handler::get_image))
        .route("/{id}/transform", post(handler::transform_image))
}
