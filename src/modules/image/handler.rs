use super::dto::{ImageResponse, TransformImageRequest, UploadImageForm};
use super::service::ImageService;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use tracing::info;

/// Upload an image
#[utoipa::path(
    post,
    path = "/api/v1/images",
    request_body(content = UploadImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = ApiResponse<ImageResponse>),
        (status = 400, description = "Bad Request")
    ),
    tag = "Images"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return ApiError::bad_request(e).into_response(),
        };

        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("image").to_string();
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => return ApiError::bad_request(e).into_response(),
        };
        info!("Receiving image upload: {} ({} bytes)", file_name, data.len());

        return match ImageService::upload_image(state, &file_name, data).await {
            Ok(res) => ApiSuccess::created(res, "Image uploaded successfully").into_response(),
            Err(e) => ApiError::bad_request(e).into_response(),
        };
    }

    ApiError::bad_request("Missing 'image' field").into_response()
}

/// Get image by ID
#[utoipa::path(
    get,
    path = "/api/v1/images/{id}",
    params(
        ("id" = i64, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image details", body = ApiResponse<ImageResponse>),
        (status = 404, description = "Image not found")
    ),
    tag = "Images"
)]
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match ImageService::get_image(state, id).await {
        Ok(image) => ApiSuccess::ok(image, "Image retrieved successfully").into_response(),
        Err(e) => ApiError::not_found(e).into_response(),
    }
}

/// Queue a transform for an image
#[utoipa::path(
    post,
    path = "/api/v1/images/{id}/transform",
    params(
        ("id" = i64, Path, description = "Image ID")
    ),
    request_body = TransformImageRequest,
    responses(
        (status = 202, description = "Transform queued", body = ApiResponse<String>),
        (status = 400, description = "Bad Request")
    ),
    tag = "Images"
)]
pub async fn transform_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<TransformImageRequest>,
) -> impl IntoResponse {
    match ImageService::enqueue_transform(state, id, payload.transform).await {
        Ok(_) => ApiSuccess::accepted((), "Transform queued").into_response(),
        Err(e) => ApiError::bad_request(e).into_response(),
    }
}
