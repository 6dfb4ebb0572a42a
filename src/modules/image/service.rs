use super::codec;
use super::dto::{ImageResponse, TransformRequest};
use super::events::TransformJob;
use crate::state::AppState;
use anyhow::{anyhow, Result};
use bytes::Bytes;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

pub struct ImageService;

impl ImageService {
    fn object_name(file_name: &str) -> String {
        let base = Path::new(file_name)
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("image");
        format!("{}-{}", &Uuid::new_v4().as_simple().to_string()[..6], base)
    }

    pub async fn upload_image(state: AppState, file_name: &str, data: Bytes) -> Result<ImageResponse> {
        // Refuse anything the transformer could not decode later.
        let decoded = codec::decode(&data).map_err(|e| anyhow!("Unsupported image: {}", e))?;
        let content_type = codec::lookup(&decoded.format)?.content_type;

        let name = Self::object_name(file_name);
        let url = state.storage.upload_image(&name, data, content_type).await?;
        let id = state.images.save_image(&url).await?;

        info!("Stored uploaded image {} at {}", id, url);
        Ok(ImageResponse { id, url })
    }

    pub async fn get_image(state: AppState, id: i64) -> Result<ImageResponse> {
        let image = state.images.get_image(id).await?;
        Ok(ImageResponse::from(image))
    }

    /// Publishes a transform job for a known image; the worker applies it later.
    pub async fn enqueue_transform(state: AppState, id: i64, req: TransformRequest) -> Result<()> {
        state.images.get_image(id).await?;

        let payload = TransformJob::new(id, req).to_bytes()?;
        state.publisher.publish(&state.config.queue_name, &payload).await?;

        info!("Queued transform job for image {}", id);
        Ok(())
    }
}
