use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use super::error::TransformResult;
use super::model::{DecodedImage, ImageAsset};

/// Object storage holding the encoded images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Downloads and decodes the object behind `asset`.
    ///
    /// Location and codec failures keep their own variants; only the
    /// download itself is reported as `TransformError::Storage`.
    async fn load_image(&self, asset: &ImageAsset) -> TransformResult<DecodedImage>;

    /// Uploads `body` under `name` and returns its `"/bucket/object"` location.
    async fn upload_image(&self, name: &str, body: Bytes, content_type: &str) -> Result<String>;
}
