use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{Client, config::BehaviorVersion, config::Credentials, config::Region};
use bytes::Bytes;
use tracing::{debug, info};

use crate::modules::image::codec;
use crate::modules::image::error::{TransformError, TransformResult};
use crate::modules::image::model::{DecodedImage, ImageAsset};
use crate::modules::image::store::ImageStore;

#[derive(Clone)]
pub struct StorageService {
    pub client: Client,
    pub bucket: String,
}

impl StorageService {
    pub async fn new(
        endpoint: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "static");

        let config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO
            .build();

        let client = Client::from_conf(config);

        info!("✅ Connected to S3 (MinIO)");

        Self {
            client,
            bucket: bucket.to_string(),
        }
    }

    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to download {}/{}: {}", bucket, key, e))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| anyhow!("Failed to read {}/{}: {}", bucket, key, e))?;

        Ok(data.into_bytes())
    }

    /// Writes `body` into the configured bucket and returns its `"/bucket/key"` location.
    pub async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to upload {}: {}", key, e))?;

        Ok(format!("/{}/{}", self.bucket, key))
    }
}

#[async_trait]
impl ImageStore for StorageService {
    async fn load_image(&self, asset: &ImageAsset) -> TransformResult<DecodedImage> {
        let (bucket, object) = asset.location()?;
        let data = self
            .get_object(bucket, object)
            .await
            .map_err(TransformError::Storage)?;
        debug!(bucket, object, bytes = data.len(), "Downloaded image");

        codec::decode(&data)
    }

    async fn upload_image(&self, name: &str, body: Bytes, content_type: &str) -> Result<String> {
        self.put_object(name, body, content_type).await
    }
}
