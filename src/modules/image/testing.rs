//! In-memory collaborators for exercising the pipeline and consumer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, Rgba, RgbaImage};

use super::codec;
use super::error::{TransformError, TransformResult};
use super::model::{DecodedImage, ImageAsset};
use super::repository::ImageRepository;
use super::store::ImageStore;
use crate::workers::transformer::{Disposition, JobDelivery};

pub fn solid_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([120, 80, 40, 255])))
}

pub struct InMemoryStore {
    bucket: String,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    uploads: AtomicUsize,
}

impl InMemoryStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: Mutex::new(HashMap::new()),
            uploads: AtomicUsize::new(0),
        }
    }

    /// Stores `image` under `name` and registers it in `repo` with `id`.
    pub async fn seed(
        &self,
        repo: &InMemoryRepository,
        id: i64,
        name: &str,
        image: &DynamicImage,
        format: &str,
    ) -> ImageAsset {
        let data = codec::encode(format, image).unwrap();
        self.objects.lock().unwrap().insert(name.to_string(), data);
        let url = format!("/{}/{}", self.bucket, name);
        repo.insert(id, &url);
        ImageAsset::new(id, url)
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageStore for InMemoryStore {
    async fn load_image(&self, asset: &ImageAsset) -> TransformResult<DecodedImage> {
        let (bucket, object) = asset.location()?;
        if bucket != self.bucket {
            return Err(TransformError::Storage(anyhow!("no such bucket {}", bucket)));
        }
        let data = self
            .objects
            .lock()
            .unwrap()
            .get(object)
            .cloned()
            .ok_or_else(|| TransformError::Storage(anyhow!("no such object {}", object)))?;
        codec::decode(&data)
    }

    async fn upload_image(&self, name: &str, body: Bytes, _content_type: &str) -> Result<String> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().insert(name.to_string(), body.to_vec());
        Ok(format!("/{}/{}", self.bucket, name))
    }
}

#[derive(Default)]
pub struct InMemoryRepository {
    images: Mutex<HashMap<i64, String>>,
    saves: AtomicUsize,
}

impl InMemoryRepository {
    pub fn insert(&self, id: i64, url: &str) {
        self.images.lock().unwrap().insert(id, url.to_string());
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageRepository for InMemoryRepository {
    async fn get_image(&self, id: i64) -> Result<ImageAsset> {
        self.images
            .lock()
            .unwrap()
            .get(&id)
            .map(|url| ImageAsset::new(id, url.clone()))
            .ok_or_else(|| anyhow!("Image {} not found", id))
    }

    async fn save_image(&self, url: &str) -> Result<i64> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let mut images = self.images.lock().unwrap();
        let id = images.keys().max().copied().unwrap_or(0) + 1;
        images.insert(id, url.to_string());
        Ok(id)
    }
}

/// Delivery that records how it was settled. Clones share the record.
#[derive(Clone)]
pub struct FakeDelivery {
    body: Vec<u8>,
    settled: Arc<Mutex<Vec<Disposition>>>,
}

impl FakeDelivery {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            settled: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn settled(&self) -> Vec<Disposition> {
        self.settled.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobDelivery for FakeDelivery {
    fn body(&self) -> &[u8] {
        &self.body
    }

    async fn ack(&self) -> Result<()> {
        self.settled.lock().unwrap().push(Disposition::Acked);
        Ok(())
    }

    async fn discard(&self) -> Result<()> {
        self.settled.lock().unwrap().push(Disposition::Discarded);
        Ok(())
    }
}
