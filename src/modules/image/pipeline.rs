//! Applies a transform request to a stored image and persists the result.
//!
//! Stages run in a fixed order: crop, format, filters, resize, rotate. Each is
//! gated on its own field of the request. A run where nothing fires leaves the
//! original image untouched.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};
use uuid::Uuid;

use super::codec;
use super::dto::TransformRequest;
use super::error::{TransformError, TransformResult};
use super::events::TransformJob;
use super::model::{DecodedImage, ImageAsset};
use super::ops;
use super::repository::ImageRepository;
use super::store::ImageStore;

pub const STAGE_CROP: &str = "cropped";
pub const STAGE_FORMAT: &str = "formatted";
pub const STAGE_FILTER: &str = "filtered";
pub const STAGE_RESIZE: &str = "resized";
pub const STAGE_ROTATE: &str = "rotated";

const SUMMARY_SEPARATOR: &str = "_";

struct Stage {
    name: &'static str,
    is_requested: fn(&TransformRequest) -> bool,
    apply: fn(&TransformRequest, DecodedImage) -> TransformResult<DecodedImage>,
}

static STAGES: [Stage; 5] = [
    Stage {
        name: STAGE_CROP,
        is_requested: |req| req.crop().is_some(),
        apply: apply_crop,
    },
    Stage {
        name: STAGE_FORMAT,
        is_requested: |req| req.format().is_some(),
        apply: apply_format,
    },
    Stage {
        name: STAGE_FILTER,
        is_requested: |req| req.filters().is_some(),
        apply: apply_filters,
    },
    Stage {
        name: STAGE_RESIZE,
        is_requested: |req| req.resize().is_some(),
        apply: apply_resize,
    },
    Stage {
        name: STAGE_ROTATE,
        is_requested: |req| req.rotate().is_some(),
        apply: apply_rotate,
    },
];

fn apply_crop(req: &TransformRequest, mut img: DecodedImage) -> TransformResult<DecodedImage> {
    if let Some(opts) = req.crop() {
        img.image = ops::crop(&img.image, opts)?;
    }
    Ok(img)
}

fn apply_format(req: &TransformRequest, mut img: DecodedImage) -> TransformResult<DecodedImage> {
    if let Some(target) = req.format() {
        img.image = codec::convert(&img.image, target)?;
        img.format = target.to_string();
    }
    Ok(img)
}

fn apply_filters(req: &TransformRequest, mut img: DecodedImage) -> TransformResult<DecodedImage> {
    if let Some(filters) = req.filters() {
        if filters.grayscale {
            img.image = ops::grayscale(&img.image);
        }
        if filters.sepia {
            img.image = ops::sepia(&img.image);
        }
    }
    Ok(img)
}

fn apply_resize(req: &TransformRequest, mut img: DecodedImage) -> TransformResult<DecodedImage> {
    if let Some(opts) = req.resize() {
        img.image = ops::resize(&img.image, opts)?;
    }
    Ok(img)
}

fn apply_rotate(req: &TransformRequest, mut img: DecodedImage) -> TransformResult<DecodedImage> {
    if let Some(degrees) = req.rotate() {
        img.image = ops::rotate(&img.image, degrees)?;
    }
    Ok(img)
}

/// Runs every requested stage over `img`, returning the result and the names
/// of the stages that fired, in order.
pub fn apply_stages(
    req: &TransformRequest,
    mut img: DecodedImage,
) -> TransformResult<(DecodedImage, Vec<&'static str>)> {
    let mut fired = Vec::new();
    for stage in &STAGES {
        if (stage.is_requested)(req) {
            debug!(stage = stage.name, "Applying transform stage");
            img = (stage.apply)(req, img)?;
            fired.push(stage.name);
        }
    }
    Ok((img, fired))
}

/// Inserts `-{summary}-{tag}` before the extension of `object`.
pub fn derived_object_name(object: &str, fired: &[&str], tag: &str) -> String {
    let summary = fired.join(SUMMARY_SEPARATOR);
    match object.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{summary}-{tag}.{ext}"),
        _ => format!("{object}-{summary}-{tag}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    /// No stage was requested; nothing was uploaded or saved.
    Unchanged(ImageAsset),
    Created(ImageAsset),
}

impl TransformOutcome {
    pub fn asset(&self) -> &ImageAsset {
        match self {
            TransformOutcome::Unchanged(asset) | TransformOutcome::Created(asset) => asset,
        }
    }
}

#[derive(Clone)]
pub struct TransformPipeline {
    store: Arc<dyn ImageStore>,
    repository: Arc<dyn ImageRepository>,
}

impl TransformPipeline {
    pub fn new(store: Arc<dyn ImageStore>, repository: Arc<dyn ImageRepository>) -> Self {
        Self { store, repository }
    }

    /// Resolves the job's image and applies its request.
    pub async fn run(&self, job: &TransformJob) -> TransformResult<TransformOutcome> {
        let asset = self
            .repository
            .get_image(job.image_id)
            .await
            .map_err(TransformError::Repository)?;

        self.apply(&asset, &job.opts).await
    }

    pub async fn apply(
        &self,
        asset: &ImageAsset,
        req: &TransformRequest,
    ) -> TransformResult<TransformOutcome> {
        let decoded = self
            .store
            .load_image(asset)
            .await?;

        let (transformed, fired) = apply_stages(req, decoded)?;
        if fired.is_empty() {
            return Ok(TransformOutcome::Unchanged(asset.clone()));
        }

        let codec = codec::lookup(&transformed.format)?;
        let mut buf = Vec::new();
        (codec.encode)(&mut buf, &transformed.image)?;

        let tag = Uuid::new_v4().as_simple().to_string()[..6].to_string();
        let name = derived_object_name(asset.object()?, &fired, &tag);

        let url = self
            .store
            .upload_image(&name, Bytes::from(buf), codec.content_type)
            .await
            .map_err(TransformError::Storage)?;

        let id = self
            .repository
            .save_image(&url)
            .await
            .map_err(TransformError::Repository)?;

        info!(source_id = asset.id, new_id = id, url = %url, stages = ?fired, "Stored transformed image");
        Ok(TransformOutcome::Created(ImageAsset::new(id, url)))
    }
}
