use thiserror::Error;

/// Failures of a single transform run.
///
/// Collaborator failures are carried unmodified in `Storage` and `Repository`
/// so the consumer can log the original cause.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("format not implemented: {0}")]
    FormatNotImplemented(String),

    #[error("crop rectangle ({x}, {y}, {width}x{height}) does not fit a {image_width}x{image_height} image")]
    InvalidCrop {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("resize target {width}x{height} must be non-empty and within the output pixel limit")]
    InvalidResize { width: u32, height: u32 },

    #[error("rotated canvas {width}x{height} exceeds the output pixel limit")]
    CanvasTooLarge { width: u64, height: u64 },

    #[error("malformed image location {0:?}, expected \"/bucket/object\"")]
    MalformedLocation(String),

    #[error("codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),

    #[error("repository error: {0}")]
    Repository(#[source] anyhow::Error),
}

pub type TransformResult<T> = Result<T, TransformError>;
