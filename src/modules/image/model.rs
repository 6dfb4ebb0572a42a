use image::DynamicImage;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::error::{TransformError, TransformResult};

/// A stored image: its row id and the `"/bucket/object"` location it was uploaded to.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub id: i64,
    pub url: String,
}

impl ImageAsset {
    pub fn new(id: i64, url: impl Into<String>) -> Self {
        Self { id, url: url.into() }
    }

    /// Splits the location into its bucket and object segments.
    pub fn location(&self) -> TransformResult<(&str, &str)> {
        let malformed = || TransformError::MalformedLocation(self.url.clone());

        let rest = self.url.strip_prefix('/').ok_or_else(malformed)?;
        let (bucket, object) = rest.split_once('/').ok_or_else(malformed)?;
        if bucket.is_empty() || object.is_empty() || object.contains('/') {
            return Err(malformed());
        }
        Ok((bucket, object))
    }

    pub fn object(&self) -> TransformResult<&str> {
        self.location().map(|(_, object)| object)
    }
}

/// Pixels plus the codec name they were decoded from ("jpeg", "png").
///
/// Owned by one pipeline run; never shared.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: String,
}

impl DecodedImage {
    pub fn new(image: DynamicImage, format: impl Into<String>) -> Self {
        Self {
            image,
            format: format.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_split() {
        let asset = ImageAsset::new(1, "/images/cat.jpg");
        assert_eq!(asset.location().unwrap(), ("images", "cat.jpg"));
        assert_eq!(asset.object().unwrap(), "cat.jpg");
    }

    #[test]
    fn test_malformed_locations() {
        for url in ["images/cat.jpg", "/images", "/images/", "//cat.jpg", "/a/b/c.jpg", ""] {
            let asset = ImageAsset::new(1, url);
            assert!(
                matches!(asset.location(), Err(TransformError::MalformedLocation(_))),
                "{url:?} should be rejected"
            );
        }
    }
}
