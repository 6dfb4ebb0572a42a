use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::ImageAsset;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResizeOptions {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl ResizeOptions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CropOptions {
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl CropOptions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FilterOptions {
    #[serde(default)]
    pub grayscale: bool,
    #[serde(default)]
    pub sepia: bool,
}

impl FilterOptions {
    pub fn is_empty(&self) -> bool {
        !self.grayscale && !self.sepia
    }
}

/// Operations requested for one image. Every field is optional; a field that
/// is absent or holds its zero value is not requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TransformRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize: Option<ResizeOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropOptions>,
    /// Degrees counter-clockwise. Only values above zero rotate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterOptions>,
}

impl TransformRequest {
    pub fn crop(&self) -> Option<CropOptions> {
        self.crop.filter(|c| !c.is_empty())
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref().filter(|f| !f.is_empty())
    }

    pub fn filters(&self) -> Option<FilterOptions> {
        self.filters.filter(|f| !f.is_empty())
    }

    pub fn resize(&self) -> Option<ResizeOptions> {
        self.resize.filter(|r| !r.is_empty())
    }

    /// A rotation of exactly zero (or less) is treated as not requested.
    pub fn rotate(&self) -> Option<f64> {
        self.rotate.filter(|degrees| *degrees > 0.0)
    }
}

/// HTTP body for `POST /images/{id}/transform`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransformImageRequest {
    pub transform: TransformRequest,
}

/// Multipart body for `POST /images`, documented for the OpenAPI schema only.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadImageForm {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageResponse {
    pub id: i64,
    pub url: String,
}

impl From<ImageAsset> for ImageResponse {
    fn from(asset: ImageAsset) -> Self {
        Self {
            id: asset.id,
            url: asset.url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values_are_not_requested() {
        let req: TransformRequest = serde_json::from_str(
            r#"{
                "resize": {"width": 0, "height": 0},
                "crop": {"x": 0, "y": 0, "width": 0, "height": 0},
                "rotate": 0,
                "format": "",
                "filters": {"grayscale": false, "sepia": false}
            }"#,
        )
        .unwrap();

        assert!(req.resize().is_none());
        assert!(req.crop().is_none());
        assert!(req.rotate().is_none());
        assert!(req.format().is_none());
        assert!(req.filters().is_none());
    }

    #[test]
    fn test_partial_options_are_requested() {
        let req: TransformRequest = serde_json::from_str(
            r#"{"resize": {"width": 50}, "crop": {"x": 3}, "rotate": 12.5, "format": "png", "filters": {"sepia": true}}"#,
        )
        .unwrap();

        assert_eq!(req.resize(), Some(ResizeOptions { width: 50, height: 0 }));
        assert_eq!(req.crop().map(|c| c.x), Some(3));
        assert_eq!(req.rotate(), Some(12.5));
        assert_eq!(req.format(), Some("png"));
        assert_eq!(
            req.filters(),
            Some(FilterOptions {
                grayscale: false,
                sepia: true
            })
        );
    }

    #[test]
    fn test_negative_rotation_is_skipped() {
        let req = TransformRequest {
            rotate: Some(-90.0),
            ..Default::default()
        };
        assert!(req.rotate().is_none());
    }

    #[test]
    fn test_empty_request_serializes_to_empty_object() {
        let json = serde_json::to_string(&TransformRequest::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
