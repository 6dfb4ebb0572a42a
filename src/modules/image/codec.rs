//! Registry of the codecs the transformer can write.
//!
//! Format changes go through the registry as an encode/decode round trip, so
//! the pipeline only ever holds one decoded representation.

use std::io::Write;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageFormat, ImageResult};

use super::error::{TransformError, TransformResult};
use super::model::DecodedImage;

pub const IMG_JPEG: &str = "jpeg";
pub const IMG_PNG: &str = "png";

const JPEG_QUALITY: u8 = 75;

pub type EncodeFn = fn(&mut dyn Write, &DynamicImage) -> ImageResult<()>;

pub struct Codec {
    pub name: &'static str,
    pub format: ImageFormat,
    pub content_type: &'static str,
    pub encode: EncodeFn,
}

static CODECS: [Codec; 2] = [
    Codec {
        name: IMG_JPEG,
        format: ImageFormat::Jpeg,
        content_type: "image/jpeg",
        encode: encode_jpeg,
    },
    Codec {
        name: IMG_PNG,
        format: ImageFormat::Png,
        content_type: "image/png",
        encode: encode_png,
    },
];

fn encode_jpeg(w: &mut dyn Write, image: &DynamicImage) -> ImageResult<()> {
    // JPEG has no alpha channel.
    DynamicImage::ImageRgb8(image.to_rgb8())
        .write_with_encoder(JpegEncoder::new_with_quality(w, JPEG_QUALITY))
}

fn encode_png(w: &mut dyn Write, image: &DynamicImage) -> ImageResult<()> {
    image.write_with_encoder(PngEncoder::new(w))
}

pub fn lookup(name: &str) -> TransformResult<&'static Codec> {
    CODECS
        .iter()
        .find(|codec| codec.name == name)
        .ok_or_else(|| TransformError::FormatNotImplemented(name.to_string()))
}

fn lookup_format(format: ImageFormat) -> TransformResult<&'static Codec> {
    CODECS
        .iter()
        .find(|codec| codec.format == format)
        .ok_or_else(|| TransformError::FormatNotImplemented(format!("{format:?}").to_lowercase()))
}

/// Encodes `image` with the codec registered under `name`.
pub fn encode(name: &str, image: &DynamicImage) -> TransformResult<Vec<u8>> {
    let codec = lookup(name)?;
    let mut buf = Vec::new();
    (codec.encode)(&mut buf, image)?;
    Ok(buf)
}

/// Decodes stored bytes, tagging the result with the codec they were written in.
pub fn decode(bytes: &[u8]) -> TransformResult<DecodedImage> {
    let codec = lookup_format(image::guess_format(bytes)?)?;
    let image = image::load_from_memory_with_format(bytes, codec.format)?;
    Ok(DecodedImage::new(image, codec.name))
}

/// Re-encodes `image` as `target` and decodes it back.
pub fn convert(image: &DynamicImage, target: &str) -> TransformResult<DynamicImage> {
    let codec = lookup(target)?;
    let buf = encode(target, image)?;
    Ok(image::load_from_memory_with_format(&buf, codec.format)?)
}
