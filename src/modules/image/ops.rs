//! Pixel operations. Each one reads its input and returns a new image.

use image::{imageops, DynamicImage, GenericImageView, Rgba, RgbaImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

use super::dto::{CropOptions, ResizeOptions};
use super::error::{TransformError, TransformResult};

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Channel maximum of opaque white at 16-bit precision.
const WHITE_MAX: f64 = u16::MAX as f64;
/// Largest canvas, in pixels, that resize or rotate may allocate.
pub const MAX_OUTPUT_PIXELS: u64 = 100_000_000;

fn fits_pixel_limit(width: u64, height: u64) -> bool {
    width
        .checked_mul(height)
        .is_some_and(|pixels| pixels <= MAX_OUTPUT_PIXELS)
}

/// Restricts the image to `[x, x + width) x [y, y + height)`.
pub fn crop(image: &DynamicImage, opts: CropOptions) -> TransformResult<DynamicImage> {
    let (image_width, image_height) = image.dimensions();
    let fits = opts.width > 0
        && opts.height > 0
        && u64::from(opts.x) + u64::from(opts.width) <= u64::from(image_width)
        && u64::from(opts.y) + u64::from(opts.height) <= u64::from(image_height);

    if !fits {
        return Err(TransformError::InvalidCrop {
            x: opts.x,
            y: opts.y,
            width: opts.width,
            height: opts.height,
            image_width,
            image_height,
        });
    }

    Ok(image.crop_imm(opts.x, opts.y, opts.width, opts.height))
}

/// Nearest-neighbour resize: output `(x, y)` samples source
/// `(floor(x * src_w / w), floor(y * src_h / h))`.
pub fn resize(image: &DynamicImage, opts: ResizeOptions) -> TransformResult<DynamicImage> {
    if opts.width == 0
        || opts.height == 0
        || !fits_pixel_limit(u64::from(opts.width), u64::from(opts.height))
    {
        return Err(TransformError::InvalidResize {
            width: opts.width,
            height: opts.height,
        });
    }

    let source = image.to_rgba8();
    let (src_w, src_h) = source.dimensions();
    let resized = RgbaImage::from_fn(opts.width, opts.height, |x, y| {
        let sx = u64::from(x) * u64::from(src_w) / u64::from(opts.width);
        let sy = u64::from(y) * u64::from(src_h) / u64::from(opts.height);
        *source.get_pixel(sx as u32, sy as u32)
    });

    Ok(DynamicImage::ImageRgba8(resized))
}

/// Rotates counter-clockwise by `degrees`. The canvas grows to hold the whole
/// rotated image and uncovered pixels are opaque black.
pub fn rotate(image: &DynamicImage, degrees: f64) -> TransformResult<DynamicImage> {
    let source = image.to_rgba8();
    let normalized = degrees.rem_euclid(360.0);

    if normalized == 0.0 {
        return Ok(DynamicImage::ImageRgba8(source));
    }
    if normalized == 90.0 {
        return Ok(DynamicImage::ImageRgba8(imageops::rotate270(&source)));
    }
    if normalized == 180.0 {
        return Ok(DynamicImage::ImageRgba8(imageops::rotate180(&source)));
    }
    if normalized == 270.0 {
        return Ok(DynamicImage::ImageRgba8(imageops::rotate90(&source)));
    }

    let theta = normalized.to_radians();
    let (sin, cos) = theta.sin_cos();
    let (w, h) = (f64::from(source.width()), f64::from(source.height()));
    let out_w = (w * cos.abs() + h * sin.abs()).round().max(1.0);
    let out_h = (w * sin.abs() + h * cos.abs()).round().max(1.0);
    // Float to int casts saturate, so an out-of-range side fails the limit.
    let (canvas_w, canvas_h) = (out_w as u64, out_h as u64);
    if !fits_pixel_limit(canvas_w, canvas_h) {
        return Err(TransformError::CanvasTooLarge {
            width: canvas_w,
            height: canvas_h,
        });
    }

    let projection = Projection::translate((out_w / 2.0) as f32, (out_h / 2.0) as f32)
        * Projection::rotate(-theta as f32)
        * Projection::translate(-(w / 2.0) as f32, -(h / 2.0) as f32);

    let mut out = RgbaImage::from_pixel(canvas_w as u32, canvas_h as u32, BACKGROUND);
    warp_into(&source, &projection, Interpolation::Bilinear, BACKGROUND, &mut out);
    Ok(DynamicImage::ImageRgba8(out))
}

/// Luma grayscale (0.21 R + 0.72 G + 0.07 B) computed at 16-bit precision.
/// Alpha is kept.
pub fn grayscale(image: &DynamicImage) -> DynamicImage {
    let source = image.to_rgba16();
    let out = RgbaImage::from_fn(source.width(), source.height(), |x, y| {
        let [r, g, b, a] = source.get_pixel(x, y).0;
        let gray = 0.21 * f64::from(r) + 0.72 * f64::from(g) + 0.07 * f64::from(b);
        let gray = to_u8(gray as u16);
        Rgba([gray, gray, gray, to_u8(a)])
    });
    DynamicImage::ImageRgba8(out)
}

/// Sepia tone. A channel whose computed value goes past white keeps its
/// original value rather than saturating.
pub fn sepia(image: &DynamicImage) -> DynamicImage {
    let source = image.to_rgba16();
    let out = RgbaImage::from_fn(source.width(), source.height(), |x, y| {
        let [r, g, b, a] = source.get_pixel(x, y).0;
        let (fr, fg, fb) = (f64::from(r), f64::from(g), f64::from(b));

        let tr = 0.393 * fr + 0.769 * fg + 0.189 * fb;
        let tg = 0.349 * fr + 0.686 * fg + 0.168 * fb;
        let tb = 0.272 * fr + 0.534 * fg + 0.131 * fb;

        Rgba([
            to_u8(clamp_or_original(tr, r)),
            to_u8(clamp_or_original(tg, g)),
            to_u8(clamp_or_original(tb, b)),
            to_u8(a),
        ])
    });
    DynamicImage::ImageRgba8(out)
}

fn clamp_or_original(value: f64, original: u16) -> u16 {
    if value > WHITE_MAX {
        original
    } else {
        value as u16
    }
}

fn to_u8(channel: u16) -> u8 {
    (channel >> 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([
                (x * 37 % 256) as u8,
                (y * 59 % 256) as u8,
                ((x + y) * 13 % 256) as u8,
                255,
            ])
        }))
    }

    #[test]
    fn test_crop_dimensions_and_content() {
        let img = gradient(20, 10);
        let cropped = crop(&img, CropOptions { x: 5, y: 2, width: 7, height: 4 }).unwrap();
        assert_eq!(cropped.dimensions(), (7, 4));
        assert_eq!(cropped.get_pixel(0, 0), img.get_pixel(5, 2));
        assert_eq!(cropped.get_pixel(6, 3), img.get_pixel(11, 5));
    }

    #[test]
    fn test_crop_full_image() {
        let img = gradient(4, 4);
        let cropped = crop(&img, CropOptions { x: 0, y: 0, width: 4, height: 4 }).unwrap();
        assert_eq!(cropped.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let img = gradient(10, 10);
        let cases = [
            CropOptions { x: 8, y: 0, width: 3, height: 1 },
            CropOptions { x: 0, y: 9, width: 1, height: 2 },
            CropOptions { x: 0, y: 0, width: 0, height: 5 },
            CropOptions { x: u32::MAX, y: 0, width: 2, height: 2 },
        ];
        for opts in cases {
            assert!(
                matches!(crop(&img, opts), Err(TransformError::InvalidCrop { .. })),
                "{opts:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_resize_nearest_neighbour_mapping() {
        let img = gradient(7, 5);
        let source = img.to_rgba8();
        for (tw, th) in [(3, 2), (14, 10), (7, 5), (1, 1), (10, 3)] {
            let resized = resize(&img, ResizeOptions { width: tw, height: th }).unwrap();
            assert_eq!(resized.dimensions(), (tw, th));
            let resized = resized.to_rgba8();
            for y in 0..th {
                for x in 0..tw {
                    let sx = x * 7 / tw;
                    let sy = y * 5 / th;
                    assert_eq!(resized.get_pixel(x, y), source.get_pixel(sx, sy));
                }
            }
        }
    }

    #[test]
    fn test_resize_rejects_zero_dimension() {
        let img = gradient(4, 4);
        assert!(matches!(
            resize(&img, ResizeOptions { width: 0, height: 4 }),
            Err(TransformError::InvalidResize { .. })
        ));
    }

    #[test]
    fn test_resize_rejects_oversized_target() {
        let img = gradient(4, 4);
        let cases = [
            ResizeOptions { width: u32::MAX, height: u32::MAX },
            ResizeOptions { width: 65_535, height: 65_535 },
            ResizeOptions { width: u32::MAX, height: 1 },
        ];
        for opts in cases {
            assert!(
                matches!(resize(&img, opts), Err(TransformError::InvalidResize { .. })),
                "{opts:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_resize_at_pixel_limit_boundary() {
        let img = gradient(2, 2);
        let over = ResizeOptions { width: 10_001, height: 10_000 };
        assert!(resize(&img, over).is_err());
        let thin = resize(&img, ResizeOptions { width: 1, height: 3 }).unwrap();
        assert_eq!(thin.dimensions(), (1, 3));
    }

    #[test]
    fn test_rotate_rejects_oversized_canvas() {
        // A 200000x1 strip turned 45 degrees needs a ~141k square canvas.
        let wide = DynamicImage::ImageRgba8(RgbaImage::new(200_000, 1));
        assert!(matches!(
            rotate(&wide, 45.0),
            Err(TransformError::CanvasTooLarge { .. })
        ));
    }

    #[test]
    fn test_rotate_quarter_turn_counter_clockwise() {
        let mut img = RgbaImage::from_pixel(4, 2, Rgba([0, 0, 255, 255]));
        img.put_pixel(3, 0, Rgba([255, 0, 0, 255]));
        let rotated = rotate(&DynamicImage::ImageRgba8(img), 90.0).unwrap();
        assert_eq!(rotated.dimensions(), (2, 4));
        // The top-right corner ends up top-left.
        assert_eq!(rotated.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_rotate_half_turn_and_full_turn() {
        let img = gradient(6, 3);
        let half = rotate(&img, 180.0).unwrap();
        assert_eq!(half.dimensions(), (6, 3));
        assert_eq!(half.get_pixel(0, 0), img.get_pixel(5, 2));
        assert_eq!(rotate(&img, 360.0).unwrap().to_rgba8(), img.to_rgba8());
        assert_eq!(rotate(&img, 270.0).unwrap().dimensions(), (3, 6));
    }

    #[test]
    fn test_rotate_arbitrary_angle_fills_black() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255])));
        let rotated = rotate(&img, 45.0).unwrap();
        assert_eq!(rotated.dimensions(), (14, 14));
        assert_eq!(rotated.get_pixel(0, 0), BACKGROUND);
        assert_eq!(rotated.get_pixel(7, 7), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_grayscale_weights() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 128])));
        let gray = grayscale(&img);
        // 0.21 * 65535 = 13762.35 -> 13762 >> 8 = 53
        assert_eq!(gray.get_pixel(0, 0), Rgba([53, 53, 53, 128]));
    }

    #[test]
    fn test_grayscale_is_idempotent() {
        let img = gradient(16, 16);
        let once = grayscale(&img);
        let twice = grayscale(&once);
        assert_eq!(once.to_rgba8(), twice.to_rgba8());
    }

    #[test]
    fn test_sepia_overflow_keeps_original_channel() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([200, 200, 200, 255])));
        let toned = sepia(&img);
        // tr = 1.351 * 51400 exceeds white, so red stays 200 instead of 255.
        // tg = 1.203 * 51400 = 61834 -> 241, tb = 0.937 * 51400 = 48161 -> 188
        assert_eq!(toned.get_pixel(0, 0), Rgba([200, 241, 188, 255]));
    }

    #[test]
    fn test_sepia_dark_pixel() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255])));
        assert_eq!(sepia(&img).get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }
}
