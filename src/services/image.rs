// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Image normalization: decode an uploaded photo, bound its width and
//! re-encode it as a compact JPEG suitable for inline storage.

use crate::config::ImagePolicy;
use crate::error::AppError;
use crate::models::NormalizedImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use tokio::task::JoinHandle;

/// Output MIME type of every normalized image.
pub const NORMALIZED_MIME: &str = "image/jpeg";

/// Re-encodes images according to an [`ImagePolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageNormalizer {
    policy: ImagePolicy,
}

impl ImageNormalizer {
    pub fn new(policy: ImagePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ImagePolicy {
        self.policy
    }

    /// Normalize an image synchronously.
    ///
    /// Every image goes through the full decode/resize/encode pipeline, even
    /// when it is already narrow enough, so the output encoding is uniform.
    pub fn normalize(&self, source: &[u8]) -> Result<NormalizedImage, AppError> {
        let decoded = image::load_from_memory(source)
            .map_err(|e| AppError::ImageProcessing(format!("Unable to decode image: {}", e)))?;

        let (width, height) = decoded.dimensions();
        let (target_width, target_height) =
            target_dimensions(width, height, self.policy.max_width);

        let resized = if (target_width, target_height) == (width, height) {
            decoded
        } else {
            decoded.resize_exact(target_width, target_height, FilterType::Triangle)
        };
        let rgb = resized.to_rgb8();

        let mut data = Vec::new();
        JpegEncoder::new_with_quality(&mut data, self.policy.jpeg_quality())
            .encode_image(&rgb)
            .map_err(|e| AppError::ImageProcessing(format!("Unable to encode image: {}", e)))?;

        tracing::debug!(
            source_bytes = source.len(),
            output_bytes = data.len(),
            width = target_width,
            height = target_height,
            "Image normalized"
        );

        Ok(NormalizedImage::new(NORMALIZED_MIME, data))
    }

    /// Normalize on the blocking pool. Each call is independent, so several
    /// images can be processed at once.
    pub fn spawn(&self, source: Vec<u8>) -> JoinHandle<Result<NormalizedImage, AppError>> {
        let normalizer = *self;
        tokio::task::spawn_blocking(move || normalizer.normalize(&source))
    }
}

/// Output size for an image of `width` x `height`.
///
/// Wider images are scaled to exactly `max_width` keeping the aspect ratio
/// (height truncated, at least 1px); narrower images keep their size.
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let scale = max_width as f64 / width as f64;
    let scaled_height = ((height as f64) * scale).trunc() as u32;
    (max_width, scaled_height.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 200])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn decoded_dimensions(image: &NormalizedImage) -> (u32, u32) {
        image::load_from_memory(&image.data).unwrap().dimensions()
    }

    #[test]
    fn test_target_dimensions() {
        assert_eq!(target_dimensions(800, 600, 400), (400, 300));
        assert_eq!(target_dimensions(1000, 333, 400), (400, 133));
        assert_eq!(target_dimensions(300, 900, 400), (300, 900));
        assert_eq!(target_dimensions(4000, 1, 400), (400, 1));
    }

    #[test]
    fn test_wide_image_is_downscaled() {
        let normalizer = ImageNormalizer::default();
        let out = normalizer.normalize(&png_bytes(800, 600)).unwrap();

        assert_eq!(out.mime_type, NORMALIZED_MIME);
        assert_eq!(decoded_dimensions(&out), (400, 300));
    }

    #[test]
    fn test_narrow_image_is_reencoded() {
        let normalizer = ImageNormalizer::default();
        let out = normalizer.normalize(&png_bytes(120, 80)).unwrap();

        assert_eq!(out.mime_type, NORMALIZED_MIME);
        assert_eq!(decoded_dimensions(&out), (120, 80));
        assert_eq!(
            image::guess_format(&out.data).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_renormalizing_stays_bounded() {
        let normalizer = ImageNormalizer::default();
        let once = normalizer.normalize(&png_bytes(1200, 900)).unwrap();
        let twice = normalizer.normalize(&once.data).unwrap();

        let (width, _) = decoded_dimensions(&twice);
        assert!(width <= 400);
        assert_eq!(twice.mime_type, once.mime_type);
        assert_eq!(decoded_dimensions(&twice), decoded_dimensions(&once));
    }

    #[test]
    fn test_source_is_not_mutated() {
        let source = png_bytes(600, 400);
        let copy = source.clone();
        ImageNormalizer::default().normalize(&source).unwrap();
        assert_eq!(source, copy);
    }

    #[test]
    fn test_undecodable_source() {
        let err = ImageNormalizer::default()
            .normalize(b"definitely not an image")
            .unwrap_err();
        assert!(matches!(err, AppError::ImageProcessing(_)));
    }

    #[tokio::test]
    async fn test_spawned_normalizations_run_independently() {
        let normalizer = ImageNormalizer::default();
        let first = normalizer.spawn(png_bytes(900, 300));
        let second = normalizer.spawn(b"garbage".to_vec());

        let (first, second) = tokio::join!(first, second);
        assert!(first.unwrap().is_ok());
        assert!(matches!(
            second.unwrap(),
            Err(AppError::ImageProcessing(_))
        ));
    }
}
