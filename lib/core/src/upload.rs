//! Upload decoding
//!
//! Every model-facing component takes a [`GarmentImage`], so validation
//! (format, size, decodability) happens exactly once and before any
//! inference is attempted.

use crate::{Error, Result};
use image::{ImageFormat, RgbImage};
use std::sync::Arc;

/// Upload ceiling
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// A decoded RGB garment photo, cheap to clone and share across tasks
#[derive(Debug, Clone)]
pub struct GarmentImage {
    pixels: Arc<RgbImage>,
    format: Option<ImageFormat>,
}

impl GarmentImage {
    /// Decode a JPEG, PNG or WEBP payload of at most `max_bytes`
    pub fn decode(bytes: &[u8], max_bytes: usize) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidInput("empty image payload".to_string()));
        }
        if bytes.len() > max_bytes {
            return Err(Error::InvalidInput(format!(
                "image too large: {} bytes (maximum {})",
                bytes.len(),
                max_bytes
            )));
        }

        let format = image::guess_format(bytes)
            .map_err(|_| Error::InvalidInput("unrecognized image format".to_string()))?;
        if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP) {
            return Err(Error::InvalidInput(format!(
                "unsupported image format {:?}; allowed: jpeg, png, webp",
                format
            )));
        }

        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| Error::InvalidInput(format!("invalid image file: {}", e)))?;
        let rgb = decoded.to_rgb8();
        if rgb.width() == 0 || rgb.height() == 0 {
            return Err(Error::InvalidInput("image has no pixels".to_string()));
        }

        Ok(Self {
            pixels: Arc::new(rgb),
            format: Some(format),
        })
    }

    /// Wrap already-decoded pixels
    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
            format: None,
        }
    }

    #[inline]
    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }
}
