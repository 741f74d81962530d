use std::io::Cursor;
use std::sync::Arc;

use anyhow::{Context, Result};
use image::{imageops, ImageFormat, RgbaImage};

/// Longest edge of a checkpoint thumbnail, in pixels.
pub const MAX_EDGE: u32 = 160;

/// Downscaled copy of the video frame behind a checkpoint.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    image: Arc<RgbaImage>,
}

impl Thumbnail {
    /// Scale `frame` so its longer edge is at most [`MAX_EDGE`], keeping the
    /// aspect ratio. Frames already small enough are copied as-is.
    pub fn from_frame(frame: &RgbaImage) -> Self {
        let (width, height) = frame.dimensions();
        let longest = width.max(height);
        let image = if longest <= MAX_EDGE || width == 0 || height == 0 {
            frame.clone()
        } else {
            let scale = f64::from(MAX_EDGE) / f64::from(longest);
            let target_w = ((f64::from(width) * scale).round() as u32).max(1);
            let target_h = ((f64::from(height) * scale).round() as u32).max(1);
            imageops::thumbnail(frame, target_w, target_h)
        };
        Self {
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        self.image
            .write_to(&mut bytes, ImageFormat::Png)
            .context("Failed to encode thumbnail as PNG")?;
        Ok(bytes.into_inner())
    }
}
