use std::path::Path;

use anyhow::{ensure, Context};
use image::{DynamicImage, GenericImageView, RgbaImage};
use log::debug;

use crate::walls::Color;

/// A maze bitmap together with the size it is displayed at.
///
/// Agent coordinates live in display space, the scale factors map them onto
/// image pixels. The snapshot is never modified once created.
#[derive(Debug, Clone)]
pub struct MazeSnapshot {
    image: RgbaImage,
    display_width: f64,
    display_height: f64,
    scale_x: f64,
    scale_y: f64,
}

impl MazeSnapshot {
    pub fn new(image: RgbaImage, display_width: f64, display_height: f64) -> anyhow::Result<Self> {
        ensure!(
            image.width() > 0 && image.height() > 0,
            "maze image is empty ({}x{})",
            image.width(),
            image.height()
        );
        ensure!(
            display_width > 0.0 && display_height > 0.0,
            "invalid display size {}x{}",
            display_width,
            display_height
        );

        let scale_x = image.width() as f64 / display_width;
        let scale_y = image.height() as f64 / display_height;

        Ok(Self {
            image,
            display_width,
            display_height,
            scale_x,
            scale_y,
        })
    }

    pub fn from_image(
        img: &DynamicImage,
        display_width: f64,
        display_height: f64,
    ) -> anyhow::Result<Self> {
        Self::new(img.to_rgba8(), display_width, display_height)
    }

    /// Load and decode the maze image, failing if it is missing or unreadable
    pub fn open(
        path: impl AsRef<Path>,
        display_width: f64,
        display_height: f64,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("failed to load maze image {}", path.display()))?;
        debug!(
            "loaded maze image {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        Self::from_image(&img, display_width, display_height)
            .with_context(|| format!("unusable maze image {}", path.display()))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn display_size(&self) -> (f64, f64) {
        (self.display_width, self.display_height)
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    /// Pixel indices for a display space position, or None if it falls outside the image
    pub fn to_pixel(&self, x: f64, y: f64) -> Option<(u32, u32)> {
        // truncates toward zero, small negative offsets still land on pixel 0
        let px = (x * self.scale_x) as i64;
        let py = (y * self.scale_y) as i64;

        if px < 0 || py < 0 || px >= self.width() as i64 || py >= self.height() as i64 {
            return None;
        }
        Some((px as u32, py as u32))
    }

    /// Read the color at a pixel
    pub fn pixel(&self, px: u32, py: u32) -> Option<Color> {
        if px >= self.width() || py >= self.height() {
            return None;
        }
        Some((*self.image.get_pixel(px, py)).into())
    }
}
