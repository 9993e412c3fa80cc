use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, ColorType, DynamicImage, ImageError, RgbaImage};
use thiserror::Error;
use tracing::debug;

use crate::types::Bounds;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to write asset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode asset: {0}")]
    Encode(#[from] ImageError),
}

/// Replaces characters that are not allowed in file names with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect()
}

/// Trimmed name with whitespace runs collapsed into `-` (hero image names).
pub fn dashed_name(name: &str) -> String {
    sanitize_filename(&name.split_whitespace().collect::<Vec<_>>().join("-"))
}

/// Crops a layer raster to the part that falls inside `mask`.
///
/// Offsets are relative to the layer's own bounds and clamped to the raster,
/// so a layer hanging off the mask's top-left corner is cropped rather than
/// padded. `None` when the two boxes do not overlap.
pub fn crop_to_mask(raster: &RgbaImage, layer: Bounds, mask: Bounds) -> Option<RgbaImage> {
    let (w, h) = (raster.width() as i64, raster.height() as i64);
    let x1 = (mask.x1 as i64 - layer.x1 as i64).max(0);
    let y1 = (mask.y1 as i64 - layer.y1 as i64).max(0);
    let x2 = (mask.x2 as i64 - layer.x1 as i64).min(w);
    let y2 = (mask.y2 as i64 - layer.y1 as i64).min(h);
    if x2 <= x1 || y2 <= y1 {
        return None;
    }
    Some(
        imageops::crop_imm(
            raster,
            x1 as u32,
            y1 as u32,
            (x2 - x1) as u32,
            (y2 - y1) as u32,
        )
        .to_image(),
    )
}

/// Writes extracted rasters into one document's `images/` directory.
#[derive(Debug, Clone)]
pub struct AssetWriter {
    images_dir: PathBuf,
    jpeg_quality: u8,
}

impl AssetWriter {
    pub fn new(images_dir: impl Into<PathBuf>, jpeg_quality: u8) -> Self {
        Self {
            images_dir: images_dir.into(),
            jpeg_quality,
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Saves `<stem>.png` and returns the file name.
    pub fn save_png(&self, raster: &RgbaImage, stem: &str) -> Result<String, AssetError> {
        let file_name = format!("{stem}.png");
        let path = self.prepare(&file_name)?;
        raster.save(&path)?;
        debug!(path = %path.display(), "saved png asset");
        Ok(file_name)
    }

    /// Flattens to RGB and saves `<stem>.jpg`; returns the file name.
    pub fn save_jpeg(&self, raster: &RgbaImage, stem: &str) -> Result<String, AssetError> {
        let file_name = format!("{stem}.jpg");
        let path = self.prepare(&file_name)?;
        let rgb = DynamicImage::ImageRgba8(raster.clone()).to_rgb8();
        let mut writer = BufWriter::new(File::create(&path)?);
        JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality).encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ColorType::Rgb8,
        )?;
        writer.flush()?;
        debug!(path = %path.display(), quality = self.jpeg_quality, "saved jpeg asset");
        Ok(file_name)
    }

    fn prepare(&self, file_name: &str) -> Result<PathBuf, AssetError> {
        fs::create_dir_all(&self.images_dir)?;
        Ok(self.images_dir.join(file_name))
    }
}
