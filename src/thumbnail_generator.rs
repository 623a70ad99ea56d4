use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::ThumbnailConfig;
use crate::thumbnail_types::{
    ResizeFilter, ThumbnailError, ThumbnailResult, DEFAULT_JPEG_QUALITY,
    DEFAULT_THUMBNAIL_HEIGHT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailDimensions {
    pub width: u32,
    pub height: u32,
}

/// Produces fixed-height, aspect-preserving copies of uploaded images.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    height: u32,
    filter: ResizeFilter,
    jpeg_quality: u8,
}

impl Default for ThumbnailGenerator {
    fn default() -> Self {
        Self {
            height: DEFAULT_THUMBNAIL_HEIGHT,
            filter: ResizeFilter::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ThumbnailGenerator {
    pub fn new(config: &ThumbnailConfig) -> Self {
        Self {
            height: config.height,
            filter: ResizeFilter::resolve(&config.filter),
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// Writes a thumbnail of `source` to `destination` at the configured height.
    pub fn generate(
        &self,
        source: &Path,
        destination: &Path,
    ) -> ThumbnailResult<ThumbnailDimensions> {
        self.generate_with_height(source, destination, self.height)
    }

    pub fn generate_with_height(
        &self,
        source: &Path,
        destination: &Path,
        height: u32,
    ) -> ThumbnailResult<ThumbnailDimensions> {
        let reader = ImageReader::open(source)?.with_guessed_format()?;
        let format = reader.format();
        let img = reader.decode()?;

        let (source_width, source_height) = img.dimensions();
        let width = scaled_width(source_width, source_height, height)?;

        let thumbnail = img.resize_exact(width, height, self.filter.filter_type());
        self.encode(thumbnail, format, destination)?;

        debug!(
            "Thumbnail {}x{} -> {}x{} written to {}",
            source_width,
            source_height,
            width,
            height,
            destination.display()
        );

        Ok(ThumbnailDimensions { width, height })
    }

    fn encode(
        &self,
        img: DynamicImage,
        format: Option<ImageFormat>,
        destination: &Path,
    ) -> ThumbnailResult<()> {
        match format {
            Some(ImageFormat::Jpeg) => {
                let mut writer = BufWriter::new(File::create(destination)?);
                let encoder = JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality);
                // JPEG has no alpha channel
                let img = if img.color().has_alpha() {
                    DynamicImage::ImageRgb8(img.to_rgb8())
                } else {
                    img
                };
                img.write_with_encoder(encoder)?;
                writer.flush()?;
            }
            Some(format) => img.save_with_format(destination, format)?,
            None => img.save(destination)?,
        }
        Ok(())
    }
}

/// Width that keeps the aspect ratio at `target_height`, rounded to the nearest pixel.
pub fn scaled_width(
    source_width: u32,
    source_height: u32,
    target_height: u32,
) -> ThumbnailResult<u32> {
    if source_height == 0 {
        return Err(ThumbnailError::EmptyImage);
    }
    let width = (source_width as f64 * target_height as f64 / source_height as f64).round();
    Ok((width as u32).max(1))
}
