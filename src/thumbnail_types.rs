use image::imageops::FilterType;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_THUMBNAIL_HEIGHT: u32 = 500;
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Resampling filters selectable from configuration, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeFilter {
    Lanczos3,
    CatmullRom,
    Gaussian,
    Triangle,
    Nearest,
}

impl ResizeFilter {
    /// Used when the configured filter is not recognised.
    pub const FALLBACK: ResizeFilter = ResizeFilter::Triangle;

    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeFilter::Lanczos3 => "lanczos3",
            ResizeFilter::CatmullRom => "catmullrom",
            ResizeFilter::Gaussian => "gaussian",
            ResizeFilter::Triangle => "triangle",
            ResizeFilter::Nearest => "nearest",
        }
    }

    pub fn filter_type(self) -> FilterType {
        match self {
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::Nearest => FilterType::Nearest,
        }
    }

    /// Resolves a configured filter name, degrading to [`Self::FALLBACK`].
    pub fn resolve(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::warn!(
                "Resampling filter '{}' not available, falling back to {}",
                name,
                Self::FALLBACK
            );
            Self::FALLBACK
        })
    }
}

impl Default for ResizeFilter {
    fn default() -> Self {
        ResizeFilter::Lanczos3
    }
}

impl FromStr for ResizeFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lanczos3" | "lanczos" => Ok(ResizeFilter::Lanczos3),
            "catmullrom" | "bicubic" => Ok(ResizeFilter::CatmullRom),
            "gaussian" => Ok(ResizeFilter::Gaussian),
            "triangle" | "bilinear" => Ok(ResizeFilter::Triangle),
            "nearest" => Ok(ResizeFilter::Nearest),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Image has zero height")]
    EmptyImage,
}

pub type ThumbnailResult<T> = Result<T, ThumbnailError>;
