use std::env;
use std::path::PathBuf;

const BYTES_PER_MB: u64 = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub originals_path: PathBuf,
    pub thumbnails_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    pub height: u32,
    pub filter: String,
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub data_path: PathBuf,
    pub db_path: PathBuf,
    pub storage: StorageConfig,
    pub thumbnail: ThumbnailConfig,
    pub max_upload_mb: u64,
    pub max_connections: u32,
    pub admin_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_path = PathBuf::from(
            var("PHOTO_WALL_DATA_PATH").unwrap_or_else(|| "./data".to_string()),
        );

        let admin_path = var("PHOTO_WALL_ADMIN_PATH")
            .unwrap_or_else(|| "super-admin-panel".to_string())
            .trim_matches('/')
            .to_string();
        if admin_path.is_empty() || admin_path.contains('/') {
            return Err(format!(
                "PHOTO_WALL_ADMIN_PATH must be a single non-empty path segment, got '{}'",
                admin_path
            )
            .into());
        }

        let jpeg_quality: u8 = var("PHOTO_WALL_JPEG_QUALITY")
            .unwrap_or_else(|| "90".to_string())
            .parse()?;
        if !(1..=100).contains(&jpeg_quality) {
            return Err(format!("PHOTO_WALL_JPEG_QUALITY out of range: {}", jpeg_quality).into());
        }

        let max_upload_mb: u64 = var("PHOTO_WALL_MAX_UPLOAD_MB")
            .unwrap_or_else(|| "256".to_string())
            .parse()?;
        if max_upload_mb.checked_mul(BYTES_PER_MB).is_none() {
            return Err(format!("PHOTO_WALL_MAX_UPLOAD_MB too large: {}", max_upload_mb).into());
        }

        let thumbnail_height: u32 = var("PHOTO_WALL_THUMBNAIL_HEIGHT")
            .unwrap_or_else(|| "500".to_string())
            .parse()?;
        if thumbnail_height == 0 {
            return Err("PHOTO_WALL_THUMBNAIL_HEIGHT must be positive".into());
        }

        Ok(Config {
            port: var("PHOTO_WALL_PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse()?,
            host: var("PHOTO_WALL_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            db_path: var("PHOTO_WALL_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_path.join("database.db")),
            storage: StorageConfig {
                originals_path: var("PHOTO_WALL_ORIGINALS_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| data_path.join("uploads").join("originals")),
                thumbnails_path: var("PHOTO_WALL_THUMBNAILS_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| data_path.join("uploads").join("thumbnails")),
            },
            thumbnail: ThumbnailConfig {
                height: thumbnail_height,
                filter: var("PHOTO_WALL_THUMBNAIL_FILTER")
                    .unwrap_or_else(|| "lanczos3".to_string()),
                jpeg_quality,
            },
            max_upload_mb,
            max_connections: var("PHOTO_WALL_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()?,
            admin_path,
            data_path,
        })
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(BYTES_PER_MB)
    }
}
