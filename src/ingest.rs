use chrono::{NaiveDateTime, Utc};
use log::{info, warn};
use std::io;

use crate::category::classify;
use crate::db::{DbPool, NewPhoto, Photo};
use crate::filename_timestamp::parse_filename_timestamp;
use crate::metadata_extractor::MetadataExtractor;
use crate::sanitize::{allowed_extension, extension_of, secure_filename};
use crate::storage::{remove_if_exists, StorageLayout, StoredNames};
use crate::thumbnail_generator::ThumbnailGenerator;
use crate::thumbnail_types::ThumbnailError;

/// One file part of an upload request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Empty filename")]
    EmptyFilename,
    #[error("File type not allowed: {0}")]
    DisallowedType(String),
    #[error("Failed to save {filename}: {source}")]
    Io {
        filename: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to generate thumbnail for {filename}: {source}")]
    Thumbnail {
        filename: String,
        #[source]
        source: ThumbnailError,
    },
    #[error("Database commit failed: {0}")]
    Commit(#[from] sqlx::Error),
}

/// Outcome of one upload request.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub uploaded: usize,
    pub errors: Vec<IngestError>,
}

impl IngestReport {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Turns uploaded files into stored originals, thumbnails and photo records.
#[derive(Debug, Clone)]
pub struct Ingestor {
    layout: StorageLayout,
    thumbnails: ThumbnailGenerator,
}

impl Ingestor {
    pub fn new(layout: StorageLayout, thumbnails: ThumbnailGenerator) -> Self {
        Self { layout, thumbnails }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Processes every file, then commits all staged records at once.
    /// A failed file never stops the rest of the batch.
    pub async fn ingest(&self, pool: &DbPool, files: &[UploadedFile]) -> IngestReport {
        let mut staged = Vec::new();
        let mut report = IngestReport::default();

        for file in files {
            match self.stage(file, Utc::now().naive_utc()) {
                Ok(photo) => staged.push(photo),
                Err(e) => {
                    warn!("Skipping upload {:?}: {}", file.filename, e);
                    report.errors.push(e);
                }
            }
        }

        if !staged.is_empty() {
            match Photo::insert_batch(pool, &staged).await {
                Ok(()) => report.uploaded = staged.len(),
                Err(e) => {
                    log::error!("Failed to commit {} uploads: {}", staged.len(), e);
                    for photo in &staged {
                        self.layout.remove_photo_files(
                            &photo.stored_filename_original,
                            &photo.stored_filename_thumbnail,
                        );
                    }
                    report.errors.push(IngestError::Commit(e));
                }
            }
        }

        info!(
            "Uploaded: {}, Errors: {}",
            report.uploaded,
            report.errors.len()
        );
        for message in report.error_messages() {
            info!("  {}", message);
        }

        report
    }

    /// Writes the original and its thumbnail and returns the record to commit.
    /// On failure nothing written for this file is left behind.
    pub fn stage(
        &self,
        file: &UploadedFile,
        uploaded_at: NaiveDateTime,
    ) -> Result<NewPhoto, IngestError> {
        let raw = file.filename.as_str();
        if raw.is_empty() {
            return Err(IngestError::EmptyFilename);
        }
        let validated_ext =
            allowed_extension(raw).ok_or_else(|| IngestError::DisallowedType(raw.to_string()))?;

        let display_name = secure_filename(raw);
        let extension = extension_of(&display_name).unwrap_or(validated_ext);
        let names = StoredNames::generate(&extension);
        let display_name = if display_name.is_empty() {
            names.original.clone()
        } else {
            display_name
        };

        let original_path = self.layout.original_path(&names.original);
        if let Err(source) = std::fs::write(&original_path, &file.bytes) {
            if let Err(e) = remove_if_exists(&original_path) {
                warn!("Failed to clean up {}: {}", original_path.display(), e);
            }
            return Err(IngestError::Io {
                filename: raw.to_string(),
                source,
            });
        }

        let classification = classify(raw);
        let timestamp = classification
            .category
            .display_timestamp(
                parse_filename_timestamp(raw),
                MetadataExtractor::resolve_capture_time(&original_path),
            )
            .unwrap_or(uploaded_at);

        let thumbnail_path = self.layout.thumbnail_path(&names.thumbnail);
        if let Err(source) = self.thumbnails.generate(&original_path, &thumbnail_path) {
            for path in [&original_path, &thumbnail_path] {
                if let Err(e) = remove_if_exists(path) {
                    warn!("Failed to clean up {}: {}", path.display(), e);
                }
            }
            return Err(IngestError::Thumbnail {
                filename: raw.to_string(),
                source,
            });
        }

        Ok(NewPhoto {
            original_filename: display_name,
            stored_filename_original: names.original,
            stored_filename_thumbnail: names.thumbnail,
            timestamp,
            uploaded_at,
            category: classification.category,
            sort_key_numeric: classification.sort_key,
        })
    }
}
