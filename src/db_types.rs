use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::db::Photo;
use crate::storage::Folder;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const UNKNOWN_TIME: &str = "未知时间";

pub fn format_timestamp(timestamp: Option<NaiveDateTime>) -> String {
    timestamp
        .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}

// Gallery related structs
#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    pub category: Option<String>,
}

impl GalleryQuery {
    pub fn category(&self) -> &str {
        match self.category.as_deref() {
            Some(category) if !category.is_empty() => category,
            _ => Category::default().as_str(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PublicPhotoView {
    pub id: i64,
    pub original_url: String,
    pub thumbnail_url: String,
    pub timestamp: String,
    pub category: String,
}

impl From<&Photo> for PublicPhotoView {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id,
            original_url: Folder::Originals.url_for(&photo.stored_filename_original),
            thumbnail_url: Folder::Thumbnails.url_for(&photo.stored_filename_thumbnail),
            timestamp: format_timestamp(photo.timestamp),
            category: photo.category.clone(),
        }
    }
}

// Admin related structs
#[derive(Debug, Serialize, PartialEq)]
pub struct AdminPhotoView {
    pub id: i64,
    pub original_filename: String,
    pub thumbnail_url: String,
    pub timestamp: String,
    pub uploaded_at: String,
    pub is_visible: bool,
    pub category: String,
}

impl From<&Photo> for AdminPhotoView {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id,
            original_filename: photo.original_filename.clone(),
            thumbnail_url: Folder::Thumbnails.url_for(&photo.stored_filename_thumbnail),
            timestamp: format_timestamp(photo.timestamp),
            uploaded_at: format_timestamp(Some(photo.uploaded_at)),
            is_visible: photo.is_visible,
            category: photo.category.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub is_visible: bool,
}

#[derive(Debug, Serialize)]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
}

impl FailureResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
