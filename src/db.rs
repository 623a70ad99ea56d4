use chrono::NaiveDateTime;
use serde::Serialize;

use crate::category::Category;

pub use crate::db_pool::{create_db_pool, create_in_memory_pool, DbPool};
pub use crate::db_types::{AdminPhotoView, GalleryQuery, PublicPhotoView};

const SELECT_PHOTO: &str = "SELECT id, original_filename, stored_filename_original, \
     stored_filename_thumbnail, timestamp, uploaded_at, is_visible, category, sort_key_numeric \
     FROM photos";

const GAME_ORDER: &str =
    "ORDER BY timestamp IS NULL, timestamp DESC, uploaded_at DESC, id DESC";
const EVENT_ORDER: &str =
    "ORDER BY sort_key_numeric IS NULL, sort_key_numeric ASC, uploaded_at DESC, id DESC";
const UPLOAD_ORDER: &str = "ORDER BY uploaded_at DESC, id DESC";

/// Persisted photo record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Photo {
    pub id: i64,
    /// Sanitized name shown to the admin
    pub original_filename: String,
    pub stored_filename_original: String,
    pub stored_filename_thumbnail: String,
    /// Display timestamp
    pub timestamp: Option<NaiveDateTime>,
    pub uploaded_at: NaiveDateTime,
    pub is_visible: bool,
    pub category: String,
    pub sort_key_numeric: Option<i64>,
}

/// A photo whose files are on disk and which is waiting for the batch commit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPhoto {
    pub original_filename: String,
    pub stored_filename_original: String,
    pub stored_filename_thumbnail: String,
    pub timestamp: NaiveDateTime,
    pub uploaded_at: NaiveDateTime,
    pub category: Category,
    pub sort_key_numeric: Option<i64>,
}

/// Stored file names returned by a delete.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RemovedPhoto {
    pub stored_filename_original: String,
    pub stored_filename_thumbnail: String,
}

impl Photo {
    /// Inserts all staged photos in a single transaction. Nothing is
    /// persisted if any insert or the commit fails.
    pub async fn insert_batch(pool: &DbPool, photos: &[NewPhoto]) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        for photo in photos {
            sqlx::query(
                r#"
                INSERT INTO photos (
                    original_filename, stored_filename_original, stored_filename_thumbnail,
                    timestamp, uploaded_at, is_visible, category, sort_key_numeric
                ) VALUES (?1, ?2, ?3, ?4, ?5, TRUE, ?6, ?7)
                "#,
            )
            .bind(&photo.original_filename)
            .bind(&photo.stored_filename_original)
            .bind(&photo.stored_filename_thumbnail)
            .bind(photo.timestamp)
            .bind(photo.uploaded_at)
            .bind(photo.category.as_str())
            .bind(photo.sort_key_numeric)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Photo>, sqlx::Error> {
        sqlx::query_as::<_, Photo>(&format!("{} WHERE id = ?", SELECT_PHOTO))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every record, newest upload first.
    pub async fn list_all(pool: &DbPool) -> Result<Vec<Photo>, sqlx::Error> {
        sqlx::query_as::<_, Photo>(&format!("{} {}", SELECT_PHOTO, UPLOAD_ORDER))
            .fetch_all(pool)
            .await
    }

    /// Visible records of one category in that category's display order.
    pub async fn list_visible(pool: &DbPool, category: &str) -> Result<Vec<Photo>, sqlx::Error> {
        let order = match category.parse::<Category>() {
            Ok(Category::Game) => GAME_ORDER,
            Ok(Category::Event) => EVENT_ORDER,
            Err(_) => UPLOAD_ORDER,
        };

        sqlx::query_as::<_, Photo>(&format!(
            "{} WHERE is_visible = TRUE AND category = ? {}",
            SELECT_PHOTO, order
        ))
        .bind(category)
        .fetch_all(pool)
        .await
    }

    /// Flips visibility and returns the new state, or `None` for an unknown id.
    pub async fn toggle_visibility(pool: &DbPool, id: i64) -> Result<Option<bool>, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "UPDATE photos SET is_visible = NOT is_visible WHERE id = ? RETURNING is_visible",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes the row and hands back its file names so the caller can remove them.
    pub async fn delete(pool: &DbPool, id: i64) -> Result<Option<RemovedPhoto>, sqlx::Error> {
        sqlx::query_as::<_, RemovedPhoto>(
            "DELETE FROM photos WHERE id = ? \
             RETURNING stored_filename_original, stored_filename_thumbnail",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete_all(pool: &DbPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM photos").execute(pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM photos")
            .fetch_one(pool)
            .await
    }
}
