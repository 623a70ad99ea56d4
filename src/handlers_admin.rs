use bytes::BufMut;
use futures_util::TryStreamExt;
use warp::http::{StatusCode, Uri};
use warp::multipart::{FormData, Part};
use warp::{reject, Filter, Rejection, Reply};

use crate::db::{AdminPhotoView, DbPool, Photo};
use crate::db_types::{DeleteResponse, FailureResponse, ToggleResponse};
use crate::ingest::{Ingestor, UploadedFile};
use crate::storage::StorageLayout;
use crate::warp_helpers::{
    database_rejection, with_db, with_ingestor, with_layout, NotFoundError, ValidationError,
};

const UPLOAD_FIELD: &str = "photos";

/// Reads every `photos` part of the form into memory. Other fields are ignored.
async fn collect_uploads(form: FormData) -> Result<Vec<UploadedFile>, warp::Error> {
    let parts: Vec<Option<UploadedFile>> = form
        .and_then(|mut part: Part| async move {
            if part.name() != UPLOAD_FIELD {
                return Ok::<_, warp::Error>(None);
            }
            let filename = part.filename().unwrap_or_default().to_string();
            let mut bytes: Vec<u8> = Vec::new();
            while let Some(content) = part.data().await {
                bytes.put(content?);
            }
            Ok(Some(UploadedFile { filename, bytes }))
        })
        .try_collect()
        .await?;

    Ok(parts.into_iter().flatten().collect())
}

pub fn admin_uri(admin_path: &str) -> Result<Uri, Rejection> {
    format!("/{}", admin_path).parse::<Uri>().map_err(|e| {
        reject::custom(ValidationError {
            message: format!("Invalid admin path: {}", e),
        })
    })
}

pub async fn upload_photos(
    form: FormData,
    ingestor: Ingestor,
    db_pool: DbPool,
    admin_path: String,
) -> Result<impl Reply, Rejection> {
    let redirect_to = admin_uri(&admin_path)?;

    match collect_uploads(form).await {
        Ok(files) if files.is_empty() => log::warn!("Upload request without any photos"),
        Ok(files) => {
            ingestor.ingest(&db_pool, &files).await;
        }
        Err(e) => log::error!("Failed to read upload form: {}", e),
    }

    Ok(warp::redirect::see_other(redirect_to))
}

/// Answers upload requests whose body is not a readable multipart form.
pub async fn redirect_to_admin(admin_path: String) -> Result<impl Reply, Rejection> {
    log::warn!("Upload request without a multipart body");
    Ok(warp::redirect::see_other(admin_uri(&admin_path)?))
}

pub async fn list_admin_photos(db_pool: DbPool) -> Result<impl Reply, Rejection> {
    let photos = Photo::list_all(&db_pool)
        .await
        .map_err(database_rejection)?;
    let views: Vec<AdminPhotoView> = photos.iter().map(AdminPhotoView::from).collect();
    Ok(warp::reply::json(&views))
}

fn failure(e: sqlx::Error) -> Box<dyn Reply> {
    log::error!("Database error: {}", e);
    Box::new(warp::reply::with_status(
        warp::reply::json(&FailureResponse::new(e.to_string())),
        StatusCode::INTERNAL_SERVER_ERROR,
    ))
}

/// Deletes the record first; files that cannot be removed afterwards are reported, not rolled back.
pub async fn delete_photo(
    id: i64,
    db_pool: DbPool,
    layout: StorageLayout,
) -> Result<Box<dyn Reply>, Rejection> {
    match Photo::delete(&db_pool, id).await {
        Ok(Some(removed)) => {
            let file_errors = layout.remove_photo_files(
                &removed.stored_filename_original,
                &removed.stored_filename_thumbnail,
            );
            log::info!("Deleted photo {}", id);
            Ok(Box::new(warp::reply::json(&DeleteResponse {
                success: true,
                file_errors,
            })))
        }
        Ok(None) => Err(reject::custom(NotFoundError::photo())),
        Err(e) => Ok(failure(e)),
    }
}

pub async fn toggle_visibility(id: i64, db_pool: DbPool) -> Result<Box<dyn Reply>, Rejection> {
    match Photo::toggle_visibility(&db_pool, id).await {
        Ok(Some(is_visible)) => Ok(Box::new(warp::reply::json(&ToggleResponse {
            success: true,
            is_visible,
        }))),
        Ok(None) => Err(reject::custom(NotFoundError::photo())),
        Err(e) => Ok(failure(e)),
    }
}

pub fn build_admin_routes(
    db_pool: DbPool,
    ingestor: Ingestor,
    admin_path: String,
    max_upload_bytes: u64,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let layout = ingestor.layout().clone();
    let fallback_admin_path = admin_path.clone();

    let upload = warp::path("admin")
        .and(warp::path("upload"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::multipart::form().max_length(max_upload_bytes))
        .and(with_ingestor(ingestor))
        .and(with_db(db_pool.clone()))
        .and(warp::any().map(move || admin_path.clone()))
        .and_then(upload_photos);

    let upload_fallback = warp::path("admin")
        .and(warp::path("upload"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::any().map(move || fallback_admin_path.clone()))
        .and_then(redirect_to_admin);

    let list = warp::path("admin")
        .and(warp::path("api"))
        .and(warp::path("images"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_db(db_pool.clone()))
        .and_then(list_admin_photos);

    let delete = warp::path("admin")
        .and(warp::path("api"))
        .and(warp::path("images"))
        .and(warp::path::param::<i64>())
        .and(warp::path("delete"))
        .and(warp::path::end())
        .and(warp::post().or(warp::delete()).unify())
        .and(with_db(db_pool.clone()))
        .and(with_layout(layout))
        .and_then(delete_photo);

    let toggle = warp::path("admin")
        .and(warp::path("api"))
        .and(warp::path("images"))
        .and(warp::path::param::<i64>())
        .and(warp::path("toggle_visibility"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_db(db_pool))
        .and_then(toggle_visibility);

    upload.or(upload_fallback).or(list).or(delete).or(toggle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::db::{create_in_memory_pool, NewPhoto};
    use chrono::Utc;

    async fn seeded(dir: &tempfile::TempDir) -> (DbPool, StorageLayout, i64) {
        let layout = StorageLayout::new(dir.path().join("o"), dir.path().join("t"));
        layout.ensure_dirs().unwrap();
        std::fs::write(layout.original_path("a.png"), b"a").unwrap();
        std::fs::write(layout.thumbnail_path("thumb_a.png"), b"a").unwrap();

        let pool = create_in_memory_pool().await.unwrap();
        let now = Utc::now().naive_utc();
        Photo::insert_batch(
            &pool,
            &[NewPhoto {
                original_filename: "a.png".to_string(),
                stored_filename_original: "a.png".to_string(),
                stored_filename_thumbnail: "thumb_a.png".to_string(),
                timestamp: now,
                uploaded_at: now,
                category: Category::Game,
                sort_key_numeric: None,
            }],
        )
        .await
        .unwrap();
        let id = Photo::list_all(&pool).await.unwrap()[0].id;
        (pool, layout, id)
    }

    #[test]
    fn test_admin_uri() {
        assert_eq!(
            admin_uri("super-admin-panel").unwrap().path(),
            "/super-admin-panel"
        );
    }

    #[tokio::test]
    async fn test_delete_removes_files_then_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (pool, layout, id) = seeded(&dir).await;

        let reply = delete_photo(id, pool.clone(), layout.clone()).await.unwrap();
        assert_eq!(reply.into_response().status(), StatusCode::OK);
        assert!(!layout.original_path("a.png").exists());
        assert!(!layout.thumbnail_path("thumb_a.png").exists());

        let second = delete_photo(id, pool, layout).await;
        assert!(second.is_err());
        assert!(second
            .err()
            .and_then(|r| r.find::<NotFoundError>().map(|e| e.message))
            .is_some());
    }

    #[tokio::test]
    async fn test_toggle_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (pool, _layout, id) = seeded(&dir).await;

        let reply = toggle_visibility(id, pool.clone()).await.unwrap();
        assert_eq!(reply.into_response().status(), StatusCode::OK);
        assert!(!Photo::find_by_id(&pool, id).await.unwrap().unwrap().is_visible);
        assert!(toggle_visibility(id + 1, pool).await.is_err());
    }

    #[tokio::test]
    async fn test_database_failure_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let (pool, layout, id) = seeded(&dir).await;
        pool.close().await;

        let reply = delete_photo(id, pool.clone(), layout).await.unwrap();
        assert_eq!(
            reply.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let reply = toggle_visibility(id, pool).await.unwrap();
        assert_eq!(
            reply.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
