use warp::{reject, Filter, Rejection, Reply};

use crate::mimetype_detector;
use crate::storage::{Folder, StorageLayout};
use crate::warp_helpers::{with_layout, NotFoundError};

pub async fn serve_upload(
    folder: String,
    filename: String,
    layout: StorageLayout,
) -> Result<Box<dyn Reply>, Rejection> {
    let folder: Folder = folder
        .parse()
        .map_err(|_| reject::custom(NotFoundError::folder()))?;
    let path = layout
        .resolve(folder, &filename)
        .ok_or_else(|| reject::custom(NotFoundError::file()))?;

    match tokio::fs::read(&path).await {
        Ok(file_data) => {
            let content_type = mimetype_detector::content_type_for(&path);
            let reply = warp::reply::with_header(file_data, "content-type", content_type);
            let reply =
                warp::reply::with_header(reply, "cache-control", "public, max-age=31536000");
            Ok(Box::new(reply))
        }
        Err(_) => Err(reject::custom(NotFoundError::file())),
    }
}

pub fn build_upload_routes(
    layout: StorageLayout,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path("uploads")
        .and(warp::path::param::<String>())
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_layout(layout))
        .and_then(serve_upload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::http::StatusCode;

    fn not_found_message(result: Result<Box<dyn Reply>, Rejection>) -> Option<&'static str> {
        result
            .err()
            .and_then(|r| r.find::<NotFoundError>().map(|e| e.message))
    }

    #[tokio::test]
    async fn test_serves_stored_file_with_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().join("o"), dir.path().join("t"));
        layout.ensure_dirs().unwrap();
        std::fs::write(layout.thumbnail_path("thumb_a.png"), b"png").unwrap();

        let reply = serve_upload("thumbnails".into(), "thumb_a.png".into(), layout)
            .await
            .unwrap();
        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/png");
    }

    #[tokio::test]
    async fn test_unknown_folder_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().join("o"), dir.path().join("t"));
        layout.ensure_dirs().unwrap();

        assert_eq!(
            not_found_message(serve_upload("private".into(), "a.png".into(), layout.clone()).await),
            Some("Folder not found")
        );
        assert_eq!(
            not_found_message(serve_upload("originals".into(), "a.png".into(), layout.clone()).await),
            Some("File not found")
        );
        assert_eq!(
            not_found_message(serve_upload("originals".into(), "..".into(), layout).await),
            Some("File not found")
        );
    }
}
