use warp::{Filter, Rejection, Reply};

use crate::db::{DbPool, GalleryQuery, Photo, PublicPhotoView};
use crate::warp_helpers::{database_rejection, with_db};

/// Visible photos of one category, in that category's display order.
pub async fn list_public_photos(
    query: GalleryQuery,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let photos = Photo::list_visible(&db_pool, query.category())
        .await
        .map_err(database_rejection)?;
    let views: Vec<PublicPhotoView> = photos.iter().map(PublicPhotoView::from).collect();
    Ok(warp::reply::json(&views))
}

pub fn build_gallery_routes(
    db_pool: DbPool,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path("api")
        .and(warp::path("photos"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<GalleryQuery>())
        .and(with_db(db_pool))
        .and_then(list_public_photos)
}
