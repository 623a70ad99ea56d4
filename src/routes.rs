use std::convert::Infallible;
use warp::Filter;

use crate::db::DbPool;
use crate::handlers_admin::build_admin_routes;
use crate::handlers_gallery::build_gallery_routes;
use crate::handlers_health::build_health_routes;
use crate::handlers_static::build_static_routes;
use crate::handlers_uploads::build_upload_routes;
use crate::ingest::Ingestor;
use crate::warp_helpers::{cors, handle_rejection};

/// Every route of the server, with CORS, request logging and JSON error replies.
pub fn build_routes(
    db_pool: DbPool,
    ingestor: Ingestor,
    admin_path: &str,
    max_upload_bytes: u64,
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    let layout = ingestor.layout().clone();

    let health_routes = build_health_routes(db_pool.clone());
    let gallery_routes = build_gallery_routes(db_pool.clone());
    let admin_routes = build_admin_routes(
        db_pool,
        ingestor,
        admin_path.to_string(),
        max_upload_bytes,
    );
    let upload_routes = build_upload_routes(layout);
    let static_routes = build_static_routes(admin_path.to_string());

    health_routes
        .or(gallery_routes)
        .or(admin_routes)
        .or(upload_routes)
        .or(static_routes)
        .with(cors())
        .with(warp::log("photo_wall"))
        .recover(handle_rejection)
}
