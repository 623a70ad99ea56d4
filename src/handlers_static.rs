use std::convert::Infallible;
use warp::Filter;

const INDEX_HTML: &str = include_str!("../static/index.html");
const ADMIN_HTML: &str = include_str!("../static/admin.html");

pub fn build_static_routes(
    admin_path: String,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let index_route = warp::path::end()
        .and(warp::get())
        .and_then(|| async { Ok::<_, Infallible>(warp::reply::html(INDEX_HTML)) });

    let admin_route = warp::path(admin_path)
        .and(warp::path::end())
        .and(warp::get())
        .and_then(|| async { Ok::<_, Infallible>(warp::reply::html(ADMIN_HTML)) });

    index_route.or(admin_route)
}
