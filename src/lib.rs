pub mod category;
pub mod config;
pub mod db;
pub mod db_pool;
pub mod db_schema;
pub mod db_types;
pub mod filename_timestamp;
pub mod handlers_admin;
pub mod handlers_gallery;
pub mod handlers_health;
pub mod handlers_static;
pub mod handlers_uploads;
pub mod ingest;
pub mod maintenance;
pub mod metadata_extractor;
pub mod mimetype_detector;
pub mod routes;
pub mod sanitize;
pub mod storage;
pub mod thumbnail_generator;
pub mod thumbnail_types;
pub mod warp_helpers;
