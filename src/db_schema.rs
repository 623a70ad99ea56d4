use crate::db_pool::DbPool;

// Schema definitions
pub const PHOTOS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS photos (
    -- Core identification
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    original_filename TEXT NOT NULL,
    stored_filename_original TEXT NOT NULL UNIQUE,
    stored_filename_thumbnail TEXT NOT NULL UNIQUE,

    -- Display and sorting
    timestamp DATETIME,
    uploaded_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    category TEXT NOT NULL DEFAULT '游戏',
    sort_key_numeric INTEGER,

    -- UI state
    is_visible BOOLEAN NOT NULL DEFAULT TRUE,

    CHECK (sort_key_numeric IS NULL OR category = '活动')
);
"#;

pub const SCHEMA_SQL: &[&str] = &[
    PHOTOS_TABLE,
    "CREATE INDEX IF NOT EXISTS idx_photos_category_visible ON photos(category, is_visible);",
    "CREATE INDEX IF NOT EXISTS idx_photos_uploaded_at ON photos(uploaded_at);",
    "CREATE INDEX IF NOT EXISTS idx_photos_timestamp ON photos(timestamp);",
];

pub async fn initialize_schema(pool: &DbPool) -> Result<(), sqlx::Error> {
    for sql in SCHEMA_SQL {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}
