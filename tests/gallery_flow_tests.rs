use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

use photo_wall::category::Category;
use photo_wall::db::{create_in_memory_pool, Photo, PublicPhotoView};
use photo_wall::ingest::{Ingestor, UploadedFile};
use photo_wall::storage::StorageLayout;
use photo_wall::thumbnail_generator::ThumbnailGenerator;

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(width, height, Rgb([40, 80, 120]))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn setup(dir: &tempfile::TempDir) -> Ingestor {
    let layout = StorageLayout::new(
        dir.path().join("uploads/originals"),
        dir.path().join("uploads/thumbnails"),
    );
    layout.ensure_dirs().unwrap();
    Ingestor::new(layout, ThumbnailGenerator::default())
}

#[tokio::test]
async fn test_upload_list_toggle_delete() {
    let dir = tempfile::tempdir().unwrap();
    let ingestor = setup(&dir);
    let pool = create_in_memory_pool().await.unwrap();

    let report = ingestor
        .ingest(
            &pool,
            &[
                UploadedFile::new("屏幕截图 2023-05-01 153045.png", png(32, 18)),
                UploadedFile::new("屏幕截图 2024-01-09 080000.png", png(32, 18)),
                UploadedFile::new("Sky3.png", png(10, 10)),
                UploadedFile::new("Sky1.png", png(10, 10)),
                UploadedFile::new("evil.exe", b"MZ".to_vec()),
            ],
        )
        .await;
    assert_eq!(report.uploaded, 4);
    assert_eq!(report.errors.len(), 1);

    let games = Photo::list_visible(&pool, Category::Game.as_str())
        .await
        .unwrap();
    let timestamps: Vec<String> = games
        .iter()
        .map(|p| PublicPhotoView::from(p).timestamp)
        .collect();
    assert_eq!(timestamps, vec!["2024-01-09 08:00:00", "2023-05-01 15:30:45"]);

    let events = Photo::list_visible(&pool, Category::Event.as_str())
        .await
        .unwrap();
    let keys: Vec<Option<i64>> = events.iter().map(|p| p.sort_key_numeric).collect();
    assert_eq!(keys, vec![Some(1), Some(3)]);

    // hidden photos disappear from the public listing only
    let hidden = games[0].id;
    assert_eq!(
        Photo::toggle_visibility(&pool, hidden).await.unwrap(),
        Some(false)
    );
    assert_eq!(
        Photo::list_visible(&pool, Category::Game.as_str())
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(Photo::list_all(&pool).await.unwrap().len(), 4);
    assert_eq!(
        Photo::toggle_visibility(&pool, hidden).await.unwrap(),
        Some(true)
    );

    // delete removes the record and both files
    let target = &events[0];
    let removed = Photo::delete(&pool, target.id).await.unwrap().unwrap();
    let errors = ingestor.layout().remove_photo_files(
        &removed.stored_filename_original,
        &removed.stored_filename_thumbnail,
    );
    assert!(errors.is_empty());
    assert!(!ingestor
        .layout()
        .original_path(&target.stored_filename_original)
        .exists());
    assert!(!ingestor
        .layout()
        .thumbnail_path(&target.stored_filename_thumbnail)
        .exists());
    assert!(Photo::find_by_id(&pool, target.id).await.unwrap().is_none());
    assert!(Photo::delete(&pool, target.id).await.unwrap().is_none());
}
