use chrono::NaiveDate;
use photo_wall::category::{classify, Category};
use photo_wall::filename_timestamp::parse_filename_timestamp;
use photo_wall::thumbnail_generator::scaled_width;

#[test]
fn test_screenshot_filename_timestamp() {
    assert_eq!(
        parse_filename_timestamp("屏幕截图 2023-05-01 153045.png"),
        NaiveDate::from_ymd_opt(2023, 5, 1)
            .unwrap()
            .and_hms_opt(15, 30, 45)
    );
    assert_eq!(parse_filename_timestamp("屏幕截图 2023-13-01 153045.png"), None);
}

#[test]
fn test_compact_filename_timestamp() {
    assert_eq!(
        parse_filename_timestamp("IMG_20240229_235959.jpg"),
        NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(23, 59, 59)
    );
    assert_eq!(parse_filename_timestamp("IMG_20230229_120000.jpg"), None);
    assert_eq!(parse_filename_timestamp("holiday.png"), None);
}

#[test]
fn test_classification_examples() {
    let sky = classify("Sky042.png");
    assert_eq!(sky.category, Category::Event);
    assert_eq!(sky.sort_key, Some(42));

    for name in ["sky042.png", "Sky042.jpg", "SkyLine.png", "屏幕截图 2023-05-01 153045.png"] {
        let other = classify(name);
        assert_eq!(other.category, Category::Game, "{}", name);
        assert_eq!(other.sort_key, None, "{}", name);
    }
}

#[test]
fn test_thumbnail_width_example() {
    let width = scaled_width(1600, 900, 500).unwrap();
    assert!((888..=890).contains(&width));
}
