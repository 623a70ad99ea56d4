use anyhow::Context;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::config::Config;
use crate::db::{create_db_pool, DbPool, Photo};
use crate::storage::{Folder, StorageLayout};

/// Creates the database schema and both upload folders.
pub async fn init_db(config: &Config) -> anyhow::Result<()> {
    let pool = create_db_pool(&config.db_path, config.max_connections)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", config.db_path.display(), e))?;
    pool.close().await;

    StorageLayout::from_config(&config.storage)
        .ensure_dirs()
        .context("Failed to create upload folders")?;

    Ok(())
}

/// Asks the operator to type `yes`. Anything else, including EOF, declines.
pub fn confirm<R: BufRead, W: Write>(mut input: R, mut output: W) -> anyhow::Result<bool> {
    writeln!(
        output,
        "WARNING: This will delete ALL photos from the database and ALL files in the upload folders."
    )?;
    write!(output, "Type 'yes' to continue: ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

#[derive(Debug, Default)]
pub struct ClearReport {
    pub records_deleted: u64,
    pub files_deleted: usize,
    pub errors: Vec<String>,
}

/// Deletes every record, then every file in both upload folders.
/// File errors are collected and do not stop the sweep.
pub async fn clear_all(pool: &DbPool, layout: &StorageLayout) -> anyhow::Result<ClearReport> {
    let mut report = ClearReport {
        records_deleted: Photo::delete_all(pool)
            .await
            .context("Failed to delete photo records")?,
        ..Default::default()
    };

    for folder in [Folder::Originals, Folder::Thumbnails] {
        sweep_folder(layout.dir(folder), &mut report);
    }

    Ok(report)
}

fn sweep_folder(dir: &Path, report: &mut ClearReport) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
        Err(e) => {
            report
                .errors
                .push(format!("Error reading {}: {}", dir.display(), e));
            return;
        }
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                report
                    .errors
                    .push(format!("Error reading {}: {}", dir.display(), e));
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => report.files_deleted += 1,
            Err(e) => report
                .errors
                .push(format!("Error deleting file {}: {}", path.display(), e)),
        }
    }
}

pub fn print_report<W: Write>(report: &ClearReport, mut output: W) -> std::io::Result<()> {
    writeln!(output, "Deleted {} photo records.", report.records_deleted)?;
    writeln!(output, "Deleted {} files.", report.files_deleted)?;
    if report.errors.is_empty() {
        writeln!(output, "All photos and files have been cleared.")?;
    } else {
        writeln!(output, "Completed with {} errors:", report.errors.len())?;
        for error in &report.errors {
            writeln!(output, "  {}", error)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::db::{create_in_memory_pool, NewPhoto};
    use chrono::Utc;

    #[test]
    fn test_confirm() {
        let mut out = Vec::new();
        assert!(confirm(&b"yes\n"[..], &mut out).unwrap());
        assert!(String::from_utf8(out).unwrap().contains("Type 'yes'"));
        assert!(confirm(&b"  YES \n"[..], Vec::new()).unwrap());
        assert!(!confirm(&b"y\n"[..], Vec::new()).unwrap());
        assert!(!confirm(&b""[..], Vec::new()).unwrap());
    }

    #[tokio::test]
    async fn test_clear_all_removes_records_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().join("o"), dir.path().join("t"));
        layout.ensure_dirs().unwrap();
        std::fs::write(layout.original_path("a.png"), b"a").unwrap();
        std::fs::write(layout.thumbnail_path("thumb_a.png"), b"a").unwrap();
        std::fs::write(layout.original_path("stray.png"), b"s").unwrap();

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

        let report = clear_all(&pool, &layout).await.unwrap();
        assert_eq!(report.records_deleted, 1);
        assert_eq!(report.files_deleted, 3);
        assert!(report.errors.is_empty());
        assert_eq!(Photo::count(&pool).await.unwrap(), 0);
        assert_eq!(std::fs::read_dir(dir.path().join("o")).unwrap().count(), 0);

        let mut out = Vec::new();
        print_report(&report, &mut out).unwrap();
        assert!(String::from_utf8(out)
            .unwrap()
            .contains("All photos and files have been cleared."));
    }

    #[tokio::test]
    async fn test_clear_all_tolerates_missing_folders() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().join("o"), dir.path().join("t"));
        let pool = create_in_memory_pool().await.unwrap();

        let report = clear_all(&pool, &layout).await.unwrap();
        assert_eq!(report.files_deleted, 0);
        assert!(report.errors.is_empty());
    }
}
