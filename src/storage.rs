use log::warn;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

use crate::config::StorageConfig;

const THUMBNAIL_PREFIX: &str = "thumb_";

/// Public folder segment under `/uploads/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Folder {
    Originals,
    Thumbnails,
}

impl Folder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::Originals => "originals",
            Folder::Thumbnails => "thumbnails",
        }
    }

    pub fn url_for(&self, stored_name: &str) -> String {
        format!("/uploads/{}/{}", self.as_str(), stored_name)
    }
}

impl FromStr for Folder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "originals" => Ok(Folder::Originals),
            "thumbnails" => Ok(Folder::Thumbnails),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Collision-free names for one upload, independent of the user's filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNames {
    pub original: String,
    pub thumbnail: String,
}

impl StoredNames {
    pub fn generate(extension: &str) -> Self {
        let original = format!("{}.{}", Uuid::new_v4(), extension);
        let thumbnail = format!("{}{}", THUMBNAIL_PREFIX, original);
        Self {
            original,
            thumbnail,
        }
    }
}

/// On-disk locations of the two upload folders.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    originals: PathBuf,
    thumbnails: PathBuf,
}

impl StorageLayout {
    pub fn new(originals: impl Into<PathBuf>, thumbnails: impl Into<PathBuf>) -> Self {
        Self {
            originals: originals.into(),
            thumbnails: thumbnails.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.originals_path, &config.thumbnails_path)
    }

    pub fn ensure_dirs(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.originals)?;
        std::fs::create_dir_all(&self.thumbnails)?;
        Ok(())
    }

    pub fn dir(&self, folder: Folder) -> &Path {
        match folder {
            Folder::Originals => &self.originals,
            Folder::Thumbnails => &self.thumbnails,
        }
    }

    pub fn original_path(&self, stored_name: &str) -> PathBuf {
        self.originals.join(stored_name)
    }

    pub fn thumbnail_path(&self, stored_name: &str) -> PathBuf {
        self.thumbnails.join(stored_name)
    }

    /// Resolves a requested file inside a folder; names that could escape it are refused.
    pub fn resolve(&self, folder: Folder, filename: &str) -> Option<PathBuf> {
        let escapes = filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..");
        if escapes {
            return None;
        }
        Some(self.dir(folder).join(filename))
    }

    /// Removes the files backing one photo. Missing files are not errors.
    pub fn remove_photo_files(&self, original: &str, thumbnail: &str) -> Vec<String> {
        [self.original_path(original), self.thumbnail_path(thumbnail)]
            .iter()
            .filter_map(|path| match remove_if_exists(path) {
                Ok(_) => None,
                Err(e) => {
                    warn!("Error deleting file {}: {}", path.display(), e);
                    Some(format!("Error deleting file {}: {}", path.display(), e))
                }
            })
            .collect()
    }
}

/// Returns whether a file was actually removed.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_names() {
        let a = StoredNames::generate("png");
        let b = StoredNames::generate("png");
        assert_ne!(a.original, b.original);
        assert!(a.original.ends_with(".png"));
        assert_eq!(a.thumbnail, format!("thumb_{}", a.original));
        // uuid (36) + ".png"
        assert_eq!(a.original.len(), 40);
    }

    #[test]
    fn test_folder_urls() {
        assert_eq!(
            Folder::Thumbnails.url_for("thumb_x.png"),
            "/uploads/thumbnails/thumb_x.png"
        );
        assert_eq!("originals".parse::<Folder>(), Ok(Folder::Originals));
        assert_eq!("secrets".parse::<Folder>(), Err(()));
    }

    #[test]
    fn test_resolve_refuses_traversal() {
        let layout = StorageLayout::new("/o", "/t");
        assert_eq!(
            layout.resolve(Folder::Originals, "a.png"),
            Some(PathBuf::from("/o/a.png"))
        );
        assert_eq!(layout.resolve(Folder::Originals, "../db.sqlite"), None);
        assert_eq!(layout.resolve(Folder::Thumbnails, "a/b.png"), None);
        assert_eq!(layout.resolve(Folder::Thumbnails, ""), None);
    }

    #[test]
    fn test_remove_photo_files() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().join("o"), dir.path().join("t"));
        layout.ensure_dirs().unwrap();
        std::fs::write(layout.original_path("a.png"), b"x").unwrap();

        // thumbnail is missing, which is fine
        let errors = layout.remove_photo_files("a.png", "thumb_a.png");
        assert!(errors.is_empty());
        assert!(!layout.original_path("a.png").exists());
        assert!(!remove_if_exists(&layout.original_path("a.png")).unwrap());
    }
}
