use chrono::{DateTime, Local, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Resolves the capture time of a stored image.
    ///
    /// Preference: EXIF `DateTimeOriginal`, EXIF `DateTime`, file modification
    /// time (local clock). Every failure falls through to the next source.
    pub fn resolve_capture_time(path: &Path) -> Option<NaiveDateTime> {
        Self::exif_capture_time(path).or_else(|| Self::modification_time(path))
    }

    fn exif_capture_time(path: &Path) -> Option<NaiveDateTime> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                debug!("Failed to open {} for EXIF: {}", path.display(), e);
                return None;
            }
        };

        let mut reader = BufReader::new(file);
        let exif = match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(e) => {
                debug!("Failed to read EXIF data for {}: {}", path.display(), e);
                return None;
            }
        };

        // Only the first present tag is consulted
        let field = [Tag::DateTimeOriginal, Tag::DateTime]
            .iter()
            .find_map(|tag| exif.get_field(*tag, In::PRIMARY))?;

        let raw = match field.value {
            Value::Ascii(ref values) => values
                .first()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())?,
            _ => field.display_value().to_string(),
        };

        let parsed = Self::parse_exif_datetime(&raw);
        if parsed.is_none() {
            debug!("Could not parse EXIF timestamp '{}'", raw);
        }
        parsed
    }

    fn modification_time(path: &Path) -> Option<NaiveDateTime> {
        match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => Some(DateTime::<Local>::from(modified).naive_local()),
            Err(e) => {
                debug!(
                    "Error getting file modification time for {}: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    pub fn parse_exif_datetime(datetime_str: &str) -> Option<NaiveDateTime> {
        let cleaned = datetime_str.replace(['"', '\0'], "");
        let cleaned = cleaned.trim();

        // EXIF format (with colons): "2023:01:15 10:30:00"
        if let Ok(naive_dt) = NaiveDateTime::parse_from_str(cleaned, "%Y:%m:%d %H:%M:%S") {
            return Some(naive_dt);
        }

        // Some software normalizes dates to "2023-01-15 10:30:00"
        NaiveDateTime::parse_from_str(cleaned, "%F %T").ok()
    }
}
