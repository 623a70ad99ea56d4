use unicode_normalization::UnicodeNormalization;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Lower-cased extension after the last dot, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

/// Returns the normalized extension when the upload type is accepted.
pub fn allowed_extension(filename: &str) -> Option<String> {
    extension_of(filename).filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Reduces a user-supplied filename to a safe ASCII name.
///
/// Non-ASCII characters are dropped after NFKD decomposition, whitespace
/// runs become `_`, anything outside `[A-Za-z0-9_.-]` is removed and
/// leading/trailing dots and underscores are trimmed. May return an empty
/// string.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    ascii
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}
