use chrono::NaiveDateTime;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

const NUMERIC_PREFIX: &str = "Sky";
const NUMERIC_SUFFIX: &str = ".png";

/// ASCII digits only; other Unicode digits leave the file in the default category.
static NUMERIC_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Sky([0-9]+)\.png$").expect("valid numeric filename regex"));

/// Gallery section a photo is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// Sorted by display timestamp, newest first.
    #[default]
    Game,
    /// Sorted by the number embedded in the filename.
    Event,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Game => "游戏",
            Category::Event => "活动",
        }
    }

    /// Chooses the display timestamp from the available sources.
    ///
    /// Game photos prefer the time encoded in the filename; Event photos only
    /// trust the image itself (EXIF or modification time).
    pub fn display_timestamp(
        self,
        from_filename: Option<NaiveDateTime>,
        from_file: Option<NaiveDateTime>,
    ) -> Option<NaiveDateTime> {
        match self {
            Category::Game => from_filename.or(from_file),
            Category::Event => from_file,
        }
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "游戏" => Ok(Category::Game),
            "活动" => Ok(Category::Event),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub sort_key: Option<i64>,
}

/// Classifies an upload by its raw, unsanitized filename. Never fails:
/// anything that is not a numbered `Sky<n>.png` lands in the default category.
pub fn classify(raw_filename: &str) -> Classification {
    let default = Classification {
        category: Category::default(),
        sort_key: None,
    };

    if !raw_filename.starts_with(NUMERIC_PREFIX) || !raw_filename.ends_with(NUMERIC_SUFFIX) {
        return default;
    }

    let Some(digits) = NUMERIC_NAME
        .captures(raw_filename)
        .and_then(|caps| caps.get(1))
    else {
        return default;
    };

    match digits.as_str().parse::<i64>() {
        Ok(sort_key) => Classification {
            category: Category::Event,
            sort_key: Some(sort_key),
        },
        Err(e) => {
            log::warn!(
                "Could not parse number from filename {}: {}",
                raw_filename,
                e
            );
            default
        }
    }
}
