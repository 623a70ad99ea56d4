use chrono::NaiveDateTime;
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// `屏幕截图 2023-05-01 153045.png`
static SCREENSHOT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"屏幕截图 ([0-9]{4})-([0-9]{2})-([0-9]{2}) ([0-9]{6})\.").expect("valid screenshot regex")
});

/// `IMG_20230501_153045.jpg`, `20230501-153045.png`, `20230501153045.gif`
static COMPACT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[_-])([0-9]{8})[_-]?([0-9]{6})(?:[_.-]|$)").expect("valid compact regex")
});

const COMPACT_FORMAT: &str = "%Y%m%d%H%M%S";

/// Extracts a capture time from well-known filename patterns.
///
/// The screenshot pattern is tried first; if it is absent or its digits do
/// not form a valid date-time, the compact pattern is tried. Never fails,
/// only reports absence.
pub fn parse_filename_timestamp(filename: &str) -> Option<NaiveDateTime> {
    parse_screenshot(filename).or_else(|| parse_compact(filename))
}

fn parse_screenshot(filename: &str) -> Option<NaiveDateTime> {
    let caps = SCREENSHOT_PATTERN.captures(filename)?;
    let digits = format!("{}{}{}{}", &caps[1], &caps[2], &caps[3], &caps[4]);

    match NaiveDateTime::parse_from_str(&digits, COMPACT_FORMAT) {
        Ok(dt) => Some(dt),
        Err(e) => {
            debug!("Invalid screenshot timestamp in {}: {}", filename, e);
            None
        }
    }
}

fn parse_compact(filename: &str) -> Option<NaiveDateTime> {
    let caps = COMPACT_PATTERN.captures(filename)?;
    let digits = format!("{}{}", &caps[1], &caps[2]);

    match NaiveDateTime::parse_from_str(&digits, COMPACT_FORMAT) {
        Ok(dt) => Some(dt),
        Err(e) => {
            debug!("Invalid compact timestamp in {}: {}", filename, e);
            None
        }
    }
}
