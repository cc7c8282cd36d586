//! Parsing of human-readable durations such as `"90"`, `"10 minutes"` or `"2h"`.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::ConfigError;

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s*([A-Za-z]*)\s*$").expect("invalid duration regex")
});

/// Parse a positive duration.
///
/// Accepts a bare number of seconds or a number followed by a unit
/// (`s`, `m`, `h`, `d`, `w` and their long forms, case-insensitive).
pub(crate) fn parse_duration(value: &str, field: &str) -> Result<Duration, ConfigError> {
    let invalid = || {
        ConfigError::Validation(format!(
            "{field} must be a duration like \"300\", \"10 minutes\" or \"2h\", got {value:?}"
        ))
    };

    let caps = DURATION_PATTERN.captures(value).ok_or_else(invalid)?;
    let amount: u64 = caps[1].parse().map_err(|_| invalid())?;
    let unit_secs: u64 = match caps[2].to_ascii_lowercase().as_str() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hour" | "hours" => 60 * 60,
        "d" | "day" | "days" => 24 * 60 * 60,
        "w" | "week" | "weeks" => 7 * 24 * 60 * 60,
        _ => return Err(invalid()),
    };

    let secs = amount.checked_mul(unit_secs).ok_or_else(invalid)?;
    if secs == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(Duration::from_secs(secs))
}
