//! Date and time handling: RegRipper timestamp parsing, unpadded formatting
//! and display timezone conversion.

use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Weekday abbreviations RegRipper prints at the start of a timeline line
pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Width of a ctime-style timestamp, e.g. "Mon Jan  2 03:04:05 2017"
pub const CTIME_WIDTH: usize = 24;

/// Parse timezone string into a Tz object
/// Accepts "UTC" or UTC offset notation like "UTC+8", "UTC-5"
pub fn parse_timezone(timezone_str: &str) -> Result<Tz> {
    match timezone_str {
        "UTC" => Ok(Tz::UTC),
        _ if timezone_str.starts_with("UTC") => {
            let offset_part = &timezone_str[3..];
            if offset_part.is_empty() {
                return Ok(Tz::UTC);
            }

            let offset_hours: i32 = offset_part.parse().map_err(|_| {
                Error::InvalidInput(format!(
                    "Invalid UTC offset '{}'. Use format like 'UTC+8' or 'UTC-5'",
                    timezone_str
                ))
            })?;

            if offset_hours == 0 {
                return Ok(Tz::UTC);
            }
            if !(-12..=14).contains(&offset_hours) {
                return Err(Error::InvalidInput(format!(
                    "Unsupported UTC offset '{}'. Offsets range from UTC-12 to UTC+14",
                    timezone_str
                )));
            }

            // The Etc/GMT zones carry POSIX signs, inverted from the UTC notation
            let zone_name = format!("Etc/GMT{:+}", -offset_hours);
            zone_name.parse::<Tz>().map_err(|e| {
                Error::InvalidInput(format!("Unknown timezone '{}': {}", zone_name, e))
            })
        }
        _ => Err(Error::InvalidInput(format!(
            "Invalid timezone '{}'. Use 'UTC' or UTC offset notation like 'UTC+8'",
            timezone_str
        ))),
    }
}

/// True if the line opens with one of the English weekday abbreviations
pub fn starts_with_weekday(line: &str) -> bool {
    line.get(..3).map_or(false, |prefix| WEEKDAYS.contains(&prefix))
}

/// Parse the leading ctime-style timestamp of a RegRipper line.
///
/// Only the month, day, time and year are read. The weekday is not checked
/// against the date, and runs of spaces (the padding before single-digit
/// days) are tolerated.
pub fn parse_ctime_prefix(line: &str) -> Option<NaiveDateTime> {
    if !starts_with_weekday(line) {
        return None;
    }

    let stamp: String = line.chars().take(CTIME_WIDTH).skip(4).collect();
    let collapsed = stamp.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&collapsed, "%b %d %H:%M:%S %Y").ok()
}

/// Convert a UTC wall-clock time into the display timezone
pub fn convert_to_timezone(utc: NaiveDateTime, tz: Tz) -> NaiveDateTime {
    Utc.from_utc_datetime(&utc).with_timezone(&tz).naive_local()
}

/// Format as "Y-M-D H:M:S" with every component unpadded
pub fn format_unpadded(dt: &NaiveDateTime) -> String {
    format!(
        "{}-{}-{} {}:{}:{}",
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    )
}

/// Read back the stamp of an already normalized line ("Y-M-D H:M:S \t...")
pub fn parse_unpadded_prefix(line: &[u8]) -> Option<NaiveDateTime> {
    let end = line.windows(2).position(|w| w == b" \t")?;
    let stamp = std::str::from_utf8(&line[..end]).ok()?;
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").ok()
}
