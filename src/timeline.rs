//! Timeline normalization for RegRipper's regtime plugin output.
//!
//! regtime prints one line per key: a ctime-style LastWrite stamp followed by
//! the key path. Each line is rewritten with an unpadded ISO-like stamp and
//! tagged with the hive it came from, then collected into a set keyed on the
//! full line text. Lines stay raw bytes; only the stamp prefix is decoded.

use crate::datetime::{
    convert_to_timezone, format_unpadded, parse_ctime_prefix, parse_unpadded_prefix, starts_with_weekday,
    CTIME_WIDTH,
};
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Byte offset at which the key path starts in a regtime line
pub const REMAINDER_OFFSET: usize = 27;

/// A single timeline line.
///
/// Two entries are equal exactly when their text is. Ordering is
/// chronological with the text as tie-breaker; the timestamp is always
/// recovered from the text, so ordering agrees with equality.
#[derive(Clone)]
pub struct TimelineEntry {
    timestamp: Option<NaiveDateTime>,
    text: Vec<u8>,
}

impl TimelineEntry {
    /// Wrap a line, reading its stamp back if it carries a normalized one
    pub fn new(text: impl Into<Vec<u8>>) -> Self {
        let text = text.into();
        let timestamp = parse_unpadded_prefix(&text);
        Self { timestamp, text }
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamp
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Length in bytes, as used by the master timeline filter
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl PartialEq for TimelineEntry {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for TimelineEntry {}

impl Ord for TimelineEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for TimelineEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for TimelineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineEntry")
            .field("timestamp", &self.timestamp)
            .field("text", &String::from_utf8_lossy(&self.text))
            .finish()
    }
}

/// Strip a trailing "\r\n" or "\n"
fn trim_line_end(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., b'\r' | b'\n'] = line {
        line = rest;
    }
    line
}

/// Convert a weekday-prefixed regtime line.
///
/// Returns `None` when the line does not start with a weekday abbreviation
/// or its stamp cannot be parsed.
pub fn normalize_line(line: &[u8], tag: &str, timezone: Tz) -> Option<TimelineEntry> {
    let line = trim_line_end(line);
    let stamp = std::str::from_utf8(&line[..line.len().min(CTIME_WIDTH)]).ok()?;
    let utc = parse_ctime_prefix(stamp)?;
    let local = convert_to_timezone(utc, timezone);

    let mut text = format!("{} \t{}", format_unpadded(&local), tag).into_bytes();
    text.extend_from_slice(line.get(REMAINDER_OFFSET..).unwrap_or_default());
    Some(TimelineEntry::new(text))
}

/// Normalize a line if possible, otherwise pass it through unchanged
pub fn convert_line(line: &[u8], tag: &str, timezone: Tz) -> TimelineEntry {
    let line = trim_line_end(line);
    if line.get(..3).and_then(|p| std::str::from_utf8(p).ok()).map_or(false, starts_with_weekday) {
        if let Some(entry) = normalize_line(line, tag, timezone) {
            return entry;
        }
        log::debug!("Unparseable timestamp kept as-is: {}", String::from_utf8_lossy(line));
    }
    TimelineEntry::new(line)
}

/// Normalized lines of one hive, in output order, plus their deduplicated set
#[derive(Debug, Default)]
pub struct HiveTimeline {
    pub lines: Vec<TimelineEntry>,
    pub entries: BTreeSet<TimelineEntry>,
}

impl HiveTimeline {
    /// Convert the complete output of the timeline plugin
    pub fn from_output(output: &[u8], tag: &str, timezone: Tz) -> Self {
        let mut timeline = Self::default();
        let body = output.strip_suffix(b"\n").unwrap_or(output);
        if body.is_empty() {
            return timeline;
        }
        for line in body.split(|&b| b == b'\n') {
            let entry = convert_line(line, tag, timezone);
            timeline.entries.insert(entry.clone());
            timeline.lines.push(entry);
        }
        timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::parse_timezone;

    const REGTIME_LINE: &[u8] = b"Mon Jan  2 03:04:05 2017Z  \\Software\\Microsoft\\Windows";

    fn text(entry: &TimelineEntry) -> String {
        String::from_utf8(entry.text().to_vec()).unwrap()
    }

    #[test]
    fn test_normalize_line_formats_unpadded_stamp() {
        let entry = normalize_line(REGTIME_LINE, "ntuser1", Tz::UTC).unwrap();
        assert_eq!(text(&entry), "2017-1-2 3:4:5 \tntuser1\\Software\\Microsoft\\Windows");
        assert_eq!(
            entry.timestamp(),
            Some(chrono::NaiveDate::from_ymd_opt(2017, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap())
        );
    }

    #[test]
    fn test_normalize_line_strips_carriage_return() {
        let line = [REGTIME_LINE, b"\r".as_slice()].concat();
        let entry = normalize_line(&line, "NTUSER.DAT", Tz::UTC).unwrap();
        assert!(text(&entry).ends_with("\\Windows"));
    }

    #[test]
    fn test_normalize_line_short_line_has_empty_remainder() {
        let entry = normalize_line(b"Tue Feb 14 10:20:30 2017", "SAM", Tz::UTC).unwrap();
        assert_eq!(text(&entry), "2017-2-14 10:20:30 \tSAM");
    }

    #[test]
    fn test_normalize_line_applies_timezone() {
        let tz = parse_timezone("UTC+8").unwrap();
        let entry = normalize_line(REGTIME_LINE, "ntuser1", tz).unwrap();
        assert!(text(&entry).starts_with("2017-1-2 11:4:5 \t"));
    }

    #[test]
    fn test_normalize_line_rejects_non_weekday_lines() {
        assert!(normalize_line(b"Launching regtime v.20080324", "x", Tz::UTC).is_none());
        assert!(normalize_line(b"", "x", Tz::UTC).is_none());
    }

    #[test]
    fn test_normalize_line_keeps_non_utf8_key_names() {
        let line = b"Mon Jan  2 03:04:05 2017Z  \\Software\\R\xe9sum\xe9 key\r";
        let entry = normalize_line(line, "NTUSER.DAT", Tz::UTC).unwrap();
        assert_eq!(entry.text(), b"2017-1-2 3:4:5 \tNTUSER.DAT\\Software\\R\xe9sum\xe9 key");
    }

    #[test]
    fn test_convert_line_passes_through_unparseable() {
        let entry = convert_line(b"Mon-day is not a stamp\r\n", "x", Tz::UTC);
        assert_eq!(entry, TimelineEntry::new("Mon-day is not a stamp"));

        let entry = convert_line(b"(All) Dumps entire hive (all keys) sorted by LastWrite time", "x", Tz::UTC);
        assert_eq!(entry.timestamp(), None);
        assert_eq!(text(&entry), "(All) Dumps entire hive (all keys) sorted by LastWrite time");

        let raw = b"\xff\xfe binary noise";
        assert_eq!(convert_line(raw, "x", Tz::UTC).text(), raw);
    }

    #[test]
    fn test_hive_timeline_deduplicates_on_full_line() {
        let parts: [&[u8]; 5] = [
            b"regtime v.20080324\r\n",
            REGTIME_LINE,
            b"\r\n",
            REGTIME_LINE,
            b"\r\nTue Jan  3 03:04:05 2017Z  \\Software\r\n",
        ];
        let output = parts.concat();
        let timeline = HiveTimeline::from_output(&output, "ntuser1", Tz::UTC);

        assert_eq!(timeline.lines.len(), 4);
        assert_eq!(timeline.entries.len(), 3);
        assert!(timeline.entries.contains(&TimelineEntry::new("regtime v.20080324")));
    }

    #[test]
    fn test_raw_and_normalized_copies_of_a_line_are_one_entry() {
        // A line passed through from one hive that matches the normalized
        // form produced from another hive is the same entry
        let normalized = normalize_line(REGTIME_LINE, "ntuser1", Tz::UTC).unwrap();
        let raw = TimelineEntry::new(normalized.text().to_vec());
        assert_eq!(raw, normalized);
        assert_eq!(raw.cmp(&normalized), Ordering::Equal);

        let mut set = BTreeSet::new();
        set.insert(normalized);
        set.insert(raw);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_same_key_in_different_hives_stays_distinct() {
        let a = HiveTimeline::from_output(REGTIME_LINE, "ntuser1", Tz::UTC);
        let b = HiveTimeline::from_output(REGTIME_LINE, "ntuser2", Tz::UTC);
        let union: BTreeSet<_> = a.entries.union(&b.entries).cloned().collect();
        assert_eq!(union.len(), 2);
    }

    #[test]
    fn test_entries_order_chronologically() {
        let output = b"Tue Jan  3 00:00:00 2017Z  \\Later\nMon Jan  2 00:00:00 2017Z  \\Earlier\n";
        let timeline = HiveTimeline::from_output(output, "h", Tz::UTC);
        let texts: Vec<_> = timeline.entries.iter().map(text).collect();
        assert_eq!(texts, vec!["2017-1-2 0:0:0 \th\\Earlier", "2017-1-3 0:0:0 \th\\Later"]);
    }

    #[test]
    fn test_empty_output_has_no_lines() {
        let timeline = HiveTimeline::from_output(b"", "h", Tz::UTC);
        assert!(timeline.lines.is_empty());
        assert!(timeline.entries.is_empty());
    }
}
