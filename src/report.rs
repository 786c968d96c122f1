//! Cleanup of RegRipper plugin reports.
//!
//! RegRipper separates plugin results with a line of 40 dashes. Plugins that
//! found nothing still print a short section saying the key was "not found"
//! or does "not exist"; those sections are removed. Reports are handled as
//! raw bytes so key names in any code page survive unchanged.

use regex::bytes::Regex;
use std::sync::OnceLock;

/// Section delimiter printed between plugin results
pub const SECTION_DELIMITER: &str = "----------------------------------------";

/// Sections with more line breaks than this are kept even when they mention a miss
pub const MAX_EMPTY_SECTION_LINE_BREAKS: usize = 7;

/// Section counts from a cleaning pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub sections: usize,
    pub dropped: usize,
}

fn delimiter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&regex::escape(SECTION_DELIMITER)).expect("valid delimiter pattern"))
}

fn no_finding_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("not found|not exist").expect("valid marker pattern"))
}

/// True for short sections that only report a missing key or value
pub fn is_no_finding_section(section: &[u8]) -> bool {
    no_finding_regex().is_match(section)
        && section.iter().filter(|&&b| b == b'\n').count() <= MAX_EMPTY_SECTION_LINE_BREAKS
}

/// Remove "no finding" sections from a report
pub fn clean_report(text: &[u8]) -> Vec<u8> {
    clean_report_with_stats(text).0
}

/// Remove "no finding" sections and report how many were dropped
pub fn clean_report_with_stats(text: &[u8]) -> (Vec<u8>, CleanStats) {
    let mut stats = CleanStats::default();
    let mut kept: Vec<&[u8]> = Vec::new();

    for section in delimiter_regex().split(text) {
        stats.sections += 1;
        if is_no_finding_section(section) {
            stats.dropped += 1;
        } else {
            kept.push(section);
        }
    }

    (kept.join(SECTION_DELIMITER.as_bytes()), stats)
}
