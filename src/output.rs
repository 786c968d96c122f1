//! Output file naming and writing for reports and timelines.

use crate::error::Result;
use crate::timeline::TimelineEntry;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the merged timeline (tab-separated, opens in a spreadsheet)
pub const MASTER_TIMELINE_FILE: &str = "MasterTimeline.xls";

/// Header row of the master timeline
pub const MASTER_TIMELINE_HEADER: &str = "\"Time\"\t\"Path\"";

/// Banner line regtime prints, never useful in a timeline
pub const NOISE_PHRASE: &str = "(All) Dumps entire hive";

/// Entries must be longer than this many bytes to reach the master timeline
pub const MIN_ENTRY_LEN: usize = 20;

/// Output file stem for a hive: the file name, plus the username when known
pub fn output_stem(file_name: &str, username: Option<&str>) -> String {
    match username {
        Some(user) => format!("{}_{}", file_name, user),
        None => file_name.to_string(),
    }
}

/// Path of the cleaned plugin report
pub fn report_path(report_dir: &Path, stem: &str) -> PathBuf {
    report_dir.join(format!("{}.txt", stem))
}

/// Path of the per-hive timeline
pub fn timeline_path(report_dir: &Path, stem: &str) -> PathBuf {
    report_dir.join(format!("{}_timeline.txt", stem))
}

/// Create a buffered file writer
pub fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Write a cleaned report verbatim
pub fn write_report(path: &Path, report: &[u8]) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_all(report)?;
    writer.flush()?;
    Ok(())
}

/// Write one timeline line per entry, in the order given
pub fn write_hive_timeline<'a, W, I>(mut writer: W, lines: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a TimelineEntry>,
{
    for entry in lines {
        writer.write_all(entry.text())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// True if an entry belongs in the master timeline
pub fn keep_in_master(entry: &TimelineEntry) -> bool {
    entry.len() > MIN_ENTRY_LEN
        && !entry
            .text()
            .windows(NOISE_PHRASE.len())
            .any(|w| w == NOISE_PHRASE.as_bytes())
}

/// Write the master timeline and return how many entries were written
pub fn write_master_timeline<'a, W, I>(mut writer: W, entries: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a TimelineEntry>,
{
    writeln!(writer, "{}", MASTER_TIMELINE_HEADER)?;

    let mut written = 0;
    for entry in entries.into_iter().filter(|e| keep_in_master(e)) {
        writer.write_all(entry.text())?;
        writer.write_all(b"\n")?;
        written += 1;
    }

    writer.flush()?;
    Ok(written)
}
