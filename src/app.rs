//! Main application logic and orchestration.

use crate::{
    cli::Config,
    error::Result,
    output::{self, MASTER_TIMELINE_FILE},
    registry::{self, HiveClass, HiveFile},
    report,
    ripper::{RipExecutable, Ripper},
    timeline::{HiveTimeline, TimelineEntry},
};
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Counts from a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Hives that were reported and timelined
    pub hives_processed: usize,
    /// Distinct entries across all hive timelines
    pub unique_entries: usize,
    /// Entries that made it into the master timeline
    pub master_entries: usize,
    /// Location of the master timeline
    pub master_timeline: PathBuf,
}

/// Main application runner
pub struct App<R: Ripper = RipExecutable> {
    config: Config,
    ripper: R,
}

impl App<RipExecutable> {
    /// Create a new application instance using the configured rip executable
    pub fn new(config: Config) -> Self {
        let ripper = RipExecutable::new(config.rip_program.clone(), config.timeline_plugin.clone());
        Self { config, ripper }
    }
}

impl<R: Ripper> App<R> {
    /// Create an application instance with a specific RegRipper front end
    pub fn with_ripper(config: Config, ripper: R) -> Self {
        Self { config, ripper }
    }

    /// Process every hive and write the master timeline.
    ///
    /// Input folders are handled one at a time in NTUSER, USRCLASS,
    /// S-Registry order: a folder is only listed once every hive of the
    /// previous one has been written out.
    pub fn run(&self) -> Result<RunSummary> {
        std::fs::create_dir_all(&self.config.report_dir)?;

        let progress = self.progress_bar();
        let mut master: BTreeSet<TimelineEntry> = BTreeSet::new();
        let mut hives_processed = 0;

        for class in HiveClass::ALL {
            let hives = self.discover_hives(class)?;
            log::info!("Found {} {} hive(s)", hives.len(), class);
            progress.inc_length(hives.len() as u64);

            for hive in &hives {
                progress.set_message(hive.file_name.clone());
                let entries = self.process_hive(hive)?;
                master.extend(entries);
                hives_processed += 1;
                progress.inc(1);
            }
        }
        progress.finish_and_clear();

        let master_path = self.config.report_dir.join(MASTER_TIMELINE_FILE);
        log::info!("Writing master timeline {}", master_path.display());
        let writer = output::create_writer(&master_path)?;
        let master_entries = output::write_master_timeline(writer, &master)?;

        let summary = RunSummary {
            hives_processed,
            unique_entries: master.len(),
            master_entries,
            master_timeline: master_path,
        };
        log::info!(
            "Processed {} hive(s), {} master timeline entries",
            summary.hives_processed,
            summary.master_entries
        );
        Ok(summary)
    }

    /// List the recognized hives in the input folder of one class.
    ///
    /// Files are sorted by name. Subfolders and files without a `regf`
    /// header are skipped.
    pub fn discover_hives(&self, class: HiveClass) -> Result<Vec<HiveFile>> {
        let dir = self.config.input_dir(class);
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        paths.sort();

        let mut hives = Vec::new();
        for path in paths {
            if path.is_dir() {
                continue;
            }
            if registry::is_registry(&path) {
                hives.push(HiveFile::new(path, class));
            } else {
                log::debug!("Skipping non-registry file {}", path.display());
            }
        }
        Ok(hives)
    }

    /// Report and timeline one hive, returning its distinct timeline entries
    pub fn process_hive(&self, hive: &HiveFile) -> Result<BTreeSet<TimelineEntry>> {
        let username = if hive.class.has_username() {
            registry::extract_username(&hive.path)
                .and_then(|user| registry::sanitize_for_filename(&user))
        } else {
            None
        };
        let stem = output::output_stem(&hive.file_name, username.as_deref());
        let report_dir = &self.config.report_dir;

        log::info!("Parsing {} ({})", hive.path.display(), hive.class);
        let raw_report = self.ripper.report(&hive.path, &hive.class.profile(&hive.file_name))?;
        let (cleaned, stats) = report::clean_report_with_stats(&raw_report);
        log::debug!(
            "{}: kept {} of {} report sections",
            hive.file_name,
            stats.sections - stats.dropped,
            stats.sections
        );
        output::write_report(&output::report_path(report_dir, &stem), &cleaned)?;

        log::info!("Timelining {}", hive.path.display());
        let raw_timeline = self.ripper.timeline(&hive.path)?;
        let timeline = HiveTimeline::from_output(&raw_timeline, &hive.file_name, self.config.timezone);
        let writer = output::create_writer(&output::timeline_path(report_dir, &stem))?;
        output::write_hive_timeline(writer, &timeline.lines)?;

        Ok(timeline.entries)
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.show_progress || !std::io::stderr().is_terminal() {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb
    }
}
