//! Command-line interface definitions and parsing.

use crate::registry::HiveClass;
use crate::ripper::{DEFAULT_RIP_PROGRAM, DEFAULT_TIMELINE_PLUGIN};
use clap::Parser;
use std::path::{Path, PathBuf};

/// rrtl - run RegRipper over every hive in a collection and build one timeline
#[derive(Parser, Debug)]
#[command(name = "rrtl")]
#[command(about = "rrtl - RegRipper batch runner and master timeline builder", version)]
#[command(long_about = "Runs RegRipper against every registry hive found in three input folders:
• NTUSER.DAT hives (username appended to output names when present)
• USRCLASS.DAT hives
• S-Registry hives (SAM, SOFTWARE, SECURITY, SYSTEM)

For each hive a cleaned plugin report and a regtime timeline are written to the
report folder, and all timelines are merged into MasterTimeline.xls (tab-separated).")]
pub struct Args {
    /// Folder of extracted NTUSER.DAT files
    pub ntuser_dir: String,

    /// Folder of extracted USRCLASS.DAT files
    pub usrclass_dir: String,

    /// Folder of extracted SAM, SOFTWARE, SECURITY and SYSTEM files
    pub sregistry_dir: String,

    /// Folder the reports and timelines are written to
    pub report_dir: String,

    /// Path to RegRipper's command-line executable
    #[arg(long, default_value = DEFAULT_RIP_PROGRAM)]
    pub rip: String,

    /// Plugin used to build the per-hive timelines
    #[arg(long, default_value = DEFAULT_TIMELINE_PLUGIN)]
    pub timeline_plugin: String,

    /// Display timeline timestamps in this timezone (e.g. "UTC", "UTC+8", "UTC-5")
    #[arg(long, default_value = "UTC")]
    pub timezone: String,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Parsed CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub ntuser_dir: PathBuf,
    pub usrclass_dir: PathBuf,
    pub sregistry_dir: PathBuf,
    pub report_dir: PathBuf,
    pub rip_program: PathBuf,
    pub timeline_plugin: String,
    pub timezone: chrono_tz::Tz,
    pub show_progress: bool,
}

impl Config {
    /// Turn CLI arguments into a configuration
    pub fn from_args(args: Args) -> crate::error::Result<Self> {
        let timezone = crate::datetime::parse_timezone(&args.timezone)?;

        Ok(Config {
            ntuser_dir: clean_dir_arg(&args.ntuser_dir),
            usrclass_dir: clean_dir_arg(&args.usrclass_dir),
            sregistry_dir: clean_dir_arg(&args.sregistry_dir),
            report_dir: clean_dir_arg(&args.report_dir),
            rip_program: PathBuf::from(args.rip),
            timeline_plugin: args.timeline_plugin,
            timezone,
            show_progress: !args.quiet,
        })
    }

    /// Input folder for a hive class
    pub fn input_dir(&self, class: HiveClass) -> &Path {
        match class {
            HiveClass::NtUser => &self.ntuser_dir,
            HiveClass::UsrClass => &self.usrclass_dir,
            HiveClass::SRegistry => &self.sregistry_dir,
        }
    }
}

/// Strip double quotes left over from Windows shells (`"C:\hives\"` keeps a trailing quote)
fn clean_dir_arg(arg: &str) -> PathBuf {
    PathBuf::from(arg.replace('"', ""))
}
