//! # rrtl - RegRipper batch runner and timeline merger
//!
//! Runs RegRipper's command-line front end over whole folders of extracted
//! registry hives and turns the results into something easy to review.
//!
//! ## Features
//!
//! - NTUSER.DAT, USRCLASS.DAT and S-Registry (SAM, SOFTWARE, SECURITY, SYSTEM) folders
//! - Removes plugin results with no findings from each report
//! - Appends the username found in an NTUSER hive header to its output names
//! - Normalizes regtime timestamps into one per-hive timeline each
//! - Merges all hive timelines into a deduplicated, tab-separated master timeline

pub mod app;
pub mod cli;
pub mod datetime;
pub mod error;
pub mod output;
pub mod registry;
pub mod report;
pub mod ripper;
pub mod timeline;

pub use app::{App, RunSummary};
pub use error::{Error, Result};
pub use registry::{HiveClass, HiveFile};
pub use ripper::{RipExecutable, Ripper};
pub use timeline::TimelineEntry;
