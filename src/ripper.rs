//! Invocation of RegRipper's command-line front end.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default RegRipper executable, resolved from the working directory or PATH
pub const DEFAULT_RIP_PROGRAM: &str = "rip.exe";

/// Plugin that prints every key with its LastWrite time
pub const DEFAULT_TIMELINE_PLUGIN: &str = "regtime";

/// Source of RegRipper output for a hive
pub trait Ripper {
    /// Run a full profile against the hive and return the raw report bytes
    fn report(&self, hive: &Path, profile: &str) -> Result<Vec<u8>>;

    /// Run the timeline plugin against the hive and return its raw output
    fn timeline(&self, hive: &Path) -> Result<Vec<u8>>;
}

/// Runs the real rip executable and blocks until it exits.
///
/// Output is handed back untouched: key names in hives are frequently
/// ANSI-encoded and must reach the reports byte for byte.
#[derive(Debug, Clone)]
pub struct RipExecutable {
    program: PathBuf,
    timeline_plugin: String,
}

impl RipExecutable {
    pub fn new(program: impl Into<PathBuf>, timeline_plugin: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeline_plugin: timeline_plugin.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the command line `<rip> -r <hive> <flag> <name>`
    fn command(&self, hive: &Path, flag: &str, name: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-r").arg(hive).arg(flag).arg(name);
        cmd
    }

    fn run(&self, mut cmd: Command, hive: &Path) -> Result<Vec<u8>> {
        log::debug!("Running {:?}", cmd);
        let program = self.program.display().to_string();

        let output = cmd.output().map_err(|source| Error::ToolLaunch {
            program: program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(Error::ToolFailed {
                program,
                hive: hive.display().to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        if !output.stderr.is_empty() {
            log::trace!("{} stderr: {}", program, String::from_utf8_lossy(&output.stderr).trim_end());
        }
        Ok(output.stdout)
    }
}

impl Default for RipExecutable {
    fn default() -> Self {
        Self::new(DEFAULT_RIP_PROGRAM, DEFAULT_TIMELINE_PLUGIN)
    }
}

impl Ripper for RipExecutable {
    fn report(&self, hive: &Path, profile: &str) -> Result<Vec<u8>> {
        self.run(self.command(hive, "-f", profile), hive)
    }

    fn timeline(&self, hive: &Path) -> Result<Vec<u8>> {
        self.run(self.command(hive, "-p", &self.timeline_plugin), hive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_command_line_layout() {
        let rip = RipExecutable::new("C:\\RegRipper\\rip.exe", "regtime");
        let cmd = rip.command(Path::new("hives\\NTUSER.DAT"), "-f", "ntuser");

        assert_eq!(cmd.get_program(), OsStr::new("C:\\RegRipper\\rip.exe"));
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(
            args,
            vec![
                OsStr::new("-r"),
                OsStr::new("hives\\NTUSER.DAT"),
                OsStr::new("-f"),
                OsStr::new("ntuser"),
            ]
        );
    }

    #[test]
    fn test_hive_path_with_spaces_is_one_argument() {
        let rip = RipExecutable::default();
        let cmd = rip.command(Path::new("my hives/NTUSER.DAT"), "-p", "regtime");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args.len(), 4);
        assert_eq!(args[1], OsStr::new("my hives/NTUSER.DAT"));
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let rip = RipExecutable::new("/nonexistent/rip-does-not-exist", "regtime");
        match rip.timeline(Path::new("NTUSER.DAT")) {
            Err(Error::ToolLaunch { program, .. }) => {
                assert_eq!(program, "/nonexistent/rip-does-not-exist")
            }
            other => panic!("expected launch error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_tool_failure() {
        // `false` ignores its arguments and exits with status 1
        let rip = RipExecutable::new("false", "regtime");
        let err = rip.report(Path::new("SAM"), "sam").unwrap_err();
        assert!(matches!(err, Error::ToolFailed { ref hive, .. } if hive == "SAM"));
    }

    #[cfg(unix)]
    #[test]
    fn test_stdout_is_captured() {
        // `echo` prints its arguments, standing in for rip
        let rip = RipExecutable::new("echo", "regtime");
        let out = rip.timeline(Path::new("SYSTEM")).unwrap();
        assert_eq!(out, b"-r SYSTEM -p regtime\n".to_vec());
    }
}
