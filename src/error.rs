//! Error types and handling for the rrtl application.

use std::fmt;

/// Custom error type for rrtl operations
#[derive(Debug)]
pub enum Error {
    /// I/O related errors
    Io(std::io::Error),
    /// Invalid command-line input
    InvalidInput(String),
    /// The external tool could not be started
    ToolLaunch {
        program: String,
        source: std::io::Error,
    },
    /// The external tool ran but exited unsuccessfully
    ToolFailed {
        program: String,
        hive: String,
        status: String,
        stderr: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::ToolLaunch { program, source } => {
                write!(f, "Failed to launch '{}': {}", program, source)
            }
            Error::ToolFailed { program, hive, status, stderr } => {
                write!(f, "'{}' failed on {} ({})", program, hive, status)?;
                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::ToolLaunch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failed_display_includes_stderr() {
        let err = Error::ToolFailed {
            program: "rip.exe".to_string(),
            hive: "NTUSER.DAT".to_string(),
            status: "exit code: 2".to_string(),
            stderr: "  plugin not found\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "'rip.exe' failed on NTUSER.DAT (exit code: 2): plugin not found"
        );
    }

    #[test]
    fn test_tool_failed_display_without_stderr() {
        let err = Error::ToolFailed {
            program: "rip.exe".to_string(),
            hive: "SAM".to_string(),
            status: "exit code: 1".to_string(),
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "'rip.exe' failed on SAM (exit code: 1)");
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("I/O error"));
    }
}
