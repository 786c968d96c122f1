//! Registry hive recognition and NTUSER username extraction.
//!
//! Hives are never parsed here; structural work is left to RegRipper. This
//! module only answers "is this a hive?" and "whose NTUSER.DAT is this?".

use regex::bytes::Regex;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Hive file signature
pub const REGF_SIGNATURE: &[u8; 4] = b"regf";

/// Number of header bytes searched for the embedded hive path
pub const USERNAME_SCAN_LEN: usize = 300;

/// Input class a hive was found under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiveClass {
    /// NTUSER.DAT user hives
    NtUser,
    /// USRCLASS.DAT user class hives
    UsrClass,
    /// SAM, SOFTWARE, SECURITY and SYSTEM hives
    SRegistry,
}

impl HiveClass {
    /// Processing order of the input directories
    pub const ALL: [HiveClass; 3] = [HiveClass::NtUser, HiveClass::UsrClass, HiveClass::SRegistry];

    /// RegRipper profile used for the full report.
    ///
    /// System hives are run with the profile named after the file itself
    /// (sam, software, security, system).
    pub fn profile(&self, file_name: &str) -> String {
        match self {
            HiveClass::NtUser => "ntuser".to_string(),
            HiveClass::UsrClass => "usrclass".to_string(),
            HiveClass::SRegistry => file_name.to_string(),
        }
    }

    /// Only NTUSER hives carry a user profile path worth extracting
    pub fn has_username(&self) -> bool {
        matches!(self, HiveClass::NtUser)
    }
}

impl fmt::Display for HiveClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HiveClass::NtUser => "NTUSER",
            HiveClass::UsrClass => "USRCLASS",
            HiveClass::SRegistry => "S-Registry",
        };
        f.write_str(name)
    }
}

/// A recognized hive waiting to be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiveFile {
    pub path: PathBuf,
    pub file_name: String,
    pub class: HiveClass,
}

impl HiveFile {
    pub fn new(path: PathBuf, class: HiveClass) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, file_name, class }
    }
}

/// Check the file header to see whether this is a registry hive.
///
/// Open and read failures, including files shorter than the signature,
/// count as "not a hive".
pub fn is_registry(path: &Path) -> bool {
    let mut signature = [0u8; 4];
    match File::open(path).and_then(|mut f| f.read_exact(&mut signature)) {
        Ok(()) => &signature == REGF_SIGNATURE,
        Err(e) => {
            log::trace!("Header check failed for {}: {}", path.display(), e);
            false
        }
    }
}

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Case-insensitive, so the negated class also rejects uppercase letters
    RE.get_or_init(|| Regex::new(r"(?i-u)([^a-z0-9 .]*)(\\NTUSER)").expect("valid username pattern"))
}

/// Extract the username embedded in the first bytes of an NTUSER hive.
///
/// Read failures are treated as "no username".
pub fn extract_username(path: &Path) -> Option<String> {
    let mut header = Vec::with_capacity(USERNAME_SCAN_LEN);
    let read = File::open(path).and_then(|f| f.take(USERNAME_SCAN_LEN as u64).read_to_end(&mut header));
    if let Err(e) = read {
        log::debug!("Could not read {} for username: {}", path.display(), e);
        return None;
    }
    extract_username_from_bytes(&header)
}

/// Byte-level username extraction over an in-memory header
pub fn extract_username_from_bytes(data: &[u8]) -> Option<String> {
    let scan = &data[..data.len().min(USERNAME_SCAN_LEN)];
    let stripped: Vec<u8> = scan.iter().copied().filter(|&b| b != 0).collect();

    let captures = username_regex().captures(&stripped)?;
    let prefix = captures.get(1)?.as_bytes();
    if prefix.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(prefix).into_owned())
    }
}

/// Make an extracted username usable inside an output file name
pub fn sanitize_for_filename(username: &str) -> Option<String> {
    let cleaned: String = username
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.chars().all(|c| c == '_') {
        None
    } else {
        Some(cleaned)
    }
}
