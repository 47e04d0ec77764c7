// ---------------------------------------------------------------------------
// SaveError: error type for rule blob encode/decode and file I/O
// ---------------------------------------------------------------------------

use std::fmt;

use parking_rules::BuildingId;

/// Errors that can occur while saving or loading parking rules.
///
/// Any of these rejects the whole load; callers keep their previous rules.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// Bitcode decoding failed (corrupt or invalid payload).
    Decode(String),
    /// The blob does not start with the rule file magic bytes.
    BadMagic,
    /// The blob is shorter than its header says it should be.
    Truncated { needed: usize, found: usize },
    /// Rule blob version is newer than this build supports.
    VersionMismatch { expected_max: u32, found: u32 },
    /// Payload checksum does not match the header.
    ChecksumMismatch { expected: u32, computed: u32 },
    /// Header record count disagrees with the decoded payload.
    CountMismatch { header: u32, decoded: usize },
    /// The same building appears twice in one blob.
    DuplicateBuilding(BuildingId),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::BadMagic => write!(f, "Not a parking rule blob (bad magic bytes)"),
            SaveError::Truncated { needed, found } => write!(
                f,
                "Rule blob is truncated: need {needed} bytes, found {found}"
            ),
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: rules are v{found}, but this build only supports up to v{expected_max}"
            ),
            SaveError::ChecksumMismatch { expected, computed } => write!(
                f,
                "Rule blob is corrupted: checksum mismatch (expected {expected:#010X}, got {computed:#010X})"
            ),
            SaveError::CountMismatch { header, decoded } => write!(
                f,
                "Rule blob header promises {header} records but the payload holds {decoded}"
            ),
            SaveError::DuplicateBuilding(building) => {
                write!(f, "Rule blob lists {building} more than once")
            }
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<bitcode::Error> for SaveError {
    fn from(e: bitcode::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}
