// ctail - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// These types are the shared vocabulary across all layers.

use std::fmt;
use std::path::{Path, PathBuf};

// =============================================================================
// File identity
// =============================================================================

/// Identifies the storage object behind a path.
///
/// On Unix this is the device ID plus inode number: stable across renames,
/// different once a file is replaced. Two paths with equal identities name
/// the same file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    dev: u64,
    ino: u64,
}

impl FileIdentity {
    /// Create an identity from raw device and inode values.
    pub fn new(dev: u64, ino: u64) -> Self {
        Self { dev, ino }
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.dev, self.ino)
    }
}

// =============================================================================
// Tail target
// =============================================================================

/// How the user-supplied path is turned into the file to tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TailMode {
    /// Follow exactly the named file.
    FixedFile,
    /// Follow whichever text file in the containing directory is newest.
    #[default]
    DirectoryNewest,
}

impl TailMode {
    pub fn from_follow_flag(follow_file: bool) -> Self {
        if follow_file {
            Self::FixedFile
        } else {
            Self::DirectoryNewest
        }
    }
}

/// The file currently selected for tailing.
///
/// Targets are replaced, never mutated, when rotation is detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailTarget {
    pub path: PathBuf,
    pub identity: FileIdentity,
    pub mode: TailMode,
}

impl TailTarget {
    pub fn new(path: PathBuf, identity: FileIdentity, mode: TailMode) -> Self {
        Self {
            path,
            identity,
            mode,
        }
    }

    /// Directory the target lives in, used in directory-mode diagnostics.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Life-cycle states of the tail engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    /// No target open.
    Idle,
    /// A target is open and positioned.
    Attached,
    /// Lines are being read up to EOF.
    Draining,
    /// Handing off from one file to its replacement.
    Rotating,
    /// A read error ended the session.
    Failed,
    /// The target (or its directory) went away; offsets are preserved.
    Exhausted,
}

// =============================================================================
// Log line formats
// =============================================================================

/// Grammar a line was classified under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogFormat {
    /// Hex-coded event record: `0x<event>,<level>,<unix time>,<description>`.
    EventLog,
    /// `name,id,date,time,level,section,code,description`.
    CiLog,
    /// `level date time section description`.
    SimpleLog,
    /// NCSA combined access log (common layout plus referrer/user-agent).
    NcsaCombinedLog,
    /// NCSA common access log.
    NcsaLog,
    /// No grammar matched; the line is printed verbatim.
    Unrecognized,
}

impl LogFormat {
    /// Human-readable label for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            LogFormat::EventLog => "event",
            LogFormat::CiLog => "cilog",
            LogFormat::SimpleLog => "simple",
            LogFormat::NcsaCombinedLog => "ncsa-combined",
            LogFormat::NcsaLog => "ncsa",
            LogFormat::Unrecognized => "raw",
        }
    }
}

/// Output of the formatter for one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedLine {
    pub format: LogFormat,
    /// Display text, including the original line terminator.
    pub text: String,
}

// =============================================================================
// Options
// =============================================================================

/// Field suppression switches consumed by the formatter.
///
/// Each flag removes one field from the joined output; none of them affects
/// which grammar a line is classified under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    pub skip_name: bool,
    pub skip_id: bool,
    pub skip_date: bool,
    pub skip_time: bool,
    pub skip_level: bool,
    pub skip_section: bool,
    pub skip_code: bool,
    /// Drop name and id from CiLog output.
    pub simple: bool,
}

impl DisplayOptions {
    /// Combined date-time groups are dropped only when both halves are.
    pub fn skip_datetime(&self) -> bool {
        self.skip_date && self.skip_time
    }
}

/// Behaviour switches and timings for the tail engine and session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailOptions {
    pub mode: TailMode,
    pub retry: bool,
    pub verbose: bool,
    pub poll_interval_ms: u64,
    pub retry_interval_ms: u64,
    pub initial_tail_bytes: u64,
    /// Filename globs skipped in directory mode.
    pub exclude_patterns: Vec<String>,
}

impl Default for TailOptions {
    fn default() -> Self {
        use crate::util::constants;
        Self {
            mode: TailMode::default(),
            retry: false,
            verbose: false,
            poll_interval_ms: constants::DEFAULT_POLL_INTERVAL_MS,
            retry_interval_ms: constants::DEFAULT_RETRY_INTERVAL_MS,
            initial_tail_bytes: constants::DEFAULT_INITIAL_TAIL_BYTES,
            exclude_patterns: Vec::new(),
        }
    }
}
