// ctail - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Every variant carries the path it concerns so diagnostics can name it.
// Grammar mismatches are not errors and never appear here.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all ctail operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum CtailError {
    /// Target resolution failed.
    Resolve(ResolveError),

    /// Opening or reading the tailed file failed.
    Tail(TailError),

    /// Writing to the output stream failed.
    Output { source: io::Error },

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for CtailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve(e) => write!(f, "Resolve error: {e}"),
            Self::Tail(e) => write!(f, "Tail error: {e}"),
            Self::Output { source } => write!(f, "Output error: {source}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for CtailError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Resolve(e) => Some(e),
            Self::Tail(e) => Some(e),
            Self::Output { source } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolve errors
// ---------------------------------------------------------------------------

/// Reasons a path could not be turned into a tail target.
#[derive(Debug)]
pub enum ResolveError {
    /// The fixed file does not exist or is not a regular file.
    NotFound { path: PathBuf },

    /// The file exists but contains a NUL byte.
    NotText { path: PathBuf },

    /// The directory to scan does not exist.
    DirectoryNotFound { path: PathBuf },

    /// The directory contains no regular, non-binary files.
    NoTextFiles { dir: PathBuf },

    /// A candidate file could not be inspected.
    Inspect { path: PathBuf, source: io::Error },

    /// The directory itself could not be listed.
    Listing {
        dir: PathBuf,
        source: walkdir::Error,
    },
}

impl ResolveError {
    /// Whether this failure should terminate the process instead of ending
    /// the current session. Only OS-level listing failures qualify.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Listing { .. })
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "Not found :{}", path.display()),
            Self::NotText { path } => write!(f, "Not a text file :{}", path.display()),
            Self::DirectoryNotFound { path } => {
                write!(f, "Not found path :{}", path.display())
            }
            Self::NoTextFiles { dir } => {
                write!(f, "Error : No text files in {}", dir.display())
            }
            Self::Inspect { path, source } => {
                write!(f, "Error :{}, {source}", path.display())
            }
            Self::Listing { dir, source } => {
                write!(f, "Cannot list directory '{}': {source}", dir.display())
            }
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Inspect { source, .. } => Some(source),
            Self::Listing { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl CtailError {
    /// Whether this is a write to a closed pipe (`ctail dir | head`).
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Self::Output { source } if source.kind() == io::ErrorKind::BrokenPipe)
    }
}

impl From<ResolveError> for CtailError {
    fn from(e: ResolveError) -> Self {
        Self::Resolve(e)
    }
}

// ---------------------------------------------------------------------------
// Tail errors
// ---------------------------------------------------------------------------

/// Errors raised while a target is attached.
#[derive(Debug)]
pub enum TailError {
    /// The resolved target could not be opened or positioned.
    Open { path: PathBuf, source: io::Error },

    /// Reading from the open handle failed mid-stream.
    Read { path: PathBuf, source: io::Error },

    /// The replacement file vanished between resolution and open.
    RotationRace { path: PathBuf, source: io::Error },

    /// The on-disk path could not be stat'ed for an unexpected reason.
    Stat { path: PathBuf, source: io::Error },
}

impl fmt::Display for TailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "Open Error :{}, {source}", path.display())
            }
            Self::Read { path, source } => {
                write!(f, "Read Error :{}, {source}", path.display())
            }
            Self::RotationRace { path, source } => write!(
                f,
                "Rotated file disappeared during hand-off :{}, {source}",
                path.display()
            ),
            Self::Stat { path, source } => {
                write!(f, "Stat Error :{}, {source}", path.display())
            }
        }
    }
}

impl std::error::Error for TailError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. }
            | Self::Read { source, .. }
            | Self::RotationRace { source, .. }
            | Self::Stat { source, .. } => Some(source),
        }
    }
}

impl From<TailError> for CtailError {
    fn from(e: TailError) -> Self {
        Self::Tail(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
///
/// These never abort the program and never become a `CtailError`: the
/// loader turns them into warnings and falls back to defaults.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for ctail results.
pub type Result<T> = std::result::Result<T, CtailError>;
