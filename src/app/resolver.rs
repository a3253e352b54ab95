// ctail - app/resolver.rs
//
// Target resolution: turns the user-supplied path and a tail mode into the
// file that should be tailed right now.
//
// Fixed-file mode validates the named file. Directory mode lists the
// containing directory and picks the most recently modified file that is
// not binary. Candidates that disappear or cannot be read while being
// sniffed are skipped, not reported.

use crate::core::discovery::{self, DiscoveredFile};
use crate::core::model::{TailMode, TailTarget};
use crate::platform::fs;
use crate::util::error::ResolveError;
use std::path::Path;

/// Resolve `path` under `mode`. `exclude_patterns` only applies to
/// directory mode.
pub fn resolve(
    path: &Path,
    mode: TailMode,
    exclude_patterns: &[String],
) -> Result<TailTarget, ResolveError> {
    match mode {
        TailMode::FixedFile => resolve_fixed(path),
        TailMode::DirectoryNewest => resolve_newest(path, exclude_patterns),
    }
}

fn resolve_fixed(path: &Path) -> Result<TailTarget, ResolveError> {
    let path = discovery::absolute_path(path);

    let metadata = match std::fs::metadata(&path) {
        Ok(m) if m.is_file() => m,
        _ => return Err(ResolveError::NotFound { path }),
    };

    match fs::is_binary(&path) {
        Ok(false) => {}
        Ok(true) => return Err(ResolveError::NotText { path }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ResolveError::NotFound { path })
        }
        Err(source) => return Err(ResolveError::Inspect { path, source }),
    }

    let identity = fs::identity_of(&metadata);
    tracing::debug!(file = %path.display(), %identity, "Resolved fixed target");
    Ok(TailTarget::new(path, identity, TailMode::FixedFile))
}

fn resolve_newest(path: &Path, exclude_patterns: &[String]) -> Result<TailTarget, ResolveError> {
    let dir = discovery::containing_directory(path);
    let files = discovery::list_files_by_mtime(&dir, exclude_patterns)?;

    files
        .iter()
        .rev()
        .find_map(text_candidate)
        .ok_or(ResolveError::NoTextFiles { dir })
}

/// Target for `file` if it is still present and is text.
fn text_candidate(file: &DiscoveredFile) -> Option<TailTarget> {
    match fs::is_binary(&file.path) {
        Ok(false) => {}
        Ok(true) => {
            tracing::trace!(file = %file.path.display(), "Skipping binary file");
            return None;
        }
        Err(e) => {
            tracing::debug!(file = %file.path.display(), error = %e, "Skipping unreadable file");
            return None;
        }
    }

    match fs::identity_of_path(&file.path) {
        Ok(identity) => {
            tracing::debug!(file = %file.path.display(), %identity, "Resolved newest target");
            Some(TailTarget::new(
                file.path.clone(),
                identity,
                TailMode::DirectoryNewest,
            ))
        }
        Err(e) => {
            tracing::debug!(file = %file.path.display(), error = %e, "Candidate vanished");
            None
        }
    }
}
