// ctail - core/discovery.rs
//
// Directory listing for directory mode: the regular files directly inside one
// directory, oldest first.
//
// Architecture note: this module uses `walkdir` for directory traversal as an
// OS abstraction. It reads only file *metadata* (type, mtime), never file
// *contents*; deciding whether a candidate is text is the resolver's job.
//
// Per-entry errors (dangling symlinks, files removed between listing and
// stat) are non-fatal and skipped. Failing to read the directory itself is
// the one fatal outcome.

use crate::util::error::ResolveError;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A regular file found in the scanned directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Directory scanned for a directory-mode path.
///
/// A directory is used as-is; anything else (an existing file or a name that
/// does not exist yet) stands for its parent. Existing paths are resolved
/// through symlinks, so a link to a file selects the directory it points
/// into. Other paths are anchored at the current directory.
pub fn containing_directory(path: &Path) -> PathBuf {
    let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| absolute_path(path));
    if absolute.is_dir() {
        return absolute;
    }
    match absolute.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `path` anchored at the current directory. Symlinks are not resolved.
pub fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            tracing::debug!(error = %e, "Cannot read current directory, keeping relative path");
            path.to_path_buf()
        }
    }
}

/// List the regular files directly inside `dir`, sorted by modification
/// time ascending (the newest file is last).
///
/// Symlinks are followed, so a link to a regular file is listed under the
/// link's name. Files whose name matches one of `exclude_patterns` are left
/// out. Files without a readable mtime sort as oldest.
pub fn list_files_by_mtime(
    dir: &Path,
    exclude_patterns: &[String],
) -> Result<Vec<DiscoveredFile>, ResolveError> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(ResolveError::DirectoryNotFound {
                path: dir.to_path_buf(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ResolveError::DirectoryNotFound {
                path: dir.to_path_buf(),
            })
        }
        // Anything else (permission denied, I/O) surfaces through walkdir
        // below as a listing failure.
        Err(_) => {}
    }

    let exclude = compile_patterns(exclude_patterns);
    let mut files: Vec<DiscoveredFile> = Vec::new();

    let walker = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(ResolveError::Listing {
                    dir: dir.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if exclude.iter().any(|p| p.matches(&file_name)) {
            tracing::trace!(file = %file_name, "Excluded by pattern");
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(
                    file = %entry.path().display(),
                    error = %e,
                    "Cannot read metadata, skipping"
                );
                continue;
            }
        };

        files.push(DiscoveredFile {
            path: entry.path().to_path_buf(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }

    files.sort_by_key(|f| f.modified);

    tracing::trace!(dir = %dir.display(), files = files.len(), "Directory listed");
    Ok(files)
}

/// Compile filename globs; patterns that fail to compile are logged and
/// skipped.
fn compile_patterns(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, error = %e, "Invalid exclude pattern, skipping");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;

    fn touch(path: &Path, content: &str, age_secs: u64) {
        fs::write(path, content).unwrap();
        let mtime = SystemTime::now() - Duration::from_secs(age_secs);
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
    }

    #[test]
    fn test_files_sorted_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.log"), "b", 10);
        touch(&dir.path().join("a.log"), "a", 30);
        touch(&dir.path().join("c.log"), "c", 1);

        let files = list_files_by_mtime(dir.path(), &[]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.log", "b.log", "c.log"]);
    }

    #[test]
    fn test_subdirectories_are_not_listed_or_descended() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("old")).unwrap();
        fs::write(dir.path().join("old").join("nested.log"), "x").unwrap();
        fs::write(dir.path().join("top.log"), "y").unwrap();

        let files = list_files_by_mtime(dir.path(), &[]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("top.log"));
    }

    #[test]
    fn test_exclude_patterns_filter_by_filename() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.log"), "x").unwrap();
        fs::write(dir.path().join("app.log.gz"), "y").unwrap();

        let files = list_files_by_mtime(dir.path(), &["*.gz".to_string()]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("app.log"));
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_files_by_mtime(&dir.path().join("gone"), &[]).unwrap_err();
        assert!(matches!(err, ResolveError::DirectoryNotFound { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_containing_directory_of_file_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("app.log");
        fs::write(&file, "x").unwrap();

        let real = fs::canonicalize(dir.path()).unwrap();
        assert_eq!(containing_directory(dir.path()), real);
        assert_eq!(containing_directory(&file), real);
        // A name that does not exist yet still maps to its parent.
        assert_eq!(containing_directory(&dir.path().join("later.log")), dir.path());
    }

    #[test]
    fn test_containing_directory_anchors_relative_paths() {
        let resolved = containing_directory(Path::new("."));
        assert!(resolved.is_absolute());
    }

    #[cfg(unix)]
    #[test]
    fn test_containing_directory_follows_file_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let links = dir.path().join("links");
        fs::create_dir(&logs).unwrap();
        fs::create_dir(&links).unwrap();
        fs::write(logs.join("app.log"), "x").unwrap();
        let link = links.join("current.log");
        std::os::unix::fs::symlink(logs.join("app.log"), &link).unwrap();

        assert_eq!(containing_directory(&link), fs::canonicalize(&logs).unwrap());
        // A dangling link falls back to the directory holding the link.
        let dangling = links.join("gone.log");
        std::os::unix::fs::symlink(logs.join("missing.log"), &dangling).unwrap();
        assert_eq!(containing_directory(&dangling), links);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_file_is_listed_and_dangling_link_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("real.log");
        fs::write(&target, "x").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("link.log")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("dangling.log"))
            .unwrap();

        let files = list_files_by_mtime(dir.path(), &[]).unwrap();
        let mut names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["link.log", "real.log"]);
    }
}
