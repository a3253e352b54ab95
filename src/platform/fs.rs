// ctail - platform/fs.rs
//
// Filesystem helpers with platform-specific behaviour: binary sniffing and
// file identity. Everything else in the crate goes through these so tests can
// rely on a single definition of "binary" and "same file".

use crate::core::model::FileIdentity;
use crate::util::constants::SNIFF_CHUNK_SIZE;
use std::fs::{File, Metadata};
use std::io::{self, Read};
use std::path::Path;

/// Return `true` if the file contains a NUL byte.
///
/// Reads in `SNIFF_CHUNK_SIZE` chunks and stops at the first chunk holding a
/// zero byte, or after a short (final) chunk. Opens its own handle, so the
/// caller's read position is never affected.
pub fn is_binary(path: &Path) -> io::Result<bool> {
    let file = File::open(path)?;
    is_binary_reader(file)
}

/// Reader-based core of [`is_binary`].
pub fn is_binary_reader<R: Read>(mut reader: R) -> io::Result<bool> {
    let mut chunk = [0u8; SNIFF_CHUNK_SIZE];
    loop {
        let n = read_chunk(&mut reader, &mut chunk)?;
        if chunk[..n].contains(&0) {
            return Ok(true);
        }
        if n < SNIFF_CHUNK_SIZE {
            return Ok(false);
        }
    }
}

/// Fill `buf` as far as the reader allows. Returns fewer bytes only at EOF.
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Identity of the file described by `metadata`.
#[cfg(unix)]
pub fn identity_of(metadata: &Metadata) -> FileIdentity {
    use std::os::unix::fs::MetadataExt;
    FileIdentity::new(metadata.dev(), metadata.ino())
}

/// Identity of the file described by `metadata`.
///
/// Without inode numbers the creation time stands in: a replaced file gets a
/// new creation time, a renamed one keeps it.
#[cfg(not(unix))]
pub fn identity_of(metadata: &Metadata) -> FileIdentity {
    let created = metadata
        .created()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    FileIdentity::new(0, created)
}

/// Identity of the file currently at `path` (symlinks followed).
pub fn identity_of_path(path: &Path) -> io::Result<FileIdentity> {
    std::fs::metadata(path).map(|m| identity_of(&m))
}

/// Format a byte count with thousands separators (`1,234,567`).
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
