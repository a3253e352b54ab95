// ctail - app/pipe.rs
//
// Pipe mode: when stdin is not a terminal, every line read from it is
// formatted and printed once. No tailing, no rotation, no offsets.

use crate::app::sink::LineSink;
use crate::util::error::CtailError;
use std::io::BufRead;
use std::path::PathBuf;

/// Feed every line of `reader` to `sink` until end of input.
///
/// Lines keep their terminators; a final line without one is passed as is.
/// Returns the number of lines forwarded.
pub fn format_stream<R: BufRead, S: LineSink>(
    mut reader: R,
    sink: &mut S,
) -> Result<usize, CtailError> {
    let mut buf: Vec<u8> = Vec::new();
    let mut count = 0usize;

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| CtailError::Io {
                path: PathBuf::from("<stdin>"),
                operation: "read",
                source,
            })?;
        if n == 0 {
            break;
        }
        sink.line(&String::from_utf8_lossy(&buf))
            .map_err(|source| CtailError::Output { source })?;
        count += 1;
    }

    tracing::debug!(lines = count, "Pipe input finished");
    Ok(count)
}
