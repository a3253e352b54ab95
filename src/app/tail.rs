// ctail - app/tail.rs
//
// Rotation-aware tail engine.
//
// Architecture:
//   - `attach` resolves the target, opens it and positions the read cursor:
//     a stored offset is resumed exactly; a never-seen file on the first
//     attach of a session starts near its end at a line boundary.
//   - `poll` reads to EOF, hands complete lines to the sink, then checks the
//     on-disk path for rotation (identity change), disappearance, or
//     in-place truncation.
//   - `run` loops `poll` with an interruptible sleep until the target goes
//     away or the cancel token is set.
//
// Offsets: the store holds the consumed offset of every file this process
// has let go of. Attaching takes the entry out; relinquishing (rotation,
// exhaustion, read failure, cancel) puts it back. Bytes after the last
// newline are held in a pending buffer and do not count as consumed until
// their newline arrives, so a resume never splits a line.
//
// Encoding: lines are decoded as lossy UTF-8, one complete line at a time.

use crate::app::cancel::CancelToken;
use crate::app::resolver;
use crate::app::sink::LineSink;
use crate::core::model::{TailMode, TailOptions, TailState, TailTarget};
use crate::core::offsets::OffsetStore;
use crate::platform::fs::{self, group_thousands};
use crate::util::constants::{MAX_PENDING_LINE_BYTES, READ_CHUNK_BYTES};
use crate::util::error::{CtailError, ResolveError, TailError};
use std::fmt::Display;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Public types
// =============================================================================

/// What a single `poll` observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// EOF with nothing new; the caller should sleep before polling again.
    NoData,
    /// New bytes were read, `lines` of them completed a line.
    Data { lines: usize },
    /// The file shrank below the read position and is re-read from 0.
    Rewound,
    /// The target was handed off to a different file.
    Rotated,
    /// The target (or its directory) went away. Offsets are kept.
    Exhausted,
}

/// How `run` ended when no error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Exhausted,
    Cancelled,
}

/// The file the engine currently holds open.
struct OpenFile {
    target: TailTarget,
    file: File,
    /// Bytes up to and including the last emitted newline.
    consumed: u64,
    /// Bytes read after the last newline.
    pending: Vec<u8>,
    /// Still skipping the partial line found at the initial seek position.
    discarding: bool,
}

// =============================================================================
// Engine
// =============================================================================

pub struct TailEngine {
    path: PathBuf,
    options: TailOptions,
    offsets: OffsetStore,
    state: TailState,
    open: Option<OpenFile>,
    last_target: Option<TailTarget>,
}

impl TailEngine {
    /// Engine for the user-supplied `path`. Nothing is opened until `attach`.
    pub fn new(path: impl Into<PathBuf>, options: TailOptions) -> Self {
        Self {
            path: path.into(),
            options,
            offsets: OffsetStore::new(),
            state: TailState::Idle,
            open: None,
            last_target: None,
        }
    }

    pub fn options(&self) -> &TailOptions {
        &self.options
    }

    pub fn state(&self) -> TailState {
        self.state
    }

    pub fn offsets(&self) -> &OffsetStore {
        &self.offsets
    }

    /// Target currently open, if any.
    pub fn current_target(&self) -> Option<&TailTarget> {
        self.open.as_ref().map(|o| &o.target)
    }

    /// Last target successfully opened in this process, even if since closed.
    pub fn last_target(&self) -> Option<&TailTarget> {
        self.last_target.as_ref()
    }

    /// Start a session: resolve the target and open it.
    ///
    /// Any file still held from a previous session is released first.
    /// Resolution and open failures are reported to the sink and returned.
    pub fn attach<S: LineSink>(&mut self, sink: &mut S) -> Result<(), CtailError> {
        self.release();

        let target = match resolver::resolve(
            &self.path,
            self.options.mode,
            &self.options.exclude_patterns,
        ) {
            Ok(t) => t,
            Err(e) => {
                report(sink, &e)?;
                return Err(e.into());
            }
        };
        self.open_target(target, true, sink)
    }

    /// Read everything new, then check the target for rotation.
    pub fn poll<S: LineSink>(&mut self, sink: &mut S) -> Result<PollOutcome, CtailError> {
        let Some(open) = self.open.as_mut() else {
            return Ok(PollOutcome::Exhausted);
        };

        self.state = TailState::Draining;
        let drained = open.drain(sink);
        let (bytes, lines) = match drained {
            Ok(v) => v,
            Err(CtailError::Tail(err)) => return self.fail(err, sink),
            Err(e) => return Err(e),
        };
        self.state = TailState::Attached;

        let checked = match self.options.mode {
            TailMode::FixedFile => self.check_fixed(sink)?,
            TailMode::DirectoryNewest => self.check_directory(sink)?,
        };
        if let Some(outcome) = checked {
            return Ok(outcome);
        }

        if bytes > 0 {
            tracing::trace!(bytes, lines, "Tail: new data");
            Ok(PollOutcome::Data { lines })
        } else {
            Ok(PollOutcome::NoData)
        }
    }

    /// Run one session: attach, then poll until the target goes away or
    /// `cancel` is set.
    pub fn run<S: LineSink>(
        &mut self,
        sink: &mut S,
        cancel: &CancelToken,
    ) -> Result<RunOutcome, CtailError> {
        if cancel.is_cancelled() {
            return Ok(RunOutcome::Cancelled);
        }
        self.attach(sink)?;

        let interval = Duration::from_millis(self.options.poll_interval_ms);
        loop {
            if cancel.is_cancelled() {
                self.release();
                return Ok(RunOutcome::Cancelled);
            }
            match self.poll(sink)? {
                PollOutcome::Exhausted => return Ok(RunOutcome::Exhausted),
                PollOutcome::NoData => {
                    if cancel.sleep(interval) {
                        self.release();
                        return Ok(RunOutcome::Cancelled);
                    }
                }
                PollOutcome::Data { .. } | PollOutcome::Rewound | PollOutcome::Rotated => {}
            }
        }
    }

    /// Close the current file, storing its consumed offset. A pending
    /// fragment is not emitted; it is re-read on the next attach.
    pub fn release(&mut self) {
        if let Some(open) = self.open.take() {
            tracing::debug!(
                file = %open.target.path.display(),
                offset = open.consumed,
                "Tail: released"
            );
            self.offsets.put(open.target.identity, open.consumed);
        }
        self.state = TailState::Idle;
    }

    // -------------------------------------------------------------------------
    // Attach
    // -------------------------------------------------------------------------

    /// Open `target` and position the cursor. `initial` is true for the first
    /// attach of a session and enables the near-the-end start.
    fn open_target<S: LineSink>(
        &mut self,
        target: TailTarget,
        initial: bool,
        sink: &mut S,
    ) -> Result<(), CtailError> {
        let mut file = match File::open(&target.path) {
            Ok(f) => f,
            Err(source) => {
                let path = target.path.clone();
                let err = if initial {
                    TailError::Open { path, source }
                } else {
                    TailError::RotationRace { path, source }
                };
                return self.fail(err, sink).map(|_| ());
            }
        };

        // Identity and size come from the handle: the path may have been
        // replaced again since it was resolved.
        let metadata = match file.metadata() {
            Ok(m) => m,
            Err(source) => {
                let err = TailError::Open {
                    path: target.path.clone(),
                    source,
                };
                return self.fail(err, sink).map(|_| ());
            }
        };
        let identity = fs::identity_of(&metadata);
        let size = metadata.len();
        let target = TailTarget::new(target.path, identity, target.mode);

        let window = self.options.initial_tail_bytes;
        let (start, discarding) = match self.offsets.take(&identity) {
            Some(offset) if offset <= size => (offset, false),
            Some(offset) => {
                tracing::info!(
                    file = %target.path.display(),
                    offset,
                    size,
                    "Tail: stored offset is past EOF, starting over"
                );
                (0, false)
            }
            // One byte before the window so a line starting exactly at the
            // window edge is kept whole.
            None if initial && size > window => (size - window - 1, true),
            None => (0, false),
        };

        if let Err(source) = file.seek(SeekFrom::Start(start)) {
            let err = TailError::Open {
                path: target.path.clone(),
                source,
            };
            return self.fail(err, sink).map(|_| ());
        }

        let opened = match target.mode {
            TailMode::FixedFile => format!(
                "Open :{}, size :{}",
                target.path.display(),
                group_thousands(size)
            ),
            TailMode::DirectoryNewest => format!(
                "Open :{} in {}, size :{}",
                target.path.display(),
                target.directory().display(),
                group_thousands(size)
            ),
        };
        report(sink, &opened)?;

        tracing::info!(
            file = %target.path.display(),
            %identity,
            size,
            start,
            "Tail: attached"
        );

        self.last_target = Some(target.clone());
        self.open = Some(OpenFile {
            target,
            file,
            consumed: start,
            pending: Vec::new(),
            discarding,
        });
        self.state = TailState::Attached;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Rotation checks
    // -------------------------------------------------------------------------

    /// Fixed-file mode: compare the identity behind the path with the open
    /// file's.
    fn check_fixed<S: LineSink>(
        &mut self,
        sink: &mut S,
    ) -> Result<Option<PollOutcome>, CtailError> {
        let Some(open) = self.open.as_ref() else {
            return Ok(Some(PollOutcome::Exhausted));
        };
        let path = open.target.path.clone();
        let identity = open.target.identity;
        let position = open.position();

        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                report(sink, &ResolveError::NotFound { path })?;
                self.exhaust(sink)?;
                return Ok(Some(PollOutcome::Exhausted));
            }
            Err(source) => {
                return self
                    .fail(TailError::Stat { path, source }, sink)
                    .map(Some)
            }
        };

        if fs::identity_of(&metadata) == identity {
            if metadata.len() < position {
                return self.rewind(metadata.len(), sink).map(Some);
            }
            return Ok(None);
        }

        match resolver::resolve(&path, TailMode::FixedFile, &[]) {
            Ok(next) => {
                self.hand_off(next, sink)?;
                Ok(Some(PollOutcome::Rotated))
            }
            Err(e) => {
                report(sink, &e)?;
                self.exhaust(sink)?;
                Ok(Some(PollOutcome::Exhausted))
            }
        }
    }

    /// Directory mode: repeat the newest-file scan and hand off whenever it
    /// names a different file (by path or by identity).
    fn check_directory<S: LineSink>(
        &mut self,
        sink: &mut S,
    ) -> Result<Option<PollOutcome>, CtailError> {
        let Some(open) = self.open.as_ref() else {
            return Ok(Some(PollOutcome::Exhausted));
        };

        let next = match resolver::resolve(
            &self.path,
            TailMode::DirectoryNewest,
            &self.options.exclude_patterns,
        ) {
            Ok(t) => t,
            Err(e) if e.is_fatal() => {
                self.exhaust(sink)?;
                return Err(e.into());
            }
            Err(e) => {
                report(sink, &e)?;
                self.exhaust(sink)?;
                return Ok(Some(PollOutcome::Exhausted));
            }
        };

        if next.path != open.target.path || next.identity != open.target.identity {
            self.hand_off(next, sink)?;
            return Ok(Some(PollOutcome::Rotated));
        }

        let position = open.position();
        let size = match open.file.metadata() {
            Ok(m) => m.len(),
            Err(source) => {
                let path = open.target.path.clone();
                return self
                    .fail(TailError::Stat { path, source }, sink)
                    .map(Some);
            }
        };
        if size < position {
            return self.rewind(size, sink).map(Some);
        }
        Ok(None)
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Finish the old file and attach to `next`, resuming any stored offset.
    fn hand_off<S: LineSink>(&mut self, next: TailTarget, sink: &mut S) -> Result<(), CtailError> {
        self.state = TailState::Rotating;

        if let Some(mut old) = self.open.take() {
            // Pick up anything written between the last drain and the
            // rotation; the old handle still reads the old file.
            match old.drain(sink) {
                Ok(_) => {}
                Err(CtailError::Tail(e)) => {
                    tracing::debug!(error = %e, "Tail: final read of rotated file failed");
                }
                Err(e) => return Err(e),
            }
            old.flush_pending(sink)?;
            tracing::info!(
                from = %old.target.path.display(),
                to = %next.path.display(),
                offset = old.consumed,
                "Tail: rotation detected, handing off"
            );
            self.offsets.put(old.target.identity, old.consumed);
        }

        self.open_target(next, false, sink)
    }

    /// The target went away: emit any pending fragment, keep the offset, close.
    fn exhaust<S: LineSink>(&mut self, sink: &mut S) -> Result<(), CtailError> {
        if let Some(mut open) = self.open.take() {
            let flushed = open.flush_pending(sink);
            self.offsets.put(open.target.identity, open.consumed);
            tracing::info!(
                file = %open.target.path.display(),
                offset = open.consumed,
                "Tail: target exhausted"
            );
            flushed?;
        }
        self.state = TailState::Exhausted;
        Ok(())
    }

    /// End the session on an I/O error, keeping the last consumed offset.
    fn fail<S: LineSink>(&mut self, err: TailError, sink: &mut S) -> Result<PollOutcome, CtailError> {
        if let Some(open) = self.open.take() {
            self.offsets.put(open.target.identity, open.consumed);
        }
        self.state = TailState::Failed;
        tracing::warn!(error = %err, "Tail: session failed");
        report(sink, &err)?;
        Err(err.into())
    }

    /// The open file shrank below the read position: start it over.
    fn rewind<S: LineSink>(&mut self, size: u64, sink: &mut S) -> Result<PollOutcome, CtailError> {
        let Some(open) = self.open.as_mut() else {
            return Ok(PollOutcome::Exhausted);
        };
        tracing::info!(
            file = %open.target.path.display(),
            old_offset = open.position(),
            new_size = size,
            "Tail: file truncated, rewinding to 0"
        );
        if let Err(source) = open.file.seek(SeekFrom::Start(0)) {
            let path = open.target.path.clone();
            return self.fail(TailError::Read { path, source }, sink);
        }
        open.consumed = 0;
        open.pending.clear();
        open.discarding = false;
        Ok(PollOutcome::Rewound)
    }
}

// =============================================================================
// Reading
// =============================================================================

impl OpenFile {
    /// Byte position of the handle.
    fn position(&self) -> u64 {
        self.consumed + self.pending.len() as u64
    }

    /// Read to EOF. Returns bytes read and complete lines emitted.
    fn drain<S: LineSink>(&mut self, sink: &mut S) -> Result<(u64, usize), CtailError> {
        let mut buf = vec![0u8; READ_CHUNK_BYTES];
        let mut bytes = 0u64;
        let mut lines = 0usize;
        loop {
            let n = match self.file.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(TailError::Read {
                        path: self.target.path.clone(),
                        source,
                    }
                    .into())
                }
            };
            bytes += n as u64;
            lines += self.absorb(&buf[..n], sink)?;
        }
        Ok((bytes, lines))
    }

    /// Split freshly read bytes into lines and emit the complete ones.
    fn absorb<S: LineSink>(&mut self, mut data: &[u8], sink: &mut S) -> Result<usize, CtailError> {
        if self.discarding {
            match data.iter().position(|&b| b == b'\n') {
                Some(i) => {
                    self.consumed += (i + 1) as u64;
                    data = &data[i + 1..];
                    self.discarding = false;
                }
                None => {
                    self.consumed += data.len() as u64;
                    return Ok(0);
                }
            }
        }

        let mut lines = 0;
        while let Some(i) = data.iter().position(|&b| b == b'\n') {
            let (line, rest) = data.split_at(i + 1);
            if self.pending.is_empty() {
                emit(sink, line)?;
                self.consumed += line.len() as u64;
            } else {
                self.pending.extend_from_slice(line);
                emit(sink, &self.pending)?;
                self.consumed += self.pending.len() as u64;
                self.pending.clear();
            }
            lines += 1;
            data = rest;
        }

        self.pending.extend_from_slice(data);
        if self.pending.len() > MAX_PENDING_LINE_BYTES {
            tracing::warn!(
                file = %self.target.path.display(),
                bytes = self.pending.len(),
                "Tail: unterminated line too long, emitting as is"
            );
            self.flush_pending(sink)?;
            lines += 1;
        }
        Ok(lines)
    }

    /// Emit a held fragment as a line of its own.
    fn flush_pending<S: LineSink>(&mut self, sink: &mut S) -> Result<(), CtailError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        emit(sink, &self.pending)?;
        self.consumed += self.pending.len() as u64;
        self.pending.clear();
        Ok(())
    }
}

fn emit<S: LineSink>(sink: &mut S, bytes: &[u8]) -> Result<(), CtailError> {
    sink.line(&String::from_utf8_lossy(bytes))
        .map_err(|source| CtailError::Output { source })
}

fn report<S: LineSink>(sink: &mut S, message: &dyn Display) -> Result<(), CtailError> {
    sink.diagnostic(&message.to_string())
        .map_err(|source| CtailError::Output { source })
}
