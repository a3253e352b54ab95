// ctail - app/session.rs
//
// Session loop: drives the tail engine one session at a time, retrying after
// `retry_interval_ms` when retry mode is on.
//
// Per-session failures (target missing, not text, open or read errors) end
// only the current session; the engine has already reported them to the
// sink. A directory listing failure or an output error ends the loop with
// an error. On cancellation the caller's callback receives the sink and the
// last target that was opened, so it can print a final diagnostic.

use crate::app::cancel::CancelToken;
use crate::app::sink::LineSink;
use crate::app::tail::{RunOutcome, TailEngine};
use crate::core::model::TailTarget;
use crate::util::error::CtailError;
use std::io;
use std::time::Duration;

/// How the session loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The last session ended and retry mode is off.
    Finished,
    /// The cancel token was set.
    Cancelled,
}

/// Run sessions until one ends without retry, or until cancellation.
pub fn run_sessions<S, F>(
    engine: &mut TailEngine,
    sink: &mut S,
    cancel: &CancelToken,
    on_cancel: F,
) -> Result<SessionEnd, CtailError>
where
    S: LineSink,
    F: FnOnce(&mut S, Option<&TailTarget>) -> io::Result<()>,
{
    let retry = engine.options().retry;
    let retry_interval = Duration::from_millis(engine.options().retry_interval_ms);
    let mut session: u64 = 0;

    loop {
        session += 1;
        tracing::debug!(session, "Session starting");

        match engine.run(sink, cancel) {
            Ok(RunOutcome::Cancelled) => break,
            Ok(RunOutcome::Exhausted) => {
                tracing::debug!(session, "Session ended: target exhausted");
            }
            Err(CtailError::Resolve(e)) if !e.is_fatal() => {
                tracing::debug!(session, error = %e, "Session ended: target unavailable");
            }
            Err(CtailError::Tail(e)) => {
                tracing::debug!(session, error = %e, "Session ended: tail error");
            }
            Err(e) => return Err(e),
        }

        if !retry {
            return Ok(SessionEnd::Finished);
        }
        if cancel.sleep(retry_interval) {
            break;
        }
    }

    tracing::debug!(session, "Session loop cancelled");
    on_cancel(sink, engine.last_target()).map_err(|source| CtailError::Output { source })?;
    Ok(SessionEnd::Cancelled)
}
