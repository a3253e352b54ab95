// ctail - tests/e2e_tail.rs
//
// End-to-end tests for the tail and formatting pipeline.
//
// These tests exercise the real filesystem, real rotation by rename, real
// binary sniffing and the real formatter writing into an in-memory
// terminal. No mocks, no stubs.

use ctail::app::cancel::CancelToken;
use ctail::app::pipe::format_stream;
use ctail::app::session::{run_sessions, SessionEnd};
use ctail::app::sink::{LineSink, MemorySink};
use ctail::app::tail::{PollOutcome, TailEngine};
use ctail::core::model::{DisplayOptions, LogFormat, TailMode, TailOptions};
use ctail::ui::console::Console;
use ctail::ui::formatter::LineFormatter;
use ctail::ui::theme;
use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::Path;
use std::time::{Duration, SystemTime};

// =============================================================================
// Helpers
// =============================================================================

fn tail_options(mode: TailMode) -> TailOptions {
    TailOptions {
        mode,
        poll_interval_ms: 10,
        retry_interval_ms: 100,
        ..Default::default()
    }
}

fn write_aged(path: &Path, content: &[u8], age_secs: u64) {
    fs::write(path, content).unwrap();
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(age_secs))
        .unwrap();
}

fn append(path: &Path, text: &str) {
    File::options()
        .append(true)
        .open(path)
        .unwrap()
        .write_all(text.as_bytes())
        .unwrap();
}

/// Poll until the engine reports `wanted`, with an upper bound on attempts.
fn poll_until(engine: &mut TailEngine, sink: &mut impl LineSink, wanted: PollOutcome) {
    for _ in 0..50 {
        if engine.poll(sink).unwrap() == wanted {
            return;
        }
    }
    panic!("engine never reported {wanted:?}");
}

// =============================================================================
// Rotation
// =============================================================================

/// A logrotate-style rename hands off to the new file exactly once, with no
/// line lost or repeated across the boundary.
#[test]
fn e2e_rename_rotation_loses_and_repeats_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("service.log");
    fs::write(&file, "first\n").unwrap();

    let mut engine = TailEngine::new(&file, tail_options(TailMode::FixedFile));
    let mut sink = MemorySink::new();
    engine.attach(&mut sink).unwrap();
    engine.poll(&mut sink).unwrap();

    append(&file, "second\n");
    fs::rename(&file, dir.path().join("service.log.1")).unwrap();
    append(&dir.path().join("service.log.1"), "late write\n");
    fs::write(&file, "fresh\n").unwrap();

    poll_until(&mut engine, &mut sink, PollOutcome::Rotated);
    engine.poll(&mut sink).unwrap();
    append(&file, "more\n");
    engine.poll(&mut sink).unwrap();

    assert_eq!(
        sink.lines,
        vec!["first\n", "second\n", "late write\n", "fresh\n", "more\n"]
    );
}

/// A session that ends because the target vanished resumes, on retry, at
/// the offset it stopped at once the same file is back.
#[test]
fn e2e_retry_resumes_returning_file_without_replay() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("app.log");
    let aside = dir.path().join("app.log.moved");
    fs::write(&file, "one\n").unwrap();

    let mut engine = TailEngine::new(&file, tail_options(TailMode::FixedFile));
    let mut sink = MemorySink::new();
    engine.attach(&mut sink).unwrap();
    engine.poll(&mut sink).unwrap();

    fs::rename(&file, &aside).unwrap();
    assert_eq!(engine.poll(&mut sink).unwrap(), PollOutcome::Exhausted);

    fs::rename(&aside, &file).unwrap();
    append(&file, "two\n");
    engine.attach(&mut sink).unwrap();
    engine.poll(&mut sink).unwrap();

    assert_eq!(sink.lines, vec!["one\n", "two\n"]);
}

/// Re-attaching to a static file whose stored offset equals its size emits
/// nothing.
#[test]
fn e2e_idempotent_replay() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("static.log");
    fs::write(&file, "a\nb\nc\n").unwrap();

    let mut engine = TailEngine::new(&file, tail_options(TailMode::FixedFile));
    let mut sink = MemorySink::new();
    engine.attach(&mut sink).unwrap();
    engine.poll(&mut sink).unwrap();
    assert_eq!(sink.lines.len(), 3);

    for _ in 0..3 {
        sink.clear();
        engine.attach(&mut sink).unwrap();
        assert_eq!(engine.poll(&mut sink).unwrap(), PollOutcome::NoData);
        assert!(sink.lines.is_empty());
    }
}

// =============================================================================
// Directory mode
// =============================================================================

/// Of three files with increasing mtimes the newest is tailed; when the
/// newest is binary the next one is.
#[test]
fn e2e_newest_text_file_selection() {
    let dir = tempfile::tempdir().unwrap();
    write_aged(&dir.path().join("t1.log"), b"t1\n", 300);
    write_aged(&dir.path().join("t2.log"), b"t2\n", 200);
    write_aged(&dir.path().join("t3.log"), b"t3\n", 100);

    let mut engine = TailEngine::new(dir.path(), tail_options(TailMode::DirectoryNewest));
    let mut sink = MemorySink::new();
    engine.attach(&mut sink).unwrap();
    engine.poll(&mut sink).unwrap();
    assert_eq!(sink.lines, vec!["t3\n"]);

    write_aged(&dir.path().join("t3.log"), b"\0binary", 100);
    sink.clear();
    engine.attach(&mut sink).unwrap();
    engine.poll(&mut sink).unwrap();
    assert_eq!(sink.lines, vec!["t2\n"]);
}

/// A binary file newer than the only text file never wins.
#[test]
fn e2e_binary_file_is_skipped_regardless_of_mtime() {
    let dir = tempfile::tempdir().unwrap();
    write_aged(&dir.path().join("text.log"), b"readable\n", 500);
    write_aged(&dir.path().join("data.bin"), b"abc\0def", 1);

    let mut engine = TailEngine::new(dir.path(), tail_options(TailMode::DirectoryNewest));
    let mut sink = MemorySink::new();
    engine.attach(&mut sink).unwrap();
    engine.poll(&mut sink).unwrap();

    assert_eq!(sink.lines, vec!["readable\n"]);
    assert!(engine.last_target().unwrap().path.ends_with("text.log"));
}

// =============================================================================
// Formatting through the console
// =============================================================================

/// A CiLog line tailed from disk reaches the terminal with all eight fields
/// in order and the level in the error colour.
#[test]
fn e2e_cilog_line_is_formatted_on_the_console() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("ci.log");
    let line = "svc,42,2020-01-01,10:00:00,Error,[Net],500,(timeout) failed\n";
    fs::write(&file, line).unwrap();

    let formatter = LineFormatter::new(DisplayOptions::default());
    assert_eq!(formatter.format_line(line).format, LogFormat::CiLog);

    let mut console = Console::new(Vec::new(), formatter, false);
    let mut engine = TailEngine::new(&file, tail_options(TailMode::FixedFile));
    engine.attach(&mut console).unwrap();
    engine.poll(&mut console).unwrap();

    let out = String::from_utf8(console.into_inner()).unwrap();
    assert!(out.contains(&theme::paint(theme::ERROR, "Error")));
    assert!(out.ends_with('\n'));
    let order = ["svc", "42", "2020-01-01", "10:00:00", "Error", "Net", "500", "timeout"];
    let mut cursor = 0;
    for field in order {
        let found = out[cursor..]
            .find(field)
            .unwrap_or_else(|| panic!("{field} missing or out of order in {out:?}"));
        cursor += found + field.len();
    }
}

/// Piped input is formatted line by line and the event record is decoded.
#[test]
fn e2e_pipe_mode_formats_each_line_once() {
    let input = "0x010001,8,1402300800,session started\nplain words\n";
    let mut console = Console::new(
        Vec::new(),
        LineFormatter::new(DisplayOptions::default()),
        false,
    );
    let n = format_stream(Cursor::new(input), &mut console).unwrap();
    assert_eq!(n, 2);

    let out = String::from_utf8(console.into_inner()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("2014-06-09 17:00:00 "));
    assert!(lines[0].contains("SU/create"));
    assert!(lines[0].contains("info"));
    assert!(lines[0].ends_with("session started"));
    assert_eq!(lines[1], "plain words");
}

// =============================================================================
// Session loop
// =============================================================================

/// Verbose mode prints the open diagnostic and, on cancel, the last target.
#[test]
fn e2e_verbose_session_reports_open_and_last_target() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("app.log");
    fs::write(&file, "hello\n").unwrap();

    let cancel = CancelToken::new();
    let remote = cancel.clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(150));
        remote.cancel();
    });

    let mut console = Console::new(
        Vec::new(),
        LineFormatter::new(DisplayOptions::default()),
        true,
    );
    let mut engine = TailEngine::new(&file, tail_options(TailMode::FixedFile));
    let end = run_sessions(&mut engine, &mut console, &cancel, |c, last| c.interrupted(last))
        .unwrap();
    canceller.join().unwrap();

    assert_eq!(end, SessionEnd::Cancelled);
    let out = String::from_utf8(console.into_inner()).unwrap();
    assert!(out.contains(&format!(">>> Open :{}, size :6", file.display())));
    assert!(out.contains("hello\n"));
    assert!(out.contains(&format!(">>> Last Open :{}", file.display())));
}
