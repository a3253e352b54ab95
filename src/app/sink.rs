// ctail - app/sink.rs
//
// Output seam between the engine and the presentation layer. The engine
// hands over raw lines and diagnostic messages; the sink decides how they
// are formatted and whether diagnostics are shown at all.

use std::io;

/// Receiver of tailed lines and `>>>` diagnostics.
pub trait LineSink {
    /// One raw line as read from the file, terminator included when present.
    fn line(&mut self, raw: &str) -> io::Result<()>;

    /// A diagnostic message, without the `>>> ` prefix.
    fn diagnostic(&mut self, message: &str) -> io::Result<()>;
}

impl<S: LineSink + ?Sized> LineSink for &mut S {
    fn line(&mut self, raw: &str) -> io::Result<()> {
        (**self).line(raw)
    }

    fn diagnostic(&mut self, message: &str) -> io::Result<()> {
        (**self).diagnostic(message)
    }
}

/// Sink that keeps everything in memory. Used by tests and by callers that
/// drive the engine step by step.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemorySink {
    pub lines: Vec<String>,
    pub diagnostics: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines concatenated, i.e. the bytes the engine consumed.
    pub fn text(&self) -> String {
        self.lines.concat()
    }

    /// Drop everything collected so far.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.diagnostics.clear();
    }
}

impl LineSink for MemorySink {
    fn line(&mut self, raw: &str) -> io::Result<()> {
        self.lines.push(raw.to_string());
        Ok(())
    }

    fn diagnostic(&mut self, message: &str) -> io::Result<()> {
        self.diagnostics.push(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed<S: LineSink>(mut sink: S) {
        sink.line("a\n").unwrap();
        sink.diagnostic("Open :x").unwrap();
    }

    #[test]
    fn test_memory_sink_collects_through_mut_ref() {
        let mut sink = MemorySink::new();
        feed(&mut sink);
        assert_eq!(sink.text(), "a\n");
        assert_eq!(sink.diagnostics, vec!["Open :x".to_string()]);
        sink.clear();
        assert!(sink.lines.is_empty());
    }
}
