// ctail - ui/console.rs
//
// Terminal sink: formats each raw line and writes it out, flushing per line.
// Diagnostics are printed as `>>> message` in the "ok" colour, and only in
// verbose mode.

use crate::app::sink::LineSink;
use crate::core::model::{TailMode, TailTarget};
use crate::ui::formatter::LineFormatter;
use crate::ui::theme::{self, paint};
use std::io::{self, Write};

pub struct Console<W: Write> {
    out: W,
    formatter: LineFormatter,
    verbose: bool,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, formatter: LineFormatter, verbose: bool) -> Self {
        Self {
            out,
            formatter,
            verbose,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Final diagnostic after an interrupt, naming the last opened target.
    ///
    /// Starts on a fresh line so it does not follow the terminal's `^C` echo.
    pub fn interrupted(&mut self, last: Option<&TailTarget>) -> io::Result<()> {
        let Some(target) = last else {
            return Ok(());
        };
        if !self.verbose {
            return Ok(());
        }
        let message = match target.mode {
            TailMode::FixedFile => format!("Last Open :{}", target.path.display()),
            TailMode::DirectoryNewest => format!(
                "Last Open :{} in {}",
                target.path.display(),
                target.directory().display()
            ),
        };
        self.out.write_all(b"\n")?;
        self.diagnostic(&message)
    }
}

impl<W: Write> LineSink for Console<W> {
    fn line(&mut self, raw: &str) -> io::Result<()> {
        let formatted = self.formatter.format_line(raw);
        tracing::trace!(format = formatted.format.label(), "Line formatted");
        self.out.write_all(formatted.text.as_bytes())?;
        self.out.flush()
    }

    fn diagnostic(&mut self, message: &str) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        writeln!(self.out, "{}", paint(theme::OK, &format!(">>> {message}")))?;
        self.out.flush()
    }
}
