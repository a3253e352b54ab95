// ctail - ui/formatter.rs
//
// Turns a classified line into its colourised display form.
//
// Colour decisions are made on every field first; suppressed fields are then
// left out of the join entirely (not blanked). Suppression never changes the
// grammar a line was classified under. A line that matched nothing is
// returned byte-for-byte, so output is all-or-nothing per line.

use crate::core::event::EventRecord;
use crate::core::grammar::{self, CiLogLine, LogLine, NcsaLine, SimpleLogLine};
use crate::core::model::{DisplayOptions, FormattedLine};
use crate::ui::theme::{self, paint};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// CiLog levels shown in the error colour (case-sensitive).
const CILOG_ERROR_LEVELS: &[&str] = &[
    "Error",
    "Fail",
    "Warning",
    "Exception",
    "error",
    "warning",
    "critical",
];

/// Simple-log levels shown in the error colour (case-sensitive).
const SIMPLE_ERROR_LEVELS: &[&str] = &[
    "Error",
    "Fail",
    "Warning",
    "Exception",
    "ERROR",
    "FAIL",
    "error",
    "warning",
    "critical",
];

/// Decoded event levels shown in the alert colour.
const EVENT_ALERT_LEVELS: &[&str] = &["error", "fail", "warning", "except"];

/// Formats raw lines according to a fixed set of display options.
#[derive(Debug, Clone, Default)]
pub struct LineFormatter {
    options: DisplayOptions,
}

impl LineFormatter {
    pub fn new(options: DisplayOptions) -> Self {
        Self { options }
    }

    /// Classify and render one raw line.
    ///
    /// The terminator (`\n` or `\r\n`) is split off first and re-appended
    /// unchanged, so it never ends up inside a colour sequence.
    pub fn format_line(&self, raw: &str) -> FormattedLine {
        let (body, terminator) = split_terminator(raw);
        let line = grammar::classify(body);
        let format = line.format();

        let mut text = self.render(&line);
        text.push_str(terminator);
        FormattedLine { format, text }
    }

    /// Render an already-classified line without terminator.
    pub fn render(&self, line: &LogLine<'_>) -> String {
        match line {
            LogLine::Event(record) => self.render_event(record),
            LogLine::CiLog(ci) => self.render_cilog(ci),
            LogLine::Simple(simple) => self.render_simple(simple),
            LogLine::NcsaCombined(ncsa) | LogLine::Ncsa(ncsa) => self.render_ncsa(ncsa),
            LogLine::Unrecognized(raw) => (*raw).to_string(),
        }
    }

    fn render_event(&self, record: &EventRecord) -> String {
        let opts = &self.options;
        let level_colour = if EVENT_ALERT_LEVELS.contains(&record.level.as_str()) {
            theme::PINK_BOLD
        } else {
            theme::BLUE
        };
        let description = decorate_values(
            &decorate(event_keyword_re(), &record.description, ""),
            "",
        );

        Assembly::new(" ")
            .field(record.datetime.clone(), opts.skip_datetime())
            .field(paint(theme::GREEN, &record.event), false)
            .field(paint(level_colour, &record.level), opts.skip_level)
            .field(description, false)
            .join()
    }

    fn render_cilog(&self, ci: &CiLogLine<'_>) -> String {
        let opts = &self.options;
        let level_colour = if CILOG_ERROR_LEVELS.contains(&ci.level) {
            theme::ERROR
        } else {
            theme::LEVEL
        };
        let section = paint(theme::SECTION, &decorate_keywords(ci.section, ""));
        let description = paint(theme::DESCRIPTION, &decorate_description(ci.description));

        Assembly::new(",")
            .field(paint(theme::NAME, ci.name), opts.skip_name || opts.simple)
            .field(paint(theme::ID, ci.id), opts.skip_id || opts.simple)
            .field(paint(theme::DATE, ci.date), opts.skip_date)
            .field(paint(theme::TIME, ci.time), opts.skip_time)
            .field(paint(level_colour, ci.level), opts.skip_level)
            .field(section, opts.skip_section)
            .field(paint(theme::CODE, ci.code), opts.skip_code)
            .field(description, false)
            .join()
    }

    fn render_simple(&self, simple: &SimpleLogLine<'_>) -> String {
        let opts = &self.options;
        let level_colour = if SIMPLE_ERROR_LEVELS.contains(&simple.level) {
            theme::ERROR
        } else {
            theme::LEVEL
        };
        let section = paint(theme::SECTION, &decorate_keywords(simple.section, ""));
        let description = paint(
            theme::DESCRIPTION,
            &decorate_description(simple.description),
        );

        Assembly::new(" ")
            .field(paint(level_colour, simple.level), opts.skip_level)
            .field(paint(theme::DATE, simple.date), opts.skip_date)
            .field(paint(theme::TIME, simple.time), opts.skip_time)
            .field(section, opts.skip_section)
            .field(description, false)
            .join()
    }

    fn render_ncsa(&self, ncsa: &NcsaLine<'_>) -> String {
        let datetime = format!("{} {}", ncsa.date, ncsa.tz);
        let request = format!("{} {} {}", ncsa.method, ncsa.uri, ncsa.version);

        let mut assembly = Assembly::new(" ")
            .field(ncsa.host.to_string(), false)
            .field(ncsa.ident.to_string(), false)
            .field(ncsa.user.to_string(), false)
            .field(paint(theme::DATE, &datetime), self.options.skip_datetime())
            .field(paint(theme::GREEN, &request), false)
            .field(paint(theme::BLUE, ncsa.status), false)
            .field(ncsa.bytes.to_string(), false);
        if let Some(combined) = ncsa.combined {
            assembly = assembly.field(combined.to_string(), false);
        }
        assembly.join()
    }
}

// =============================================================================
// Assembly
// =============================================================================

/// Ordered field list where suppressed fields are dropped before joining.
struct Assembly {
    separator: &'static str,
    fields: Vec<String>,
}

impl Assembly {
    fn new(separator: &'static str) -> Self {
        Self {
            separator,
            fields: Vec::with_capacity(8),
        }
    }

    fn field(mut self, value: String, suppressed: bool) -> Self {
        if !suppressed {
            self.fields.push(value);
        }
        self
    }

    fn join(self) -> String {
        self.fields.join(self.separator)
    }
}

// =============================================================================
// Inline decoration
// =============================================================================

fn keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]*)\]").expect("keyword regex"))
}

/// Event descriptions stop a keyword at the first `(`, so `[a(b)]` is left
/// to the value decoration.
fn event_keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\](]*)\]").expect("event keyword regex"))
}

fn value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]*)\)").expect("value regex"))
}

/// Colour the inside of every `[...]`. `resume` is re-applied after the
/// reset so the surrounding text keeps its colour.
fn decorate_keywords(text: &str, resume: &str) -> String {
    decorate(keyword_re(), text, resume)
}

/// Colour the inside of every `[...]` matched by `re`.
fn decorate(re: &Regex, text: &str, resume: &str) -> String {
    re.replace_all(text, |caps: &Captures<'_>| {
        format!("[{}{}{}{resume}]", theme::KEYWORD, &caps[1], theme::RESET)
    })
    .into_owned()
}

/// Colour the inside of every `(...)`.
fn decorate_values(text: &str, resume: &str) -> String {
    value_re()
        .replace_all(text, |caps: &Captures<'_>| {
            format!("({}{}{}{resume})", theme::VALUE, &caps[1], theme::RESET)
        })
        .into_owned()
}

fn decorate_description(text: &str) -> String {
    decorate_values(
        &decorate_keywords(text, theme::DESCRIPTION),
        theme::DESCRIPTION,
    )
}

/// Split a raw line into body and terminator.
fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(body) = raw.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = raw.strip_suffix('\n') {
        (body, "\n")
    } else {
        (raw, "")
    }
}
