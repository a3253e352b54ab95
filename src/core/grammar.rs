// ctail - core/grammar.rs
//
// Line classification: decides which log grammar a line belongs to and
// splits it into that grammar's fields.
//
// Grammars are tried in a fixed order. Each one is a split on a delimiter
// into a fixed number of fields, the last field taking the rest of the line.
// The first grammar that yields its full field count wins; a line no grammar
// accepts is Unrecognized. Lines starting with `0x` are event records and
// never fall through to the text grammars.
//
// Pure logic, no I/O, no colour.

use crate::core::event::{self, EventRecord, EVENT_PREFIX};
use crate::core::model::LogFormat;

/// `name,id,date,time,level,section,code,description`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CiLogLine<'a> {
    pub name: &'a str,
    pub id: &'a str,
    pub date: &'a str,
    pub time: &'a str,
    pub level: &'a str,
    pub section: &'a str,
    pub code: &'a str,
    pub description: &'a str,
}

/// `level date time section description`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleLogLine<'a> {
    pub level: &'a str,
    pub date: &'a str,
    pub time: &'a str,
    pub section: &'a str,
    pub description: &'a str,
}

/// `host ident user [date tz] "method uri version" status bytes [combined]`
///
/// `combined` holds the referrer/user-agent trailer of the combined layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NcsaLine<'a> {
    pub host: &'a str,
    pub ident: &'a str,
    pub user: &'a str,
    pub date: &'a str,
    pub tz: &'a str,
    pub method: &'a str,
    pub uri: &'a str,
    pub version: &'a str,
    pub status: &'a str,
    pub bytes: &'a str,
    pub combined: Option<&'a str>,
}

/// A classified line, borrowing from the input where possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine<'a> {
    Event(EventRecord),
    CiLog(CiLogLine<'a>),
    Simple(SimpleLogLine<'a>),
    NcsaCombined(NcsaLine<'a>),
    Ncsa(NcsaLine<'a>),
    Unrecognized(&'a str),
}

impl LogLine<'_> {
    pub fn format(&self) -> LogFormat {
        match self {
            LogLine::Event(_) => LogFormat::EventLog,
            LogLine::CiLog(_) => LogFormat::CiLog,
            LogLine::Simple(_) => LogFormat::SimpleLog,
            LogLine::NcsaCombined(_) => LogFormat::NcsaCombinedLog,
            LogLine::Ncsa(_) => LogFormat::NcsaLog,
            LogLine::Unrecognized(_) => LogFormat::Unrecognized,
        }
    }
}

/// One parse attempt of the cascade.
type Attempt = fn(&str) -> Option<LogLine<'_>>;

/// Text grammars in priority order.
const TEXT_GRAMMARS: &[Attempt] = &[
    parse_cilog,
    parse_simple,
    parse_ncsa_combined,
    parse_ncsa,
];

const CILOG_FIELDS: usize = 8;
const SIMPLE_FIELDS: usize = 5;
const NCSA_COMBINED_FIELDS: usize = 11;
const NCSA_FIELDS: usize = 10;

/// Classify a line. `line` must not include its terminator.
pub fn classify(line: &str) -> LogLine<'_> {
    if line.starts_with(EVENT_PREFIX) {
        return match event::decode(line) {
            Some(record) => LogLine::Event(record),
            None => LogLine::Unrecognized(line),
        };
    }

    TEXT_GRAMMARS
        .iter()
        .find_map(|attempt| attempt(line))
        .unwrap_or(LogLine::Unrecognized(line))
}

pub fn parse_cilog(line: &str) -> Option<LogLine<'_>> {
    let [name, id, date, time, level, section, code, description] =
        split_fields::<CILOG_FIELDS>(line, ',')?;
    Some(LogLine::CiLog(CiLogLine {
        name,
        id,
        date,
        time,
        level,
        section,
        code,
        description,
    }))
}

pub fn parse_simple(line: &str) -> Option<LogLine<'_>> {
    let [level, date, time, section, description] = split_fields::<SIMPLE_FIELDS>(line, ' ')?;
    Some(LogLine::Simple(SimpleLogLine {
        level,
        date,
        time,
        section,
        description,
    }))
}

pub fn parse_ncsa_combined(line: &str) -> Option<LogLine<'_>> {
    let [host, ident, user, date, tz, method, uri, version, status, bytes, combined] =
        split_fields::<NCSA_COMBINED_FIELDS>(line, ' ')?;
    Some(LogLine::NcsaCombined(NcsaLine {
        host,
        ident,
        user,
        date,
        tz,
        method,
        uri,
        version,
        status,
        bytes,
        combined: Some(combined),
    }))
}

pub fn parse_ncsa(line: &str) -> Option<LogLine<'_>> {
    let [host, ident, user, date, tz, method, uri, version, status, bytes] =
        split_fields::<NCSA_FIELDS>(line, ' ')?;
    Some(LogLine::Ncsa(NcsaLine {
        host,
        ident,
        user,
        date,
        tz,
        method,
        uri,
        version,
        status,
        bytes,
        combined: None,
    }))
}

/// Split into exactly `N` fields; the last one keeps any further delimiters.
fn split_fields<const N: usize>(line: &str, delimiter: char) -> Option<[&str; N]> {
    let mut fields = [""; N];
    let mut parts = line.splitn(N, delimiter);
    for slot in fields.iter_mut() {
        *slot = parts.next()?;
    }
    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_prefix_selects_event_grammar() {
        let line = classify("0x010001,8,1402300800,session started");
        assert_eq!(line.format(), LogFormat::EventLog);
    }

    #[test]
    fn test_short_event_record_is_unrecognized_not_cilog() {
        let line = classify("0x010001,8");
        assert_eq!(line, LogLine::Unrecognized("0x010001,8"));
    }

    #[test]
    fn test_eight_comma_fields_is_cilog() {
        let line = classify("svc,42,2020-01-01,10:00:00,Error,[Net],500,(timeout) failed");
        match line {
            LogLine::CiLog(ci) => {
                assert_eq!(ci.name, "svc");
                assert_eq!(ci.level, "Error");
                assert_eq!(ci.section, "[Net]");
                assert_eq!(ci.description, "(timeout) failed");
            }
            other => panic!("expected CiLog, got {other:?}"),
        }
    }

    #[test]
    fn test_cilog_wins_even_when_spaces_allow_simple() {
        // Enough spaces for the simple grammar, but CiLog is tried first.
        let line = classify("a b,c d,e f,g,h,i,j,k l m n o");
        assert_eq!(line.format(), LogFormat::CiLog);
    }

    #[test]
    fn test_cilog_description_keeps_extra_commas() {
        match classify("n,i,d,t,l,s,c,one, two, three") {
            LogLine::CiLog(ci) => assert_eq!(ci.description, "one, two, three"),
            other => panic!("expected CiLog, got {other:?}"),
        }
    }

    #[test]
    fn test_seven_comma_fields_falls_back() {
        let line = classify("a,b,c,d,e,f,g");
        assert_eq!(line.format(), LogFormat::Unrecognized);
    }

    #[test]
    fn test_simple_log_fields() {
        match classify("INFO 2024-01-15 14:30:22 [main] server started on (8080)") {
            LogLine::Simple(s) => {
                assert_eq!(s.level, "INFO");
                assert_eq!(s.section, "[main]");
                assert_eq!(s.description, "server started on (8080)");
            }
            other => panic!("expected Simple, got {other:?}"),
        }
    }

    #[test]
    fn test_too_few_tokens_is_unrecognized() {
        assert_eq!(
            classify("just four words here").format(),
            LogFormat::Unrecognized
        );
        assert_eq!(classify("").format(), LogFormat::Unrecognized);
    }

    #[test]
    fn test_ncsa_grammars_split_request_parts() {
        let common = r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326"#;
        match parse_ncsa(common) {
            Some(LogLine::Ncsa(n)) => {
                assert_eq!(n.date, "[10/Oct/2000:13:55:36");
                assert_eq!(n.tz, "-0700]");
                assert_eq!(n.method, "\"GET");
                assert_eq!(n.status, "200");
                assert_eq!(n.bytes, "2326");
                assert_eq!(n.combined, None);
            }
            other => panic!("expected Ncsa, got {other:?}"),
        }

        let combined = format!(r#"{common} "http://example.com/" "Mozilla/4.08 [en] (Win98)""#);
        match parse_ncsa_combined(&combined) {
            Some(LogLine::NcsaCombined(n)) => {
                assert_eq!(
                    n.combined,
                    Some(r#""http://example.com/" "Mozilla/4.08 [en] (Win98)""#)
                );
            }
            other => panic!("expected NcsaCombined, got {other:?}"),
        }
        assert!(parse_ncsa_combined(common).is_none());
    }

    #[test]
    fn test_access_log_lines_are_shadowed_by_simple_grammar() {
        // Any line with five or more space-separated tokens satisfies the
        // simple grammar, which sits ahead of both NCSA grammars.
        let common = r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /a.gif HTTP/1.0" 200 2326"#;
        assert_eq!(classify(common).format(), LogFormat::SimpleLog);
    }
}
