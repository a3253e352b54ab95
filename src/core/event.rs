// ctail - core/event.rs
//
// Decoding of hex-coded event records:
//
//   0x<event code>,<level code>,<unix seconds>,<description>
//
// The event code is split into a subsystem (high 16 bits) and, for session
// events, an action (low 16 bits). Fields that do not decode render as an
// empty string; only a record with fewer than four fields is rejected.

use crate::util::constants::{EVENT_TIME_FORMAT, EVENT_TIME_OFFSET_SECS};
use chrono::{DateTime, FixedOffset};

/// Prefix that marks a line as an event record.
pub const EVENT_PREFIX: &str = "0x";

const MAJOR_MASK: u64 = 0xFFFF_0000;
const MINOR_MASK: u64 = 0x0000_FFFF;

/// Subsystem codes.
const EVENT_TYPE_MAJOR: &[(u64, &str)] = &[
    (0x01_0000, "SU"),
    (0x02_0000, "RTSP-L"),
    (0x04_0000, "RTSP-S"),
    (0x08_0000, "SM"),
    (0x10_0000, "FM"),
    (0x20_0000, "FSMP"),
    (0x40_0000, "Global"),
];

/// Subsystem whose events carry a session action in the low bits.
const SESSION_MAJOR: &str = "SU";

const SESSION_EVENT_TYPE: &[(u64, &str)] = &[
    (0x0001, "create"),
    (0x0002, "close"),
    (0x0004, "ff"),
    (0x0008, "rw"),
    (0x0010, "slow"),
    (0x0020, "pause"),
    (0x0040, "play"),
    (0x0080, "teardown"),
    (0x0100, "seek"),
    (0x0200, "usage"),
];

const EVENT_LEVEL: &[(i64, &str)] = &[
    (1, "none"),
    (2, "debug"),
    (4, "report"),
    (8, "info"),
    (16, "success"),
    (32, "warning"),
    (64, "error"),
    (128, "fail"),
    (256, "except"),
];

/// An event record with its codes translated to names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub event: String,
    pub level: String,
    pub datetime: String,
    pub description: String,
}

/// Translate a raw event record line (without terminator).
///
/// Returns `None` when the line does not split into four comma fields.
pub fn decode(line: &str) -> Option<EventRecord> {
    let mut fields = line.splitn(4, ',');
    let event = fields.next()?;
    let level = fields.next()?;
    let datetime = fields.next()?;
    let description = fields.next()?;

    Some(EventRecord {
        event: event_type_name(event).unwrap_or_default(),
        level: level_name(level).unwrap_or_default().to_string(),
        datetime: local_datetime(datetime).unwrap_or_default(),
        description: description.to_string(),
    })
}

/// `SU/create`, `RTSP-L`, ... for a `0x`-prefixed event code.
pub fn event_type_name(raw: &str) -> Option<String> {
    let code = parse_code(raw)?;
    let major = lookup(EVENT_TYPE_MAJOR, code & MAJOR_MASK)?;
    if major == SESSION_MAJOR {
        let minor = lookup(SESSION_EVENT_TYPE, code & MINOR_MASK)?;
        Some(format!("{major}/{minor}"))
    } else {
        Some(major.to_string())
    }
}

/// Level name for a decimal level code.
pub fn level_name(raw: &str) -> Option<&'static str> {
    let code: i64 = raw.trim().parse().ok()?;
    lookup(EVENT_LEVEL, code)
}

/// Render Unix seconds (fractions ignored) in GMT+9.
pub fn local_datetime(raw: &str) -> Option<String> {
    let secs: f64 = raw.trim().parse().ok()?;
    if !secs.is_finite() {
        return None;
    }
    let offset = FixedOffset::east_opt(EVENT_TIME_OFFSET_SECS)?;
    let utc = DateTime::from_timestamp(secs.floor() as i64, 0)?;
    Some(
        utc.with_timezone(&offset)
            .format(EVENT_TIME_FORMAT)
            .to_string(),
    )
}

fn parse_code(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let hex = raw
        .strip_prefix(EVENT_PREFIX)
        .or_else(|| raw.strip_prefix("0X"))?;
    u64::from_str_radix(hex, 16).ok()
}

fn lookup<K: PartialEq + Copy>(table: &[(K, &'static str)], key: K) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, name)| *name)
}
