// ctail - platform/config.rs
//
// Config file location and config.toml loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance. The file is optional: every value has a
// default, and every problem becomes a warning instead of an error.

use crate::core::model::{DisplayOptions, TailMode, TailOptions};
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Default location of config.toml, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", constants::APP_ID)?;
    let path = dirs.config_dir().join(constants::CONFIG_FILE_NAME);
    tracing::debug!(path = %path.display(), "Default config path resolved");
    Some(path)
}

// =============================================================================
// config.toml shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[display]` section.
    pub display: DisplaySection,
    /// `[tail]` section.
    pub tail: TailSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[display]` config section. Flags are OR-ed with the CLI.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    pub simple: Option<bool>,
    pub skip_name: Option<bool>,
    pub skip_id: Option<bool>,
    pub skip_date: Option<bool>,
    pub skip_time: Option<bool>,
    pub skip_level: Option<bool>,
    pub skip_section: Option<bool>,
    pub skip_code: Option<bool>,
}

/// `[tail]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct TailSection {
    /// Follow the named file instead of the newest file in its directory.
    pub follow: Option<bool>,
    /// Retry whole sessions when the target is inaccessible.
    pub retry: Option<bool>,
    /// Print `>>>` diagnostics.
    pub verbose: Option<bool>,
    pub poll_interval_ms: Option<u64>,
    pub retry_interval_ms: Option<u64>,
    pub initial_tail_bytes: Option<u64>,
    /// Filename globs ignored in directory mode.
    pub exclude_patterns: Option<Vec<String>>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated configuration derived from `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub display: DisplayOptions,
    pub tail: TailOptions,
    /// Follow the named file (applied to `tail.mode` by the CLI layer).
    pub follow: bool,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

/// Switches given on the command line. Each one can only turn a behaviour
/// on; the config file supplies the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CliSwitches {
    pub follow: bool,
    pub retry: bool,
    pub verbose: bool,
    pub display: DisplayOptions,
}

impl AppConfig {
    /// Display options: config flags OR-ed with command-line flags.
    pub fn display_options(&self, cli: &CliSwitches) -> DisplayOptions {
        let (c, d) = (&self.display, &cli.display);
        DisplayOptions {
            skip_name: c.skip_name || d.skip_name,
            skip_id: c.skip_id || d.skip_id,
            skip_date: c.skip_date || d.skip_date,
            skip_time: c.skip_time || d.skip_time,
            skip_level: c.skip_level || d.skip_level,
            skip_section: c.skip_section || d.skip_section,
            skip_code: c.skip_code || d.skip_code,
            simple: c.simple || d.simple,
        }
    }

    /// Tail options: config tunables with the command-line switches applied.
    pub fn tail_options(&self, cli: &CliSwitches) -> TailOptions {
        TailOptions {
            mode: TailMode::from_follow_flag(self.follow || cli.follow),
            retry: self.tail.retry || cli.retry,
            verbose: self.tail.verbose || cli.verbose,
            ..self.tail.clone()
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Load and validate config.toml at `path`.
///
/// Returns the validated config and a list of non-fatal warnings. A missing
/// file yields defaults with no warnings. The warnings are returned rather
/// than logged because logging is configured from this very file.
pub fn load_config(path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !path.exists() {
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: path.to_path_buf(),
                source,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: path.to_path_buf(),
                source,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let config = validate(raw, &mut warnings);
    (config, warnings)
}

/// Apply range checks, accumulating a warning per rejected value.
pub fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    let d = &raw.display;
    config.display = DisplayOptions {
        simple: d.simple.unwrap_or(false),
        skip_name: d.skip_name.unwrap_or(false),
        skip_id: d.skip_id.unwrap_or(false),
        skip_date: d.skip_date.unwrap_or(false),
        skip_time: d.skip_time.unwrap_or(false),
        skip_level: d.skip_level.unwrap_or(false),
        skip_section: d.skip_section.unwrap_or(false),
        skip_code: d.skip_code.unwrap_or(false),
    };

    let t = raw.tail;
    config.follow = t.follow.unwrap_or(false);
    config.tail.retry = t.retry.unwrap_or(false);
    config.tail.verbose = t.verbose.unwrap_or(false);

    if let Some(ms) = t.poll_interval_ms {
        match check_range(
            "tail.poll_interval_ms",
            ms,
            constants::MIN_POLL_INTERVAL_MS,
            constants::MAX_POLL_INTERVAL_MS,
        ) {
            Ok(ms) => config.tail.poll_interval_ms = ms,
            Err(e) => warnings.push(format!(
                "{e}. Using default ({}).",
                constants::DEFAULT_POLL_INTERVAL_MS
            )),
        }
    }

    if let Some(ms) = t.retry_interval_ms {
        match check_range(
            "tail.retry_interval_ms",
            ms,
            constants::MIN_RETRY_INTERVAL_MS,
            constants::MAX_RETRY_INTERVAL_MS,
        ) {
            Ok(ms) => config.tail.retry_interval_ms = ms,
            Err(e) => warnings.push(format!(
                "{e}. Using default ({}).",
                constants::DEFAULT_RETRY_INTERVAL_MS
            )),
        }
    }

    if let Some(bytes) = t.initial_tail_bytes {
        match check_range(
            "tail.initial_tail_bytes",
            bytes,
            0,
            constants::MAX_INITIAL_TAIL_BYTES,
        ) {
            Ok(bytes) => config.tail.initial_tail_bytes = bytes,
            Err(e) => warnings.push(format!(
                "{e}. Using default ({}).",
                constants::DEFAULT_INITIAL_TAIL_BYTES
            )),
        }
    }

    if let Some(patterns) = t.exclude_patterns {
        for pattern in patterns {
            match glob::Pattern::new(&pattern) {
                Ok(_) => config.tail.exclude_patterns.push(pattern),
                Err(e) => warnings.push(format!(
                    "[tail] exclude pattern \"{pattern}\" is invalid ({e}). Ignoring it."
                )),
            }
        }
    }

    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default ({}).",
                constants::DEFAULT_LOG_LEVEL
            ));
        }
    }

    config
}

fn check_range(field: &str, value: u64, min: u64, max: u64) -> Result<u64, ConfigError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::ValueOutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            expected: format!("{min}-{max}"),
        })
    }
}
