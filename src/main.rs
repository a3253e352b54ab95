// ctail - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config file loading and logging initialisation (debug mode support)
// 3. Pipe mode when stdin is not a terminal
// 4. Ctrl+C wiring and the tail session loop

use clap::Parser;
use ctail::app::cancel::CancelToken;
use ctail::app::tail::TailEngine;
use ctail::app::{pipe, session};
use ctail::core::model::{DisplayOptions, TailOptions};
use ctail::platform::config::{self, AppConfig, CliSwitches};
use ctail::ui::console::Console;
use ctail::ui::formatter::LineFormatter;
use ctail::util;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

/// ctail - tail the newest text log in a directory, surviving rotation,
/// with colourised log formats.
///
/// When stdin is not a terminal, lines read from it are formatted and
/// printed once instead.
#[derive(Parser, Debug)]
#[command(name = "ctail", version, about)]
struct Cli {
    /// File or directory. Without -f the newest text file in its directory
    /// is followed.
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Follow PATH itself instead of the newest file in its directory.
    #[arg(short = 'f')]
    follow: bool,

    /// Keep trying when the target is inaccessible.
    #[arg(short = 'r', long = "retry")]
    retry: bool,

    /// Print `>>>` diagnostics (files opened, skipped, errors).
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Simplified CiLog output without name and id.
    #[arg(long = "simple")]
    simple: bool,

    /// Hide the name field.
    #[arg(short = 'N')]
    skip_name: bool,

    /// Hide the id field.
    #[arg(short = 'I')]
    skip_id: bool,

    /// Hide the date field.
    #[arg(short = 'D')]
    skip_date: bool,

    /// Hide the time field.
    #[arg(short = 'T')]
    skip_time: bool,

    /// Hide the level field.
    #[arg(short = 'L')]
    skip_level: bool,

    /// Hide the section field.
    #[arg(short = 'S')]
    skip_section: bool,

    /// Hide the code field.
    #[arg(short = 'C')]
    skip_code: bool,

    /// Config file (default: config.toml in the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

impl Cli {
    fn switches(&self) -> CliSwitches {
        CliSwitches {
            follow: self.follow,
            retry: self.retry,
            verbose: self.verbose,
            display: DisplayOptions {
                skip_name: self.skip_name,
                skip_id: self.skip_id,
                skip_date: self.skip_date,
                skip_time: self.skip_time,
                skip_level: self.skip_level,
                skip_section: self.skip_section,
                skip_code: self.skip_code,
                simple: self.simple,
            },
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Config is read before logging starts because it may set the level;
    // its warnings are logged once the subscriber is up.
    let config_path = cli.config.clone().or_else(config::default_config_path);
    let (app_config, config_warnings) = match config_path.as_deref() {
        Some(path) => config::load_config(path),
        None => (AppConfig::default(), Vec::new()),
    };

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let switches = cli.switches();
    let display = app_config.display_options(&switches);
    let tail = app_config.tail_options(&switches);

    tracing::info!(
        version = util::constants::APP_VERSION,
        path = %cli.path.display(),
        mode = ?tail.mode,
        retry = tail.retry,
        "ctail starting"
    );

    match run(&cli.path, display, tail) {
        Ok(()) => {}
        // The reader went away (`ctail | head`): nothing left to do.
        Err(e) if e.is_broken_pipe() => {
            tracing::debug!("Output closed");
        }
        Err(e) => {
            tracing::error!(error = %e, "ctail stopped");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(path: &Path, display: DisplayOptions, tail: TailOptions) -> util::error::Result<()> {
    let formatter = LineFormatter::new(display);
    let stdin = io::stdin();

    if !stdin.is_terminal() {
        let mut console = Console::new(io::stdout().lock(), formatter, tail.verbose);
        pipe::format_stream(stdin.lock(), &mut console)?;
        return Ok(());
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        tracing::warn!(error = %e, "Cannot install Ctrl+C handler");
    }

    let mut console = Console::new(io::stdout().lock(), formatter, tail.verbose);
    let mut engine = TailEngine::new(path, tail);
    let end = session::run_sessions(&mut engine, &mut console, &cancel, |console, last| {
        console.interrupted(last)
    })?;

    tracing::debug!(?end, offsets = engine.offsets().len(), "ctail finished");
    Ok(())
}
