//! Console logging for the CLI.
//!
//! Commands speak through the `log` facade; this logger turns info records
//! into bare stdout lines so command output reads like plain printing, keeps
//! per-file library chatter off the terminal unless `--verbose` asks for it,
//! and optionally mirrors every line to a logfile with ANSI codes stripped.
//! While a progress bar is registered, lines route through it so the bar
//! redraws below them instead of tearing.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use indicatif::ProgressBar;
use log::{Level, LevelFilter, Log, Metadata, Record};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::error::CliError;

pub(crate) struct CliLogger {
    /// Level for records from this binary.
    cli_level: LevelFilter,
    /// Level for records from the library crates.
    lib_level: LevelFilter,
    verbose: bool,
    file: Option<Mutex<File>>,
    bar: Mutex<Option<ProgressBar>>,
}

impl CliLogger {
    /// Install the logger. `quiet` keeps only warnings and errors; `verbose`
    /// shows timestamped debug records from every crate.
    pub fn init(
        quiet: bool,
        verbose: bool,
        logfile: Option<&Path>,
    ) -> Result<&'static CliLogger, CliError> {
        let cli_level = match (quiet, verbose) {
            (true, _) => LevelFilter::Warn,
            (_, true) => LevelFilter::Debug,
            _ => LevelFilter::Info,
        };
        let lib_level = if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        };

        let file = match logfile {
            Some(path) => Some(Mutex::new(File::create(path)?)),
            None => None,
        };

        let logger: &'static CliLogger = Box::leak(Box::new(CliLogger {
            cli_level,
            lib_level,
            verbose,
            file,
            bar: Mutex::new(None),
        }));
        log::set_logger(logger).map_err(|e| CliError::config(format!("logger init: {e}")))?;
        log::set_max_level(cli_level.max(lib_level));
        Ok(logger)
    }

    /// Route console lines through `bar` while it is drawing; `None`
    /// restores direct printing.
    pub fn set_bar(&self, bar: Option<ProgressBar>) {
        if let Ok(mut slot) = self.bar.lock() {
            *slot = bar;
        }
    }

    fn level_for(&self, target: &str) -> LevelFilter {
        if target.starts_with("texsift_cli") {
            self.cli_level
        } else {
            self.lib_level
        }
    }

    fn render(&self, record: &Record) -> String {
        if self.verbose {
            return format!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args(),
            );
        }
        match record.level() {
            Level::Warn => format!(
                "{} {}",
                "warning:".if_supports_color(Stderr, |t| t.yellow()),
                record.args(),
            ),
            Level::Error => format!(
                "{} {}",
                "error:".if_supports_color(Stderr, |t| t.red()),
                record.args(),
            ),
            _ => format!("{}", record.args()),
        }
    }
}

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.render(record);

        if let Some(file) = &self.file {
            if let Ok(mut f) = file.lock() {
                let _ = writeln!(f, "{}", strip_ansi_escapes::strip_str(&line));
            }
        }

        let bar = self
            .bar
            .lock()
            .map(|slot| slot.as_ref().cloned())
            .unwrap_or(None);
        match bar {
            Some(pb) if !pb.is_finished() => pb.println(line),
            _ if record.level() <= Level::Warn => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut f) = file.lock() {
                let _ = f.flush();
            }
        }
    }
}
