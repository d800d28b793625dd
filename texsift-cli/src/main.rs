//! texsift CLI
//!
//! Command-line interface for scanning game archives and dumping
//! GameCube/Wii textures as Dolphin-convention PNGs.

mod cli_types;
mod commands;
mod error;
mod logging;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction};
use logging::CliLogger;

fn main() {
    let cli = Cli::parse();

    let logger = match CliLogger::init(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Extract { args } => commands::extract::run_extract(logger, args),
        Commands::Formats => {
            commands::formats::run_formats();
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                commands::config::run_config_show();
                Ok(())
            }
            ConfigAction::SetOutput { dir } => commands::config::run_config_set_output(dir),
            ConfigAction::SetTasks { tasks } => commands::config::run_config_set_tasks(tasks),
            ConfigAction::Clear => commands::config::run_config_clear(),
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        log::error!("{e}");
        log::logger().flush();
        std::process::exit(1);
    }
    log::logger().flush();
}

/// Blank spacer line, routed through the logger so `--logfile` sees it too.
pub(crate) fn log_blank() {
    log::info!("");
}
