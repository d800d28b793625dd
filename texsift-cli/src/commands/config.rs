//! The config command: manage saved scan defaults.

use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use texsift_lib::settings;

use crate::error::CliError;

/// Show the settings file and the saved defaults.
pub(crate) fn run_config_show() {
    let path = settings::settings_path();

    log::info!("{}", "Scan defaults".if_supports_color(Stdout, |t| t.bold()));
    crate::log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    match settings::load_output_dir() {
        Some(dir) => log::info!(
            "  {} {}",
            "output_dir:".if_supports_color(Stdout, |t| t.cyan()),
            dir.display(),
        ),
        None => log::info!(
            "  {} {} {}",
            "output_dir:".if_supports_color(Stdout, |t| t.cyan()),
            "not set".if_supports_color(Stdout, |t| t.yellow()),
            "(scans save next to their input)".if_supports_color(Stdout, |t| t.dimmed()),
        ),
    }
    match settings::load_tasks() {
        Some(tasks) => log::info!(
            "  {}      {}",
            "tasks:".if_supports_color(Stdout, |t| t.cyan()),
            tasks,
        ),
        None => log::info!(
            "  {}      {} {}",
            "tasks:".if_supports_color(Stdout, |t| t.cyan()),
            "not set".if_supports_color(Stdout, |t| t.yellow()),
            "(the CPU count decides)".if_supports_color(Stdout, |t| t.dimmed()),
        ),
    }
}

/// Save the default output directory.
pub(crate) fn run_config_set_output(dir: PathBuf) -> Result<(), CliError> {
    settings::save_output_dir(Some(&dir))
        .map_err(|e| CliError::config(format!("Failed to save settings: {e}")))?;
    log::info!(
        "{} Default output directory set to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        dir.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}

/// Save the default worker count.
pub(crate) fn run_config_set_tasks(tasks: usize) -> Result<(), CliError> {
    if tasks == 0 {
        return Err(CliError::config("tasks must be at least 1"));
    }
    settings::save_tasks(Some(tasks))
        .map_err(|e| CliError::config(format!("Failed to save settings: {e}")))?;
    log::info!(
        "{} Default worker count set to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        tasks,
    );
    Ok(())
}

/// Clear every saved default.
pub(crate) fn run_config_clear() -> Result<(), CliError> {
    settings::save_output_dir(None)
        .map_err(|e| CliError::config(format!("Failed to save settings: {e}")))?;
    settings::save_tasks(None)
        .map_err(|e| CliError::config(format!("Failed to save settings: {e}")))?;
    log::info!(
        "{} Saved defaults cleared",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
    );
    Ok(())
}

/// Print the settings file path, plain, for shell capture.
pub(crate) fn run_config_path() {
    println!("{}", settings::settings_path().display());
}
