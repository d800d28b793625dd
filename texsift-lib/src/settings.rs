//! Persistent scanner settings (output directory, worker count).
//!
//! The CLI uses these functions so the settings file is always
//! `~/.config/texsift/settings.toml` and output-path resolution stays
//! consistent between runs.

use std::io;
use std::path::{Path, PathBuf};

/// Canonical path to the settings file: `~/.config/texsift/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("texsift").join("settings.toml")
}

/// Resolve the output directory using a priority chain:
///
/// 1. CLI override (if `Some`)
/// 2. Saved `scan.output_dir` in `settings.toml`
/// 3. The input path with `~` appended (`Games` scans into `Games~`)
pub fn resolve_output_dir(cli_override: Option<PathBuf>, input: &Path) -> PathBuf {
    if let Some(p) = cli_override {
        return p;
    }
    if let Some(p) = load_output_dir() {
        return p;
    }
    let mut name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scan".to_string());
    name.push('~');
    input.with_file_name(name)
}

/// Read `scan.output_dir` from `settings.toml`, if set.
pub fn load_output_dir() -> Option<PathBuf> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    let dir = doc.get("scan")?.get("output_dir")?.as_str()?;
    if dir.is_empty() {
        None
    } else {
        Some(PathBuf::from(dir))
    }
}

/// Read `scan.tasks` from `settings.toml`, if set to a positive count.
pub fn load_tasks() -> Option<usize> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    let tasks = doc.get("scan")?.get("tasks")?.as_integer()?;
    usize::try_from(tasks).ok().filter(|t| *t > 0)
}

/// Save (or clear) the output directory in `settings.toml`.
pub fn save_output_dir(path: Option<&Path>) -> io::Result<()> {
    save_scan_value(
        "output_dir",
        path.map(|p| toml::Value::String(p.to_string_lossy().into_owned())),
    )
}

/// Save (or clear) the worker count in `settings.toml`.
pub fn save_tasks(tasks: Option<usize>) -> io::Result<()> {
    save_scan_value("tasks", tasks.map(|t| toml::Value::Integer(t as i64)))
}

/// Surgical update of one key under `[scan]` so unrelated fields in the
/// file are preserved.
fn save_scan_value(key: &str, value: Option<toml::Value>) -> io::Result<()> {
    let settings = settings_path();
    let mut doc: toml::Value = if let Ok(contents) = std::fs::read_to_string(&settings) {
        contents
            .parse()
            .unwrap_or_else(|_| toml::Value::Table(Default::default()))
    } else {
        toml::Value::Table(Default::default())
    };

    // Ensure [scan] table exists
    let table = doc
        .as_table_mut()
        .ok_or_else(|| io::Error::other("settings.toml root is not a table"))?;
    let scan = table
        .entry("scan")
        .or_insert_with(|| toml::Value::Table(Default::default()));
    let scan_table = scan
        .as_table_mut()
        .ok_or_else(|| io::Error::other("[scan] is not a table"))?;

    match value {
        Some(v) => {
            scan_table.insert(key.to_string(), v);
        }
        None => {
            scan_table.remove(key);
        }
    }

    // Write atomically
    if let Some(parent) = settings.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&doc).map_err(io::Error::other)?;
    let tmp = settings.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, &settings)?;

    Ok(())
}
