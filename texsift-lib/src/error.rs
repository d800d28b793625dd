use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a scan before any unit runs. Failures inside a single
/// unit are recovered, logged and counted instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan root is neither a file nor a directory
    #[error("scan path does not exist: {}", .0.display())]
    InvalidScanPath(PathBuf),

    /// I/O error outside any single unit (enumeration, output directories)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The run log could not be created
    #[error("log file error: {0}")]
    Log(String),
}
