//! Run log written next to the extracted textures.
//!
//! One log per run; concurrent runs into the same directory pick the next
//! free `texsift_{n}.log` name. Every action is mirrored onto the `log`
//! facade so embedding applications see it through their own logger.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use texsift_core::FormatInfo;

use crate::error::ScanError;
use crate::report::ScanReport;
use crate::util;

pub(crate) struct RunLog {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl RunLog {
    pub fn create(dir: &Path) -> Result<Self, ScanError> {
        fs::create_dir_all(dir)
            .map_err(|e| ScanError::Log(format!("create {}: {e}", dir.display())))?;
        let (file, path) = open_unique(dir)
            .map_err(|e| ScanError::Log(format!("open log in {}: {e}", dir.display())))?;
        let log = Self {
            writer: Mutex::new(BufWriter::new(file)),
            path,
        };
        log.header();
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Log writes never interrupt a scan; a full disk costs the log, not
    // the textures.
    fn header(&self) {
        let mut w = util::lock(&self.writer);
        let _ = writeln!(w, "{:-<64}", "");
        let _ = writeln!(
            w,
            "texsift v{}  {}",
            env!("CARGO_PKG_VERSION"),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(w, "{:-<64}", "");
        let _ = w.flush();
    }

    pub fn footer(&self, result: &ScanReport) {
        let mut w = util::lock(&self.writer);
        let _ = writeln!(w, "{:-<64}", "");
        let _ = writeln!(
            w,
            "~END  {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(w, "{:-<64}", "");
        let _ = writeln!(w, "Extracted textures: {}", result.extracted_count);
        let _ = writeln!(w, "Unsupported files: {}", result.unsupported_count);
        let _ = writeln!(w, "Unknown files: {}", result.unknown_count);
        let _ = writeln!(w, "Extraction rate: ~{:.2}%", result.extraction_rate() * 100.0);
        let _ = writeln!(w, "Scan time: {:.2}s", result.elapsed.as_secs_f64());
        let _ = writeln!(w, "{:-<64}", "");
        let _ = w.flush();
    }

    fn action(&self, action: &str, file: &str, detail: &str) {
        let mut w = util::lock(&self.writer);
        let _ = writeln!(w, "{action}\"~{file}\"");
        let _ = writeln!(w, " {detail}");
        let _ = w.flush();
    }

    pub fn extract(&self, file: &str, detail: &str) {
        self.action("Extract:", file, detail);
        log::debug!("extracted {file}");
    }

    pub fn unsupported(&self, file: &str, len: u64, format: &FormatInfo) {
        self.action(
            "Unsupported:",
            &format!("{file} ~{}", util::format_bytes(len)),
            &format!("Description: {}", format.full_description()),
        );
        log::warn!("unsupported {file}");
    }

    pub fn unknown(&self, file: &str, len: u64, format: &FormatInfo, head: &[u8]) {
        let detail = match &format.signature {
            Some(sig) => {
                let bytes = sig
                    .bytes()
                    .iter()
                    .map(|b| b.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                format!(
                    "Magic:[{}] Bytes:[{bytes}] Offset:{}",
                    sig.display(),
                    sig.offset()
                )
            }
            None => {
                let head = &head[..head.len().min(32)];
                let hex = head
                    .iter()
                    .map(|b| format!("{b:02X}"))
                    .collect::<Vec<_>>()
                    .join("-");
                format!("Bytes{}:[{hex}]", head.len())
            }
        };
        self.action(
            "Unknown:",
            &format!("{file} ~{}", util::format_bytes(len)),
            &detail,
        );
        log::debug!("unknown {file}");
    }

    pub fn recognized(&self, file: &str, format: &FormatInfo, depth: u32) {
        let mut w = util::lock(&self.writer);
        if depth == 0 {
            let _ = writeln!(
                w,
                "Scan \"{file}\" recognized as {}",
                format.full_description()
            );
        } else {
            let _ = writeln!(
                w,
                "Scan \"{file}\" recognized as {}, Deep:{depth}",
                format.full_description()
            );
        }
        let _ = w.flush();
        log::info!("{file} recognized as {}", format.full_description());
    }

    pub fn error(&self, context: &str, message: &str) {
        let mut w = util::lock(&self.writer);
        let _ = writeln!(w, "{:-<64}", "");
        let _ = writeln!(w, "Error!!!... {context} {message}");
        let _ = writeln!(w, "{:-<64}", "");
        let _ = w.flush();
        log::error!("{context}: {message}");
    }
}

fn open_unique(dir: &Path) -> io::Result<(File, PathBuf)> {
    for n in 1..10_000u32 {
        let name = if n == 1 {
            "texsift.log".to_string()
        } else {
            format!("texsift_{n}.log")
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::other("no free log file name"))
}
