//! Scan counters, texture dedup and progress reporting.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Mutex, TryLockError};
use std::time::Duration;

use texsift_core::FormatInfo;

use crate::options::ProgressFn;
use crate::util;

/// Final tally of a scan run.
#[derive(Debug, Default, Clone)]
pub struct ScanReport {
    pub files_total: u64,
    pub files_done: u64,
    pub bytes_total: u64,
    pub bytes_done: u64,
    /// Unique textures dumped (palette variants counted separately).
    pub extracted_count: u64,
    pub extracted_bytes: u64,
    pub unsupported_count: u64,
    pub unsupported_bytes: u64,
    pub unknown_count: u64,
    pub unknown_bytes: u64,
    /// Dampened share of unknown payloads held against the rate.
    pub skipped_bytes: u64,
    pub unsupported_formats: Vec<FormatInfo>,
    pub unknown_formats: Vec<FormatInfo>,
    pub log_path: Option<PathBuf>,
    pub elapsed: Duration,
    seen_textures: HashSet<i32>,
    last_reported: u64,
}

impl ScanReport {
    /// Fraction of scanned payload that became textures, 0.0 to 1.0.
    pub fn extraction_rate(&self) -> f64 {
        let denom = self.extracted_bytes + self.unsupported_bytes + self.skipped_bytes;
        if denom == 0 {
            0.0
        } else {
            self.extracted_bytes as f64 / denom as f64
        }
    }

    fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            files_done: self.files_done.min(self.files_total),
            files_total: self.files_total,
            bytes_done: self.bytes_done.min(self.bytes_total),
            bytes_total: self.bytes_total,
        }
    }
}

/// Point-in-time progress handed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub files_done: u64,
    pub files_total: u64,
    pub bytes_done: u64,
    pub bytes_total: u64,
}

impl ScanProgress {
    pub fn percent(&self) -> f64 {
        if self.bytes_total == 0 {
            100.0
        } else {
            self.bytes_done as f64 * 100.0 / self.bytes_total as f64
        }
    }
}

fn fold(hash: u64) -> i32 {
    (hash ^ (hash >> 32)) as i32
}

/// Dedup key for one dump pass of one texture.
///
/// Mip-capable textures get a shifted key so Dolphin's `_m` lookup name
/// never collides with a single-level dump of the same payload; palette
/// variants mix the palette hash in.
pub(crate) fn texture_key(data_hash: u64, mip_capable: bool, is_palette: bool, tlut_hash: u64) -> i32 {
    let mut key = fold(data_hash);
    if mip_capable {
        key = key.wrapping_sub(1);
    }
    if is_palette && tlut_hash != 0 {
        key = key.wrapping_mul(-1521134295).wrapping_add(fold(tlut_hash));
    }
    key
}

/// Counters shared across scan workers. All methods take the one lock
/// briefly; only the progress callback runs under it, so callbacks see
/// snapshots in delivery order.
pub(crate) struct SharedReport {
    inner: Mutex<ScanReport>,
}

impl SharedReport {
    pub fn new(files_total: u64, bytes_total: u64) -> Self {
        Self {
            inner: Mutex::new(ScanReport {
                files_total,
                bytes_total,
                ..ScanReport::default()
            }),
        }
    }

    pub fn record_extracted(&self, len: u64, images: u64) {
        let mut report = util::lock(&self.inner);
        report.extracted_count += images;
        report.extracted_bytes += len;
    }

    pub fn record_unsupported(&self, len: u64, format: &FormatInfo) {
        let mut report = util::lock(&self.inner);
        report.unsupported_count += 1;
        report.unsupported_bytes += len;
        if !report.unsupported_formats.contains(format) {
            report.unsupported_formats.push(format.clone());
        }
    }

    /// Count a failed texture pass without charging any payload bytes.
    pub fn bump_unsupported(&self) {
        util::lock(&self.inner).unsupported_count += 1;
    }

    pub fn record_unknown(&self, len: u64, depth: u32, format: &FormatInfo) {
        let mut report = util::lock(&self.inner);
        report.unknown_count += 1;
        report.unknown_bytes += len;
        // Small fragments only partially count against the rate.
        if depth == 0 {
            if len > 300 {
                report.skipped_bytes += len >> 1;
            }
        } else if len > 512 {
            report.skipped_bytes += len >> 6;
        }
        if len > 130 && !report.unknown_formats.contains(format) {
            report.unknown_formats.push(format.clone());
        }
    }

    /// True the first time a key is seen; the caller owns that texture.
    pub fn claim_texture(&self, key: i32) -> bool {
        util::lock(&self.inner).seen_textures.insert(key)
    }

    pub fn file_done(&self, len: u64) {
        let mut report = util::lock(&self.inner);
        report.files_done += 1;
        report.bytes_done += len;
    }

    pub fn entry_done(&self, len: u64) {
        util::lock(&self.inner).bytes_done += len;
    }

    /// Containers charge their entries while walking, then give the
    /// container's own length back in one step.
    pub fn subtract_container(&self, len: u64) {
        let mut report = util::lock(&self.inner);
        report.bytes_done = report.bytes_done.saturating_sub(len);
    }

    /// Opportunistic progress report: skipped when another worker holds
    /// the lock or when the snapshot would run backwards.
    pub fn maybe_report(&self, cb: Option<&ProgressFn>) {
        let Some(cb) = cb else { return };
        let mut report = match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
            Err(TryLockError::WouldBlock) => return,
        };
        let snap = report.snapshot();
        if snap.bytes_done < report.last_reported {
            return;
        }
        report.last_reported = snap.bytes_done;
        cb(&snap);
    }

    /// Blocking report pinned to 100%, delivered once all workers are done.
    pub fn final_report(&self, cb: Option<&ProgressFn>) {
        let Some(cb) = cb else { return };
        let mut report = util::lock(&self.inner);
        let snap = ScanProgress {
            files_done: report.files_total,
            files_total: report.files_total,
            bytes_done: report.bytes_total,
            bytes_total: report.bytes_total,
        };
        report.last_reported = snap.bytes_done;
        cb(&snap);
    }

    pub fn finish(self, log_path: Option<PathBuf>, elapsed: Duration) -> ScanReport {
        let mut report = self.inner.into_inner().unwrap_or_else(|e| e.into_inner());
        report.log_path = log_path;
        report.elapsed = elapsed;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn unknown_format() -> FormatInfo {
        FormatInfo::unknown("bin")
    }

    #[test]
    fn test_texture_key_folds_hash_halves() {
        let key = texture_key(0x1234_5678_9ABC_DEF0, false, false, 0);
        assert_eq!(key, (0x9ABC_DEF0u32 ^ 0x1234_5678u32) as i32);
    }

    #[test]
    fn test_texture_key_shifts_for_mip_capable() {
        let flat = texture_key(42, false, false, 0);
        let mipped = texture_key(42, true, false, 0);
        assert_eq!(mipped, flat.wrapping_sub(1));
    }

    #[test]
    fn test_texture_key_mixes_palette_hash() {
        let plain = texture_key(42, false, true, 0);
        assert_eq!(plain, texture_key(42, false, false, 0));
        let mixed = texture_key(42, false, true, 7);
        assert_ne!(mixed, plain);
        assert_ne!(texture_key(42, false, true, 8), mixed);
        // Non-palette formats ignore the palette hash entirely.
        assert_eq!(texture_key(42, false, false, 7), plain);
    }

    #[test]
    fn test_claim_texture_dedups() {
        let report = SharedReport::new(1, 10);
        assert!(report.claim_texture(99));
        assert!(!report.claim_texture(99));
        assert!(report.claim_texture(100));
    }

    #[test]
    fn test_unknown_dampening() {
        let report = SharedReport::new(4, 4000);
        let fi = unknown_format();
        report.record_unknown(1000, 0, &fi);
        report.record_unknown(1000, 1, &fi);
        report.record_unknown(200, 0, &fi);
        report.record_unknown(400, 2, &fi);
        let result = report.finish(None, Duration::ZERO);
        assert_eq!(result.unknown_count, 4);
        assert_eq!(result.unknown_bytes, 2600);
        // 1000 >> 1 at the top level, 1000 >> 6 nested, small ones free.
        assert_eq!(result.skipped_bytes, 500 + 15);
        assert_eq!(result.unknown_formats.len(), 1);
    }

    #[test]
    fn test_unknown_format_list_skips_tiny_payloads() {
        let report = SharedReport::new(1, 100);
        report.record_unknown(100, 0, &unknown_format());
        let result = report.finish(None, Duration::ZERO);
        assert_eq!(result.unknown_count, 1);
        assert!(result.unknown_formats.is_empty());
    }

    #[test]
    fn test_extraction_rate() {
        let report = SharedReport::new(2, 100);
        report.record_extracted(75, 3);
        report.record_unsupported(25, &unknown_format());
        let result = report.finish(None, Duration::ZERO);
        assert!((result.extraction_rate() - 0.75).abs() < 1e-9);
        assert_eq!(result.extracted_count, 3);

        let empty = ScanReport::default();
        assert_eq!(empty.extraction_rate(), 0.0);
    }

    #[test]
    fn test_progress_monotonic_and_pinned_final() {
        let got: Arc<Mutex<Vec<ScanProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&got);
        let cb: ProgressFn = Arc::new(move |p: &ScanProgress| sink.lock().unwrap().push(*p));

        let report = SharedReport::new(2, 100);
        report.maybe_report(Some(&cb));
        report.file_done(30);
        report.maybe_report(Some(&cb));
        report.file_done(70);
        report.final_report(Some(&cb));

        let got = got.lock().unwrap();
        assert_eq!(got.len(), 3);
        for pair in got.windows(2) {
            assert!(pair[1].bytes_done >= pair[0].bytes_done);
        }
        let last = got.last().unwrap();
        assert_eq!(last.bytes_done, 100);
        assert_eq!(last.files_done, 2);
        assert_eq!(last.percent(), 100.0);
    }

    #[test]
    fn test_snapshot_clamps_overcounted_bytes() {
        let got: Arc<Mutex<Vec<ScanProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&got);
        let cb: ProgressFn = Arc::new(move |p: &ScanProgress| sink.lock().unwrap().push(*p));

        // Container entries overshoot the total until the container's own
        // length is handed back.
        let report = SharedReport::new(1, 100);
        report.file_done(100);
        report.entry_done(60);
        report.maybe_report(Some(&cb));
        report.subtract_container(60);

        let got = got.lock().unwrap();
        assert_eq!(got[0].bytes_done, 100);
        let result = report.finish(None, Duration::ZERO);
        assert_eq!(result.bytes_done, 100);
    }

    #[test]
    fn test_zero_total_percent_is_full() {
        let progress = ScanProgress {
            files_done: 0,
            files_total: 0,
            bytes_done: 0,
            bytes_total: 0,
        };
        assert_eq!(progress.percent(), 100.0);
    }
}
