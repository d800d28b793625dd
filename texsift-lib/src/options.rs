//! Scan configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use texsift_core::TextureEntry;

use crate::report::ScanProgress;

/// Progress callback; invoked from worker threads.
pub type ProgressFn = Arc<dyn Fn(&ScanProgress) + Send + Sync>;

/// Per-dumped-texture callback: the decoded entry and the path its base
/// image was (or would have been) written to.
pub type TextureFn = Arc<dyn Fn(&TextureEntry, &Path) + Send + Sync>;

/// Knobs for a scan run.
#[derive(Clone)]
pub struct ScanOptions {
    /// Worker threads for top-level files. 0 uses the available CPU count.
    pub parallelism: usize,
    /// Container recursion cutoff; 0 scans all the way down.
    pub max_depth: u32,
    /// Probe unidentified payloads hard: decompression attempts, signature
    /// cutting and a texture-header sweep. May produce garbage output.
    pub force: bool,
    /// Run the whole pipeline, write nothing.
    pub dry_run: bool,
    /// Also save the undecoded payload of every recognized texture under
    /// `~Raw`.
    pub raw: bool,
    /// Dump downscaled mip levels alongside the base image.
    pub mips: bool,
    /// Detect hand-authored mip chains and dump every level under its own
    /// hash.
    pub arbitrary_mip_detection: bool,
    /// Treat a nonzero max LOD as mipmapped even when only one level is
    /// stored, the way Dolphin's texture cache does.
    pub dolphin_mip_detection: bool,
    pub progress_cb: Option<ProgressFn>,
    pub texture_cb: Option<TextureFn>,
    /// Where the run log goes; the save directory when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            parallelism: 0,
            max_depth: 0,
            force: false,
            dry_run: false,
            raw: false,
            mips: false,
            arbitrary_mip_detection: true,
            dolphin_mip_detection: true,
            progress_cb: None,
            texture_cb: None,
            log_dir: None,
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved top-level worker count.
    pub fn base_parallelism(&self) -> usize {
        if self.parallelism == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.parallelism
        }
    }

    /// Worker count for a sub-walk at container nesting `level`: halved per
    /// level, never below one.
    pub fn parallelism_at(&self, level: u32) -> usize {
        self.base_parallelism()
            .checked_shr(level)
            .unwrap_or(0)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallelism_halves_per_level() {
        let options = ScanOptions {
            parallelism: 8,
            ..ScanOptions::default()
        };
        assert_eq!(options.parallelism_at(0), 8);
        assert_eq!(options.parallelism_at(1), 4);
        assert_eq!(options.parallelism_at(2), 2);
        assert_eq!(options.parallelism_at(3), 1);
        assert_eq!(options.parallelism_at(10), 1);
        assert_eq!(options.parallelism_at(200), 1);
    }

    #[test]
    fn test_zero_parallelism_resolves_to_cpus() {
        let options = ScanOptions::default();
        assert!(options.base_parallelism() >= 1);
    }
}
