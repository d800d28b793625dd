//! Scan orchestration: enumerate the input, identify every file and push
//! it through the extraction cascade, then settle the report.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use texsift_core::{
    ArchiveTree, FormatError, FormatInfo, NodeId, NoSiblings, SharedBytes, SiblingResolver,
};
use texsift_formats::{FormatCatalog, HEAD_LEN};

use crate::breaker::BadFormats;
use crate::cascade::{self, ScanCtx};
use crate::error::ScanError;
use crate::logger::RunLog;
use crate::options::ScanOptions;
use crate::parallel;
use crate::report::{ScanReport, SharedReport};
use crate::util;

/// Where a unit's bytes come from.
pub(crate) enum ScanSource {
    /// A file on disk. `head` holds the identification preview so logging
    /// an unknown never re-reads the file.
    File {
        path: PathBuf,
        len: u64,
        head: Vec<u8>,
    },
    /// An in-memory payload produced by an opener or decompressor.
    Memory(SharedBytes),
}

impl ScanSource {
    pub fn len(&self) -> u64 {
        match self {
            ScanSource::File { len, .. } => *len,
            ScanSource::Memory(data) => data.len() as u64,
        }
    }

    pub fn head(&self) -> &[u8] {
        match self {
            ScanSource::File { head, .. } => head,
            ScanSource::Memory(data) => {
                let bytes = data.as_slice();
                &bytes[..bytes.len().min(HEAD_LEN)]
            }
        }
    }

    /// Full payload. Disk files are read on demand so a directory scan
    /// holds at most the files its workers are working on.
    pub fn bytes(&self) -> Result<SharedBytes, FormatError> {
        match self {
            ScanSource::File { path, .. } => Ok(SharedBytes::new(fs::read(path)?)),
            ScanSource::Memory(data) => Ok(data.clone()),
        }
    }
}

/// One payload moving through the cascade.
pub(crate) struct ScanUnit {
    pub source: ScanSource,
    pub format: FormatInfo,
    /// Logical path of the payload, `/`-joined, extension stripped.
    /// Doubles as the output subdirectory for dumped textures.
    pub path: String,
    /// Extension split off `path`: lowercase, no dot.
    pub extension: String,
    pub depth: u32,
    /// Container entry this unit came from; resolves companion requests.
    pub origin: Option<(Arc<ArchiveTree>, NodeId)>,
    /// Directory of the on-disk file, for top-level companion requests.
    pub sibling_dir: Option<PathBuf>,
}

impl ScanUnit {
    pub fn display_path(&self) -> String {
        if self.extension.is_empty() {
            self.path.clone()
        } else {
            format!("{}.{}", self.path, self.extension)
        }
    }

    /// Bare file name with extension, as openers expect it.
    pub fn file_name(&self) -> String {
        let last = self.path.rsplit('/').next().unwrap_or(&self.path);
        if self.extension.is_empty() {
            last.to_string()
        } else {
            format!("{last}.{}", self.extension)
        }
    }

    /// Companion-file resolver matching the unit's provenance: container
    /// entries resolve against their tree, top-level files against their
    /// directory on disk, rescanned payloads inherit from their parent.
    pub fn sibling_resolver(&self) -> Box<dyn SiblingResolver> {
        if let Some((tree, node)) = &self.origin {
            return Box::new(TreeSiblings {
                tree: Arc::clone(tree),
                node: *node,
            });
        }
        if let Some(dir) = &self.sibling_dir {
            return Box::new(FsSiblings { dir: dir.clone() });
        }
        Box::new(NoSiblings)
    }
}

struct TreeSiblings {
    tree: Arc<ArchiveTree>,
    node: NodeId,
}

impl SiblingResolver for TreeSiblings {
    fn request(&self, name: &str) -> Result<SharedBytes, FormatError> {
        self.tree
            .sibling(self.node, name)
            .cloned()
            .ok_or_else(|| FormatError::MissingSibling(name.to_string()))
    }
}

struct FsSiblings {
    dir: PathBuf,
}

impl SiblingResolver for FsSiblings {
    fn request(&self, name: &str) -> Result<SharedBytes, FormatError> {
        let exact = self.dir.join(name);
        if exact.is_file() {
            return Ok(SharedBytes::new(fs::read(exact)?));
        }
        // Case differences between payload tables and disk are common in
        // dumps.
        if let Ok(entries) = fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                if entry.file_name().to_string_lossy().eq_ignore_ascii_case(name)
                    && entry.path().is_file()
                {
                    return Ok(SharedBytes::new(fs::read(entry.path())?));
                }
            }
        }
        Err(FormatError::MissingSibling(name.to_string()))
    }
}

struct FileEntry {
    path: PathBuf,
    /// Scan-relative path, `/`-joined, extension stripped.
    logical: String,
    extension: String,
    len: u64,
}

/// Recursive asset scanner and texture extractor.
///
/// Walks `scan_path` (a directory or a single file), runs every payload
/// through the format cascade and dumps Dolphin-convention PNGs under
/// `save_path`.
pub struct TextureScanner {
    scan_path: PathBuf,
    save_path: PathBuf,
    options: ScanOptions,
}

impl TextureScanner {
    pub fn new(scan_path: impl Into<PathBuf>, save_path: impl Into<PathBuf>) -> Self {
        Self::with_options(scan_path, save_path, ScanOptions::default())
    }

    pub fn with_options(
        scan_path: impl Into<PathBuf>,
        save_path: impl Into<PathBuf>,
        options: ScanOptions,
    ) -> Self {
        Self {
            scan_path: scan_path.into(),
            save_path: save_path.into(),
            options,
        }
    }

    pub fn scan(&self) -> Result<ScanReport, ScanError> {
        let started = Instant::now();
        let files = self.enumerate()?;
        let files_total = files.len() as u64;
        let bytes_total = files.iter().map(|f| f.len).sum();

        if !self.options.dry_run {
            fs::create_dir_all(&self.save_path)?;
        }
        let log_dir = self.options.log_dir.as_deref().unwrap_or(&self.save_path);
        let log = RunLog::create(log_dir)?;

        let catalog = FormatCatalog::standard();
        let report = SharedReport::new(files_total, bytes_total);
        let breaker = BadFormats::new();
        let ctx = ScanCtx {
            catalog: &catalog,
            options: &self.options,
            report: &report,
            breaker: &breaker,
            log: &log,
            save_dir: &self.save_path,
        };

        let cb = self.options.progress_cb.as_ref();
        report.maybe_report(cb);

        parallel::for_each(self.options.parallelism_at(0), files, |entry| {
            match build_unit(&catalog, &entry) {
                Ok(unit) => {
                    if !unit.format.is_unknown() {
                        log.recognized(&unit.display_path(), &unit.format, 0);
                    }
                    cascade::process_unit(&ctx, &unit);
                }
                Err(e) => {
                    log.error(&entry.logical, &e.to_string());
                    report.record_unsupported(entry.len, &FormatInfo::unknown(&entry.extension));
                }
            }
            report.file_done(entry.len);
            report.maybe_report(cb);
        });

        report.final_report(cb);
        let log_path = log.path().to_path_buf();
        let result = report.finish(Some(log_path), started.elapsed());
        log.footer(&result);
        Ok(result)
    }

    fn enumerate(&self) -> Result<Vec<FileEntry>, ScanError> {
        if self.scan_path.is_file() {
            let len = fs::metadata(&self.scan_path)?.len();
            let name = self
                .scan_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let (stem, ext) = util::split_extension(&name);
            return Ok(vec![FileEntry {
                path: self.scan_path.clone(),
                logical: stem.to_string(),
                extension: ext.to_ascii_lowercase(),
                len,
            }]);
        }
        if !self.scan_path.is_dir() {
            return Err(ScanError::InvalidScanPath(self.scan_path.clone()));
        }
        let mut files = Vec::new();
        collect_files(&self.scan_path, &self.scan_path, &mut files)?;
        Ok(files)
    }
}

/// Depth-first walk in path order, so two runs over the same tree always
/// enumerate identically.
fn collect_files(root: &Path, dir: &Path, out: &mut Vec<FileEntry>) -> Result<(), ScanError> {
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)?.flatten().collect();
    entries.sort_by_key(|e| e.path());

    for entry in &entries {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out)?;
            continue;
        }
        if !path.is_file() {
            continue;
        }
        let len = fs::metadata(&path)?.len();
        let rel = path.strip_prefix(root).unwrap_or(&path);
        let mut parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let last = parts.pop().unwrap_or_default();
        let (stem, ext) = util::split_extension(&last);
        parts.push(stem.to_string());
        out.push(FileEntry {
            path: path.clone(),
            logical: parts.join("/"),
            extension: ext.to_ascii_lowercase(),
            len,
        });
    }
    Ok(())
}

fn build_unit(catalog: &FormatCatalog, entry: &FileEntry) -> Result<ScanUnit, FormatError> {
    let mut head = Vec::new();
    File::open(&entry.path)?
        .take(HEAD_LEN as u64)
        .read_to_end(&mut head)?;
    let format = catalog.identify(&head, entry.len, &entry.extension);
    Ok(ScanUnit {
        source: ScanSource::File {
            path: entry.path.clone(),
            len: entry.len,
            head,
        },
        format,
        path: entry.logical.clone(),
        extension: entry.extension.clone(),
        depth: 0,
        origin: None,
        sibling_dir: entry.path.parent().map(Path::to_path_buf),
    })
}

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod tests;
