//! The extraction cascade applied to every payload the scan sees.
//!
//! One switch per unit: textures dump, containers open and their entries
//! recurse, compression wrappers peel and rescan, unknowns go through the
//! force pipeline when enabled. A failure inside one unit is logged and
//! counted against that unit alone; siblings keep scanning.

use std::path::Path;
use std::sync::Arc;

use texsift_core::{ArchiveTree, Capability, FormatError, FormatKind, SharedBytes};
use texsift_formats::tex::probe_bti;
use texsift_formats::{FormatCatalog, HEAD_LEN};

use crate::breaker::BadFormats;
use crate::cutter;
use crate::dump;
use crate::logger::RunLog;
use crate::options::ScanOptions;
use crate::parallel;
use crate::report::SharedReport;
use crate::scanner::{ScanSource, ScanUnit};
use crate::util;

/// Containers above this size skip the trailing-data search.
const OVERSIZE_GUARD: u64 = 104_857_600 * 5;
/// Forced decompression probes stop above this payload size.
const FORCE_DECOMPRESS_MAX: u64 = 24 * 1024 * 1024;

/// Extensions that routinely wrap a compressed payload; probing anything
/// else is wasted work.
const COMPRESSED_EXTENSIONS: &[&str] = &[
    "arc", "tpl", "bti", "onz", "lz", "zlip", "lzo", "lz11", "bin", "zs", "lh", "brres", "breff",
    "zlib", "lz77", "prs", "wtm", "vld", "cxd", "pcs", "cms", "cmp", "cmparc", "cmpres",
];

/// Everything one scan run shares across its workers.
pub(crate) struct ScanCtx<'a> {
    pub catalog: &'a FormatCatalog,
    pub options: &'a ScanOptions,
    pub report: &'a SharedReport,
    pub breaker: &'a BadFormats,
    pub log: &'a RunLog,
    pub save_dir: &'a Path,
}

/// Run one unit through the cascade. Unit failures never propagate.
pub(crate) fn process_unit(ctx: &ScanCtx<'_>, unit: &ScanUnit) {
    if ctx.options.max_depth != 0 && unit.depth > ctx.options.max_depth {
        record_unknown(ctx, unit);
        return;
    }
    if let Err(e) = run(ctx, unit) {
        ctx.log.error(&unit.display_path(), &e.to_string());
        ctx.report
            .record_unsupported(unit.source.len(), &unit.format);
    }
}

fn run(ctx: &ScanCtx<'_>, unit: &ScanUnit) -> Result<(), FormatError> {
    match unit.format.kind {
        FormatKind::Unknown => {
            if !try_force(ctx, unit)? {
                record_unknown(ctx, unit);
            }
        }
        FormatKind::Texture => {
            if ctx.options.raw {
                let data = unit.source.bytes()?;
                dump::save_raw(ctx, unit, &data)?;
            }
            if !try_texture(ctx, unit)? && !try_extract(ctx, unit)? {
                record_unsupported(ctx, unit);
            }
        }
        FormatKind::Archive | FormatKind::Rom => {
            if !try_extract(ctx, unit)? {
                record_unsupported(ctx, unit);
            }
        }
        // Other recognized kinds (audio, models, ...) hold nothing the
        // scan can pull; their recognition line is all they get.
        _ => {}
    }
    Ok(())
}

/// Dump the unit through its texture opener. `Ok(false)` when the format
/// has no opener; open and decode errors surface to the unit boundary.
fn try_texture(ctx: &ScanCtx<'_>, unit: &ScanUnit) -> Result<bool, FormatError> {
    let Some(Capability::Texture(opener)) = &unit.format.capability else {
        return Ok(false);
    };
    let data = unit.source.bytes()?;
    let resolver = unit.sibling_resolver();
    let entries = opener.open(&data, &unit.file_name(), resolver.as_ref())?;
    let images = dump::dump_entries(ctx, unit, &entries, None);
    ctx.report.record_extracted(data.len() as u64, images);
    Ok(true)
}

/// Open the unit as a container or peel its compression wrapper, then
/// rescan what comes out.
fn try_extract(ctx: &ScanCtx<'_>, unit: &ScanUnit) -> Result<bool, FormatError> {
    match &unit.format.capability {
        Some(Capability::Compression(dec)) => {
            let data = unit.source.bytes()?;
            let expanded = dec.decompress(data.as_slice())?;
            rescan_bytes(ctx, unit, expanded, unit.path.clone(), unit.extension.clone());
            Ok(true)
        }
        Some(Capability::Archive(opener)) => {
            let data = unit.source.bytes()?;
            let resolver = unit.sibling_resolver();
            let tree = opener.open(&data, &unit.file_name(), resolver.as_ref())?;
            let consumed = tree.total_size().max(tree.parsed_end());
            walk_tree(ctx, unit, tree);
            tail_scan(ctx, unit, &data, consumed);
            Ok(true)
        }
        Some(Capability::Texture(_)) => Ok(false),
        None => {
            if !compressed_extension(&unit.extension) {
                return Ok(false);
            }
            let data = unit.source.bytes()?;
            let Some((expanded, _)) = ctx.catalog.try_decompress(data.as_slice()) else {
                return Ok(false);
            };
            // A double extension names the real payload: `model.arc.lz`
            // rescans as `model.arc`.
            let (parent_dir, last) = match unit.path.rsplit_once('/') {
                Some((dir, last)) => (Some(dir), last),
                None => (None, unit.path.as_str()),
            };
            let (stem, inner) = util::split_extension(last);
            let new_path = match parent_dir {
                Some(dir) => format!("{dir}/{stem}"),
                None => stem.to_string(),
            };
            rescan_bytes(ctx, unit, expanded, new_path, inner.to_ascii_lowercase());
            Ok(true)
        }
    }
}

/// Last-resort pipeline for unidentified payloads.
fn try_force(ctx: &ScanCtx<'_>, unit: &ScanUnit) -> Result<bool, FormatError> {
    if ctx.options.force {
        let data = unit.source.bytes()?;
        if (data.len() as u64) < FORCE_DECOMPRESS_MAX
            && let Some((expanded, _)) = ctx.catalog.try_decompress(data.as_slice())
        {
            rescan_bytes(ctx, unit, expanded, unit.path.clone(), unit.extension.clone());
            return Ok(true);
        }
        if try_cut(ctx, unit, &data) {
            return Ok(true);
        }
        return Ok(try_bti_sweep(ctx, unit, &data));
    }
    if unit.extension.is_empty() {
        // Extensionless payloads are the classic home of raw BTI headers.
        let data = unit.source.bytes()?;
        return Ok(try_bti_sweep(ctx, unit, &data));
    }
    try_extract(ctx, unit)
}

/// Carve the payload at every known signature and walk the pieces. The
/// breaker refuses formats whose cuts keep coming up empty.
fn try_cut(ctx: &ScanCtx<'_>, unit: &ScanUnit, data: &SharedBytes) -> bool {
    if !ctx.breaker.should_attempt(&unit.format) {
        return false;
    }
    let tree = cutter::cut(data, ctx.catalog.formats());
    if tree.is_empty() {
        ctx.breaker.record_failure(&unit.format);
        return false;
    }
    // Recorded before the walk so nested attempts already see it.
    ctx.breaker.record_success(&unit.format);
    walk_tree(ctx, unit, tree);
    true
}

/// Walk the payload for plausible BTI headers and dump every hit under
/// `~Force`. Sweep finds count as extracted images but contribute no
/// extracted bytes.
fn try_bti_sweep(ctx: &ScanCtx<'_>, unit: &ScanUnit, data: &SharedBytes) -> bool {
    let mut entries = Vec::new();
    let mut off = 0;
    while off < data.len() {
        match probe_bti(data, off) {
            Some((entry, end)) => {
                entries.push(entry);
                off = end.max(off + 1);
            }
            None => off += 1,
        }
    }
    if entries.is_empty() {
        return false;
    }
    let images = dump::dump_entries(ctx, unit, &entries, Some("~Force"));
    ctx.report.record_extracted(0, images);
    true
}

/// Identify a freshly produced payload and run it through the cascade one
/// level deeper.
fn rescan_bytes(
    ctx: &ScanCtx<'_>,
    parent: &ScanUnit,
    bytes: Vec<u8>,
    path: String,
    extension: String,
) {
    let data = SharedBytes::new(bytes);
    let format = {
        let bytes = data.as_slice();
        ctx.catalog
            .identify(&bytes[..bytes.len().min(HEAD_LEN)], data.len() as u64, &extension)
    };
    let child = ScanUnit {
        source: ScanSource::Memory(data),
        format,
        path,
        extension,
        depth: parent.depth + 1,
        origin: parent.origin.clone(),
        sibling_dir: parent.sibling_dir.clone(),
    };
    if !child.format.is_unknown() {
        ctx.log
            .recognized(&child.display_path(), &child.format, child.depth);
    }
    process_unit(ctx, &child);
}

/// Walk every file of an opened container: identify, partition so
/// recognized entries run first, then scan both batches with the worker
/// count for this nesting level. Entry lengths are charged to progress
/// while walking and the container's own share is handed back at the end.
fn walk_tree(ctx: &ScanCtx<'_>, parent: &ScanUnit, tree: ArchiveTree) {
    let tree = Arc::new(tree);
    let mut identified = Vec::new();
    let mut unidentified = Vec::new();
    let mut container_total = 0u64;

    for (id, node) in tree.files() {
        let Some(data) = node.file_data() else { continue };
        let data = data.clone();
        let len = data.len() as u64;
        container_total += len;

        let entry_path = tree.path_of(id);
        let mut parts: Vec<String> = entry_path.split('/').map(util::sanitize_component).collect();
        let last = parts.pop().unwrap_or_default();
        let (stem, ext) = util::split_extension(&last);
        parts.push(stem.to_string());
        let path = format!("{}/{}", parent.path, parts.join("/"));
        let extension = ext.to_ascii_lowercase();

        let format = {
            let bytes = data.as_slice();
            ctx.catalog
                .identify(&bytes[..bytes.len().min(HEAD_LEN)], len, &extension)
        };
        let child = ScanUnit {
            source: ScanSource::Memory(data),
            format,
            path,
            extension,
            depth: parent.depth + 1,
            origin: Some((Arc::clone(&tree), id)),
            sibling_dir: None,
        };
        if child.format.is_unknown() {
            unidentified.push(child);
        } else {
            identified.push(child);
        }
    }

    let workers = ctx.options.parallelism_at(parent.depth + 1);
    for batch in [identified, unidentified] {
        parallel::for_each(workers, batch, |child| {
            let len = child.source.len();
            if !child.format.is_unknown() {
                ctx.log
                    .recognized(&child.display_path(), &child.format, child.depth);
            }
            process_unit(ctx, &child);
            ctx.report.entry_done(len);
            ctx.report.maybe_report(ctx.options.progress_cb.as_ref());
        });
    }
    ctx.report.subtract_container(container_total);
}

/// Containers sometimes carry members their directory table never names.
/// Search past the parsed region for the container's own magic and walk
/// whatever a restricted cut finds there.
fn tail_scan(ctx: &ScanCtx<'_>, unit: &ScanUnit, data: &SharedBytes, consumed: u64) {
    if data.len() as u64 > OVERSIZE_GUARD {
        return;
    }
    if unit.format.signature.is_none() {
        return;
    }
    let start = (consumed as usize).min(data.len());
    if start >= data.len() {
        return;
    }
    let tail = data.slice(start..data.len());
    let tree = cutter::cut(&tail, std::slice::from_ref(&unit.format));
    if !tree.is_empty() {
        walk_tree(ctx, unit, tree);
    }
}

fn compressed_extension(extension: &str) -> bool {
    COMPRESSED_EXTENSIONS
        .iter()
        .any(|e| extension.eq_ignore_ascii_case(e))
}

fn record_unknown(ctx: &ScanCtx<'_>, unit: &ScanUnit) {
    ctx.log.unknown(
        &unit.display_path(),
        unit.source.len(),
        &unit.format,
        unit.source.head(),
    );
    ctx.report
        .record_unknown(unit.source.len(), unit.depth, &unit.format);
}

fn record_unsupported(ctx: &ScanCtx<'_>, unit: &ScanUnit) {
    ctx.log
        .unsupported(&unit.display_path(), unit.source.len(), &unit.format);
    ctx.report
        .record_unsupported(unit.source.len(), &unit.format);
}
