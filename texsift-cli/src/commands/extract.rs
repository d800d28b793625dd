//! The extract command: run a scan with a progress bar and print a summary.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use texsift_lib::util::format_bytes;
use texsift_lib::{ProgressFn, ScanOptions, ScanProgress, ScanReport, TextureScanner, settings};

use crate::cli_types::ExtractArgs;
use crate::error::CliError;
use crate::logging::CliLogger;

pub(crate) fn run_extract(logger: &'static CliLogger, args: ExtractArgs) -> Result<(), CliError> {
    let output = settings::resolve_output_dir(args.output.clone(), &args.input);
    let tasks = args.tasks.or_else(settings::load_tasks).unwrap_or(0);

    log::info!(
        "Scanning: {}",
        args.input.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!(
        "Output:   {}",
        output.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    if args.dry_run {
        log::info!(
            "{}",
            "Dry run: no files will be written".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if args.force {
        log::info!(
            "{}",
            "Force mode: unidentified payloads get probed hard"
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if args.tasks.is_none() && tasks != 0 {
        log::info!(
            "{}",
            format!("Using saved default: {tasks} tasks").if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "  {spinner:.cyan} [{bar:30.cyan/dim}] {bytes}/{total_bytes} {msg}",
        )
        .expect("static pattern")
        .progress_chars("━╸─")
        .tick_chars("/-\\|"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    logger.set_bar(Some(pb.clone()));

    let bar = pb.clone();
    let progress: ProgressFn = Arc::new(move |p: &ScanProgress| {
        if bar.length() != Some(p.bytes_total) {
            bar.set_length(p.bytes_total);
        }
        bar.set_position(p.bytes_done);
        bar.set_message(format!("{}/{} files", p.files_done, p.files_total));
    });

    let options = ScanOptions {
        parallelism: tasks,
        max_depth: args.depth,
        force: args.force,
        dry_run: args.dry_run,
        raw: args.raw,
        mips: args.mips,
        arbitrary_mip_detection: !args.no_arb_detect,
        progress_cb: Some(progress),
        log_dir: args.log_dir.clone(),
        ..ScanOptions::default()
    };

    let result = TextureScanner::with_options(&args.input, &output, options).scan();
    pb.finish_and_clear();
    logger.set_bar(None);
    let report = result?;

    print_summary(&report);
    Ok(())
}

/// Print the run summary in the shape the run-log footer uses, colored.
fn print_summary(report: &ScanReport) {
    log::info!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
    log::info!(
        "  {} {} textures extracted ({})",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        report.extracted_count,
        format_bytes(report.extracted_bytes),
    );
    if report.unsupported_count > 0 {
        log::info!(
            "  {} {} unsupported files ({})",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            report.unsupported_count,
            format_bytes(report.unsupported_bytes),
        );
    }
    if report.unknown_count > 0 {
        log::info!(
            "  {} {} unidentified files ({})",
            "?".if_supports_color(Stdout, |t| t.yellow()),
            report.unknown_count,
            format_bytes(report.unknown_bytes),
        );
    }
    log::info!(
        "  Extraction rate: ~{:.2}%",
        report.extraction_rate() * 100.0,
    );
    log::info!("  Scan time: {:.2}s", report.elapsed.as_secs_f64());
    if let Some(path) = &report.log_path {
        log::info!(
            "  Log: {}",
            path.display().if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    if !report.unsupported_formats.is_empty() {
        crate::log_blank();
        log::info!(
            "{}",
            "Unsupported formats:".if_supports_color(Stdout, |t| t.bold()),
        );
        for format in &report.unsupported_formats {
            log::info!("  {}", format.full_description());
        }
    }
    if !report.unknown_formats.is_empty() {
        crate::log_blank();
        log::info!(
            "{}",
            "Unknown formats seen:".if_supports_color(Stdout, |t| t.bold()),
        );
        for format in &report.unknown_formats {
            let label = match (&format.signature, format.extension.is_empty()) {
                (Some(sig), _) => format!("Magic: {}", sig.display()),
                (None, false) => format!(".{}", format.extension),
                (None, true) => "no signature".to_string(),
            };
            log::info!("  {label}");
        }
    }
}
