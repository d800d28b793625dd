//! The formats command: list everything the catalog can name.

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use texsift_core::FormatKind;
use texsift_formats::FormatCatalog;

/// Display order for the catalog groups.
const KIND_ORDER: &[FormatKind] = &[
    FormatKind::Archive,
    FormatKind::Rom,
    FormatKind::Texture,
    FormatKind::Model,
    FormatKind::Animation,
    FormatKind::Audio,
    FormatKind::Video,
    FormatKind::Text,
    FormatKind::Font,
    FormatKind::Layout,
    FormatKind::Else,
];

pub(crate) fn run_formats() {
    let catalog = FormatCatalog::standard();

    log::info!("Known formats:");

    for &kind in KIND_ORDER {
        let group: Vec<_> = catalog
            .formats()
            .iter()
            .filter(|f| f.kind == kind)
            .collect();
        if group.is_empty() {
            continue;
        }

        crate::log_blank();
        log::info!(
            "{}:",
            kind.display_name().if_supports_color(Stdout, |t| t.bold()),
        );

        for info in group {
            let lead = if info.extension.is_empty() {
                "-".to_string()
            } else {
                format!(".{}", info.extension)
            };
            let marker = match &info.capability {
                Some(cap) => format!(
                    " {}",
                    format!("({})", cap.label()).if_supports_color(Stdout, |t| t.green()),
                ),
                None => String::new(),
            };
            log::info!(
                "  {} [{}]{}",
                lead.if_supports_color(Stdout, |t| t.bold()),
                info.description.if_supports_color(Stdout, |t| t.cyan()),
                marker,
            );
            if let Some(sig) = &info.signature {
                if sig.offset() == 0 {
                    log::info!("    Magic: {}", sig.display());
                } else {
                    log::info!("    Magic: {} at +0x{:X}", sig.display(), sig.offset());
                }
            }
        }
    }

    let openable = catalog
        .formats()
        .iter()
        .filter(|f| f.capability.is_some())
        .count();
    crate::log_blank();
    log::info!(
        "Total: {} formats, {} with open support",
        catalog.formats().len(),
        openable,
    );
}
