//! Small helpers shared across the engine.

use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard};

/// Human-readable byte count: `"612 B"`, `"1.25 KB"`, `"3.20 MB"`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Replace characters that cannot appear in a file name with `%XX` escapes.
/// Applied to every path component that comes out of an archive, since entry
/// names are untrusted.
pub fn sanitize_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => {
                let _ = write!(out, "%{:02X}", c as u32);
            }
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "%{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    if out == "." || out == ".." {
        out = out.replace('.', "%2E");
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

/// Split `"name.ext"` into `("name", "ext")`. Names without a dot, names
/// that start with one, and names that end with one have no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 && i + 1 < name.len() => (&name[..i], &name[i + 1..]),
        _ => (name, ""),
    }
}

/// Lock a mutex, recovering the guard when a previous holder panicked; a
/// worker panic must not halt the rest of the scan.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(612), "612 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1280), "1.25 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("timg"), "timg");
        assert_eq!(sanitize_component("a:b*c"), "a%3Ab%2Ac");
        assert_eq!(sanitize_component(".."), "%2E%2E");
        assert_eq!(sanitize_component(""), "_");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("bg.tpl"), ("bg", "tpl"));
        assert_eq!(split_extension("a.arc.lz"), ("a.arc", "lz"));
        assert_eq!(split_extension("noext"), ("noext", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension("trailing."), ("trailing.", ""));
    }
}
