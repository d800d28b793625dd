//! Format descriptors: what a payload *is*, and how to recognize it.

use crate::capability::Capability;

/// Broad category a format belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Unknown,
    Archive,
    Rom,
    Texture,
    Audio,
    Model,
    Video,
    Text,
    Font,
    Layout,
    Animation,
    Else,
}

impl FormatKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            FormatKind::Unknown => "Unknown",
            FormatKind::Archive => "Archive",
            FormatKind::Rom => "Rom",
            FormatKind::Texture => "Texture",
            FormatKind::Audio => "Audio",
            FormatKind::Model => "Model",
            FormatKind::Video => "Video",
            FormatKind::Text => "Text",
            FormatKind::Font => "Font",
            FormatKind::Layout => "Layout",
            FormatKind::Animation => "Animation",
            FormatKind::Else => "Else",
        }
    }
}

/// Magic bytes at a fixed offset from the start of the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    bytes: Vec<u8>,
    offset: usize,
}

impl Signature {
    pub fn new(bytes: &[u8]) -> Self {
        Self::at(bytes, 0)
    }

    pub fn at(bytes: &[u8], offset: usize) -> Self {
        Self {
            bytes: bytes.to_vec(),
            offset,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn end(&self) -> usize {
        self.offset + self.bytes.len()
    }

    /// True when the signature bytes appear at their offset within `head`.
    pub fn matches(&self, head: &[u8]) -> bool {
        head.len() >= self.end() && head[self.offset..self.end()] == self.bytes[..]
    }

    /// Printable rendering for logs: ASCII as-is, the rest as `\xNN`.
    pub fn display(&self) -> String {
        let mut out = String::new();
        for &b in &self.bytes {
            if (0x20..0x7F).contains(&b) {
                out.push(b as char);
            } else {
                out.push_str(&format!("\\x{b:02X}"));
            }
        }
        out
    }
}

/// Custom match hook for formats whose identity needs more than a magic
/// (header plausibility checks, extension prefixes, ...).
pub type MatcherFn = fn(head: &[u8], len: u64, extension: &str) -> bool;

/// Everything known about one file format.
#[derive(Debug, Clone)]
pub struct FormatInfo {
    pub kind: FormatKind,
    /// Canonical extension, lowercase, no dot. Empty when the format has none.
    pub extension: String,
    pub signature: Option<Signature>,
    pub description: String,
    pub capability: Option<Capability>,
    pub matcher: Option<MatcherFn>,
}

impl FormatInfo {
    pub fn new(kind: FormatKind, extension: &str, description: &str) -> Self {
        Self {
            kind,
            extension: extension.to_ascii_lowercase(),
            signature: None,
            description: description.to_string(),
            capability: None,
            matcher: None,
        }
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capability = Some(capability);
        self
    }

    pub fn with_matcher(mut self, matcher: MatcherFn) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Descriptor for a payload nothing recognized.
    pub fn unknown(extension: &str) -> Self {
        Self::new(FormatKind::Unknown, extension, "unidentified data")
    }

    /// Synthesized descriptor for an unidentified payload: keeps the extension
    /// hint and records the leading four bytes as a signature when they look
    /// like a printable magic, so logs can name what was seen.
    pub fn sniff_unknown(head: &[u8], extension: &str) -> Self {
        let mut info = Self::unknown(extension);
        if head.len() >= 4 && head[..4].iter().all(|b| (0x21..0x7F).contains(b)) {
            info.signature = Some(Signature::new(&head[..4]));
        }
        info
    }

    /// Whether this descriptor claims the payload. Custom matchers win;
    /// otherwise a signature match, otherwise extension equality.
    pub fn matches(&self, head: &[u8], len: u64, extension: &str) -> bool {
        if let Some(m) = self.matcher {
            return m(head, len, extension);
        }
        if let Some(sig) = &self.signature {
            return sig.matches(head);
        }
        !self.extension.is_empty() && self.extension.eq_ignore_ascii_case(extension)
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == FormatKind::Unknown
    }

    /// Identification priority: descriptors with content evidence (signature
    /// or custom matcher) are consulted before extension-only ones.
    pub fn has_content_match(&self) -> bool {
        self.signature.is_some() || self.matcher.is_some()
    }

    /// "description (.ext)" for logs and listings.
    pub fn full_description(&self) -> String {
        if self.extension.is_empty() {
            self.description.clone()
        } else {
            format!("{} (.{})", self.description, self.extension)
        }
    }
}

/// Two descriptors are the same format when their extensions match
/// case-insensitively or their signatures match. This is deliberately not an
/// equivalence relation (no `Eq`), so seen-format collections stay `Vec`s
/// probed with `contains`.
impl PartialEq for FormatInfo {
    fn eq(&self, other: &Self) -> bool {
        if !self.extension.is_empty() && self.extension.eq_ignore_ascii_case(&other.extension) {
            return true;
        }
        match (&self.signature, &other.signature) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_match_at_offset() {
        let sig = Signature::at(b"TPL", 1);
        assert!(sig.matches(&[0x00, b'T', b'P', b'L', 0xFF]));
        assert!(!sig.matches(&[b'T', b'P', b'L', 0xFF]));
        assert!(!sig.matches(&[0x00, b'T', b'P']));
    }

    #[test]
    fn test_signature_display() {
        assert_eq!(Signature::new(b"RARC").display(), "RARC");
        assert_eq!(Signature::new(&[0x55, 0xAA]).display(), "\\x55\\xAA");
    }

    #[test]
    fn test_descriptor_equality() {
        let a = FormatInfo::new(FormatKind::Archive, "ARC", "a");
        let b = FormatInfo::new(FormatKind::Archive, "arc", "b");
        assert_eq!(a, b);

        let c = FormatInfo::new(FormatKind::Archive, "x", "c")
            .with_signature(Signature::new(b"RARC"));
        let d = FormatInfo::new(FormatKind::Archive, "y", "d")
            .with_signature(Signature::new(b"RARC"));
        assert_eq!(c, d);

        let e = FormatInfo::new(FormatKind::Archive, "", "e");
        let f = FormatInfo::new(FormatKind::Archive, "", "f");
        assert!(e != f);
    }

    #[test]
    fn test_sniff_unknown() {
        let info = FormatInfo::sniff_unknown(b"ABCD rest", "bin");
        assert_eq!(info.signature.as_ref().map(|s| s.display()).as_deref(), Some("ABCD"));
        assert!(info.is_unknown());

        let none = FormatInfo::sniff_unknown(&[0x00, 0x01, 0x02, 0x03], "bin");
        assert!(none.signature.is_none());
    }

    #[test]
    fn test_extension_fallback_match() {
        let info = FormatInfo::new(FormatKind::Texture, "bti", "texture");
        assert!(info.matches(&[], 10, "BTI"));
        assert!(!info.matches(&[], 10, "tpl"));
    }
}
