//! Capabilities a format descriptor can carry.
//!
//! The catalog registers at most one capability per format; the scan engine
//! dispatches on the variant. Implementations must never panic on malformed
//! input — every offset is untrusted.

use std::fmt;
use std::sync::Arc;

use crate::archive::ArchiveTree;
use crate::bytes::SharedBytes;
use crate::error::FormatError;
use crate::texture::TextureEntry;

/// Opens container formats into an entry tree.
///
/// `name` is the payload's file name (used by formats that locate companion
/// files relative to their own name); `siblings` resolves such companions.
pub trait ArchiveOpener: Send + Sync {
    fn open(
        &self,
        data: &SharedBytes,
        name: &str,
        siblings: &dyn SiblingResolver,
    ) -> Result<ArchiveTree, FormatError>;
}

/// Expands compression wrappers.
pub trait Decompressor: Send + Sync {
    /// Cheap header probe. `head` holds at most the identification preview;
    /// `len` is the full payload length.
    fn is_match(&self, head: &[u8], len: u64) -> bool;

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, FormatError>;
}

/// Decodes texture container formats into drawable entries.
pub trait TextureOpener: Send + Sync {
    fn open(
        &self,
        data: &SharedBytes,
        name: &str,
        siblings: &dyn SiblingResolver,
    ) -> Result<Vec<TextureEntry>, FormatError>;
}

/// Resolves a named companion file.
///
/// At scan depth 0 the companion is a file in the same directory on disk;
/// inside a container it is a sibling entry of the current one. Formats like
/// NLCM (payload table in one file, bytes in another) and brtex/brplt pairs
/// depend on this.
pub trait SiblingResolver {
    fn request(&self, name: &str) -> Result<SharedBytes, FormatError>;
}

/// Resolver for contexts where companions can never exist.
pub struct NoSiblings;

impl SiblingResolver for NoSiblings {
    fn request(&self, name: &str) -> Result<SharedBytes, FormatError> {
        Err(FormatError::MissingSibling(name.to_string()))
    }
}

/// What the engine can do with an identified format.
#[derive(Clone)]
pub enum Capability {
    Archive(Arc<dyn ArchiveOpener>),
    Compression(Arc<dyn Decompressor>),
    Texture(Arc<dyn TextureOpener>),
}

impl Capability {
    pub fn label(&self) -> &'static str {
        match self {
            Capability::Archive(_) => "archive",
            Capability::Compression(_) => "compression",
            Capability::Texture(_) => "texture",
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability::{}", self.label())
    }
}
