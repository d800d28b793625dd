//! Format identification and concrete format handlers.
//!
//! [`FormatCatalog`] maps payload bytes (plus an extension hint) to a
//! [`texsift_core::FormatInfo`]; the submodules implement the archive
//! openers, decompressors, and texture readers those descriptors carry.

pub mod arch;
pub mod catalog;
pub mod compress;
pub mod tex;

pub use catalog::{FormatCatalog, HEAD_LEN};
