pub mod archive;
pub mod bytes;
pub mod capability;
pub mod error;
pub mod format;
pub mod gx;
pub mod texture;
pub mod util;

pub use archive::{ArchiveNode, ArchiveTree, NodeId, NodePayload};
pub use bytes::SharedBytes;
pub use capability::{
    ArchiveOpener, Capability, Decompressor, NoSiblings, SiblingResolver, TextureOpener,
};
pub use error::FormatError;
pub use format::{FormatInfo, FormatKind, MatcherFn, Signature};
pub use gx::{GxImageFormat, GxPaletteFormat};
pub use texture::{DecodedLevel, TextureEntry, WrapMode};
