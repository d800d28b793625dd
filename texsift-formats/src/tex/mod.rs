//! Texture container formats.

mod bti;
mod tex;
mod tex0;
mod tpl;

pub use bti::{Bti, probe_bti};
pub use tex::{TexFile, tex_matcher};
pub use tex0::{Plt0, Tex0};
pub use tpl::{TPL_MAGIC, Tpl};
