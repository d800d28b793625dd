//! Scan engine: walks a directory or file, identifies every payload through
//! the format catalog, recurses into containers, and dumps GameCube/Wii
//! textures as Dolphin-convention PNGs.

pub mod breaker;
pub mod cascade;
pub mod cutter;
pub mod dump;
pub mod error;
pub mod logger;
pub mod options;
pub mod parallel;
pub mod report;
pub mod scanner;
pub mod settings;
pub mod util;

pub use error::ScanError;
pub use options::{ProgressFn, ScanOptions, TextureFn};
pub use report::{ScanProgress, ScanReport};
pub use scanner::TextureScanner;
