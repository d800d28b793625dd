//! Container formats the scan can recurse into.

mod brres;
mod nlcm;
mod rarc;
mod u8arc;

pub use brres::Brres;
pub use nlcm::Nlcm;
pub use rarc::Rarc;
pub use u8arc::{U8Arc, U8_MAGIC};
