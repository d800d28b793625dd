//! Compression wrappers the scan can expand in place.

mod lz77;
mod yay0;
mod yaz0;

pub use lz77::Lz77;
pub use yay0::Yay0;
pub use yaz0::Yaz0;

use texsift_core::FormatError;

/// Decoded sizes past this are treated as header corruption rather than
/// honored with a giant allocation.
pub(crate) const MAX_DECODED: usize = 1 << 30;

pub(crate) fn check_decoded_size(size: usize) -> Result<(), FormatError> {
    if size > MAX_DECODED {
        return Err(FormatError::corrupt(format!(
            "implausible decompressed size {size}"
        )));
    }
    Ok(())
}

pub(crate) fn byte(data: &[u8], pos: usize) -> Result<u8, FormatError> {
    data.get(pos)
        .copied()
        .ok_or_else(|| FormatError::corrupt("truncated compressed stream"))
}
