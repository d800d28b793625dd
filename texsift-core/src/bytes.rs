//! Cheaply-cloneable windows into immutable byte buffers.
//!
//! Container entries and decompressed payloads all share one backing
//! allocation; slicing narrows the window without copying. `Cursor` over a
//! window gives a positioned reader where one is needed.

use std::fmt;
use std::io::Cursor;
use std::ops::Range;
use std::sync::Arc;

#[derive(Clone)]
pub struct SharedBytes {
    buf: Arc<[u8]>,
    start: usize,
    end: usize,
}

impl SharedBytes {
    pub fn new(data: Vec<u8>) -> Self {
        let buf: Arc<[u8]> = data.into();
        let end = buf.len();
        Self { buf, start: 0, end }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    /// Narrow to a sub-window. Bounds are clamped to the current window, so
    /// an oversized range yields a short (possibly empty) window rather than
    /// a panic — callers validate lengths where they matter.
    pub fn slice(&self, range: Range<usize>) -> SharedBytes {
        let len = self.len();
        let start = self.start + range.start.min(len);
        let end = (self.start + range.end.min(len)).max(start);
        Self {
            buf: Arc::clone(&self.buf),
            start,
            end,
        }
    }

    pub fn reader(&self) -> Cursor<SharedBytes> {
        Cursor::new(self.clone())
    }
}

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<Vec<u8>> for SharedBytes {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl PartialEq for SharedBytes {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for SharedBytes {}

impl fmt::Debug for SharedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedBytes({} bytes)", self.len())
    }
}
