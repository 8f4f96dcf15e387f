/// Binary application image decoded from a hex file.
///
/// The buffer is allocated zero-filled at its full capacity; only the first
/// [`CodeImage::len`] bytes carry payload. The parser is the only writer: once it
/// hands the image over, the rest of the crate sees it through `&CodeImage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeImage {
    data: Vec<u8>,
    len: usize,
}

impl CodeImage {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Populated bytes only; never includes padding.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Stores `bytes` at `offset`. Returns `false` without writing anything when the
    /// run would end past the capacity.
    pub(crate) fn write_at(&mut self, offset: usize, bytes: &[u8]) -> bool {
        let end = match offset.checked_add(bytes.len()) {
            Some(end) if end <= self.data.len() => end,
            _ => return false,
        };
        self.data[offset..end].copy_from_slice(bytes);
        true
    }

    pub(crate) fn set_len(&mut self, len: usize) {
        self.len = len.min(self.data.len());
    }
}
