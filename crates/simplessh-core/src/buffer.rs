//! Growable capture buffer for channel streams.
//!
//! Capacity starts small and doubles whenever headroom drops below
//! [`HEADROOM`], with each growth step capped at [`MAX_GROWTH`] bytes.

/// Initial physical capacity.
pub const INITIAL_CAPACITY: usize = 128;

/// Minimum free space kept ahead of the logical length.
pub const HEADROOM: usize = 1024;

/// Largest number of bytes added by a single growth step.
pub const MAX_GROWTH: usize = 64 * 1024;

/// A byte region with logical length <= physical capacity.
///
/// The last physical byte is never handed out by [`spare_mut`](Self::spare_mut).
#[derive(Debug, Clone)]
pub struct GrowableBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl GrowableBuffer {
    pub fn new() -> Self {
        Self {
            bytes: vec![0; INITIAL_CAPACITY],
            len: 0,
        }
    }

    /// Number of bytes captured so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current physical capacity.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// The writable region past the logical end.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        let end = self.bytes.len() - 1;
        &mut self.bytes[self.len..end]
    }

    /// Commit `n` bytes written into [`spare_mut`](Self::spare_mut), growing
    /// the buffer if headroom fell below [`HEADROOM`].
    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.len + n < self.bytes.len());
        self.len += n;
        if self.bytes.len() - self.len < HEADROOM {
            let capacity = self.bytes.len();
            let grown = (capacity * 2).min(capacity + MAX_GROWTH);
            self.bytes.resize(grown, 0);
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Shrink to the logical length and hand the bytes over.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.bytes.truncate(self.len);
        self.bytes.shrink_to_fit();
        self.bytes
    }
}

impl Default for GrowableBuffer {
    fn default() -> Self {
        Self::new()
    }
}
