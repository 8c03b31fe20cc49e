/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! Receive buffer with explicit compaction.
//!
//! [`ReceiveBuffer`] is a fixed-capacity byte arena plus a cursor marking
//! how many bytes are currently occupied. Socket reads append at the
//! cursor; compaction copies the unconsumed tail to the front so the next
//! read appends contiguously. Compaction is the only operation that changes
//! byte offsets of pending data.
//!
//! When the buffer is full the endpoint stops reading, which lets the OS
//! apply TCP-level backpressure to the peer.

/// Fixed-capacity receive buffer.
///
/// Invariant: `used <= capacity`. Bytes `[0, used)` are valid pending data;
/// bytes beyond `used` are undefined.
#[derive(Debug)]
pub struct ReceiveBuffer {
    data: Box<[u8]>,
    used: usize,
}

impl ReceiveBuffer {
    /// Creates a buffer with the given capacity.
    ///
    /// # Arguments
    /// * `capacity` - Fixed size of the backing storage in bytes
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            used: 0,
        }
    }

    /// Returns the total capacity in bytes.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of occupied bytes.
    #[inline]
    #[must_use]
    pub const fn used(&self) -> usize {
        self.used
    }

    /// Returns true if no pending data is buffered.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Returns the valid pending region `[0, used)`.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.used]
    }

    /// Returns the spare region `[used, capacity)` for the next read.
    ///
    /// An empty slice means the buffer is full and the caller must not read
    /// from the socket until compaction frees space.
    #[inline]
    pub fn writable(&mut self) -> &mut [u8] {
        &mut self.data[self.used..]
    }

    /// Marks `n` bytes of the spare region as occupied after a read.
    ///
    /// # Arguments
    /// * `n` - Number of bytes the read appended
    #[inline]
    pub fn commit(&mut self, n: usize) {
        debug_assert!(self.used + n <= self.data.len());
        self.used += n;
    }

    /// Moves the unconsumed tail `[offset, used)` to the front.
    ///
    /// `compact(0)` is a no-op; `compact(used)` empties the buffer.
    ///
    /// # Arguments
    /// * `offset` - Number of consumed bytes to discard from the front
    pub fn compact(&mut self, offset: usize) {
        debug_assert!(offset <= self.used);
        if offset == 0 {
            return;
        }
        self.data.copy_within(offset..self.used, 0);
        self.used -= offset;
    }

    /// Discards all pending data.
    #[inline]
    pub fn clear(&mut self) {
        self.used = 0;
    }
}
