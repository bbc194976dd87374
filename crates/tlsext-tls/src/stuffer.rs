//! Cursor-based byte buffer used for all extension wire encoding/decoding.
//!
//! A [`Stuffer`] holds the bytes written so far plus a read cursor that never
//! passes the write cursor. Growable stuffers expand on demand; fixed ones
//! reject writes that would exceed their capacity. Multi-byte integers are
//! big-endian (network order).

use std::fmt;

use tlsext_types::TlsError;
use tracing::trace;
use zeroize::Zeroize;

/// Minimum number of bytes a growable stuffer expands by.
pub const MIN_GROWTH: usize = 1024;

/// Largest value representable by a 24-bit length field.
pub const U24_MAX: u32 = 0x00FF_FFFF;

/// A 2-byte length placeholder returned by [`Stuffer::reserve_u16`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    offset: usize,
}

/// Bounds-checked byte buffer with independent read and write cursors.
pub struct Stuffer {
    /// Written bytes; `data.len()` is the write cursor.
    data: Vec<u8>,
    read_cursor: usize,
    capacity: usize,
    growable: bool,
}

impl fmt::Debug for Stuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stuffer")
            .field("read_cursor", &self.read_cursor)
            .field("write_cursor", &self.data.len())
            .field("capacity", &self.capacity)
            .field("growable", &self.growable)
            .finish()
    }
}

impl Stuffer {
    /// Create an empty buffer that grows on demand. `initial_capacity` may be 0.
    pub fn growable(initial_capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(initial_capacity),
            read_cursor: 0,
            capacity: initial_capacity,
            growable: true,
        }
    }

    /// Create an empty buffer that holds at most `capacity` bytes.
    pub fn fixed(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            read_cursor: 0,
            capacity,
            growable: false,
        }
    }

    /// Create a full, fixed-capacity buffer over a copy of `data`, ready for reading.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            read_cursor: 0,
            capacity: data.len(),
            growable: false,
        }
    }

    pub fn is_growable(&self) -> bool {
        self.growable
    }

    /// Current allocated size in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bytes written (the write cursor).
    pub fn written(&self) -> usize {
        self.data.len()
    }

    /// Number of unread bytes between the read and write cursors.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.read_cursor
    }

    /// Bytes that can still be written before a fixed buffer is full.
    pub fn space_remaining(&self) -> usize {
        self.capacity - self.data.len()
    }

    /// Returns true if every written byte has been read.
    pub fn is_consumed(&self) -> bool {
        self.remaining() == 0
    }

    /// All written bytes, regardless of the read cursor.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The bytes not yet read.
    pub fn unread(&self) -> &[u8] {
        &self.data[self.read_cursor..]
    }

    /// Rewind the read cursor to the start of the data.
    pub fn reread(&mut self) {
        self.read_cursor = 0;
    }

    /// Zero the contents and reset both cursors. Capacity is kept.
    pub fn wipe(&mut self) {
        self.data.zeroize();
        self.read_cursor = 0;
    }

    /// Move the write cursor back to `len`, discarding later bytes.
    ///
    /// Has no effect if fewer than `len` bytes are written.
    pub fn truncate(&mut self, len: usize) {
        if len < self.data.len() {
            self.data[len..].zeroize();
            self.data.truncate(len);
            self.read_cursor = self.read_cursor.min(len);
        }
    }

    // -----------------------------------------------------------------------
    // Writing
    // -----------------------------------------------------------------------

    fn reserve_space(&mut self, n: usize) -> Result<(), TlsError> {
        let available = self.space_remaining();
        if n <= available {
            return Ok(());
        }
        if !self.growable {
            return Err(TlsError::BufferFull {
                requested: n,
                available,
            });
        }
        let growth = (n - available).max(MIN_GROWTH);
        self.capacity += growth;
        self.data.reserve_exact(self.capacity - self.data.len());
        trace!(growth, capacity = self.capacity, "stuffer grown");
        Ok(())
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TlsError> {
        self.reserve_space(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    pub fn write_u8(&mut self, v: u8) -> Result<(), TlsError> {
        self.write_bytes(&[v])
    }

    pub fn write_u16(&mut self, v: u16) -> Result<(), TlsError> {
        self.write_bytes(&v.to_be_bytes())
    }

    /// Append a 3-byte big-endian integer. Values above `U24_MAX` are rejected.
    pub fn write_u24(&mut self, v: u32) -> Result<(), TlsError> {
        if v > U24_MAX {
            return Err(TlsError::IntegerOverflow {
                value: u64::from(v),
                bits: 24,
            });
        }
        self.write_bytes(&v.to_be_bytes()[1..])
    }

    pub fn write_u32(&mut self, v: u32) -> Result<(), TlsError> {
        self.write_bytes(&v.to_be_bytes())
    }

    /// Write a zero 2-byte length placeholder to be filled by
    /// [`write_vector_size`](Self::write_vector_size).
    pub fn reserve_u16(&mut self) -> Result<Reservation, TlsError> {
        let offset = self.data.len();
        self.write_u16(0)?;
        Ok(Reservation { offset })
    }

    /// Back-fill `reservation` with the number of bytes written after it.
    pub fn write_vector_size(&mut self, reservation: Reservation) -> Result<(), TlsError> {
        let start = reservation.offset + 2;
        let size = self
            .data
            .len()
            .checked_sub(start)
            .ok_or_else(|| TlsError::BadMessage("stale length reservation".into()))?;
        let size = u16::try_from(size).map_err(|_| TlsError::IntegerOverflow {
            value: size as u64,
            bits: 16,
        })?;
        self.data[reservation.offset..start].copy_from_slice(&size.to_be_bytes());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    /// Borrow the next `n` bytes and advance the read cursor past them.
    ///
    /// The returned slice borrows the stuffer, so it cannot outlive the next
    /// write; copy out anything that must be kept.
    pub fn read_bytes(&mut self, n: usize) -> Result<&[u8], TlsError> {
        let available = self.remaining();
        if n > available {
            return Err(TlsError::underflow(n, available));
        }
        let start = self.read_cursor;
        self.read_cursor += n;
        Ok(&self.data[start..start + n])
    }

    /// Advance the read cursor by `n` bytes without looking at them.
    pub fn skip(&mut self, n: usize) -> Result<(), TlsError> {
        self.read_bytes(n).map(|_| ())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], TlsError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, TlsError> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn read_u16(&mut self) -> Result<u16, TlsError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u24(&mut self) -> Result<u32, TlsError> {
        let [a, b, c] = self.read_array::<3>()?;
        Ok(u32::from_be_bytes([0, a, b, c]))
    }

    pub fn read_u32(&mut self) -> Result<u32, TlsError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }
}
