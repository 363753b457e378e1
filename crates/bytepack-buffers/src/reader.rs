//! Cursor reader over a borrowed byte slice.

use std::str;

use crate::BufferError;

/// A cursor over an immutable byte slice.
///
/// All accessors advance the cursor on success. The bounds-checked `try_*`
/// family returns [`BufferError::EndOfBuffer`] and leaves the cursor in place
/// when the read would cross the end of the slice; decoders build their
/// "unexpected end" errors on top of it.
///
/// # Example
///
/// ```
/// use bytepack_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = Reader::new(&data);
/// assert_eq!(reader.try_u8(), Ok(0x01));
/// assert_eq!(reader.try_u16(), Ok(0x0203));
/// ```
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at the start of `uint8`.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Rebinds the reader to a new slice and rewinds the cursor.
    pub fn reset(&mut self, uint8: &'a [u8]) {
        self.uint8 = uint8;
        self.x = 0;
    }

    /// Number of bytes left between the cursor and the end.
    pub fn remaining(&self) -> usize {
        self.uint8.len().saturating_sub(self.x)
    }

    /// Whether the cursor sits at or past the end of the slice.
    pub fn is_empty(&self) -> bool {
        self.x >= self.uint8.len()
    }

    /// Advances the cursor without reading.
    pub fn skip(&mut self, length: usize) {
        self.x += length;
    }

    /// Bounds-checked skip.
    pub fn try_skip(&mut self, length: usize) -> Result<(), BufferError> {
        self.check(length)?;
        self.x += length;
        Ok(())
    }

    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        // Remaining-based comparison: `x + n` could overflow on hostile
        // lengths.
        if self.uint8.len().saturating_sub(self.x) < n {
            Err(BufferError::EndOfBuffer)
        } else {
            Ok(())
        }
    }

    /// Returns the byte at the cursor without advancing.
    pub fn peek(&self) -> Result<u8, BufferError> {
        self.check(1)?;
        Ok(self.uint8[self.x])
    }

    #[inline]
    pub fn try_u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.uint8[self.x];
        self.x += 1;
        Ok(val)
    }

    #[inline]
    pub fn try_i8(&mut self) -> Result<i8, BufferError> {
        self.try_u8().map(|b| b as i8)
    }

    #[inline]
    pub fn try_u16(&mut self) -> Result<u16, BufferError> {
        self.check(2)?;
        let val = u16::from_be_bytes([self.uint8[self.x], self.uint8[self.x + 1]]);
        self.x += 2;
        Ok(val)
    }

    #[inline]
    pub fn try_u16_le(&mut self) -> Result<u16, BufferError> {
        self.check(2)?;
        let val = u16::from_le_bytes([self.uint8[self.x], self.uint8[self.x + 1]]);
        self.x += 2;
        Ok(val)
    }

    #[inline]
    pub fn try_i16(&mut self) -> Result<i16, BufferError> {
        self.try_u16().map(|v| v as i16)
    }

    #[inline]
    pub fn try_u32(&mut self) -> Result<u32, BufferError> {
        self.check(4)?;
        let val = u32::from_be_bytes(self.uint8[self.x..self.x + 4].try_into().unwrap());
        self.x += 4;
        Ok(val)
    }

    #[inline]
    pub fn try_u32_le(&mut self) -> Result<u32, BufferError> {
        self.check(4)?;
        let val = u32::from_le_bytes(self.uint8[self.x..self.x + 4].try_into().unwrap());
        self.x += 4;
        Ok(val)
    }

    #[inline]
    pub fn try_i32(&mut self) -> Result<i32, BufferError> {
        self.try_u32().map(|v| v as i32)
    }

    #[inline]
    pub fn try_i32_le(&mut self) -> Result<i32, BufferError> {
        self.try_u32_le().map(|v| v as i32)
    }

    #[inline]
    pub fn try_u64(&mut self) -> Result<u64, BufferError> {
        self.check(8)?;
        let val = u64::from_be_bytes(self.uint8[self.x..self.x + 8].try_into().unwrap());
        self.x += 8;
        Ok(val)
    }

    #[inline]
    pub fn try_u64_le(&mut self) -> Result<u64, BufferError> {
        self.check(8)?;
        let val = u64::from_le_bytes(self.uint8[self.x..self.x + 8].try_into().unwrap());
        self.x += 8;
        Ok(val)
    }

    #[inline]
    pub fn try_i64(&mut self) -> Result<i64, BufferError> {
        self.try_u64().map(|v| v as i64)
    }

    #[inline]
    pub fn try_i64_le(&mut self) -> Result<i64, BufferError> {
        self.try_u64_le().map(|v| v as i64)
    }

    #[inline]
    pub fn try_f32(&mut self) -> Result<f32, BufferError> {
        self.try_u32().map(f32::from_bits)
    }

    #[inline]
    pub fn try_f32_le(&mut self) -> Result<f32, BufferError> {
        self.try_u32_le().map(f32::from_bits)
    }

    #[inline]
    pub fn try_f64(&mut self) -> Result<f64, BufferError> {
        self.try_u64().map(f64::from_bits)
    }

    #[inline]
    pub fn try_f64_le(&mut self) -> Result<f64, BufferError> {
        self.try_u64_le().map(f64::from_bits)
    }

    /// Reads `size` raw bytes as a borrowed subslice.
    ///
    /// The returned slice borrows the reader's backing storage; it must not
    /// outlive a later [`reset`](Reader::reset).
    pub fn try_buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let start = self.x;
        self.x += size;
        Ok(&self.uint8[start..self.x])
    }

    /// Reads a UTF-8 string of `size` bytes as a borrowed `&str`.
    pub fn try_utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        self.check(size)?;
        let start = self.x;
        let slice = &self.uint8[start..start + size];
        let s = str::from_utf8(slice).map_err(|_| BufferError::InvalidUtf8)?;
        self.x += size;
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_reads_advance_cursor() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.try_u8(), Ok(0x01));
        assert_eq!(reader.try_u16(), Ok(0x0203));
        assert_eq!(reader.x, 3);
    }

    #[test]
    fn end_of_buffer_leaves_cursor_unmoved() {
        let data = [0x01];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.try_u16(), Err(BufferError::EndOfBuffer));
        assert_eq!(reader.x, 0);
        assert_eq!(reader.try_u8(), Ok(0x01));
        assert_eq!(reader.try_u8(), Err(BufferError::EndOfBuffer));
    }

    #[test]
    fn little_endian_reads() {
        let data = [0x02, 0x01, 0x06, 0x05, 0x04, 0x03];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.try_u16_le(), Ok(0x0102));
        assert_eq!(reader.try_u32_le(), Ok(0x03040506));
    }

    #[test]
    fn peek_does_not_advance() {
        let data = [0x55];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.peek(), Ok(0x55));
        assert_eq!(reader.x, 0);
        assert_eq!(reader.try_u8(), Ok(0x55));
    }

    #[test]
    fn buf_borrows_subslice() {
        let data = [1u8, 2, 3, 4, 5];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.try_buf(3), Ok(&data[..3]));
        assert_eq!(reader.x, 3);
        assert_eq!(reader.try_buf(3), Err(BufferError::EndOfBuffer));
        assert_eq!(reader.x, 3);
    }

    #[test]
    fn utf8_validates() {
        let mut reader = Reader::new(b"hi");
        assert_eq!(reader.try_utf8(2), Ok("hi"));
        let bad = [0xffu8, 0xfe];
        let mut reader = Reader::new(&bad);
        assert_eq!(reader.try_utf8(2), Err(BufferError::InvalidUtf8));
    }

    #[test]
    fn floats_roundtrip() {
        let bits = 1.5f64.to_be_bytes();
        let mut reader = Reader::new(&bits);
        assert_eq!(reader.try_f64(), Ok(1.5));
    }

    #[test]
    fn reset_rebinds() {
        let a = [1u8];
        let b = [2u8, 3];
        let mut reader = Reader::new(&a);
        let _ = reader.try_u8();
        reader.reset(&b);
        assert_eq!(reader.x, 0);
        assert_eq!(reader.try_u8(), Ok(2));
    }
}
