//! Bounds-checked reading over a byte slice.
//!
//! Every structure in the file is decoded through [`ByteCursor`], so a
//! truncated page or a bogus length turns into
//! [`DatabaseError::OutOfBounds`] instead of a panic.

use crate::types::error::{DatabaseError, Result};

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn at(bytes: &'a [u8], position: usize) -> Result<Self> {
        if position > bytes.len() {
            return Err(DatabaseError::OutOfBounds {
                offset: position,
                len: 0,
                size: bytes.len(),
            });
        }
        Ok(Self { bytes, position })
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.bytes.len() {
            return Err(DatabaseError::OutOfBounds {
                offset: position,
                len: 0,
                size: self.bytes.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let slice = slice_at(self.bytes, self.position, len)?;
        self.position += len;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Reads a zero-terminated array of little-endian `u32` values, stopping at
    /// the first zero or at the end of the buffer, whichever comes first.
    pub fn read_u32_until_zero(&mut self) -> Vec<u32> {
        let mut values = Vec::new();
        while self.remaining() >= 4 {
            match self.read_u32_le() {
                Ok(0) | Err(_) => break,
                Ok(value) => values.push(value),
            }
        }
        values
    }
}

/// Checked `&bytes[offset..offset + len]`.
pub fn slice_at(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset.checked_add(len).filter(|end| *end <= bytes.len());
    match end {
        Some(end) => Ok(&bytes[offset..end]),
        None => Err(DatabaseError::OutOfBounds {
            offset,
            len,
            size: bytes.len(),
        }),
    }
}
