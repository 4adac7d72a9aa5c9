//! Bounds-checked reading over an encoded buffer.
//!
//! Every read either returns bytes that are inside the buffer or fails with
//! [`CodecError::TruncatedBuffer`]; the cursor never indexes past the end.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::CodecError;
use crate::format::Encoding;
use crate::varint;

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::TruncatedBuffer {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_u32_le(&mut self) -> Result<u32, CodecError> {
        self.take(4).map(LittleEndian::read_u32)
    }

    pub fn read_u64_le(&mut self) -> Result<u64, CodecError> {
        self.take(8).map(LittleEndian::read_u64)
    }

    pub fn read_varint(&mut self) -> Result<u64, CodecError> {
        varint::decode(self.buf, &mut self.pos)
    }

    /// Read the record count header.
    pub fn read_count(&mut self, encoding: Encoding) -> Result<u64, CodecError> {
        match encoding {
            Encoding::Fixed => self.read_u64_le(),
            Encoding::Varint => self.read_varint(),
        }
    }

    /// Read a key/value length prefix.
    pub fn read_len(&mut self, encoding: Encoding) -> Result<usize, CodecError> {
        let len = match encoding {
            Encoding::Fixed => u64::from(self.read_u32_le()?),
            Encoding::Varint => self.read_varint()?,
        };
        usize::try_from(len).map_err(|_| CodecError::LengthOverflow { encoding, len })
    }

    /// Read a length prefix followed by that many bytes.
    pub fn read_field(&mut self, encoding: Encoding) -> Result<&'a [u8], CodecError> {
        let len = self.read_len(encoding)?;
        self.take(len)
    }
}
