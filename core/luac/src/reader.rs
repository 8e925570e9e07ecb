use crate::error::{ParseError, Result};
use byteorder::{LE, ReadBytesExt};
use std::io::Cursor;

/// Bounds-checked cursor over a chunk buffer.
///
/// Every read checks the remaining length first so a short buffer surfaces as
/// [`ParseError::TruncatedInput`] with the offending offset.
pub struct ChunkReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(ParseError::TruncatedInput {
                offset: self.position(),
                needed,
                remaining,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.cursor.read_u8()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.cursor.read_u32::<LE>()?)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.ensure(8)?;
        Ok(self.cursor.read_f64::<LE>()?)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let data: &'a [u8] = *self.cursor.get_ref();
        let start = self.position();
        self.cursor.set_position((start + len) as u64);
        Ok(&data[start..start + len])
    }

    /// Read a length-prefixed string.
    ///
    /// The length counts a trailing NUL. A length of zero means no string at all.
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let len = self.read_u32()? as usize;
        if len == 0 {
            return Ok(None);
        }
        let bytes = self.read_bytes(len)?;
        let body = bytes.strip_suffix(&[0]).unwrap_or(bytes);
        Ok(Some(String::from_utf8_lossy(body).into_owned()))
    }

    /// Read a section count and reject it early when even the smallest possible
    /// records could not fit in what is left of the buffer.
    pub fn read_count(&mut self, min_record_size: usize) -> Result<usize> {
        let count = self.read_u32()? as usize;
        let needed = count.saturating_mul(min_record_size);
        self.ensure(needed)?;
        Ok(count)
    }
}
