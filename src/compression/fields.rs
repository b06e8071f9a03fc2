//! Fixed-width big-endian field helpers shared by the codec stream formats.

use crate::error::{Error, Result};

/// Sequential reader over a compressed stream.
///
/// Every read that runs past the end of the stream fails with [`Error::Truncated`].
pub(crate) struct FieldReader<'a> {
    codec: &'static str,
    data: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(codec: &'static str, data: &'a [u8]) -> Self {
        FieldReader { codec, data, pos: 0 }
    }

    /// Number of unread bytes
    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Offset of the next unread byte
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::Truncated {
                codec: self.codec,
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        buf.copy_from_slice(self.read_bytes(2)?);
        Ok(u16::from_be_bytes(buf))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.read_bytes(4)?);
        Ok(u32::from_be_bytes(buf))
    }

    /// Everything not read yet; the reader is exhausted afterwards.
    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }
}

pub(crate) fn put_u16(
    out: &mut Vec<u8>,
    codec: &'static str,
    field: &'static str,
    value: usize,
) -> Result<()> {
    let value = u16::try_from(value).map_err(|_| Error::Overflow {
        codec,
        field,
        value,
    })?;
    out.extend_from_slice(&value.to_be_bytes());
    Ok(())
}

pub(crate) fn put_u32(
    out: &mut Vec<u8>,
    codec: &'static str,
    field: &'static str,
    value: usize,
) -> Result<()> {
    let value = u32::try_from(value).map_err(|_| Error::Overflow {
        codec,
        field,
        value,
    })?;
    out.extend_from_slice(&value.to_be_bytes());
    Ok(())
}

/// Appends `length` bytes copied from `offset` bytes before the end of `output`.
///
/// The copy runs byte by byte, so a source range overlapping the bytes being written
/// repeats the pattern the way window decoders expect.
pub(crate) fn copy_back_reference(
    output: &mut Vec<u8>,
    codec: &'static str,
    offset: usize,
    length: usize,
) -> Result<()> {
    if offset == 0 || offset > output.len() {
        return Err(Error::format(
            codec,
            format!(
                "back reference offset {} with {} bytes of output",
                offset,
                output.len()
            ),
        ));
    }
    let start = output.len() - offset;
    output.reserve(length);
    for i in 0..length {
        output.push(output[start + i]);
    }
    Ok(())
}
