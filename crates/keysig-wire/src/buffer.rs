use thiserror::Error;

/// Largest length prefix accepted when reading a string field: 16 MiB.
pub const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Errors raised while reading or writing wire fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A read asked for more bytes than remain in the buffer.
    #[error("buffer underrun: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Bytes requested by the read.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },
    /// Bytes remained after the last expected field.
    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),
    /// A length prefix exceeds [`MAX_STRING_LEN`].
    #[error("length {0} exceeds maximum string size")]
    TooLong(usize),
    /// A field expected to hold text is not valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,
    /// A name field contains an embedded NUL byte.
    #[error("string field contains an embedded NUL")]
    EmbeddedNul,
    /// An mpint field is negative or not minimally encoded.
    #[error("invalid mpint: {0}")]
    InvalidMpint(&'static str),
}

/// Owned byte buffer with a read cursor.
///
/// Writes always append at the end; reads consume from the cursor. Every
/// read is bounds-checked before any byte is touched, so a short or hostile
/// buffer yields [`WireError::Truncated`] rather than a panic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireBuf {
    data: Vec<u8>,
    pos: usize,
}

impl WireBuf {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer holding a copy of `bytes`, positioned at the start.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
            pos: 0,
        }
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Unread bytes, without consuming them.
    pub fn peek(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    /// Read offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Consumes the buffer, returning every byte written to it.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Fails with [`WireError::TrailingBytes`] if anything is left unread.
    pub fn finish(&self) -> Result<(), WireError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(WireError::TrailingBytes(n)),
        }
    }

    /// Reads exactly `len` raw bytes.
    pub fn get_bytes(&mut self, len: usize) -> Result<&[u8], WireError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(WireError::Truncated {
                needed: len,
                remaining,
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.data[start..self.pos])
    }

    /// Reads a single byte.
    pub fn get_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.get_bytes(1)?[0])
    }

    /// Reads a big-endian `uint32`.
    pub fn get_u32(&mut self) -> Result<u32, WireError> {
        let b = self.get_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads a big-endian `uint64`.
    pub fn get_u64(&mut self) -> Result<u64, WireError> {
        let b = self.get_bytes(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(u64::from_be_bytes(raw))
    }

    /// Reads a length-prefixed string as raw bytes.
    pub fn get_string(&mut self) -> Result<Vec<u8>, WireError> {
        let len = self.get_u32()? as usize;
        if len > MAX_STRING_LEN {
            return Err(WireError::TooLong(len));
        }
        Ok(self.get_bytes(len)?.to_vec())
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn get_utf8(&mut self) -> Result<String, WireError> {
        String::from_utf8(self.get_string()?).map_err(|_| WireError::InvalidUtf8)
    }

    /// Reads a length-prefixed UTF-8 string that must not contain NUL.
    ///
    /// Used for names: key types, algorithm names, namespaces.
    pub fn get_cstring(&mut self) -> Result<String, WireError> {
        let raw = self.get_string()?;
        if raw.contains(&0) {
            return Err(WireError::EmbeddedNul);
        }
        String::from_utf8(raw).map_err(|_| WireError::InvalidUtf8)
    }

    /// Reads a non-negative mpint, returning its big-endian magnitude
    /// without the sign-padding byte.
    pub fn get_mpint_unsigned(&mut self) -> Result<Vec<u8>, WireError> {
        let raw = self.get_string()?;
        match raw.as_slice() {
            [] => Ok(raw),
            [first, ..] if first & 0x80 != 0 => Err(WireError::InvalidMpint("negative")),
            [0, second, ..] if second & 0x80 == 0 => {
                Err(WireError::InvalidMpint("superfluous leading zero"))
            }
            [0] => Err(WireError::InvalidMpint("superfluous leading zero")),
            [0, rest @ ..] => Ok(rest.to_vec()),
            _ => Ok(raw),
        }
    }

    /// Appends raw bytes with no prefix.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Appends a single byte.
    pub fn put_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    /// Appends a big-endian `uint32`.
    pub fn put_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends a big-endian `uint64`.
    pub fn put_u64(&mut self, value: u64) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends a length-prefixed string.
    pub fn put_string(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        let len = u32::try_from(bytes.len()).map_err(|_| WireError::TooLong(bytes.len()))?;
        self.put_u32(len);
        self.put_bytes(bytes);
        Ok(())
    }

    /// Appends a non-negative mpint from its big-endian magnitude.
    pub fn put_mpint_unsigned(&mut self, magnitude: &[u8]) -> Result<(), WireError> {
        let start = magnitude
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(magnitude.len());
        let trimmed = &magnitude[start..];
        if trimmed.first().is_some_and(|b| b & 0x80 != 0) {
            let mut padded = Vec::with_capacity(trimmed.len() + 1);
            padded.push(0);
            padded.extend_from_slice(trimmed);
            self.put_string(&padded)
        } else {
            self.put_string(trimmed)
        }
    }
}

impl From<Vec<u8>> for WireBuf {
    fn from(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }
}

impl AsRef<[u8]> for WireBuf {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
