use crate::error::{IshneError, Result};

/// Sequential little-endian field reader over an in-memory header buffer.
///
/// The ISHNE fixed header is a flat run of fields at known offsets. Rather
/// than indexing the buffer ad hoc, each field is consumed in declaration
/// order through this cursor; running past the end of the buffer maps to
/// [`IshneError::TruncatedHeader`].
///
/// # Examples
///
/// ```rust
/// use ishne::utils::FieldReader;
///
/// let buf = [0x34, 0x12, 0xff, 0xff, 0xff, 0xff];
/// let mut r = FieldReader::new(&buf);
/// assert_eq!(r.read_u16().unwrap(), 0x1234);
/// assert_eq!(r.read_u32().unwrap(), u32::MAX);
/// assert!(r.read_u16().is_err()); // exhausted
/// ```
pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        FieldReader { buf, pos: 0 }
    }

    /// Current byte offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(IshneError::TruncatedHeader)?;
        if end > self.buf.len() {
            return Err(IshneError::TruncatedHeader);
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Advances past `n` bytes without interpreting them.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n)?;
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads a fixed-width ASCII field, stripping trailing NUL padding.
    ///
    /// Only trailing NULs are removed. Leading or interior NULs are part of
    /// the field value; a full trim would change what the format stores.
    pub fn read_ascii(&mut self, n: usize) -> Result<String> {
        let raw = self.take(n)?;
        Ok(String::from_utf8_lossy(trim_trailing_nuls(raw)).into_owned())
    }
}

/// Strips trailing NUL bytes from a fixed-width field.
pub fn trim_trailing_nuls(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |i| i + 1);
    &bytes[..end]
}
