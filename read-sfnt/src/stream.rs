//! Buffered big-endian access to a font byte source.

use std::io::{Read, Seek, SeekFrom};

use crate::ReadError;

/// Size of the internal window. Large enough that table headers and
/// typical glyph records are served from a single refill.
const BUFFER_LEN: usize = 4096;

/// A buffered, seekable, big-endian reader over a font byte source.
///
/// Sequential reads are served from a fixed-size window; a seek that
/// leaves the window discards it and refills from the new position.
/// When a multi-byte value straddles the window edge the unconsumed
/// tail is shifted to the front before refilling, so values never need
/// to be assembled across two reads.
pub struct FontStream<R> {
    source: R,
    buf: Box<[u8]>,
    /// Absolute source offset of `buf[0]`.
    window_start: u64,
    /// Number of valid bytes in `buf`.
    window_len: usize,
    /// Cursor within the window.
    pos: usize,
}

impl<R: Read + Seek> FontStream<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            buf: vec![0; BUFFER_LEN].into_boxed_slice(),
            window_start: 0,
            window_len: 0,
            pos: 0,
        }
    }

    /// The absolute position of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.window_start + self.pos as u64
    }

    /// Repositions the cursor to an absolute byte offset.
    pub fn seek(&mut self, offset: u64) -> Result<(), ReadError> {
        if offset >= self.window_start && offset <= self.window_start + self.window_len as u64 {
            self.pos = (offset - self.window_start) as usize;
            return Ok(());
        }
        self.source.seek(SeekFrom::Start(offset))?;
        self.window_start = offset;
        self.window_len = 0;
        self.pos = 0;
        Ok(())
    }

    /// Advances the cursor by `count` bytes without decoding them.
    pub fn skip(&mut self, count: u64) -> Result<(), ReadError> {
        self.seek(self.position() + count)
    }

    /// Ensures at least `count` bytes are available at the cursor,
    /// refilling the window as needed.
    fn ensure(&mut self, count: usize) -> Result<(), ReadError> {
        debug_assert!(count <= BUFFER_LEN);
        if self.pos + count <= self.window_len {
            return Ok(());
        }
        // Move the unconsumed tail to the front of the window.
        self.buf.copy_within(self.pos..self.window_len, 0);
        self.window_start += self.pos as u64;
        self.window_len -= self.pos;
        self.pos = 0;
        while self.window_len < count {
            let read = self.source.read(&mut self.buf[self.window_len..])?;
            if read == 0 {
                return Err(ReadError::UnexpectedEof);
            }
            self.window_len += read;
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        self.ensure(N)?;
        let mut out = [0; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ReadError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, ReadError> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, ReadError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, ReadError> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    /// Reads `count` bytes into an owned buffer.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, ReadError> {
        let mut out = vec![0; count];
        let buffered = (self.window_len - self.pos).min(count);
        out[..buffered].copy_from_slice(&self.buf[self.pos..self.pos + buffered]);
        self.pos += buffered;
        if buffered < count {
            // The rest bypasses the window; account for it as consumed.
            self.source.read_exact(&mut out[buffered..])?;
            self.window_start = self.position() + (count - buffered) as u64;
            self.window_len = 0;
            self.pos = 0;
        }
        Ok(out)
    }
}

impl FontStream<std::io::Cursor<Vec<u8>>> {
    /// Creates a stream over an in-memory font.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self::new(std::io::Cursor::new(data))
    }
}
