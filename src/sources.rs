//!
//! Bounded, non-copying windows over a shared seekable byte source.
//!
//! Every element in a parsed tree is backed by a [`SegmentSource`] rather than
//! a copied buffer, so parsing a large container is offset bookkeeping instead
//! of byte copying.  Bytes are only materialized when a leaf decodes its value
//! or when output is produced.
//!

use std::cell::RefCell;
use std::cmp;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::rc::Rc;

/// Buffer size used when streaming window contents to a sink.
pub(crate) const DEFAULT_BUFFER_LEN: usize = 1024 * 64;

///
/// Anything a window can be built over: a readable, seekable byte source.
///
/// Blanket-implemented, so files, cursors and custom readers all qualify.
///
pub trait SourceStream: Read + Seek {}
impl<T: Read + Seek> SourceStream for T {}

///
/// A read-only view of the byte range `[offset, offset + size)` of an
/// underlying source.
///
/// Windows share the underlying source; re-slicing produces a narrower window
/// without copying any source data.  Each window carries its own cursor, and
/// [`Read`]/[`Seek`] are implemented in the window's local coordinate space
/// (position 0 is the window start).
///
/// Plain reads are clamped to the bytes actually available; the `_exact`
/// variants fail with [`io::ErrorKind::UnexpectedEof`] instead.
///
#[derive(Clone)]
pub struct SegmentSource {
    source: Rc<RefCell<dyn SourceStream>>,
    offset: u64,
    size: u64,
    pos: u64,
}

impl SegmentSource {
    ///
    /// Wraps an owned source in a root window spanning its full extent.
    ///
    pub fn new<R: SourceStream + 'static>(mut source: R) -> io::Result<Self> {
        let size = source.seek(SeekFrom::End(0))?;
        Ok(SegmentSource {
            source: Rc::new(RefCell::new(source)),
            offset: 0,
            size,
            pos: 0,
        })
    }

    ///
    /// Wraps an externally owned source.  The caller keeps its handle and must
    /// not read or seek the source concurrently with tree operations.
    ///
    pub fn from_shared(source: Rc<RefCell<dyn SourceStream>>) -> io::Result<Self> {
        let size = source.borrow_mut().seek(SeekFrom::End(0))?;
        Ok(SegmentSource { source, offset: 0, size, pos: 0 })
    }

    ///
    /// Builds an in-memory window owning `bytes`.  Used for freshly encoded
    /// element values.
    ///
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        SegmentSource {
            source: Rc::new(RefCell::new(io::Cursor::new(bytes))),
            offset: 0,
            size,
            pos: 0,
        }
    }

    /// Window length in bytes.
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Current cursor position, relative to the window start.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn set_position(&mut self, pos: u64) {
        self.pos = pos;
    }

    /// Bytes left between the cursor and the window end.
    pub fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.pos)
    }

    ///
    /// Carves a child window of `size` bytes starting at the current cursor
    /// and advances the cursor past it.  The size is trusted - the caller has
    /// already validated it against this window's remaining bytes.
    ///
    pub fn slice(&mut self, size: u64) -> SegmentSource {
        let child = self.slice_at(self.pos, size);
        self.pos += size;
        child
    }

    /// Carves a child window at an explicit offset without moving the cursor.
    pub fn slice_at(&self, offset: u64, size: u64) -> SegmentSource {
        SegmentSource {
            source: Rc::clone(&self.source),
            offset: self.offset + offset,
            size,
            pos: 0,
        }
    }

    ///
    /// Reads up to `count` bytes at `offset` without moving the cursor,
    /// clamped to the window's bounds.  Returns fewer bytes (possibly none)
    /// rather than failing on an out-of-range request.
    ///
    pub fn read_at(&self, offset: u64, count: u64) -> io::Result<Vec<u8>> {
        let available = self.size.saturating_sub(cmp::min(offset, self.size));
        let count = cmp::min(count, available);
        let mut buf = vec![0u8; count as usize];
        if count > 0 {
            let mut inner = self.source.borrow_mut();
            inner.seek(SeekFrom::Start(self.offset + offset))?;
            inner.read_exact(&mut buf)?;
        }
        Ok(buf)
    }

    ///
    /// Reads exactly `count` bytes at `offset`, failing with
    /// [`io::ErrorKind::UnexpectedEof`] if the window is too short.
    ///
    pub fn read_exact_at(&self, offset: u64, count: u64) -> io::Result<Vec<u8>> {
        if offset.checked_add(count).map_or(true, |end| end > self.size) {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read past end of segment",
            ));
        }
        self.read_at(offset, count)
    }

    /// Reads the single byte at `offset`.
    pub fn read_byte(&self, offset: u64) -> io::Result<u8> {
        Ok(self.read_exact_at(offset, 1)?[0])
    }

    /// Reads the window's full contents.
    pub fn read_all(&self) -> io::Result<Vec<u8>> {
        self.read_at(0, self.size)
    }

    ///
    /// Streams the window's full contents to `dest`, resetting the cursor to
    /// the window start first.  Returns the number of bytes written.
    ///
    pub fn copy_to<W: Write + ?Sized>(&mut self, dest: &mut W) -> io::Result<u64> {
        self.pos = 0;
        let mut buf = vec![0u8; cmp::min(self.size as usize, DEFAULT_BUFFER_LEN)];
        let mut written = 0u64;
        loop {
            let n = self.read(&mut buf)?;
            if n == 0 {
                break;
            }
            dest.write_all(&buf[..n])?;
            written += n as u64;
        }
        Ok(written)
    }
}

impl Read for SegmentSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = cmp::min(buf.len() as u64, self.remaining()) as usize;
        if n == 0 {
            return Ok(0);
        }
        {
            let mut inner = self.source.borrow_mut();
            inner.seek(SeekFrom::Start(self.offset + self.pos))?;
            inner.read_exact(&mut buf[..n])?;
        }
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for SegmentSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target: i128 = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::End(offset) => self.size as i128 + offset as i128,
            SeekFrom::Current(offset) => self.pos as i128 + offset as i128,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of segment",
            ));
        }
        // Seeking past the end is allowed; subsequent reads return nothing.
        self.pos = target as u64;
        Ok(self.pos)
    }
}

impl fmt::Debug for SegmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentSource")
            .field("offset", &self.offset)
            .field("size", &self.size)
            .field("pos", &self.pos)
            .finish()
    }
}
