//! Content-backed pseudo-files
//!
//! A file node holds a [`ContentProvider`]; every open asks it for a fresh
//! [`ContentBackend`] that owns the cursor for that handle.

use alloc::{boxed::Box, string::String, sync::Arc, vec::Vec};
use spin::Mutex;

use crate::error::{errno, DevError, DevResult};
use crate::types::{OpenFlags, SeekWhence};

/// Per-open content state
pub trait ContentBackend: Send {
    fn read(&mut self, buf: &mut [u8]) -> DevResult<usize>;

    fn write(&mut self, buf: &[u8]) -> DevResult<usize>;

    fn seek(&mut self, offset: i64, whence: SeekWhence) -> DevResult<i64>;

    fn flush(&mut self) -> DevResult<()> {
        Ok(())
    }

    fn close(&mut self) -> DevResult<()> {
        Ok(())
    }

    /// Whether writes can succeed on this open
    fn writable(&self) -> bool;
}

/// Source of content for a file node
pub trait ContentProvider: Send + Sync {
    fn open(&self, flags: OpenFlags) -> DevResult<Box<dyn ContentBackend>>;

    /// Size reported by stat
    fn size(&self) -> u64;
}

fn seek_target(pos: usize, len: usize, offset: i64, whence: SeekWhence) -> DevResult<usize> {
    let base = match whence {
        SeekWhence::Set => 0,
        SeekWhence::Cur => pos as i64,
        SeekWhence::End => len as i64,
    };
    let target = base.checked_add(offset).ok_or(DevError::Io(errno::EINVAL))?;
    usize::try_from(target).map_err(|_| DevError::Io(errno::EINVAL))
}

/// Cursor over an in-memory byte buffer
pub struct BufferCursor {
    data: Vec<u8>,
    pos: usize,
    capacity: Option<usize>,
    writable: bool,
    dirty: bool,
    commit: Option<Arc<Mutex<Vec<u8>>>>,
}

impl BufferCursor {
    /// Read-only cursor
    pub fn read_only(data: Vec<u8>) -> Self {
        Self {
            data,
            pos: 0,
            capacity: None,
            writable: false,
            dirty: false,
            commit: None,
        }
    }

    /// Cursor whose writes are copied back into `target` on flush and close
    fn shared(target: Arc<Mutex<Vec<u8>>>, capacity: usize, writable: bool) -> Self {
        let data = target.lock().clone();
        Self {
            data,
            pos: 0,
            capacity: Some(capacity),
            writable,
            dirty: false,
            commit: Some(target),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl ContentBackend for BufferCursor {
    fn read(&mut self, buf: &mut [u8]) -> DevResult<usize> {
        if self.pos >= self.data.len() {
            return Ok(0);
        }
        let len = core::cmp::min(buf.len(), self.data.len() - self.pos);
        buf[..len].copy_from_slice(&self.data[self.pos..self.pos + len]);
        self.pos += len;
        Ok(len)
    }

    fn write(&mut self, buf: &[u8]) -> DevResult<usize> {
        if !self.writable {
            return Err(DevError::AccessDenied);
        }
        let limit = self.capacity.unwrap_or(usize::MAX);
        if self.pos >= limit {
            return if buf.is_empty() { Ok(0) } else { Err(DevError::Io(errno::ENOSPC)) };
        }
        let len = core::cmp::min(buf.len(), limit - self.pos);
        let end = self.pos + len;
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(&buf[..len]);
        self.pos = end;
        self.dirty = true;
        Ok(len)
    }

    fn seek(&mut self, offset: i64, whence: SeekWhence) -> DevResult<i64> {
        self.pos = seek_target(self.pos, self.data.len(), offset, whence)?;
        Ok(self.pos as i64)
    }

    fn flush(&mut self) -> DevResult<()> {
        if self.dirty {
            if let Some(target) = &self.commit {
                *target.lock() = self.data.clone();
            }
            self.dirty = false;
        }
        Ok(())
    }

    fn close(&mut self) -> DevResult<()> {
        self.flush()
    }

    fn writable(&self) -> bool {
        self.writable
    }
}

/// Read-only text file
pub struct TextFile {
    text: String,
}

impl TextFile {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ContentProvider for TextFile {
    fn open(&self, _flags: OpenFlags) -> DevResult<Box<dyn ContentBackend>> {
        Ok(Box::new(BufferCursor::read_only(self.text.as_bytes().to_vec())))
    }

    fn size(&self) -> u64 {
        self.text.len() as u64
    }
}

/// Fixed-capacity byte buffer shared by every open of the file.
///
/// Each open works on a snapshot; writes become visible to later opens
/// once the writing handle is flushed or closed.
pub struct SharedBuffer {
    data: Arc<Mutex<Vec<u8>>>,
    capacity: usize,
}

impl SharedBuffer {
    /// Zero-filled buffer of `capacity` bytes
    pub fn zeroed(capacity: usize) -> Self {
        Self {
            data: Arc::new(Mutex::new(alloc::vec![0u8; capacity])),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current committed contents
    pub fn snapshot(&self) -> Vec<u8> {
        self.data.lock().clone()
    }
}

impl ContentProvider for SharedBuffer {
    fn open(&self, flags: OpenFlags) -> DevResult<Box<dyn ContentBackend>> {
        let writable = flags.contains(OpenFlags::WRITE);
        Ok(Box::new(BufferCursor::shared(self.data.clone(), self.capacity, writable)))
    }

    fn size(&self) -> u64 {
        self.data.lock().len() as u64
    }
}
