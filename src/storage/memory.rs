//! Storage implementations for reading and writing to an in-memory buffer. The buffer's capacity
//! is reserved up front from the size hint, but its length only grows as data is written.
use std::io::{self, Read, Seek, SeekFrom, Write};

use super::StorageProvider;

/// Creates a [`MemoryStorage`] with capacity reserved for the supplied size hint.
#[derive(Default, Clone, Copy, Debug)]
pub struct MemoryStorageProvider;

impl StorageProvider for MemoryStorageProvider {
    type Storage = MemoryStorage;

    fn create_storage(&self, size_hint: u64) -> io::Result<Self::Storage> {
        let capacity = usize::try_from(size_hint).map_err(|_| {
            io::Error::new(
                io::ErrorKind::OutOfMemory,
                format!("cannot reserve {size_hint} bytes in memory"),
            )
        })?;
        Ok(MemoryStorage::with_capacity(capacity))
    }
}

/// Growable in-memory buffer that supports the standard IO traits.
///
/// Seeking past the end is allowed. A write at such a position fills the gap with zeros.
#[derive(Default, Debug)]
pub struct MemoryStorage {
    inner: Vec<u8>,
    pos: usize,
}

impl MemoryStorage {
    /// Creates an empty buffer with at least `capacity` bytes reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Vec::with_capacity(capacity),
            pos: 0,
        }
    }

    /// Number of bytes held by the buffer.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of bytes the buffer can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Consumes the storage, returning the written bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.inner
    }
}

impl Read for MemoryStorage {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.inner.get(self.pos..).unwrap_or_default();
        let read_len = available.len().min(buf.len());
        buf[..read_len].copy_from_slice(&available[..read_len]);
        self.pos += read_len;
        Ok(read_len)
    }
}

impl Seek for MemoryStorage {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(pos) => Some(pos),
            SeekFrom::Current(from_current) => {
                (self.pos as u64).checked_add_signed(from_current)
            }
            SeekFrom::End(from_end) => (self.inner.len() as u64).checked_add_signed(from_end),
        }
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )
        })?;
        self.pos = usize::try_from(new_pos).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek position {new_pos} exceeds the addressable memory range"),
            )
        })?;
        Ok(new_pos)
    }
}

impl Write for MemoryStorage {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let end = self.pos.checked_add(buf.len()).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "write would end past the addressable memory range",
            )
        })?;
        if end > self.inner.len() {
            self.inner
                .try_reserve(end - self.inner.len())
                .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
            self.inner.resize(end, 0);
        }

        self.inner[self.pos..end].copy_from_slice(buf);

        self.pos = end;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
