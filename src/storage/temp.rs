//! Storage implementations for reading and writing to a temporary file. Each store owns its file
//! exclusively and the file is removed when the store is dropped or closed.
use std::fmt::{self, Debug};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, trace};

use super::StorageProvider;
use crate::WrapIoResult;

const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Creates a [`TempStorage`] backed by a temporary file
#[derive(Clone, Debug)]
pub struct TempStorageProvider {
    storage_dir: Option<PathBuf>,
    buffer_size: usize,
}

impl Default for TempStorageProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TempStorageProvider {
    /// Creates a new [`TempStorageProvider`] that creates temporary files in the OS-specific default
    /// location.
    pub fn new() -> Self {
        Self {
            storage_dir: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Creates a new [`TempStorageProvider`] that creates temporary files in the specified location.
    pub fn new_in(path: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: Some(path.into()),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Size of the read and write buffers placed in front of each file.
    #[must_use]
    pub fn buffer_size(mut self, buffer_size: NonZeroUsize) -> Self {
        self.buffer_size = buffer_size.get();
        self
    }
}

impl StorageProvider for TempStorageProvider {
    type Storage = TempStorage;

    fn create_storage(&self, _size_hint: u64) -> io::Result<Self::Storage> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(".switching-stream");
        let tempfile = if let Some(dir) = &self.storage_dir {
            builder.tempfile_in(dir)
        } else {
            builder.tempfile()
        }
        .wrap_err("error creating temp file")?;

        debug!(path = ?tempfile.path(), "created temp file");
        Ok(TempStorage {
            writer: BufWriter::with_capacity(self.buffer_size, tempfile),
            read_buf: vec![0; self.buffer_size].into_boxed_slice(),
            read_pos: 0,
            read_filled: 0,
        })
    }
}

/// Store created by a [`TempStorageProvider`]. Reads and writes are both buffered.
///
/// At most one of the two buffers holds data at a time: pending writes are flushed before the
/// read buffer is filled, and unread bytes are given back to the file before a write or seek.
pub struct TempStorage {
    writer: BufWriter<NamedTempFile>,
    read_buf: Box<[u8]>,
    read_pos: usize,
    read_filled: usize,
}

impl Debug for TempStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempStorage")
            .field("path", &self.path())
            .field("buffered_reads", &(self.read_filled - self.read_pos))
            .field("buffered_writes", &self.writer.buffer().len())
            .finish()
    }
}

impl TempStorage {
    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        self.writer.get_ref().path()
    }

    /// Flushes pending writes, then deletes the backing file.
    pub fn close(self) -> io::Result<()> {
        let tempfile = self.writer.into_inner().map_err(|e| e.into_error())?;
        let path = tempfile.path().to_owned();
        tempfile
            .close()
            .wrap_err(&format!("error removing temp file {}", path.display()))
    }

    // Moves the file cursor back over bytes that were read ahead but not consumed.
    fn discard_read_buffer(&mut self) -> io::Result<()> {
        let unread = self.read_filled - self.read_pos;
        if unread > 0 {
            self.writer
                .get_mut()
                .seek(SeekFrom::Current(-(unread as i64)))?;
        }
        self.read_pos = 0;
        self.read_filled = 0;
        Ok(())
    }
}

impl Read for TempStorage {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.read_pos == self.read_filled {
            self.writer.flush()?;
            if buf.len() >= self.read_buf.len() {
                return self.writer.get_mut().read(buf);
            }
            self.read_filled = self.writer.get_mut().read(&mut self.read_buf)?;
            self.read_pos = 0;
        }
        let available = &self.read_buf[self.read_pos..self.read_filled];
        let read_len = available.len().min(buf.len());
        buf[..read_len].copy_from_slice(&available[..read_len]);
        self.read_pos += read_len;
        trace!(read_len, "read from temp file");
        Ok(read_len)
    }
}

impl Seek for TempStorage {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.discard_read_buffer()?;
        self.writer.seek(pos)
    }
}

impl Write for TempStorage {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.discard_read_buffer()?;
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
