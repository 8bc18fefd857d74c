use std::fmt::{self, Debug};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::mem;
use std::path::Path;

use tracing::{debug, instrument, trace};

use crate::settings::MigrateFn;
use crate::storage::memory::{MemoryStorage, MemoryStorageProvider};
use crate::storage::temp::{TempStorage, TempStorageProvider};
use crate::storage::{Storage, StorageProvider};
use crate::{Error, Migration, Settings};

/// The backing store currently holding a [`SwitchingStream`]'s bytes.
#[derive(Debug)]
pub enum Store<S> {
    /// Initial store: a fresh memory buffer or the stream passed to
    /// [`SwitchingStream::wrap`].
    Memory(S),
    /// Temporary file the content was moved to.
    File(TempStorage),
}

impl<S> Store<S> {
    /// Returns `true` for the [`Store::Memory`] variant.
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory(_))
    }
}

impl<S: Storage> Read for Store<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Memory(inner) => inner.read(buf),
            Self::File(inner) => inner.read(buf),
        }
    }
}

impl<S: Storage> Seek for Store<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::Memory(inner) => inner.seek(pos),
            Self::File(inner) => inner.seek(pos),
        }
    }
}

impl<S: Storage> Write for Store<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Memory(inner) => inner.write(buf),
            Self::File(inner) => inner.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Memory(inner) => inner.flush(),
            Self::File(inner) => inner.flush(),
        }
    }
}

/// A seekable byte stream that starts in memory and moves its content to a temporary file once
/// its length reaches a threshold.
///
/// Only writes can trigger the move, and it happens at most once. The logical position is kept
/// across the move, so sequential writes continue where they left off.
///
/// Length and position are tracked alongside the store, so [`len`](Self::len) and
/// [`position`](Self::position) never touch the underlying file.
pub struct SwitchingStream<S = MemoryStorage> {
    store: Store<S>,
    pos: u64,
    len: u64,
    expected_length: u64,
    threshold_length: u64,
    switching_disabled: bool,
    temp_provider: TempStorageProvider,
    copy_buffer_size: usize,
    on_migrate: Option<MigrateFn>,
}

impl<S: Debug> Debug for SwitchingStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchingStream")
            .field("store", &self.store)
            .field("pos", &self.pos)
            .field("len", &self.len)
            .field("expected_length", &self.expected_length)
            .field("threshold_length", &self.threshold_length)
            .field("switching_disabled", &self.switching_disabled)
            .finish_non_exhaustive()
    }
}

impl SwitchingStream<MemoryStorage> {
    /// Creates an empty stream.
    ///
    /// The stream starts in memory, with capacity reserved for the expected length, when
    /// switching is disabled or the expected length is below the threshold. Otherwise it goes
    /// straight to a temporary file.
    pub fn new(settings: Settings) -> Result<Self, Error> {
        let store = if settings.switching_disabled
            || settings.expected_length < settings.threshold_length
        {
            debug!(
                expected_length = settings.expected_length,
                "creating memory store"
            );
            Store::Memory(MemoryStorageProvider.create_storage(settings.expected_length)?)
        } else {
            debug!(
                expected_length = settings.expected_length,
                threshold_length = settings.threshold_length,
                "expected length reaches threshold, creating file store"
            );
            let provider = temp_provider(&settings);
            Store::File(provider.create_storage(settings.expected_length)?)
        };

        let mut stream = Self::from_store(store, 0, settings);
        stream.store.seek(SeekFrom::Start(0))?;
        Ok(stream)
    }
}

impl<S: Storage> SwitchingStream<S> {
    /// Wraps an existing stream. Its current content is kept and the position is reset to the
    /// start.
    ///
    /// Fails with [`Error::NotSeekable`] if `stream` can't seek. If the expected length reaches
    /// the threshold and switching is enabled, the content is moved to a temporary file before
    /// this returns.
    pub fn wrap(mut stream: S, settings: Settings) -> Result<Self, Error> {
        let len = stream
            .stream_position()
            .and_then(|_| stream.seek(SeekFrom::End(0)))
            .map_err(Error::NotSeekable)?;
        stream.seek(SeekFrom::Start(0))?;

        debug!(len, "wrapping existing stream");
        let mut stream = Self::from_store(Store::Memory(stream), len, settings);
        if stream.expected_length >= stream.threshold_length {
            stream.migrate()?;
        }
        Ok(stream)
    }

    fn from_store(store: Store<S>, len: u64, settings: Settings) -> Self {
        Self {
            store,
            pos: 0,
            len,
            temp_provider: temp_provider(&settings),
            expected_length: settings.expected_length,
            threshold_length: settings.threshold_length,
            switching_disabled: settings.switching_disabled,
            copy_buffer_size: settings.copy_buffer_size.get(),
            on_migrate: settings.on_migrate,
        }
    }

    /// Returns `true` while the content is held by the initial store.
    pub fn is_in_memory(&self) -> bool {
        self.store.is_memory()
    }

    /// Length of the content in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the stream holds no content.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current position in the stream.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Moves to `position`, which may be at most [`len`](Self::len).
    pub fn set_position(&mut self, position: u64) -> Result<(), Error> {
        if position > self.len {
            return Err(Error::PositionOutOfRange {
                position,
                length: self.len,
            });
        }
        self.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    /// Always fails: the length only changes through writes.
    pub fn set_len(&mut self, _len: u64) -> Result<(), Error> {
        Err(Error::SetLengthUnsupported)
    }

    /// Reads a single byte, returning `None` at the end of the stream.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0];
        match self.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Always `true`.
    pub fn can_read(&self) -> bool {
        true
    }

    /// Always `true`.
    pub fn can_seek(&self) -> bool {
        true
    }

    /// Always `false`, even though [`Write`] is supported. Kept for callers that treat this
    /// stream as a read-side body.
    pub fn can_write(&self) -> bool {
        false
    }

    /// Always `false`. Operations block for as long as the underlying store does.
    pub fn can_timeout(&self) -> bool {
        false
    }

    /// Declared expected length.
    pub fn expected_length(&self) -> u64 {
        self.expected_length
    }

    /// Length at which the content moves to a temporary file.
    pub fn threshold_length(&self) -> u64 {
        self.threshold_length
    }

    /// Returns `true` if the stream never leaves its initial store.
    pub fn switching_disabled(&self) -> bool {
        self.switching_disabled
    }

    /// Path of the temporary file once the content has moved to disk.
    pub fn temp_path(&self) -> Option<&Path> {
        match &self.store {
            Store::Memory(_) => None,
            Store::File(file) => Some(file.path()),
        }
    }

    /// Consumes the stream, returning the active store.
    pub fn into_inner(self) -> Store<S> {
        self.store
    }

    /// Flushes and releases the active store. A temporary file is deleted.
    pub fn close(self) -> io::Result<()> {
        match self.store {
            Store::Memory(mut inner) => inner.flush(),
            Store::File(inner) => inner.close(),
        }
    }

    #[instrument(skip(self), fields(len = self.len, pos = self.pos))]
    fn migrate(&mut self) -> io::Result<()> {
        if self.switching_disabled {
            return Ok(());
        }
        let Store::Memory(current) = &mut self.store else {
            return Ok(());
        };

        let mut file = self.temp_provider.create_storage(self.len)?;
        let mut copied = 0;
        if self.len > 0 {
            current.seek(SeekFrom::Start(0))?;
            let mut buf = vec![0; self.copy_buffer_size];
            loop {
                let read_len = match current.read(&mut buf) {
                    Ok(0) => break,
                    Ok(read_len) => read_len,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                file.write_all(&buf[..read_len])?;
                copied += read_len as u64;
            }
        }
        current.flush()?;
        // The new store resumes at the logical position the old one had.
        file.seek(SeekFrom::Start(self.pos))?;

        let previous = mem::replace(&mut self.store, Store::File(file));
        drop(previous);
        debug!(copied, "moved content to temp file");

        if let (Some(on_migrate), Store::File(file)) = (&mut self.on_migrate, &self.store) {
            on_migrate(Migration {
                bytes_copied: copied,
                path: file.path(),
            });
        }
        Ok(())
    }
}

fn temp_provider(settings: &Settings) -> TempStorageProvider {
    let provider = match &settings.temp_dir {
        Some(dir) => TempStorageProvider::new_in(dir),
        None => TempStorageProvider::new(),
    };
    provider.buffer_size(settings.copy_buffer_size)
}

impl<S: Storage> Read for SwitchingStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read_len = self.store.read(buf)?;
        self.pos += read_len as u64;
        trace!(read_len, pos = self.pos, "read");
        Ok(read_len)
    }
}

impl<S: Storage> Seek for SwitchingStream<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.pos = self.store.seek(pos)?;
        trace!(pos = self.pos, "seek");
        Ok(self.pos)
    }
}

impl<S: Storage> Write for SwitchingStream<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.store.write(buf)?;
        self.pos += written as u64;
        self.len = self.len.max(self.pos);
        trace!(written, len = self.len, "write");

        if !self.switching_disabled && self.is_in_memory() && self.len >= self.threshold_length {
            debug!(
                len = self.len,
                threshold_length = self.threshold_length,
                "threshold reached"
            );
            self.migrate()?;
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.store.flush()
    }
}

#[cfg(test)]
#[path = "./stream_test.rs"]
mod stream_test;
