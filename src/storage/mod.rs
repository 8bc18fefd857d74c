//! Backing stores for a [`SwitchingStream`](crate::SwitchingStream).
//! Implementations are available for an in-memory buffer and for a temporary file.
use std::io::{self, Read, Seek, Write};

pub mod memory;
pub mod temp;

/// Creates a [`Storage`] sized for the expected amount of content.
pub trait StorageProvider {
    /// Store created by this provider.
    type Storage: Storage;

    /// Create a new, empty store. `size_hint` is the number of bytes the caller expects to write.
    fn create_storage(&self, size_hint: u64) -> io::Result<Self::Storage>;
}

/// A readable, writable and seekable byte store.
pub trait Storage: Read + Write + Seek {}

impl<T> Storage for T where T: Read + Write + Seek {}
