//! A byte stream that keeps small payloads in memory and moves large ones to a temporary file.
//!
//! [`SwitchingStream`] wraps a single backing store and exposes it through the standard
//! [`Read`](std::io::Read), [`Write`](std::io::Write) and [`Seek`](std::io::Seek) traits.
//! The store starts out in memory unless the declared expected length already reaches the
//! threshold. Once a write pushes the length to the threshold, the buffered bytes are copied to a
//! temporary file and all further I/O goes to disk. The switch is one-way.
//!
//! ```
//! use std::io::{Read, Seek, SeekFrom, Write};
//!
//! use switching_stream::{Settings, SwitchingStream};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut stream = SwitchingStream::new(Settings::default().threshold_length(100))?;
//! stream.write_all(&[1; 60])?;
//! assert!(stream.is_in_memory());
//!
//! stream.write_all(&[2; 60])?;
//! assert!(!stream.is_in_memory());
//! assert_eq!(stream.len(), 120);
//!
//! stream.seek(SeekFrom::Start(0))?;
//! let mut buf = Vec::new();
//! stream.read_to_end(&mut buf)?;
//! assert_eq!(buf.len(), 120);
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]

use std::io;

mod error;
mod settings;
pub mod storage;
mod stream;

pub use error::Error;
pub use settings::{Migration, Settings};
pub use stream::{Store, SwitchingStream};

pub(crate) trait WrapIoResult {
    fn wrap_err(self, msg: &str) -> Self;
}

impl<T> WrapIoResult for io::Result<T> {
    fn wrap_err(self, msg: &str) -> Self {
        if let Err(e) = self {
            Err(io::Error::new(e.kind(), format!("{msg}: {e}")))
        } else {
            self
        }
    }
}
