use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use educe::Educe;

use crate::Error;

const DEFAULT_COPY_BUFFER_SIZE: NonZeroUsize = match NonZeroUsize::new(8 * 1024) {
    Some(size) => size,
    None => unreachable!(),
};

pub(crate) type MigrateFn = Box<dyn FnMut(Migration<'_>) + Send + Sync>;

/// Details of a completed move from memory to a temporary file, passed to the
/// [`on_migrate`](Settings::on_migrate) callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Migration<'a> {
    /// Number of bytes copied out of the previous store.
    pub bytes_copied: u64,
    /// Location of the temporary file that now backs the stream.
    pub path: &'a Path,
}

/// Settings to configure when a [`SwitchingStream`](crate::SwitchingStream) moves to disk.
#[derive(Educe)]
#[educe(Debug)]
pub struct Settings {
    pub(crate) expected_length: u64,
    pub(crate) threshold_length: u64,
    pub(crate) switching_disabled: bool,
    pub(crate) temp_dir: Option<PathBuf>,
    pub(crate) copy_buffer_size: NonZeroUsize,
    #[educe(Debug = false)]
    pub(crate) on_migrate: Option<MigrateFn>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            expected_length: 0,
            threshold_length: 80 * 1024,
            switching_disabled: false,
            temp_dir: None,
            copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
            on_migrate: None,
        }
    }
}

impl Settings {
    /// Creates settings from signed lengths, as they arrive from headers or loosely typed
    /// configuration. Negative values are rejected.
    pub fn try_from_signed(expected_length: i64, threshold_length: i64) -> Result<Self, Error> {
        let expected_length =
            u64::try_from(expected_length).map_err(|_| Error::NegativeLength {
                name: "expected_length",
                value: expected_length,
            })?;
        let threshold_length =
            u64::try_from(threshold_length).map_err(|_| Error::NegativeLength {
                name: "threshold_length",
                value: threshold_length,
            })?;
        Ok(Self::default()
            .expected_length(expected_length)
            .threshold_length(threshold_length))
    }

    /// Anticipated total size of the content. Used to pick the initial store and to pre-size the
    /// memory buffer.
    #[must_use]
    pub fn expected_length(mut self, expected_length: u64) -> Self {
        self.expected_length = expected_length;
        self
    }

    /// Length at which the stream moves its content to a temporary file.
    #[must_use]
    pub fn threshold_length(mut self, threshold_length: u64) -> Self {
        self.threshold_length = threshold_length;
        self
    }

    /// Keep the initial store for the whole life of the stream, regardless of size.
    #[must_use]
    pub fn switching_disabled(mut self, switching_disabled: bool) -> Self {
        self.switching_disabled = switching_disabled;
        self
    }

    /// Directory to create the temporary file in. Defaults to the OS temp directory.
    #[must_use]
    pub fn temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(temp_dir.into());
        self
    }

    /// Size of the buffer used when copying from memory to disk, and of the temporary file's
    /// read and write buffers.
    #[must_use]
    pub fn copy_buffer_size(mut self, copy_buffer_size: NonZeroUsize) -> Self {
        self.copy_buffer_size = copy_buffer_size;
        self
    }

    /// Callback invoked once the stream has moved to a temporary file.
    #[must_use]
    pub fn on_migrate<F>(mut self, f: F) -> Self
    where
        F: FnMut(Migration<'_>) + Send + Sync + 'static,
    {
        self.on_migrate = Some(Box::new(f));
        self
    }
}
