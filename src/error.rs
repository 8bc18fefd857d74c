use std::io;

/// Errors returned by [`SwitchingStream`](crate::SwitchingStream) and [`Settings`](crate::Settings).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A length setting was given as a negative number.
    #[error("{name} must not be negative, got {value}")]
    NegativeLength {
        /// Name of the rejected setting.
        name: &'static str,
        /// Value that was supplied.
        value: i64,
    },
    /// The requested position lies past the end of the stream.
    #[error("position {position} is out of range for a stream of length {length}")]
    PositionOutOfRange {
        /// Requested position.
        position: u64,
        /// Length of the stream at the time of the request.
        length: u64,
    },
    /// The stream handed to [`SwitchingStream::wrap`](crate::SwitchingStream::wrap) can't seek.
    #[error("wrapped stream does not support seeking: {0}")]
    NotSeekable(#[source] io::Error),
    /// The length of a switching stream only changes through writes.
    #[error("setting the length of a switching stream is not supported")]
    SetLengthUnsupported,
    /// Error raised by the active backing store.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            e @ (Error::NegativeLength { .. } | Error::PositionOutOfRange { .. }) => {
                io::Error::new(io::ErrorKind::InvalidInput, e)
            }
            e @ (Error::NotSeekable(_) | Error::SetLengthUnsupported) => {
                io::Error::new(io::ErrorKind::Unsupported, e)
            }
        }
    }
}
