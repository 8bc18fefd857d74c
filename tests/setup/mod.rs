use std::io::{self, Read, Seek, SeekFrom, Write};

use ctor::ctor;
use tracing_subscriber::EnvFilter;

#[ctor]
fn setup() {
    setup_logger();
}

fn setup_logger() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_line_number(true)
        .with_file(true)
        .with_test_writer()
        .init();
}

/// Deterministic, non-repeating-looking test content.
#[allow(dead_code)]
pub fn content(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Stream that reads and writes but fails every seek, like a pipe.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct PipeStream {
    pub data: Vec<u8>,
}

impl Read for PipeStream {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

impl Write for PipeStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for PipeStream {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "pipe does not support seeking",
        ))
    }
}
