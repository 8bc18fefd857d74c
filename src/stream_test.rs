use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::*;
use crate::storage::memory::MemoryStorage;

/// Memory store that records whether it has been flushed and dropped.
struct TrackedStorage {
    inner: MemoryStorage,
    flushed: Arc<AtomicBool>,
    dropped: Arc<AtomicBool>,
}

impl Drop for TrackedStorage {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

impl Read for TrackedStorage {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for TrackedStorage {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl Write for TrackedStorage {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushed.store(true, Ordering::SeqCst);
        self.inner.flush()
    }
}

fn tracked() -> (TrackedStorage, Arc<AtomicBool>, Arc<AtomicBool>) {
    let flushed = Arc::new(AtomicBool::new(false));
    let dropped = Arc::new(AtomicBool::new(false));
    let storage = TrackedStorage {
        inner: MemoryStorage::default(),
        flushed: flushed.clone(),
        dropped: dropped.clone(),
    };
    (storage, flushed, dropped)
}

#[test]
fn memory_store_reserves_expected_length() {
    let stream = SwitchingStream::new(
        Settings::default()
            .expected_length(4096)
            .threshold_length(8192),
    )
    .unwrap();
    match stream.into_inner() {
        Store::Memory(storage) => {
            assert!(storage.capacity() >= 4096);
            assert!(storage.is_empty());
        }
        Store::File(_) => panic!("expected memory store"),
    }
}

#[test]
fn previous_store_is_released_after_copy() {
    let (storage, flushed, dropped) = tracked();
    let mut stream =
        SwitchingStream::wrap(storage, Settings::default().threshold_length(8)).unwrap();

    stream.write_all(b"0123456789").unwrap();

    assert!(!stream.is_in_memory());
    assert!(flushed.load(Ordering::SeqCst));
    assert!(dropped.load(Ordering::SeqCst));
}

#[test]
fn previous_store_is_released_when_empty() {
    let (storage, flushed, dropped) = tracked();
    let stream = SwitchingStream::wrap(
        storage,
        Settings::default().expected_length(8).threshold_length(8),
    )
    .unwrap();

    assert!(!stream.is_in_memory());
    assert_eq!(stream.len(), 0);
    assert!(flushed.load(Ordering::SeqCst));
    assert!(dropped.load(Ordering::SeqCst));
}

#[test]
fn tracked_length_matches_file() {
    let mut stream = SwitchingStream::new(Settings::default().threshold_length(16)).unwrap();
    stream.write_all(&[7; 10]).unwrap();
    stream.write_all(&[8; 10]).unwrap();
    stream.seek(SeekFrom::Start(30)).unwrap();
    stream.write_all(&[9; 2]).unwrap();

    assert_eq!(stream.len(), 32);
    match &mut stream.store {
        Store::File(file) => assert_eq!(file.seek(SeekFrom::End(0)).unwrap(), 32),
        Store::Memory(_) => panic!("expected file store"),
    }
}

#[test]
fn small_copy_buffer_copies_everything() {
    let mut stream = SwitchingStream::new(
        Settings::default()
            .threshold_length(100)
            .copy_buffer_size(std::num::NonZeroUsize::new(3).unwrap()),
    )
    .unwrap();
    let data: Vec<u8> = (0..=255).collect();
    stream.write_all(&data).unwrap();

    stream.seek(SeekFrom::Start(0)).unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).unwrap();
    assert_eq!(buf, data);
}
