use std::io::{Read, Seek, SeekFrom, Write};

use proptest::prelude::*;
use switching_stream::{Settings, SwitchingStream};

mod setup;

#[derive(Debug)]
struct StreamParams {
    data: Vec<u8>,
    chunk_len: usize,
    threshold_length: u64,
}

prop_compose! {
    fn get_threshold()(threshold_length in 1..16*1024u64) -> u64 {
        threshold_length
    }
}

prop_compose! {
    fn input_params()
        (threshold_length in get_threshold())
        (
            threshold_length in Just(threshold_length),
            data in prop::collection::vec(any::<u8>(), 0..(threshold_length as usize) * 2),
            chunk_len in 1..4096usize) -> StreamParams {
            StreamParams { data, chunk_len, threshold_length }
    }
}

proptest! {
    #[test]
    fn round_trip(StreamParams { data, chunk_len, threshold_length } in input_params()) {
        let mut stream = SwitchingStream::new(
            Settings::default().threshold_length(threshold_length),
        ).unwrap();

        for chunk in data.chunks(chunk_len) {
            stream.write_all(chunk).unwrap();
        }
        prop_assert_eq!(stream.len(), data.len() as u64);
        prop_assert_eq!(stream.is_in_memory(), (data.len() as u64) < threshold_length);

        stream.seek(SeekFrom::Start(0)).unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).unwrap();
        compare(data, buf);
    }
}

fn compare(a: impl Into<Vec<u8>>, b: impl Into<Vec<u8>>) {
    let a = a.into();
    let b = b.into();
    assert_eq!(a.len(), b.len());
    for (i, (l, r)) in a.into_iter().zip(b).enumerate() {
        assert_eq!(l, r, "values differ at position {i}");
    }
}
