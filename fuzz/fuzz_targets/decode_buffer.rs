#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // format detection plus decoding must never panic on garbage
    let mut decoder = undeflate::DeflateDecoder::new(data);
    let _ = decoder.decode();
});
