#![no_main]

use blkqcl_core::services::scan::decode_spectrum;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = decode_spectrum(data);
});
