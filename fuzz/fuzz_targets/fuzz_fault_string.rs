#![no_main]

use blkqcl_core::fault::fault_string;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = fault_string(data);
});
