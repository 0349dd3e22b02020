#![no_main]

use blkqcl_transport::http::read_response;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(runtime) = tokio::runtime::Builder::new_current_thread().build() else {
        return;
    };
    let mut reader = data;
    let _ = runtime.block_on(read_response(&mut reader));
});
