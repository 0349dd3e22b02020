#![no_main]

use blkqcl_core::envelope;
use blkqcl_core::services::{configuration, device_management};
use blkqcl_core::ProtocolVersion;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(root) = envelope::unwrap(data) {
        let _ = envelope::timestamp(&root);
        for version in ProtocolVersion::ALL {
            let _ = device_management::decode_alarms(&root, version);
            let _ = configuration::decode_factory_settings(&root, version);
            let _ = configuration::decode_user_settings(&root, version);
        }
    }
});
