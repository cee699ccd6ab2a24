#![no_main]
use docwire::{ResponseStatus, TranscoderRegistry};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let flags = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let registry = TranscoderRegistry::default();
    let _ = registry.decode(
        None,
        "fuzz",
        &data[4..],
        0,
        0,
        flags,
        ResponseStatus::Success,
    );
});
