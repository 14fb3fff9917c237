#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = fwprobe::engine::extract::sniff::sniff_bytes(data);
});
