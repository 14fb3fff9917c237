#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let sample = fwprobe::io::Sample::from_bytes("fuzz.img", data.to_vec(), 1 << 20);
    for entry in fwprobe::engine::partition::decode_partitions(&sample) {
        assert!(entry.first_sector.len() <= 512);
    }
});
