#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let scanner = fwprobe::engine::scan::CatalogScanner::global();
    let hits = scanner.scan(data);
    for (def, sig) in scanner.definitions().iter().zip(&hits.signatures) {
        for (pattern, hit) in def.patterns.iter().zip(&sig.patterns) {
            for &off in &hit.offsets {
                assert!(off as usize + pattern.len() <= data.len());
            }
        }
    }
});
