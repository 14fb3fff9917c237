use fwprobe::engine::catalog;
use fwprobe::engine::scan::{find_all, CatalogScanner};

/// Deterministic byte stream seeded with catalog magics.
fn noisy_buffer(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    let mut buf: Vec<u8> = (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xFF) as u8
        })
        .collect();
    for (i, def) in catalog::definitions().iter().enumerate() {
        for pattern in def.patterns {
            let at = (i * 37 + seed as usize) % len.max(1);
            if at + pattern.len() <= len {
                buf[at..at + pattern.len()].copy_from_slice(pattern);
            }
        }
    }
    buf
}

#[test]
fn find_all_offsets_stay_in_bounds() {
    let patterns: [&[u8]; 5] = [b"a", b"aa", b"hsqs", b"U-Boot", &[0u8; 64]];
    for len in [0usize, 1, 2, 3, 5, 63, 64, 65, 512] {
        let buf = vec![b'a'; len];
        for pattern in patterns {
            let hits = find_all(&buf, pattern);
            if pattern.len() > len {
                assert!(hits.is_empty(), "pattern longer than buffer matched");
            }
            for off in hits {
                assert!(off + pattern.len() <= len);
            }
        }
    }
}

#[test]
fn overlapping_occurrences_are_reported() {
    assert_eq!(find_all(b"aaaa", b"aa"), vec![0, 1, 2]);
    assert!(find_all(b"abc", b"").is_empty());
}

#[test]
fn catalog_hits_stay_in_bounds() {
    let scanner = CatalogScanner::global();
    for (seed, len) in [(1u32, 0usize), (2, 7), (3, 64), (4, 1000), (5, 8192)] {
        let buf = noisy_buffer(len, seed);
        let hits = scanner.scan(&buf);
        for (def, sig) in scanner.definitions().iter().zip(&hits.signatures) {
            for (pattern, hit) in def.patterns.iter().zip(&sig.patterns) {
                for &off in &hit.offsets {
                    assert!(off as usize + pattern.len() <= len, "{} overran", def.name);
                }
            }
            for (token, hit) in def.tokens.iter().zip(&sig.tokens) {
                for &off in &hit.offsets {
                    assert!(off as usize + token.len() <= len, "{} overran", def.name);
                }
            }
        }
    }
}

#[test]
fn placed_magics_are_found() {
    let mut buf = vec![0u8; 4096];
    buf[100..106].copy_from_slice(b"U-Boot");
    buf[1500..1504].copy_from_slice(b"hsqs");
    let hits = CatalogScanner::global().scan(&buf);

    let uboot = catalog::definition_index("uboot").unwrap();
    let squashfs = catalog::definition_index("squashfs").unwrap();
    assert_eq!(hits.signatures[uboot].first_binary_offset(), Some(100));
    assert_eq!(hits.signatures[uboot].first_text_offset(), Some(100));
    assert_eq!(hits.signatures[squashfs].first_binary_offset(), Some(1500));
    assert_eq!(hits.distinct_matched(), 2);
}

#[test]
fn text_tokens_ignore_case() {
    let hits = CatalogScanner::global().scan(b"..openwrt..MEDIATEK..");
    let openwrt = catalog::definition_index("openwrt").unwrap();
    let mediatek = catalog::definition_index("mediatek").unwrap();
    assert!(hits.signatures[openwrt].has_text());
    assert!(hits.signatures[mediatek].has_text());
}
