use fwprobe::engine::catalog;
use fwprobe::engine::scan::CatalogScanner;
use fwprobe::engine::ScoreEngine;

fn score_for(profile: &str, buf: &[u8]) -> f32 {
    let hits = CatalogScanner::global().scan_with_filename(buf, "image.bin");
    let profile = catalog::find_profile(profile).unwrap();
    ScoreEngine::default().score_profile(profile, &hits).confidence
}

#[test]
fn adding_evidence_never_lowers_a_score() {
    let fragments: [&[u8]; 9] = [
        b" RDK ",
        b" Comcast ",
        b" ARRIS ",
        b" U-Boot ",
        b" hsqs ",
        b" nvram ",
        b" RDK ",
        b" BusyBox v1.31 ",
        b" cwmp ",
    ];
    let mut buf = Vec::new();
    let mut last = score_for("rdk-b", &buf);
    assert_eq!(last, 0.0);
    for fragment in fragments {
        buf.extend_from_slice(fragment);
        let next = score_for("rdk-b", &buf);
        assert!(next >= last, "score dropped from {last} to {next}");
        assert!((0.0..=1.0).contains(&next));
        last = next;
    }
    assert_eq!(last, 1.0);
}

#[test]
fn every_profile_is_bounded_on_saturated_input() {
    let mut buf = Vec::new();
    for def in catalog::definitions() {
        for _ in 0..5 {
            for token in def.tokens {
                buf.extend_from_slice(token.as_bytes());
                buf.push(b' ');
            }
            for pattern in def.patterns {
                buf.extend_from_slice(pattern);
                buf.push(b' ');
            }
        }
    }
    let hits = CatalogScanner::global().scan(&buf);
    let engine = ScoreEngine::default();
    for candidate in engine.rank(catalog::profiles(), &hits) {
        assert!((0.0..=1.0).contains(&candidate.confidence), "{}", candidate.platform);
    }
}

#[test]
fn ranking_is_best_first_with_catalog_tie_order() {
    let hits = CatalogScanner::global().scan(&[0u8; 1024]);
    let ranked = ScoreEngine::default().rank(catalog::profiles(), &hits);
    let names: Vec<_> = ranked.iter().map(|c| c.platform.as_str()).collect();
    let catalog_order: Vec<_> = catalog::profiles().iter().map(|p| p.name).collect();
    assert_eq!(names, catalog_order);

    let hits = CatalogScanner::global().scan(b"OpenWrt MediaTek Atheros");
    let ranked = ScoreEngine::default().rank(catalog::profiles(), &hits);
    assert_eq!(ranked[0].platform, "openwrt");
    assert!((ranked[0].confidence - 0.4).abs() < 1e-6);
    assert!(ranked.windows(2).all(|w| w[0].confidence >= w[1].confidence));
}

#[test]
fn filename_token_counts_once() {
    let hits = CatalogScanner::global().scan_with_filename(&[0u8; 64], "openwrt-ramips.bin");
    let profile = catalog::find_profile("openwrt").unwrap();
    let score = ScoreEngine::default().score_profile(profile, &hits);
    assert!((score.confidence - 0.2).abs() < 1e-6);
    assert_eq!(score.distinct_signatures, 1);
}
