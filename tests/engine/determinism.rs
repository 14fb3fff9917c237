use fwprobe::{AnalysisResult, Analyzer};

use crate::common::{image_with, no_extract, offline_config, options_into, write_image};

fn mixed_image() -> Vec<u8> {
    image_with(
        256 * 1024,
        &[
            (64, b"U-Boot 2019.07 (Broadcom)"),
            (4096, b"Linux version 4.9.0"),
            (8192, b"RDK Comcast ARRIS nvram bootargs=console=ttyS0"),
            (65536, b"hsqs"),
            (131072, b"<html><body>cwmp</body></html>"),
        ],
    )
}

#[test]
fn json_output_is_stable_for_same_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(dir.path(), "image.bin", &mixed_image());
    let analyzer = Analyzer::default();

    let a1 = analyzer.analyze_with(&path, &no_extract()).expect("analyze1");
    let a2 = analyzer.analyze_with(&path, &no_extract()).expect("analyze2");
    let j1 = a1.to_json_string().expect("json1");
    let j2 = a2.to_json_string().expect("json2");
    assert_eq!(j1, j2, "JSON outputs differ across identical runs");
}

#[test]
fn extraction_results_are_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(dir.path(), "image.bin", &mixed_image());
    let out = dir.path().join("out");
    let analyzer = Analyzer::new(offline_config());

    let a1 = analyzer.analyze_with(&path, &options_into(&out)).unwrap();
    let a2 = analyzer.analyze_with(&path, &options_into(&out)).unwrap();
    assert!(!a1.artifacts.is_empty());
    assert_eq!(a1, a2);
}

#[test]
fn report_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(dir.path(), "image.bin", &mixed_image());
    let result = Analyzer::default().analyze_with(&path, &no_extract()).unwrap();

    let json = result.to_json_string().unwrap();
    let back = AnalysisResult::from_json_str(&json).expect("from json");
    assert_eq!(back, result);
    assert_eq!(back.schema_version, fwprobe::core::SCHEMA_VERSION);
}
