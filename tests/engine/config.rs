use fwprobe::engine::config::*;
use fwprobe::io::Sample;
use fwprobe::Analyzer;

use crate::common::{image_with, no_extract, write_image};

#[test]
fn test_engine_config_defaults() {
    let config = EngineConfig::default();

    assert_eq!(config.io.window_bytes, 4 * 1024 * 1024);
    assert_eq!(config.scoring.text_step, 0.1);
    assert_eq!(config.scoring.text_cap, 0.3);
    assert_eq!(config.scoring.filename_weight, 0.2);
    assert_eq!(config.scoring.diversity_floor, 2);
    assert_eq!(config.regions.min_signature_confidence, 0.15);
    assert_eq!(config.regions.kernel_size, 4 * 1024 * 1024);
    assert!(config.extraction.enabled);
    assert_eq!(config.extraction.delegate.timeout_secs, 300);
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = EngineConfig::default();
    config.scoring.detection_threshold = 0.6;
    config.extraction.workers = 1;
    let path = write_image(dir.path(), "config.json", config.to_json_string().unwrap().as_bytes());

    let loaded = EngineConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_malformed_config_is_rejected() {
    assert!(EngineConfig::from_json_str("{ \"scoring\": 5 }").is_err());
}

#[test]
fn test_threshold_controls_detection() {
    let data = image_with(2048, &[(100, b"U-Boot"), (1500, b"hsqs")]);
    let sample = Sample::from_bytes("image.bin", data, 1 << 20);

    let mut strict = EngineConfig::default();
    strict.scoring.detection_threshold = 0.6;
    let result = Analyzer::new(strict).analyze_sample(&sample, &no_extract()).unwrap();
    assert!(!result.success);
    assert!(result.detected_platform.is_none());
    // Regions do not depend on detection.
    assert_eq!(result.regions.len(), 2);
}

#[test]
fn test_window_limits_scanning() {
    let data = image_with(8192, &[(6000, b"U-Boot")]);
    let mut config = EngineConfig::default();
    config.io.window_bytes = 4096;

    let dir = tempfile::tempdir().unwrap();
    let path = write_image(dir.path(), "image.bin", &data);
    let result = Analyzer::new(config).analyze_with(&path, &no_extract()).unwrap();
    assert!(result.evidence.is_empty());
    assert!(result.regions.is_empty());
}
