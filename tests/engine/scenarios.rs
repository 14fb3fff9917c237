use fwprobe::core::evidence::MatchKind;
use fwprobe::engine::api::NOTE_LIMITED;
use fwprobe::engine::boot::NO_BOOT_SEQUENCE;
use fwprobe::io::Sample;
use fwprobe::{Analyzer, IssueKind, RegionCategory};

use crate::common::{image_with, no_extract, offline_config, options_into, write_image};

#[test]
fn all_zero_image_reports_nothing_found() {
    let sample = Sample::from_bytes("image.bin", vec![0u8; 4096], 1 << 20);
    let result = Analyzer::default().analyze_sample(&sample, &no_extract()).unwrap();

    assert!(!result.success);
    assert!(result.evidence.is_empty());
    assert!(result.regions.is_empty());
    assert!(result.partitions.is_empty());
    assert!(result.errors.is_empty());
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.boot_sequence.len(), 1);
    assert_eq!(result.boot_sequence[0].description, NO_BOOT_SEQUENCE);
    assert!(result.notes.iter().any(|n| n.starts_with(NOTE_LIMITED)));
}

#[test]
fn bootloader_and_squashfs_are_located() {
    let data = image_with(2048, &[(100, b"U-Boot"), (1500, b"hsqs")]);
    let sample = Sample::from_bytes("image.bin", data, 1 << 20);
    let result = Analyzer::default().analyze_sample(&sample, &no_extract()).unwrap();

    assert!(result.success);
    assert!(result.confidence > 0.3);
    assert!((result.confidence - 0.55).abs() < 1e-6);
    assert_eq!(result.candidates[0].platform, "generic-embedded-linux");

    let boot = result
        .regions
        .iter()
        .find(|r| r.category == RegionCategory::Bootloader)
        .unwrap();
    assert_eq!(boot.offset, 100);
    assert_eq!(boot.size, 2048 - 100);
    let rootfs = result
        .regions
        .iter()
        .find(|r| r.category == RegionCategory::RootFs)
        .unwrap();
    assert_eq!(rootfs.offset, 1500);
    assert_eq!(rootfs.signatures, vec!["squashfs".to_string()]);

    let order: Vec<_> = result.boot_plan().filter_map(|s| s.category).collect();
    assert_eq!(order, vec![RegionCategory::Bootloader, RegionCategory::RootFs]);
}

#[test]
fn cable_gateway_tokens_get_diversity_bonus() {
    let data = image_with(512, &[(16, b"RDK"), (128, b"Comcast"), (300, b"ARRIS")]);
    let sample = Sample::from_bytes("image.bin", data, 1 << 20);
    let result = Analyzer::default().analyze_sample(&sample, &no_extract()).unwrap();

    let top = &result.candidates[0];
    assert_eq!(top.platform, "rdk-b");
    assert_eq!(top.distinct_signatures, 3);
    assert!((top.confidence - 0.4).abs() < 1e-6);

    assert!(result.success);
    assert_eq!(result.detected_platform.as_ref().unwrap().name, "rdk-b");
    let matched: Vec<_> = result.evidence.iter().map(|e| e.matched.as_str()).collect();
    assert_eq!(matched, vec!["RDK", "Comcast", "ARRIS"]);
    assert!(result.evidence.iter().all(|e| e.kind == MatchKind::TextToken));
    assert!(result.regions.is_empty());
}

#[test]
fn missing_tool_falls_back_to_platform_layout() {
    let dir = tempfile::tempdir().unwrap();
    let data = image_with(
        1024 * 1024,
        &[(4096, b"OpenWrt"), (8192, b"MediaTek"), (12288, b"Atheros")],
    );
    let path = write_image(dir.path(), "image.bin", &data);
    let out = dir.path().join("out");

    let result = Analyzer::new(offline_config())
        .analyze_with(&path, &options_into(&out))
        .unwrap();

    assert!(result.success);
    assert_eq!(result.detected_platform.as_ref().unwrap().name, "openwrt");
    assert!(result.regions.is_empty());
    assert!(result.partitions.is_empty());

    let warning = result
        .warnings
        .iter()
        .find(|w| w.kind == IssueKind::ToolUnavailable)
        .unwrap();
    assert!(warning.message.starts_with("tool unavailable, used fallback"));

    let names: Vec<_> = result
        .artifacts
        .iter()
        .map(|a| a.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "layout_u-boot_0x00000000.bin",
            "layout_u-boot-env_0x00030000.bin",
            "layout_kernel_0x00040000.bin",
        ]
    );
    assert!(result.artifacts.iter().all(|a| a.complete && a.path.exists()));
    assert_eq!(result.artifacts[2].size_bytes, 1024 * 1024 - 256 * 1024);
    assert!(result.extraction.complete);
}

#[test]
fn missing_file_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let err = fwprobe::analyze(dir.path().join("absent.bin")).unwrap_err();
    assert!(matches!(err, fwprobe::FwError::NotFound { .. }));
}
