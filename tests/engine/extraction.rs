use fwprobe::core::artifact::{ContentType, ExtractionStrategy};
use fwprobe::engine::catalog::signatures::UIMAGE_MAGIC;
use fwprobe::engine::extract::marker_path;
use fwprobe::{AnalyzeOptions, Analyzer, CancelToken, EngineConfig, IssueKind, RegionCategory};
use sha2::{Digest, Sha256};

use crate::common::{offline_config, options_into, write_image};

const KIB: usize = 1024;

/// Bootloader at 0, uImage kernel at 16 KiB, SquashFS at 32 KiB, in a
/// 64 KiB image filled with a neutral byte.
fn three_region_image() -> Vec<u8> {
    let mut data = vec![0x11u8; 64 * KIB];
    data[..6].copy_from_slice(b"U-Boot");
    data[16 * KIB..16 * KIB + 4].copy_from_slice(UIMAGE_MAGIC);
    data[32 * KIB..32 * KIB + 4].copy_from_slice(b"hsqs");
    data
}

fn exact_size_config() -> EngineConfig {
    let mut config = offline_config();
    config.regions.bootloader_size = 16 * KIB as u64;
    config.regions.kernel_size = 16 * KIB as u64;
    config.regions.rootfs_size = 32 * KIB as u64;
    config
}

#[test]
fn artifacts_conserve_region_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let data = three_region_image();
    let path = write_image(dir.path(), "image.bin", &data);

    let result = Analyzer::new(exact_size_config())
        .analyze_with(&path, &options_into(&dir.path().join("out")))
        .unwrap();

    let categories: Vec<_> = result.regions.iter().map(|r| r.category).collect();
    assert_eq!(
        categories,
        vec![RegionCategory::Bootloader, RegionCategory::Kernel, RegionCategory::RootFs]
    );
    assert_eq!(result.extraction.strategy, ExtractionStrategy::BuiltIn);
    assert_eq!(result.artifacts.len(), result.regions.len());

    let region_total: u64 = result.regions.iter().map(|r| r.size).sum();
    let artifact_total: u64 = result.artifacts.iter().map(|a| a.size_bytes).sum();
    assert_eq!(artifact_total, region_total);
    assert_eq!(artifact_total, data.len() as u64);

    for (region, artifact) in result.regions.iter().zip(&result.artifacts) {
        let slice = &data[region.offset as usize..region.end() as usize];
        assert_eq!(std::fs::read(&artifact.path).unwrap(), slice);
        assert_eq!(artifact.sha256, hex::encode(Sha256::digest(slice)));
        assert_eq!(artifact.source.category(), Some(region.category));
        assert!(artifact.complete);
    }
}

#[test]
fn artifact_types_come_from_their_own_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(dir.path(), "image.bin", &three_region_image());

    let result = Analyzer::new(exact_size_config())
        .analyze_with(&path, &options_into(&dir.path().join("out")))
        .unwrap();

    let types: Vec<_> = result.artifacts.iter().map(|a| a.content_type.clone()).collect();
    assert_eq!(types, vec![ContentType::Data, ContentType::UImage, ContentType::SquashFs]);
}

#[test]
fn disabled_delegate_skips_tool_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(dir.path(), "image.bin", &three_region_image());
    let mut config = exact_size_config();
    config.extraction.delegate.enabled = false;

    let result = Analyzer::new(config)
        .analyze_with(&path, &options_into(&dir.path().join("out")))
        .unwrap();

    assert!(result.warnings.iter().all(|w| w.kind != IssueKind::ToolUnavailable));
    assert_eq!(result.artifacts.len(), 3);
}

#[test]
fn cancelled_extraction_is_reported_partial() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(dir.path(), "image.bin", &three_region_image());
    let mut config = exact_size_config();
    config.extraction.delegate.enabled = false;

    let cancel = CancelToken::new();
    cancel.cancel();
    let options = AnalyzeOptions {
        output_dir: Some(dir.path().join("out")),
        cancel,
        ..AnalyzeOptions::default()
    };
    let result = Analyzer::new(config).analyze_with(&path, &options).unwrap();

    assert!(!result.extraction.complete);
    assert!(result.warnings.iter().any(|w| w.kind == IssueKind::Cancelled));
    assert!(result.artifacts.iter().all(|a| !a.complete && marker_path(&a.path).exists()));
    assert!(result.notes.iter().any(|n| n.contains("partial")));
}

#[test]
fn unwritable_destination_is_an_error_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(dir.path(), "image.bin", &three_region_image());
    let blocker = write_image(dir.path(), "not-a-dir", b"x");

    let result = Analyzer::new(exact_size_config())
        .analyze_with(&path, &options_into(&blocker.join("out")))
        .unwrap();

    assert!(result.has_errors());
    assert_eq!(result.errors[0].kind, IssueKind::ExtractionWriteFailure);
    assert!(result.artifacts.is_empty());
    assert!(result.success);
}
