//! Shared builders for synthetic firmware images.

use std::path::{Path, PathBuf};

use fwprobe::engine::config::DelegateConfig;
use fwprobe::io::{IOLimits, Sample};
use fwprobe::{AnalyzeOptions, EngineConfig};

/// Program name guaranteed not to resolve on `PATH`.
pub const MISSING_TOOL: &str = "fwprobe-test-missing-unpacker";

/// A zero-filled image of `len` bytes with each `(offset, bytes)` written in.
pub fn image_with(len: usize, placements: &[(usize, &[u8])]) -> Vec<u8> {
    let mut data = vec![0u8; len];
    for (offset, bytes) in placements {
        data[*offset..*offset + bytes.len()].copy_from_slice(bytes);
    }
    data
}

/// Writes `data` to `dir/name` and returns the path.
pub fn write_image(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

/// Opens an image with default limits.
pub fn open(path: &Path) -> Sample {
    Sample::open(path, &IOLimits::default()).unwrap()
}

/// Engine configuration whose delegate can never be found.
pub fn offline_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.extraction.delegate = DelegateConfig {
        program: MISSING_TOOL.to_string(),
        ..DelegateConfig::default()
    };
    config
}

pub fn options_into(dir: &Path) -> AnalyzeOptions {
    AnalyzeOptions {
        output_dir: Some(dir.to_path_buf()),
        ..AnalyzeOptions::default()
    }
}

pub fn no_extract() -> AnalyzeOptions {
    AnalyzeOptions {
        extract: false,
        ..AnalyzeOptions::default()
    }
}

/// One MBR partition slot: type, LBA start, sector count, bootable.
pub struct MbrSlot {
    pub kind: u8,
    pub lba_start: u32,
    pub sectors: u32,
    pub bootable: bool,
}

/// A 512-byte MBR with the given slots (up to four) and the boot signature.
pub fn mbr_sector(slots: &[MbrSlot]) -> Vec<u8> {
    let mut sector = vec![0u8; 512];
    for (i, slot) in slots.iter().enumerate().take(4) {
        let at = 446 + i * 16;
        sector[at] = if slot.bootable { 0x80 } else { 0x00 };
        sector[at + 4] = slot.kind;
        sector[at + 8..at + 12].copy_from_slice(&slot.lba_start.to_le_bytes());
        sector[at + 12..at + 16].copy_from_slice(&slot.sectors.to_le_bytes());
    }
    sector[510] = 0x55;
    sector[511] = 0xAA;
    sector
}
