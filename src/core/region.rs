//! Detected regions and the boot plan derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::evidence::Evidence;

/// Functional area of a firmware image.
///
/// Declaration order is the boot priority and the tie-break order for
/// regions that share an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionCategory {
    Bootloader,
    Config,
    Kernel,
    RootFs,
    Assets,
}

impl RegionCategory {
    /// All categories in boot priority order.
    pub const ALL: [RegionCategory; 5] = [
        RegionCategory::Bootloader,
        RegionCategory::Config,
        RegionCategory::Kernel,
        RegionCategory::RootFs,
        RegionCategory::Assets,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RegionCategory::Bootloader => "bootloader",
            RegionCategory::Config => "config",
            RegionCategory::Kernel => "kernel",
            RegionCategory::RootFs => "rootfs",
            RegionCategory::Assets => "assets",
        }
    }

    /// Setup-step tags a downstream emulator needs for this category.
    pub fn setup_tags(self) -> &'static [&'static str] {
        match self {
            RegionCategory::Bootloader => &["hardware_init", "memory_init"],
            RegionCategory::Config => &["nvram_load", "config_load"],
            RegionCategory::Kernel => &["kernel_load", "driver_init", "subsystem_init"],
            RegionCategory::RootFs => &["rootfs_mount", "service_init"],
            RegionCategory::Assets => &["library_load", "binary_load"],
        }
    }

    /// Human description of the boot actions for this category.
    pub fn boot_actions(self) -> &'static str {
        match self {
            RegionCategory::Bootloader => "initialize hardware and memory controllers",
            RegionCategory::Config => "load NVRAM and configuration data",
            RegionCategory::Kernel => "load kernel and initialize drivers and subsystems",
            RegionCategory::RootFs => "mount root filesystem and start services",
            RegionCategory::Assets => "load application binaries and libraries",
        }
    }
}

impl fmt::Display for RegionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A region located by evidence. `size` is an estimate, never authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedRegion {
    pub category: RegionCategory,
    /// Confidence in [0,1].
    pub confidence: f32,
    pub offset: u64,
    /// Estimated size, already truncated to the file end.
    pub size: u64,
    /// Signature names that placed this region.
    pub signatures: Vec<String>,
    pub evidence: Vec<Evidence>,
    pub setup_steps: Vec<String>,
}

impl DetectedRegion {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }
}

/// One step in the recommended initialization plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootStep {
    /// 1-based position in the plan.
    pub order: u32,
    /// `None` for the single "nothing inferable" notice.
    pub category: Option<RegionCategory>,
    pub offset: Option<u64>,
    pub actions: Vec<String>,
    pub description: String,
}
