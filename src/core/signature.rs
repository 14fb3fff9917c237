//! Signature definitions: the atoms of the static detection catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::region::RegionCategory;

/// What a signature is evidence of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureCategory {
    Platform,
    Bootloader,
    Kernel,
    RootFs,
    Filesystem,
    Config,
    Assets,
}

impl SignatureCategory {
    /// Region this category contributes to. Platform markers locate nothing.
    pub fn region(self) -> Option<RegionCategory> {
        match self {
            SignatureCategory::Platform => None,
            SignatureCategory::Bootloader => Some(RegionCategory::Bootloader),
            SignatureCategory::Kernel => Some(RegionCategory::Kernel),
            SignatureCategory::RootFs | SignatureCategory::Filesystem => {
                Some(RegionCategory::RootFs)
            }
            SignatureCategory::Config => Some(RegionCategory::Config),
            SignatureCategory::Assets => Some(RegionCategory::Assets),
        }
    }

    pub fn is_filesystem(self) -> bool {
        self == SignatureCategory::Filesystem
    }
}

impl fmt::Display for SignatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignatureCategory::Platform => "platform",
            SignatureCategory::Bootloader => "bootloader",
            SignatureCategory::Kernel => "kernel",
            SignatureCategory::RootFs => "rootfs",
            SignatureCategory::Filesystem => "filesystem",
            SignatureCategory::Config => "config",
            SignatureCategory::Assets => "assets",
        };
        f.write_str(s)
    }
}

/// A named detector. Catalog entries live for the whole process and are
/// never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignatureDefinition {
    /// Unique catalog name (e.g. "uboot", "squashfs").
    pub name: &'static str,
    pub category: SignatureCategory,
    /// Text tokens, matched ASCII case-insensitively.
    pub tokens: &'static [&'static str],
    /// Exact byte patterns.
    pub patterns: &'static [&'static [u8]],
    /// Score added per binary pattern found.
    pub weight: f32,
    pub description: &'static str,
}

/// Per-binary-pattern weight bounds for filesystem signatures.
pub const FILESYSTEM_WEIGHT_RANGE: (f32, f32) = (0.15, 0.2);
/// Per-binary-pattern weight bounds for every other category.
pub const BINARY_WEIGHT_RANGE: (f32, f32) = (0.2, 0.3);

impl SignatureDefinition {
    /// Weight actually applied per binary match, clamped to the category range.
    pub fn binary_weight(&self) -> f32 {
        let (lo, hi) = if self.category.is_filesystem() {
            FILESYSTEM_WEIGHT_RANGE
        } else {
            BINARY_WEIGHT_RANGE
        };
        self.weight.clamp(lo, hi)
    }
}
