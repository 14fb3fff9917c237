//! Configuration for the analysis engine.
//!
//! Every knob has a default matching the documented heuristics; a JSON file
//! may override any subset of fields.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::region::RegionCategory;
use crate::error::Result;
use crate::io::{IOLimits, DEFAULT_WINDOW_SIZE};
use crate::timeout::DEFAULT_TIMEOUT_SECONDS;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// Master configuration for the analysis pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample window and file size limits.
    pub io: IOConfig,
    /// Confidence engine weights.
    pub scoring: ScoringConfig,
    /// Region estimator defaults.
    pub regions: RegionConfig,
    /// Extraction pipeline and delegate tool.
    pub extraction: ExtractionConfig,
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// I/O configuration for sampling the firmware image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOConfig {
    /// Prefix window scanned for signatures.
    pub window_bytes: u64,
    /// Largest image accepted.
    pub max_file_size: u64,
}

impl Default for IOConfig {
    fn default() -> Self {
        Self {
            window_bytes: DEFAULT_WINDOW_SIZE,
            max_file_size: u64::MAX,
        }
    }
}

impl IOConfig {
    pub fn limits(&self) -> IOLimits {
        IOLimits {
            max_file_size: self.max_file_size,
            window_size: self.window_bytes,
        }
    }
}

/// Scoring and confidence configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Score per occurrence of a text token.
    pub text_step: f32,
    /// Maximum score one text token can contribute.
    pub text_cap: f32,
    /// Score for a signature token found in the file name.
    pub filename_weight: f32,
    /// Bonus per distinct signature beyond `diversity_floor`.
    pub diversity_step: f32,
    pub diversity_floor: u32,
    /// A candidate must score strictly above this to be detected.
    pub detection_threshold: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            text_step: 0.1,
            text_cap: 0.3,
            filename_weight: 0.2,
            diversity_step: 0.1,
            diversity_floor: 2,
            detection_threshold: 0.3,
        }
    }
}

/// Region estimator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Minimum per-signature confidence for a signature to place a region.
    pub min_signature_confidence: f32,
    pub bootloader_size: u64,
    pub config_size: u64,
    pub kernel_size: u64,
    pub rootfs_size: u64,
    pub assets_size: u64,
    /// Erase-block-aligned offsets probed for filesystem magics.
    pub aligned_offsets: Vec<u64>,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            min_signature_confidence: 0.15,
            bootloader_size: 256 * KIB,
            config_size: 64 * KIB,
            kernel_size: 4 * MIB,
            rootfs_size: 32 * MIB,
            assets_size: 8 * MIB,
            aligned_offsets: vec![
                0,
                64 * KIB,
                128 * KIB,
                256 * KIB,
                512 * KIB,
                MIB,
                2 * MIB,
                4 * MIB,
                8 * MIB,
            ],
        }
    }
}

impl RegionConfig {
    /// Default size estimate for a category.
    pub fn default_size(&self, category: RegionCategory) -> u64 {
        match category {
            RegionCategory::Bootloader => self.bootloader_size,
            RegionCategory::Config => self.config_size,
            RegionCategory::Kernel => self.kernel_size,
            RegionCategory::RootFs => self.rootfs_size,
            RegionCategory::Assets => self.assets_size,
        }
    }
}

/// Extraction pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub enabled: bool,
    /// Concurrent artifact writers.
    pub workers: usize,
    /// Copy chunk size; cancellation is checked between chunks.
    pub chunk_size: usize,
    pub delegate: DelegateConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            workers: 4,
            chunk_size: MIB as usize,
            delegate: DelegateConfig::default(),
        }
    }
}

/// External recursive unpacker.
///
/// `args` is a template; the placeholders `{input}` and `{output}` are
/// substituted per argument and the result is passed to the program
/// directly, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelegateConfig {
    pub enabled: bool,
    pub program: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for DelegateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "binwalk".to_string(),
            args: ["--extract", "--matryoshka", "--directory", "{output}", "{input}"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout_secs: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}
