//! The aggregate analysis result and its versioned JSON schema.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::artifact::{ExtractedArtifact, ExtractionSummary};
use crate::core::evidence::{CandidateScore, Evidence};
use crate::core::issue::Issue;
use crate::core::partition::PartitionEntry;
use crate::core::platform::DetectedPlatform;
use crate::core::region::{BootStep, DetectedRegion};
use crate::error::Result;

/// Bumped whenever a field changes meaning or is removed.
pub const SCHEMA_VERSION: u32 = 1;

/// Everything one analysis produced. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub schema_version: u32,
    pub source_path: PathBuf,
    pub source_size: u64,
    /// True iff a platform cleared the detection threshold or was pinned.
    pub success: bool,
    pub detected_platform: Option<DetectedPlatform>,
    pub confidence: f32,
    /// Every profile scored, best first.
    pub candidates: Vec<CandidateScore>,
    /// Evidence of the top candidate.
    pub evidence: Vec<Evidence>,
    pub partitions: Vec<PartitionEntry>,
    pub regions: Vec<DetectedRegion>,
    pub boot_sequence: Vec<BootStep>,
    pub artifacts: Vec<ExtractedArtifact>,
    pub extraction: ExtractionSummary,
    pub warnings: Vec<Issue>,
    pub errors: Vec<Issue>,
    pub notes: Vec<String>,
}

impl AnalysisResult {
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Steps of the boot plan that name a region.
    pub fn boot_plan(&self) -> impl Iterator<Item = &BootStep> {
        self.boot_sequence.iter().filter(|s| s.category.is_some())
    }
}
