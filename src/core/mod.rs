//! Core data types shared by every pipeline stage.
//!
//! Everything here is plain data: catalog entries are `'static` and
//! immutable, per-analysis values are created fresh for each run and
//! returned by value.

pub mod artifact;
pub mod evidence;
pub mod issue;
pub mod partition;
pub mod platform;
pub mod region;
pub mod result;
pub mod signature;

pub use artifact::{ArtifactSource, ContentType, ExtractedArtifact, ExtractionStrategy, ExtractionSummary};
pub use evidence::{CandidateScore, Evidence, MatchKind};
pub use issue::{Issue, IssueKind};
pub use partition::{PartitionEntry, PartitionScheme};
pub use platform::{DetectedPlatform, LayoutSlot, PlatformFamily, PlatformProfile};
pub use region::{BootStep, DetectedRegion, RegionCategory};
pub use result::{AnalysisResult, SCHEMA_VERSION};
pub use signature::{SignatureCategory, SignatureDefinition};
