//! Firmware platform identification and extraction.
//!
//! Given a raw firmware image, `fwprobe` infers the platform family from
//! signature evidence, decodes MBR/GPT partition tables, estimates where the
//! bootloader, kernel, root filesystem and other regions live, proposes a
//! boot order, and carves artifacts to disk.
//!
//! ```no_run
//! let result = fwprobe::analyze("firmware.bin")?;
//! println!("{}", result.to_json_string()?);
//! # Ok::<(), fwprobe::FwError>(())
//! ```

/// Core data types
pub mod core;
pub mod engine;
pub mod error;
pub mod io;
pub mod logging;
pub mod timeout;

pub use crate::core::{
    AnalysisResult, BootStep, CandidateScore, DetectedPlatform, DetectedRegion, Evidence,
    ExtractedArtifact, Issue, IssueKind, PartitionEntry, RegionCategory,
};
pub use crate::engine::api::{analyze, AnalyzeOptions, Analyzer};
pub use crate::engine::config::EngineConfig;
pub use crate::error::{FwError, Result};
pub use crate::timeout::CancelToken;
