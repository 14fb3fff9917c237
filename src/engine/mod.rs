//! Firmware analysis engine.
//!
//! Stages run in a fixed order for every image: catalog scan, platform
//! scoring, partition decoding, region estimation, boot synthesis, and
//! extraction. [`api`] wires them together.

pub mod api;
pub mod boot;
pub mod catalog;
pub mod config;
pub mod extract;
pub mod partition;
pub mod regions;
pub mod scan;
pub mod score;

pub use api::{analyze, AnalyzeOptions, Analyzer};
pub use config::EngineConfig;
pub use extract::{extract, ExtractionOutput};
pub use regions::estimate_regions;
pub use scan::CatalogScanner;
pub use score::ScoreEngine;
