//! Analysis entry points.
//!
//! `analyze` opens the image, ranks every platform profile, decodes the
//! partition table, estimates regions, synthesizes the boot plan, runs the
//! extraction pipeline, and assembles one [`AnalysisResult`]. Only a missing
//! input file (or an unreadable one) is an error; everything else is
//! recorded on the result.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::artifact::ExtractionSummary;
use crate::core::evidence::Evidence;
use crate::core::issue::{Issue, IssueKind};
use crate::core::platform::{DetectedPlatform, PlatformProfile};
use crate::core::result::{AnalysisResult, SCHEMA_VERSION};
use crate::engine::boot;
use crate::engine::catalog;
use crate::engine::config::EngineConfig;
use crate::engine::extract::{ExtractionRequest, Extractor};
use crate::engine::partition;
use crate::engine::regions::RegionEstimator;
use crate::engine::scan::CatalogScanner;
use crate::engine::score::ScoreEngine;
use crate::error::{FwError, Result};
use crate::io::Sample;
use crate::timeout::CancelToken;

pub const NOTE_PINNED: &str = "platform pinned by caller";
pub const NOTE_LIMITED: &str = "limited signature detection";

/// Distinct catalog signatures below which detection is flagged as limited.
const LIMITED_DETECTION_BELOW: usize = 3;

/// Hex digits of the content digest in a default output directory name.
const OUTPUT_DIR_DIGEST_LEN: usize = 16;

/// Per-call options.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Pins a profile by name instead of trusting the ranking.
    pub platform_hint: Option<String>,
    /// Extraction destination; defaults to `<temp>/fwprobe-<file stem>-<digest>`.
    pub output_dir: Option<PathBuf>,
    /// Run the extraction pipeline.
    pub extract: bool,
    pub cancel: CancelToken,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            platform_hint: None,
            output_dir: None,
            extract: true,
            cancel: CancelToken::new(),
        }
    }
}

/// Default extraction directory for a sample.
///
/// Keyed by file stem and a sha256 prefix of the whole image, so distinct
/// images sharing a name never share a directory while the same image always
/// maps to the same one.
pub fn default_output_dir(sample: &Sample) -> PathBuf {
    let stem = sample
        .path()
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| sample.file_name().to_string());
    let stem = if stem.is_empty() { "sample".to_string() } else { stem };
    let digest = hex::encode(Sha256::digest(sample.read_at(0, sample.len())));
    std::env::temp_dir().join(format!(
        "fwprobe-{stem}-{}",
        &digest[..OUTPUT_DIR_DIGEST_LEN]
    ))
}

/// Configured analysis engine. Holds no per-analysis state, so one
/// analyzer may serve concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: EngineConfig,
}

impl Analyzer {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyzes a file with default options.
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> Result<AnalysisResult> {
        self.analyze_with(path, &AnalyzeOptions::default())
    }

    pub fn analyze_with<P: AsRef<Path>>(
        &self,
        path: P,
        options: &AnalyzeOptions,
    ) -> Result<AnalysisResult> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Firmware image not found");
            return Err(FwError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let sample = Sample::open(path, &self.config.io.limits())?;
        self.analyze_sample(&sample, options)
    }

    /// Analyzes an already opened sample.
    pub fn analyze_sample(
        &self,
        sample: &Sample,
        options: &AnalyzeOptions,
    ) -> Result<AnalysisResult> {
        let span =
            crate::span_trace!("analyze", path = %sample.file_name(), size_bytes = sample.len());
        let _guard = span.enter();

        let scorer = ScoreEngine::new(self.config.scoring.clone());
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        let mut notes = Vec::new();

        debug!(phase = "scan", window = sample.prefix().len(), "Scanning catalog");
        let hits = CatalogScanner::global().scan_with_filename(sample.prefix(), sample.file_name());
        let distinct = hits.distinct_matched();

        debug!(phase = "score");
        let candidates = scorer.rank(catalog::profiles(), &hits);
        info!(candidates = candidates.len(), signatures = distinct, "Scored platform profiles");

        let pinned = options
            .platform_hint
            .as_deref()
            .and_then(|hint| match catalog::find_profile(hint) {
                Some(profile) => Some(profile),
                None => {
                    let issue = Issue::new(
                        IssueKind::UnknownPlatformHint,
                        format!("unknown platform hint '{hint}', using detection"),
                    );
                    warn!("{}", issue.message);
                    warnings.push(issue);
                    None
                }
            });

        let (profile, confidence, success, evidence): (
            Option<&'static PlatformProfile>,
            f32,
            bool,
            Vec<Evidence>,
        ) = match (pinned, candidates.first()) {
            (Some(p), _) => {
                let own = candidates.iter().find(|c| c.platform == p.name);
                notes.push(NOTE_PINNED.to_string());
                (
                    Some(p),
                    own.map(|c| c.confidence).unwrap_or(0.0),
                    true,
                    own.map(|c| c.evidence.clone()).unwrap_or_default(),
                )
            }
            (None, Some(top)) => {
                let detected = scorer.is_detected(top);
                let profile = if detected {
                    catalog::find_profile(&top.platform)
                } else {
                    None
                };
                (profile, top.confidence, detected, top.evidence.clone())
            }
            (None, None) => (None, 0.0, false, Vec::new()),
        };

        debug!(phase = "partitions");
        let mut partitions = partition::decode_partitions(sample);
        partitions.retain(|p| {
            let fits = p.fits_within(sample.len());
            if !fits {
                let issue = Issue::from(FwError::MalformedStructure(format!(
                    "partition {} ({}) spans 0x{:x}..0x{:x} beyond file end 0x{:x}; skipped",
                    p.number,
                    p.type_name,
                    p.offset,
                    p.end(),
                    sample.len()
                )));
                warn!("{}", issue.message);
                warnings.push(issue);
            }
            fits
        });

        debug!(phase = "regions");
        let regions = RegionEstimator::new(&self.config.regions, &scorer).estimate(sample, &hits);

        debug!(phase = "boot");
        let boot_sequence = boot::synthesize(&regions);

        let (artifacts, extraction) = if options.extract && self.config.extraction.enabled {
            let output_dir = options
                .output_dir
                .clone()
                .unwrap_or_else(|| default_output_dir(sample));
            let out = Extractor::new(&self.config.extraction).extract(&ExtractionRequest {
                sample,
                partitions: &partitions,
                regions: &regions,
                layout: profile,
                output_dir: &output_dir,
                cancel: &options.cancel,
            });
            warnings.extend(out.warnings);
            errors.extend(out.errors);
            (out.artifacts, out.summary)
        } else {
            (Vec::new(), ExtractionSummary::skipped())
        };

        notes.push(match (profile, candidates.first()) {
            (Some(p), _) => format!("platform {} at confidence {:.2}", p.name, confidence),
            (None, Some(top)) if top.confidence > 0.0 => format!(
                "no platform cleared the detection threshold; best candidate {} at {:.2}",
                top.platform, top.confidence
            ),
            _ => "no platform signatures matched".to_string(),
        });
        if distinct < LIMITED_DETECTION_BELOW {
            notes.push(format!("{NOTE_LIMITED} ({distinct} signatures matched)"));
        }
        if !extraction.complete {
            notes.push("extraction is partial".to_string());
        }

        info!(
            success,
            platform = profile.map(|p| p.name).unwrap_or("none"),
            confidence,
            partitions = partitions.len(),
            regions = regions.len(),
            artifacts = artifacts.len(),
            warnings = warnings.len(),
            "Analysis complete"
        );

        Ok(AnalysisResult {
            schema_version: SCHEMA_VERSION,
            source_path: sample
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(sample.file_name())),
            source_size: sample.len(),
            success,
            detected_platform: profile.map(|p| DetectedPlatform::from_profile(p, pinned.is_some())),
            confidence,
            candidates,
            evidence,
            partitions,
            regions,
            boot_sequence,
            artifacts,
            extraction,
            warnings,
            errors,
            notes,
        })
    }
}

/// Analyzes `path` with default configuration and options.
pub fn analyze<P: AsRef<Path>>(path: P) -> Result<AnalysisResult> {
    Analyzer::default().analyze(path)
}
