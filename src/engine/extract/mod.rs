//! Extraction pipeline.
//!
//! Tries the external unpacker first and falls back to built-in range
//! copies when it is missing, fails, times out, or produces nothing. Every
//! artifact's content type is sniffed from the written file.

pub mod builtin;
pub mod delegate;
pub mod sniff;

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::artifact::{
    ArtifactSource, ExtractedArtifact, ExtractionStrategy, ExtractionSummary,
};
use crate::core::issue::{Issue, IssueKind};
use crate::core::partition::PartitionEntry;
use crate::core::platform::PlatformProfile;
use crate::core::region::DetectedRegion;
use crate::engine::config::ExtractionConfig;
use crate::error::FwError;
use crate::io::Sample;
use crate::timeout::CancelToken;
use delegate::{Delegate, DelegateOutcome};

/// Suffix of the marker written next to a partially written artifact.
pub const INCOMPLETE_SUFFIX: &str = ".incomplete";
/// Subdirectory of the destination handed to the external unpacker.
pub const DELEGATED_SUBDIR: &str = "delegated";

/// `<path>.incomplete`
pub fn marker_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(INCOMPLETE_SUFFIX);
    PathBuf::from(name)
}

/// Inputs for one extraction run.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    pub sample: &'a Sample,
    pub partitions: &'a [PartitionEntry],
    pub regions: &'a [DetectedRegion],
    /// Profile whose default layout is used when nothing else is extractable.
    pub layout: Option<&'static PlatformProfile>,
    pub output_dir: &'a Path,
    pub cancel: &'a CancelToken,
}

/// Everything extraction produced, ready to merge into the result.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutput {
    pub artifacts: Vec<ExtractedArtifact>,
    pub warnings: Vec<Issue>,
    pub errors: Vec<Issue>,
    pub summary: ExtractionSummary,
}

impl ExtractionOutput {
    fn new(strategy: ExtractionStrategy, output_dir: &Path) -> Self {
        Self {
            artifacts: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            summary: ExtractionSummary {
                strategy,
                complete: true,
                output_dir: Some(output_dir.to_path_buf()),
            },
        }
    }

    fn warn(&mut self, kind: IssueKind, message: impl Into<String>) {
        let issue = Issue::new(kind, message);
        warn!(kind = %issue.kind, "{}", issue.message);
        self.warnings.push(issue);
    }
}

/// Runs the extraction pipeline with a given configuration.
#[derive(Debug, Clone)]
pub struct Extractor<'a> {
    config: &'a ExtractionConfig,
}

impl<'a> Extractor<'a> {
    pub fn new(config: &'a ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, req: &ExtractionRequest<'_>) -> ExtractionOutput {
        debug!(phase = "extract", output = %req.output_dir.display(), "Starting extraction");

        if let Err(source) = std::fs::create_dir_all(req.output_dir) {
            let mut out = ExtractionOutput::new(ExtractionStrategy::BuiltIn, req.output_dir);
            let err = FwError::ExtractionWriteFailure {
                path: req.output_dir.to_path_buf(),
                source,
            };
            out.errors
                .push(Issue::from(crate::log_error!(err, "output directory")));
            out.summary.complete = false;
            return out;
        }

        let mut notes = Vec::new();
        if self.config.delegate.enabled {
            match self.try_delegate(req, &mut notes) {
                Some(mut out) => {
                    notes.append(&mut out.warnings);
                    out.warnings = notes;
                    return out;
                }
                None => debug!("Falling back to built-in extraction"),
            }
        }

        let mut out = self.builtin(req);
        // Delegate notes precede built-in warnings.
        notes.append(&mut out.warnings);
        out.warnings = notes;
        info!(
            strategy = %out.summary.strategy,
            artifacts = out.artifacts.len(),
            complete = out.summary.complete,
            "Extraction finished"
        );
        out
    }

    /// Returns the final output when the delegate's result stands, or `None`
    /// (with the reason appended to `notes`) when built-in extraction should run.
    fn try_delegate(
        &self,
        req: &ExtractionRequest<'_>,
        notes: &mut Vec<Issue>,
    ) -> Option<ExtractionOutput> {
        let mut note = |issue: Issue| {
            warn!(kind = %issue.kind, "{}", issue.message);
            notes.push(issue);
        };
        let unavailable = |reason: String| Issue::from(FwError::ToolUnavailable(reason));

        let Some(input) = req.sample.path() else {
            note(unavailable("sample is not backed by a file".to_string()));
            return None;
        };

        let delegate = Delegate::new(&self.config.delegate);
        let out_dir = req.output_dir.join(DELEGATED_SUBDIR);
        match clear_stale(&out_dir) {
            Ok(0) => {}
            Ok(removed) => note(Issue::new(
                IssueKind::Other,
                format!(
                    "removed {removed} stale entries from {} before unpacking",
                    out_dir.display()
                ),
            )),
            Err(e) => {
                note(unavailable(format!(
                    "cannot clear stale output in {}: {e}",
                    out_dir.display()
                )));
                return None;
            }
        }

        match delegate.run(input, &out_dir, req.cancel) {
            DelegateOutcome::Completed { files } if !files.is_empty() => {
                let mut out = ExtractionOutput::new(ExtractionStrategy::Delegated, req.output_dir);
                register_delegated(&mut out, &out_dir, &files, true);
                info!(artifacts = out.artifacts.len(), "Delegated extraction finished");
                Some(out)
            }
            DelegateOutcome::Completed { .. } => {
                note(unavailable(format!("{} produced no files", delegate.program())));
                None
            }
            DelegateOutcome::Unavailable { reason } => {
                note(unavailable(reason));
                None
            }
            DelegateOutcome::Failed { code: Some(code) } => {
                note(unavailable(format!(
                    "{} failed with exit status {code}",
                    delegate.program()
                )));
                None
            }
            DelegateOutcome::Failed { code: None } => {
                note(unavailable(format!(
                    "{} terminated abnormally",
                    delegate.program()
                )));
                None
            }
            DelegateOutcome::TimedOut { seconds } => {
                note(Issue::new(
                    IssueKind::Timeout,
                    format!("tool timed out after {seconds}s and was killed, used fallback"),
                ));
                None
            }
            DelegateOutcome::Cancelled { files } => {
                let mut out = ExtractionOutput::new(ExtractionStrategy::Delegated, req.output_dir);
                out.warn(
                    IssueKind::Cancelled,
                    "extraction cancelled during delegated unpacking; partial output kept",
                );
                register_delegated(&mut out, &out_dir, &files, false);
                out.summary.complete = false;
                Some(out)
            }
        }
    }

    fn builtin(&self, req: &ExtractionRequest<'_>) -> ExtractionOutput {
        let mut out = ExtractionOutput::new(ExtractionStrategy::BuiltIn, req.output_dir);
        let jobs = builtin::plan_jobs(req.sample.len(), req.partitions, req.regions, req.layout);
        let results = builtin::run_jobs(
            req.sample,
            &jobs,
            req.output_dir,
            self.config.workers,
            self.config.chunk_size,
            req.cancel,
        );

        for result in results {
            match result {
                Ok(artifact) => {
                    if !artifact.complete {
                        out.warn(
                            IssueKind::IncompleteArtifact,
                            format!(
                                "artifact {} is incomplete ({} bytes written)",
                                artifact.path.display(),
                                artifact.size_bytes
                            ),
                        );
                        out.summary.complete = false;
                    }
                    out.artifacts.push(artifact);
                }
                Err(e) => {
                    out.errors
                        .push(Issue::from(crate::log_error!(e, "artifact write")));
                    out.summary.complete = false;
                }
            }
        }

        if req.cancel.is_cancelled() {
            let skipped = jobs.len().saturating_sub(out.artifacts.len() + out.errors.len());
            out.warn(
                IssueKind::Cancelled,
                format!("extraction cancelled; {skipped} planned artifacts not started"),
            );
            out.summary.complete = false;
        }
        out
    }
}

/// Empties `dir` of anything a previous run left there. Returns the number
/// of top-level entries removed.
fn clear_stale(dir: &Path) -> std::io::Result<usize> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries.count(),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    if entries > 0 {
        std::fs::remove_dir_all(dir)?;
    }
    Ok(entries)
}

/// Registers files produced by the unpacker. Incomplete runs get a marker
/// next to every file.
fn register_delegated(out: &mut ExtractionOutput, root: &Path, files: &[PathBuf], complete: bool) {
    for path in files {
        match describe_file(root, path, complete) {
            Ok(artifact) => {
                if !complete {
                    if let Err(e) = std::fs::write(marker_path(path), "delegate cancelled\n") {
                        out.errors.push(Issue::new(
                            IssueKind::ExtractionWriteFailure,
                            format!("cannot mark {} incomplete: {e}", path.display()),
                        ));
                    }
                }
                out.artifacts.push(artifact);
            }
            Err(e) => out.warn(
                IssueKind::Other,
                format!("cannot read delegated file {}: {e}", path.display()),
            ),
        }
    }
}

fn describe_file(root: &Path, path: &Path, complete: bool) -> std::io::Result<ExtractedArtifact> {
    let mut hasher = Sha256::new();
    let size_bytes = std::io::copy(&mut File::open(path)?, &mut hasher)?;
    let sniffed = sniff::sniff_file(path)?;
    let relative = path.strip_prefix(root).unwrap_or(path);
    Ok(ExtractedArtifact {
        source: ArtifactSource::Delegated {
            relative_path: relative.to_string_lossy().replace('\\', "/"),
        },
        path: path.to_path_buf(),
        size_bytes,
        content_type: sniffed.content_type,
        mime: sniffed.mime,
        description: sniffed.description,
        sha256: hex::encode(hasher.finalize()),
        complete,
    })
}

/// Extracts with default settings.
pub fn extract(
    sample: &Sample,
    regions: &[DetectedRegion],
    partitions: &[PartitionEntry],
    destination_dir: &Path,
) -> ExtractionOutput {
    let config = ExtractionConfig::default();
    let cancel = CancelToken::new();
    Extractor::new(&config).extract(&ExtractionRequest {
        sample,
        partitions,
        regions,
        layout: None,
        output_dir: destination_dir,
        cancel: &cancel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::DelegateConfig;

    fn no_tool() -> ExtractionConfig {
        ExtractionConfig {
            delegate: DelegateConfig {
                program: "fwprobe-no-such-unpacker".into(),
                ..DelegateConfig::default()
            },
            ..ExtractionConfig::default()
        }
    }

    #[test]
    fn marker_path_appends_suffix() {
        assert_eq!(
            marker_path(Path::new("/tmp/kernel_0x00000000.bin")),
            PathBuf::from("/tmp/kernel_0x00000000.bin.incomplete")
        );
    }

    #[test]
    fn in_memory_sample_falls_back_with_warning() {
        let sample = Sample::from_bytes("image.bin", vec![0u8; 1024], 1 << 20);
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancelToken::new();
        let config = ExtractionConfig::default();
        let out = Extractor::new(&config).extract(&ExtractionRequest {
            sample: &sample,
            partitions: &[],
            regions: &[],
            layout: None,
            output_dir: dir.path(),
            cancel: &cancel,
        });
        assert_eq!(out.summary.strategy, ExtractionStrategy::BuiltIn);
        assert!(out.artifacts.is_empty());
        assert_eq!(out.warnings[0].kind, IssueKind::ToolUnavailable);
    }

    #[test]
    fn missing_tool_uses_layout() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("image.bin");
        std::fs::write(&image, vec![0x5Au8; 64 * 1024]).unwrap();
        let sample = Sample::open(&image, &Default::default()).unwrap();
        let cancel = CancelToken::new();
        let config = no_tool();
        let out_dir = dir.path().join("out");
        let out = Extractor::new(&config).extract(&ExtractionRequest {
            sample: &sample,
            partitions: &[],
            regions: &[],
            layout: crate::engine::catalog::find_profile("generic-embedded-linux"),
            output_dir: &out_dir,
            cancel: &cancel,
        });
        assert_eq!(out.summary.strategy, ExtractionStrategy::BuiltIn);
        assert!(out.summary.complete);
        assert_eq!(out.artifacts.len(), 1);
        assert_eq!(out.artifacts[0].size_bytes, 64 * 1024);
        assert!(out.warnings[0]
            .message
            .starts_with("tool unavailable, used fallback"));
    }

    #[cfg(unix)]
    #[test]
    fn leftover_delegated_files_are_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("image.bin");
        std::fs::write(&image, vec![0u8; 4096]).unwrap();
        let sample = Sample::open(&image, &Default::default()).unwrap();

        let out_dir = dir.path().join("out");
        let leftover = out_dir.join(DELEGATED_SUBDIR);
        std::fs::create_dir_all(&leftover).unwrap();
        std::fs::write(leftover.join("stale_from_other_image.bin"), b"old").unwrap();

        let config = ExtractionConfig {
            delegate: DelegateConfig {
                program: "sh".into(),
                args: ["-c", "echo new > \"$1/new.txt\"", "sh", "{output}"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                ..DelegateConfig::default()
            },
            ..ExtractionConfig::default()
        };
        let cancel = CancelToken::new();
        let out = Extractor::new(&config).extract(&ExtractionRequest {
            sample: &sample,
            partitions: &[],
            regions: &[],
            layout: None,
            output_dir: &out_dir,
            cancel: &cancel,
        });

        assert_eq!(out.summary.strategy, ExtractionStrategy::Delegated);
        let names: Vec<_> = out
            .artifacts
            .iter()
            .map(|a| match &a.source {
                ArtifactSource::Delegated { relative_path } => relative_path.clone(),
                other => panic!("unexpected source {other:?}"),
            })
            .collect();
        assert_eq!(names, vec!["new.txt".to_string()]);
        assert!(!leftover.join("stale_from_other_image.bin").exists());
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].kind, IssueKind::Other);
        assert!(out.warnings[0].message.starts_with("removed 1 stale entries"));
    }

    #[test]
    fn failed_artifact_write_is_an_error_entry() {
        use crate::core::region::RegionCategory;

        let sample = Sample::from_bytes("image.bin", vec![0x33u8; 4096], 1 << 20);
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the kernel artifact's file name.
        std::fs::create_dir(dir.path().join("kernel_0x00000000.bin")).unwrap();
        let region = |category, offset| DetectedRegion {
            category,
            confidence: 0.5,
            offset,
            size: 1024,
            signatures: vec![],
            evidence: vec![],
            setup_steps: vec![],
        };
        let regions = [
            region(RegionCategory::Kernel, 0),
            region(RegionCategory::Config, 1024),
        ];
        let cancel = CancelToken::new();
        let config = no_tool();
        let out = Extractor::new(&config).extract(&ExtractionRequest {
            sample: &sample,
            partitions: &[],
            regions: &regions,
            layout: None,
            output_dir: dir.path(),
            cancel: &cancel,
        });

        assert_eq!(out.artifacts.len(), 1);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind, IssueKind::ExtractionWriteFailure);
        assert!(out.errors[0].message.starts_with("Failed to write artifact"));
        assert!(!out.summary.complete);
    }

    #[test]
    fn clear_stale_ignores_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(clear_stale(&dir.path().join("absent")).unwrap(), 0);
        assert_eq!(clear_stale(dir.path()).unwrap(), 0);
        assert!(dir.path().exists());
    }
}
