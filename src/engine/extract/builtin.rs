//! Built-in extraction: byte-range copies of partitions, regions, or a
//! platform's default layout.

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

use crate::core::artifact::{ArtifactSource, ExtractedArtifact};
use crate::core::partition::PartitionEntry;
use crate::core::platform::PlatformProfile;
use crate::core::region::DetectedRegion;
use crate::engine::extract::{marker_path, sniff};
use crate::error::{FwError, Result};
use crate::io::Sample;
use crate::timeout::CancelToken;

/// One planned byte-range copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionJob {
    pub source: ArtifactSource,
    pub offset: u64,
    pub length: u64,
    pub file_name: String,
}

/// Lowercase file-name-safe form of a label.
pub fn sanitize(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Plans copies: in-bounds partitions, then in-bounds regions. When both are
/// empty, falls back to `layout`'s slots clipped to the file.
pub fn plan_jobs(
    sample_len: u64,
    partitions: &[PartitionEntry],
    regions: &[DetectedRegion],
    layout: Option<&PlatformProfile>,
) -> Vec<ExtractionJob> {
    let mut jobs = Vec::new();

    for p in partitions.iter().filter(|p| p.length > 0 && p.fits_within(sample_len)) {
        jobs.push(ExtractionJob {
            source: ArtifactSource::Partition {
                number: p.number,
                offset: p.offset,
            },
            offset: p.offset,
            length: p.length,
            file_name: format!("part{}_{}_0x{:08x}.bin", p.number, sanitize(&p.type_name), p.offset),
        });
    }

    for r in regions.iter().filter(|r| r.size > 0 && r.end() <= sample_len) {
        jobs.push(ExtractionJob {
            source: ArtifactSource::Region {
                category: r.category,
                offset: r.offset,
            },
            offset: r.offset,
            length: r.size,
            file_name: format!("{}_0x{:08x}.bin", r.category, r.offset),
        });
    }

    if jobs.is_empty() {
        if let Some(profile) = layout {
            for slot in profile.default_layout.iter().filter(|s| s.offset < sample_len) {
                let length = slot.size.min(sample_len - slot.offset);
                if length == 0 {
                    continue;
                }
                jobs.push(ExtractionJob {
                    source: ArtifactSource::Layout {
                        slot: slot.name.to_string(),
                        category: slot.category,
                        offset: slot.offset,
                    },
                    offset: slot.offset,
                    length,
                    file_name: format!("layout_{}_0x{:08x}.bin", sanitize(slot.name), slot.offset),
                });
            }
        }
    }

    debug!(jobs = jobs.len(), "Planned built-in extraction");
    jobs
}

/// Copies one job's range into `out_dir`. On cancellation the partial file
/// is kept next to an incomplete marker and reported with `complete = false`.
pub fn write_job(
    sample: &Sample,
    job: &ExtractionJob,
    out_dir: &Path,
    chunk_size: usize,
    cancel: &CancelToken,
) -> Result<ExtractedArtifact> {
    let path = out_dir.join(&job.file_name);
    let write_err = |source: std::io::Error| FwError::ExtractionWriteFailure {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    let mut hasher = Sha256::new();
    let chunk = chunk_size.max(1) as u64;
    let mut written = 0u64;
    let mut complete = true;

    while written < job.length {
        if cancel.is_cancelled() {
            complete = false;
            break;
        }
        let want = chunk.min(job.length - written);
        let bytes = sample.read_at(job.offset + written, want);
        if bytes.is_empty() {
            complete = false;
            break;
        }
        writer.write_all(bytes).map_err(write_err)?;
        hasher.update(bytes);
        written += bytes.len() as u64;
    }
    writer.flush().map_err(write_err)?;
    drop(writer);

    if !complete {
        warn!(path = %path.display(), written, expected = job.length, "Artifact left incomplete");
        std::fs::write(marker_path(&path), format!("{written} of {} bytes\n", job.length))
            .map_err(write_err)?;
    }

    let sniffed = sniff::sniff_file(&path).map_err(write_err)?;
    debug!(path = %path.display(), bytes = written, complete, "Artifact written");
    Ok(ExtractedArtifact {
        source: job.source.clone(),
        path,
        size_bytes: written,
        content_type: sniffed.content_type,
        mime: sniffed.mime,
        description: sniffed.description,
        sha256: hex::encode(hasher.finalize()),
        complete,
    })
}

/// Runs every job on a bounded pool. Results keep job order.
pub fn run_jobs(
    sample: &Sample,
    jobs: &[ExtractionJob],
    out_dir: &Path,
    workers: usize,
    chunk_size: usize,
    cancel: &CancelToken,
) -> Vec<Result<ExtractedArtifact>> {
    let work = |job: &ExtractionJob| -> Option<Result<ExtractedArtifact>> {
        // Jobs not yet started when cancellation lands are skipped outright.
        if cancel.is_cancelled() {
            return None;
        }
        Some(write_job(sample, job, out_dir, chunk_size, cancel))
    };

    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("fwprobe-extract-{i}"))
        .build()
    {
        Ok(pool) => pool.install(|| jobs.par_iter().filter_map(work).collect()),
        Err(e) => {
            warn!(error = %e, "Extraction pool unavailable, writing sequentially");
            jobs.iter().filter_map(work).collect()
        }
    }
}
