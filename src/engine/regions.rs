//! Region estimation from catalog hits.
//!
//! Offsets come from evidence; sizes are per-category configured defaults
//! truncated at the end of the file. Sizes are estimates, not parsed from
//! headers.

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::core::evidence::{Evidence, MatchKind};
use crate::core::region::{DetectedRegion, RegionCategory};
use crate::engine::catalog::{self, signatures::ALIGNED_PROBES};
use crate::engine::config::RegionConfig;
use crate::engine::scan::{printable, CatalogHits};
use crate::engine::score::ScoreEngine;
use crate::io::Sample;

/// Estimates regions for one sample.
#[derive(Debug, Clone)]
pub struct RegionEstimator<'a> {
    config: &'a RegionConfig,
    scorer: &'a ScoreEngine,
}

impl<'a> RegionEstimator<'a> {
    pub fn new(config: &'a RegionConfig, scorer: &'a ScoreEngine) -> Self {
        Self { config, scorer }
    }

    /// Runs every category estimate plus the aligned filesystem probes.
    /// Output is sorted by offset, then category priority.
    pub fn estimate(&self, sample: &Sample, hits: &CatalogHits) -> Vec<DetectedRegion> {
        let mut regions: Vec<DetectedRegion> = RegionCategory::ALL
            .par_iter()
            .filter_map(|&cat| self.estimate_category(sample, hits, cat))
            .collect();

        for probe in self.probe_aligned(sample) {
            let duplicate = regions
                .iter()
                .any(|r| r.category == probe.category && r.offset == probe.offset);
            if !duplicate {
                regions.push(probe);
            }
        }

        regions.sort_by(|a, b| a.offset.cmp(&b.offset).then(a.category.cmp(&b.category)));
        debug!(count = regions.len(), "Estimated regions");
        regions
    }

    fn clipped_size(&self, sample: &Sample, category: RegionCategory, offset: u64) -> u64 {
        self.config
            .default_size(category)
            .min(sample.len().saturating_sub(offset))
    }

    /// Region for one category, if any of its signatures qualifies.
    pub fn estimate_category(
        &self,
        sample: &Sample,
        hits: &CatalogHits,
        category: RegionCategory,
    ) -> Option<DetectedRegion> {
        let defs = catalog::definitions();
        let mut confidence = 0.0f32;
        let mut binary_offset: Option<u64> = None;
        let mut text_offset: Option<u64> = None;
        let mut signatures = Vec::new();
        let mut evidence = Vec::new();

        for (idx, def) in defs.iter().enumerate() {
            if def.category.region() != Some(category) {
                continue;
            }
            let Some(sig_hits) = hits.get(idx) else {
                continue;
            };
            let conf = self.scorer.signature_confidence(def, sig_hits);
            if conf <= 0.0 || conf < self.config.min_signature_confidence {
                continue;
            }
            trace!(signature = def.name, confidence = conf, %category, "Signature qualifies");
            confidence += conf;
            binary_offset = min_opt(binary_offset, sig_hits.first_binary_offset());
            text_offset = min_opt(text_offset, sig_hits.first_text_offset());
            signatures.push(def.name.to_string());
            evidence.extend(self.scorer.signature_evidence(def, sig_hits, false));
        }

        let offset = binary_offset.or(text_offset)?;
        if offset >= sample.len() {
            return None;
        }
        evidence.sort_by(Evidence::canonical_cmp);

        Some(DetectedRegion {
            category,
            confidence: confidence.clamp(0.0, 1.0),
            offset,
            size: self.clipped_size(sample, category, offset),
            signatures,
            evidence,
            setup_steps: category.setup_tags().iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Filesystem magics at erase-block-aligned offsets of the full file.
    pub fn probe_aligned(&self, sample: &Sample) -> Vec<DetectedRegion> {
        let mut out: Vec<DetectedRegion> = Vec::new();
        for &base in &self.config.aligned_offsets {
            if base >= sample.len() || out.iter().any(|r| r.offset == base) {
                continue;
            }
            for &(name, magic, rel) in ALIGNED_PROBES {
                let Some(at) = base.checked_add(rel) else {
                    continue;
                };
                if sample.read_at(at, magic.len() as u64) != magic {
                    continue;
                }
                let Some(def) = catalog::find_definition(name) else {
                    continue;
                };
                let weight = def.binary_weight();
                trace!(signature = name, offset = base, "Aligned filesystem probe hit");
                out.push(DetectedRegion {
                    category: RegionCategory::RootFs,
                    confidence: weight,
                    offset: base,
                    size: self.clipped_size(sample, RegionCategory::RootFs, base),
                    signatures: vec![name.to_string()],
                    evidence: vec![Evidence {
                        signature: name.to_string(),
                        category: def.category,
                        kind: MatchKind::BinaryPattern,
                        matched: printable(magic),
                        offsets: vec![at],
                        occurrences: 1,
                        weight,
                    }],
                    setup_steps: RegionCategory::RootFs
                        .setup_tags()
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                });
                break;
            }
        }
        out
    }
}

fn min_opt(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Convenience wrapper over [`RegionEstimator::estimate`].
pub fn estimate_regions(
    sample: &Sample,
    hits: &CatalogHits,
    config: &RegionConfig,
    scorer: &ScoreEngine,
) -> Vec<DetectedRegion> {
    RegionEstimator::new(config, scorer).estimate(sample, hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scan::CatalogScanner;

    fn run(buf: Vec<u8>) -> Vec<DetectedRegion> {
        let sample = Sample::from_bytes("image.bin", buf, 1 << 22);
        let hits = CatalogScanner::global().scan(sample.prefix());
        estimate_regions(&sample, &hits, &RegionConfig::default(), &ScoreEngine::default())
    }

    #[test]
    fn bootloader_and_rootfs_from_magics() {
        let mut buf = vec![0u8; 2048];
        buf[100..106].copy_from_slice(b"U-Boot");
        buf[1500..1504].copy_from_slice(b"hsqs");
        let regions = run(buf);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].category, RegionCategory::Bootloader);
        assert_eq!(regions[0].offset, 100);
        assert_eq!(regions[0].size, 2048 - 100);
        assert_eq!(regions[1].category, RegionCategory::RootFs);
        assert_eq!(regions[1].offset, 1500);
        assert_eq!(regions[1].size, 548);
    }

    #[test]
    fn binary_offset_beats_earlier_text() {
        let mut buf = vec![0u8; 4096];
        buf[10..22].copy_from_slice(b"bootloader: ");
        buf[40..46].copy_from_slice(b"u-boot");
        buf[900..906].copy_from_slice(b"U-Boot");
        let regions = run(buf);
        let boot = regions
            .iter()
            .find(|r| r.category == RegionCategory::Bootloader)
            .unwrap();
        assert_eq!(boot.offset, 900);
    }

    #[test]
    fn text_only_signature_uses_text_offset() {
        let mut buf = vec![0u8; 4096];
        buf[300..317].copy_from_slice(b"bootcmd=bootm 0x0");
        let regions = run(buf);
        assert_eq!(regions.len(), 0, "one text hit scores 0.1, below 0.15");

        let mut buf = vec![0u8; 4096];
        buf[300..309].copy_from_slice(b"bootargs=");
        buf[400..408].copy_from_slice(b"bootcmd=");
        let regions = run(buf);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].category, RegionCategory::Config);
        assert_eq!(regions[0].offset, 300);
    }

    #[test]
    fn aligned_probe_finds_filesystem_past_window() {
        let mut buf = vec![0u8; 128 * 1024 + 16];
        buf[128 * 1024..128 * 1024 + 8].copy_from_slice(b"-rom1fs-");
        let sample = Sample::from_bytes("image.bin", buf, 1024);
        let hits = CatalogScanner::global().scan(sample.prefix());
        let regions =
            estimate_regions(&sample, &hits, &RegionConfig::default(), &ScoreEngine::default());
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].offset, 128 * 1024);
        assert_eq!(regions[0].size, 16);
        assert_eq!(regions[0].signatures, vec!["romfs".to_string()]);
    }

    #[test]
    fn aligned_probe_checks_ext_superblock_offset() {
        let mut buf = vec![0u8; 64 * 1024 + 0x1000];
        buf[64 * 1024 + 0x438] = 0x53;
        buf[64 * 1024 + 0x439] = 0xEF;
        let regions = run(buf);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].offset, 64 * 1024);
        assert_eq!(regions[0].signatures, vec!["ext".to_string()]);
    }

    #[test]
    fn probe_at_estimated_offset_is_not_duplicated() {
        let mut buf = vec![0u8; 4096];
        buf[..4].copy_from_slice(b"hsqs");
        let regions = run(buf);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].offset, 0);
    }

    #[test]
    fn zero_buffer_has_no_regions() {
        assert!(run(vec![0u8; 4096]).is_empty());
    }

    #[test]
    fn regions_never_exceed_file() {
        let mut buf = vec![0u8; 3000];
        buf[2990..2998].copy_from_slice(b"CFE1CFE1");
        for r in run(buf) {
            assert!(r.offset + r.size <= 3000);
        }
    }
}
