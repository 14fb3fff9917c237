//! Confidence scoring and candidate ranking.

use rayon::prelude::*;
use tracing::debug;

use crate::core::evidence::{CandidateScore, Evidence, MatchKind};
use crate::core::platform::PlatformProfile;
use crate::core::signature::SignatureDefinition;
use crate::engine::catalog;
use crate::engine::config::ScoringConfig;
use crate::engine::scan::{printable, CatalogHits, CatalogScanner, SignatureHits};
use crate::io::Sample;

/// Scoring engine for evidence accumulation and candidate ranking.
#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    config: ScoringConfig,
}

impl ScoreEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score contributed by one text token seen `count` times.
    pub fn text_weight(&self, count: u32) -> f32 {
        (count as f32 * self.config.text_step).min(self.config.text_cap)
    }

    /// Evidence for one signature, in token then pattern order.
    pub fn signature_evidence(
        &self,
        def: &SignatureDefinition,
        hits: &SignatureHits,
        include_filename: bool,
    ) -> Vec<Evidence> {
        let mut out = Vec::new();
        for (token, hit) in def.tokens.iter().zip(&hits.tokens) {
            if hit.is_empty() {
                continue;
            }
            out.push(Evidence {
                signature: def.name.to_string(),
                category: def.category,
                kind: MatchKind::TextToken,
                matched: token.to_string(),
                offsets: hit.offsets.clone(),
                occurrences: hit.count,
                weight: self.text_weight(hit.count),
            });
        }
        for (pattern, hit) in def.patterns.iter().zip(&hits.patterns) {
            if hit.is_empty() {
                continue;
            }
            out.push(Evidence {
                signature: def.name.to_string(),
                category: def.category,
                kind: MatchKind::BinaryPattern,
                matched: printable(pattern),
                offsets: hit.offsets.clone(),
                occurrences: hit.count,
                weight: def.binary_weight(),
            });
        }
        if include_filename {
            if let Some(ti) = hits.filename_token {
                out.push(Evidence {
                    signature: def.name.to_string(),
                    category: def.category,
                    kind: MatchKind::Filename,
                    matched: def.tokens.get(ti).map(|t| t.to_string()).unwrap_or_default(),
                    offsets: Vec::new(),
                    occurrences: 1,
                    weight: self.config.filename_weight,
                });
            }
        }
        out
    }

    /// Content-only confidence of one signature (text plus binary, no
    /// filename), clamped to [0,1]. Used to qualify region placement.
    pub fn signature_confidence(&self, def: &SignatureDefinition, hits: &SignatureHits) -> f32 {
        let text: f32 = hits
            .tokens
            .iter()
            .filter(|h| !h.is_empty())
            .map(|h| self.text_weight(h.count))
            .sum();
        let binary = hits.patterns.iter().filter(|h| !h.is_empty()).count() as f32
            * def.binary_weight();
        (text + binary).clamp(0.0, 1.0)
    }

    /// Diversity bonus for `distinct` matched signatures.
    pub fn diversity_bonus(&self, distinct: u32) -> f32 {
        if distinct > self.config.diversity_floor {
            self.config.diversity_step * (distinct - self.config.diversity_floor) as f32
        } else {
            0.0
        }
    }

    /// Scores one profile against precomputed catalog hits.
    pub fn score_profile(&self, profile: &PlatformProfile, hits: &CatalogHits) -> CandidateScore {
        let defs = catalog::definitions();
        let mut evidence = Vec::new();
        let mut distinct = 0u32;

        for idx in catalog::profile_signature_indices(profile) {
            let Some(sig_hits) = hits.get(idx) else {
                continue;
            };
            let ev = self.signature_evidence(&defs[idx], sig_hits, true);
            if !ev.is_empty() {
                distinct += 1;
                evidence.extend(ev);
            }
        }

        let raw: f32 = evidence.iter().map(|e| e.weight).sum::<f32>() + self.diversity_bonus(distinct);
        evidence.sort_by(Evidence::canonical_cmp);

        CandidateScore {
            platform: profile.name.to_string(),
            confidence: raw.clamp(0.0, 1.0),
            distinct_signatures: distinct,
            evidence,
        }
    }

    /// Scores `profile` against a sample's prefix window and file name.
    pub fn score(&self, sample: &Sample, profile: &PlatformProfile) -> CandidateScore {
        let hits = CatalogScanner::global().scan_with_filename(sample.prefix(), sample.file_name());
        self.score_profile(profile, &hits)
    }

    /// Scores every profile in parallel and ranks best first. Ties keep
    /// catalog order.
    pub fn rank(&self, profiles: &[PlatformProfile], hits: &CatalogHits) -> Vec<CandidateScore> {
        let mut scores: Vec<CandidateScore> = profiles
            .par_iter()
            .map(|p| self.score_profile(p, hits))
            .collect();
        scores.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        debug!(
            candidates = scores.len(),
            top = scores.first().map(|s| s.platform.as_str()).unwrap_or(""),
            "Ranked candidates"
        );
        scores
    }

    /// Whether a candidate clears the detection threshold.
    pub fn is_detected(&self, candidate: &CandidateScore) -> bool {
        candidate.confidence > self.config.detection_threshold
    }
}
