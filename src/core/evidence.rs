//! Evidence records and per-profile candidate scores.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::core::signature::SignatureCategory;

/// How a signature was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchKind {
    TextToken,
    BinaryPattern,
    Filename,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchKind::TextToken => "text",
            MatchKind::BinaryPattern => "binary",
            MatchKind::Filename => "filename",
        };
        f.write_str(s)
    }
}

/// One observed match of a signature rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub signature: String,
    pub category: SignatureCategory,
    pub kind: MatchKind,
    /// The token or pattern that matched, printable form.
    pub matched: String,
    /// Match offsets in ascending order (empty for filename matches).
    pub offsets: Vec<u64>,
    /// Total occurrences, which can exceed `offsets.len()` when capped.
    pub occurrences: u32,
    /// Score this match contributed.
    pub weight: f32,
}

impl Evidence {
    pub fn first_offset(&self) -> Option<u64> {
        self.offsets.first().copied()
    }

    /// Canonical ordering: first offset, then signature name, kind and token.
    /// Filename evidence has no offset and sorts last.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        let a = self.first_offset().unwrap_or(u64::MAX);
        let b = other.first_offset().unwrap_or(u64::MAX);
        a.cmp(&b)
            .then_with(|| self.signature.cmp(&other.signature))
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.matched.cmp(&other.matched))
    }
}

/// Score of one platform profile against one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub platform: String,
    /// Confidence in [0,1].
    pub confidence: f32,
    /// Number of distinct signatures of this profile that matched.
    pub distinct_signatures: u32,
    pub evidence: Vec<Evidence>,
}

impl CandidateScore {
    pub fn signature_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.evidence.iter().map(|e| e.signature.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
