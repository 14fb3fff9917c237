//! Pattern search over bounded buffers.
//!
//! Two layers: primitive single-pattern searches (`find_all`,
//! `find_all_text`) and a [`CatalogScanner`] that compiles every catalog
//! token into one case-insensitive automaton and every byte pattern into a
//! second, so the whole catalog costs one pass per automaton.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use memchr::memmem;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::core::signature::SignatureDefinition;
use crate::engine::catalog;
use crate::error::{FwError, Result};

/// Offsets kept per token or pattern; occurrences beyond this are only counted.
pub const MAX_OFFSETS_PER_MATCH: usize = 64;

/// Every offset at which `pattern` occurs in `buffer`, overlapping included.
///
/// An empty pattern or one longer than the buffer yields no matches.
pub fn find_all(buffer: &[u8], pattern: &[u8]) -> Vec<usize> {
    if pattern.is_empty() || pattern.len() > buffer.len() {
        return Vec::new();
    }
    let finder = memmem::Finder::new(pattern);
    let mut out = Vec::new();
    let mut pos = 0;
    while pos + pattern.len() <= buffer.len() {
        match finder.find(&buffer[pos..]) {
            Some(i) => {
                out.push(pos + i);
                pos += i + 1;
            }
            None => break,
        }
    }
    out
}

/// Every offset at which the ASCII `token` occurs, optionally ignoring case.
pub fn find_all_text(buffer: &[u8], token: &str, case_insensitive: bool) -> Vec<usize> {
    let needle = token.as_bytes();
    if !case_insensitive {
        return find_all(buffer, needle);
    }
    if needle.is_empty() || needle.len() > buffer.len() {
        return Vec::new();
    }
    buffer
        .windows(needle.len())
        .enumerate()
        .filter(|(_, w)| w.eq_ignore_ascii_case(needle))
        .map(|(i, _)| i)
        .collect()
}

/// Printable label for a byte pattern: the text itself when it is plain
/// ASCII, hex otherwise.
pub fn printable(pattern: &[u8]) -> String {
    if !pattern.is_empty() && pattern.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        String::from_utf8_lossy(pattern).into_owned()
    } else {
        hex::encode(pattern)
    }
}

/// Occurrences of one token or pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hit {
    /// Ascending, capped at [`MAX_OFFSETS_PER_MATCH`].
    pub offsets: Vec<u64>,
    pub count: u32,
}

impl Hit {
    fn record(&mut self, offset: usize) {
        self.count = self.count.saturating_add(1);
        if self.offsets.len() < MAX_OFFSETS_PER_MATCH {
            self.offsets.push(offset as u64);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn first(&self) -> Option<u64> {
        self.offsets.first().copied()
    }
}

/// Hits for one signature; vectors run parallel to the definition's
/// `tokens` and `patterns`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureHits {
    pub tokens: Vec<Hit>,
    pub patterns: Vec<Hit>,
    /// Index of the first token found in the sample's file name.
    pub filename_token: Option<usize>,
}

impl SignatureHits {
    fn for_definition(def: &SignatureDefinition) -> Self {
        Self {
            tokens: vec![Hit::default(); def.tokens.len()],
            patterns: vec![Hit::default(); def.patterns.len()],
            filename_token: None,
        }
    }

    pub fn has_text(&self) -> bool {
        self.tokens.iter().any(|h| !h.is_empty())
    }

    pub fn has_binary(&self) -> bool {
        self.patterns.iter().any(|h| !h.is_empty())
    }

    pub fn matched(&self) -> bool {
        self.has_text() || self.has_binary() || self.filename_token.is_some()
    }

    pub fn first_binary_offset(&self) -> Option<u64> {
        self.patterns.iter().filter_map(Hit::first).min()
    }

    pub fn first_text_offset(&self) -> Option<u64> {
        self.tokens.iter().filter_map(Hit::first).min()
    }
}

/// Result of scanning one buffer against the whole catalog. Indexed in
/// catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogHits {
    pub signatures: Vec<SignatureHits>,
}

impl CatalogHits {
    pub fn get(&self, index: usize) -> Option<&SignatureHits> {
        self.signatures.get(index)
    }

    /// Number of catalog signatures with any kind of match.
    pub fn distinct_matched(&self) -> usize {
        self.signatures.iter().filter(|s| s.matched()).count()
    }
}

/// Compiled multi-pattern matcher over a set of definitions.
pub struct CatalogScanner {
    definitions: &'static [SignatureDefinition],
    text: AhoCorasick,
    // Automaton pattern id -> every (signature, token) sharing that token.
    text_targets: Vec<Vec<(usize, usize)>>,
    binary: AhoCorasick,
    binary_targets: Vec<Vec<(usize, usize)>>,
}

impl std::fmt::Debug for CatalogScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogScanner")
            .field("definitions", &self.definitions.len())
            .field("text_patterns", &self.text_targets.len())
            .field("binary_patterns", &self.binary_targets.len())
            .finish()
    }
}

static GLOBAL: Lazy<CatalogScanner> = Lazy::new(|| {
    CatalogScanner::new(catalog::definitions()).expect("built-in catalog patterns compile")
});

impl CatalogScanner {
    /// Compiles `definitions`. Tokens are deduplicated case-insensitively.
    pub fn new(definitions: &'static [SignatureDefinition]) -> Result<Self> {
        let mut text_ids: HashMap<String, usize> = HashMap::new();
        let mut text_patterns: Vec<String> = Vec::new();
        let mut text_targets: Vec<Vec<(usize, usize)>> = Vec::new();
        let mut binary_ids: HashMap<&'static [u8], usize> = HashMap::new();
        let mut binary_patterns: Vec<&'static [u8]> = Vec::new();
        let mut binary_targets: Vec<Vec<(usize, usize)>> = Vec::new();

        for (si, def) in definitions.iter().enumerate() {
            for (ti, token) in def.tokens.iter().enumerate() {
                let key = token.to_ascii_lowercase();
                let id = *text_ids.entry(key.clone()).or_insert_with(|| {
                    text_patterns.push(key);
                    text_targets.push(Vec::new());
                    text_patterns.len() - 1
                });
                text_targets[id].push((si, ti));
            }
            for (pi, pattern) in def.patterns.iter().enumerate() {
                let id = *binary_ids.entry(*pattern).or_insert_with(|| {
                    binary_patterns.push(*pattern);
                    binary_targets.push(Vec::new());
                    binary_patterns.len() - 1
                });
                binary_targets[id].push((si, pi));
            }
        }

        let text = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .ascii_case_insensitive(true)
            .build(&text_patterns)
            .map_err(|e| FwError::InvalidInput(format!("text token automaton: {e}")))?;
        let binary = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .build(&binary_patterns)
            .map_err(|e| FwError::InvalidInput(format!("binary pattern automaton: {e}")))?;

        debug!(
            signatures = definitions.len(),
            text_patterns = text_targets.len(),
            binary_patterns = binary_targets.len(),
            "Compiled catalog scanner"
        );

        Ok(Self {
            definitions,
            text,
            text_targets,
            binary,
            binary_targets,
        })
    }

    /// Shared scanner over the built-in catalog.
    pub fn global() -> &'static CatalogScanner {
        &GLOBAL
    }

    pub fn definitions(&self) -> &'static [SignatureDefinition] {
        self.definitions
    }

    fn empty_hits(&self) -> CatalogHits {
        CatalogHits {
            signatures: self
                .definitions
                .iter()
                .map(SignatureHits::for_definition)
                .collect(),
        }
    }

    /// Scans `buffer` once per automaton.
    pub fn scan(&self, buffer: &[u8]) -> CatalogHits {
        let mut hits = self.empty_hits();

        for m in self.text.find_overlapping_iter(buffer) {
            for &(si, ti) in &self.text_targets[m.pattern().as_usize()] {
                hits.signatures[si].tokens[ti].record(m.start());
            }
        }
        for m in self.binary.find_overlapping_iter(buffer) {
            for &(si, pi) in &self.binary_targets[m.pattern().as_usize()] {
                hits.signatures[si].patterns[pi].record(m.start());
            }
        }

        trace!(
            len = buffer.len(),
            matched = hits.distinct_matched(),
            "Catalog scan complete"
        );
        hits
    }

    /// Scans `buffer` and records which signatures' tokens occur in `file_name`.
    pub fn scan_with_filename(&self, buffer: &[u8], file_name: &str) -> CatalogHits {
        let mut hits = self.scan(buffer);
        for (si, ti) in self.filename_tokens(file_name) {
            let slot = &mut hits.signatures[si].filename_token;
            if slot.map_or(true, |cur| ti < cur) {
                *slot = Some(ti);
            }
        }
        hits
    }

    /// Catalog indices of signatures with a token occurring in `file_name`.
    pub fn match_filename(&self, file_name: &str) -> Vec<usize> {
        let mut out: Vec<usize> = self.filename_tokens(file_name).map(|(si, _)| si).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    fn filename_tokens<'a>(&'a self, file_name: &'a str) -> impl Iterator<Item = (usize, usize)> + 'a {
        self.text
            .find_overlapping_iter(file_name.as_bytes())
            .flat_map(move |m| self.text_targets[m.pattern().as_usize()].iter().copied())
    }
}
