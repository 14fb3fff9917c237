//! The process-wide, read-only signature catalog.
//!
//! Both tables are `'static` data. The only lazily built state is the
//! name-to-index map, which is derived once and never mutated, so the
//! catalog is safe for unsynchronized concurrent reads.

pub mod profiles;
pub mod signatures;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::core::platform::PlatformProfile;
use crate::core::signature::SignatureDefinition;

static DEFINITION_INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    signatures::DEFINITIONS
        .iter()
        .enumerate()
        .map(|(i, d)| (d.name, i))
        .collect()
});

/// Every signature definition, in catalog order.
pub fn definitions() -> &'static [SignatureDefinition] {
    signatures::DEFINITIONS
}

/// Every platform profile, in catalog order.
pub fn profiles() -> &'static [PlatformProfile] {
    profiles::PROFILES
}

/// Index of a definition within [`definitions`].
pub fn definition_index(name: &str) -> Option<usize> {
    DEFINITION_INDEX.get(name).copied()
}

pub fn find_definition(name: &str) -> Option<&'static SignatureDefinition> {
    definition_index(name).map(|i| &signatures::DEFINITIONS[i])
}

/// Case-insensitive profile lookup.
pub fn find_profile(name: &str) -> Option<&'static PlatformProfile> {
    profiles::PROFILES
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

/// Definition indices used by `profile`, in the profile's listed order.
/// Names missing from the catalog are skipped.
pub fn profile_signature_indices(profile: &PlatformProfile) -> Vec<usize> {
    profile
        .signatures
        .iter()
        .filter_map(|name| definition_index(name))
        .collect()
}
