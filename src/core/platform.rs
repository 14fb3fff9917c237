//! Platform profiles and the detected-platform summary.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::region::RegionCategory;

/// Broad device family a profile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformFamily {
    CableGateway,
    SetTopBox,
    Router,
    IpCamera,
    AndroidDevice,
    GenericEmbeddedLinux,
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlatformFamily::CableGateway => "cable gateway",
            PlatformFamily::SetTopBox => "set-top box",
            PlatformFamily::Router => "router",
            PlatformFamily::IpCamera => "IP camera",
            PlatformFamily::AndroidDevice => "Android device",
            PlatformFamily::GenericEmbeddedLinux => "generic embedded Linux",
        };
        f.write_str(s)
    }
}

/// Named slot of a platform's typical flash layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSlot {
    pub name: &'static str,
    pub category: RegionCategory,
    pub offset: u64,
    pub size: u64,
}

/// A known platform. Catalog entries are immutable for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub family: PlatformFamily,
    pub architecture: &'static str,
    pub soc_family: &'static str,
    /// Catalog signature names used when scoring this profile.
    pub signatures: &'static [&'static str],
    /// Opaque tags for the downstream emulation stage.
    pub setup_steps: &'static [&'static str],
    pub default_layout: &'static [LayoutSlot],
}

/// Owned summary of the profile chosen for a sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedPlatform {
    pub name: String,
    pub description: String,
    pub family: PlatformFamily,
    pub architecture: String,
    pub soc_family: String,
    pub setup_steps: Vec<String>,
    /// True when the caller supplied the platform instead of detection.
    pub pinned: bool,
}

impl DetectedPlatform {
    pub fn from_profile(profile: &PlatformProfile, pinned: bool) -> Self {
        Self {
            name: profile.name.to_string(),
            description: profile.description.to_string(),
            family: profile.family,
            architecture: profile.architecture.to_string(),
            soc_family: profile.soc_family.to_string(),
            setup_steps: profile.setup_steps.iter().map(|s| s.to_string()).collect(),
            pinned,
        }
    }
}
