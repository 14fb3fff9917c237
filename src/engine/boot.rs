//! Boot sequence synthesis.

use crate::core::region::{BootStep, DetectedRegion, RegionCategory};

pub const NO_BOOT_SEQUENCE: &str = "no boot sequence inferable";

/// Orders detected regions into a boot plan: one step per present category,
/// in boot priority order, using the lowest-offset region of each category.
pub fn synthesize(regions: &[DetectedRegion]) -> Vec<BootStep> {
    let mut steps = Vec::new();
    for category in RegionCategory::ALL {
        let Some(region) = regions
            .iter()
            .filter(|r| r.category == category)
            .min_by_key(|r| r.offset)
        else {
            continue;
        };
        let order = steps.len() as u32 + 1;
        steps.push(BootStep {
            order,
            category: Some(category),
            offset: Some(region.offset),
            actions: category.setup_tags().iter().map(|s| s.to_string()).collect(),
            description: format!(
                "{order}. {category} at 0x{:08x}: {}",
                region.offset,
                category.boot_actions()
            ),
        });
    }

    if steps.is_empty() {
        steps.push(BootStep {
            order: 1,
            category: None,
            offset: None,
            actions: Vec::new(),
            description: NO_BOOT_SEQUENCE.to_string(),
        });
    }
    steps
}
