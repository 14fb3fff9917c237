//! Partition table decoding.
//!
//! MBR is the baseline; a protective MBR defers to the GPT behind it.

pub mod gpt;
pub mod mbr;

pub use gpt::decode_gpt;
pub use mbr::decode_mbr;

use tracing::debug;

use crate::core::partition::PartitionEntry;
use crate::io::Sample;

/// Decodes the sample's partition table, preferring GPT when the MBR is
/// protective and a valid GPT header follows.
pub fn decode_partitions(sample: &Sample) -> Vec<PartitionEntry> {
    if mbr::is_protective(sample) && gpt::read_header(sample).is_some() {
        let entries = decode_gpt(sample);
        debug!(count = entries.len(), "Decoded GPT");
        return entries;
    }
    let entries = decode_mbr(sample);
    debug!(count = entries.len(), "Decoded MBR");
    entries
}
