//! Partition table entries.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Sector size used by both MBR and GPT decoding.
pub const SECTOR_SIZE: u64 = 512;

/// Table format an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionScheme {
    Mbr,
    Gpt,
}

impl fmt::Display for PartitionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionScheme::Mbr => f.write_str("mbr"),
            PartitionScheme::Gpt => f.write_str("gpt"),
        }
    }
}

/// One table-defined, sector-aligned byte range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionEntry {
    pub scheme: PartitionScheme,
    /// 1-based slot number within the table.
    pub number: u32,
    pub offset: u64,
    pub length: u64,
    /// MBR type byte, or the canonical GPT type GUID.
    pub type_code: String,
    pub type_name: String,
    /// GPT partition label; `None` for MBR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub bootable: bool,
    /// Up to one sector read at `offset`; empty when beyond the file end.
    #[serde(serialize_with = "to_hex", deserialize_with = "from_hex")]
    pub first_sector: Vec<u8>,
}

impl PartitionEntry {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }

    /// Whether the declared range fits in a file of `file_len` bytes.
    pub fn fits_within(&self, file_len: u64) -> bool {
        self.offset
            .checked_add(self.length)
            .map(|end| end <= file_len)
            .unwrap_or(false)
    }
}

fn to_hex<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(bytes))
}

fn from_hex<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
    let text = String::deserialize(d)?;
    hex::decode(text).map_err(serde::de::Error::custom)
}
