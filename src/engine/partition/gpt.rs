//! GUID partition table decoding.

use tracing::{debug, trace};

use crate::core::partition::{PartitionEntry, PartitionScheme, SECTOR_SIZE};
use crate::io::Sample;

pub const GPT_SIGNATURE: &[u8; 8] = b"EFI PART";
/// Entries beyond this count are ignored.
pub const MAX_ENTRIES: u32 = 128;
pub const MIN_ENTRY_SIZE: u32 = 128;
pub const MAX_ENTRY_SIZE: u32 = 512;

const KNOWN_TYPES: &[(&str, &str)] = &[
    ("C12A7328-F81F-11D2-BA4B-00A0C93EC93B", "EFI System"),
    ("EBD0A0A2-B9E5-4433-87C0-68B6B72699C7", "Microsoft basic data"),
    ("0FC63DAF-8483-4772-8E79-3D69D8477DE4", "Linux filesystem"),
    ("0657FD6D-A4AB-43C4-84E5-0933C84B4F4F", "Linux swap"),
    ("E6D6D379-F507-44C2-A23C-238F2A3DF928", "Linux LVM"),
    ("A19D880F-05FC-4D3B-A006-743F0F84911E", "Linux RAID"),
    ("21686148-6449-6E6F-744E-656564454649", "BIOS boot"),
    ("FE3A2A5D-4F32-41A7-B725-ACCC3285A309", "ChromeOS kernel"),
];

/// Header fields needed to locate the entry array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GptHeader {
    pub entries_lba: u64,
    pub entry_count: u32,
    pub entry_size: u32,
}

fn le_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn le_u64(b: &[u8], at: usize) -> u64 {
    let mut v = [0u8; 8];
    v.copy_from_slice(&b[at..at + 8]);
    u64::from_le_bytes(v)
}

/// Reads and validates the header at LBA 1.
pub fn read_header(sample: &Sample) -> Option<GptHeader> {
    let hdr = sample.read_at(SECTOR_SIZE, 92);
    if hdr.len() < 92 || &hdr[..8] != GPT_SIGNATURE {
        return None;
    }
    let header = GptHeader {
        entries_lba: le_u64(hdr, 72),
        entry_count: le_u32(hdr, 80),
        entry_size: le_u32(hdr, 84),
    };
    if !(MIN_ENTRY_SIZE..=MAX_ENTRY_SIZE).contains(&header.entry_size) {
        debug!(entry_size = header.entry_size, "GPT entry size out of range");
        return None;
    }
    Some(header)
}

/// Canonical text form of a mixed-endian GPT GUID.
pub fn format_guid(b: &[u8; 16]) -> String {
    format!(
        "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
        u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        u16::from_le_bytes([b[4], b[5]]),
        u16::from_le_bytes([b[6], b[7]]),
        b[8],
        b[9],
        b[10],
        b[11],
        b[12],
        b[13],
        b[14],
        b[15]
    )
}

pub fn type_name(guid: &str) -> String {
    KNOWN_TYPES
        .iter()
        .find(|(g, _)| *g == guid)
        .map(|(_, n)| n.to_string())
        .unwrap_or_else(|| format!("Unknown({guid})"))
}

fn decode_name(raw: &[u8]) -> Option<String> {
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .take_while(|&u| u != 0)
        .collect();
    if units.is_empty() {
        None
    } else {
        Some(String::from_utf16_lossy(&units))
    }
}

/// Decodes GPT entries, or an empty list when no valid header is present.
pub fn decode_gpt(sample: &Sample) -> Vec<PartitionEntry> {
    let Some(header) = read_header(sample) else {
        return Vec::new();
    };
    let count = header.entry_count.min(MAX_ENTRIES);
    let size = u64::from(header.entry_size);
    let Some(array_offset) = header.entries_lba.checked_mul(SECTOR_SIZE) else {
        return Vec::new();
    };
    let array = sample.read_at(array_offset, u64::from(count) * size);
    trace!(count, available = array.len(), "Decoding GPT entries");

    let mut out = Vec::new();
    for (i, raw) in array.chunks_exact(size as usize).enumerate() {
        let mut type_guid = [0u8; 16];
        type_guid.copy_from_slice(&raw[..16]);
        if type_guid == [0u8; 16] {
            continue;
        }
        let first_lba = le_u64(raw, 32);
        let last_lba = le_u64(raw, 40);
        let attributes = le_u64(raw, 48);
        if last_lba < first_lba {
            continue;
        }
        let (Some(offset), Some(length)) = (
            first_lba.checked_mul(SECTOR_SIZE),
            (last_lba - first_lba)
                .checked_add(1)
                .and_then(|n| n.checked_mul(SECTOR_SIZE)),
        ) else {
            continue;
        };
        let guid = format_guid(&type_guid);
        out.push(PartitionEntry {
            scheme: PartitionScheme::Gpt,
            number: i as u32 + 1,
            offset,
            length,
            type_name: type_name(&guid),
            type_code: guid,
            label: decode_name(&raw[56..128]),
            // Legacy BIOS bootable attribute.
            bootable: attributes & 0x4 != 0,
            first_sector: sample.read_at(offset, SECTOR_SIZE).to_vec(),
        });
    }
    out
}
