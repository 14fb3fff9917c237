//! Classic MBR partition table decoding.

use tracing::trace;

use crate::core::partition::{PartitionEntry, PartitionScheme, SECTOR_SIZE};
use crate::io::Sample;

pub const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];
pub const TABLE_OFFSET: usize = 446;
pub const ENTRY_SIZE: usize = 16;
pub const ENTRY_COUNT: usize = 4;
pub const GPT_PROTECTIVE: u8 = 0xEE;

/// Descriptive name for an MBR partition type byte.
pub fn type_name(code: u8) -> String {
    let name = match code {
        0x01 => "FAT12",
        0x04 => "FAT16 (<32M)",
        0x05 => "Extended",
        0x06 => "FAT16",
        0x07 => "NTFS/HPFS",
        0x0B => "FAT32 (CHS)",
        0x0C => "FAT32 (LBA)",
        0x0E => "FAT16 (LBA)",
        0x0F => "Extended (LBA)",
        0x82 => "Linux swap",
        0x83 => "Linux",
        0x8E => "Linux LVM",
        0xEE => "GPT protective",
        0xEF => "EFI System",
        other => return format!("Unknown(0x{other:02X})"),
    };
    name.to_string()
}

/// Raw view of one table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEntry {
    pub boot_flag: u8,
    pub type_code: u8,
    pub lba_start: u32,
    pub sector_count: u32,
}

/// Parses the four table slots of a boot sector, or `None` when the
/// boot signature is absent or the buffer is shorter than one sector.
pub fn parse_table(sector: &[u8]) -> Option<[RawEntry; ENTRY_COUNT]> {
    if sector.len() < SECTOR_SIZE as usize || sector[510..512] != BOOT_SIGNATURE {
        return None;
    }
    let mut out = [RawEntry {
        boot_flag: 0,
        type_code: 0,
        lba_start: 0,
        sector_count: 0,
    }; ENTRY_COUNT];
    for (i, slot) in out.iter_mut().enumerate() {
        let e = &sector[TABLE_OFFSET + ENTRY_SIZE * i..TABLE_OFFSET + ENTRY_SIZE * (i + 1)];
        *slot = RawEntry {
            boot_flag: e[0],
            type_code: e[4],
            lba_start: u32::from_le_bytes([e[8], e[9], e[10], e[11]]),
            sector_count: u32::from_le_bytes([e[12], e[13], e[14], e[15]]),
        };
    }
    Some(out)
}

/// Whether the sample starts with a protective MBR guarding a GPT.
pub fn is_protective(sample: &Sample) -> bool {
    parse_table(sample.read_at(0, SECTOR_SIZE))
        .map(|t| t.iter().any(|e| e.type_code == GPT_PROTECTIVE))
        .unwrap_or(false)
}

/// Decodes the MBR at the start of `sample`.
///
/// Returns an empty list when there is no boot signature. Entries with type
/// 0 or zero sectors are skipped. Entries extending past the end of the file
/// are kept; callers decide whether to trust them.
pub fn decode_mbr(sample: &Sample) -> Vec<PartitionEntry> {
    let Some(table) = parse_table(sample.read_at(0, SECTOR_SIZE)) else {
        trace!("No MBR boot signature");
        return Vec::new();
    };

    table
        .iter()
        .enumerate()
        .filter(|(_, e)| e.type_code != 0 && e.sector_count != 0)
        .map(|(i, e)| {
            let offset = u64::from(e.lba_start) * SECTOR_SIZE;
            let length = u64::from(e.sector_count) * SECTOR_SIZE;
            PartitionEntry {
                scheme: PartitionScheme::Mbr,
                number: i as u32 + 1,
                offset,
                length,
                type_code: format!("0x{:02X}", e.type_code),
                type_name: type_name(e.type_code),
                label: None,
                bootable: e.boot_flag == 0x80,
                first_sector: sample.read_at(offset, SECTOR_SIZE).to_vec(),
            }
        })
        .collect()
}
