use fwprobe::core::partition::PartitionScheme;
use fwprobe::engine::partition::decode_partitions;
use fwprobe::io::Sample;
use fwprobe::{Analyzer, IssueKind};

use crate::common::{mbr_sector, no_extract, open, write_image, MbrSlot};

#[test]
fn synthetic_mbr_decodes_linux_partition() {
    let sector = mbr_sector(&[MbrSlot {
        kind: 0x83,
        lba_start: 2048,
        sectors: 204_800,
        bootable: false,
    }]);
    let sample = Sample::from_bytes("disk.img", sector, 4096);
    let parts = decode_partitions(&sample);

    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].scheme, PartitionScheme::Mbr);
    assert_eq!(parts[0].number, 1);
    assert_eq!(parts[0].offset, 1_048_576);
    assert_eq!(parts[0].length, 104_857_600);
    assert_eq!(parts[0].type_name, "Linux");
}

#[test]
fn out_of_bounds_entries_are_dropped_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let mut data = vec![0u8; 2 * 1024 * 1024];
    let sector = mbr_sector(&[
        MbrSlot {
            kind: 0x0C,
            lba_start: 2048,
            sectors: 2048,
            bootable: true,
        },
        MbrSlot {
            kind: 0x83,
            lba_start: 4096,
            sectors: 100,
            bootable: false,
        },
    ]);
    data[..512].copy_from_slice(&sector);
    data[1024 * 1024..1024 * 1024 + 4].copy_from_slice(b"FAT!");
    let path = write_image(dir.path(), "disk.img", &data);

    let result = Analyzer::default()
        .analyze_with(&path, &no_extract())
        .unwrap();

    assert_eq!(result.partitions.len(), 1);
    let p = &result.partitions[0];
    assert_eq!(p.offset, 1024 * 1024);
    assert!(p.bootable);
    assert_eq!(&p.first_sector[..4], b"FAT!");

    let malformed: Vec<_> = result
        .warnings
        .iter()
        .filter(|w| w.kind == IssueKind::MalformedStructure)
        .collect();
    assert_eq!(malformed.len(), 1);
    assert!(malformed[0]
        .message
        .starts_with("Malformed structure: partition 2"));
}

#[test]
fn image_without_boot_signature_has_no_partitions() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(dir.path(), "blob.bin", &[0xFFu8; 4096]);
    assert!(decode_partitions(&open(&path)).is_empty());
}
