//! Content sniffing for written artifacts.
//!
//! An artifact's type comes from its own leading bytes. The firmware magic
//! table is consulted first; `infer` covers common formats it does not
//! know; anything else is `data`.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::core::artifact::ContentType;
use crate::engine::catalog::signatures as sig;
use crate::io::MAX_SNIFF_SIZE;

/// Outcome of sniffing one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sniffed {
    pub content_type: ContentType,
    pub mime: Option<String>,
    pub description: String,
}

impl Sniffed {
    fn new(content_type: ContentType, mime: Option<&str>, description: impl Into<String>) -> Self {
        Self {
            content_type,
            mime: mime.map(str::to_string),
            description: description.into(),
        }
    }
}

fn be_u32(b: &[u8], at: usize) -> Option<u32> {
    b.get(at..at + 4)
        .map(|s| u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
}

fn le_u32(b: &[u8], at: usize) -> Option<u32> {
    b.get(at..at + 4)
        .map(|s| u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
}

fn u16_at(b: &[u8], at: usize, little: bool) -> Option<u16> {
    b.get(at..at + 2).map(|s| {
        if little {
            u16::from_le_bytes([s[0], s[1]])
        } else {
            u16::from_be_bytes([s[0], s[1]])
        }
    })
}

/// ELF `e_machine` to a readable architecture name.
pub fn elf_machine_name(machine: u16) -> String {
    let name = match machine {
        0x03 => "x86",
        0x08 => "MIPS",
        0x14 => "PowerPC",
        0x15 => "PowerPC64",
        0x28 => "ARM",
        0x3E => "x86-64",
        0xB7 => "AArch64",
        0xF3 => "RISC-V",
        other => return format!("machine 0x{other:04X}"),
    };
    name.to_string()
}

fn describe_elf(data: &[u8]) -> String {
    let class = match data.get(4) {
        Some(1) => "32-bit",
        Some(2) => "64-bit",
        _ => "unknown-class",
    };
    let little = data.get(5) != Some(&2);
    let order = if little { "LSB" } else { "MSB" };
    match u16_at(data, 18, little) {
        Some(m) => format!("ELF {class} {order}, {}", elf_machine_name(m)),
        None => format!("ELF {class} {order}"),
    }
}

fn describe_squashfs(data: &[u8]) -> String {
    let little = data.starts_with(sig::SQUASHFS_LE);
    let read32 = |at| if little { le_u32(data, at) } else { be_u32(data, at) };
    let major = u16_at(data, 28, little);
    let minor = u16_at(data, 30, little);
    let endian = if little { "little endian" } else { "big endian" };
    match (major, minor, read32(4), read32(12)) {
        (Some(ma), Some(mi), Some(inodes), Some(block)) => format!(
            "SquashFS v{ma}.{mi} filesystem, {endian}, {inodes} inodes, block size {block}"
        ),
        _ => format!("SquashFS filesystem, {endian}"),
    }
}

fn describe_uimage(data: &[u8]) -> String {
    let name = data
        .get(32..64)
        .map(|raw| {
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            String::from_utf8_lossy(&raw[..end]).into_owned()
        })
        .unwrap_or_default();
    match be_u32(data, 12) {
        Some(size) => format!("uImage '{name}', {size} bytes payload"),
        None => format!("uImage '{name}'"),
    }
}

fn is_cpio(data: &[u8]) -> bool {
    data.starts_with(b"070701") || data.starts_with(b"070702") || data.starts_with(b"070707")
}

fn is_tar(data: &[u8]) -> bool {
    data.get(257..262) == Some(b"ustar".as_slice())
}

fn is_ext(data: &[u8]) -> bool {
    let at = sig::EXT_MAGIC_OFFSET as usize;
    data.get(at..at + 2) == Some(sig::EXT_MAGIC)
}

/// Identifies a buffer holding the start of an artifact.
pub fn sniff_bytes(data: &[u8]) -> Sniffed {
    use ContentType::*;

    let starts = |m: &[u8]| data.starts_with(m);

    if starts(sig::ELF_MAGIC) {
        return Sniffed::new(Elf, Some("application/x-executable"), describe_elf(data));
    }
    if starts(sig::SQUASHFS_LE) || starts(sig::SQUASHFS_BE) {
        return Sniffed::new(SquashFs, None, describe_squashfs(data));
    }
    if starts(sig::UIMAGE_MAGIC) {
        return Sniffed::new(UImage, None, describe_uimage(data));
    }
    if starts(sig::FDT_MAGIC) {
        let size = be_u32(data, 4).unwrap_or(0);
        return Sniffed::new(DeviceTree, None, format!("Flattened device tree, {size} bytes"));
    }
    if starts(sig::ANDROID_BOOT_MAGIC) {
        return Sniffed::new(AndroidBoot, None, "Android boot image");
    }
    if starts(sig::CRAMFS_LE) || starts(sig::CRAMFS_BE) {
        return Sniffed::new(CramFs, None, "CramFS filesystem");
    }
    if starts(sig::JFFS2_DIRENT_LE)
        || starts(sig::JFFS2_DIRENT_BE)
        || starts(sig::JFFS2_CLEAN_LE)
        || starts(sig::JFFS2_CLEAN_BE)
    {
        return Sniffed::new(Jffs2, None, "JFFS2 filesystem");
    }
    if starts(sig::UBI_EC_MAGIC) {
        return Sniffed::new(Ubi, None, "UBI image");
    }
    if starts(sig::UBIFS_MAGIC) {
        return Sniffed::new(UbiFs, None, "UBIFS filesystem");
    }
    if starts(sig::ROMFS_MAGIC) {
        return Sniffed::new(RomFs, None, "ROMFS filesystem");
    }
    if starts(&[0x1F, 0x8B]) {
        return Sniffed::new(Gzip, Some("application/gzip"), "gzip compressed data");
    }
    if starts(&[0xFD, b'7', b'z', b'X', b'Z', 0x00]) {
        return Sniffed::new(Xz, Some("application/x-xz"), "XZ compressed data");
    }
    if starts(b"BZh") {
        return Sniffed::new(Bzip2, Some("application/x-bzip2"), "bzip2 compressed data");
    }
    if starts(&[0x28, 0xB5, 0x2F, 0xFD]) {
        return Sniffed::new(Zstd, Some("application/zstd"), "Zstandard compressed data");
    }
    if starts(&[0x04, 0x22, 0x4D, 0x18]) {
        return Sniffed::new(Lz4, Some("application/x-lz4"), "LZ4 compressed data");
    }
    if starts(&[0x5D, 0x00, 0x00]) {
        return Sniffed::new(Lzma, Some("application/x-lzma"), "LZMA compressed data");
    }
    if starts(b"PK\x03\x04") {
        return Sniffed::new(Zip, Some("application/zip"), "Zip archive");
    }
    if starts(&[b'7', b'z', 0xBC, 0xAF, 0x27, 0x1C]) {
        return Sniffed::new(SevenZip, Some("application/x-7z-compressed"), "7-zip archive");
    }
    if is_cpio(data) {
        return Sniffed::new(Cpio, Some("application/x-cpio"), "cpio archive");
    }
    if is_tar(data) {
        return Sniffed::new(Tar, Some("application/x-tar"), "POSIX tar archive");
    }
    if starts(sig::PNG_MAGIC) {
        return Sniffed::new(Png, Some("image/png"), "PNG image");
    }
    if starts(&[0xFF, 0xD8, 0xFF]) {
        return Sniffed::new(Jpeg, Some("image/jpeg"), "JPEG image");
    }
    if starts(b"GIF87a") || starts(b"GIF89a") {
        return Sniffed::new(Gif, Some("image/gif"), "GIF image");
    }
    if is_ext(data) {
        return Sniffed::new(Ext, None, "ext2/3/4 filesystem");
    }

    if let Some(kind) = infer::get(data) {
        debug!(mime = kind.mime_type(), "Secondary sniffer matched");
        return Sniffed::new(
            Other(kind.extension().to_string()),
            Some(kind.mime_type()),
            kind.mime_type().to_string(),
        );
    }

    Sniffed::new(Data, None, "data")
}

/// Re-reads the head of a written file and sniffs it.
pub fn sniff_file(path: &Path) -> std::io::Result<Sniffed> {
    let mut buf = Vec::with_capacity(MAX_SNIFF_SIZE as usize);
    File::open(path)?
        .take(MAX_SNIFF_SIZE)
        .read_to_end(&mut buf)?;
    Ok(sniff_bytes(&buf))
}
