//! Extracted artifacts and the extraction summary.
//!
//! An artifact's content type is always derived from the written file's own
//! header, never from the signature that caused it to be extracted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::core::region::RegionCategory;

/// What an artifact was carved from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactSource {
    /// A detected region, identified by category and estimated offset.
    Region { category: RegionCategory, offset: u64 },
    /// A partition table entry, identified by its 1-based number.
    Partition { number: u32, offset: u64 },
    /// A slot of the platform's default layout.
    Layout {
        slot: String,
        category: RegionCategory,
        offset: u64,
    },
    /// A file produced by the external unpacker.
    Delegated { relative_path: String },
}

impl ArtifactSource {
    /// Region category the artifact belongs to, when known.
    pub fn category(&self) -> Option<RegionCategory> {
        match self {
            ArtifactSource::Region { category, .. } | ArtifactSource::Layout { category, .. } => {
                Some(*category)
            }
            _ => None,
        }
    }
}

/// Content type derived from an artifact's own bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Elf,
    Gzip,
    Xz,
    Bzip2,
    Lzma,
    Zstd,
    Lz4,
    Zip,
    SevenZip,
    Tar,
    Cpio,
    Png,
    Jpeg,
    Gif,
    SquashFs,
    CramFs,
    Jffs2,
    Ubi,
    UbiFs,
    RomFs,
    Ext,
    UImage,
    DeviceTree,
    AndroidBoot,
    /// Recognised by the secondary sniffer; carries its extension label.
    Other(String),
    /// Nothing recognised.
    Data,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentType::Elf => "elf",
            ContentType::Gzip => "gzip",
            ContentType::Xz => "xz",
            ContentType::Bzip2 => "bzip2",
            ContentType::Lzma => "lzma",
            ContentType::Zstd => "zstd",
            ContentType::Lz4 => "lz4",
            ContentType::Zip => "zip",
            ContentType::SevenZip => "7z",
            ContentType::Tar => "tar",
            ContentType::Cpio => "cpio",
            ContentType::Png => "png",
            ContentType::Jpeg => "jpeg",
            ContentType::Gif => "gif",
            ContentType::SquashFs => "squashfs",
            ContentType::CramFs => "cramfs",
            ContentType::Jffs2 => "jffs2",
            ContentType::Ubi => "ubi",
            ContentType::UbiFs => "ubifs",
            ContentType::RomFs => "romfs",
            ContentType::Ext => "ext",
            ContentType::UImage => "uimage",
            ContentType::DeviceTree => "dtb",
            ContentType::AndroidBoot => "android_boot",
            ContentType::Other(label) => return f.write_str(label),
            ContentType::Data => "data",
        };
        f.write_str(s)
    }
}

/// One file written by the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedArtifact {
    pub source: ArtifactSource,
    pub path: PathBuf,
    /// Bytes actually written; never more than the source range.
    pub size_bytes: u64,
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    pub description: String,
    /// Hex SHA-256 of the bytes written.
    pub sha256: String,
    /// False when the write was interrupted; an `.incomplete` marker sits
    /// next to the file.
    pub complete: bool,
}

/// Which strategy produced the artifact list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Extraction was not requested.
    Skipped,
    Delegated,
    BuiltIn,
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtractionStrategy::Skipped => "skipped",
            ExtractionStrategy::Delegated => "delegated",
            ExtractionStrategy::BuiltIn => "built-in",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub strategy: ExtractionStrategy,
    /// False when any artifact is partial or extraction was cancelled.
    pub complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl ExtractionSummary {
    pub fn skipped() -> Self {
        Self {
            strategy: ExtractionStrategy::Skipped,
            complete: true,
            output_dir: None,
        }
    }
}
