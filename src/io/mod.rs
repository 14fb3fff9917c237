//! Bounded, read-only access to firmware images.
//!
//! A [`Sample`] is the single view every pipeline stage reads from. It
//! memory-maps the image so multi-gigabyte files cost no heap, exposes a
//! bounded prefix window for signature scanning, and clips every ranged read
//! to the file bounds so malformed offsets can never index past the end.

pub mod error;

use crate::io::error::{IoError, Result};
use bytes::Bytes;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default prefix window used for signature scanning (4MB).
pub const DEFAULT_WINDOW_SIZE: u64 = 4 * 1024 * 1024;

/// Maximum size read for content sniffing of artifacts (4KB).
pub const MAX_SNIFF_SIZE: u64 = 4096;

/// Defines the resource limits for opening a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IOLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
    /// Bytes from the start of the file exposed through [`Sample::prefix`].
    pub window_size: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_file_size: u64::MAX,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

enum Backing {
    // None when the file size is zero; memmap cannot map empty files.
    Mapped(Option<Mmap>),
    Memory(Bytes),
}

impl Backing {
    fn bytes(&self) -> &[u8] {
        match self {
            Backing::Mapped(Some(map)) => map,
            Backing::Mapped(None) => &[],
            Backing::Memory(b) => b,
        }
    }
}

/// Immutable view of one firmware image for the lifetime of an analysis.
pub struct Sample {
    path: Option<PathBuf>,
    name: String,
    backing: Backing,
    window: usize,
}

impl std::fmt::Debug for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sample")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("len", &self.len())
            .field("window", &self.window)
            .finish()
    }
}

impl Sample {
    /// Opens a file and memory-maps it read-only.
    ///
    /// Fails with `IoError::FileTooLarge` when the file exceeds
    /// `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: &IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            window = limits.window_size,
            "Opening firmware sample"
        );

        if file_size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "File is too large"
            );
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }

        let map = if file_size == 0 {
            None
        } else {
            // Safety: read-only map of a regular file; the sample never writes through it.
            Some(unsafe { Mmap::map(&file)? })
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path: Some(path.to_path_buf()),
            name,
            backing: Backing::Mapped(map),
            window: usize::try_from(limits.window_size).unwrap_or(usize::MAX),
        })
    }

    /// Wraps an in-memory buffer. `name` stands in for the file name.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>, window_size: u64) -> Self {
        Self {
            path: None,
            name: name.into(),
            backing: Backing::Memory(data.into()),
            window: usize::try_from(window_size).unwrap_or(usize::MAX),
        }
    }

    /// Backing file, if the sample was opened from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// File name used for filename-derived evidence.
    pub fn file_name(&self) -> &str {
        &self.name
    }

    /// Total size of the image in bytes.
    pub fn len(&self) -> u64 {
        self.backing.bytes().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.backing.bytes().is_empty()
    }

    /// The bounded scan window at the start of the image.
    pub fn prefix(&self) -> &[u8] {
        let data = self.backing.bytes();
        &data[..data.len().min(self.window)]
    }

    /// Whether `[offset, offset + len)` lies entirely inside the image.
    pub fn contains_range(&self, offset: u64, len: u64) -> bool {
        offset
            .checked_add(len)
            .map(|end| end <= self.len())
            .unwrap_or(false)
    }

    /// Reads up to `len` bytes at `offset`, clipped to the file bounds.
    ///
    /// Returns an empty slice when `offset` is at or past the end.
    pub fn read_at(&self, offset: u64, len: u64) -> &[u8] {
        let data = self.backing.bytes();
        let start = match usize::try_from(offset) {
            Ok(s) if s < data.len() => s,
            _ => return &[],
        };
        let want = usize::try_from(len).unwrap_or(usize::MAX);
        let end = start.saturating_add(want).min(data.len());
        &data[start..end]
    }
}
