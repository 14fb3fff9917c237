//! Static signature definitions.
//!
//! Text tokens are matched ASCII case-insensitively; byte patterns are exact.
//! Multi-byte magics are listed in both byte orders where images of either
//! endianness occur in the wild.

use crate::core::signature::{SignatureCategory, SignatureDefinition};

use SignatureCategory::*;

/// uImage legacy header magic (0x27051956, big-endian on disk).
pub const UIMAGE_MAGIC: &[u8] = &[0x27, 0x05, 0x19, 0x56];
/// Flattened device tree magic (0xd00dfeed, big-endian).
pub const FDT_MAGIC: &[u8] = &[0xD0, 0x0D, 0xFE, 0xED];
/// ARM zImage magic at header offset 0x24 (0x016f2818, little-endian).
pub const ZIMAGE_MAGIC: &[u8] = &[0x18, 0x28, 0x6F, 0x01];
pub const SQUASHFS_LE: &[u8] = b"hsqs";
pub const SQUASHFS_BE: &[u8] = b"sqsh";
pub const CRAMFS_LE: &[u8] = &[0x45, 0x3D, 0xCD, 0x28];
pub const CRAMFS_BE: &[u8] = &[0x28, 0xCD, 0x3D, 0x45];
/// JFFS2 node magic 0x1985 followed by dirent/cleanmarker node types.
pub const JFFS2_DIRENT_LE: &[u8] = &[0x85, 0x19, 0x01, 0xE0];
pub const JFFS2_DIRENT_BE: &[u8] = &[0x19, 0x85, 0xE0, 0x01];
pub const JFFS2_CLEAN_LE: &[u8] = &[0x85, 0x19, 0x03, 0x20];
pub const JFFS2_CLEAN_BE: &[u8] = &[0x19, 0x85, 0x20, 0x03];
pub const UBI_EC_MAGIC: &[u8] = b"UBI#";
pub const UBI_VID_MAGIC: &[u8] = b"UBI!";
pub const UBIFS_MAGIC: &[u8] = &[0x31, 0x18, 0x10, 0x06];
pub const ROMFS_MAGIC: &[u8] = b"-rom1fs-";
/// ext2/3/4 superblock magic, found 0x438 bytes into the filesystem.
pub const EXT_MAGIC: &[u8] = &[0x53, 0xEF];
pub const EXT_MAGIC_OFFSET: u64 = 0x438;
pub const ANDROID_BOOT_MAGIC: &[u8] = b"ANDROID!";
pub const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
pub const ELF_MAGIC: &[u8] = &[0x7F, b'E', b'L', b'F'];

/// Ordered catalog. Order is part of the detection contract: it fixes the
/// evidence tie-break and must not change between releases without a
/// schema bump.
pub static DEFINITIONS: &[SignatureDefinition] = &[
    // Bootloaders
    SignatureDefinition {
        name: "uboot",
        category: Bootloader,
        tokens: &["u-boot", "uboot"],
        patterns: &[b"U-Boot"],
        weight: 0.25,
        description: "Das U-Boot bootloader",
    },
    SignatureDefinition {
        name: "cfe",
        category: Bootloader,
        tokens: &["CFE version", "Broadcom CFE"],
        patterns: &[b"CFE1CFE1"],
        weight: 0.25,
        description: "Broadcom Common Firmware Environment",
    },
    SignatureDefinition {
        name: "redboot",
        category: Bootloader,
        tokens: &["redboot"],
        patterns: &[b"RedBoot"],
        weight: 0.25,
        description: "eCos RedBoot bootloader",
    },
    SignatureDefinition {
        name: "barebox",
        category: Bootloader,
        tokens: &["barebox"],
        patterns: &[b"barebox"],
        weight: 0.2,
        description: "Barebox bootloader",
    },
    // Kernel images
    SignatureDefinition {
        name: "uimage",
        category: Kernel,
        tokens: &["uimage"],
        patterns: &[UIMAGE_MAGIC],
        weight: 0.25,
        description: "U-Boot legacy uImage header",
    },
    SignatureDefinition {
        name: "linux_kernel",
        category: Kernel,
        tokens: &["Linux version"],
        patterns: &[ZIMAGE_MAGIC],
        weight: 0.25,
        description: "Linux kernel banner or ARM zImage header",
    },
    SignatureDefinition {
        name: "device_tree",
        category: Kernel,
        tokens: &[],
        patterns: &[FDT_MAGIC],
        weight: 0.2,
        description: "Flattened device tree blob or FIT image",
    },
    SignatureDefinition {
        name: "android_boot",
        category: Kernel,
        tokens: &["androidboot"],
        patterns: &[ANDROID_BOOT_MAGIC],
        weight: 0.3,
        description: "Android boot image",
    },
    // Filesystems
    SignatureDefinition {
        name: "squashfs",
        category: Filesystem,
        tokens: &["squashfs"],
        patterns: &[SQUASHFS_LE, SQUASHFS_BE],
        weight: 0.2,
        description: "SquashFS superblock",
    },
    SignatureDefinition {
        name: "cramfs",
        category: Filesystem,
        tokens: &["Compressed ROMFS"],
        patterns: &[CRAMFS_LE, CRAMFS_BE],
        weight: 0.2,
        description: "CramFS superblock",
    },
    SignatureDefinition {
        name: "jffs2",
        category: Filesystem,
        tokens: &["jffs2"],
        patterns: &[JFFS2_DIRENT_LE, JFFS2_DIRENT_BE, JFFS2_CLEAN_LE, JFFS2_CLEAN_BE],
        weight: 0.15,
        description: "JFFS2 node header",
    },
    SignatureDefinition {
        name: "ubi",
        category: Filesystem,
        tokens: &[],
        patterns: &[UBI_EC_MAGIC, UBI_VID_MAGIC],
        weight: 0.2,
        description: "UBI erase-counter or volume header",
    },
    SignatureDefinition {
        name: "ubifs",
        category: Filesystem,
        tokens: &["ubifs"],
        patterns: &[UBIFS_MAGIC],
        weight: 0.2,
        description: "UBIFS node header",
    },
    SignatureDefinition {
        name: "romfs",
        category: Filesystem,
        tokens: &[],
        patterns: &[ROMFS_MAGIC],
        weight: 0.2,
        description: "Linux ROMFS superblock",
    },
    SignatureDefinition {
        name: "ext",
        category: Filesystem,
        tokens: &["lost+found"],
        patterns: &[],
        weight: 0.15,
        description: "ext2/3/4 filesystem",
    },
    // Root filesystem content
    SignatureDefinition {
        name: "busybox",
        category: RootFs,
        tokens: &["BusyBox"],
        patterns: &[b"BusyBox v"],
        weight: 0.25,
        description: "BusyBox userland",
    },
    SignatureDefinition {
        name: "init_scripts",
        category: RootFs,
        tokens: &["/etc/init.d", "/etc/inittab", "/sbin/init"],
        patterns: &[],
        weight: 0.2,
        description: "SysV init layout",
    },
    // Configuration blocks
    SignatureDefinition {
        name: "nvram",
        category: Config,
        tokens: &["nvram"],
        patterns: &[b"FLSH"],
        weight: 0.2,
        description: "Broadcom NVRAM partition",
    },
    SignatureDefinition {
        name: "uboot_env",
        category: Config,
        tokens: &["bootargs=", "bootcmd="],
        patterns: &[],
        weight: 0.2,
        description: "U-Boot environment block",
    },
    SignatureDefinition {
        name: "tr069",
        category: Config,
        tokens: &["tr069", "cwmp"],
        patterns: &[],
        weight: 0.2,
        description: "TR-069 management configuration",
    },
    // Application assets
    SignatureDefinition {
        name: "web_assets",
        category: Assets,
        tokens: &["<html", ".cgi"],
        patterns: &[PNG_MAGIC, b"GIF89a"],
        weight: 0.2,
        description: "Embedded web interface",
    },
    SignatureDefinition {
        name: "app_libs",
        category: Assets,
        tokens: &["libc.so", "ld-uClibc", "libpthread.so"],
        patterns: &[ELF_MAGIC],
        weight: 0.2,
        description: "ELF binaries and shared libraries",
    },
    // Platform and vendor markers
    SignatureDefinition {
        name: "openwrt",
        category: Platform,
        tokens: &["OpenWrt"],
        patterns: &[],
        weight: 0.2,
        description: "OpenWrt distribution",
    },
    SignatureDefinition {
        name: "ddwrt",
        category: Platform,
        tokens: &["DD-WRT"],
        patterns: &[],
        weight: 0.2,
        description: "DD-WRT distribution",
    },
    SignatureDefinition {
        name: "rdk",
        category: Platform,
        tokens: &["RDK"],
        patterns: &[],
        weight: 0.2,
        description: "Reference Design Kit",
    },
    SignatureDefinition {
        name: "rdk_video",
        category: Platform,
        tokens: &["rdkv", "rdkservices"],
        patterns: &[],
        weight: 0.2,
        description: "RDK video stack",
    },
    SignatureDefinition {
        name: "comcast",
        category: Platform,
        tokens: &["Comcast", "Xfinity"],
        patterns: &[],
        weight: 0.2,
        description: "Comcast operator branding",
    },
    SignatureDefinition {
        name: "arris",
        category: Platform,
        tokens: &["ARRIS"],
        patterns: &[],
        weight: 0.2,
        description: "ARRIS vendor branding",
    },
    SignatureDefinition {
        name: "technicolor",
        category: Platform,
        tokens: &["Technicolor"],
        patterns: &[],
        weight: 0.2,
        description: "Technicolor vendor branding",
    },
    SignatureDefinition {
        name: "broadcom",
        category: Platform,
        tokens: &["Broadcom", "BCM63", "BCM3384"],
        patterns: &[],
        weight: 0.2,
        description: "Broadcom SoC",
    },
    SignatureDefinition {
        name: "mediatek",
        category: Platform,
        tokens: &["MediaTek", "Ralink"],
        patterns: &[],
        weight: 0.2,
        description: "MediaTek / Ralink SoC",
    },
    SignatureDefinition {
        name: "qualcomm_atheros",
        category: Platform,
        tokens: &["Atheros", "Qualcomm"],
        patterns: &[],
        weight: 0.2,
        description: "Qualcomm Atheros SoC",
    },
    SignatureDefinition {
        name: "realtek",
        category: Platform,
        tokens: &["Realtek"],
        patterns: &[],
        weight: 0.2,
        description: "Realtek SoC",
    },
    SignatureDefinition {
        name: "hisilicon",
        category: Platform,
        tokens: &["HiSilicon", "Hi35"],
        patterns: &[],
        weight: 0.2,
        description: "HiSilicon SoC",
    },
    SignatureDefinition {
        name: "android",
        category: Platform,
        tokens: &["ro.build.", "android"],
        patterns: &[],
        weight: 0.2,
        description: "Android build properties",
    },
    SignatureDefinition {
        name: "ipcam",
        category: Platform,
        tokens: &["onvif", "rtsp://", "ipcam"],
        patterns: &[],
        weight: 0.2,
        description: "IP camera firmware markers",
    },
];

/// Filesystem magics probed at erase-block-aligned offsets: signature
/// name, magic, and the magic's offset from the filesystem start.
pub static ALIGNED_PROBES: &[(&str, &[u8], u64)] = &[
    ("squashfs", SQUASHFS_LE, 0),
    ("squashfs", SQUASHFS_BE, 0),
    ("cramfs", CRAMFS_LE, 0),
    ("cramfs", CRAMFS_BE, 0),
    ("jffs2", JFFS2_DIRENT_LE, 0),
    ("jffs2", JFFS2_DIRENT_BE, 0),
    ("jffs2", JFFS2_CLEAN_LE, 0),
    ("jffs2", JFFS2_CLEAN_BE, 0),
    ("ubi", UBI_EC_MAGIC, 0),
    ("ubifs", UBIFS_MAGIC, 0),
    ("romfs", ROMFS_MAGIC, 0),
    ("ext", EXT_MAGIC, EXT_MAGIC_OFFSET),
];
