//! Static platform profiles.

use crate::core::platform::{LayoutSlot, PlatformFamily, PlatformProfile};
use crate::core::region::RegionCategory;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

const fn slot(name: &'static str, category: RegionCategory, offset: u64, size: u64) -> LayoutSlot {
    LayoutSlot {
        name,
        category,
        offset,
        size,
    }
}

/// Ordered profile table. The generic profile comes first so that a vendor
/// profile only wins a tie-free ranking with vendor-specific evidence.
pub static PROFILES: &[PlatformProfile] = &[
    PlatformProfile {
        name: "generic-embedded-linux",
        description: "Embedded Linux image without vendor-specific markers",
        family: PlatformFamily::GenericEmbeddedLinux,
        architecture: "unknown",
        soc_family: "unknown",
        signatures: &[
            "uboot",
            "redboot",
            "barebox",
            "uimage",
            "linux_kernel",
            "device_tree",
            "squashfs",
            "cramfs",
            "jffs2",
            "ubi",
            "ubifs",
            "romfs",
            "ext",
            "busybox",
            "init_scripts",
            "uboot_env",
            "web_assets",
            "app_libs",
        ],
        setup_steps: &["generic_board", "serial_console"],
        default_layout: &[
            slot("bootloader", RegionCategory::Bootloader, 0, 256 * KIB),
            slot("kernel", RegionCategory::Kernel, 256 * KIB, 4 * MIB),
            slot("rootfs", RegionCategory::RootFs, 256 * KIB + 4 * MIB, 32 * MIB),
        ],
    },
    PlatformProfile {
        name: "rdk-b",
        description: "RDK-B broadband cable gateway",
        family: PlatformFamily::CableGateway,
        architecture: "arm",
        soc_family: "Broadcom BCM33xx",
        signatures: &[
            "rdk",
            "comcast",
            "arris",
            "technicolor",
            "broadcom",
            "cfe",
            "uboot",
            "linux_kernel",
            "squashfs",
            "jffs2",
            "nvram",
            "tr069",
            "busybox",
            "web_assets",
        ],
        setup_steps: &["docsis_stub", "nvram_emulation", "ccsp_services", "webpa_stub"],
        default_layout: &[
            slot("bootloader", RegionCategory::Bootloader, 0, 256 * KIB),
            slot("nvram", RegionCategory::Config, 256 * KIB, 64 * KIB),
            slot("kernel", RegionCategory::Kernel, 320 * KIB, 4 * MIB),
            slot("rootfs", RegionCategory::RootFs, 320 * KIB + 4 * MIB, 32 * MIB),
        ],
    },
    PlatformProfile {
        name: "rdk-v",
        description: "RDK-V video set-top box",
        family: PlatformFamily::SetTopBox,
        architecture: "arm",
        soc_family: "Broadcom BCM7xxx",
        signatures: &[
            "rdk",
            "rdk_video",
            "comcast",
            "broadcom",
            "uboot",
            "linux_kernel",
            "device_tree",
            "squashfs",
            "ubi",
            "ubifs",
            "busybox",
            "app_libs",
        ],
        setup_steps: &["video_decoder_stub", "hdmi_stub", "rdkservices"],
        default_layout: &[
            slot("bootloader", RegionCategory::Bootloader, 0, MIB),
            slot("kernel", RegionCategory::Kernel, MIB, 8 * MIB),
            slot("rootfs", RegionCategory::RootFs, 9 * MIB, 64 * MIB),
        ],
    },
    PlatformProfile {
        name: "openwrt",
        description: "OpenWrt router",
        family: PlatformFamily::Router,
        architecture: "mips",
        soc_family: "MediaTek / Qualcomm Atheros",
        signatures: &[
            "openwrt",
            "mediatek",
            "qualcomm_atheros",
            "realtek",
            "uboot",
            "uimage",
            "linux_kernel",
            "device_tree",
            "squashfs",
            "jffs2",
            "busybox",
            "init_scripts",
            "uboot_env",
            "web_assets",
        ],
        setup_steps: &["switch_stub", "wifi_stub", "procd_init"],
        default_layout: &[
            slot("u-boot", RegionCategory::Bootloader, 0, 192 * KIB),
            slot("u-boot-env", RegionCategory::Config, 192 * KIB, 64 * KIB),
            slot("kernel", RegionCategory::Kernel, 256 * KIB, 2 * MIB),
            slot("rootfs", RegionCategory::RootFs, 256 * KIB + 2 * MIB, 12 * MIB),
        ],
    },
    PlatformProfile {
        name: "dd-wrt",
        description: "DD-WRT router",
        family: PlatformFamily::Router,
        architecture: "mips",
        soc_family: "Broadcom BCM47xx",
        signatures: &[
            "ddwrt",
            "broadcom",
            "cfe",
            "nvram",
            "linux_kernel",
            "squashfs",
            "cramfs",
            "busybox",
            "web_assets",
        ],
        setup_steps: &["nvram_emulation", "switch_stub"],
        default_layout: &[
            slot("cfe", RegionCategory::Bootloader, 0, 256 * KIB),
            slot("linux", RegionCategory::Kernel, 256 * KIB, 2 * MIB),
            slot("rootfs", RegionCategory::RootFs, 256 * KIB + 2 * MIB, 6 * MIB),
            slot("nvram", RegionCategory::Config, 256 * KIB + 8 * MIB, 64 * KIB),
        ],
    },
    PlatformProfile {
        name: "hisilicon-ipcam",
        description: "HiSilicon-based IP camera",
        family: PlatformFamily::IpCamera,
        architecture: "arm",
        soc_family: "HiSilicon Hi35xx",
        signatures: &[
            "hisilicon",
            "ipcam",
            "uboot",
            "uimage",
            "linux_kernel",
            "cramfs",
            "jffs2",
            "squashfs",
            "busybox",
            "uboot_env",
            "app_libs",
            "web_assets",
        ],
        setup_steps: &["sensor_stub", "video_encoder_stub", "rtsp_service"],
        default_layout: &[
            slot("boot", RegionCategory::Bootloader, 0, 256 * KIB),
            slot("env", RegionCategory::Config, 256 * KIB, 64 * KIB),
            slot("kernel", RegionCategory::Kernel, 320 * KIB, 3 * MIB),
            slot("rootfs", RegionCategory::RootFs, 320 * KIB + 3 * MIB, 12 * MIB),
        ],
    },
    PlatformProfile {
        name: "android",
        description: "Android device image",
        family: PlatformFamily::AndroidDevice,
        architecture: "aarch64",
        soc_family: "Qualcomm / MediaTek",
        signatures: &[
            "android",
            "android_boot",
            "linux_kernel",
            "device_tree",
            "ext",
            "app_libs",
        ],
        setup_steps: &["binder_stub", "property_service", "init_rc"],
        default_layout: &[
            slot("boot", RegionCategory::Kernel, 0, 32 * MIB),
            slot("system", RegionCategory::RootFs, 32 * MIB, 512 * MIB),
        ],
    },
];
