//! # Memory Map Descriptors

use core::fmt;

/// Classifies a region of physical memory.
///
/// Values `1..=5` are the legacy codes of the PC BIOS "query system address
/// map" service (INT 15h, E820h). Values from `128` are loader-defined.
///
/// When two regions overlap, [`MemoryType::combine`] decides the type of the
/// shared bytes: [`UsableRam`](MemoryType::UsableRam) always yields, otherwise
/// the lower ordinal wins.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum MemoryType {
    /// Unclassified memory. Outranks every other type.
    #[default]
    Unknown = 0,
    /// General purpose RAM.
    UsableRam = 1,
    /// Memory reserved by the platform (ROM, MMIO holes, ...).
    Reserved = 2,
    /// ACPI tables; reclaimable once they were parsed.
    AcpiReclaimable = 3,
    /// ACPI non-volatile storage; must be preserved.
    AcpiNvs = 4,
    /// Memory the firmware detected as defective.
    BadMemory = 5,
    /// Used by the boot process, RAM again once the kernel runs.
    UsableAfterBoot = 128,
    /// Holds the kernel image.
    KernelImage = 129,
    /// Holds a boot driver image.
    DriverImage = 130,
}

impl MemoryType {
    /// Decode a raw type byte. Unrecognised values are [`MemoryType::Unknown`].
    #[must_use]
    pub const fn from_raw(value: u8) -> Self {
        match value {
            1 => Self::UsableRam,
            2 => Self::Reserved,
            3 => Self::AcpiReclaimable,
            4 => Self::AcpiNvs,
            5 => Self::BadMemory,
            128 => Self::UsableAfterBoot,
            129 => Self::KernelImage,
            130 => Self::DriverImage,
            _ => Self::Unknown,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    #[inline]
    #[must_use]
    pub const fn is_usable_ram(self) -> bool {
        matches!(self, Self::UsableRam)
    }

    /// The type of bytes covered by both a `self` region and an `other` region.
    ///
    /// The result does not depend on argument order and combining a type
    /// with itself is a no-op, so any number of overlapping regions can be
    /// folded in any order.
    ///
    /// ```
    /// # use boot_info::memory::MemoryType;
    /// assert_eq!(MemoryType::UsableRam.combine(MemoryType::KernelImage), MemoryType::KernelImage);
    /// assert_eq!(MemoryType::AcpiNvs.combine(MemoryType::Reserved), MemoryType::Reserved);
    /// ```
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        if self.as_raw() == other.as_raw() || other.is_usable_ram() {
            self
        } else if self.is_usable_ram() || other.as_raw() < self.as_raw() {
            other
        } else {
            self
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::UsableRam => "Usable RAM",
            Self::Reserved => "Reserved",
            Self::AcpiReclaimable => "ACPI Reclaimable",
            Self::AcpiNvs => "ACPI NVS",
            Self::BadMemory => "Bad Memory",
            Self::UsableAfterBoot => "Usable After Boot",
            Self::KernelImage => "Kernel Image",
            Self::DriverImage => "Driver Image",
        }
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run of bytes in the physical memory map.
///
/// A region with `size == 0` is a placeholder slot: spare capacity at the
/// end of the map array, ignored by everything that walks the map.
#[repr(C)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct MemoryRegion {
    /// Physical base address of the region.
    pub base_address: u64,

    /// Length of the region in **bytes**.
    pub size: u64,

    /// Classification of the region.
    pub region_type: MemoryType,
}

impl MemoryRegion {
    /// An unused placeholder slot.
    pub const EMPTY: Self = Self::new(0, 0, MemoryType::Unknown);

    #[inline]
    #[must_use]
    pub const fn new(base_address: u64, size: u64, region_type: MemoryType) -> Self {
        Self {
            base_address,
            size,
            region_type,
        }
    }

    /// One past the last byte of the region, clamped to `u64::MAX`.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.base_address.saturating_add(self.size)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    #[must_use]
    pub const fn contains(&self, addr: u64) -> bool {
        addr >= self.base_address && addr - self.base_address < self.size
    }
}

impl fmt::Debug for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MemoryRegion(0x{:016X}+0x{:X}, {:?})",
            self.base_address, self.size, self.region_type
        )
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[0x{:016X}, 0x{:016X}) {}",
            self.base_address,
            self.end(),
            self.region_type
        )
    }
}

/// Size of one descriptor in bytes, as laid out in the map array.
pub const MEMORY_REGION_SIZE: usize = size_of::<MemoryRegion>();

/// Alignment a descriptor array needs in memory.
pub const MEMORY_REGION_ALIGN: usize = align_of::<MemoryRegion>();

/// Scratch slots needed per input descriptor while consolidating the map.
///
/// Every input adds at most two entries to the working copy (a split-off
/// prefix and a residual tail), and the first adds one.
pub const SCRATCH_SLOTS_PER_REGION: usize = 2;

/// Descriptor slots the loader stub reserves for the map, including the
/// spare room consolidation splits into.
pub const MAX_BOOT_REGIONS: u16 = 128;

const _: () = {
    assert!(MEMORY_REGION_SIZE == 24);
    assert!(MEMORY_REGION_ALIGN == 8);
    assert!(MEMORY_REGION_SIZE.is_multiple_of(MEMORY_REGION_ALIGN));
};
