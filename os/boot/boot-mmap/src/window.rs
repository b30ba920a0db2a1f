//! # Physical Memory Windows
//!
//! The consolidation pass needs two things from its environment: a way to
//! tell whether a physical range can be reached at all in the current
//! processor mode, and a way to turn a physical address into working
//! storage. [`PhysWindow`] bundles both so the same code runs on the target
//! and against a simulated address space in host tests.
//!
//! * [`IdentityWindow`]: the loader's view. Physical memory is identity
//!   mapped, reachable up to the native pointer width (4 GiB in a 32-bit
//!   loader).
//! * [`SlabWindow`]: a caller-provided slab of descriptor slots standing in
//!   for physical memory `[0, slab bytes)`.

use boot_info::memory::{MEMORY_REGION_ALIGN, MEMORY_REGION_SIZE, MemoryRegion, MemoryType};
use core::ops::Range;

/// Bytes per descriptor slot, as a physical length.
pub(crate) const SLOT_BYTES: u64 = MEMORY_REGION_SIZE as u64;

/// Access to physical memory for the memory map code.
pub trait PhysWindow {
    /// Whether every byte of `region` can be referenced directly.
    fn is_addressable(&self, region: &MemoryRegion) -> bool;

    /// Borrow `slots` descriptor slots of working storage starting at the
    /// physical address `base`.
    ///
    /// Returns `None` if the range is not reachable through this window.
    /// The contents of the returned slots are unspecified.
    fn scratch(&mut self, base: u64, slots: usize) -> Option<&mut [MemoryRegion]>;
}

/// Whether the last byte of `region` is representable in `pointer_bits` bits.
///
/// The test is on the last byte, not on the exclusive end: a region ending
/// exactly at 4 GiB fits 32 bits even though its end address does not, since
/// no byte at or past 4 GiB is ever touched. Regions whose end wraps past
/// `u64::MAX` are never addressable.
///
/// ```
/// # use boot_info::memory::{MemoryRegion, MemoryType};
/// # use boot_mmap::fits_pointer_width;
/// let below_4g = MemoryRegion::new(0xFFFC_0000, 0x40000, MemoryType::Reserved);
/// let above_4g = MemoryRegion::new(0x1_0000_0000, 0x1000, MemoryType::UsableRam);
/// assert!(fits_pointer_width(&below_4g, 32));
/// assert!(!fits_pointer_width(&above_4g, 32));
/// assert!(fits_pointer_width(&above_4g, 64));
/// ```
#[must_use]
pub const fn fits_pointer_width(region: &MemoryRegion, pointer_bits: u32) -> bool {
    let limit = if pointer_bits >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << pointer_bits) - 1
    };

    if region.size == 0 {
        return region.base_address <= limit;
    }

    match region.base_address.checked_add(region.size - 1) {
        Some(last) => last <= limit,
        None => false,
    }
}

/// Physical memory seen through an identity mapping.
#[derive(Debug)]
pub struct IdentityWindow {
    _private: (),
}

impl IdentityWindow {
    /// # Safety
    /// - Physical memory must be identity mapped and writable for the whole
    ///   native address range.
    /// - Scratch ranges handed to [`PhysWindow::scratch`] must not be in use
    ///   by anything else while the returned slice is alive. The memory map
    ///   code only asks for ranges inside usable RAM that no other
    ///   descriptor claims.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl PhysWindow for IdentityWindow {
    #[inline]
    fn is_addressable(&self, region: &MemoryRegion) -> bool {
        fits_pointer_width(region, usize::BITS)
    }

    fn scratch(&mut self, base: u64, slots: usize) -> Option<&mut [MemoryRegion]> {
        let bytes = u64::try_from(slots.checked_mul(MEMORY_REGION_SIZE)?).ok()?;
        let range = MemoryRegion::new(base, bytes, MemoryType::UsableRam);
        if base == 0
            || !base.is_multiple_of(MEMORY_REGION_ALIGN as u64)
            || !self.is_addressable(&range)
        {
            return None;
        }

        let addr = usize::try_from(base).ok()?;
        let first = core::ptr::with_exposed_provenance_mut::<MemoryRegion>(addr);

        // SAFETY: The range is non-null, aligned, within the pointer width and,
        // per the constructor contract, identity mapped and unused. Every slot is
        // initialized before the slice is formed.
        unsafe {
            for i in 0..slots {
                first.add(i).write(MemoryRegion::EMPTY);
            }
            Some(core::slice::from_raw_parts_mut(first, slots))
        }
    }
}

/// A simulated physical address space backed by a borrowed slab of slots.
///
/// Physical address `a` lives in slot `a / 24`. Scratch storage can only
/// start on a slot boundary. Creating the window installs the simulated
/// space; dropping it releases the slab again.
pub struct SlabWindow<'s> {
    slab: &'s mut [MemoryRegion],
}

impl<'s> SlabWindow<'s> {
    #[must_use]
    pub const fn new(slab: &'s mut [MemoryRegion]) -> Self {
        Self { slab }
    }

    /// Size of the simulated physical memory in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.slab.len() as u64 * SLOT_BYTES
    }

    /// The simulated memory contents.
    #[must_use]
    pub fn slab(&self) -> &[MemoryRegion] {
        self.slab
    }

    /// Indices of the slots overlapping the physical range `[base, base + size)`.
    #[must_use]
    pub fn slot_range(&self, base: u64, size: u64) -> Range<usize> {
        let to_slot = |slot: u64| {
            usize::try_from(slot)
                .unwrap_or(usize::MAX)
                .min(self.slab.len())
        };
        let first = to_slot(base / SLOT_BYTES);
        let end = to_slot(base.saturating_add(size).div_ceil(SLOT_BYTES));
        first..end.max(first)
    }
}

impl PhysWindow for SlabWindow<'_> {
    fn is_addressable(&self, region: &MemoryRegion) -> bool {
        region
            .base_address
            .checked_add(region.size)
            .is_some_and(|end| end <= self.size())
    }

    fn scratch(&mut self, base: u64, slots: usize) -> Option<&mut [MemoryRegion]> {
        if !base.is_multiple_of(SLOT_BYTES) {
            return None;
        }

        let first = usize::try_from(base / SLOT_BYTES).ok()?;
        let end = first.checked_add(slots)?;
        self.slab.get_mut(first..end)
    }
}
