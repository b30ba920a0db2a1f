//! # Scratch Space Locator
//!
//! Consolidating the map needs a working copy up to twice the size of the
//! input, and there is no heap to take it from. The only memory known to be
//! free is the usable RAM the map itself describes, so the working copy is
//! carved out of the biggest piece of it that nothing else claims.

use crate::window::{PhysWindow, SLOT_BYTES};
use boot_info::memory::{MemoryRegion, SCRATCH_SLOTS_PER_REGION};
use log::trace;

/// A physical byte range selected to hold the working copy of the map.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScratchSpan {
    /// Physical base address, on a descriptor slot boundary.
    pub base: u64,
    /// Length in bytes.
    pub size: u64,
}

/// Descriptor slots needed to consolidate `count` descriptors.
#[inline]
#[must_use]
pub const fn scratch_slots(count: usize) -> usize {
    count.saturating_mul(SCRATCH_SLOTS_PER_REGION)
}

/// Bytes needed to consolidate `count` descriptors.
#[inline]
#[must_use]
pub fn scratch_bytes(count: usize) -> u64 {
    u64::try_from(scratch_slots(count))
        .unwrap_or(u64::MAX)
        .saturating_mul(SLOT_BYTES)
}

/// Find the biggest directly addressable span of usable RAM larger than
/// `min_bytes` that no other descriptor overlaps.
///
/// `sorted` must be ordered by [`RegionOrder`](crate::RegionOrder). For each
/// usable RAM region, descriptors overlapping its start move the usable base
/// past them, and a descriptor starting inside it cuts the usable end short.
/// Zero-sized placeholders are ignored. The span never starts at physical
/// address 0.
///
/// Returns `None` if no region qualifies.
#[must_use]
pub fn locate_scratch<W>(sorted: &[MemoryRegion], min_bytes: u64, window: &W) -> Option<ScratchSpan>
where
    W: PhysWindow + ?Sized,
{
    let mut best = ScratchSpan::default();

    for (i, region) in sorted.iter().enumerate() {
        if !region.region_type.is_usable_ram()
            || region.is_empty()
            || region.size < best.size
            || !window.is_addressable(region)
        {
            continue;
        }

        let mut usable_base = region.base_address;
        let mut usable_end = region.end();

        // Earlier regions can only overlap the start.
        for earlier in sorted[..i].iter().filter(|r| !r.is_empty()) {
            usable_base = usable_base.max(earlier.end());
        }

        for later in sorted[i + 1..].iter().filter(|r| !r.is_empty()) {
            if later.base_address >= usable_end {
                break;
            }

            if later.base_address <= usable_base {
                // Shadows the start of the span.
                usable_base = usable_base.max(later.end());
            } else {
                usable_end = later.base_address;
            }
        }

        // Physical address 0 doubles as the null pointer.
        let Some(usable_base) = usable_base.max(1).checked_next_multiple_of(SLOT_BYTES) else {
            continue;
        };

        if usable_base >= usable_end {
            continue;
        }

        let usable_size = usable_end - usable_base;
        trace!("Scratch candidate {region}: 0x{usable_base:X}+0x{usable_size:X}");

        if usable_size > best.size && usable_size > min_bytes {
            best = ScratchSpan {
                base: usable_base,
                size: usable_size,
            };
        }
    }

    (best.size > 0).then_some(best)
}
