//! # Memory Map Consolidation
//!
//! Turns an unordered, overlapping descriptor array into the canonical map:
//! sorted by base address, no two regions overlapping, and no two touching
//! regions of the same type.
//!
//! ## Passes
//!
//! 1. **Split**: walk the sorted input and build a working copy in scratch
//!    storage. Whenever a region overlaps what is already there, the working
//!    entries are split at the region's start and end, and the shared bytes
//!    take the [combined](boot_info::memory::MemoryType::combine) type.
//!    Whatever sticks out past the current end is appended.
//! 2. **Merge**: coalesce neighbours that touch and share a type, then copy
//!    the result back over the caller's array.
//!
//! ## Scratch Requirement
//!
//! The first region adds one working entry. Every later region adds at most
//! two: one for splitting the entry it starts in, and one for either
//! splitting the entry it ends in or appending its protruding tail (it
//! cannot do both). Zero-sized regions add nothing. `n` descriptors
//! therefore never need more than `2n - 1` slots, and
//! [`scratch_slots`](crate::scratch_slots) reserves `2n`.

use crate::error::MemoryMapError;
use crate::order::{RegionOrder, sort_regions};
use crate::scratch::{locate_scratch, scratch_bytes, scratch_slots};
use crate::window::PhysWindow;
use boot_collections::is_sorted_by;
use boot_info::memory::MemoryRegion;
use log::{debug, warn};

/// Consolidate the first `count` descriptors of `entries` in place, taking
/// scratch storage from usable RAM described by the map itself.
///
/// `entries` is the whole caller array; slots past `count` are spare room
/// for regions created by splitting. Returns the new descriptor count. Slots
/// between the new count and `count` are reset to [`MemoryRegion::EMPTY`].
///
/// # Errors
/// - [`MemoryMapError::CountExceedsCapacity`] if `count > entries.len()`.
/// - [`MemoryMapError::ScratchExhausted`] if no addressable usable RAM is big
///   enough for the working copy.
/// - [`MemoryMapError::ScratchUnmapped`] if `window` cannot map the span.
/// - [`MemoryMapError::OutputExceedsCapacity`] if the consolidated map does
///   not fit into `entries`.
pub fn consolidate<W>(
    entries: &mut [MemoryRegion],
    count: usize,
    window: &mut W,
) -> Result<usize, MemoryMapError>
where
    W: PhysWindow + ?Sized,
{
    check_count(entries, count)?;
    if count == 0 {
        return Ok(0);
    }

    sort_regions(&mut entries[..count]);

    let slots = scratch_slots(count);
    let required = scratch_bytes(count);
    let Some(span) = locate_scratch(&entries[..count], required, window) else {
        warn!("No addressable usable RAM can hold {required} bytes of scratch space");
        return Err(MemoryMapError::ScratchExhausted { required });
    };

    debug!(
        "Consolidating {count} regions using scratch space at 0x{:X} (0x{:X} bytes available)",
        span.base, span.size
    );

    let scratch = window
        .scratch(span.base, slots)
        .ok_or(MemoryMapError::ScratchUnmapped {
            base: span.base,
            slots,
        })?;

    consolidate_sorted(entries, count, scratch)
}

/// Like [`consolidate`], with caller-provided working storage.
///
/// `scratch` should hold [`scratch_slots(count)`](crate::scratch_slots)
/// slots; its contents are overwritten.
///
/// # Errors
/// - [`MemoryMapError::CountExceedsCapacity`] if `count > entries.len()`.
/// - [`MemoryMapError::ScratchOverflow`] if `scratch` is too small.
/// - [`MemoryMapError::OutputExceedsCapacity`] if the consolidated map does
///   not fit into `entries`.
pub fn consolidate_with_scratch(
    entries: &mut [MemoryRegion],
    count: usize,
    scratch: &mut [MemoryRegion],
) -> Result<usize, MemoryMapError> {
    check_count(entries, count)?;
    sort_regions(&mut entries[..count]);
    consolidate_sorted(entries, count, scratch)
}

const fn check_count(entries: &[MemoryRegion], count: usize) -> Result<(), MemoryMapError> {
    if count > entries.len() {
        return Err(MemoryMapError::CountExceedsCapacity {
            count,
            capacity: entries.len(),
        });
    }
    Ok(())
}

fn consolidate_sorted(
    entries: &mut [MemoryRegion],
    count: usize,
    scratch: &mut [MemoryRegion],
) -> Result<usize, MemoryMapError> {
    debug_assert!(is_sorted_by(&entries[..count], &RegionOrder));

    let split = split_overlaps(&entries[..count], scratch)?;
    let merged = merge_adjacent(&mut scratch[..split]);

    if merged > entries.len() {
        return Err(MemoryMapError::OutputExceedsCapacity {
            required: merged,
            capacity: entries.len(),
        });
    }

    entries[..merged].copy_from_slice(&scratch[..merged]);
    if merged < count {
        entries[merged..count].fill(MemoryRegion::EMPTY);
    }

    debug!("Split {count} regions into {split}, merged into {merged}");
    Ok(merged)
}

/// Ascending, non-overlapping working entries in scratch storage.
struct WorkList<'s> {
    slots: &'s mut [MemoryRegion],
    len: usize,
}

impl<'s> WorkList<'s> {
    const fn new(slots: &'s mut [MemoryRegion]) -> Self {
        Self { slots, len: 0 }
    }

    fn last(&self) -> Option<&MemoryRegion> {
        self.slots[..self.len].last()
    }

    fn push(&mut self, region: MemoryRegion) -> Result<(), MemoryMapError> {
        self.insert(self.len, region)
    }

    /// Insert `region` at `index`, moving the entries from `index` up by one.
    fn insert(&mut self, index: usize, region: MemoryRegion) -> Result<(), MemoryMapError> {
        if self.len == self.slots.len() {
            return Err(MemoryMapError::ScratchOverflow {
                slots: self.slots.len(),
            });
        }

        self.slots.copy_within(index..self.len, index + 1);
        self.slots[index] = region;
        self.len += 1;
        Ok(())
    }
}

/// Pass 1: split overlapping regions at their boundaries into `scratch`.
///
/// Returns the number of working entries written.
fn split_overlaps(
    sorted: &[MemoryRegion],
    scratch: &mut [MemoryRegion],
) -> Result<usize, MemoryMapError> {
    let mut work = WorkList::new(scratch);

    // Bounds are tracked as the last byte: the end of a region touching the
    // top of the address space is 2^64 and does not fit a `u64`.
    for region in sorted.iter().filter(|r| !r.is_empty()).map(clamp_to_top) {
        let start = region.base_address;
        let last = last_byte(&region);

        let tail_last = match work.last() {
            Some(tail) if start <= last_byte(tail) => last_byte(tail),
            _ => {
                work.push(region)?;
                continue;
            }
        };

        // Input is sorted by base, so the entries reaching into this region
        // form a contiguous run at the end of the list.
        let mut index = work.len - 1;
        while index > 0 && last_byte(&work.slots[index - 1]) >= start {
            index -= 1;
        }

        // Split off the part of the first entry in front of the region.
        let head = work.slots[index];
        if head.base_address < start {
            let prefix = start - head.base_address;
            work.slots[index].size = prefix;
            work.insert(
                index + 1,
                MemoryRegion::new(start, head.size - prefix, head.region_type),
            )?;
            index += 1;
        }

        // Resolve the shared bytes, splitting the entry the region ends in.
        while index < work.len && work.slots[index].base_address <= last {
            let entry = work.slots[index];
            let entry_last = last_byte(&entry);
            if entry_last > last {
                work.slots[index].size = last - entry.base_address + 1;
                work.insert(
                    index + 1,
                    MemoryRegion::new(last + 1, entry_last - last, entry.region_type),
                )?;
            }

            work.slots[index].region_type = entry.region_type.combine(region.region_type);
            index += 1;
        }

        // The rest of the region lies past everything seen so far.
        if last > tail_last {
            work.push(MemoryRegion::new(
                tail_last + 1,
                last - tail_last,
                region.region_type,
            ))?;
        }
    }

    Ok(work.len)
}

/// `region` with anything past the top of the address space cut off.
fn clamp_to_top(region: &MemoryRegion) -> MemoryRegion {
    let room = (u64::MAX - region.base_address).saturating_add(1);
    MemoryRegion::new(
        region.base_address,
        region.size.min(room),
        region.region_type,
    )
}

/// Address of the last byte of a non-empty region that does not wrap.
const fn last_byte(region: &MemoryRegion) -> u64 {
    region.base_address + (region.size - 1)
}

/// Pass 2: coalesce touching entries of the same type in place.
///
/// Two neighbours together spanning all 2^64 bytes stay apart, since the
/// joined size would not fit.
///
/// Returns the number of entries left at the front of `regions`.
fn merge_adjacent(regions: &mut [MemoryRegion]) -> usize {
    if regions.is_empty() {
        return 0;
    }

    let mut merged = 1;
    for i in 1..regions.len() {
        let next = regions[i];
        let prev = &mut regions[merged - 1];

        let touching = next.region_type == prev.region_type
            && prev.base_address.checked_add(prev.size) == Some(next.base_address);

        match prev.size.checked_add(next.size) {
            Some(size) if touching => prev.size = size,
            _ => {
                regions[merged] = next;
                merged += 1;
            }
        }
    }

    merged
}
