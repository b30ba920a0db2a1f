//! # Region Ordering

use boot_collections::{Comparer, sort};
use boot_info::memory::MemoryRegion;
use core::cmp::Ordering;

/// Orders regions by ascending base address; regions sharing a base address
/// are ordered biggest first.
///
/// Putting the bigger block first means every later region with the same
/// base is fully inside the one before it, which is what the scratch locator
/// and the split pass expect.
#[derive(Copy, Clone, Debug, Default)]
pub struct RegionOrder;

impl Comparer<MemoryRegion> for RegionOrder {
    #[inline]
    fn compare(&self, lhs: &MemoryRegion, rhs: &MemoryRegion) -> Ordering {
        lhs.base_address
            .cmp(&rhs.base_address)
            .then_with(|| rhs.size.cmp(&lhs.size))
    }
}

/// Sort `regions` in place by [`RegionOrder`].
#[inline]
pub fn sort_regions(regions: &mut [MemoryRegion]) {
    sort(regions, &RegionOrder);
}
