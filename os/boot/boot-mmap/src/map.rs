//! The loader-facing memory map.

use crate::consolidate::consolidate;
use crate::error::MemoryMapError;
use crate::window::PhysWindow;
use boot_info::memory::{MemoryRegion, MemoryType};
use log::{info, warn};

/// A consolidated physical memory map borrowed from the boot information.
///
/// The map starts out empty. [`MemoryMap::initialize`] adopts the
/// descriptor array and rewrites it in place into sorted, non-overlapping
/// form.
#[derive(Debug)]
pub struct MemoryMap<'a, W> {
    regions: &'a mut [MemoryRegion],
    count: usize,
    window: W,
}

impl<'a, W: PhysWindow> MemoryMap<'a, W> {
    /// Create an empty map that reaches physical memory through `window`.
    #[must_use]
    pub fn new(window: W) -> Self {
        Self {
            regions: &mut [],
            count: 0,
            window,
        }
    }

    /// Adopt `entries` and consolidate its first `count` descriptors.
    ///
    /// On success the map exposes the consolidated regions. On failure the
    /// map stays empty and `entries` may be left sorted or partially
    /// rewritten.
    ///
    /// # Errors
    /// See [`consolidate`](crate::consolidate()).
    pub fn initialize(
        &mut self,
        entries: &'a mut [MemoryRegion],
        count: usize,
    ) -> Result<(), MemoryMapError> {
        self.count = 0;

        match consolidate(entries, count, &mut self.window) {
            Ok(merged) => {
                info!("Memory map: {count} firmware regions consolidated into {merged}");
                self.regions = entries;
                self.count = merged;
                Ok(())
            }
            Err(err) => {
                warn!("Memory map consolidation failed: {err}");
                self.regions = &mut [];
                Err(err)
            }
        }
    }

    /// Number of consolidated regions.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The consolidated regions in ascending address order.
    #[inline]
    #[must_use]
    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions[..self.count]
    }

    /// Address of the first descriptor, for handing the map on.
    #[inline]
    #[must_use]
    pub const fn as_ptr(&self) -> *const MemoryRegion {
        self.regions.as_ptr()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MemoryRegion> {
        self.regions().get(index)
    }

    /// Whether the region at `index` is reachable in the current processor
    /// mode. Out-of-range indices yield `false`.
    #[must_use]
    pub fn is_region_addressable(&self, index: usize) -> bool {
        self.get(index)
            .is_some_and(|region| self.window.is_addressable(region))
    }

    #[inline]
    #[must_use]
    pub const fn window(&self) -> &W {
        &self.window
    }

    /// Total bytes covered by regions of type `ty`.
    #[must_use]
    pub fn total_size(&self, ty: MemoryType) -> u64 {
        self.regions()
            .iter()
            .filter(|r| r.region_type == ty)
            .fold(0, |acc, r| acc.saturating_add(r.size))
    }

    /// The region containing the physical address `addr`, if any.
    #[must_use]
    pub fn find(&self, addr: u64) -> Option<&MemoryRegion> {
        let regions = self.regions();
        let after = regions.partition_point(|r| r.base_address <= addr);
        regions[..after].last().filter(|r| r.contains(addr))
    }
}
