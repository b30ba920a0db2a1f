//! # Boot Handoff

/// Raw memory map as handed over by the loader stub.
///
/// The array lives in the stub's static storage. Only the first `count`
/// slots hold firmware descriptors; the slots up to `capacity` are spare
/// room for entries created while the map is consolidated.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct BootMemoryMap {
    /// Address of the first [`MemoryRegion`](crate::memory::MemoryRegion)
    /// slot, or 0 if the stub could not query the firmware.
    pub regions_ptr: u64,

    /// Count of descriptors the stub filled in.
    pub count: u16,

    /// Total count of descriptor slots in the array.
    pub capacity: u16,
}

impl BootMemoryMap {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.regions_ptr == 0
    }

    /// Descriptor count clamped to the array capacity.
    #[inline]
    #[must_use]
    pub fn valid_count(&self) -> usize {
        usize::from(self.count.min(self.capacity))
    }
}

/// Information the loader stub passes to the loader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct BootInfo {
    /// Unordered, possibly overlapping firmware memory map.
    pub memory_map: BootMemoryMap,

    /// Address of a NUL-terminated UTF-8 boot command, or 0 for none.
    pub boot_command: u64,
}
