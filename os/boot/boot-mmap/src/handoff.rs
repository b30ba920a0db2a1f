//! Adopting the descriptor array named by the boot information block.

use boot_info::boot::BootMemoryMap;
use boot_info::memory::{MemoryRegion, MemoryType};

/// Turn the memory map header of the boot information block into the
/// descriptor slice and the number of valid entries in it.
///
/// The slice covers the whole capacity, so consolidation can use the spare
/// slots. The type byte of every slot is read raw and replaced by its
/// [sanitized](MemoryType::from_raw) value first, so firmware type codes this
/// crate does not know never materialize as [`MemoryType`] values.
///
/// A null array, or one above the native pointer width, yields an empty
/// slice.
///
/// # Safety
/// - `regions_ptr` must be the address of `capacity` writable, 8-byte aligned
///   24-byte descriptors that stay valid for `'a`.
/// - Nothing else may access the array while the returned slice is alive.
#[must_use]
pub unsafe fn regions_from_boot_info<'a>(
    map: &BootMemoryMap,
) -> (&'a mut [MemoryRegion], usize) {
    let addr = match usize::try_from(map.regions_ptr) {
        Ok(addr) if !map.is_null() => addr,
        _ => return (&mut [], 0),
    };

    let capacity = usize::from(map.capacity);
    let base = core::ptr::with_exposed_provenance_mut::<MemoryRegion>(addr);

    for i in 0..capacity {
        // SAFETY: the caller guarantees `capacity` valid slots at `base`. The
        // type field is only touched through a byte pointer until it holds a
        // known discriminant.
        unsafe {
            let slot = base.add(i);
            let ty = (&raw mut (*slot).region_type).cast::<u8>();
            ty.write(MemoryType::from_raw(ty.read()).as_raw());
        }
    }

    // SAFETY: every slot now holds a valid `MemoryRegion`; validity of the
    // range is on the caller.
    let regions = unsafe { core::slice::from_raw_parts_mut(base, capacity) };
    (regions, map.valid_count())
}
