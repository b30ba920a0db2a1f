//! # Boot Memory Map
//!
//! Consolidation of the firmware memory map inside the loader, before any
//! allocator exists.
//!
//! Firmware reports physical memory as an unordered list of descriptors that
//! may overlap, repeat, or nest. This crate rewrites that list in place into
//! the form the kernel expects:
//!
//! ```text
//!   firmware                         consolidated
//!   ┌──────────────────────────┐     ┌──────┬────┬───────────────┐
//!   │ Usable RAM               │     │ RAM  │ KI │ RAM           │
//!   └──────────────────────────┘  →  └──────┴────┴───────────────┘
//!          ┌────┐                    ascending, disjoint, and no two
//!          │ KI │                    touching regions of one type
//!          └────┘
//! ```
//!
//! Where descriptors overlap, the shared bytes take the most restrictive of
//! their types (see [`MemoryType::combine`](boot_info::memory::MemoryType::combine)).
//!
//! ## Components
//!
//! * [`RegionOrder`]: the sort order (base ascending, then biggest first).
//! * [`locate_scratch`]: picks working storage out of usable RAM the map
//!   itself describes, since there is no heap.
//! * [`consolidate`]: the split and merge passes.
//! * [`PhysWindow`]: how physical memory is reached. [`IdentityWindow`] on
//!   the target, [`SlabWindow`] for host-side tests.
//! * [`MemoryMap`]: the map as the loader holds it.
//!
//! ## Example
//!
//! ```rust
//! use boot_info::memory::{MemoryRegion, MemoryType};
//! use boot_mmap::{MemoryMap, SlabWindow};
//!
//! // 1 MiB of simulated physical memory.
//! let mut physical = vec![MemoryRegion::EMPTY; (1 << 20) / 24];
//! let mut entries = [
//!     MemoryRegion::new(0, 0x80000, MemoryType::UsableRam),
//!     MemoryRegion::new(0x10000, 0x1000, MemoryType::Reserved),
//!     MemoryRegion::EMPTY,
//! ];
//!
//! let mut map = MemoryMap::new(SlabWindow::new(&mut physical));
//! map.initialize(&mut entries, 2).unwrap();
//!
//! assert_eq!(map.len(), 3);
//! assert_eq!(map.get(1).unwrap().region_type, MemoryType::Reserved);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod consolidate;
mod error;
mod handoff;
mod map;
mod order;
mod scratch;
mod window;

pub use consolidate::{consolidate, consolidate_with_scratch};
pub use error::MemoryMapError;
pub use handoff::regions_from_boot_info;
pub use map::MemoryMap;
pub use order::{RegionOrder, sort_regions};
pub use scratch::{ScratchSpan, locate_scratch, scratch_bytes, scratch_slots};
pub use window::{IdentityWindow, PhysWindow, SlabWindow, fits_pointer_width};
