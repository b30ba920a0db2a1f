//! # Boot Loader Interface Types
//!
//! This crate defines the data structures shared between the boot-method
//! specific loader stub (real-mode code that talks to the firmware) and the
//! loader proper. It is the single source of truth for the layout of memory
//! map descriptors and for the handoff record the stub fills in before
//! jumping into the loader.
//!
//! ## Modules
//!
//! ### Memory Descriptors ([`memory`])
//! * **[`MemoryType`](memory::MemoryType)**: The closed classification of a
//!   physical memory region, including the precedence rule used when two
//!   regions overlap.
//! * **[`MemoryRegion`](memory::MemoryRegion)**: A `(base, size, type)` record
//!   as reported by the firmware (e.g. INT 15h, E820h) or added by the stub.
//! * **Layout constants**: Descriptor size and scratch requirements, checked
//!   at compile time.
//!
//! ### Boot Handoff ([`boot`])
//! * **[`BootInfo`](boot::BootInfo)**: What the stub passes to the loader.
//! * **[`BootMemoryMap`](boot::BootMemoryMap)**: The raw descriptor array,
//!   its count, and the spare capacity available for splitting entries.
//!
//! ## Physical Memory Layout
//!
//! A typical map reported on a small PC looks like this before it is
//! consolidated:
//!
//! ```text
//! 0x0000_0000 ┌─────────────────────────────────┐
//!             │  Conventional memory (RAM)      │ ← IVT, stub code + stack
//!             │                                 │   reported again as
//! 0x0009_F000 ├─────────────────────────────────┤   "usable after boot"
//!             │  EBDA / VGA / ROM (Reserved)    │
//! 0x0010_0000 ├─────────────────────────────────┤
//!             │  Extended memory (RAM)          │ ← loader image overlaid
//!             │                                 │
//!             ├─────────────────────────────────┤
//!             │  ACPI tables (Reclaimable)      │
//!             └─────────────────────────────────┘
//! ```
//!
//! Entries are unordered and may overlap. The loader turns them into a
//! sorted, non-overlapping map before anything else touches memory.
//!
//! ## ABI Compatibility
//!
//! * **`#[repr(C)]`** records with fixed-size integers.
//! * Physical addresses are plain `u64` values, never pointers, so the same
//!   types work in a 32-bit loader, a 64-bit kernel, and host-side tests.
//! * **No Unsafe Code**: Marked `#![deny(unsafe_code)]`.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod boot;
pub mod memory;
