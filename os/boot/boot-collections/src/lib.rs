//! # Boot-Time Collection Tools
//!
//! Utilities for operating on small collections before a heap exists.
//!
//! The loader runs out of a handful of statically sized buffers: there is no
//! allocator, no unwinding, and often not much stack. Everything here works
//! in place on a caller-owned slice.
//!
//! ## Sorting ([`sort`](mod@sort))
//!
//! A stable, recursive merge sort whose merge step needs no auxiliary buffer.
//! Ordering is supplied through the [`Comparer`] capability, either as a
//! dedicated type or as any `Fn(&T, &T) -> Ordering` closure:
//!
//! ```rust
//! use boot_collections::{NaturalOrder, sort};
//!
//! let mut sample = [10u8, 20, 30, 40, 15, 25, 35];
//! sort(&mut sample, &NaturalOrder);
//! assert_eq!(sample, [10, 15, 20, 25, 30, 35, 40]);
//! ```
//!
//! Records are moved by value through `[T]::swap`-style exchanges, so the
//! element stride is simply `size_of::<T>()`.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod sort;

pub use sort::{Comparer, NaturalOrder, is_sorted_by, sort, sort_by};
