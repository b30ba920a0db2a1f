//! # Memory Map Errors

/// Reasons the memory map could not be consolidated.
///
/// None of these are recoverable inside the loader; the boot sequence is
/// expected to report the error and halt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryMapError {
    #[error("descriptor count {count} exceeds the array capacity of {capacity}")]
    CountExceedsCapacity { count: usize, capacity: usize },

    #[error("no addressable usable RAM can hold {required} bytes of scratch space")]
    ScratchExhausted { required: u64 },

    #[error("scratch space at {base:#x} ({slots} slots) cannot be mapped")]
    ScratchUnmapped { base: u64, slots: usize },

    #[error("scratch space of {slots} slots is too small for the split map")]
    ScratchOverflow { slots: usize },

    #[error("consolidated map needs {required} slots but the array holds {capacity}")]
    OutputExceedsCapacity { required: usize, capacity: usize },
}
