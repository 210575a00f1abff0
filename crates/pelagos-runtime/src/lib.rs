//! `pelagos-runtime`: Runtime support for translated bytecode modules.
//!
//! This crate is `#![no_std]`. It provides the primitives that translated
//! instructions cannot express directly:
//! - `LinearMemory<const MAX_PAGES: u32>`, a growable page-granular byte region
//!   (requires the `alloc` feature, on by default)
//! - unaligned load/store helpers for 16/32/64-bit values ([`access`])
//! - portable population count, leading/trailing zero count and byte swap ([`bits`])
//! - integer ↔ float bit-pattern reinterpretation ([`reinterpret`])
//! - `InitGate`, the one-time element/data segment installation guard

#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

use core::fmt;

/// Linear memory page size: 64 KiB.
pub const PAGE_SIZE: usize = 65536;

/// Absolute page ceiling: the full 32-bit address space in 64 KiB pages.
pub const PAGE_CEILING: u32 = 0x1_0000;

/// Sentinel returned by `memory.grow` on failure.
///
/// Larger than every valid previous page count (those are `<= PAGE_CEILING`).
pub const GROW_FAILED: u32 = 0x0FFF_FFFF;

pub mod access;
pub mod bits;
pub mod reinterpret;

mod init;
pub use init::InitGate;

#[cfg(feature = "alloc")]
mod memory;
#[cfg(feature = "alloc")]
pub use memory::{memory_grow, next_capacity, LinearMemory};

#[cfg(feature = "alloc")]
mod instance;
#[cfg(feature = "alloc")]
pub use instance::Instance;

/// Why a `memory.grow` request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowError {
    /// `committed + delta` exceeds the region's page ceiling.
    ExceedsCeiling { requested: u64, max: u32 },
    /// The backing storage could not be resized to `pages` pages.
    OutOfMemory { pages: u32 },
}

impl fmt::Display for GrowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowError::ExceedsCeiling { requested, max } => {
                write!(f, "memory.grow to {requested} pages exceeds the {max}-page ceiling")
            }
            GrowError::OutOfMemory { pages } => {
                write!(f, "could not reserve backing storage for {pages} pages")
            }
        }
    }
}

/// Errors raised by the checked region helpers (segment installation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// The byte range does not lie within the committed region.
    OutOfBounds,
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::OutOfBounds => f.write_str("access outside committed linear memory"),
        }
    }
}

/// Errors that occur while building a region or instance.
///
/// These are programming errors in the translator, not runtime failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionError {
    /// Initial pages exceeds MAX_PAGES for memory.
    MemoryInitialPagesExceedsMax { initial: u32, max: u32 },
    /// Initial pages could not be allocated.
    OutOfMemory { pages: u32 },
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionError::MemoryInitialPagesExceedsMax { initial, max } => {
                write!(f, "initial memory of {initial} pages exceeds maximum of {max}")
            }
            ConstructionError::OutOfMemory { pages } => {
                write!(f, "could not allocate initial memory of {pages} pages")
            }
        }
    }
}

impl From<GrowError> for u32 {
    /// Collapse a refusal to the `memory.grow` sentinel.
    fn from(_: GrowError) -> Self {
        GROW_FAILED
    }
}
