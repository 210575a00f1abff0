//! Translated module instance: `Instance<G, MAX_PAGES>`.
//!
//! An instance owns its linear memory, the translator-generated globals
//! struct `G`, and the one-time segment-init flag. Two instances never share
//! memory or initialization state. Generated code wraps an `Instance` in its
//! own struct and adds the exported functions as methods.

use crate::init::InitGate;
use crate::memory::LinearMemory;
use crate::{ConstructionError, PAGE_CEILING};

/// A translated module instance.
///
/// - `G`: translator-generated globals struct (one typed field per global)
/// - `MAX_PAGES`: the module's maximum linear memory size, in pages
///
/// Every mutating operation takes `&mut self`; a host sharing one instance
/// between threads puts it behind its own lock.
#[derive(Debug, Clone)]
pub struct Instance<G, const MAX_PAGES: u32 = PAGE_CEILING> {
    /// Owned linear memory.
    pub memory: LinearMemory<MAX_PAGES>,
    /// Module-level global variables.
    pub globals: G,
    /// Guards the element/data segment installers.
    gate: InitGate,
}

impl<G, const MAX_PAGES: u32> Instance<G, MAX_PAGES> {
    /// Create an instance with `initial_pages` of zeroed memory.
    ///
    /// Segments are not installed yet; call [`Instance::init`] before the
    /// first export runs.
    ///
    /// # Errors
    /// Returns `ConstructionError` if `initial_pages` exceeds `MAX_PAGES` or
    /// cannot be allocated.
    #[inline(never)]
    pub fn try_new(initial_pages: u32, globals: G) -> Result<Self, ConstructionError> {
        Ok(Self {
            memory: LinearMemory::try_new(initial_pages)?,
            globals,
            gate: InitGate::new(),
        })
    }

    /// Whether the segment installers have run.
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.gate.is_initialized()
    }

    /// Install element segments, then data segments, on the first call.
    /// Later calls are no-ops. Returns whether the installers ran.
    ///
    /// Both installers receive the instance's memory and globals; their
    /// failures are theirs to handle and never cause a re-run.
    pub fn init<E, D>(&mut self, init_elem: E, init_data: D) -> bool
    where
        E: FnOnce(&mut LinearMemory<MAX_PAGES>, &mut G),
        D: FnOnce(&mut LinearMemory<MAX_PAGES>, &mut G),
    {
        if !self.gate.begin() {
            return false;
        }
        init_elem(&mut self.memory, &mut self.globals);
        init_data(&mut self.memory, &mut self.globals);
        true
    }
}
