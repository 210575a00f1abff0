//! One-time element/data segment installation.
//!
//! Translated modules install their element segments and then their data
//! segments before the first export runs. `InitGate` is the per-instance
//! flag that makes this happen exactly once. Its lifecycle is
//! `Uninitialized → Initialized`; it is never reset.
//!
//! The gate flips before the installers run. An installer that panics is
//! therefore never re-run by a later call; recovering from a failed
//! installation is the installer's own business.

/// Lifecycle state of an [`InitGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InitState {
    #[default]
    Uninitialized,
    Initialized,
}

/// Per-instance guard around the segment installers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitGate {
    state: InitState,
}

impl InitGate {
    /// A gate that has not run yet.
    pub const fn new() -> Self {
        Self {
            state: InitState::Uninitialized,
        }
    }

    /// Whether the installers have been started.
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.state == InitState::Initialized
    }

    /// Mark the gate initialized. Returns `true` only on the first call,
    /// meaning the caller must now run the installers.
    ///
    /// Use this when the installers need mutable access to state that lives
    /// beside the gate (see [`crate::Instance::init`]).
    #[inline]
    pub fn begin(&mut self) -> bool {
        match self.state {
            InitState::Initialized => false,
            InitState::Uninitialized => {
                self.state = InitState::Initialized;
                true
            }
        }
    }

    /// Run `init_elem` then `init_data` on the first call; later calls do
    /// nothing. Returns whether the installers ran.
    pub fn run<E, D>(&mut self, init_elem: E, init_data: D) -> bool
    where
        E: FnOnce(),
        D: FnOnce(),
    {
        if !self.begin() {
            return false;
        }
        init_elem();
        init_data();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};

    #[test]
    fn new_gate_is_uninitialized() {
        let gate = InitGate::new();
        assert!(!gate.is_initialized());
        assert_eq!(gate, InitGate::default());
    }

    #[test]
    fn begin_is_true_exactly_once() {
        let mut gate = InitGate::new();
        assert!(gate.begin());
        assert!(gate.is_initialized());
        assert!(!gate.begin());
        assert!(!gate.begin());
    }

    #[test]
    fn run_invokes_installers_once_in_order() {
        let log = RefCell::new([0u8; 4]);
        let len = Cell::new(0usize);
        let record = |tag: u8| {
            log.borrow_mut()[len.get()] = tag;
            len.set(len.get() + 1);
        };

        let mut gate = InitGate::new();
        assert!(gate.run(|| record(b'e'), || record(b'd')));
        assert!(!gate.run(|| record(b'e'), || record(b'd')));
        assert!(!gate.run(|| record(b'e'), || record(b'd')));

        assert_eq!(len.get(), 2);
        assert_eq!(&log.borrow()[..2], b"ed");
    }

    #[test]
    fn clone_keeps_state() {
        let mut gate = InitGate::new();
        gate.begin();
        let copy = gate.clone();
        assert!(copy.is_initialized());
    }
}
