//! The one-time segment-init gate, driven through a translated module.

use std::cell::Cell;

use pelagos_runtime::{AccessError, InitGate};
use pelagos_tests::segments;

#[test]
fn test_installers_run_once_on_construction() {
    let m = segments::new().unwrap();
    let g = m.globals();
    assert_eq!(g.elem_runs, 1);
    assert_eq!(g.data_runs, 1);
}

#[test]
fn test_elements_before_data() {
    let m = segments::new().unwrap();
    assert_eq!(m.globals().elem_order, 1);
    assert_eq!(m.globals().data_order, 2);
}

#[test]
fn test_repeated_init_is_noop() {
    let mut m = segments::new().unwrap();
    for _ in 0..5 {
        assert!(!m.init());
    }
    assert_eq!(m.globals().elem_runs, 1);
    assert_eq!(m.globals().data_runs, 1);
}

#[test]
fn test_failed_installer_is_not_rerun() {
    let mut m = segments::new().unwrap();
    // The second data segment overruns the single page.
    assert_eq!(m.globals().data_fault, Some(AccessError::OutOfBounds));
    assert!(!m.init());
    assert_eq!(m.globals().data_runs, 1);
    // The first data segment still landed; the overrunning one wrote nothing.
    assert_eq!(m.greeting(), segments::GREETING);
    assert_eq!(&m.bytes()[0xFFFC..], &[0, 0, 0, 0]);
}

#[test]
fn test_element_segment_populates_table() {
    let m = segments::new().unwrap();
    assert_eq!(m.apply(0, 7, 3), Some(10));
    assert_eq!(m.apply(1, 7, 3), Some(4));
    assert_eq!(m.apply(2, 7, 3), Some(21));
    assert_eq!(m.apply(3, 7, 3), None); // empty slot
    assert_eq!(m.apply(9, 7, 3), None); // past the table
}

#[test]
fn test_instances_do_not_share_init_state() {
    let a = segments::new().unwrap();
    let b = segments::new().unwrap();
    assert_eq!(a.globals().elem_runs, 1);
    assert_eq!(b.globals().elem_runs, 1);
}

#[test]
fn test_gate_survives_panicking_installer() {
    let mut gate = InitGate::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        gate.run(|| panic!("element install failed"), || {});
    }));
    assert!(result.is_err());
    assert!(gate.is_initialized());
    let ran = Cell::new(false);
    assert!(!gate.run(|| ran.set(true), || ran.set(true)));
    assert!(!ran.get());
}
