//! Hand-translated modules in the shape a translator emits against
//! `pelagos-runtime`, plus plain-Rust reference implementations used by
//! the tests and benchmarks.
//!
//! Each module exposes `new()` (construct + install segments) and a
//! `WasmModule` newtype whose methods are the exports.

pub mod memory_grow;

pub mod fill_sort_sum;

pub mod bit_stats;

pub mod segments;

/// Plain-Rust counterpart of [`fill_sort_sum::WasmModule::mem_fill_sort_sum`].
pub fn mem_fill_sort_sum_orig(n: u32, seed: u32) -> u32 {
    let n = n.min(fill_sort_sum::BUF_LEN) as usize;
    let mut buf = vec![0i32; n];
    let mut rng = seed;
    for item in buf.iter_mut() {
        rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
        *item = rng as i32;
    }
    for i in 0..n {
        for j in 0..(n - 1 - i) {
            if buf[j] > buf[j + 1] {
                buf.swap(j, j + 1);
            }
        }
    }
    buf.iter().fold(0u32, |sum, v| sum.wrapping_add(*v as u32))
}

/// Plain-Rust counterpart of [`bit_stats::WasmModule::popcnt_sum`].
pub fn popcnt_sum_orig(words: &[u64]) -> u64 {
    words.iter().map(|w| w.count_ones() as u64).sum()
}
