//! Portable bit-manipulation primitives.
//!
//! Translated `popcnt`, `ctz`, `clz` and byte-swap instructions call these
//! instead of the core intrinsics (`count_ones`, `trailing_zeros`, ...), so
//! the generated code never depends on hardware bit instructions being
//! present. Every function is total and `const`:
//!
//! - `ctz(0)` and `clz(0)` return the bit width (32 or 64).
//! - `ctz` is `popcnt(!x & (x - 1))`: the mask of bits below the lowest set
//!   bit. For `x == 0` the subtraction wraps to all-ones.
//! - `clz` reverses the value (bytes first, then bits within each byte) and
//!   counts trailing zeros of the reversed value.
//!
//! The compositions are straight-line; nothing here loops or recurses.

// ── Byte-order swap ──────────────────────────────────────────────────────────

/// Reverse the two bytes of a 16-bit value.
#[inline(always)]
pub const fn i16_byteswap(src: u16) -> u16 {
    ((src as u8 as u16) << 8) | ((src >> 8) as u8 as u16)
}

/// Reverse the four bytes of a 32-bit value, one 16-bit half at a time.
#[inline(always)]
pub const fn i32_byteswap(src: u32) -> u32 {
    ((i16_byteswap(src as u16) as u32) << 16) | (i16_byteswap((src >> 16) as u16) as u32)
}

/// Reverse the eight bytes of a 64-bit value, one 32-bit half at a time.
#[inline(always)]
pub const fn i64_byteswap(src: u64) -> u64 {
    ((i32_byteswap(src as u32) as u64) << 32) | (i32_byteswap((src >> 32) as u32) as u64)
}

// ── 32-bit counts ────────────────────────────────────────────────────────────

/// Number of set bits, by parallel bit-sum reduction.
#[inline(never)]
pub const fn i32_popcnt(lhs: u32) -> u32 {
    // 2-bit sums, then 4-bit sums, then per-byte sums.
    let lhs = lhs - ((lhs >> 1) & 0x5555_5555);
    let lhs = (lhs & 0x3333_3333) + ((lhs >> 2) & 0x3333_3333);
    let lhs = (lhs + (lhs >> 4)) & 0x0F0F_0F0F;
    // The top byte of the product is the sum of all four byte counts.
    lhs.wrapping_mul(0x0101_0101) >> 24
}

/// Count trailing zero bits. Returns 32 for 0.
#[inline(never)]
pub const fn i32_ctz(lhs: u32) -> u32 {
    i32_popcnt(!lhs & lhs.wrapping_sub(1))
}

/// Count leading zero bits. Returns 32 for 0.
#[inline(never)]
pub const fn i32_clz(lhs: u32) -> u32 {
    let lhs = i32_byteswap(lhs);
    let lhs = ((lhs & 0x0F0F_0F0F) << 4) | ((lhs & 0xF0F0_F0F0) >> 4);
    let lhs = ((lhs & 0x3333_3333) << 2) | ((lhs & 0xCCCC_CCCC) >> 2);
    let lhs = ((lhs & 0x5555_5555) << 1) | ((lhs & 0xAAAA_AAAA) >> 1);
    i32_ctz(lhs)
}

// ── 64-bit counts ────────────────────────────────────────────────────────────

/// Number of set bits, by parallel bit-sum reduction.
#[inline(never)]
pub const fn i64_popcnt(lhs: u64) -> u64 {
    let lhs = lhs - ((lhs >> 1) & 0x5555_5555_5555_5555);
    let lhs = (lhs & 0x3333_3333_3333_3333) + ((lhs >> 2) & 0x3333_3333_3333_3333);
    let lhs = (lhs + (lhs >> 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    lhs.wrapping_mul(0x0101_0101_0101_0101) >> 56
}

/// Count trailing zero bits. Returns 64 for 0.
#[inline(never)]
pub const fn i64_ctz(lhs: u64) -> u64 {
    i64_popcnt(!lhs & lhs.wrapping_sub(1))
}

/// Count leading zero bits. Returns 64 for 0.
#[inline(never)]
pub const fn i64_clz(lhs: u64) -> u64 {
    let lhs = i64_byteswap(lhs);
    let lhs = ((lhs & 0x0F0F_0F0F_0F0F_0F0F) << 4) | ((lhs & 0xF0F0_F0F0_F0F0_F0F0) >> 4);
    let lhs = ((lhs & 0x3333_3333_3333_3333) << 2) | ((lhs & 0xCCCC_CCCC_CCCC_CCCC) >> 2);
    let lhs = ((lhs & 0x5555_5555_5555_5555) << 1) | ((lhs & 0xAAAA_AAAA_AAAA_AAAA) >> 1);
    i64_ctz(lhs)
}

// ── Tests ─────────────────────────────────────────────────────────────────────


// ── Kani Formal Verification Proofs ──────────────────────────────────────
//
// Exhaustive over every input: the portable primitives agree with the core
// intrinsics. Run with: cargo kani -p pelagos-runtime

#[cfg(kani)]
mod proofs {
    use super::*;

    /// Proof: i32_popcnt equals count_ones for every u32.
    #[kani::proof]
    fn i32_popcnt_matches_count_ones() {
        let x: u32 = kani::any();
        kani::assert(i32_popcnt(x) == x.count_ones(), "popcnt matches count_ones");
    }

    /// Proof: i32_ctz equals trailing_zeros, including 32 for zero.
    #[kani::proof]
    fn i32_ctz_matches_trailing_zeros() {
        let x: u32 = kani::any();
        kani::assert(i32_ctz(x) == x.trailing_zeros(), "ctz matches trailing_zeros");
    }

    /// Proof: i32_clz equals leading_zeros, including 32 for zero.
    #[kani::proof]
    fn i32_clz_matches_leading_zeros() {
        let x: u32 = kani::any();
        kani::assert(i32_clz(x) == x.leading_zeros(), "clz matches leading_zeros");
    }

    /// Proof: i64_popcnt equals count_ones for every u64.
    #[kani::proof]
    fn i64_popcnt_matches_count_ones() {
        let x: u64 = kani::any();
        kani::assert(i64_popcnt(x) == x.count_ones() as u64, "popcnt matches count_ones");
    }

    /// Proof: i64_ctz equals trailing_zeros, including 64 for zero.
    #[kani::proof]
    fn i64_ctz_matches_trailing_zeros() {
        let x: u64 = kani::any();
        kani::assert(
            i64_ctz(x) == x.trailing_zeros() as u64,
            "ctz matches trailing_zeros",
        );
    }

    /// Proof: i64_clz equals leading_zeros, including 64 for zero.
    #[kani::proof]
    fn i64_clz_matches_leading_zeros() {
        let x: u64 = kani::any();
        kani::assert(
            i64_clz(x) == x.leading_zeros() as u64,
            "clz matches leading_zeros",
        );
    }

    /// Proof: every byte swap is its own inverse and matches swap_bytes.
    #[kani::proof]
    fn byteswap_is_involution() {
        let x: u64 = kani::any();
        kani::assert(i64_byteswap(i64_byteswap(x)) == x, "i64 swap involution");
        kani::assert(i64_byteswap(x) == x.swap_bytes(), "i64 swap matches core");
        let y = x as u32;
        kani::assert(i32_byteswap(i32_byteswap(y)) == y, "i32 swap involution");
        let z = x as u16;
        kani::assert(i16_byteswap(i16_byteswap(z)) == z, "i16 swap involution");
    }
}
