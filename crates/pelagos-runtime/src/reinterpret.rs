//! Bit-pattern reinterpretation between integers and IEEE-754 floats.
//!
//! These back the translated `reinterpret` instructions. Each is a raw bit
//! copy: no numeric conversion, no rounding, and NaN payloads and the sign
//! of zero pass through untouched.

/// `i32.reinterpret_f32`: the bits of `src` as an unsigned 32-bit integer.
#[inline(always)]
pub fn i32_reinterpret_f32(src: f32) -> u32 {
    src.to_bits()
}

/// `i64.reinterpret_f64`: the bits of `src` as an unsigned 64-bit integer.
#[inline(always)]
pub fn i64_reinterpret_f64(src: f64) -> u64 {
    src.to_bits()
}

/// `f32.reinterpret_i32`: the single-precision float encoded by `src`.
#[inline(always)]
pub fn f32_reinterpret_i32(src: u32) -> f32 {
    f32::from_bits(src)
}

/// `f64.reinterpret_i64`: the double-precision float encoded by `src`.
#[inline(always)]
pub fn f64_reinterpret_i64(src: u64) -> f64 {
    f64::from_bits(src)
}


#[cfg(kani)]
mod proofs {
    use super::*;

    /// Proof: int → float → int is the identity for every 32-bit pattern.
    #[kani::proof]
    fn roundtrip_32() {
        let bits: u32 = kani::any();
        kani::assert(
            i32_reinterpret_f32(f32_reinterpret_i32(bits)) == bits,
            "f32 reinterpretation preserves all bits",
        );
    }

    /// Proof: int → float → int is the identity for every 64-bit pattern.
    #[kani::proof]
    fn roundtrip_64() {
        let bits: u64 = kani::any();
        kani::assert(
            i64_reinterpret_f64(f64_reinterpret_i64(bits)) == bits,
            "f64 reinterpretation preserves all bits",
        );
    }
}
