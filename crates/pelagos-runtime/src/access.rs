//! Unaligned 16/32/64-bit loads and stores over a byte region.
//!
//! Every helper copies the value byte-for-byte between `memory[offset..]` and
//! its native-endian representation, so the host's alignment rules never
//! matter. Byte-order correction for a big-endian embedding is the caller's
//! job (see [`crate::bits`]).
//!
//! The `_alignN` suffix is the log2 of the alignment the translator has
//! proven for `offset` (0 = any byte, 1 = 2 bytes, 2 = 4 bytes, 3 = 8 bytes).
//! It lets generated code name the access form matching what it knows
//! statically; all variants of a width are interchangeable and give
//! identical results. Debug builds assert the claimed alignment.
//!
//! # Panics
//!
//! The caller guarantees `offset + width <= memory.len()`. A window outside
//! `memory` panics on the slice index; it never reads or writes out of
//! bounds.

mod sealed {
    pub trait Sealed {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// A fixed-width integer that can be copied to and from unaligned bytes.
///
/// Sealed: implemented for `u16`, `u32` and `u64` only.
pub trait Unaligned: sealed::Sealed + Copy {
    /// Width in bytes.
    const WIDTH: usize;

    /// Read from exactly `WIDTH` bytes in native byte order.
    fn read_ne(bytes: &[u8]) -> Self;

    /// Write into exactly `WIDTH` bytes in native byte order.
    fn write_ne(self, bytes: &mut [u8]);
}

macro_rules! impl_unaligned {
    ($($ty:ty),*) => {$(
        impl Unaligned for $ty {
            const WIDTH: usize = core::mem::size_of::<$ty>();

            #[inline(always)]
            fn read_ne(bytes: &[u8]) -> Self {
                let mut buf = [0u8; core::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                <$ty>::from_ne_bytes(buf)
            }

            #[inline(always)]
            fn write_ne(self, bytes: &mut [u8]) {
                bytes.copy_from_slice(&self.to_ne_bytes());
            }
        }
    )*};
}

impl_unaligned!(u16, u32, u64);

/// Load a `T` from `memory[offset..offset + T::WIDTH]`, native byte order.
#[inline(always)]
pub fn load<T: Unaligned>(memory: &[u8], offset: usize) -> T {
    T::read_ne(&memory[offset..offset + T::WIDTH])
}

/// Store `value` into `memory[offset..offset + T::WIDTH]`, native byte order.
#[inline(always)]
pub fn store<T: Unaligned>(memory: &mut [u8], offset: usize, value: T) {
    value.write_ne(&mut memory[offset..offset + T::WIDTH])
}

macro_rules! access_helpers {
    ($($load:ident, $store:ident: $ty:ty, $align:literal;)*) => {$(
        #[doc = concat!("Load a `", stringify!($ty), "` at an offset aligned to ", stringify!($align), " byte(s).")]
        #[inline(always)]
        pub fn $load(memory: &[u8], offset: usize) -> $ty {
            debug_assert!(offset % $align == 0, "offset not aligned as claimed");
            load::<$ty>(memory, offset)
        }

        #[doc = concat!("Store a `", stringify!($ty), "` at an offset aligned to ", stringify!($align), " byte(s).")]
        #[inline(always)]
        pub fn $store(memory: &mut [u8], offset: usize, value: $ty) {
            debug_assert!(offset % $align == 0, "offset not aligned as claimed");
            store::<$ty>(memory, offset, value)
        }
    )*};
}

access_helpers! {
    load16_align0, store16_align0: u16, 1;
    load16_align1, store16_align1: u16, 2;
    load32_align0, store32_align0: u32, 1;
    load32_align1, store32_align1: u32, 2;
    load32_align2, store32_align2: u32, 4;
    load64_align0, store64_align0: u64, 1;
    load64_align1, store64_align1: u64, 2;
    load64_align2, store64_align2: u64, 4;
    load64_align3, store64_align3: u64, 8;
}


#[cfg(kani)]
mod proofs {
    use super::*;

    /// Proof: store then load at any in-range offset returns the value.
    #[kani::proof]
    #[kani::unwind(9)]
    fn store_load_roundtrip_u64() {
        let mut buf = [0u8; 16];
        let offset: usize = kani::any();
        kani::assume(offset <= 8);
        let value: u64 = kani::any();
        store64_align0(&mut buf, offset, value);
        kani::assert(load64_align0(&buf, offset) == value, "u64 roundtrip");
    }

    /// Proof: store then load at any in-range offset returns the value.
    #[kani::proof]
    #[kani::unwind(5)]
    fn store_load_roundtrip_u32() {
        let mut buf = [0u8; 8];
        let offset: usize = kani::any();
        kani::assume(offset <= 4);
        let value: u32 = kani::any();
        store32_align0(&mut buf, offset, value);
        kani::assert(load32_align0(&buf, offset) == value, "u32 roundtrip");
    }
}
