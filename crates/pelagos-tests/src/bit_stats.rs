// Source:
//   (memory 1)
//   (func (export "popcnt_sum") (param $ptr i32) (param $len i32) (result i64)
//     ... loop: i64.load align=3 at ptr+i*8, i64.popcnt, i64.add ...)
//   (func (export "bit_span") (param i64) (result i32)
//     local.get 0 i64.eqz if 0 return end
//     i32.const 64  local.get 0 i64.clz  i32.wrap_i64  i32.sub
//     local.get 0 i64.ctz  i32.wrap_i64  i32.sub)
//   (func (export "bswap_words") (param $ptr i32) (param $len i32)
//     ... loop: i32.load align=0, byteswap, i32.store align=0 ...)
//   (func (export "float_sign_bits") (param f32 f64) (result i32)
//     ... i32.reinterpret_f32 31 shr_u, i64.reinterpret_f64 63 shr_u ...)

use pelagos_runtime::access::{load32_align0, load64_align3, store32_align0, store64_align3};
use pelagos_runtime::bits::{i32_byteswap, i64_clz, i64_ctz, i64_popcnt};
use pelagos_runtime::reinterpret::{i32_reinterpret_f32, i64_reinterpret_f64};
use pelagos_runtime::{ConstructionError, Instance};

pub struct WasmModule(pub Instance<(), 1>);

pub fn new() -> Result<WasmModule, ConstructionError> {
    let mut inst: Instance<(), 1> = Instance::try_new(1, ())?;
    inst.init(|_, _| {}, |_, _| {});
    Ok(WasmModule(inst))
}

impl WasmModule {
    /// Host helper: copy `words` into memory at `ptr`, 8-byte aligned.
    pub fn write_words(&mut self, ptr: u32, words: &[u64]) {
        let memory = self.0.memory.as_mut_slice();
        for (i, w) in words.iter().enumerate() {
            store64_align3(memory, ptr as usize + i * 8, *w);
        }
    }

    pub fn popcnt_sum(&self, v0: u32, v1: u32) -> u64 {
        let memory = self.0.memory.as_slice();
        let mut sum = 0u64;
        let mut i = 0u32;
        while i < v1 {
            let w = load64_align3(memory, v0.wrapping_add(i.wrapping_mul(8)) as usize);
            sum = sum.wrapping_add(i64_popcnt(w));
            i += 1;
        }
        sum
    }

    /// Distance between the lowest and highest set bit, plus one; 0 when
    /// no bit is set.
    pub fn bit_span(&self, v0: u64) -> u32 {
        if v0 == 0 {
            return 0;
        }
        64 - i64_clz(v0) as u32 - i64_ctz(v0) as u32
    }

    pub fn bswap_words(&mut self, v0: u32, v1: u32) {
        let memory = self.0.memory.as_mut_slice();
        let mut i = 0u32;
        while i < v1 {
            let addr = v0.wrapping_add(i.wrapping_mul(4)) as usize;
            let w = load32_align0(memory, addr);
            store32_align0(memory, addr, i32_byteswap(w));
            i += 1;
        }
    }

    pub fn float_sign_bits(&self, v0: f32, v1: f64) -> u32 {
        (i32_reinterpret_f32(v0) >> 31) | (((i64_reinterpret_f64(v1) >> 63) as u32) << 1)
    }

    /// Host helper: raw view of the memory.
    pub fn bytes(&self) -> &[u8] {
        self.0.memory.as_slice()
    }
}
