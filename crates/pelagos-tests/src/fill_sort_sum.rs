// Source: a C-like routine compiled to bytecode. A 1024-element i32 buffer at
// address 0x400 is filled from an LCG, bubble sorted in place, and summed.
//
//   (memory 1 1)
//   (func (export "mem_fill_sort_sum") (param $n i32) (param $seed i32) (result i32) ...)

use pelagos_runtime::access::{load32_align2, store32_align2};
use pelagos_runtime::{ConstructionError, Instance};

/// Element capacity of the work buffer.
pub const BUF_LEN: u32 = 1024;

const BUF_ADDR: u32 = 0x400;

pub struct WasmModule(pub Instance<(), 1>);

pub fn new() -> Result<WasmModule, ConstructionError> {
    let mut inst: Instance<(), 1> = Instance::try_new(1, ())?;
    inst.init(|_, _| {}, |_, _| {});
    Ok(WasmModule(inst))
}

impl WasmModule {
    pub fn mem_fill_sort_sum(&mut self, v0: u32, v1: u32) -> u32 {
        let memory = self.0.memory.as_mut_slice();
        let n = if v0 > BUF_LEN { BUF_LEN } else { v0 };

        let mut rng = v1;
        let mut i = 0u32;
        while i < n {
            rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
            store32_align2(memory, (BUF_ADDR + i * 4) as usize, rng);
            i += 1;
        }

        let mut i = 0u32;
        while i < n {
            let mut j = 0u32;
            while j + 1 + i < n {
                let a = (BUF_ADDR + j * 4) as usize;
                let b = a + 4;
                let lhs = load32_align2(memory, a);
                let rhs = load32_align2(memory, b);
                // i32.gt_s
                if (lhs as i32) > (rhs as i32) {
                    store32_align2(memory, a, rhs);
                    store32_align2(memory, b, lhs);
                }
                j += 1;
            }
            i += 1;
        }

        let mut sum = 0u32;
        let mut i = 0u32;
        while i < n {
            sum = sum.wrapping_add(load32_align2(memory, (BUF_ADDR + i * 4) as usize));
            i += 1;
        }
        sum
    }

    /// Read back element `index` of the work buffer.
    pub fn element(&self, index: u32) -> i32 {
        load32_align2(self.0.memory.as_slice(), (BUF_ADDR + index * 4) as usize) as i32
    }
}
