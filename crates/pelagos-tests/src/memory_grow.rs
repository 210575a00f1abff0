// Source:
//   (memory 1)
//   (func (export "size") (result i32) memory.size)
//   (func (export "grow") (param i32) (result i32) local.get 0 memory.grow)
//   (func (export "store_and_load") (param i32 i32) (result i32)
//     local.get 0 local.get 1 i32.store  local.get 0 i32.load)

use pelagos_runtime::access::{load32_align2, store32_align2};
use pelagos_runtime::{ConstructionError, Instance};

pub struct WasmModule(pub Instance<()>);

pub fn new() -> Result<WasmModule, ConstructionError> {
    let mut inst: Instance<()> = Instance::try_new(1, ())?;
    inst.init(|_, _| {}, |_, _| {});
    Ok(WasmModule(inst))
}

impl WasmModule {
    pub fn size(&self) -> u32 {
        self.0.memory.size()
    }

    pub fn grow(&mut self, v0: u32) -> u32 {
        self.0.memory.grow(v0)
    }

    pub fn store_and_load(&mut self, v0: u32, v1: u32) -> u32 {
        store32_align2(self.0.memory.as_mut_slice(), v0 as usize, v1);
        load32_align2(self.0.memory.as_slice(), v0 as usize)
    }
}
