// Source:
//   (memory 1 1)
//   (table 4 funcref)
//   (elem (i32.const 0) $add $sub $mul)
//   (data (i32.const 0x100) "hello, pelagos")
//   (data (i32.const 0xFFFC) "\de\ad\be\ef\00")   ;; one byte past the end
//   (func $add ...) (func $sub ...) (func $mul ...)
//   (func (export "apply") (param $op i32) (param $a i32) (param $b i32) (result i32)
//     local.get $a local.get $b local.get $op call_indirect)
//
// The second data segment does not fit: its installer records the fault
// and carries on, and the gate still never re-runs either installer.

use pelagos_runtime::{AccessError, ConstructionError, Instance, LinearMemory};

pub const MAX_PAGES: u32 = 1;

pub const GREETING_ADDR: usize = 0x100;
pub const GREETING: &[u8] = b"hello, pelagos";

const DATA_1_ADDR: usize = 0xFFFC;
const DATA_1: &[u8] = &[0xDE, 0xAD, 0xBE, 0xEF, 0x00];

/// Table slot contents: indices into the module's function space.
const ELEM_0: [u32; 3] = [0, 1, 2];

#[derive(Debug, Default)]
pub struct Globals {
    pub table: [Option<u32>; 4],
    /// Installer invocation counters, for observing the init gate.
    pub elem_runs: u32,
    pub data_runs: u32,
    /// Sequence number of each installer's first run (1-based).
    pub elem_order: u32,
    pub data_order: u32,
    pub data_fault: Option<AccessError>,
}

pub struct WasmModule(pub Instance<Globals, MAX_PAGES>);

pub fn new() -> Result<WasmModule, ConstructionError> {
    let mut module = WasmModule(Instance::try_new(1, Globals::default())?);
    module.init();
    Ok(module)
}

fn init_elem(_memory: &mut LinearMemory<MAX_PAGES>, globals: &mut Globals) {
    globals.elem_runs += 1;
    globals.elem_order = globals.elem_runs + globals.data_runs;
    for (slot, func) in globals.table.iter_mut().zip(ELEM_0) {
        *slot = Some(func);
    }
}

fn init_data(memory: &mut LinearMemory<MAX_PAGES>, globals: &mut Globals) {
    globals.data_runs += 1;
    globals.data_order = globals.elem_runs + globals.data_runs;
    if let Err(e) = memory.init_data(GREETING_ADDR, GREETING) {
        globals.data_fault = Some(e);
        return;
    }
    if let Err(e) = memory.init_data(DATA_1_ADDR, DATA_1) {
        globals.data_fault = Some(e);
    }
}

fn func_add(a: u32, b: u32) -> u32 {
    a.wrapping_add(b)
}

fn func_sub(a: u32, b: u32) -> u32 {
    a.wrapping_sub(b)
}

fn func_mul(a: u32, b: u32) -> u32 {
    a.wrapping_mul(b)
}

impl WasmModule {
    /// Run the segment installers if they have not run yet.
    pub fn init(&mut self) -> bool {
        self.0.init(init_elem, init_data)
    }

    /// Indirect call through the table; `None` for an empty or missing slot.
    pub fn apply(&self, v0: u32, v1: u32, v2: u32) -> Option<u32> {
        let func = self.0.globals.table.get(v0 as usize).copied().flatten()?;
        match func {
            0 => Some(func_add(v1, v2)),
            1 => Some(func_sub(v1, v2)),
            2 => Some(func_mul(v1, v2)),
            _ => None,
        }
    }

    pub fn greeting(&self) -> &[u8] {
        &self.0.memory.as_slice()[GREETING_ADDR..GREETING_ADDR + GREETING.len()]
    }

    pub fn globals(&self) -> &Globals {
        &self.0.globals
    }

    pub fn bytes(&self) -> &[u8] {
        self.0.memory.as_slice()
    }
}
