//! RISC-V 32-bit backend.
//!
//! This crate lowers a TAC program into RV32I assembly text:
//! - Translation into a native instruction set over virtual registers
//! - Control-flow and liveness analyses
//! - Iterative local register allocation with spilling
//! - Code emission (stack frames, offset resolution, branch finalisation)
//! - Assembly printing

#![no_std]

extern crate alloc;

pub mod asm;
pub mod cfg;
mod debug;
pub mod emit;
pub mod inst;
pub mod liveness;
pub mod program;
pub mod regalloc;
pub mod regs;
pub mod translate;

use alloc::string::String;

use tac_ir::TacProg;

pub use emit::AsmCodeEmitter;
pub use inst::{is_imm12, CmpBranchOp, NativeInst};
pub use program::{NativeBlock, NativeFunc, NativeProg, StackObject, StackSlot};
pub use regalloc::LocalRegAllocator;
pub use translate::{translate_function, translate_program};

/// Translate a TAC program into the native representation.
pub fn translate(prog: &TacProg) -> NativeProg {
    translate_program(prog)
}

/// Run the backend passes over a translated program: register allocation,
/// then code emission, per function in program order.
///
/// Functions are lowered independently; the passes reset their internal
/// state at each function entry.
pub fn run_passes(prog: &mut NativeProg) {
    let mut allocator = LocalRegAllocator::new();
    let mut emitter = AsmCodeEmitter::new();
    for func in &mut prog.funcs {
        allocator.run(func);
        emitter.run(func);
    }
}

/// Compile a TAC program all the way to assembly text.
pub fn compile_program(prog: &TacProg) -> String {
    let mut native = translate(prog);
    run_passes(&mut native);
    asm::write_assembly(&native)
}
