//! Builder for constructing TAC programs without going through text.
//!
//! The builder mirrors how a frontend would emit TAC: open a block, append
//! instructions, mint temps from the function's counter. It is used by the
//! backend's tests and by anything that produces TAC programmatically.

#![no_std]

extern crate alloc;

mod function_builder;
mod program_builder;

pub use function_builder::FunctionBuilder;
pub use program_builder::ProgramBuilder;
