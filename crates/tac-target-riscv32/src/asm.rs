//! Assembly text output.

use alloc::{
    format,
    string::String,
};

use crate::program::NativeProg;

/// Render a lowered program as assembly text, with the `.text`/`.global`
/// header expected by the toolchain.
pub fn write_assembly(prog: &NativeProg) -> String {
    format!("    .text\n    .global main\n\n{}\n", prog)
}
