//! Programs.

use alloc::vec::Vec;
use core::fmt;

use crate::function::TacFunc;

/// A TAC program: an ordered list of functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TacProg {
    /// Functions in program order.
    pub funcs: Vec<TacFunc>,
}

impl TacProg {
    /// Create a program from a list of functions.
    pub fn new(funcs: Vec<TacFunc>) -> Self {
        Self { funcs }
    }
}

impl fmt::Display for TacProg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, func) in self.funcs.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{}", func)?;
        }
        Ok(())
    }
}
