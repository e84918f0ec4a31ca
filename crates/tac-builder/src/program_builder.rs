//! Program builder.

use alloc::vec::Vec;

use tac_ir::{TacFunc, TacProg};

/// Collects finished functions into a program.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    funcs: Vec<TacFunc>,
}

impl ProgramBuilder {
    /// Create an empty program builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a function.
    pub fn add_function(&mut self, func: TacFunc) {
        self.funcs.push(func);
    }

    /// Finish building and return the program.
    pub fn finish(self) -> TacProg {
        TacProg::new(self.funcs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FunctionBuilder;

    #[test]
    fn test_program_builder() {
        let mut fb = FunctionBuilder::new("main", 0);
        fb.create_block(".L1");
        fb.ret(None);

        let mut pb = ProgramBuilder::new();
        pb.add_function(fb.finish());
        let prog = pb.finish();
        assert_eq!(prog.funcs.len(), 1);
        assert_eq!(prog.funcs[0].name, "main");
    }
}
