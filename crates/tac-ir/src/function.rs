//! Functions.

use alloc::{string::String, vec::Vec};
use core::fmt;

use crate::{block::TacBlock, temp::Temp};

/// A TAC function.
///
/// A function has a name, a parameter count, an ordered list of blocks (the
/// first is the entry) and a counter for minting fresh temps. Parameters are
/// the temps `_T1 .. _Tn`, so the counter starts at the parameter count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TacFunc {
    /// Function name.
    pub name: String,
    /// Number of parameters.
    pub num_params: usize,
    /// Highest temp index handed out so far.
    pub temp_used: i32,
    /// Basic blocks; the first is the entry.
    pub blocks: Vec<TacBlock>,
}

impl TacFunc {
    /// Create a new function with no blocks.
    pub fn new(name: impl Into<String>, num_params: usize) -> Self {
        Self {
            name: name.into(),
            num_params,
            temp_used: num_params as i32,
            blocks: Vec::new(),
        }
    }

    /// Append a block and return its index.
    pub fn add_block(&mut self, block: TacBlock) -> usize {
        let index = self.blocks.len();
        self.blocks.push(block);
        index
    }

    /// Mint a fresh temp.
    pub fn new_temp(&mut self) -> Temp {
        self.temp_used += 1;
        Temp::new(self.temp_used)
    }

    /// Get the entry block, if any.
    pub fn entry_block(&self) -> Option<&TacBlock> {
        self.blocks.first()
    }
}

impl fmt::Display for TacFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "function %{}({}) {{", self.name, self.num_params)?;
        for block in &self.blocks {
            writeln!(f, "{}", block)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use crate::inst::TacInst;

    #[test]
    fn test_new_temp_starts_after_params() {
        let mut func = TacFunc::new("f", 2);
        assert_eq!(func.new_temp(), Temp::new(3));
        assert_eq!(func.new_temp(), Temp::new(4));
    }

    #[test]
    fn test_add_block() {
        let mut func = TacFunc::new("f", 0);
        assert_eq!(func.add_block(TacBlock::new(".L1")), 0);
        assert_eq!(func.add_block(TacBlock::new(".L2")), 1);
        assert_eq!(func.entry_block().unwrap().label, ".L1");
    }

    #[test]
    fn test_function_display() {
        let mut func = TacFunc::new("main", 0);
        let mut block = TacBlock::new(".L1");
        block.push(TacInst::Return { value: None });
        func.add_block(block);
        assert_eq!(
            func.to_string(),
            "function %main(0) {\n.L1:\n    return\n}"
        );
    }
}
