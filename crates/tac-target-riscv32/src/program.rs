//! Native program model: blocks, functions, programs and stack objects.

use alloc::{string::String, vec::Vec};
use core::fmt;

use tac_ir::{Label, Temp};

use crate::inst::NativeInst;

/// Reference to a stack object, by index into the function's slot list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StackSlot(u32);

impl StackSlot {
    /// Create a slot reference.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the slot index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A logical frame allocation of a given byte size.
///
/// The offset is unassigned at creation; a single frame-layout pass packs
/// all of a function's objects consecutively starting at offset 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackObject {
    /// Offset within the frame, assigned by [`assign_stack_offsets`].
    pub offset: Option<i32>,
    /// Size in bytes.
    pub size: i32,
}

impl StackObject {
    /// Create an object of the given size with no offset yet.
    pub fn new(size: i32) -> Self {
        Self { offset: None, size }
    }
}

/// Pack stack objects consecutively from offset 0 and return the total size.
pub fn assign_stack_offsets(objs: &mut [StackObject]) -> i32 {
    let mut offset = 0;
    for obj in objs {
        obj.offset = Some(offset);
        offset += obj.size;
    }
    offset
}

/// A native basic block: a label and an ordered instruction list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeBlock {
    /// The block label, unique within its function.
    pub label: Label,
    /// Instructions in this block.
    pub instrs: Vec<NativeInst>,
}

impl NativeBlock {
    /// Create a new empty block with the given label.
    pub fn new(label: impl Into<Label>) -> Self {
        Self {
            label: label.into(),
            instrs: Vec::new(),
        }
    }

    /// Append an instruction.
    pub fn push(&mut self, inst: NativeInst) {
        self.instrs.push(inst);
    }

    /// Get the terminator, i.e. the last instruction if any.
    pub fn terminator(&self) -> Option<&NativeInst> {
        self.instrs.last()
    }
}

impl fmt::Display for NativeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.label)?;
        for inst in &self.instrs {
            write!(f, "\n    {}", inst)?;
        }
        Ok(())
    }
}

/// A native function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeFunc {
    /// Function name.
    pub name: String,
    /// Number of parameters.
    pub num_params: usize,
    /// Highest temp index handed out so far. Carried over from the TAC
    /// function so temps minted during allocation never collide.
    pub temp_used: i32,
    /// Basic blocks; the first is the entry.
    pub blocks: Vec<NativeBlock>,
    /// Stack objects of this function, in order of first spill. Filled in by
    /// the register allocator.
    pub stack_slots: Vec<StackObject>,
}

impl NativeFunc {
    /// Create a function with no blocks.
    pub fn new(name: impl Into<String>, num_params: usize) -> Self {
        Self {
            name: name.into(),
            num_params,
            temp_used: num_params as i32,
            blocks: Vec::new(),
            stack_slots: Vec::new(),
        }
    }

    /// Mint a fresh virtual register.
    pub fn new_temp(&mut self) -> Temp {
        self.temp_used += 1;
        Temp::new(self.temp_used)
    }
}

impl fmt::Display for NativeFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.name)?;
        for block in &self.blocks {
            write!(f, "\n{}", block)?;
        }
        Ok(())
    }
}

/// A native program: an ordered list of functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeProg {
    /// Functions in program order.
    pub funcs: Vec<NativeFunc>,
}

impl NativeProg {
    /// Create a program from a list of functions.
    pub fn new(funcs: Vec<NativeFunc>) -> Self {
        Self { funcs }
    }
}

impl fmt::Display for NativeProg {
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

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use crate::regs::A0;

    #[test]
    fn test_assign_stack_offsets() {
        let mut objs = alloc::vec![StackObject::new(4), StackObject::new(4), StackObject::new(8)];
        let total = assign_stack_offsets(&mut objs);
        assert_eq!(total, 16);
        assert_eq!(objs[0].offset, Some(0));
        assert_eq!(objs[1].offset, Some(4));
        assert_eq!(objs[2].offset, Some(8));
    }

    #[test]
    fn test_assign_stack_offsets_empty() {
        assert_eq!(assign_stack_offsets(&mut []), 0);
    }

    #[test]
    fn test_new_temp_continues_counter() {
        let mut func = NativeFunc::new("f", 2);
        func.temp_used = 7;
        assert_eq!(func.new_temp(), Temp::new(8));
    }

    #[test]
    fn test_block_display() {
        let mut block = NativeBlock::new(".L1");
        block.push(NativeInst::LoadImm32 { dst: A0, value: 1 });
        block.push(NativeInst::NativeRet);
        assert_eq!(block.to_string(), ".L1:\n    li a0, 1\n    ret");
    }

    #[test]
    fn test_func_display() {
        let mut func = NativeFunc::new("main", 0);
        let mut block = NativeBlock::new(".L1");
        block.push(NativeInst::NativeRet);
        func.blocks.push(block);
        assert_eq!(func.to_string(), "main:\n.L1:\n    ret");
    }
}
