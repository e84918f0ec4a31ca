//! Function builder.

use alloc::{string::String, vec::Vec};

use tac_ir::{BinaryOp, Label, TacBlock, TacFunc, TacInst, Temp, UnaryOp};

/// Builder for constructing a TAC function block by block.
///
/// Instructions are appended to the current block; `create_block` opens a
/// fresh one and makes it current. Parameters are the temps `_T1 .. _Tn`.
#[derive(Debug)]
pub struct FunctionBuilder {
    func: TacFunc,
    current: Option<usize>,
}

impl FunctionBuilder {
    /// Create a builder for a function with the given name and parameter
    /// count.
    pub fn new(name: impl Into<String>, num_params: usize) -> Self {
        Self {
            func: TacFunc::new(name, num_params),
            current: None,
        }
    }

    /// Get the temp bound to a parameter (0-based index).
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the parameter count.
    pub fn param(&self, index: usize) -> Temp {
        assert!(
            index < self.func.num_params,
            "parameter index {} out of range",
            index
        );
        Temp::new(index as i32 + 1)
    }

    /// Mint a fresh temp.
    pub fn new_temp(&mut self) -> Temp {
        self.func.new_temp()
    }

    /// Open a new block with the given label and make it current.
    pub fn create_block(&mut self, label: impl Into<Label>) -> usize {
        let index = self.func.add_block(TacBlock::new(label));
        self.current = Some(index);
        index
    }

    /// Make an existing block current.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not name a block.
    pub fn switch_to_block(&mut self, index: usize) {
        assert!(index < self.func.blocks.len(), "no block at index {}", index);
        self.current = Some(index);
    }

    fn emit(&mut self, inst: TacInst) {
        let index = self.current.expect("no current block");
        self.func.blocks[index].push(inst);
    }

    /// Emit `dst = value` and return the fresh destination temp.
    pub fn load_imm(&mut self, value: i32) -> Temp {
        let dst = self.new_temp();
        self.emit(TacInst::LoadImm32 { dst, value });
        dst
    }

    /// Emit `dst = src`.
    pub fn assign(&mut self, dst: Temp, src: Temp) {
        self.emit(TacInst::Assign { dst, src });
    }

    /// Emit `dst = op src` and return the fresh destination temp.
    pub fn unary(&mut self, op: UnaryOp, src: Temp) -> Temp {
        let dst = self.new_temp();
        self.emit(TacInst::Unary { op, dst, src });
        dst
    }

    /// Emit `dst = (src1 op src2)` and return the fresh destination temp.
    pub fn binary(&mut self, op: BinaryOp, src1: Temp, src2: Temp) -> Temp {
        let dst = self.new_temp();
        self.emit(TacInst::Binary {
            op,
            dst,
            src1,
            src2,
        });
        dst
    }

    /// Emit an unconditional jump.
    pub fn jump(&mut self, target: impl Into<Label>) {
        self.emit(TacInst::Jump {
            target: target.into(),
        });
    }

    /// Emit a two-target conditional branch (false target first).
    pub fn branch(
        &mut self,
        cond: Temp,
        false_target: impl Into<Label>,
        true_target: impl Into<Label>,
    ) {
        self.emit(TacInst::Branch {
            cond,
            false_target: false_target.into(),
            true_target: true_target.into(),
        });
    }

    /// Emit a return.
    pub fn ret(&mut self, value: Option<Temp>) {
        self.emit(TacInst::Return { value });
    }

    /// Emit `dst = callee(args)` and return the fresh destination temp.
    pub fn call(&mut self, callee: impl Into<String>, args: Vec<Temp>) -> Temp {
        let dst = self.new_temp();
        self.emit(TacInst::Call {
            callee: callee.into(),
            dst,
            args,
        });
        dst
    }

    /// Emit an annotation.
    pub fn comment(&mut self, msg: impl Into<String>) {
        self.emit(TacInst::Comment(msg.into()));
    }

    /// Finish building and return the function.
    pub fn finish(self) -> TacFunc {
        self.func
    }
}
