//! Final code emission: prologue/epilogue synthesis, stack frame
//! resolution, and branch finalisation.
//!
//! Runs once per function after register allocation has converged. The
//! prologue stores callee-saved registers at small negative offsets before
//! the conceptual SP adjustment, so those offsets always fit imm12. The
//! `SPAdd` pseudo-op itself is never materialised: it shifts the reference
//! frame (`sp_offset`) used to resolve every later stack pseudo-offset in
//! the function.

use alloc::{format, vec::Vec};
use core::cmp::Reverse;

use tac_ir::{BinaryOp, Label, Temp};

use crate::{
    inst::{is_imm12, CmpBranchOp, NativeInst},
    program::{assign_stack_offsets, NativeBlock, NativeFunc},
    regs::{is_callee_saved, A0, FP, MAX_SAVED_COUNT, RA, SP, T0, WORD_SIZE, ZERO},
};

/// Frame sizes from this bound up need a materialised immediate for the SP
/// adjustment.
const HUGE_FRAME: i32 = 2048;

/// Emits stack frames and lowers the remaining intermediate instructions
/// into their final forms.
pub struct AsmCodeEmitter {
    exit_label: Option<Label>,
}

impl AsmCodeEmitter {
    /// Create an emitter.
    pub fn new() -> Self {
        Self { exit_label: None }
    }

    /// Lower one allocated function to its final form.
    ///
    /// # Panics
    ///
    /// Panics if a `StackStore` reaches the emitter with an offset outside
    /// imm12 (the allocator pre-expands those), or if more than 13 registers
    /// would need saving.
    pub fn run(&mut self, func: &mut NativeFunc) {
        self.exit_label = None;
        self.emit_prologue_epilogue(func);
        self.replace_intermediate_instrs(func);
    }

    fn emit_prologue_epilogue(&mut self, func: &mut NativeFunc) {
        let mut is_leaf = true;
        let mut saved = alloc::collections::BTreeSet::new();
        for bb in &func.blocks {
            for instr in &bb.instrs {
                if matches!(instr, NativeInst::Call { .. }) {
                    is_leaf = false;
                }
                for r in instr.operands() {
                    if r == FP || is_callee_saved(r) {
                        saved.insert(r);
                    }
                }
            }
        }

        let mut saved_regs: Vec<Temp> = saved.into_iter().collect();
        saved_regs.sort_by_key(|r| Reverse(r.index()));
        if !is_leaf {
            saved_regs.insert(0, RA);
        }
        assert!(
            saved_regs.len() <= MAX_SAVED_COUNT,
            "{} registers to save exceeds the limit of {}",
            saved_regs.len(),
            MAX_SAVED_COUNT
        );

        let saved_regs_size = saved_regs.len() as i32 * WORD_SIZE;
        let stack_objs_size: i32 = func.stack_slots.iter().map(|obj| obj.size).sum();
        let frame_size = saved_regs_size + stack_objs_size;

        let is_huge_frame = frame_size >= HUGE_FRAME;
        let aux_reg = if is_huge_frame { Some(T0) } else { None };

        // saved_regs_size (<= 13 * 4) always fits imm12.
        let mut prologue = Vec::new();
        for (i, &reg) in saved_regs.iter().enumerate() {
            prologue.push(NativeInst::Store {
                src: reg,
                base: SP,
                offset: i as i32 * WORD_SIZE - saved_regs_size,
            });
        }
        if is_huge_frame {
            prologue.push(NativeInst::LoadImm32 {
                dst: T0,
                value: -frame_size,
            });
        }
        if frame_size > 0 {
            prologue.push(NativeInst::SPAdd {
                delta: -frame_size,
                src: aux_reg,
            });
        }

        let mut epilogue = Vec::new();
        if is_huge_frame {
            epilogue.push(NativeInst::LoadImm32 {
                dst: T0,
                value: frame_size,
            });
        }
        if frame_size > 0 {
            epilogue.push(NativeInst::SPAdd {
                delta: frame_size,
                src: aux_reg,
            });
        }
        for (i, &reg) in saved_regs.iter().enumerate() {
            epilogue.push(NativeInst::Load {
                dst: reg,
                base: SP,
                offset: i as i32 * WORD_SIZE - saved_regs_size,
            });
        }
        epilogue.push(NativeInst::NativeRet);

        // The first block is always the entry point.
        let entry_bb = &mut func.blocks[0];
        prologue.append(&mut entry_bb.instrs);
        entry_bb.instrs = prologue;

        if frame_size > 0 {
            let label = format!("{}.exit", func.name);
            let mut exit_bb = NativeBlock::new(label.clone());
            exit_bb.instrs = epilogue;
            func.blocks.push(exit_bb);
            self.exit_label = Some(label);
        }
    }

    /// Finalise the stack frame and rewrite the remaining intermediate
    /// instructions: stack pseudo-ops get concrete SP-relative offsets, and
    /// two-target branches become one conditional branch, possibly followed
    /// by a jump, exploiting fall-through to the textually next block.
    fn replace_intermediate_instrs(&mut self, func: &mut NativeFunc) {
        assign_stack_offsets(&mut func.stack_slots);

        let mut sp_offset: i32 = 0;
        for i in 0..func.blocks.len() {
            let next_label: Option<Label> = func.blocks.get(i + 1).map(|bb| bb.label.clone());
            let is_next = |label: &Label| next_label.as_ref() == Some(label);

            let instrs = core::mem::take(&mut func.blocks[i].instrs);
            let mut buf = Vec::with_capacity(instrs.len());
            for instr in instrs {
                match instr {
                    NativeInst::LoadStackAddr { dst, slot, offset } => {
                        let base = func.stack_slots[slot.index()]
                            .offset
                            .expect("stack slot offset assigned");
                        let eff = offset + base - sp_offset;
                        if is_imm12(eff) {
                            buf.push(NativeInst::AddI {
                                dst,
                                src: SP,
                                imm: eff,
                            });
                        } else {
                            buf.push(NativeInst::LoadImm32 { dst, value: eff });
                            buf.push(NativeInst::Binary {
                                op: BinaryOp::Add,
                                dst,
                                src1: SP,
                                src2: dst,
                            });
                        }
                    }

                    NativeInst::StackLoad { dst, slot, offset } => {
                        let base = func.stack_slots[slot.index()]
                            .offset
                            .expect("stack slot offset assigned");
                        let eff = offset + base - sp_offset;
                        if is_imm12(eff) {
                            buf.push(NativeInst::Load {
                                dst,
                                base: SP,
                                offset: eff,
                            });
                        } else {
                            buf.push(NativeInst::LoadImm32 { dst, value: eff });
                            buf.push(NativeInst::Binary {
                                op: BinaryOp::Add,
                                dst,
                                src1: SP,
                                src2: dst,
                            });
                            buf.push(NativeInst::Load {
                                dst,
                                base: dst,
                                offset: 0,
                            });
                        }
                    }

                    NativeInst::StackStore { src, slot, offset } => {
                        let base = func.stack_slots[slot.index()]
                            .offset
                            .expect("stack slot offset assigned");
                        let eff = offset + base - sp_offset;
                        assert!(is_imm12(eff), "stack store offset {} exceeds imm12", eff);
                        buf.push(NativeInst::Store {
                            src,
                            base: SP,
                            offset: eff,
                        });
                    }

                    // Not materialised: shifts the reference frame for all
                    // later stack pseudo-offsets.
                    NativeInst::SPAdd { delta, .. } => {
                        sp_offset += delta;
                    }

                    NativeInst::Jump { target } => {
                        if !is_next(&target) {
                            buf.push(NativeInst::Jump { target });
                        }
                    }

                    NativeInst::RegBranch {
                        cond,
                        false_target,
                        true_target,
                    } => {
                        if is_next(&false_target) {
                            buf.push(NativeInst::CmpBranch {
                                op: CmpBranchOp::Bne,
                                target: true_target,
                                src1: cond,
                                src2: ZERO,
                            });
                        } else if is_next(&true_target) {
                            buf.push(NativeInst::CmpBranch {
                                op: CmpBranchOp::Beq,
                                target: false_target,
                                src1: cond,
                                src2: ZERO,
                            });
                        } else {
                            buf.push(NativeInst::CmpBranch {
                                op: CmpBranchOp::Bne,
                                target: true_target,
                                src1: cond,
                                src2: ZERO,
                            });
                            buf.push(NativeInst::Jump {
                                target: false_target,
                            });
                        }
                    }

                    NativeInst::Return { value } => {
                        if let Some(v) = value {
                            buf.push(NativeInst::Move { dst: A0, src: v });
                        }
                        match &self.exit_label {
                            None => buf.push(NativeInst::NativeRet),
                            Some(exit) => {
                                if !is_next(exit) {
                                    buf.push(NativeInst::Jump {
                                        target: exit.clone(),
                                    });
                                }
                            }
                        }
                    }

                    other => buf.push(other),
                }
            }
            func.blocks[i].instrs = buf;
        }
    }
}

impl Default for AsmCodeEmitter {
    fn default() -> Self {
        Self::new()
    }
}
