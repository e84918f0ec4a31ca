//! Translation from TAC to the native instruction set.
//!
//! One pass per function. A fresh native block is allocated for every TAC
//! block up front, so terminator targets always name sibling blocks of the
//! new function. The pass is a pure rewiring step: it never mints temps and
//! never reorders instructions within a block.

use alloc::{collections::BTreeSet, vec::Vec};

use tac_ir::{TacFunc, TacInst, TacProg};

use crate::{
    inst::NativeInst,
    program::{NativeBlock, NativeFunc, NativeProg},
};

fn translate_inst(inst: &TacInst) -> NativeInst {
    match inst {
        TacInst::Assign { dst, src } => NativeInst::Move {
            dst: *dst,
            src: *src,
        },
        TacInst::LoadImm32 { dst, value } => NativeInst::LoadImm32 {
            dst: *dst,
            value: *value,
        },
        TacInst::Unary { op, dst, src } => NativeInst::Unary {
            op: *op,
            dst: *dst,
            src: *src,
        },
        TacInst::Binary {
            op,
            dst,
            src1,
            src2,
        } => NativeInst::Binary {
            op: *op,
            dst: *dst,
            src1: *src1,
            src2: *src2,
        },
        TacInst::Jump { target } => NativeInst::Jump {
            target: target.clone(),
        },
        TacInst::Branch {
            cond,
            false_target,
            true_target,
        } => NativeInst::RegBranch {
            cond: *cond,
            false_target: false_target.clone(),
            true_target: true_target.clone(),
        },
        TacInst::Return { value } => NativeInst::Return { value: *value },
        TacInst::Call { callee, dst, args } => NativeInst::Call {
            callee: callee.clone(),
            dst: *dst,
            args: args.clone(),
        },
        TacInst::Comment(msg) => NativeInst::Comment(msg.clone()),
    }
}

/// Translate a TAC function into a native function.
///
/// # Panics
///
/// Panics if a terminator targets a label that names no sibling block.
pub fn translate_function(tac_fn: &TacFunc) -> NativeFunc {
    let labels: BTreeSet<&str> = tac_fn.blocks.iter().map(|b| b.label.as_str()).collect();

    let mut native_fn = NativeFunc::new(tac_fn.name.clone(), tac_fn.num_params);
    native_fn.temp_used = tac_fn.temp_used;

    for src_bb in &tac_fn.blocks {
        let mut bb = NativeBlock::new(src_bb.label.clone());
        for inst in &src_bb.instrs {
            let native = translate_inst(inst);
            match &native {
                NativeInst::Jump { target } => {
                    assert!(
                        labels.contains(target.as_str()),
                        "jump targets unknown label {}",
                        target
                    );
                }
                NativeInst::RegBranch {
                    false_target,
                    true_target,
                    ..
                } => {
                    assert!(
                        labels.contains(false_target.as_str()),
                        "branch targets unknown label {}",
                        false_target
                    );
                    assert!(
                        labels.contains(true_target.as_str()),
                        "branch targets unknown label {}",
                        true_target
                    );
                }
                _ => {}
            }
            bb.push(native);
        }
        native_fn.blocks.push(bb);
    }
    native_fn
}

/// Translate a TAC program into a native program.
pub fn translate_program(prog: &TacProg) -> NativeProg {
    let funcs: Vec<NativeFunc> = prog.funcs.iter().map(translate_function).collect();
    NativeProg::new(funcs)
}

#[cfg(test)]
mod tests {
    use tac_builder::FunctionBuilder;
    use tac_ir::{BinaryOp, Temp};

    use super::*;

    #[test]
    fn test_translate_straight_line() {
        let mut b = FunctionBuilder::new("main", 0);
        b.create_block(".L1");
        let one = b.load_imm(1);
        let two = b.load_imm(2);
        let sum = b.binary(BinaryOp::Add, one, two);
        b.ret(Some(sum));

        let func = translate_function(&b.finish());
        assert_eq!(func.blocks.len(), 1);
        let instrs = &func.blocks[0].instrs;
        assert!(matches!(instrs[0], NativeInst::LoadImm32 { .. }));
        assert!(matches!(instrs[2], NativeInst::Binary { .. }));
        assert!(matches!(instrs[3], NativeInst::Return { .. }));
    }

    #[test]
    fn test_translate_branch_keeps_false_first() {
        let mut b = FunctionBuilder::new("f", 0);
        b.create_block(".L1");
        let c = b.load_imm(1);
        b.branch(c, ".L2", ".L3");
        b.create_block(".L2");
        b.ret(None);
        b.create_block(".L3");
        b.ret(None);

        let func = translate_function(&b.finish());
        assert_eq!(
            func.blocks[0].terminator().unwrap(),
            &NativeInst::RegBranch {
                cond: c,
                false_target: ".L2".into(),
                true_target: ".L3".into(),
            }
        );
    }

    #[test]
    fn test_translate_assign_becomes_move() {
        let mut b = FunctionBuilder::new("f", 1);
        let p = b.param(0);
        b.create_block(".L1");
        let t = b.new_temp();
        b.assign(t, p);
        b.ret(Some(t));

        let func = translate_function(&b.finish());
        assert_eq!(
            func.blocks[0].instrs[0],
            NativeInst::Move { dst: t, src: p }
        );
    }

    #[test]
    fn test_translate_carries_temp_counter() {
        let mut b = FunctionBuilder::new("f", 0);
        b.create_block(".L1");
        let t = b.load_imm(3);
        b.ret(Some(t));
        let tac_fn = b.finish();

        let mut func = translate_function(&tac_fn);
        assert_eq!(func.new_temp(), Temp::new(tac_fn.temp_used + 1));
    }

    #[test]
    #[should_panic(expected = "unknown label")]
    fn test_translate_unknown_target_panics() {
        let mut b = FunctionBuilder::new("f", 0);
        b.create_block(".L1");
        b.jump(".nowhere");
        translate_function(&b.finish());
    }
}
