//! Live-variable analysis.
//!
//! Backward dataflow to a fixed point over the control-flow graph, with the
//! standard live-variable equations:
//!
//! ```text
//! live_out(B) = union of live_in(S) over successors S
//! live_in(B)  = live_use(B) ∪ (live_out(B) \ define(B))
//! ```
//!
//! `define(B)` is every register written in B; the order-sensitive exclusion
//! is baked into `live_use(B)`, which holds registers read in B before any
//! write. Sets are monotone and finite, so iteration terminates.
//!
//! The sets contain physical registers as well as virtual ones: `defs()` and
//! `uses()` enumerate every register operand, and the allocator relies on
//! physical liveness to know which registers it must not hand out.

use alloc::{collections::BTreeSet, vec, vec::Vec};

use tac_ir::Temp;

use crate::{cfg::ControlFlowGraph, program::NativeFunc};

/// Per-block liveness sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLiveness {
    /// Registers written anywhere in the block.
    pub define: BTreeSet<Temp>,
    /// Registers read in the block before any write to them.
    pub live_use: BTreeSet<Temp>,
    /// Registers live at block entry.
    pub live_in: BTreeSet<Temp>,
    /// Registers live at block exit.
    pub live_out: BTreeSet<Temp>,
}

/// Per-instruction liveness sequences for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstLiveness {
    /// Live set just before each instruction.
    pub live_in_seqs: Vec<BTreeSet<Temp>>,
    /// Live set just after each instruction.
    pub live_out_seqs: Vec<BTreeSet<Temp>>,
}

/// Compute per-block liveness for a function.
pub fn compute_block_liveness(func: &NativeFunc, cfg: &ControlFlowGraph) -> Vec<BlockLiveness> {
    let mut res: Vec<BlockLiveness> = Vec::with_capacity(func.blocks.len());

    // define and live_use do not change during the iterations.
    for bb in &func.blocks {
        let mut define = BTreeSet::new();
        let mut live_use = BTreeSet::new();
        for instr in &bb.instrs {
            for u in instr.uses() {
                if !define.contains(&u) {
                    live_use.insert(u);
                }
            }
            define.extend(instr.defs());
        }
        res.push(BlockLiveness {
            define,
            live_in: live_use.clone(),
            live_use,
            live_out: BTreeSet::new(),
        });
    }

    // Iterate in forward block order until no live_in grows.
    let mut changed = true;
    while changed {
        changed = false;
        for i in 0..res.len() {
            let mut live_out = core::mem::take(&mut res[i].live_out);
            for &j in cfg.succ(i) {
                live_out.extend(res[j].live_in.iter().copied());
            }
            res[i].live_out = live_out;

            let before = res[i].live_in.len();
            let grown: Vec<Temp> = res[i]
                .live_out
                .difference(&res[i].define)
                .copied()
                .collect();
            res[i].live_in.extend(grown);
            if res[i].live_in.len() != before {
                changed = true;
            }
        }
    }
    res
}

/// Compute per-block and per-instruction liveness for a function.
///
/// The per-instruction sets are obtained by walking each block backwards
/// from its `live_out`.
pub fn compute_inst_liveness(
    func: &NativeFunc,
    cfg: &ControlFlowGraph,
) -> (Vec<BlockLiveness>, Vec<InstLiveness>) {
    let blocks = compute_block_liveness(func, cfg);

    let mut inst_levels = Vec::with_capacity(func.blocks.len());
    for (i, bb) in func.blocks.iter().enumerate() {
        let n = bb.instrs.len();
        let mut live_in_seqs = vec![BTreeSet::new(); n];
        let mut live_out_seqs = vec![BTreeSet::new(); n];

        let mut live = blocks[i].live_out.clone();
        for (j, instr) in bb.instrs.iter().enumerate().rev() {
            live_out_seqs[j] = live.clone();
            for d in instr.defs() {
                live.remove(&d);
            }
            live.extend(instr.uses());
            live_in_seqs[j] = live.clone();
        }
        inst_levels.push(InstLiveness {
            live_in_seqs,
            live_out_seqs,
        });
    }
    (blocks, inst_levels)
}

#[cfg(test)]
mod tests {
    use tac_builder::FunctionBuilder;
    use tac_ir::BinaryOp;

    use super::*;
    use crate::translate::translate_function;

    fn analyze(b: FunctionBuilder) -> (NativeFunc, Vec<BlockLiveness>, Vec<InstLiveness>) {
        let func = translate_function(&b.finish());
        let cfg = ControlFlowGraph::compute(&func);
        let (blocks, insts) = compute_inst_liveness(&func, &cfg);
        (func, blocks, insts)
    }

    #[test]
    fn test_straight_line() {
        let mut b = FunctionBuilder::new("main", 0);
        b.create_block(".L1");
        let one = b.load_imm(1);
        let two = b.load_imm(2);
        let sum = b.binary(BinaryOp::Add, one, two);
        b.ret(Some(sum));

        let (_, blocks, insts) = analyze(b);

        assert!(blocks[0].live_in.is_empty());
        assert!(blocks[0].live_out.is_empty());
        assert_eq!(blocks[0].define.len(), 3);

        // After the first li, only _T1 is live; after the add, only _T3.
        let il = &insts[0];
        assert!(il.live_out_seqs[0].contains(&one));
        assert!(!il.live_out_seqs[0].contains(&two));
        assert_eq!(il.live_out_seqs[2].len(), 1);
        assert!(il.live_out_seqs[2].contains(&sum));
        assert!(il.live_out_seqs[3].is_empty());
    }

    #[test]
    fn test_value_live_across_blocks() {
        let mut b = FunctionBuilder::new("f", 0);
        b.create_block(".L1");
        let x = b.load_imm(7);
        let c = b.load_imm(1);
        b.branch(c, ".L2", ".L3");
        b.create_block(".L2");
        b.ret(Some(x));
        b.create_block(".L3");
        b.ret(None);

        let (_, blocks, _) = analyze(b);

        // x is live out of .L1 (used in .L2) and live into .L2 only.
        assert!(blocks[0].live_out.contains(&x));
        assert!(blocks[1].live_in.contains(&x));
        assert!(!blocks[2].live_in.contains(&x));
        assert!(blocks[1].live_use.contains(&x));
    }

    #[test]
    fn test_loop_keeps_value_live() {
        let mut b = FunctionBuilder::new("f", 0);
        b.create_block(".L1");
        let x = b.load_imm(0);
        b.jump(".L2");
        b.create_block(".L2");
        let c = b.binary(BinaryOp::Slt, x, x);
        b.branch(c, ".L2", ".L3");
        b.create_block(".L3");
        b.ret(Some(x));

        let (_, blocks, _) = analyze(b);

        // x is live around the back edge of .L2.
        assert!(blocks[1].live_in.contains(&x));
        assert!(blocks[1].live_out.contains(&x));
    }

    #[test]
    fn test_live_in_superset_of_live_use() {
        let mut b = FunctionBuilder::new("f", 0);
        b.create_block(".L1");
        let x = b.load_imm(1);
        let y = b.load_imm(2);
        b.branch(x, ".L2", ".L3");
        b.create_block(".L2");
        let z = b.binary(BinaryOp::Mul, y, y);
        b.ret(Some(z));
        b.create_block(".L3");
        b.ret(Some(y));

        let func = translate_function(&b.finish());
        let cfg = ControlFlowGraph::compute(&func);
        let blocks = compute_block_liveness(&func, &cfg);

        for (i, bl) in blocks.iter().enumerate() {
            assert!(
                bl.live_in.is_superset(&bl.live_use),
                "block {} violates live_in ⊇ live_use",
                i
            );
            for &j in cfg.succ(i) {
                assert!(
                    bl.live_out.is_superset(&blocks[j].live_in),
                    "block {} live_out misses successor {} live_in",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn test_fixed_point_is_stable() {
        let mut b = FunctionBuilder::new("f", 0);
        b.create_block(".L1");
        let x = b.load_imm(0);
        b.jump(".L2");
        b.create_block(".L2");
        let c = b.binary(BinaryOp::Slt, x, x);
        b.branch(c, ".L2", ".L3");
        b.create_block(".L3");
        b.ret(Some(x));

        let func = translate_function(&b.finish());
        let cfg = ControlFlowGraph::compute(&func);
        let first = compute_block_liveness(&func, &cfg);
        let second = compute_block_liveness(&func, &cfg);
        assert_eq!(first, second);
    }

    #[test]
    fn test_inst_level_def_kills_use_revives() {
        let mut b = FunctionBuilder::new("f", 1);
        let p = b.param(0);
        b.create_block(".L1");
        let t = b.binary(BinaryOp::Add, p, p);
        b.ret(Some(t));

        let (_, _, insts) = analyze(b);
        let il = &insts[0];
        // Before the add, the parameter is live; after it, only the result.
        assert!(il.live_in_seqs[0].contains(&p));
        assert!(!il.live_out_seqs[0].contains(&p));
        assert!(il.live_out_seqs[0].contains(&t));
    }
}
