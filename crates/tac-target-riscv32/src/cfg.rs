//! Control-flow graph over a function's blocks.

use alloc::{collections::BTreeMap, string::String, vec, vec::Vec};

use crate::{inst::NativeInst, program::NativeFunc};

/// Successor/predecessor adjacency lists over block indices, derived
/// strictly from block terminators. Edge order follows insertion order and
/// is stable; for a two-target branch the false edge comes first.
pub struct ControlFlowGraph {
    succs: Vec<Vec<usize>>,
    preds: Vec<Vec<usize>>,
}

impl ControlFlowGraph {
    /// Build the graph for a function.
    ///
    /// # Panics
    ///
    /// Panics if two blocks share a label or a terminator targets an unknown
    /// label.
    pub fn compute(func: &NativeFunc) -> Self {
        let mut label_to_idx: BTreeMap<&str, usize> = BTreeMap::new();
        for (i, bb) in func.blocks.iter().enumerate() {
            let prev = label_to_idx.insert(bb.label.as_str(), i);
            assert!(prev.is_none(), "duplicate block label {}", bb.label);
        }

        let resolve = |label: &String| -> usize {
            *label_to_idx
                .get(label.as_str())
                .unwrap_or_else(|| panic!("terminator targets unknown label {}", label))
        };

        let mut cfg = Self {
            succs: vec![Vec::new(); func.blocks.len()],
            preds: vec![Vec::new(); func.blocks.len()],
        };

        for (i, bb) in func.blocks.iter().enumerate() {
            match bb.terminator() {
                Some(NativeInst::Jump { target }) => {
                    cfg.add_edge(i, resolve(target));
                }
                Some(NativeInst::RegBranch {
                    false_target,
                    true_target,
                    ..
                }) => {
                    cfg.add_edge(i, resolve(false_target));
                    cfg.add_edge(i, resolve(true_target));
                }
                // Return, NativeRet and non-terminators have no out-edges.
                _ => {}
            }
        }
        cfg
    }

    fn add_edge(&mut self, u: usize, v: usize) {
        self.succs[u].push(v);
        self.preds[v].push(u);
    }

    /// Number of blocks covered by the graph.
    pub fn len(&self) -> usize {
        self.succs.len()
    }

    /// Whether the graph covers no blocks.
    pub fn is_empty(&self) -> bool {
        self.succs.is_empty()
    }

    /// Successors of block `i`.
    pub fn succ(&self, i: usize) -> &[usize] {
        &self.succs[i]
    }

    /// Predecessors of block `i`.
    pub fn pred(&self, i: usize) -> &[usize] {
        &self.preds[i]
    }
}
