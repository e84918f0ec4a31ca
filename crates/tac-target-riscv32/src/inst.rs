//! Native instructions.
//!
//! The native instruction set covers what the translator produces from TAC,
//! the stack pseudo-ops introduced by the register allocator, and the final
//! forms the emitter lowers everything into. Every variant enumerates its
//! defined and used registers through [`NativeInst::defs`] and
//! [`NativeInst::uses`], including registers held in variant-specific
//! fields; [`NativeInst::replace_operand`] substitutes across all of them at
//! once.

use alloc::{string::String, vec, vec::Vec};
use core::fmt;

use tac_ir::{BinaryOp, Label, Temp, UnaryOp};

use crate::{program::StackSlot, regs::reg_name};

/// Whether `imm` fits a 12-bit signed immediate.
pub fn is_imm12(imm: i32) -> bool {
    (-2048..2048).contains(&imm)
}

/// Comparison kinds of the final one-target branch form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpBranchOp {
    Beq,
    Bne,
    Blt,
    Bge,
}

impl CmpBranchOp {
    /// Get the mnemonic for this branch.
    pub fn mnemonic(self) -> &'static str {
        match self {
            CmpBranchOp::Beq => "beq",
            CmpBranchOp::Bne => "bne",
            CmpBranchOp::Blt => "blt",
            CmpBranchOp::Bge => "bge",
        }
    }
}

impl fmt::Display for CmpBranchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A native instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeInst {
    /// Load a 32-bit immediate: `li dst, value`
    LoadImm32 { dst: Temp, value: i32 },
    /// Register move: `mv dst, src`
    Move { dst: Temp, src: Temp },
    /// Unary operation: `neg/not/seqz dst, src`
    Unary { op: UnaryOp, dst: Temp, src: Temp },
    /// Binary operation: `add/sub/... dst, src1, src2`
    Binary {
        op: BinaryOp,
        dst: Temp,
        src1: Temp,
        src2: Temp,
    },
    /// Add immediate: `addi dst, src, imm` (imm must fit imm12 when printed)
    AddI { dst: Temp, src: Temp, imm: i32 },
    /// Word load: `lw dst, offset(base)`
    Load { dst: Temp, base: Temp, offset: i32 },
    /// Word store: `sw src, offset(base)`
    Store { src: Temp, base: Temp, offset: i32 },

    /// Materialise the address of a stack slot. Resolved by the emitter once
    /// frame layout is known.
    LoadStackAddr {
        dst: Temp,
        slot: StackSlot,
        offset: i32,
    },
    /// Load a word from a stack slot.
    StackLoad {
        dst: Temp,
        slot: StackSlot,
        offset: i32,
    },
    /// Store a word to a stack slot.
    StackStore {
        src: Temp,
        slot: StackSlot,
        offset: i32,
    },
    /// Adjust the stack pointer by `delta`. Carries an auxiliary register
    /// when `delta` does not fit imm12. SP itself is not in the defs/uses
    /// lists.
    SPAdd { delta: i32, src: Option<Temp> },

    /// Unconditional jump to a sibling block.
    Jump { target: Label },
    /// Intermediate two-target branch; must not survive to final code. The
    /// false target comes first (it is the fall-through candidate).
    RegBranch {
        cond: Temp,
        false_target: Label,
        true_target: Label,
    },
    /// Final one-target conditional branch: `beq/bne/blt/bge src1, src2, target`
    CmpBranch {
        op: CmpBranchOp,
        target: Label,
        src1: Temp,
        src2: Temp,
    },
    /// Return from subroutine: `ret`
    NativeRet,

    /// TAC return carried through translation, lowered by the emitter.
    Return { value: Option<Temp> },
    /// TAC call carried through; lowering is external to the backend.
    Call {
        callee: String,
        dst: Temp,
        args: Vec<Temp>,
    },
    /// Annotation carried through for debugging.
    Comment(String),
}

impl NativeInst {
    /// Get the registers written by this instruction.
    pub fn defs(&self) -> Vec<Temp> {
        match self {
            NativeInst::LoadImm32 { dst, .. }
            | NativeInst::Move { dst, .. }
            | NativeInst::Unary { dst, .. }
            | NativeInst::Binary { dst, .. }
            | NativeInst::AddI { dst, .. }
            | NativeInst::Load { dst, .. }
            | NativeInst::LoadStackAddr { dst, .. }
            | NativeInst::StackLoad { dst, .. }
            | NativeInst::Call { dst, .. } => vec![*dst],
            NativeInst::Store { .. }
            | NativeInst::StackStore { .. }
            | NativeInst::SPAdd { .. }
            | NativeInst::Jump { .. }
            | NativeInst::RegBranch { .. }
            | NativeInst::CmpBranch { .. }
            | NativeInst::NativeRet
            | NativeInst::Return { .. }
            | NativeInst::Comment(_) => Vec::new(),
        }
    }

    /// Get the registers read by this instruction.
    pub fn uses(&self) -> Vec<Temp> {
        match self {
            NativeInst::Move { src, .. }
            | NativeInst::Unary { src, .. }
            | NativeInst::AddI { src, .. } => vec![*src],
            NativeInst::Binary { src1, src2, .. } => vec![*src1, *src2],
            NativeInst::Load { base, .. } => vec![*base],
            NativeInst::Store { src, base, .. } => vec![*src, *base],
            NativeInst::StackStore { src, .. } => vec![*src],
            NativeInst::SPAdd { src, .. } => src.iter().copied().collect(),
            NativeInst::RegBranch { cond, .. } => vec![*cond],
            NativeInst::CmpBranch { src1, src2, .. } => vec![*src1, *src2],
            NativeInst::Return { value } => value.iter().copied().collect(),
            NativeInst::Call { args, .. } => args.clone(),
            NativeInst::LoadImm32 { .. }
            | NativeInst::LoadStackAddr { .. }
            | NativeInst::StackLoad { .. }
            | NativeInst::Jump { .. }
            | NativeInst::NativeRet
            | NativeInst::Comment(_) => Vec::new(),
        }
    }

    /// Get all register operands (defs followed by uses).
    pub fn operands(&self) -> Vec<Temp> {
        let mut regs = self.defs();
        regs.extend(self.uses());
        regs
    }

    /// Substitute every occurrence of `old` with `new`, across defs, uses
    /// and variant fields.
    pub fn replace_operand(&mut self, old: Temp, new: Temp) {
        let sub = |r: &mut Temp| {
            if *r == old {
                *r = new;
            }
        };
        match self {
            NativeInst::LoadImm32 { dst, .. }
            | NativeInst::LoadStackAddr { dst, .. }
            | NativeInst::StackLoad { dst, .. } => sub(dst),
            NativeInst::Move { dst, src } | NativeInst::Unary { dst, src, .. } => {
                sub(dst);
                sub(src);
            }
            NativeInst::Binary {
                dst, src1, src2, ..
            } => {
                sub(dst);
                sub(src1);
                sub(src2);
            }
            NativeInst::AddI { dst, src, .. } => {
                sub(dst);
                sub(src);
            }
            NativeInst::Load { dst, base, .. } => {
                sub(dst);
                sub(base);
            }
            NativeInst::Store { src, base, .. } => {
                sub(src);
                sub(base);
            }
            NativeInst::StackStore { src, .. } => sub(src),
            NativeInst::SPAdd { src, .. } => {
                if let Some(r) = src {
                    sub(r);
                }
            }
            NativeInst::RegBranch { cond, .. } => sub(cond),
            NativeInst::CmpBranch { src1, src2, .. } => {
                sub(src1);
                sub(src2);
            }
            NativeInst::Return { value } => {
                if let Some(r) = value {
                    sub(r);
                }
            }
            NativeInst::Call { dst, args, .. } => {
                sub(dst);
                for arg in args {
                    sub(arg);
                }
            }
            NativeInst::Jump { .. } | NativeInst::NativeRet | NativeInst::Comment(_) => {}
        }
    }

    /// Whether this instruction ends a basic block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            NativeInst::Jump { .. }
                | NativeInst::RegBranch { .. }
                | NativeInst::CmpBranch { .. }
                | NativeInst::NativeRet
                | NativeInst::Return { .. }
        )
    }
}

/// Formats a register operand: ABI name for physical, `v{n}` for virtual.
struct Reg(Temp);

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_virtual() {
            write!(f, "v{}", self.0.index())
        } else {
            f.write_str(reg_name(self.0))
        }
    }
}

impl fmt::Display for NativeInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeInst::LoadImm32 { dst, value } => write!(f, "li {}, {}", Reg(*dst), value),
            NativeInst::Move { dst, src } => write!(f, "mv {}, {}", Reg(*dst), Reg(*src)),
            NativeInst::Unary { op, dst, src } => {
                write!(f, "{} {}, {}", op, Reg(*dst), Reg(*src))
            }
            NativeInst::Binary {
                op,
                dst,
                src1,
                src2,
            } => write!(f, "{} {}, {}, {}", op, Reg(*dst), Reg(*src1), Reg(*src2)),
            NativeInst::AddI { dst, src, imm } => {
                write!(f, "addi {}, {}, {}", Reg(*dst), Reg(*src), imm)
            }
            NativeInst::Load { dst, base, offset } => {
                write!(f, "lw {}, {}({})", Reg(*dst), offset, Reg(*base))
            }
            NativeInst::Store { src, base, offset } => {
                write!(f, "sw {}, {}({})", Reg(*src), offset, Reg(*base))
            }
            NativeInst::LoadStackAddr { dst, slot, offset } => {
                write!(f, "load-addr {}, stack[{}]+{}", Reg(*dst), slot.index(), offset)
            }
            NativeInst::StackLoad { dst, slot, offset } => {
                write!(f, "lw {}, stack[{}]+{}", Reg(*dst), slot.index(), offset)
            }
            NativeInst::StackStore { src, slot, offset } => {
                write!(f, "sw {}, stack[{}]+{}", Reg(*src), slot.index(), offset)
            }
            NativeInst::SPAdd { delta, src: None } => write!(f, "sp-add {}", delta),
            NativeInst::SPAdd {
                delta,
                src: Some(r),
            } => write!(f, "sp-add {} ({})", delta, Reg(*r)),
            NativeInst::Jump { target } => write!(f, "j {}", target),
            NativeInst::RegBranch {
                cond,
                false_target,
                true_target,
            } => write!(f, "br {}, {}, {}", Reg(*cond), false_target, true_target),
            NativeInst::CmpBranch {
                op,
                target,
                src1,
                src2,
            } => write!(f, "{} {}, {}, {}", op, Reg(*src1), Reg(*src2), target),
            NativeInst::NativeRet => f.write_str("ret"),
            NativeInst::Return { value: None } => f.write_str("return"),
            NativeInst::Return { value: Some(v) } => write!(f, "return {}", Reg(*v)),
            NativeInst::Call { callee, dst, args } => {
                write!(f, "{} = call %{}(", Reg(*dst), callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", Reg(*arg))?;
                }
                f.write_str(")")
            }
            NativeInst::Comment(msg) => write!(f, "# {}", msg),
        }
    }
}
