//! TAC instructions.

use alloc::{string::String, vec, vec::Vec};
use core::fmt;

use crate::{block::Label, temp::Temp};

/// Kinds of unary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation
    Neg,
    /// Bitwise not
    Not,
    /// Set if equal to zero
    Seqz,
}

impl UnaryOp {
    /// Get the mnemonic for this operation.
    pub fn mnemonic(self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Not => "not",
            UnaryOp::Seqz => "seqz",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Kinds of binary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Equ,
    Neq,
    Slt,
    Leq,
    Sgt,
    Geq,
    And,
    Or,
}

impl BinaryOp {
    /// Get the mnemonic for this operation.
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Rem => "rem",
            BinaryOp::Equ => "equ",
            BinaryOp::Neq => "neq",
            BinaryOp::Slt => "slt",
            BinaryOp::Leq => "leq",
            BinaryOp::Sgt => "sgt",
            BinaryOp::Geq => "geq",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    /// Get the infix symbol used in the TAC text form.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Equ => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Slt => "<",
            BinaryOp::Leq => "<=",
            BinaryOp::Sgt => ">",
            BinaryOp::Geq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A TAC instruction.
///
/// Terminators (`Jump`, `Branch`, `Return`) reference sibling blocks by
/// label; every well-formed block ends with exactly one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TacInst {
    /// Copy: dst = src
    Assign { dst: Temp, src: Temp },
    /// Load a 32-bit immediate: dst = value
    LoadImm32 { dst: Temp, value: i32 },
    /// Unary operation: dst = op src
    Unary { op: UnaryOp, dst: Temp, src: Temp },
    /// Binary operation: dst = src1 op src2
    Binary {
        op: BinaryOp,
        dst: Temp,
        src1: Temp,
        src2: Temp,
    },
    /// Unconditional jump to a sibling block.
    Jump { target: Label },
    /// Two-target conditional branch. The false target comes first: it is
    /// the fall-through candidate during final branch lowering.
    Branch {
        cond: Temp,
        false_target: Label,
        true_target: Label,
    },
    /// Return, with an optional value.
    Return { value: Option<Temp> },
    /// Function call: dst = callee(args). Lowering of the call itself is
    /// outside the backend; the instruction is carried through.
    Call {
        callee: String,
        dst: Temp,
        args: Vec<Temp>,
    },
    /// Annotation carried through for debugging.
    Comment(String),
}

impl TacInst {
    /// Get the temps written by this instruction.
    pub fn defs(&self) -> Vec<Temp> {
        match self {
            TacInst::Assign { dst, .. }
            | TacInst::LoadImm32 { dst, .. }
            | TacInst::Unary { dst, .. }
            | TacInst::Binary { dst, .. }
            | TacInst::Call { dst, .. } => vec![*dst],
            TacInst::Jump { .. }
            | TacInst::Branch { .. }
            | TacInst::Return { .. }
            | TacInst::Comment(_) => Vec::new(),
        }
    }

    /// Get the temps read by this instruction.
    pub fn uses(&self) -> Vec<Temp> {
        match self {
            TacInst::Assign { src, .. } | TacInst::Unary { src, .. } => vec![*src],
            TacInst::Binary { src1, src2, .. } => vec![*src1, *src2],
            TacInst::Branch { cond, .. } => vec![*cond],
            TacInst::Return { value } => value.iter().copied().collect(),
            TacInst::Call { args, .. } => args.clone(),
            TacInst::LoadImm32 { .. } | TacInst::Jump { .. } | TacInst::Comment(_) => Vec::new(),
        }
    }

    /// Whether this instruction ends a basic block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            TacInst::Jump { .. } | TacInst::Branch { .. } | TacInst::Return { .. }
        )
    }
}

impl fmt::Display for TacInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TacInst::Assign { dst, src } => write!(f, "{} = {}", dst, src),
            TacInst::LoadImm32 { dst, value } => write!(f, "{} = {}", dst, value),
            TacInst::Unary { op, dst, src } => write!(f, "{} = {} {}", dst, op, src),
            TacInst::Binary {
                op,
                dst,
                src1,
                src2,
            } => write!(f, "{} = ({} {} {})", dst, src1, op.symbol(), src2),
            TacInst::Jump { target } => write!(f, "jump {}", target),
            TacInst::Branch {
                cond,
                false_target,
                true_target,
            } => write!(f, "br {}, {}, {}", cond, false_target, true_target),
            TacInst::Return { value: None } => f.write_str("return"),
            TacInst::Return { value: Some(v) } => write!(f, "return {}", v),
            TacInst::Call { callee, dst, args } => {
                write!(f, "{} = call %{}(", dst, callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            TacInst::Comment(msg) => write!(f, "# {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_binary_defs_uses() {
        let inst = TacInst::Binary {
            op: BinaryOp::Add,
            dst: Temp::new(3),
            src1: Temp::new(1),
            src2: Temp::new(2),
        };
        assert_eq!(inst.defs(), vec![Temp::new(3)]);
        assert_eq!(inst.uses(), vec![Temp::new(1), Temp::new(2)]);
        assert!(!inst.is_terminator());
    }

    #[test]
    fn test_return_uses() {
        assert_eq!(TacInst::Return { value: None }.uses(), Vec::new());
        let ret = TacInst::Return {
            value: Some(Temp::new(1)),
        };
        assert_eq!(ret.uses(), vec![Temp::new(1)]);
        assert!(ret.is_terminator());
    }

    #[test]
    fn test_call_defs_uses() {
        let call = TacInst::Call {
            callee: "f".to_string(),
            dst: Temp::new(4),
            args: vec![Temp::new(1), Temp::new(2)],
        };
        assert_eq!(call.defs(), vec![Temp::new(4)]);
        assert_eq!(call.uses(), vec![Temp::new(1), Temp::new(2)]);
    }

    #[test]
    fn test_display() {
        let inst = TacInst::Binary {
            op: BinaryOp::Slt,
            dst: Temp::new(3),
            src1: Temp::new(1),
            src2: Temp::new(2),
        };
        assert_eq!(inst.to_string(), "_T3 = (_T1 < _T2)");

        let br = TacInst::Branch {
            cond: Temp::new(1),
            false_target: ".L1".to_string(),
            true_target: ".L2".to_string(),
        };
        assert_eq!(br.to_string(), "br _T1, .L1, .L2");
    }
}
