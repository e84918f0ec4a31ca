//! Temporary variables.
//!
//! Temps serve as the operands of both TAC instructions and native assembly
//! instructions.

use core::fmt;

/// An integer-indexed instruction operand.
///
/// Indices greater than zero denote virtual registers, minted from a
/// per-function counter. Indices less than or equal to zero denote physical
/// registers; the mapping to concrete machine registers belongs to the
/// backend. Temps compare by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Temp(i32);

impl Temp {
    /// Create a temp with the given index.
    pub const fn new(index: i32) -> Self {
        Self(index)
    }

    /// Get the index of this temp.
    pub const fn index(self) -> i32 {
        self.0
    }

    /// Whether this temp is a virtual register.
    pub const fn is_virtual(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_T{}", self.0)
    }
}
