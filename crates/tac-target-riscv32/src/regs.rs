//! RISC-V 32-bit general-purpose registers.
//!
//! Physical registers reuse the `Temp` operand type with non-positive
//! indices: register `xN` is `Temp::new(-N)`. Virtual registers keep their
//! positive indices, so the two kinds mix freely inside instructions and
//! liveness sets.

use tac_ir::Temp;

/// Word and pointer size for this target, in bytes.
pub const WORD_SIZE: i32 = 4;

/// Get the physical register for a register file index (0-31).
pub const fn phys_reg(num: i32) -> Temp {
    Temp::new(-num)
}

pub const ZERO: Temp = phys_reg(0);
/// Return address.
pub const RA: Temp = phys_reg(1);
/// Stack pointer.
pub const SP: Temp = phys_reg(2);
/// Global pointer.
pub const GP: Temp = phys_reg(3);
/// Thread pointer.
pub const TP: Temp = phys_reg(4);
pub const T0: Temp = phys_reg(5);
pub const T1: Temp = phys_reg(6);
pub const T2: Temp = phys_reg(7);
/// Frame pointer; reserved, never allocated.
pub const FP: Temp = phys_reg(8);
pub const S1: Temp = phys_reg(9);
pub const A0: Temp = phys_reg(10);
pub const A1: Temp = phys_reg(11);
pub const A2: Temp = phys_reg(12);
pub const A3: Temp = phys_reg(13);
pub const A4: Temp = phys_reg(14);
pub const A5: Temp = phys_reg(15);
pub const A6: Temp = phys_reg(16);
pub const A7: Temp = phys_reg(17);
pub const S2: Temp = phys_reg(18);
pub const S3: Temp = phys_reg(19);
pub const S4: Temp = phys_reg(20);
pub const S5: Temp = phys_reg(21);
pub const S6: Temp = phys_reg(22);
pub const S7: Temp = phys_reg(23);
pub const S8: Temp = phys_reg(24);
pub const S9: Temp = phys_reg(25);
pub const S10: Temp = phys_reg(26);
pub const S11: Temp = phys_reg(27);
pub const T3: Temp = phys_reg(28);
pub const T4: Temp = phys_reg(29);
pub const T5: Temp = phys_reg(30);
pub const T6: Temp = phys_reg(31);

/// Caller-saved registers usable by the allocator.
pub const CALLER_SAVED: [Temp; 15] = [
    T0, T1, T2, T3, T4, T5, T6, A0, A1, A2, A3, A4, A5, A6, A7,
];

/// Callee-saved registers usable by the allocator. FP is excluded.
pub const CALLEE_SAVED: [Temp; 11] = [S1, S2, S3, S4, S5, S6, S7, S8, S9, S10, S11];

/// All allocatable registers, caller-saved first. The fixed order here is
/// also the scan order of the allocator's free-register search.
pub const ALLOCATABLE: [Temp; 26] = [
    T0, T1, T2, T3, T4, T5, T6, A0, A1, A2, A3, A4, A5, A6, A7, S1, S2, S3, S4, S5, S6, S7, S8,
    S9, S10, S11,
];

/// Argument registers in ABI order.
pub const ARG_REGS: [Temp; 8] = [A0, A1, A2, A3, A4, A5, A6, A7];

/// Number of registers in the file.
pub const REG_COUNT: i32 = 32;

/// Upper bound on registers saved in a prologue (ra plus s0-s11).
pub const MAX_SAVED_COUNT: usize = 13;

/// ABI names, indexed by register file index.
const GPR_NAMES: [&str; 32] = [
    "x0", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "fp", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Get the ABI name for a physical register.
///
/// # Panics
///
/// Panics if `r` is a virtual register or outside the register file.
pub fn reg_name(r: Temp) -> &'static str {
    assert!(!r.is_virtual(), "no ABI name for virtual register {}", r);
    let i = -r.index();
    assert!(i < REG_COUNT, "register index {} out of range", i);
    GPR_NAMES[i as usize]
}

/// Whether `r` is one of the callee-saved allocatable registers.
pub fn is_callee_saved(r: Temp) -> bool {
    CALLEE_SAVED.contains(&r)
}
