//! Components relating to the syntax trees used in representing assembly source.
//!
//! This module holds:
//! - [`Reg`], a register number (with named constants in [`reg_consts`]),
//! - and [`asm`], which contains the syntax nodes produced by the parser.

pub mod asm;

use std::num::TryFromIntError;

use crate::isa::REGISTER_NAMES;

/// A register. Must be between 0 and 31.
///
/// This `Reg` struct can either be constructed by selecting a register from [`reg_consts`],
/// or by using [`Reg::try_from`].
///
/// ## Examples
///
/// ```text
/// add $t0, $t1, $t2
///     ~~~  ~~~  ~~~
/// lw $s0, 4($sp)
///    ~~~    ~~~
/// jr $31
///    ~~~
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct Reg(pub(crate) u8);

/// Register constants, by conventional name.
pub mod reg_consts {
    use super::Reg;

    /// Hardwired zero.
    pub const ZERO: Reg = Reg(0);
    /// Assembler temporary.
    pub const AT: Reg = Reg(1);
    /// First value register (holds the syscall number).
    pub const V0: Reg = Reg(2);
    /// Second value register.
    pub const V1: Reg = Reg(3);
    /// First argument register.
    pub const A0: Reg = Reg(4);
    /// Second argument register.
    pub const A1: Reg = Reg(5);
    /// Third argument register.
    pub const A2: Reg = Reg(6);
    /// Fourth argument register.
    pub const A3: Reg = Reg(7);
    /// Temporary register 0.
    pub const T0: Reg = Reg(8);
    /// Temporary register 1.
    pub const T1: Reg = Reg(9);
    /// Temporary register 2.
    pub const T2: Reg = Reg(10);
    /// Temporary register 3.
    pub const T3: Reg = Reg(11);
    /// Saved register 0.
    pub const S0: Reg = Reg(16);
    /// Saved register 1.
    pub const S1: Reg = Reg(17);
    /// Global pointer.
    pub const GP: Reg = Reg(28);
    /// Stack pointer.
    pub const SP: Reg = Reg(29);
    /// Frame pointer.
    pub const FP: Reg = Reg(30);
    /// Return address (the link register).
    pub const RA: Reg = Reg(31);
}
impl Reg {
    /// Gets the register number of this [`Reg`]. This is always between 0 and 31.
    pub fn reg_no(self) -> u8 {
        self.0
    }

    /// The conventional name of this register (without the `$`).
    pub fn name(self) -> &'static str {
        REGISTER_NAMES[usize::from(self.0)]
    }
}
impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.name())
    }
}
impl From<Reg> for usize {
    // Used for indexing the reg file in the simulator.
    fn from(value: Reg) -> Self {
        usize::from(value.0)
    }
}
impl TryFrom<u8> for Reg {
    type Error = TryFromIntError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0..=31 => Ok(Reg(value)),
            // there's no public constructor for TryFromIntError, so borrow one
            _ => u8::try_from(256u16).map(|_| Reg(0)),
        }
    }
}
