//! Utilities to debug simulation.
//!
//! The key type here is [`Breakpoint`], which can be appended to the [`Simulator`]'s
//! breakpoint field to cause the simulator to break.
//!
//! Breakpoints are checked after each step. When one matches, the run stops with
//! [`Outcome::Breakpoint`], and running again resumes from the next instruction.
//!
//! [`Outcome::Breakpoint`]: super::Outcome::Breakpoint
use std::fmt::Write;

use crate::ast::Reg;

use super::Simulator;

/// Common breakpoints.
#[derive(PartialEq, Eq, Hash, Clone)]
pub enum Breakpoint {
    /// Break when the PC is equal to the given value.
    PC(u32),

    /// Break when the provided register (read as signed) matches.
    Reg {
        /// Register to check.
        reg: Reg,
        /// Predicate to break against.
        value: Comparator
    },
    /// Break when the word at the provided address (read as unsigned) matches.
    Mem {
        /// Word-aligned address to check.
        addr: u32,
        /// Predicate to break against.
        value: Comparator
    },
}

impl Breakpoint where Breakpoint: Send + Sync { /* assert Breakpoint is send/sync */ }

impl Breakpoint {
    /// Checks if a break should occur.
    pub fn check(&self, sim: &Simulator) -> bool {
        match self {
            Breakpoint::PC(expected) => *expected == sim.pc,
            Breakpoint::Reg { reg, value: cmp } => cmp.check(i64::from(sim.reg_file[*reg])),
            Breakpoint::Mem { addr, value: cmp } => cmp.check(i64::from(sim.mem.get_raw(*addr))),
        }
    }

    fn fmt_bp(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::PC(expected) => write!(f, "PC == 0x{expected:08X}"),
            Self::Reg { reg, value } => {
                write!(f, "{reg} ")?;
                value.fmt_cmp(f)
            },
            Self::Mem { addr, value } => {
                write!(f, "mem[0x{addr:08X}] ")?;
                value.fmt_cmp(f)
            },
        }
    }
}
impl std::fmt::Debug for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Breakpoint(")?;
        self.fmt_bp(f)?;
        f.write_char(')')
    }
}
impl std::fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_bp(f)
    }
}

/// Predicate checking whether the current value compares with the provided value.
///
/// Values are compared as `i64`, so signed register contents and unsigned memory words
/// both compare naturally.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum Comparator {
    /// Never breaks.
    Never,
    /// Break if the current value is less than the provided value.
    Lt(i64),
    /// Break if the current value is equal to the provided value.
    Eq(i64),
    /// Break if the current value is less than or equal to the provided value.
    Le(i64),
    /// Break if the current value is greater than the provided value.
    Gt(i64),
    /// Break if the current value is not equal to the provided value.
    Ne(i64),
    /// Break if the current value is greater than or equal to the provided value.
    Ge(i64),
    /// Always breaks.
    Always
}
impl Comparator {
    /// Checks if the operand passes the comparator.
    pub fn check(&self, operand: i64) -> bool {
        match *self {
            Comparator::Never  => false,
            Comparator::Lt(r)  => operand < r,
            Comparator::Eq(r)  => operand == r,
            Comparator::Le(r)  => operand <= r,
            Comparator::Gt(r)  => operand > r,
            Comparator::Ne(r)  => operand != r,
            Comparator::Ge(r)  => operand >= r,
            Comparator::Always => true,
        }
    }

    fn fmt_cmp(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparator::Never  => f.write_str("never"),
            Comparator::Lt(r)  => write!(f, "< {r}"),
            Comparator::Eq(r)  => write!(f, "== {r}"),
            Comparator::Le(r)  => write!(f, "<= {r}"),
            Comparator::Gt(r)  => write!(f, "> {r}"),
            Comparator::Ne(r)  => write!(f, "!= {r}"),
            Comparator::Ge(r)  => write!(f, ">= {r}"),
            Comparator::Always => f.write_str("always"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::reg_consts::T0;
    use crate::sim::Simulator;

    use super::{Breakpoint, Comparator};

    #[test]
    fn test_comparator() {
        assert!(!Comparator::Never.check(0));
        assert!(Comparator::Always.check(0));
        assert!(Comparator::Lt(0).check(-1));
        assert!(!Comparator::Lt(0).check(0));
        assert!(Comparator::Ge(0xFFFF_FFFF).check(0xFFFF_FFFF));
        assert!(Comparator::Ne(3).check(4));
    }

    #[test]
    fn test_check() {
        let mut sim = Simulator::new(Default::default());
        sim.pc = 0x0040_0008;
        sim.reg_file[T0] = -5;
        sim.mem.set_raw(0x1001_0000, 0xFFFF_FFFF);

        assert!(Breakpoint::PC(0x0040_0008).check(&sim));
        assert!(!Breakpoint::PC(0x0040_0000).check(&sim));
        assert!(Breakpoint::Reg { reg: T0, value: Comparator::Lt(0) }.check(&sim));
        assert!(Breakpoint::Mem { addr: 0x1001_0000, value: Comparator::Gt(0) }.check(&sim));
    }

    #[test]
    fn test_display() {
        assert_eq!(Breakpoint::PC(0x0040_0000).to_string(), "PC == 0x00400000");
        assert_eq!(Breakpoint::Reg { reg: T0, value: Comparator::Eq(3) }.to_string(), "$t0 == 3");
        assert_eq!(format!("{:?}", Breakpoint::Mem { addr: 16, value: Comparator::Always }), "Breakpoint(mem[0x00000010] always)");
    }
}
