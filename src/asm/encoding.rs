//! Bit-level layout of machine words.
//!
//! Every instruction is one 32-bit word in one of three layouts:
//!
//! ```text
//! R: | opcode:6 | rs:5 | rt:5 | rd:5 | shamt:5 | funct:6 |
//! I: | opcode:6 | rs:5 | rt:5 |        imm:16            |
//! J: | opcode:6 |              target:26                 |
//! ```
//!
//! [`InstrWord`] is used both to build words in the assembler
//! and to pull fields out of fetched words in the simulator.

use crate::ast::Reg;

/// A machine instruction word.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub struct InstrWord(pub u32);

impl InstrWord {
    /// Starts a word with the given opcode (bits 26..31).
    pub fn op(opcode: u8) -> Self {
        Self((u32::from(opcode) & 0x3F) << 26)
    }

    /// Starts an R-type word (opcode 0) with the given function code (bits 0..5).
    pub fn funct(funct: u8) -> Self {
        Self(u32::from(funct) & 0x3F)
    }

    /// Sets the source register (bits 21..25).
    pub fn with_rs(self, reg: Reg) -> Self {
        Self(self.0 | u32::from(reg.reg_no()) << 21)
    }

    /// Sets the target register (bits 16..20).
    pub fn with_rt(self, reg: Reg) -> Self {
        Self(self.0 | u32::from(reg.reg_no()) << 16)
    }

    /// Sets the target field (bits 16..20) with a raw value (used by `bltz`/`bgez` and friends).
    pub fn with_rt_raw(self, rt: u8) -> Self {
        Self(self.0 | (u32::from(rt) & 0x1F) << 16)
    }

    /// Sets the destination register (bits 11..15).
    pub fn with_rd(self, reg: Reg) -> Self {
        Self(self.0 | u32::from(reg.reg_no()) << 11)
    }

    /// Sets the shift amount (bits 6..10).
    pub fn with_shamt(self, shamt: u8) -> Self {
        Self(self.0 | (u32::from(shamt) & 0x1F) << 6)
    }

    /// Sets the 16-bit immediate (bits 0..15). Only the low 16 bits are kept.
    pub fn with_imm(self, imm: u32) -> Self {
        Self(self.0 | imm & 0xFFFF)
    }

    /// Sets the jump target (bits 0..25) from an absolute address.
    pub fn with_target_addr(self, addr: u32) -> Self {
        Self(self.0 | ((addr & 0x0FFF_FFFF) >> 2) & 0x03FF_FFFF)
    }

    /// Gets the raw word.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Opcode - bits 26..31.
    pub fn opcode(self) -> u8 {
        (self.0 >> 26) as u8
    }

    /// Source register - bits 21..25.
    pub fn rs(self) -> Reg {
        Reg(((self.0 >> 21) & 0x1F) as u8)
    }

    /// Target register - bits 16..20.
    pub fn rt(self) -> Reg {
        Reg(((self.0 >> 16) & 0x1F) as u8)
    }

    /// Destination register - bits 11..15.
    pub fn rd(self) -> Reg {
        Reg(((self.0 >> 11) & 0x1F) as u8)
    }

    /// Shift amount - bits 6..10.
    pub fn shamt(self) -> u32 {
        (self.0 >> 6) & 0x1F
    }

    /// Function code - bits 0..5.
    pub fn funct_field(self) -> u8 {
        (self.0 & 0x3F) as u8
    }

    /// Immediate - bits 0..15, zero-extended.
    pub fn imm(self) -> u32 {
        self.0 & 0xFFFF
    }

    /// Immediate - bits 0..15, sign-extended.
    pub fn signed_imm(self) -> i32 {
        i32::from((self.0 & 0xFFFF) as u16 as i16)
    }

    /// Jump target - bits 0..25.
    pub fn target(self) -> u32 {
        self.0 & 0x03FF_FFFF
    }
}

/// Computes the 16-bit word offset for a branch at `pc` targeting `dest`.
///
/// The offset is relative to the instruction after the branch, truncated to 16 bits.
pub fn branch_offset(pc: u32, dest: u32) -> u32 {
    let delta = dest.wrapping_sub(pc.wrapping_add(4)) as i32;
    (delta / 4) as u32 & 0xFFFF
}

/// Computes the address a jump at `pc` with the given 26-bit target field lands on.
pub fn jump_dest(pc: u32, target: u32) -> u32 {
    (pc.wrapping_add(4) & 0xF000_0000) | (target << 2)
}

#[cfg(test)]
mod tests {
    use crate::ast::reg_consts::{T0, T1, T2};

    use super::{branch_offset, jump_dest, InstrWord};

    #[test]
    fn test_build_r() {
        let word = InstrWord::funct(0x20)
            .with_rs(T1)
            .with_rt(T2)
            .with_rd(T0);
        assert_eq!(word.get(), 0x012A_4020);
        assert_eq!(word.opcode(), 0);
        assert_eq!(word.rs(), T1);
        assert_eq!(word.rt(), T2);
        assert_eq!(word.rd(), T0);
        assert_eq!(word.funct_field(), 0x20);
    }

    #[test]
    fn test_build_i() {
        // addi $t0, $t1, -1
        let word = InstrWord::op(0x08)
            .with_rs(T1)
            .with_rt(T0)
            .with_imm(-1i32 as u32);
        assert_eq!(word.get(), 0x2128_FFFF);
        assert_eq!(word.imm(), 0xFFFF);
        assert_eq!(word.signed_imm(), -1);
    }

    #[test]
    fn test_build_j() {
        let word = InstrWord::op(0x02).with_target_addr(0x0040_0010);
        assert_eq!(word.get(), 0x0810_0004);
        assert_eq!(jump_dest(0x0040_0000, word.target()), 0x0040_0010);
    }

    #[test]
    fn test_branch_offset() {
        assert_eq!(branch_offset(0x0040_0000, 0x0040_0004), 0);
        assert_eq!(branch_offset(0x0040_0000, 0x0040_0010), 3);
        assert_eq!(branch_offset(0x0040_0008, 0x0040_0000), 0xFFFD);
        assert_eq!(branch_offset(0x0040_0004, 0x0040_0004), 0xFFFF);
    }
}
