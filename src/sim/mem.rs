//! Memory handling for the simulator.
//!
//! This module consists of:
//! - [`Mem`]: The memory, which is shared with the assembler's output.
//! - [`RegFile`]: The register file.

use std::collections::BTreeMap;

use crate::ast::Reg;

use super::SimErr;

/// Byte-addressable memory over the full 32-bit address space.
///
/// Memory is sparse: only words which have been written are stored,
/// keyed by their word-aligned address. Any address that was never written reads as zero.
///
/// Bytes within a word are little-endian: the byte at `addr` is bits `8 * (addr % 4)` onward
/// of the word at `addr & !3`.
///
/// Half-word and word accesses must be aligned to their width, or they fail with [`SimErr::Misaligned`].
///
/// # Example
///
/// ```
/// use mips_ensemble::sim::mem::Mem;
///
/// let mut mem = Mem::new();
/// mem.write_word(0x1001_0000, 0x1234_5678).unwrap();
///
/// assert_eq!(mem.read_byte(0x1001_0000), 0x78);
/// assert_eq!(mem.read_half(0x1001_0002).unwrap(), 0x1234);
/// assert_eq!(mem.read_word(0x1001_0004).unwrap(), 0);
/// assert!(mem.read_word(0x1001_0001).is_err());
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Mem {
    words: BTreeMap<u32, u32>
}

impl Mem {
    /// Creates a new, zeroed memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the word containing the given address, ignoring alignment.
    ///
    /// This is **only** meant to be used to query the state of the memory,
    /// as it never fails. Simulated accesses should go through [`Mem::read_word`].
    pub fn get_raw(&self, addr: u32) -> u32 {
        self.words.get(&(addr & !3)).copied().unwrap_or(0)
    }

    /// Sets the word containing the given address, ignoring alignment.
    pub fn set_raw(&mut self, addr: u32, data: u32) {
        self.words.insert(addr & !3, data);
    }

    /// Reads a byte.
    pub fn read_byte(&self, addr: u32) -> u8 {
        let shift = (addr & 3) * 8;
        (self.get_raw(addr) >> shift) as u8
    }

    /// Writes a byte.
    pub fn write_byte(&mut self, addr: u32, data: u8) {
        let shift = (addr & 3) * 8;
        let word = self.words.entry(addr & !3).or_insert(0);
        *word = (*word & !(0xFF << shift)) | (u32::from(data) << shift);
    }

    /// Reads a half-word, failing if `addr` is not 2-byte aligned.
    pub fn read_half(&self, addr: u32) -> Result<u16, SimErr> {
        check_aligned(addr, 2)?;
        let shift = (addr & 2) * 8;
        Ok((self.get_raw(addr) >> shift) as u16)
    }

    /// Writes a half-word, failing if `addr` is not 2-byte aligned.
    pub fn write_half(&mut self, addr: u32, data: u16) -> Result<(), SimErr> {
        check_aligned(addr, 2)?;
        let shift = (addr & 2) * 8;
        let word = self.words.entry(addr & !3).or_insert(0);
        *word = (*word & !(0xFFFF << shift)) | (u32::from(data) << shift);
        Ok(())
    }

    /// Reads a word, failing if `addr` is not 4-byte aligned.
    pub fn read_word(&self, addr: u32) -> Result<u32, SimErr> {
        check_aligned(addr, 4)?;
        Ok(self.get_raw(addr))
    }

    /// Writes a word, failing if `addr` is not 4-byte aligned.
    pub fn write_word(&mut self, addr: u32, data: u32) -> Result<(), SimErr> {
        check_aligned(addr, 4)?;
        self.set_raw(addr, data);
        Ok(())
    }

    /// Writes a run of bytes starting at `addr` (no alignment required).
    pub fn write_bytes(&mut self, addr: u32, data: &[u8]) {
        for (i, &b) in (0..).zip(data) {
            self.write_byte(addr.wrapping_add(i), b);
        }
    }

    /// Reads bytes starting at `addr` up to (not including) the first null byte,
    /// stopping after at most `limit` bytes.
    pub fn read_cstr(&self, addr: u32, limit: usize) -> Vec<u8> {
        (0..).map(|i| self.read_byte(addr.wrapping_add(i)))
            .take(limit)
            .take_while(|&b| b != 0)
            .collect()
    }

    /// Iterates over every written word in address order, as `(address, word)` pairs.
    pub fn word_iter(&self) -> impl Iterator<Item=(u32, u32)> + '_ {
        self.words.iter().map(|(&addr, &word)| (addr, word))
    }

    /// Whether no word has ever been written.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn check_aligned(addr: u32, width: u32) -> Result<(), SimErr> {
    match addr % width {
        0 => Ok(()),
        _ => Err(SimErr::Misaligned { addr, width }),
    }
}

/// The register file.
///
/// This struct can be indexed with a [`Reg`]
/// (which can be constructed using the [`crate::ast::reg_consts`] module or via [`Reg::try_from`]).
///
/// Writes to `$zero` are permitted here. The simulator restores `$zero` after every step.
///
/// # Example
///
/// ```
/// use mips_ensemble::sim::mem::RegFile;
/// use mips_ensemble::ast::reg_consts::T0;
///
/// let mut reg = RegFile::new();
/// reg[T0] = -11;
/// assert_eq!(reg[T0], -11);
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct RegFile([i32; 32]);
impl RegFile {
    /// Creates a register file with every register set to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a register as an unsigned value.
    pub fn get_u(&self, reg: Reg) -> u32 {
        self[reg] as u32
    }

    /// Sets a register from an unsigned value.
    pub fn set_u(&mut self, reg: Reg, data: u32) {
        self[reg] = data as i32;
    }
}
impl std::ops::Index<Reg> for RegFile {
    type Output = i32;

    fn index(&self, index: Reg) -> &Self::Output {
        &self.0[usize::from(index)]
    }
}
impl std::ops::IndexMut<Reg> for RegFile {
    fn index_mut(&mut self, index: Reg) -> &mut Self::Output {
        &mut self.0[usize::from(index)]
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::reg_consts::{T0, ZERO};
    use crate::sim::SimErr;

    use super::{Mem, RegFile};

    #[test]
    fn test_unwritten_reads_zero() {
        let mem = Mem::new();
        assert_eq!(mem.read_byte(0xDEAD_BEEF), 0);
        assert_eq!(mem.read_half(0xFFFF_FFFE).unwrap(), 0);
        assert_eq!(mem.read_word(0x0040_0000).unwrap(), 0);
        assert!(mem.is_empty());
    }

    #[test]
    fn test_little_endian() {
        let mut mem = Mem::new();
        mem.write_bytes(0x1001_0000, &[42, 255, 128]);
        assert_eq!(mem.read_byte(0x1001_0000), 42);
        assert_eq!(mem.read_byte(0x1001_0001), 255);
        assert_eq!(mem.read_byte(0x1001_0002), 128);
        assert_eq!(mem.read_word(0x1001_0000).unwrap(), 0x0080_FF2A);

        mem.write_half(0x1001_0002, 0xBEEF).unwrap();
        assert_eq!(mem.read_word(0x1001_0000).unwrap(), 0xBEEF_FF2A);
        assert_eq!(mem.read_half(0x1001_0000).unwrap(), 0xFF2A);
    }

    #[test]
    fn test_partial_writes_preserve_neighbors() {
        let mut mem = Mem::new();
        mem.write_word(0x100, 0xAABB_CCDD).unwrap();
        mem.write_byte(0x101, 0x11);
        assert_eq!(mem.read_word(0x100).unwrap(), 0xAABB_11DD);
        mem.write_half(0x100, 0x2233).unwrap();
        assert_eq!(mem.read_word(0x100).unwrap(), 0xAABB_2233);
    }

    #[test]
    fn test_misaligned() {
        let mut mem = Mem::new();
        assert!(matches!(mem.read_half(0x101), Err(SimErr::Misaligned { addr: 0x101, width: 2 })));
        assert!(matches!(mem.read_word(0x102), Err(SimErr::Misaligned { addr: 0x102, width: 4 })));
        assert!(mem.write_word(0x103, 1).is_err());
        assert!(mem.write_half(0x103, 1).is_err());
        // failed writes do not touch memory
        assert!(mem.is_empty());
    }

    #[test]
    fn test_sparse_segments() {
        let mut mem = Mem::new();
        mem.write_word(0x0040_0000, 1).unwrap();
        mem.write_word(0x1001_0000, 2).unwrap();
        mem.write_word(0x7FFF_EFFC, 3).unwrap();
        let words: Vec<_> = mem.word_iter().collect();
        assert_eq!(words, [(0x0040_0000, 1), (0x1001_0000, 2), (0x7FFF_EFFC, 3)]);
    }

    #[test]
    fn test_read_cstr() {
        let mut mem = Mem::new();
        mem.write_bytes(0x200, b"hello\0world");
        assert_eq!(mem.read_cstr(0x200, 100), b"hello");
        assert_eq!(mem.read_cstr(0x200, 3), b"hel");
        assert_eq!(mem.read_cstr(0x206, 100), b"world");
    }

    #[test]
    fn test_reg_file() {
        let mut reg = RegFile::new();
        reg[T0] = -1;
        assert_eq!(reg.get_u(T0), 0xFFFF_FFFF);
        reg.set_u(ZERO, 5);
        assert_eq!(reg[ZERO], 5);
    }
}
