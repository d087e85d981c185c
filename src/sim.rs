//! Simulating and execution for assembled MIPS code.
//!
//! This module is focused on executing fully assembled code (i.e., [`MemoryImage`]).
//!
//! This module consists of:
//! - [`Simulator`]: The struct that simulates assembled code.
//! - [`execute`]: Runs an image start to finish with a step budget.
//! - [`mem`]: The module handling memory and the register file.
//! - [`io`]: The module handling the console that syscalls read from and print to.
//! - [`debug`]: The module handling types of breakpoints for the simulator.
//!
//! # Usage
//!
//! To simulate some code, you need to instantiate a Simulator and load a memory image to it:
//!
//! ```no_run
//! use mips_ensemble::sim::Simulator;
//!
//! # let image = panic!("don't actually make a memory image");
//! let mut simulator = Simulator::new(Default::default());
//! simulator.load(&image);
//! simulator.run().unwrap();
//! ```
//!
//! ## Flags
//!
//! Here, we define `simulator` to have the default flags.
//! We could also configure the simulator by editing the flags. For example,
//! if we wish to keep running past the end of the text segment:
//!
//! ```no_run
//! # use mips_ensemble::sim::{Simulator, SimFlags};
//! let mut simulator = Simulator::new(SimFlags { stop_at_end_of_text: false, ..Default::default() });
//! ```
//!
//! All of the available flags can be found in [`SimFlags`].
//!
//! ## Execution
//!
//! Beyond the basic [`Simulator::run`] (which runs until the program exits),
//! there are also:
//! - [`Simulator::step_in`]: manual step-by-step simulation
//! - [`Simulator::run_while`], [`Simulator::run_with_limit`]: more advanced programmatic execution
//!
//! ```
//! use mips_ensemble::parse::{lex::lex, parse};
//! use mips_ensemble::asm::generate;
//! use mips_ensemble::sim::Simulator;
//! use mips_ensemble::ast::reg_consts::T0;
//!
//! let src = "
//!     li $t0, 0
//!     addi $t0, $t0, 1
//!     addi $t0, $t0, 1
//!     addi $t0, $t0, 1
//! ";
//! let (tokens, _) = lex(src);
//! let (nodes, _) = parse(src, &tokens);
//! let image = generate(src, &tokens, &nodes).unwrap();
//!
//! let mut sim = Simulator::new(Default::default());
//! sim.load(&image);
//!
//! // Running step by step:
//! sim.step_in().unwrap();
//! assert_eq!(sim.reg_file[T0], 0);
//! sim.step_in().unwrap();
//! assert_eq!(sim.reg_file[T0], 1);
//! sim.step_in().unwrap();
//! assert_eq!(sim.reg_file[T0], 2);
//! sim.step_in().unwrap();
//! assert_eq!(sim.reg_file[T0], 3);
//! ```
//!
//! ## Cancellation
//!
//! A run can be stopped from another thread by clearing the flag from [`Simulator::running_flag`].
//! The simulator checks it between steps and stops with [`Outcome::Cancelled`].
//!
//! ## Debugging with breakpoints
//!
//! Breakpoints are accessible through the `breakpoints` field on [`Simulator`].
//!
//! If the `PC` reaches the breakpoint address (or a register or memory word matches),
//! [`Simulator::run`] will stop with [`Outcome::Breakpoint`]. Running again continues from there.

pub mod mem;
pub mod io;
pub mod debug;

use std::collections::HashSet;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::asm::encoding::{jump_dest, InstrWord};
use crate::asm::MemoryImage;
use crate::ast::reg_consts::{A0, A1, GP, RA, SP, V0, ZERO};
use crate::isa::{self, Op, TEXT_BASE};
use debug::Breakpoint;
use io::{Console, SimIO, StdIO};

use self::mem::{Mem, RegFile};

/// Initial stack pointer when [`SimFlags::init_stack`] is set.
pub const STACK_TOP: u32 = 0x7FFF_EFFC;
/// Initial global pointer when [`SimFlags::init_stack`] is set.
pub const GLOBAL_PTR: u32 = 0x1000_8000;

/// Longest string the print-string syscall will print.
const MAX_PRINT_LEN: usize = 1 << 20;

/// Runs an assembled image until it exits, faults, or executes `step_budget` instructions.
///
/// Syscall output goes to the process's stdout and input is read from stdin.
/// The read syscalls (5, 8, 12) block until the process's stdin has a line or is closed,
/// so hosts without a terminal (e.g., editors) should use [`execute_with_io`] with a
/// [`BufferedIO`] or [`EmptyIO`], which answer reads immediately.
///
/// [`BufferedIO`]: io::BufferedIO
/// [`EmptyIO`]: io::EmptyIO
///
/// Reaching the budget is not a failure: it is reported as [`Outcome::BudgetExceeded`].
/// Faults are reported as a [`SimFault`] carrying the instruction count reached.
pub fn execute(image: &MemoryImage, step_budget: u64) -> Result<RunSummary, SimFault> {
    execute_with_io(image, step_budget, StdIO)
}

/// Runs an assembled image (as in [`execute`]) with syscalls going through the given console.
///
/// # Example
/// ```
/// use mips_ensemble::parse::{lex::lex, parse};
/// use mips_ensemble::asm::generate;
/// use mips_ensemble::sim::{execute_with_io, Outcome};
/// use mips_ensemble::sim::io::BufferedIO;
///
/// let src = "li $v0, 1\nli $a0, 42\nsyscall\nli $v0, 10\nsyscall";
/// let (tokens, _) = lex(src);
/// let (nodes, _) = parse(src, &tokens);
/// let image = generate(src, &tokens, &nodes).unwrap();
///
/// let io = BufferedIO::new();
/// let summary = execute_with_io(&image, 1000, io.clone()).unwrap();
/// assert_eq!(io.output_string(), "42");
/// assert_eq!(summary.outcome, Outcome::Exited(0));
/// assert_eq!(summary.instructions_executed, 5);
/// ```
pub fn execute_with_io(image: &MemoryImage, step_budget: u64, io: impl Into<SimIO>) -> Result<RunSummary, SimFault> {
    let mut sim = Simulator::new(SimFlags { step_budget, ..Default::default() });
    sim.open_io(io);
    sim.load(image);
    let result = sim.execute();
    sim.close_io();
    result
}

/// Errors that can occur during simulation.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SimErr {
    /// Word was fetched, but it does not decode to any instruction.
    IllegalOpcode(u32),
    /// A syscall was made with a number the simulator does not support.
    UnsupportedSyscall(i32),
    /// A half-word or word was accessed at an address not aligned to its width.
    Misaligned {
        /// The accessed address.
        addr: u32,
        /// The access width in bytes.
        width: u32,
    },
    /// A `break` instruction was executed.
    Break,
}
impl std::fmt::Display for SimErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimErr::IllegalOpcode(word)        => write!(f, "simulator executed illegal instruction 0x{word:08X}"),
            SimErr::UnsupportedSyscall(n)      => write!(f, "unsupported syscall {n}"),
            SimErr::Misaligned { addr, width } => write!(f, "misaligned {width}-byte access at 0x{addr:08X}"),
            SimErr::Break                      => f.write_str("break instruction executed"),
        }
    }
}
impl std::error::Error for SimErr {}
impl crate::err::Error for SimErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match self {
            SimErr::IllegalOpcode(_)      => Some("the program counter may have jumped into data".into()),
            SimErr::UnsupportedSyscall(_) => Some("supported syscalls are 1-5, 8-17".into()),
            SimErr::Misaligned { width, .. } => Some(format!("addresses of {width}-byte accesses must be multiples of {width}").into()),
            SimErr::Break                 => None,
        }
    }
}

/// A simulation error, together with where and when it happened.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SimFault {
    /// The error.
    pub error: SimErr,
    /// Address of the instruction that faulted.
    pub pc: u32,
    /// Instructions completed before the fault.
    pub instructions_executed: u64,
}
impl std::fmt::Display for SimFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at 0x{:08X} (after {} instructions)", self.error, self.pc, self.instructions_executed)
    }
}
impl std::error::Error for SimFault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
impl crate::err::Error for SimFault {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        crate::err::Error::help(&self.error)
    }
}

/// Why a program stopped.
enum ExitKind {
    /// An exit syscall, with its exit code.
    Syscall(i32),
    /// The PC left the text segment.
    RanOffEnd,
}

/// Anything that can cause a step to abruptly fail to finish.
enum StepBreak {
    /// The program finished.
    Halt(ExitKind),
    /// A simulation error occurred.
    Err(SimErr),
}
impl From<SimErr> for StepBreak {
    fn from(value: SimErr) -> Self {
        Self::Err(value)
    }
}

/// Reason execution paused if it wasn't due to an error.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Outcome {
    /// The program made an exit syscall with the given exit code.
    Exited(i32),
    /// The program ran past the end of the text segment (exit code 0).
    RanOffEnd,
    /// The step budget was used up.
    BudgetExceeded,
    /// The tripwire condition of [`Simulator::run_while`] returned false.
    Tripwire,
    /// The running flag was cleared.
    Cancelled,
    /// A breakpoint matched.
    Breakpoint,
}
impl Outcome {
    /// The program's exit code, if the program terminated.
    pub fn exit_code(self) -> Option<i32> {
        match self {
            Outcome::Exited(code) => Some(code),
            Outcome::RanOffEnd => Some(0),
            _ => None,
        }
    }
}
impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Exited(code)   => write!(f, "exited with code {code}"),
            Outcome::RanOffEnd      => f.write_str("ran off the end of the text segment"),
            Outcome::BudgetExceeded => f.write_str("step budget exceeded"),
            Outcome::Tripwire       => f.write_str("paused"),
            Outcome::Cancelled      => f.write_str("cancelled"),
            Outcome::Breakpoint     => f.write_str("hit breakpoint"),
        }
    }
}

/// Result of a completed run.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RunSummary {
    /// Why the run stopped.
    pub outcome: Outcome,
    /// Exit code, if the program terminated (see [`Outcome::exit_code`]).
    pub exit_code: Option<i32>,
    /// Total instructions executed.
    pub instructions_executed: u64,
}

/// Configuration flags for [`Simulator`].
///
/// These can be modified after the `Simulator` is created with [`Simulator::new`]
/// and their effects should still apply.
///
/// Read the field descriptions for more details.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SimFlags {
    /// Maximum number of instructions [`Simulator::execute`] runs before stopping.
    ///
    /// By default, this is `1_000_000`.
    pub step_budget: u64,
    /// Whether falling through the last instruction of the text segment ends the program
    /// (with exit code 0) instead of executing whatever follows it.
    ///
    /// Only sequential execution ends the program this way. A branch or jump to an address
    /// outside the text segment still fetches and executes the word there, and faults if it does not decode.
    ///
    /// By default, this flag is `true`.
    pub stop_at_end_of_text: bool,
    /// Whether loading an image initializes `$sp` to [`STACK_TOP`] and `$gp` to [`GLOBAL_PTR`].
    ///
    /// By default, this flag is `true`.
    pub init_stack: bool,
}

#[allow(clippy::derivable_impls)]
impl Default for SimFlags {
    fn default() -> Self {
        Self {
            step_budget: 1_000_000,
            stop_at_end_of_text: true,
            init_stack: true,
        }
    }
}

/// Executes assembled code.
#[derive(Debug)]
pub struct Simulator {
    // ------------------ SIMULATION STATE ------------------
    // Calling [`Simulator::reset`] resets these values.

    /// The simulator's memory.
    pub mem: Mem,

    /// The register file.
    pub reg_file: RegFile,

    /// The program counter.
    pub pc: u32,

    /// The HI register (high word of products, remainder of quotients).
    pub hi: i32,

    /// The LO register (low word of products, quotient of quotients).
    pub lo: i32,

    /// The number of instructions successfully run since this `Simulator` was initialized.
    ///
    /// This can be set to 0 to reset the counter.
    pub instructions_run: u64,

    /// The addresses the loaded text segment occupies.
    text: Range<u32>,

    /// Whether the PC reached the end of the text segment by falling through.
    fell_off: bool,

    // ------------------ CONFIG/DEBUG STATE ------------------
    // Calling [`Simulator::reset`] does not reset these values
    // (except that it re-sets the running flag).

    /// Machine control.
    /// If unset, the program stops.
    running: Arc<AtomicBool>,

    /// Breakpoints for the simulator.
    pub breakpoints: HashSet<Breakpoint>,

    /// Configuration settings for the simulator.
    ///
    /// These are preserved between resets.
    ///
    /// See [`SimFlags`] for more details on what configuration
    /// settings are available.
    pub flags: SimFlags,

    /// The console syscalls go through.
    io: SimIO,
}
impl Simulator where Simulator: Send + Sync {}

impl Simulator {
    /// Creates a new simulator with the provided initializers
    /// and with nothing loaded.
    pub fn new(flags: SimFlags) -> Self {
        let mut sim = Self {
            mem: Mem::new(),
            reg_file: RegFile::new(),
            pc: TEXT_BASE,
            hi: 0,
            lo: 0,
            instructions_run: 0,
            text: TEXT_BASE..TEXT_BASE,
            fell_off: false,

            running: Default::default(),
            breakpoints: Default::default(),
            flags,
            io: Default::default(),
        };
        sim.reset();
        sim
    }

    /// Resets the simulator.
    ///
    /// This resets the state of the `Simulator` back to before any execution calls,
    /// while preserving configuration and debug state.
    ///
    /// Note that this unloads the loaded image.
    pub fn reset(&mut self) {
        self.mem = Mem::new();
        self.reg_file = RegFile::new();
        self.pc = TEXT_BASE;
        self.hi = 0;
        self.lo = 0;
        self.instructions_run = 0;
        self.text = TEXT_BASE..TEXT_BASE;
        self.fell_off = false;
        self.running.store(true, Ordering::Relaxed);

        if self.flags.init_stack {
            self.reg_file.set_u(SP, STACK_TOP);
            self.reg_file.set_u(GP, GLOBAL_PTR);
        }
    }

    /// Loads a memory image into this simulator, replacing any previous state.
    ///
    /// Execution starts at the image's entry point.
    pub fn load(&mut self, image: &MemoryImage) {
        self.reset();
        self.mem = image.mem().clone();
        self.text = image.text_range();
        self.pc = image.entry_point();
        // an empty text segment has nothing to run
        self.fell_off = self.text.is_empty();
        log::debug!("loaded image: text {:08X}..{:08X}, entry {:08X}", self.text.start, self.text.end, self.pc);
    }

    /// Sets the console syscalls go through, closing the previous one.
    pub fn open_io<IO: Into<SimIO>>(&mut self, io: IO) {
        std::mem::replace(&mut self.io, io.into()).close();
    }

    /// Closes the console, flushing pending output. Syscalls afterwards have no console.
    pub fn close_io(&mut self) {
        std::mem::take(&mut self.io).close();
    }

    /// Gets a handle to the running flag.
    ///
    /// The flag is set by [`Simulator::reset`] and [`Simulator::load`].
    /// Clearing it (from any thread, before or during a run) stops execution between steps
    /// with [`Outcome::Cancelled`]. The flag stays cleared, so later runs also stop immediately
    /// until it is set again.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// The addresses of the loaded text segment.
    pub fn text_range(&self) -> Range<u32> {
        self.text.clone()
    }

    /// Runs until the tripwire condition returns false (or any of the typical breaks occur).
    ///
    /// The typical break conditions are:
    /// - the program exits (or runs off the end of the text segment)
    /// - the running flag is cleared
    /// - A breakpoint matches
    pub fn run_while(&mut self, mut tripwire: impl FnMut(&mut Simulator) -> bool) -> Result<Outcome, SimErr> {
        // event loop
        // run until:
        // 1. the running flag is cleared
        // 2. the tripwire condition returns false
        // 3. any of the breakpoints are hit
        loop {
            if !self.running.load(Ordering::Relaxed) {
                log::warn!("run cancelled at 0x{:08X}", self.pc);
                break Ok(Outcome::Cancelled);
            }
            if !tripwire(self) {
                break Ok(Outcome::Tripwire);
            }

            match self.step() {
                Ok(()) => {},
                Err(StepBreak::Halt(ExitKind::Syscall(code))) => break Ok(Outcome::Exited(code)),
                Err(StepBreak::Halt(ExitKind::RanOffEnd)) => break Ok(Outcome::RanOffEnd),
                Err(StepBreak::Err(e)) => break Err(e),
            }

            // After executing, check that any breakpoints were hit.
            if self.breakpoints.iter().any(|bp| bp.check(self)) {
                break Ok(Outcome::Breakpoint);
            }
        }
    }

    /// Execute the program.
    ///
    /// This blocks until the program ends.
    /// If you would like to limit the maximum number of steps to execute, consider [`Simulator::run_with_limit`].
    pub fn run(&mut self) -> Result<Outcome, SimErr> {
        self.run_while(|_| true)
    }

    /// Execute the program with a limit on how many steps to execute.
    ///
    /// This blocks until the program ends or until the number of steps to execute has been hit,
    /// in which case this returns [`Outcome::BudgetExceeded`].
    pub fn run_with_limit(&mut self, max_steps: u64) -> Result<Outcome, SimErr> {
        let i = self.instructions_run;
        match self.run_while(|sim| sim.instructions_run.wrapping_sub(i) < max_steps)? {
            Outcome::Tripwire => Ok(Outcome::BudgetExceeded),
            outcome => Ok(outcome),
        }
    }

    /// Runs the loaded program within the step budget in [`SimFlags`],
    /// summarizing the run or reporting the fault that ended it.
    pub fn execute(&mut self) -> Result<RunSummary, SimFault> {
        match self.run_with_limit(self.flags.step_budget) {
            Ok(outcome) => {
                log::debug!("run {outcome} after {} instructions", self.instructions_run);
                Ok(RunSummary {
                    outcome,
                    exit_code: outcome.exit_code(),
                    instructions_executed: self.instructions_run,
                })
            },
            Err(error) => {
                log::warn!("simulator fault at 0x{:08X}: {error}", self.pc);
                Err(SimFault { error, pc: self.pc, instructions_executed: self.instructions_run })
            },
        }
    }

    /// Simulate one step, executing one instruction.
    ///
    /// On success, the PC has moved to the next instruction and the instruction was counted.
    /// On failure, the PC still points at the instruction that failed to complete.
    fn step(&mut self) -> Result<(), StepBreak> {
        if self.flags.stop_at_end_of_text && self.fell_off && self.pc == self.text.end {
            return Err(StepBreak::Halt(ExitKind::RanOffEnd));
        }

        let word = self.mem.read_word(self.pc)?;
        let result = self.execute_word(word);
        self.reg_file[ZERO] = 0;

        match result {
            Ok(next_pc) => {
                self.fell_off = next_pc == self.pc.wrapping_add(4) && next_pc == self.text.end;
                self.pc = next_pc;
                self.instructions_run += 1;
                Ok(())
            },
            Err(StepBreak::Halt(exit)) => {
                self.instructions_run += 1;
                Err(StepBreak::Halt(exit))
            },
            Err(e) => Err(e),
        }
    }

    /// Simulate one step, executing one instruction.
    ///
    /// Stepping after the program has exited executes whatever follows the exit.
    pub fn step_in(&mut self) -> Result<(), SimErr> {
        match self.step() {
            Ok(()) => Ok(()),
            Err(StepBreak::Halt(_)) => Ok(()),
            Err(StepBreak::Err(e)) => Err(e)
        }
    }

    /// Decodes and executes a word, returning the address of the next instruction.
    fn execute_word(&mut self, word: u32) -> Result<u32, StepBreak> {
        let desc = isa::decode(word).ok_or(SimErr::IllegalOpcode(word))?;
        log::trace!("0x{:08X}: {}", self.pc, isa::disassemble(word, self.pc));

        let w = InstrWord(word);
        let (rs, rt, rd) = (w.rs(), w.rt(), w.rd());
        let (s, t) = (self.reg_file[rs], self.reg_file[rt]);
        let (su, tu) = (s as u32, t as u32);
        let simm = w.signed_imm();
        let next = self.pc.wrapping_add(4);
        let branch = next.wrapping_add((simm << 2) as u32);
        let addr = su.wrapping_add(simm as u32);
        let regs = &mut self.reg_file;

        let mut next_pc = next;
        match desc.op {
            Op::Sll  => regs.set_u(rd, tu << w.shamt()),
            Op::Srl  => regs.set_u(rd, tu >> w.shamt()),
            Op::Sra  => regs[rd] = t >> w.shamt(),
            Op::Sllv => regs.set_u(rd, tu << (su & 0x1F)),
            Op::Srlv => regs.set_u(rd, tu >> (su & 0x1F)),
            Op::Srav => regs[rd] = t >> (su & 0x1F),
            Op::Jr   => next_pc = su,
            Op::Jalr => {
                regs.set_u(rd, next);
                next_pc = su;
            },
            Op::Syscall => self.syscall()?,
            Op::Break => return Err(SimErr::Break.into()),
            Op::Mfhi => regs[rd] = self.hi,
            Op::Mthi => self.hi = s,
            Op::Mflo => regs[rd] = self.lo,
            Op::Mtlo => self.lo = s,
            Op::Mult => {
                let product = i64::from(s) * i64::from(t);
                self.hi = (product >> 32) as i32;
                self.lo = product as i32;
            },
            Op::Multu => {
                let product = u64::from(su) * u64::from(tu);
                self.hi = (product >> 32) as i32;
                self.lo = product as i32;
            },
            // division by zero leaves HI and LO unchanged
            Op::Div => if t != 0 {
                self.lo = s.wrapping_div(t);
                self.hi = s.wrapping_rem(t);
            },
            Op::Divu => if tu != 0 {
                self.lo = (su / tu) as i32;
                self.hi = (su % tu) as i32;
            },
            Op::Add  => regs[rd] = s.wrapping_add(t),
            Op::Addu => regs.set_u(rd, su.wrapping_add(tu)),
            Op::Sub  => regs[rd] = s.wrapping_sub(t),
            Op::Subu => regs.set_u(rd, su.wrapping_sub(tu)),
            Op::And  => regs[rd] = s & t,
            Op::Or   => regs[rd] = s | t,
            Op::Xor  => regs[rd] = s ^ t,
            Op::Nor  => regs[rd] = !(s | t),
            Op::Slt  => regs[rd] = i32::from(s < t),
            Op::Sltu => regs[rd] = i32::from(su < tu),

            Op::Bltz => if s < 0 { next_pc = branch },
            Op::Bgez => if s >= 0 { next_pc = branch },
            Op::Bltzal => {
                regs.set_u(RA, next);
                if s < 0 { next_pc = branch }
            },
            Op::Bgezal => {
                regs.set_u(RA, next);
                if s >= 0 { next_pc = branch }
            },
            Op::J => next_pc = jump_dest(self.pc, w.target()),
            Op::Jal => {
                regs.set_u(RA, next);
                next_pc = jump_dest(self.pc, w.target());
            },
            Op::Beq  => if s == t { next_pc = branch },
            Op::Bne  => if s != t { next_pc = branch },
            Op::Blez => if s <= 0 { next_pc = branch },
            Op::Bgtz => if s > 0 { next_pc = branch },

            Op::Addi | Op::Addiu => regs[rt] = s.wrapping_add(simm),
            Op::Slti  => regs[rt] = i32::from(s < simm),
            Op::Sltiu => regs[rt] = i32::from(su < simm as u32),
            Op::Andi  => regs.set_u(rt, su & w.imm()),
            Op::Ori   => regs.set_u(rt, su | w.imm()),
            Op::Xori  => regs.set_u(rt, su ^ w.imm()),
            Op::Lui   => regs.set_u(rt, w.imm() << 16),

            Op::Lb  => regs[rt] = i32::from(self.mem.read_byte(addr) as i8),
            Op::Lbu => regs[rt] = i32::from(self.mem.read_byte(addr)),
            Op::Lh  => regs[rt] = i32::from(self.mem.read_half(addr)? as i16),
            Op::Lhu => regs[rt] = i32::from(self.mem.read_half(addr)?),
            Op::Lw  => regs.set_u(rt, self.mem.read_word(addr)?),
            Op::Sb  => self.mem.write_byte(addr, tu as u8),
            Op::Sh  => self.mem.write_half(addr, tu as u16)?,
            Op::Sw  => self.mem.write_word(addr, tu)?,

            // pseudo-instructions never decode
            Op::Nop | Op::Move | Op::Li | Op::La | Op::Blt | Op::Bgt
            | Op::Ble | Op::Bge | Op::Not | Op::Neg | Op::Abs => return Err(SimErr::IllegalOpcode(word).into()),
        }

        Ok(next_pc)
    }

    /// Handles a syscall, dispatching on `$v0`.
    fn syscall(&mut self) -> Result<(), StepBreak> {
        let number = self.reg_file[V0];
        let a0 = self.reg_file[A0];
        log::trace!("syscall {number} ($a0 = {a0})");

        match number {
            1 => self.io.print(a0.to_string().as_bytes()),
            2 => self.io.print(format!("{:?}", f32::from_bits(a0 as u32)).as_bytes()),
            3 => {
                let bits = u64::from(self.reg_file.get_u(A1)) << 32 | u64::from(a0 as u32);
                self.io.print(format!("{:?}", f64::from_bits(bits)).as_bytes());
            },
            4 => {
                let bytes = self.mem.read_cstr(a0 as u32, MAX_PRINT_LEN);
                self.io.print(&bytes);
            },
            5 => {
                let value = self.io.read_line()
                    .and_then(|line| line.trim().parse::<i32>().ok())
                    .unwrap_or(0);
                self.reg_file[V0] = value;
            },
            8 => {
                let buf = a0 as u32;
                let len = self.reg_file[A1];
                if len > 0 {
                    let line = self.io.read_line().unwrap_or_default();
                    let max = (len - 1) as usize;
                    let bytes = &line.as_bytes()[..line.len().min(max)];
                    self.mem.write_bytes(buf, bytes);
                    self.mem.write_byte(buf.wrapping_add(bytes.len() as u32), 0);
                }
            },
            // heap allocation is not supported: always returns a null pointer
            9 => self.reg_file[V0] = 0,
            10 => return Err(StepBreak::Halt(ExitKind::Syscall(0))),
            11 => self.io.print(&[a0 as u8]),
            12 => {
                let c = self.io.read_line()
                    .and_then(|line| line.bytes().next())
                    .unwrap_or(0);
                self.reg_file[V0] = i32::from(c);
            },
            // file IO is not supported: every call fails
            13..=16 => self.reg_file[V0] = -1,
            17 => return Err(StepBreak::Halt(ExitKind::Syscall(a0))),
            n => return Err(SimErr::UnsupportedSyscall(n).into()),
        }
        Ok(())
    }
}
impl Default for Simulator {
    fn default() -> Self {
        Self::new(Default::default())
    }
}
