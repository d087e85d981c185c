//! Assembling parsed nodes into a memory image.
//!
//! This module is used to convert parsed nodes (`&[`[`Node`]`]`) into a [`MemoryImage`]
//! that can be executed by the simulator.
//!
//! The assembler module notably consists of:
//! - [`generate`]: The main function which assembles the nodes into a memory image.
//! - [`SymbolTable`]: a struct holding the symbol table, which stores the address of every label after the first assembler pass
//! - [`MemoryImage`]: a struct holding the assembled memory, which can be loaded into the simulator and executed
//!
//! The generator assumes its input has been validated. Input the validator would reject
//! either fails with an [`AsmErr`] or is assembled on a best-effort basis; it is never
//! reported as a diagnostic.
//!
//! [`Node`]: crate::ast::asm::Node

pub mod encoding;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ops::Range;

use crate::ast::asm::{imm_value, parse_number, DirectiveArg, Directive, ImmValue, Instruction, Node, Operand};
use crate::ast::reg_consts::{RA, ZERO};
use crate::ast::Reg;
use crate::err::{ErrSpan, Position};
use crate::isa::{self, DataWidth, DirectiveKind, Format, Op, Section, Shape, DATA_BASE, TEXT_BASE};
use crate::parse::lex::{Token, TokenKind};
use crate::sim::mem::Mem;
use crate::validate::parse_float;

use self::encoding::{branch_offset, InstrWord};

/// Assembles parsed nodes into a memory image.
///
/// `tokens` and `nodes` should be the outputs of [`lex`] and [`parse`] on `src`.
///
/// # Example
/// ```
/// use mips_ensemble::parse::{lex::lex, parse};
/// use mips_ensemble::asm::generate;
///
/// let src = ".text\nadd $t0, $t1, $t2";
/// let (tokens, _) = lex(src);
/// let (nodes, _) = parse(src, &tokens);
///
/// let image = generate(src, &tokens, &nodes).unwrap();
/// assert_eq!(image.mem().read_word(0x0040_0000).unwrap(), 0x012A_4020);
/// ```
///
/// [`lex`]: crate::parse::lex::lex
/// [`parse`]: crate::parse::parse
pub fn generate(src: &str, tokens: &[Token], nodes: &[Node]) -> Result<MemoryImage, AsmErr> {
    let ctx = Ctx { src, tokens };
    let sym = SymbolTable::build(ctx, nodes)?;
    MemoryImage::new(ctx, nodes, sym)
}

/// Kinds of errors that can occur from assembling given assembly code.
///
/// See [`AsmErr`] for this error type with span information included.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum AsmErrKind {
    /// A label was referenced but never defined (pass 2).
    UnknownLabel(String),
    /// A pseudo-instruction has no expansion (pass 2).
    UnimplementedPseudo(String),
    /// A directive is recognized but cannot be assembled (pass 2).
    UnsupportedDirective(String),
    /// There were multiple labels of the same name (pass 1).
    OverlappingLabels(String),
    /// An operand or directive argument does not have the form its instruction or directive requires (pass 2).
    MalformedOperand,
    /// An instruction would be placed at an address that is not word-aligned (pass 2).
    Misaligned(u32),
}
impl std::fmt::Display for AsmErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLabel(name)         => write!(f, "Unknown label: {name}"),
            Self::UnimplementedPseudo(name)  => write!(f, "unimplemented pseudo-instruction '{name}'"),
            Self::UnsupportedDirective(name) => write!(f, "unsupported directive '.{name}'"),
            Self::OverlappingLabels(name)    => write!(f, "label '{name}' was defined multiple times"),
            Self::MalformedOperand           => f.write_str("malformed operand"),
            Self::Misaligned(addr)           => write!(f, "instruction at misaligned address 0x{addr:08X}"),
        }
    }
}

/// Error from assembling given assembly code.
#[derive(Debug)]
pub struct AsmErr {
    /// The value with a span.
    pub kind: AsmErrKind,
    /// The span in the source associated with this value.
    pub span: ErrSpan
}
impl AsmErr {
    /// Creates a new [`AsmErr`].
    pub fn new<E: Into<ErrSpan>>(kind: AsmErrKind, span: E) -> Self {
        AsmErr { kind, span: span.into() }
    }
}
impl std::fmt::Display for AsmErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}
impl std::error::Error for AsmErr {}
impl crate::err::Error for AsmErr {
    fn span(&self) -> Option<ErrSpan> {
        Some(self.span.clone())
    }

    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match &self.kind {
            AsmErrKind::UnknownLabel(_)         => Some("try defining this label, or check its spelling (labels are case-sensitive)".into()),
            AsmErrKind::UnimplementedPseudo(_)  => Some("expand this pseudo-instruction into real instructions by hand".into()),
            AsmErrKind::UnsupportedDirective(_) => Some("only .text, .data, and the data directives are assembled".into()),
            AsmErrKind::OverlappingLabels(_)    => Some("labels must be unique within a file, try renaming one of the labels".into()),
            AsmErrKind::MalformedOperand        => Some("run the validator on this source to see what is wrong".into()),
            AsmErrKind::Misaligned(_)           => Some("data directives in the code section can misalign later instructions, try adding .align 2".into()),
        }
    }
}

/// Source text and tokens, shared by both passes.
#[derive(Clone, Copy)]
struct Ctx<'a> {
    src: &'a str,
    tokens: &'a [Token],
}
impl<'a> Ctx<'a> {
    fn imm(&self, token: usize) -> Option<ImmValue<'a>> {
        imm_value(self.src, self.tokens, token)
    }

    /// The value of a directive argument which is a single integer token.
    fn arg_number(&self, arg: &DirectiveArg) -> Option<i64> {
        let tok = arg.single(self.tokens)?;
        match tok.kind {
            TokenKind::Number(_) => parse_number(tok.slice(self.src)),
            _ => None,
        }
    }

    /// The decoded value of a directive argument which is a single string token.
    fn arg_str(&self, arg: &DirectiveArg) -> Option<&'a str> {
        match &arg.single(self.tokens)?.kind {
            TokenKind::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The value of the 32-bit immediate of a `li` instruction, if it has one.
    fn li_value(&self, instr: &Instruction) -> Option<u32> {
        match instr.operands.get(1)? {
            &Operand::Immediate { token } => match self.imm(token)? {
                ImmValue::Number(n) => Some(n as u32),
                ImmValue::Label(_) => None,
            },
            _ => None,
        }
    }

    /// Number of bytes an instruction occupies once emitted.
    ///
    /// Both passes size instructions through this function, so label addresses
    /// always agree with where code is actually written.
    fn instr_size(&self, instr: &Instruction) -> u32 {
        match instr.op {
            Op::Li if self.li_value(instr).is_some_and(|v| v >> 16 != 0) => 8,
            _ => 4,
        }
    }

    /// Number of bytes a directive emits (not including alignment).
    fn directive_size(&self, d: &Directive) -> u32 {
        let Some(desc) = isa::directive(&d.name) else { return 0 };
        match desc.kind {
            DirectiveKind::Data(width) => width.size() * d.args.len() as u32,
            DirectiveKind::Str { null_terminated } => d.args.iter()
                .map(|arg| self.arg_str(arg).map_or(0, |s| s.len() as u32) + u32::from(null_terminated))
                .sum(),
            DirectiveKind::Space => d.args.first()
                .and_then(|arg| self.arg_number(arg))
                .map_or(0, |n| n.clamp(0, i64::from(u32::MAX)) as u32),
            _ => 0,
        }
    }

    /// The alignment exponent of an `.align` directive.
    fn align_exp(&self, d: &Directive) -> Option<u32> {
        let n = self.arg_number(d.args.first()?)?;
        u32::try_from(n).ok().filter(|&n| n <= 16)
    }
}

/// Running addresses of both segments.
struct Cursor {
    code: u32,
    data: u32,
    section: Section,
}
impl Cursor {
    fn new() -> Self {
        Self { code: TEXT_BASE, data: DATA_BASE, section: Section::default() }
    }

    fn addr(&self) -> u32 {
        match self.section {
            Section::Code => self.code,
            Section::Data => self.data,
        }
    }

    fn addr_mut(&mut self) -> &mut u32 {
        match self.section {
            Section::Code => &mut self.code,
            Section::Data => &mut self.data,
        }
    }

    fn shift(&mut self, n: u32) {
        let addr = self.addr_mut();
        *addr = addr.wrapping_add(n);
    }

    /// Rounds the current section's address up to a multiple of `2^exp`.
    fn align(&mut self, exp: u32) {
        let mask = (1u32 << exp) - 1;
        let addr = self.addr_mut();
        *addr = addr.wrapping_add(mask) & !mask;
    }

    /// Applies a directive's effect on the address: switching sections, aligning, or reserving space.
    fn step_directive(&mut self, ctx: Ctx, d: &Directive) {
        if let Some(section) = isa::section_switch(&d.name) {
            self.section = section;
        }
        if let Some(DirectiveKind::Align) = isa::directive(&d.name).map(|desc| desc.kind) {
            if let Some(exp) = ctx.align_exp(d) {
                self.align(exp);
            }
        }
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
struct SymbolData {
    addr: u32,
    span: Range<usize>,
}

/// The symbol table created in the first assembler pass.
///
/// This maps every label to the address it was defined at.
/// Labels are case-sensitive.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct SymbolTable {
    label_map: HashMap<String, SymbolData>,
}

impl SymbolTable {
    /// Creates a new symbol table.
    ///
    /// This performs the first assembler pass, calculating the memory address of
    /// every label.
    ///
    /// ## Example
    /// ```
    /// use mips_ensemble::parse::{lex::lex, parse};
    /// use mips_ensemble::asm::SymbolTable;
    ///
    /// let src = "
    ///     .data
    ///     value: .word 7
    ///     .text
    ///     main: lw $t0, 0($gp)
    ///     end:
    /// ";
    /// let (tokens, _) = lex(src);
    /// let (nodes, _) = parse(src, &tokens);
    ///
    /// let sym = SymbolTable::new(src, &tokens, &nodes).unwrap();
    /// assert_eq!(sym.lookup_label("value"), Some(0x1001_0000));
    /// assert_eq!(sym.lookup_label("main"), Some(0x0040_0000));
    /// assert_eq!(sym.lookup_label("end"), Some(0x0040_0004));
    /// assert_eq!(sym.lookup_label("MAIN"), None);
    /// ```
    pub fn new(src: &str, tokens: &[Token], nodes: &[Node]) -> Result<Self, AsmErr> {
        Self::build(Ctx { src, tokens }, nodes)
    }

    fn build(ctx: Ctx, nodes: &[Node]) -> Result<Self, AsmErr> {
        let mut cursor = Cursor::new();
        let mut label_map: HashMap<String, SymbolData> = HashMap::new();

        for node in nodes {
            match node {
                Node::Label(label) => {
                    let span = label.start.offset..label.end.offset;
                    match label_map.entry(label.name.clone()) {
                        Entry::Occupied(e) => {
                            let span1 = e.get().span.clone();
                            return Err(AsmErr::new(AsmErrKind::OverlappingLabels(label.name.clone()), [span1, span]));
                        },
                        Entry::Vacant(e) => {
                            e.insert(SymbolData { addr: cursor.addr(), span });
                        },
                    }
                },
                Node::Directive(d) => {
                    cursor.step_directive(ctx, d);
                    cursor.shift(ctx.directive_size(d));
                },
                Node::Instruction(instr) => cursor.shift(ctx.instr_size(instr)),
            }
        }

        log::debug!("pass 1: resolved {} labels", label_map.len());
        Ok(SymbolTable { label_map })
    }

    /// Gets the memory address of a given label (if it exists).
    pub fn lookup_label(&self, label: &str) -> Option<u32> {
        self.label_map.get(label).map(|sym_data| sym_data.addr)
    }

    /// Gets the label at a given memory address (if it exists).
    ///
    /// If several labels share the address, the alphabetically first is returned.
    ///
    /// ## Example
    /// ```
    /// use mips_ensemble::parse::{lex::lex, parse};
    /// use mips_ensemble::asm::SymbolTable;
    ///
    /// let src = "loop: addi $t0, $t0, 1\nj loop\nexit: syscall";
    /// let (tokens, _) = lex(src);
    /// let (nodes, _) = parse(src, &tokens);
    ///
    /// let sym = SymbolTable::new(src, &tokens, &nodes).unwrap();
    /// assert_eq!(sym.rev_lookup_label(0x0040_0000), Some("loop"));
    /// assert_eq!(sym.rev_lookup_label(0x0040_0004), None);
    /// assert_eq!(sym.rev_lookup_label(0x0040_0008), Some("exit"));
    /// ```
    pub fn rev_lookup_label(&self, addr: u32) -> Option<&str> {
        self.label_map.iter()
            .filter(|&(_, sym_data)| sym_data.addr == addr)
            .map(|(label, _)| &**label)
            .min()
    }

    /// Gets the source span of a given label's definition (if it exists).
    pub fn get_label_source(&self, label: &str) -> Option<Range<usize>> {
        self.label_map.get(label)
            .map(|data| data.span.clone())
    }

    /// Gets an iterable of the mapping from labels to addresses, sorted by address.
    pub fn label_iter(&self) -> impl Iterator<Item=(&str, u32)> + '_ {
        let mut labels: Vec<_> = self.label_map.iter()
            .map(|(label, sym_data)| (&**label, sym_data.addr))
            .collect();
        labels.sort_by_key(|&(label, addr)| (addr, label));
        labels.into_iter()
    }

    /// The number of labels.
    pub fn len(&self) -> usize {
        self.label_map.len()
    }

    /// Whether there are no labels.
    pub fn is_empty(&self) -> bool {
        self.label_map.is_empty()
    }
}

/// The output of the assembler: an initialized memory plus the information needed to run and inspect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryImage {
    mem: Mem,
    sym: SymbolTable,
    text: Range<u32>,
    data: Range<u32>,
}
impl MemoryImage {
    /// Creates an empty memory image (with nothing in the text or data segment).
    pub fn empty() -> Self {
        Self {
            mem: Mem::new(),
            sym: SymbolTable::default(),
            text: TEXT_BASE..TEXT_BASE,
            data: DATA_BASE..DATA_BASE,
        }
    }

    fn new(ctx: Ctx, nodes: &[Node], sym: SymbolTable) -> Result<Self, AsmErr> {
        let mut image = Self { sym, ..Self::empty() };
        let mut cursor = Cursor::new();

        for node in nodes {
            match node {
                Node::Label(_) => {},
                Node::Directive(d) => {
                    cursor.step_directive(ctx, d);
                    let addr = cursor.addr();
                    image.emit_directive(ctx, d, addr)?;
                    cursor.shift(ctx.directive_size(d));
                },
                Node::Instruction(instr) => {
                    let pc = cursor.addr();
                    if pc % 4 != 0 {
                        return Err(AsmErr::new(AsmErrKind::Misaligned(pc), (instr.start, instr.end)));
                    }
                    let words = image.encode(ctx, instr, pc)?;
                    for (i, word) in (0..).zip(words) {
                        image.mem.set_raw(pc.wrapping_add(4 * i), word);
                    }
                    cursor.shift(ctx.instr_size(instr));
                },
            }
        }

        image.text.end = cursor.code;
        image.data.end = cursor.data;
        log::debug!(
            "pass 2: emitted {} text bytes, {} data bytes",
            image.text.end.wrapping_sub(image.text.start),
            image.data.end.wrapping_sub(image.data.start)
        );
        Ok(image)
    }

    fn label(&self, name: &str, span: (Position, Position)) -> Result<u32, AsmErr> {
        self.sym.lookup_label(name)
            .ok_or_else(|| AsmErr::new(AsmErrKind::UnknownLabel(name.to_string()), span))
    }

    fn emit_directive(&mut self, ctx: Ctx, d: &Directive, addr: u32) -> Result<(), AsmErr> {
        let Some(desc) = isa::directive(&d.name) else {
            return Err(AsmErr::new(AsmErrKind::UnsupportedDirective(d.name.clone()), (d.start, d.end)));
        };

        let mut addr = addr;
        match desc.kind {
            DirectiveKind::Data(width) => for arg in &d.args {
                let malformed = || AsmErr::new(AsmErrKind::MalformedOperand, (arg.start, arg.end));
                let bytes = match width {
                    DataWidth::Byte => vec![ctx.arg_number(arg).ok_or_else(malformed)? as u8],
                    DataWidth::Half => (ctx.arg_number(arg).ok_or_else(malformed)? as u16).to_le_bytes().to_vec(),
                    DataWidth::Word => {
                        let value = match arg.single(ctx.tokens).map(|t| &t.kind) {
                            Some(TokenKind::Ident(name)) => self.label(name, (arg.start, arg.end))?,
                            _ => ctx.arg_number(arg).ok_or_else(malformed)? as u32,
                        };
                        value.to_le_bytes().to_vec()
                    },
                    DataWidth::Float => {
                        let value = parse_float(arg.text(ctx.src)).ok_or_else(malformed)? as f32;
                        value.to_bits().to_le_bytes().to_vec()
                    },
                    DataWidth::Double => {
                        let bits = parse_float(arg.text(ctx.src)).ok_or_else(malformed)?.to_bits();
                        let hi = (bits >> 32) as u32;
                        let lo = bits as u32;
                        [hi.to_le_bytes(), lo.to_le_bytes()].concat()
                    },
                };
                self.mem.write_bytes(addr, &bytes);
                addr = addr.wrapping_add(width.size());
            },
            DirectiveKind::Str { null_terminated } => for arg in &d.args {
                let s = ctx.arg_str(arg)
                    .ok_or_else(|| AsmErr::new(AsmErrKind::MalformedOperand, (arg.start, arg.end)))?;
                self.mem.write_bytes(addr, s.as_bytes());
                addr = addr.wrapping_add(s.len() as u32);
                if null_terminated {
                    self.mem.write_byte(addr, 0);
                    addr = addr.wrapping_add(1);
                }
            },
            DirectiveKind::Unsupported => {
                return Err(AsmErr::new(AsmErrKind::UnsupportedDirective(d.name.clone()), (d.start, d.end)));
            },
            // .space is never written: unwritten memory already reads as zero.
            DirectiveKind::Section(_) | DirectiveKind::Align | DirectiveKind::Space | DirectiveKind::Ignored => {},
        }
        Ok(())
    }

    /// Encodes an instruction at address `pc` into one or two machine words.
    fn encode(&self, ctx: Ctx, instr: &Instruction, pc: u32) -> Result<Vec<u32>, AsmErr> {
        let ops = Operands { ctx, image: self, instr };
        let desc = instr.op.desc();
        let base = real(instr.op);

        let word = match (desc.format, desc.shape) {
            (Format::Pseudo, _) => return self.expand_pseudo(ops),

            (Format::R { .. }, Shape::RdRsRt) => base.with_rd(ops.reg(0)?).with_rs(ops.reg(1)?).with_rt(ops.reg(2)?),
            (Format::R { .. }, Shape::RdRtShamt) => base.with_rd(ops.reg(0)?).with_rt(ops.reg(1)?).with_shamt(ops.num(2)? as u8),
            (Format::R { .. }, Shape::RdRtRs) => base.with_rd(ops.reg(0)?).with_rt(ops.reg(1)?).with_rs(ops.reg(2)?),
            (Format::R { .. }, Shape::RsRt) => base.with_rs(ops.reg(0)?).with_rt(ops.reg(1)?),
            (Format::R { .. }, Shape::Rd) => base.with_rd(ops.reg(0)?),
            (Format::R { .. }, Shape::Rs) if instr.op == Op::Jalr => base.with_rs(ops.reg(0)?).with_rd(RA),
            (Format::R { .. }, Shape::Rs) => base.with_rs(ops.reg(0)?),
            (Format::R { .. }, Shape::NoArgs) => base,

            (Format::I { .. }, Shape::RtRsImm) => base.with_rt(ops.reg(0)?).with_rs(ops.reg(1)?).with_imm(ops.num(2)? as u32),
            (Format::I { .. }, Shape::RtUpper) => base.with_rt(ops.reg(0)?).with_imm(ops.num(1)? as u32),
            (Format::I { .. }, Shape::RtDisp) => {
                let (offset, reg) = ops.disp(1)?;
                base.with_rt(ops.reg(0)?).with_rs(reg).with_imm(offset as u32)
            },
            (Format::I { .. }, Shape::RsRtTarget) => {
                base.with_rs(ops.reg(0)?).with_rt(ops.reg(1)?).with_imm(branch_offset(pc, ops.target(2)?))
            },
            (Format::I { .. } | Format::RegImm { .. }, Shape::RsTarget) => {
                base.with_rs(ops.reg(0)?).with_imm(branch_offset(pc, ops.target(1)?))
            },

            (Format::J { .. }, Shape::Target) => base.with_target_addr(ops.target(0)?),

            _ => return Err(AsmErr::new(AsmErrKind::MalformedOperand, (instr.start, instr.end))),
        };

        log::trace!("0x{pc:08X}: {:08X} {}", word.get(), instr.op);
        Ok(vec![word.get()])
    }

    fn expand_pseudo(&self, ops: Operands) -> Result<Vec<u32>, AsmErr> {
        let instr = ops.instr;
        match instr.op {
            Op::Nop => Ok(vec![0]),
            Op::Move => {
                let word = real(Op::Addu).with_rd(ops.reg(0)?).with_rs(ops.reg(1)?).with_rt(ZERO);
                Ok(vec![word.get()])
            },
            Op::Li => {
                let rt = ops.reg(0)?;
                let value = ops.num(1)? as u32;
                let (upper, lower) = (value >> 16, value & 0xFFFF);
                match upper {
                    0 => Ok(vec![real(Op::Ori).with_rt(rt).with_rs(ZERO).with_imm(lower).get()]),
                    _ => Ok(vec![
                        real(Op::Lui).with_rt(rt).with_imm(upper).get(),
                        real(Op::Ori).with_rt(rt).with_rs(rt).with_imm(lower).get(),
                    ]),
                }
            },
            op => Err(AsmErr::new(AsmErrKind::UnimplementedPseudo(op.name().to_string()), (instr.start, instr.end))),
        }
    }

    /// The assembled memory.
    pub fn mem(&self) -> &Mem {
        &self.mem
    }

    /// The symbol table computed in the first pass.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.sym
    }

    /// The addresses the text segment occupies.
    pub fn text_range(&self) -> Range<u32> {
        self.text.clone()
    }

    /// The addresses the data segment occupies.
    pub fn data_range(&self) -> Range<u32> {
        self.data.clone()
    }

    /// The address execution starts at.
    ///
    /// This is the `main` label if one is defined in the text segment, otherwise the text base.
    pub fn entry_point(&self) -> u32 {
        self.sym.lookup_label("main")
            .filter(|addr| self.text.contains(addr))
            .unwrap_or(TEXT_BASE)
    }
}

/// The word an instruction's table entry fixes (opcode, function code, and `rt` for `RegImm`).
fn real(op: Op) -> InstrWord {
    match op.desc().format {
        Format::R { funct } => InstrWord::funct(funct),
        Format::I { opcode } | Format::J { opcode } => InstrWord::op(opcode),
        Format::RegImm { rt } => InstrWord::op(isa::REGIMM_OPCODE).with_rt_raw(rt),
        Format::Pseudo => InstrWord::default(),
    }
}

/// Typed access to an instruction's operands.
#[derive(Clone, Copy)]
struct Operands<'a> {
    ctx: Ctx<'a>,
    image: &'a MemoryImage,
    instr: &'a Instruction,
}
impl Operands<'_> {
    fn get(&self, i: usize) -> Result<&Operand, AsmErr> {
        self.instr.operands.get(i)
            .ok_or_else(|| AsmErr::new(AsmErrKind::MalformedOperand, (self.instr.start, self.instr.end)))
    }

    fn malformed(&self, operand: &Operand) -> AsmErr {
        AsmErr::new(AsmErrKind::MalformedOperand, operand.span(self.ctx.tokens))
    }

    fn reg(&self, i: usize) -> Result<Reg, AsmErr> {
        match *self.get(i)? {
            Operand::Register { reg, .. } => Ok(reg),
            ref op => Err(self.malformed(op)),
        }
    }

    fn num(&self, i: usize) -> Result<i64, AsmErr> {
        let op = self.get(i)?;
        match *op {
            Operand::Immediate { token } => match self.ctx.imm(token) {
                Some(ImmValue::Number(n)) => Ok(n),
                _ => Err(self.malformed(op)),
            },
            _ => Err(self.malformed(op)),
        }
    }

    /// A branch or jump destination: a label's address or an absolute numeric address.
    fn target(&self, i: usize) -> Result<u32, AsmErr> {
        let op = self.get(i)?;
        match *op {
            Operand::Immediate { token } => match self.ctx.imm(token) {
                Some(ImmValue::Number(n)) => Ok(n as u32),
                Some(ImmValue::Label(name)) => self.image.label(name, op.span(self.ctx.tokens)),
                None => Err(self.malformed(op)),
            },
            _ => Err(self.malformed(op)),
        }
    }

    fn disp(&self, i: usize) -> Result<(i64, Reg), AsmErr> {
        let op = self.get(i)?;
        match *op {
            Operand::Displacement { offset: None, base, .. } => Ok((0, base)),
            Operand::Displacement { offset: Some(token), base, .. } => match self.ctx.imm(token) {
                Some(ImmValue::Number(n)) => Ok((n, base)),
                _ => Err(self.malformed(op)),
            },
            _ => Err(self.malformed(op)),
        }
    }
}
