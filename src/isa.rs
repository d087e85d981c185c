//! The static instruction set tables.
//!
//! Every stage of the toolchain consults this one module, so the parser, validator,
//! generator, and simulator can never disagree about what an instruction is:
//! - [`is_known`]: does a mnemonic exist? (parser)
//! - [`shape_of`]: what operands does it take? (validator)
//! - [`encoding_of`]: how is it laid out in a machine word? (generator, simulator)
//!
//! This module also holds the register name table ([`register_number`])
//! and the directive table ([`directive`]).

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::asm::encoding::InstrWord;

/// Start of the text (code) segment.
pub const TEXT_BASE: u32 = 0x0040_0000;
/// Start of the data segment.
pub const DATA_BASE: u32 = 0x1001_0000;

/// Conventional register names, indexed by register number.
pub const REGISTER_NAMES: [&str; 32] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3",
    "t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7",
    "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7",
    "t8", "t9", "k0", "k1", "gp", "sp", "fp", "ra",
];

/// Looks up a register by its textual name (without the `$`).
///
/// Both numeric names (`0`-`31`) and conventional aliases (`t0`, `sp`, `ra`, ...) are accepted.
/// Names are case-sensitive.
///
/// ```
/// use mips_ensemble::isa::register_number;
///
/// assert_eq!(register_number("t0"), Some(8));
/// assert_eq!(register_number("29"), Some(29));
/// assert_eq!(register_number("bp"), Some(30));
/// assert_eq!(register_number("T0"), None);
/// assert_eq!(register_number("32"), None);
/// ```
pub fn register_number(name: &str) -> Option<u8> {
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
        return name.parse::<u8>().ok().filter(|&n| n < 32);
    }

    match name {
        "bp" => Some(30),
        _ => REGISTER_NAMES.iter()
            .position(|&n| n == name)
            .and_then(|i| u8::try_from(i).ok()),
    }
}

/// How an instruction is laid out in a machine word.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Format {
    /// Register format (opcode 0), distinguished by function code.
    R {
        /// Function code (bits 0..5).
        funct: u8
    },
    /// Immediate format.
    I {
        /// Opcode (bits 26..31).
        opcode: u8
    },
    /// Immediate format under opcode 1, distinguished by the `rt` field.
    RegImm {
        /// Value of the `rt` field (bits 16..20).
        rt: u8
    },
    /// Jump format.
    J {
        /// Opcode (bits 26..31).
        opcode: u8
    },
    /// No direct encoding; expanded by the assembler.
    Pseudo,
}

/// Opcode shared by every [`Format::RegImm`] instruction.
pub const REGIMM_OPCODE: u8 = 0x01;

/// A range an immediate operand must fall within.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct ImmRange {
    /// Smallest accepted value.
    pub min: i64,
    /// Largest accepted value.
    pub max: i64,
    /// Message reported when the value is out of range.
    pub message: &'static str,
}
impl ImmRange {
    /// Whether `value` is inside this range.
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Shift amount of `sll`/`srl`/`sra`.
pub const SHAMT: ImmRange = ImmRange { min: 0, max: 31, message: "Shift amount must be in range 0-31" };
/// 16-bit signed immediate of I-type instructions.
pub const IMM16: ImmRange = ImmRange { min: -32768, max: 32767, message: "Immediate value must be in range -32768 to 32767" };
/// Upper-half immediate of `lui`.
pub const UPPER16: ImmRange = ImmRange { min: -32768, max: 65535, message: "Immediate value must be in range -32768 to 65535" };
/// 32-bit signed immediate of `li`.
pub const IMM32: ImmRange = ImmRange { min: -2147483648, max: 2147483647, message: "Immediate value must be in range -2147483648 to 2147483647" };
/// Load/store displacement.
pub const DISPLACEMENT: ImmRange = ImmRange { min: -32768, max: 32767, message: "Displacement must be in range -32768 to 32767" };

/// The kind of one operand slot of an instruction.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum OperandKind {
    /// A register operand.
    Register,
    /// A numeric immediate within a range.
    Immediate(ImmRange),
    /// An `offset(register)` operand.
    Displacement,
    /// A branch or jump destination: a label or an absolute address.
    Target,
    /// A label only.
    Label,
}

/// The operand signature of an instruction.
///
/// The variant name lists operands in source order, using the field they are encoded into.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Shape {
    /// `add rd, rs, rt`
    RdRsRt,
    /// `sll rd, rt, shamt`
    RdRtShamt,
    /// `sllv rd, rt, rs`
    RdRtRs,
    /// `mult rs, rt`
    RsRt,
    /// `mfhi rd`
    Rd,
    /// `jr rs`
    Rs,
    /// `addi rt, rs, imm`
    RtRsImm,
    /// `lui rt, imm`
    RtUpper,
    /// `lw rt, offset(rs)`
    RtDisp,
    /// `beq rs, rt, target`
    RsRtTarget,
    /// `bgez rs, target`
    RsTarget,
    /// `j target`
    Target,
    /// `move rd, rs`
    RdRs,
    /// `li rt, imm32`
    RtImm32,
    /// `la rt, label`
    RtLabel,
    /// `syscall`
    NoArgs,
}
impl Shape {
    /// The operand kinds this shape expects, in order.
    pub fn operands(self) -> &'static [OperandKind] {
        use OperandKind::*;
        match self {
            Shape::RdRsRt     => &[Register, Register, Register],
            Shape::RdRtShamt  => &[Register, Register, Immediate(SHAMT)],
            Shape::RdRtRs     => &[Register, Register, Register],
            Shape::RsRt       => &[Register, Register],
            Shape::Rd         => &[Register],
            Shape::Rs         => &[Register],
            Shape::RtRsImm    => &[Register, Register, Immediate(IMM16)],
            Shape::RtUpper    => &[Register, Immediate(UPPER16)],
            Shape::RtDisp     => &[Register, Displacement],
            Shape::RsRtTarget => &[Register, Register, Target],
            Shape::RsTarget   => &[Register, Target],
            Shape::Target     => &[Target],
            Shape::RdRs       => &[Register, Register],
            Shape::RtImm32    => &[Register, Immediate(IMM32)],
            Shape::RtLabel    => &[Register, Label],
            Shape::NoArgs     => &[],
        }
    }
}

/// One entry of the instruction table.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct InstrDesc {
    /// Mnemonic, in lowercase.
    pub name: &'static str,
    /// The operation.
    pub op: Op,
    /// Machine layout.
    pub format: Format,
    /// Operand signature.
    pub shape: Shape,
}

macro_rules! instr_table {
    ($($name:literal => $op:ident, $format:expr, $shape:ident;)+) => {
        /// Every instruction mnemonic the toolchain knows.
        ///
        /// Variants are in the same order as the instruction table,
        /// so [`Op::desc`] is a direct index.
        #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
        pub enum Op {
            $(
                #[allow(missing_docs)]
                $op
            ),+
        }

        static INSTRUCTIONS: &[InstrDesc] = &[
            $(InstrDesc { name: $name, op: Op::$op, format: $format, shape: Shape::$shape }),+
        ];
    };
}

use Format::{I, J, Pseudo, RegImm, R};
instr_table! {
    "sll"     => Sll,     R { funct: 0x00 },     RdRtShamt;
    "srl"     => Srl,     R { funct: 0x02 },     RdRtShamt;
    "sra"     => Sra,     R { funct: 0x03 },     RdRtShamt;
    "sllv"    => Sllv,    R { funct: 0x04 },     RdRtRs;
    "srlv"    => Srlv,    R { funct: 0x06 },     RdRtRs;
    "srav"    => Srav,    R { funct: 0x07 },     RdRtRs;
    "jr"      => Jr,      R { funct: 0x08 },     Rs;
    "jalr"    => Jalr,    R { funct: 0x09 },     Rs;
    "syscall" => Syscall, R { funct: 0x0C },     NoArgs;
    "break"   => Break,   R { funct: 0x0D },     NoArgs;
    "mfhi"    => Mfhi,    R { funct: 0x10 },     Rd;
    "mthi"    => Mthi,    R { funct: 0x11 },     Rs;
    "mflo"    => Mflo,    R { funct: 0x12 },     Rd;
    "mtlo"    => Mtlo,    R { funct: 0x13 },     Rs;
    "mult"    => Mult,    R { funct: 0x18 },     RsRt;
    "multu"   => Multu,   R { funct: 0x19 },     RsRt;
    "div"     => Div,     R { funct: 0x1A },     RsRt;
    "divu"    => Divu,    R { funct: 0x1B },     RsRt;
    "add"     => Add,     R { funct: 0x20 },     RdRsRt;
    "addu"    => Addu,    R { funct: 0x21 },     RdRsRt;
    "sub"     => Sub,     R { funct: 0x22 },     RdRsRt;
    "subu"    => Subu,    R { funct: 0x23 },     RdRsRt;
    "and"     => And,     R { funct: 0x24 },     RdRsRt;
    "or"      => Or,      R { funct: 0x25 },     RdRsRt;
    "xor"     => Xor,     R { funct: 0x26 },     RdRsRt;
    "nor"     => Nor,     R { funct: 0x27 },     RdRsRt;
    "slt"     => Slt,     R { funct: 0x2A },     RdRsRt;
    "sltu"    => Sltu,    R { funct: 0x2B },     RdRsRt;
    "bltz"    => Bltz,    RegImm { rt: 0x00 },   RsTarget;
    "bgez"    => Bgez,    RegImm { rt: 0x01 },   RsTarget;
    "bltzal"  => Bltzal,  RegImm { rt: 0x10 },   RsTarget;
    "bgezal"  => Bgezal,  RegImm { rt: 0x11 },   RsTarget;
    "j"       => J,       J { opcode: 0x02 },    Target;
    "jal"     => Jal,     J { opcode: 0x03 },    Target;
    "beq"     => Beq,     I { opcode: 0x04 },    RsRtTarget;
    "bne"     => Bne,     I { opcode: 0x05 },    RsRtTarget;
    "blez"    => Blez,    I { opcode: 0x06 },    RsTarget;
    "bgtz"    => Bgtz,    I { opcode: 0x07 },    RsTarget;
    "addi"    => Addi,    I { opcode: 0x08 },    RtRsImm;
    "addiu"   => Addiu,   I { opcode: 0x09 },    RtRsImm;
    "slti"    => Slti,    I { opcode: 0x0A },    RtRsImm;
    "sltiu"   => Sltiu,   I { opcode: 0x0B },    RtRsImm;
    "andi"    => Andi,    I { opcode: 0x0C },    RtRsImm;
    "ori"     => Ori,     I { opcode: 0x0D },    RtRsImm;
    "xori"    => Xori,    I { opcode: 0x0E },    RtRsImm;
    "lui"     => Lui,     I { opcode: 0x0F },    RtUpper;
    "lb"      => Lb,      I { opcode: 0x20 },    RtDisp;
    "lh"      => Lh,      I { opcode: 0x21 },    RtDisp;
    "lw"      => Lw,      I { opcode: 0x23 },    RtDisp;
    "lbu"     => Lbu,     I { opcode: 0x24 },    RtDisp;
    "lhu"     => Lhu,     I { opcode: 0x25 },    RtDisp;
    "sb"      => Sb,      I { opcode: 0x28 },    RtDisp;
    "sh"      => Sh,      I { opcode: 0x29 },    RtDisp;
    "sw"      => Sw,      I { opcode: 0x2B },    RtDisp;
    "nop"     => Nop,     Pseudo,                NoArgs;
    "move"    => Move,    Pseudo,                RdRs;
    "li"      => Li,      Pseudo,                RtImm32;
    "la"      => La,      Pseudo,                RtLabel;
    "blt"     => Blt,     Pseudo,                RsRtTarget;
    "bgt"     => Bgt,     Pseudo,                RsRtTarget;
    "ble"     => Ble,     Pseudo,                RsRtTarget;
    "bge"     => Bge,     Pseudo,                RsRtTarget;
    "not"     => Not,     Pseudo,                RdRs;
    "neg"     => Neg,     Pseudo,                RdRs;
    "abs"     => Abs,     Pseudo,                RdRs;
}

impl Op {
    /// The table entry for this operation.
    pub fn desc(self) -> &'static InstrDesc {
        &INSTRUCTIONS[self as usize]
    }

    /// The mnemonic for this operation.
    pub fn name(self) -> &'static str {
        self.desc().name
    }
}
impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Finds the table entry for a mnemonic (ASCII case-insensitive).
pub fn lookup(name: &str) -> Option<&'static InstrDesc> {
    INSTRUCTIONS.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

/// Whether the mnemonic names a known instruction.
pub fn is_known(name: &str) -> bool {
    lookup(name).is_some()
}

/// The operand signature of a mnemonic.
pub fn shape_of(name: &str) -> Option<Shape> {
    lookup(name).map(|d| d.shape)
}

/// The machine layout of a mnemonic.
pub fn encoding_of(name: &str) -> Option<Format> {
    lookup(name).map(|d| d.format)
}

/// Iterates over every instruction entry.
pub fn instructions() -> impl Iterator<Item = &'static InstrDesc> {
    INSTRUCTIONS.iter()
}

#[derive(PartialEq, Eq, Hash)]
enum DecodeKey {
    Funct(u8),
    RegImm(u8),
    Opcode(u8),
}

/// Identifies which table entry a machine word encodes.
///
/// Returns `None` if the word has no matching entry.
///
/// ```
/// use mips_ensemble::isa::{decode, Op};
///
/// assert_eq!(decode(0x012A_4020).map(|d| d.op), Some(Op::Add));
/// assert_eq!(decode(0x0000_000C).map(|d| d.op), Some(Op::Syscall));
/// assert_eq!(decode(0xFC00_0000), None);
/// ```
pub fn decode(word: u32) -> Option<&'static InstrDesc> {
    static DECODE_MAP: OnceLock<HashMap<DecodeKey, &'static InstrDesc>> = OnceLock::new();

    let map = DECODE_MAP.get_or_init(|| {
        INSTRUCTIONS.iter()
            .filter_map(|d| {
                let key = match d.format {
                    Format::R { funct }   => DecodeKey::Funct(funct),
                    Format::RegImm { rt } => DecodeKey::RegImm(rt),
                    Format::I { opcode } | Format::J { opcode } => DecodeKey::Opcode(opcode),
                    Format::Pseudo => return None,
                };
                Some((key, d))
            })
            .collect()
    });

    let word = InstrWord(word);
    let key = match word.opcode() {
        0 => DecodeKey::Funct(word.funct_field()),
        REGIMM_OPCODE => DecodeKey::RegImm(word.rt().reg_no()),
        opcode => DecodeKey::Opcode(opcode),
    };
    map.get(&key).copied()
}

/// Renders a machine word as assembly text.
///
/// Branch and jump destinations are printed as absolute addresses, computed from `pc`.
/// Words with no table entry render as a `.word` directive.
///
/// ```
/// use mips_ensemble::isa::disassemble;
///
/// assert_eq!(disassemble(0x012A_4020, 0x0040_0000), "add $t0, $t1, $t2");
/// assert_eq!(disassemble(0x0000_0000, 0x0040_0000), "nop");
/// assert_eq!(disassemble(0x8FA8_0004, 0x0040_0000), "lw $t0, 4($sp)");
/// ```
pub fn disassemble(word: u32, pc: u32) -> String {
    use crate::asm::encoding::jump_dest;

    if word == 0 {
        return String::from("nop");
    }
    let Some(desc) = decode(word) else {
        return format!(".word 0x{word:08X}");
    };

    let w = InstrWord(word);
    let name = desc.name;
    let branch_dest = pc.wrapping_add(4).wrapping_add((w.signed_imm() as u32) << 2);

    match desc.shape {
        Shape::RdRsRt     => format!("{name} {}, {}, {}", w.rd(), w.rs(), w.rt()),
        Shape::RdRtShamt  => format!("{name} {}, {}, {}", w.rd(), w.rt(), w.shamt()),
        Shape::RdRtRs     => format!("{name} {}, {}, {}", w.rd(), w.rt(), w.rs()),
        Shape::RsRt       => format!("{name} {}, {}", w.rs(), w.rt()),
        Shape::Rd         => format!("{name} {}", w.rd()),
        Shape::Rs         => format!("{name} {}", w.rs()),
        Shape::RtRsImm    => format!("{name} {}, {}, {}", w.rt(), w.rs(), w.signed_imm()),
        Shape::RtUpper    => format!("{name} {}, 0x{:X}", w.rt(), w.imm()),
        Shape::RtDisp     => format!("{name} {}, {}({})", w.rt(), w.signed_imm(), w.rs()),
        Shape::RsRtTarget => format!("{name} {}, {}, 0x{branch_dest:08X}", w.rs(), w.rt()),
        Shape::RsTarget   => format!("{name} {}, 0x{branch_dest:08X}", w.rs()),
        Shape::Target     => format!("{name} 0x{:08X}", jump_dest(pc, w.target())),
        Shape::NoArgs     => name.to_string(),
        // pseudo-instructions are never decoded
        Shape::RdRs | Shape::RtImm32 | Shape::RtLabel => format!(".word 0x{word:08X}"),
    }
}

/// A segment of the memory image.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub enum Section {
    /// The text segment, starting at [`TEXT_BASE`].
    #[default]
    Code,
    /// The data segment, starting at [`DATA_BASE`].
    Data,
}
impl Section {
    /// The base address of this segment.
    pub fn base(self) -> u32 {
        match self {
            Section::Code => TEXT_BASE,
            Section::Data => DATA_BASE,
        }
    }
}

/// The width of one data-emission directive argument.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum DataWidth {
    /// `.byte`
    Byte,
    /// `.half`
    Half,
    /// `.word`
    Word,
    /// `.float`
    Float,
    /// `.double`
    Double,
}
impl DataWidth {
    /// Number of bytes one argument occupies.
    pub fn size(self) -> u32 {
        match self {
            DataWidth::Byte   => 1,
            DataWidth::Half   => 2,
            DataWidth::Word   => 4,
            DataWidth::Float  => 4,
            DataWidth::Double => 8,
        }
    }

    /// Accepted range and out-of-range message for integer widths.
    pub fn range(self) -> Option<ImmRange> {
        match self {
            DataWidth::Byte => Some(ImmRange { min: -128, max: 255, message: "Invalid byte value" }),
            DataWidth::Half => Some(ImmRange { min: -32768, max: 65535, message: "Invalid half value" }),
            DataWidth::Word => Some(ImmRange { min: -2147483648, max: 4294967295, message: "Invalid word value" }),
            DataWidth::Float | DataWidth::Double => None,
        }
    }
}

/// What a directive does.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum DirectiveKind {
    /// Switches the current section.
    Section(Section),
    /// Emits numeric data.
    Data(DataWidth),
    /// Emits string bytes.
    Str {
        /// Whether a null byte follows each string.
        null_terminated: bool
    },
    /// Aligns the current section to a power of two.
    Align,
    /// Reserves zeroed bytes.
    Space,
    /// Recognized but has no effect.
    Ignored,
    /// Recognized but always rejected.
    Unsupported,
}

/// One entry of the directive table.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct DirectiveDesc {
    /// Name, without the leading `.`.
    pub name: &'static str,
    /// Semantic kind.
    pub kind: DirectiveKind,
}

static DIRECTIVES: &[DirectiveDesc] = &[
    DirectiveDesc { name: "align",     kind: DirectiveKind::Align },
    DirectiveDesc { name: "ascii",     kind: DirectiveKind::Str { null_terminated: false } },
    DirectiveDesc { name: "asciiz",    kind: DirectiveKind::Str { null_terminated: true } },
    DirectiveDesc { name: "byte",      kind: DirectiveKind::Data(DataWidth::Byte) },
    DirectiveDesc { name: "data",      kind: DirectiveKind::Section(Section::Data) },
    DirectiveDesc { name: "double",    kind: DirectiveKind::Data(DataWidth::Double) },
    DirectiveDesc { name: "float",     kind: DirectiveKind::Data(DataWidth::Float) },
    DirectiveDesc { name: "half",      kind: DirectiveKind::Data(DataWidth::Half) },
    DirectiveDesc { name: "space",     kind: DirectiveKind::Space },
    DirectiveDesc { name: "word",      kind: DirectiveKind::Data(DataWidth::Word) },
    DirectiveDesc { name: "text",      kind: DirectiveKind::Section(Section::Code) },
    DirectiveDesc { name: "code",      kind: DirectiveKind::Section(Section::Code) },
    DirectiveDesc { name: "globl",     kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "extern",    kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "set",       kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "eqv",       kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "macro",     kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "end_macro", kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "kdata",     kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "ktext",     kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "section",   kind: DirectiveKind::Unsupported },
    DirectiveDesc { name: "file",      kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "line",      kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "ent",       kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "end",       kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "org",       kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "repeat",    kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "endr",      kind: DirectiveKind::Ignored },
    DirectiveDesc { name: "include",   kind: DirectiveKind::Ignored },
];

/// Finds the table entry for a directive name (without the leading `.`, ASCII case-insensitive).
pub fn directive(name: &str) -> Option<&'static DirectiveDesc> {
    DIRECTIVES.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

/// If the directive switches sections, the section it switches to.
///
/// Both the validator and the generator track sections through this function.
pub fn section_switch(name: &str) -> Option<Section> {
    match directive(name)?.kind {
        DirectiveKind::Section(s) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order() {
        for (i, desc) in instructions().enumerate() {
            assert_eq!(desc.op as usize, i, "{} is out of order", desc.name);
            assert_eq!(desc.op.desc(), desc);
        }
    }

    #[test]
    fn test_queries_agree() {
        for desc in instructions() {
            assert!(is_known(desc.name));
            assert_eq!(shape_of(desc.name), Some(desc.shape));
            assert_eq!(encoding_of(desc.name), Some(desc.format));
        }
        assert!(is_known("ADD"));
        assert!(!is_known("addz"));
        assert_eq!(shape_of("frobnicate"), None);
        assert_eq!(encoding_of("frobnicate"), None);
    }

    #[test]
    fn test_decode_covers_real_instructions() {
        for desc in instructions() {
            let word = match desc.format {
                Format::R { funct }   => InstrWord::funct(funct),
                Format::RegImm { rt } => InstrWord::op(REGIMM_OPCODE).with_rt_raw(rt),
                Format::I { opcode } | Format::J { opcode } => InstrWord::op(opcode),
                Format::Pseudo => continue,
            };
            assert_eq!(decode(word.get()).map(|d| d.op), Some(desc.op), "{}", desc.name);
        }
    }

    #[test]
    fn test_registers() {
        for (i, name) in REGISTER_NAMES.iter().enumerate() {
            assert_eq!(register_number(name), Some(i as u8));
            assert_eq!(register_number(&i.to_string()), Some(i as u8));
        }
        assert_eq!(register_number("t9"), Some(25));
        assert_eq!(register_number("fp"), Some(30));
        assert_eq!(register_number(""), None);
        assert_eq!(register_number("t10"), None);
        assert_eq!(register_number("999"), None);
    }

    #[test]
    fn test_directives() {
        assert_eq!(directive("byte").map(|d| d.kind), Some(DirectiveKind::Data(DataWidth::Byte)));
        assert_eq!(directive("section").map(|d| d.kind), Some(DirectiveKind::Unsupported));
        assert!(directive("end_macro").is_some());
        assert!(directive("orig").is_none());

        assert_eq!(section_switch("text"), Some(Section::Code));
        assert_eq!(section_switch("code"), Some(Section::Code));
        assert_eq!(section_switch("data"), Some(Section::Data));
        assert_eq!(section_switch("word"), None);
    }

    #[test]
    fn test_disassemble() {
        // beq $t0, $zero, +2
        assert_eq!(disassemble(0x1100_0002, 0x0040_0000), "beq $t0, $zero, 0x0040000C");
        // j 0x00400000
        assert_eq!(disassemble(0x0810_0000, 0x0040_0008), "j 0x00400000");
        // sll $t0, $t1, 4
        assert_eq!(disassemble(0x0009_4100, 0x0040_0000), "sll $t0, $t1, 4");
        assert_eq!(disassemble(0xFFFF_FFFF, 0x0040_0000), ".word 0xFFFFFFFF");
    }
}
