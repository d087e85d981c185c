//! Semantic checks over parsed syntax nodes.
//!
//! The validator walks the nodes in order, tracking the current section, and reports:
//! - directives and instructions placed in the wrong section,
//! - instructions with the wrong number or kind of operands (per [`Shape`]),
//! - literals outside the range their instruction or directive accepts,
//! - label references that are never defined, and labels defined twice.
//!
//! Every problem found becomes a [`Diagnostic`]; nothing is ever short-circuited,
//! so one statement can produce several diagnostics.
//!
//! ```
//! use mips_ensemble::parse::{lex::lex, parse};
//! use mips_ensemble::validate::validate;
//!
//! let src = ".text\nsll $t0, $t1, 32";
//! let (tokens, _) = lex(src);
//! let (nodes, _) = parse(src, &tokens);
//! let diags = validate(src, &tokens, &nodes);
//!
//! assert_eq!(diags.len(), 1);
//! assert_eq!(diags[0].message, "Shift amount must be in range 0-31");
//! ```
//!
//! [`Shape`]: crate::isa::Shape

use std::collections::HashMap;

use crate::ast::asm::{imm_value, parse_number, Directive, DirectiveArg, ImmValue, Instruction, Node, Operand};
use crate::err::{Diagnostic, Position};
use crate::isa::{self, DataWidth, DirectiveKind, ImmRange, OperandKind, Section, DISPLACEMENT};
use crate::parse::lex::{Token, TokenKind};

/// Absolute addresses used as branch or jump destinations.
const ADDRESS: ImmRange = ImmRange { min: 0, max: 0xFFFF_FFFF, message: "Address must be in range 0 to 4294967295" };

/// Validates parsed nodes.
///
/// `tokens` and `nodes` should be the outputs of [`lex`] and [`parse`] on `src`.
/// Validation produces no data other than its diagnostics.
///
/// [`lex`]: crate::parse::lex::lex
/// [`parse`]: crate::parse::parse
pub fn validate(src: &str, tokens: &[Token], nodes: &[Node]) -> Vec<Diagnostic> {
    let mut validator = Validator {
        src,
        tokens,
        section: Section::default(),
        labels: HashMap::new(),
        diags: vec![],
    };
    validator.collect_labels(nodes);
    for node in nodes {
        match node {
            Node::Label(_) => {},
            Node::Directive(d) => validator.check_directive(d),
            Node::Instruction(i) => validator.check_instruction(i),
        }
    }
    log::trace!("validated {} nodes with {} diagnostics", nodes.len(), validator.diags.len());

    validator.diags
}

struct Validator<'a> {
    src: &'a str,
    tokens: &'a [Token],
    section: Section,
    labels: HashMap<&'a str, Position>,
    diags: Vec<Diagnostic>,
}

impl<'a> Validator<'a> {
    fn report(&mut self, (start, end): (Position, Position), message: impl Into<String>) {
        self.diags.push(Diagnostic::new(start, end, message));
    }

    fn collect_labels(&mut self, nodes: &'a [Node]) {
        for node in nodes {
            let Node::Label(label) = node else { continue };
            if self.labels.contains_key(label.name.as_str()) {
                self.report((label.start, label.end), format!("Label '{}' is already defined", label.name));
            } else {
                self.labels.insert(&label.name, label.start);
            }
        }
    }

    fn check_label_ref(&mut self, name: &str, span: (Position, Position)) {
        if !self.labels.contains_key(name) {
            self.report(span, format!("Unknown label '{name}'"));
        }
    }

    fn require_data_section(&mut self, d: &Directive) {
        if self.section != Section::Data {
            self.report((d.start, d.end), format!("Data directive .{} used in code section", d.name));
        }
    }

    fn check_directive(&mut self, d: &Directive) {
        let Some(desc) = isa::directive(&d.name) else {
            self.report((d.start, d.end), format!("Unknown directive '.{}'", d.name));
            return;
        };

        if let Some(section) = isa::section_switch(&d.name) {
            self.section = section;
        }
        match desc.kind {
            DirectiveKind::Section(_) => {},
            DirectiveKind::Data(width) => {
                self.require_data_section(d);
                if d.args.is_empty() {
                    self.report((d.start, d.end), format!("Expected at least 1 argument in .{} directive", d.name));
                }
                for arg in &d.args {
                    self.check_data_arg(d, width, arg);
                }
            },
            DirectiveKind::Str { .. } => {
                self.require_data_section(d);
                if d.args.is_empty() {
                    self.report((d.start, d.end), format!("Expected at least 1 argument in .{} directive", d.name));
                }
                for arg in &d.args {
                    if !matches!(arg.single(self.tokens).map(|t| &t.kind), Some(TokenKind::Str(_))) {
                        self.report((arg.start, arg.end), format!("Expected string arguments in .{} directive", d.name));
                    }
                }
            },
            DirectiveKind::Align => {
                let range = ImmRange { min: 0, max: 16, message: "Alignment must be in range 0-16" };
                self.check_single_number(d, range);
            },
            DirectiveKind::Space => {
                self.require_data_section(d);
                let range = ImmRange { min: 0, max: 0xFFFF_FFFF, message: "Size must be non-negative" };
                self.check_single_number(d, range);
            },
            DirectiveKind::Ignored => {},
            DirectiveKind::Unsupported => {
                self.report((d.start, d.end), format!("Directive .{} is not supported", d.name));
            },
        }
    }

    /// Checks a directive that takes exactly one integer argument.
    fn check_single_number(&mut self, d: &Directive, range: ImmRange) {
        let [arg] = &d.args[..] else {
            self.report((d.start, d.end), format!("Expected 1 argument in .{} directive", d.name));
            return;
        };

        match self.arg_number(arg) {
            Some(n) if range.contains(n) => {},
            Some(_) => self.report((arg.start, arg.end), range.message),
            None => self.report((arg.start, arg.end), format!("Expected integer argument in .{} directive", d.name)),
        }
    }

    /// The integer value of a single-token numeric argument, re-read from its lexeme.
    fn arg_number(&self, arg: &DirectiveArg) -> Option<i64> {
        let tok = arg.single(self.tokens)?;
        match tok.kind {
            TokenKind::Number(_) => parse_number(tok.slice(self.src)),
            _ => None,
        }
    }

    fn check_data_arg(&mut self, d: &Directive, width: DataWidth, arg: &DirectiveArg) {
        let span = (arg.start, arg.end);

        let Some(range) = width.range() else {
            // floating point
            let first_is_number = self.tokens[arg.tokens.clone()].first()
                .is_some_and(|t| matches!(t.kind, TokenKind::Number(_)));
            if !first_is_number || parse_float(arg.text(self.src)).is_none() {
                self.report(span, format!("Expected floating-point arguments in .{} directive", d.name));
            }
            return;
        };

        match arg.single(self.tokens).map(|t| &t.kind) {
            Some(TokenKind::Number(_)) => match self.arg_number(arg) {
                Some(n) if range.contains(n) => {},
                _ => self.report(span, range.message),
            },
            Some(TokenKind::Ident(name)) if width == DataWidth::Word => self.check_label_ref(name, span),
            _ => self.report(span, format!("Expected integer arguments in .{} directive", d.name)),
        }
    }

    fn check_instruction(&mut self, instr: &Instruction) {
        let span = (instr.start, instr.end);
        if self.section != Section::Code {
            self.report(span, "Instruction used outside of code section");
        }

        let name = self.tokens[instr.token].slice(self.src);
        let Some(shape) = isa::shape_of(name) else {
            self.report(span, format!("Unknown instruction {name}"));
            return;
        };

        let expected = shape.operands();
        if instr.operands.len() != expected.len() {
            let message = match expected.len() {
                0 => format!("Expected no arguments for '{name}'"),
                1 => format!("Expected 1 argument for '{name}'"),
                n => format!("Expected {n} arguments for '{name}'"),
            };
            self.report(span, message);
        }

        for (i, (&kind, operand)) in expected.iter().zip(&instr.operands).enumerate() {
            self.check_operand(name, i + 1, kind, operand);
        }
    }

    fn check_operand(&mut self, name: &str, k: usize, kind: OperandKind, operand: &Operand) {
        let span = operand.span(self.tokens);
        let value = match *operand {
            Operand::Immediate { token } => imm_value(self.src, self.tokens, token),
            _ => None,
        };

        match (kind, operand) {
            (OperandKind::Register, Operand::Register { .. }) => {},
            (OperandKind::Register, _) => {
                self.report(span, format!("Expected register as argument {k} of '{name}'"));
            },

            (OperandKind::Immediate(range), Operand::Immediate { .. }) => match value {
                Some(ImmValue::Number(n)) if range.contains(n) => {},
                Some(ImmValue::Number(_)) => self.report(span, range.message),
                _ => self.report(span, format!("Expected immediate value as argument {k} of '{name}'")),
            },
            (OperandKind::Immediate(_), _) => {
                self.report(span, format!("Expected immediate value as argument {k} of '{name}'"));
            },

            (OperandKind::Displacement, &Operand::Displacement { offset, .. }) => {
                let offset = offset.and_then(|t| imm_value(self.src, self.tokens, t));
                match offset {
                    None => {},
                    Some(ImmValue::Number(n)) if DISPLACEMENT.contains(n) => {},
                    Some(ImmValue::Number(_)) => self.report(span, DISPLACEMENT.message),
                    Some(ImmValue::Label(_)) => {
                        self.report(span, format!("Expected numeric offset in argument {k} of '{name}'"));
                    },
                }
            },
            (OperandKind::Displacement, _) => {
                self.report(span, format!("Expected displacement operand (offset(register)) as argument {k} of '{name}'"));
            },

            (OperandKind::Target, Operand::Immediate { .. }) => match value {
                Some(ImmValue::Label(label)) => self.check_label_ref(label, span),
                Some(ImmValue::Number(n)) if ADDRESS.contains(n) => {},
                Some(ImmValue::Number(_)) => self.report(span, ADDRESS.message),
                None => self.report(span, format!("Expected label or immediate value as argument {k} of '{name}'")),
            },
            (OperandKind::Target, _) => {
                self.report(span, format!("Expected label or immediate value as argument {k} of '{name}'"));
            },

            (OperandKind::Label, Operand::Immediate { .. }) => match value {
                Some(ImmValue::Label(label)) => self.check_label_ref(label, span),
                _ => self.report(span, format!("Expected label as argument {k} of '{name}'")),
            },
            (OperandKind::Label, _) => {
                self.report(span, format!("Expected label as argument {k} of '{name}'"));
            },
        }
    }
}

/// Parses a floating-point directive argument, ignoring spaces and tabs inside it.
pub(crate) fn parse_float(text: &str) -> Option<f64> {
    let compact: String = text.chars()
        .filter(|c| !matches!(c, ' ' | '\t'))
        .collect();
    compact.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use crate::ast::asm::{Instruction, Node};
    use crate::err::Position;
    use crate::isa::Op;
    use crate::parse::{lex::lex, parse};

    use super::validate;

    fn validate_src(src: &str) -> Vec<String> {
        let (tokens, lex_diags) = lex(src);
        assert!(lex_diags.is_empty(), "{lex_diags:?}");
        let (nodes, parse_diags) = parse(src, &tokens);
        assert!(parse_diags.is_empty(), "{parse_diags:?}");
        validate(src, &tokens, &nodes)
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn test_clean() {
        let src = "
            .data
            msg: .asciiz \"hello\"
            nums: .word 1, -1, 4294967295, msg
            .half 65535, -32768
            .byte 255, -128
            .float 1.5, -2
            .double 3.25
            .align 2
            .space 8
            .text
            main:
                add $t0, $t1, $t2
                sll $t0, $t0, 31
                addi $t0, $t0, -32768
                lui $t0, 65535
                lw $t0, 32767($sp)
                sw $t0, ($sp)
                beq $t0, $zero, main
                bgez $t0, 4194304
                j main
                jr $ra
                move $t0, $t1
                li $t0, -2147483648
                la $a0, msg
                mult $t0, $t1
                mflo $t2
                syscall
                nop
        ";
        assert_eq!(validate_src(src), Vec::<String>::new());
    }

    #[test]
    fn test_sections() {
        let diags = validate_src(".byte 1\n.data\nadd $t0, $t0, $t0\n.code\n.asciiz \"x\"");
        assert_eq!(diags, [
            "Data directive .byte used in code section",
            "Instruction used outside of code section",
            "Data directive .asciiz used in code section",
        ]);
    }

    #[test]
    fn test_byte_bounds() {
        assert!(validate_src(".data\n.byte 255").is_empty());
        assert!(validate_src(".data\n.byte -128").is_empty());
        assert_eq!(validate_src(".data\n.byte 256"), ["Invalid byte value"]);
        assert_eq!(validate_src(".data\n.byte -129"), ["Invalid byte value"]);
        // every offending argument is reported
        assert_eq!(validate_src(".data\n.byte 1, 300, -200"), ["Invalid byte value", "Invalid byte value"]);
    }

    #[test]
    fn test_half_word_bounds() {
        assert!(validate_src(".data\n.half 65535, -32768").is_empty());
        assert_eq!(validate_src(".data\n.half 65536"), ["Invalid half value"]);
        assert_eq!(validate_src(".data\n.half -32769"), ["Invalid half value"]);
        assert!(validate_src(".data\n.word 4294967295, -2147483648").is_empty());
        assert_eq!(validate_src(".data\n.word 4294967296"), ["Invalid word value"]);
        assert_eq!(validate_src(".data\n.word -2147483649"), ["Invalid word value"]);
    }

    #[test]
    fn test_range_rereads_lexeme() {
        assert_eq!(validate_src(".data\n.byte - 129"), ["Invalid byte value"]);
        assert!(validate_src(".data\n.byte - 128").is_empty());
    }

    #[test]
    fn test_shift_amount() {
        assert_eq!(validate_src(".text\nsll $t0, $t1, 32"), ["Shift amount must be in range 0-31"]);
        assert_eq!(validate_src("srl $t0, $t1, -1"), ["Shift amount must be in range 0-31"]);
    }

    #[test]
    fn test_immediates() {
        assert_eq!(validate_src("addi $t0, $t0, 32768"), ["Immediate value must be in range -32768 to 32767"]);
        assert_eq!(validate_src("li $t0, 2147483648"), ["Immediate value must be in range -2147483648 to 2147483647"]);
        assert_eq!(validate_src("lw $t0, -32769($sp)"), ["Displacement must be in range -32768 to 32767"]);
        assert_eq!(validate_src("addi $t0, $t0, foo"), ["Expected immediate value as argument 3 of 'addi'"]);
    }

    #[test]
    fn test_shapes() {
        assert_eq!(validate_src("add $t0, $t1"), ["Expected 3 arguments for 'add'"]);
        assert_eq!(validate_src("add $t0, $t1, 5"), ["Expected register as argument 3 of 'add'"]);
        assert_eq!(validate_src("jr 5"), ["Expected register as argument 1 of 'jr'"]);
        assert_eq!(validate_src("syscall $t0"), ["Expected no arguments for 'syscall'"]);
        assert_eq!(validate_src("nop 1"), ["Expected no arguments for 'nop'"]);
        assert_eq!(validate_src("lw $t0, $t1"), ["Expected displacement operand (offset(register)) as argument 2 of 'lw'"]);
        assert_eq!(validate_src("j $ra"), ["Expected label or immediate value as argument 1 of 'j'"]);
        assert_eq!(validate_src("la $a0, 5"), ["Expected label as argument 2 of 'la'"]);
        assert_eq!(validate_src("move $t0"), ["Expected 2 arguments for 'move'"]);
        assert_eq!(validate_src("jal"), ["Expected 1 argument for 'jal'"]);
    }

    #[test]
    fn test_multiple_diagnostics_per_statement() {
        let diags = validate_src(".data\nsll $t0, 5, 40");
        assert_eq!(diags, [
            "Instruction used outside of code section",
            "Expected register as argument 2 of 'sll'",
            "Shift amount must be in range 0-31",
        ]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(validate_src("beq $t0, $t1, nowhere"), ["Unknown label 'nowhere'"]);
        assert_eq!(validate_src("a: nop\na: nop"), ["Label 'a' is already defined"]);
        assert!(validate_src("j later\nlater: nop").is_empty());
        assert_eq!(validate_src(".data\n.word missing"), ["Unknown label 'missing'"]);
    }

    #[test]
    fn test_directive_args() {
        assert_eq!(validate_src(".data\n.ascii 5"), ["Expected string arguments in .ascii directive"]);
        assert_eq!(validate_src(".data\n.float \"x\""), ["Expected floating-point arguments in .float directive"]);
        assert_eq!(validate_src(".data\n.double abc"), ["Expected floating-point arguments in .double directive"]);
        assert_eq!(validate_src(".data\n.byte \"x\""), ["Expected integer arguments in .byte directive"]);
        assert_eq!(validate_src(".align 17"), ["Alignment must be in range 0-16"]);
        assert_eq!(validate_src(".align"), ["Expected 1 argument in .align directive"]);
        assert_eq!(validate_src(".data\n.space -1"), ["Size must be non-negative"]);
        assert_eq!(validate_src(".section .foo"), ["Directive .section is not supported"]);
        assert!(validate_src(".globl main\n.extern x 4\n.set noreorder").is_empty());
    }

    #[test]
    fn test_unknown_instruction_from_mismatched_tables() {
        // a node whose mnemonic token does not name an instruction
        let src = "frob";
        let (tokens, _) = lex(src);
        let node = Node::Instruction(Instruction {
            op: Op::Nop,
            token: 0,
            operands: vec![],
            start: Position::new(0, 0),
            end: Position::new(4, 0),
        });
        let diags = validate(src, &tokens, &[node]);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Unknown instruction frob");
    }

    #[test]
    fn test_idempotent() {
        let src = ".data\n.byte 300\n.text\nadd $t0\nbeq $t0, $t0, x";
        assert_eq!(validate_src(src), validate_src(src));
    }
}
