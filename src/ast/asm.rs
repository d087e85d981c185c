//! Syntax nodes produced by the parser.
//!
//! Nodes do not copy token data. Instead, they refer to tokens by their index
//! into the token sequence produced by [`lex`], so later stages can always recover
//! the exact source text (via [`Token::slice`]) and the lexer's classification.
//!
//! [`lex`]: crate::parse::lex::lex
use crate::err::Position;
use crate::isa::Op;
use crate::parse::lex::{Token, TokenKind};

use super::Reg;

/// Index of a token in the token sequence.
pub type TokenId = usize;

/// A syntax node, one statement-level unit of source.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Node {
    /// A label definition (e.g., `loop:`).
    Label(Label),
    /// A directive (e.g., `.word 1, 2, 3`).
    Directive(Directive),
    /// An instruction (e.g., `add $t0, $t1, $t2`).
    Instruction(Instruction),
}
impl Node {
    /// Start of this node's span.
    pub fn start(&self) -> Position {
        match self {
            Node::Label(n)       => n.start,
            Node::Directive(n)   => n.start,
            Node::Instruction(n) => n.start,
        }
    }

    /// End of this node's span.
    pub fn end(&self) -> Position {
        match self {
            Node::Label(n)       => n.end,
            Node::Directive(n)   => n.end,
            Node::Instruction(n) => n.end,
        }
    }
}

/// A label definition.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Label {
    /// Label name, without the colon.
    pub name: String,
    /// The `LABEL` token.
    pub token: TokenId,
    #[allow(missing_docs)]
    pub start: Position,
    #[allow(missing_docs)]
    pub end: Position,
}

/// A directive and its arguments.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Directive {
    /// Directive name, without the leading `.`.
    pub name: String,
    /// The `DIRECTIVE` token.
    pub token: TokenId,
    /// Comma-separated arguments.
    pub args: Vec<DirectiveArg>,
    #[allow(missing_docs)]
    pub start: Position,
    #[allow(missing_docs)]
    pub end: Position,
}

/// One argument of a directive, which is a run of one or more tokens.
///
/// Leading and trailing whitespace and comments are not part of the run.
/// A run can span several tokens: `1.5` lexes as a `NUMBER` and a `DIRECTIVE`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DirectiveArg {
    /// The tokens in the run (never empty).
    pub tokens: std::ops::Range<TokenId>,
    #[allow(missing_docs)]
    pub start: Position,
    #[allow(missing_docs)]
    pub end: Position,
}
impl DirectiveArg {
    /// The exact source text of this argument.
    pub fn text<'s>(&self, src: &'s str) -> &'s str {
        &src[self.start.offset..self.end.offset]
    }

    /// The token of this argument, if the argument is a single token
    /// (whitespace inside the run is ignored).
    pub fn single<'t>(&self, tokens: &'t [Token]) -> Option<&'t Token> {
        let mut it = tokens[self.tokens.clone()].iter()
            .filter(|t| !t.kind.is_trivia());
        match (it.next(), it.next()) {
            (Some(t), None) => Some(t),
            _ => None,
        }
    }
}

/// An instruction and its operands.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Instruction {
    /// The operation named by the mnemonic.
    pub op: Op,
    /// The mnemonic (`IDENTIFIER`) token.
    pub token: TokenId,
    /// Operands, in source order.
    pub operands: Vec<Operand>,
    #[allow(missing_docs)]
    pub start: Position,
    #[allow(missing_docs)]
    pub end: Position,
}

/// An operand of an instruction.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Operand {
    /// A register (e.g., `$t0`).
    Register {
        /// The register.
        reg: Reg,
        /// The `REGISTER` token.
        token: TokenId
    },
    /// A number or identifier (e.g., `42`, `-1`, `loop`).
    Immediate {
        /// The `NUMBER` or `IDENTIFIER` token.
        token: TokenId
    },
    /// A displacement (e.g., `4($sp)`, `($a0)`).
    Displacement {
        /// The offset token (`NUMBER` or `IDENTIFIER`), if one was written.
        offset: Option<TokenId>,
        /// The base register.
        base: Reg,
        /// Start of the operand.
        start: Position,
        /// End of the operand (after the `)`).
        end: Position,
    },
}
impl Operand {
    /// The span of this operand.
    pub fn span(&self, tokens: &[Token]) -> (Position, Position) {
        match *self {
            Operand::Register { token, .. } | Operand::Immediate { token } => (tokens[token].start, tokens[token].end),
            Operand::Displacement { start, end, .. } => (start, end),
        }
    }
}

/// What an immediate operand token holds.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ImmValue<'t> {
    /// A number.
    Number(i64),
    /// A label reference.
    Label(&'t str),
}

/// Reads an immediate operand's token.
///
/// The numeric value is re-read from the source lexeme (ignoring any whitespace
/// between a sign and its digits) rather than trusted from the lexer.
///
/// Returns `None` if the token is neither a number nor an identifier.
pub fn imm_value<'t>(src: &str, tokens: &'t [Token], token: TokenId) -> Option<ImmValue<'t>> {
    let tok = &tokens[token];
    match &tok.kind {
        TokenKind::Number(_) => parse_number(tok.slice(src)).map(ImmValue::Number),
        TokenKind::Ident(name) => Some(ImmValue::Label(name)),
        _ => None,
    }
}

/// Parses a decimal integer literal with an optional sign,
/// allowing spaces and tabs between the sign and the digits.
///
/// ```
/// use mips_ensemble::ast::asm::parse_number;
///
/// assert_eq!(parse_number("42"), Some(42));
/// assert_eq!(parse_number("-128"), Some(-128));
/// assert_eq!(parse_number("- 5"), Some(-5));
/// assert_eq!(parse_number("+\t7"), Some(7));
/// assert_eq!(parse_number("abc"), None);
/// ```
pub fn parse_number(lexeme: &str) -> Option<i64> {
    let (negative, digits) = match lexeme.as_bytes().first() {
        Some(b'-') => (true, &lexeme[1..]),
        Some(b'+') => (false, &lexeme[1..]),
        _ => (false, lexeme),
    };
    let digits = digits.trim_start_matches([' ', '\t']);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let magnitude = digits.parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
