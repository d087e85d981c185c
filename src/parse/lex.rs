//! Tokenizing MIPS assembly.
//!
//! This module holds the tokens that characterize MIPS assembly ([`Token`], [`TokenKind`]).
//! The parser consumes the output of [`lex`] to build syntax nodes.
//!
//! Tokenization is lossless: every byte of the source belongs to exactly one token
//! (spaces and tabs are tokens too), and the sequence always ends with one
//! [`TokenKind::Eof`] at the end of the input.
//!
//! ```
//! use mips_ensemble::parse::lex::{lex, TokenKind};
//!
//! let (tokens, diags) = lex("loop: addi $t0, $t0, -1");
//! assert!(diags.is_empty());
//! assert_eq!(tokens[0].kind, TokenKind::Label("loop".to_string()));
//! assert_eq!(tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
//! ```

use logos::{Lexer, Logos};

use crate::ast::asm::parse_number;
use crate::ast::Reg;
use crate::err::{Diagnostic, Position};
use crate::isa::register_number;

/// The raw lexemes recognized by the scanner.
///
/// [`lex`] converts these into [`TokenKind`]s and adds position and error information.
#[derive(Debug, Logos, PartialEq, Eq)]
#[logos(error = LexErr)]
enum Lexeme {
    /// A single space.
    #[token(" ")]
    Space,

    /// A single tab.
    #[token("\t")]
    Tab,

    /// A new line (`\n` or `\r\n`).
    #[regex(r"\r?\n")]
    NewLine,

    // This regex collects the whole run after `$` and validates it
    // against the register table in the callback.
    /// A register (e.g., `$t0`, `$31`).
    #[regex(r"\$[A-Za-z0-9]*", lex_reg)]
    Reg(Reg),

    /// A decimal number, optionally signed (e.g., `9`, `-14`, `+ 3`).
    #[regex(r"[0-9]+", lex_number)]
    #[regex(r"[+-][ \t]*[0-9]+", lex_number)]
    #[token("+", lex_sign)]
    #[token("-", lex_sign)]
    Number(i64),

    /// An identifier (an instruction mnemonic or a label reference).
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lx| lx.slice().to_string())]
    Ident(String),

    /// A label definition (e.g., `main:`).
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*:", |lx| lx.slice().trim_end_matches(':').to_string())]
    Label(String),

    /// A directive (e.g., `.text`, `.asciiz`).
    #[regex(r"\.[A-Za-z0-9_]+", |lx| lx.slice()[1..].to_string())]
    Directive(String),

    /// A string literal (e.g., `"Hello!"`, `'x'`)
    #[token("\"", lex_str_literal)]
    #[token("'", lex_str_literal)]
    Str(String),

    /// A comment, which starts with `#` and spans the remaining part of the line.
    #[regex(r"#[^\r\n]*")]
    Comment,

    /// A comma, which delineates operands of an instruction.
    #[token(",")]
    Comma,

    /// An opening parenthesis of a displacement operand.
    #[token("(")]
    LeftParen,

    /// A closing parenthesis of a displacement operand.
    #[token(")")]
    RightParen,
}

/// The classification of a token.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum TokenKind {
    /// An identifier (e.g., `add`, `loop`).
    Ident(String),
    /// A register (e.g., `$t0`, `$31`).
    Reg(Reg),
    /// A decimal number, possibly signed.
    Number(i64),
    /// A string literal, with escapes already decoded.
    Str(String),
    /// A directive; holds the name without its leading `.`.
    Directive(String),
    /// A label definition; holds the name without its trailing `:`.
    Label(String),
    /// `,`
    Comma,
    /// A single space.
    Space,
    /// A single tab.
    Tab,
    /// `\n` or `\r\n`
    NewLine,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// A `#` comment.
    Comment,
    /// Text that could not be tokenized. A diagnostic is always reported alongside it.
    Invalid,
    /// The end of the input.
    Eof,
}
impl TokenKind {
    /// Whether this token carries no syntactic meaning (spaces, tabs, and comments).
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Space | TokenKind::Tab | TokenKind::Comment)
    }

    /// Whether this token ends a statement.
    pub fn is_line_end(&self) -> bool {
        matches!(self, TokenKind::NewLine | TokenKind::Eof)
    }
}
impl From<Lexeme> for TokenKind {
    fn from(value: Lexeme) -> Self {
        match value {
            Lexeme::Space        => TokenKind::Space,
            Lexeme::Tab          => TokenKind::Tab,
            Lexeme::NewLine      => TokenKind::NewLine,
            Lexeme::Reg(r)       => TokenKind::Reg(r),
            Lexeme::Number(n)    => TokenKind::Number(n),
            Lexeme::Ident(s)     => TokenKind::Ident(s),
            Lexeme::Label(s)     => TokenKind::Label(s),
            Lexeme::Directive(s) => TokenKind::Directive(s),
            Lexeme::Str(s)       => TokenKind::Str(s),
            Lexeme::Comment      => TokenKind::Comment,
            Lexeme::Comma        => TokenKind::Comma,
            Lexeme::LeftParen    => TokenKind::LeftParen,
            Lexeme::RightParen   => TokenKind::RightParen,
        }
    }
}

/// A classified unit of source text with its span.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Token {
    /// What the token is.
    pub kind: TokenKind,
    /// Start of the token.
    pub start: Position,
    /// End of the token (exclusive).
    pub end: Position,
}
impl Token {
    /// The exact source text of this token.
    pub fn slice<'s>(&self, src: &'s str) -> &'s str {
        &src[self.start.offset..self.end.offset]
    }
}

/// Any errors raised in attempting to tokenize an input stream.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum LexErr {
    /// Numeric literal has too many digits to be represented.
    DoesNotFit,
    /// String literal is missing an end quotation mark.
    UnclosedStrLit,
    /// Token had the format `$name`, but `name` isn't a register.
    InvalidReg,
    /// A symbol was used which is not allowed in MIPS assembly files
    #[default]
    InvalidSymbol
}
impl std::fmt::Display for LexErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErr::DoesNotFit     => f.write_str("Number literal does not fit in 64 bits"),
            LexErr::UnclosedStrLit => f.write_str("Unclosed string"),
            LexErr::InvalidReg     => f.write_str("Invalid register name"),
            LexErr::InvalidSymbol  => f.write_str("Invalid character"),
        }
    }
}
impl std::error::Error for LexErr {}
impl crate::err::Error for LexErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match self {
            LexErr::DoesNotFit     => Some("no instruction or directive accepts a value this large".into()),
            LexErr::UnclosedStrLit => Some("add a matching quote to the end of the string literal".into()),
            LexErr::InvalidReg     => Some("registers are $0-$31 or a conventional name like $t0, $sp, $ra".into()),
            LexErr::InvalidSymbol  => Some("this char does not occur in any token in MIPS assembly".into()),
        }
    }
}

fn lex_reg(lx: &Lexer<'_, Lexeme>) -> Result<Reg, LexErr> {
    register_number(&lx.slice()[1..])
        .map(Reg)
        .ok_or(LexErr::InvalidReg)
}
fn lex_number(lx: &Lexer<'_, Lexeme>) -> Result<i64, LexErr> {
    parse_number(lx.slice()).ok_or(LexErr::DoesNotFit)
}
// A sign with no digits after it is an invalid character on its own,
// so any whitespace after it is lexed separately.
fn lex_sign(_lx: &Lexer<'_, Lexeme>) -> Result<i64, LexErr> {
    Err(LexErr::InvalidSymbol)
}
fn lex_str_literal(lx: &mut Lexer<'_, Lexeme>) -> Result<String, LexErr> {
    let quote = match lx.slice() {
        "'" => '\'',
        _ => '"',
    };
    let rem = lx.remainder()
        .lines()
        .next()
        .unwrap_or("");

    // find the closing quote, skipping over escaped characters
    let mut close = None;
    let mut chars = rem.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => { chars.next(); },
            c if c == quote => {
                close.replace(i);
                break;
            },
            _ => {}
        }
    }

    let Some(len) = close else {
        lx.bump(rem.len());
        return Err(LexErr::UnclosedStrLit);
    };
    lx.bump(len + 1);

    let mut buf = String::with_capacity(len);
    let mut chars = rem[..len].chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            buf.push(c);
            continue;
        }
        match chars.next() {
            Some('n')  => buf.push('\n'),
            Some('t')  => buf.push('\t'),
            Some('r')  => buf.push('\r'),
            Some('0')  => buf.push('\0'),
            Some('\\') => buf.push('\\'),
            Some('\'') => buf.push('\''),
            Some('"')  => buf.push('"'),
            Some(c) => {
                buf.push('\\');
                buf.push(c);
            }
            None => buf.push('\\'),
        }
    }

    Ok(buf)
}

/// Tokenizes source text.
///
/// This always terminates and always returns a token sequence ending in exactly one
/// [`TokenKind::Eof`] positioned at the end of the input.
/// Text that cannot be tokenized becomes a [`TokenKind::Invalid`] token,
/// accompanied by a diagnostic over the same span.
pub fn lex(src: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut tokens = vec![];
    let mut diags = vec![];
    let mut line = 0;

    let mut lexer = Lexeme::lexer(src);
    while let Some(result) = lexer.next() {
        if result.is_err() {
            // keep invalid spans on char boundaries so slicing stays valid
            let end = lexer.span().end;
            let boundary = (end..=src.len())
                .find(|&i| src.is_char_boundary(i))
                .unwrap_or(src.len());
            if boundary > end {
                lexer.bump(boundary - end);
            }
        }

        let span = lexer.span();
        let start = Position::new(span.start, line);
        line += src[span.clone()].bytes().filter(|&b| b == b'\n').count();
        let end = Position::new(span.end, line);

        let kind = match result {
            Ok(lexeme) => TokenKind::from(lexeme),
            Err(e) => {
                diags.push(Diagnostic::new(start, end, e.to_string()));
                TokenKind::Invalid
            }
        };
        tokens.push(Token { kind, start, end });
    }

    let eof = Position::new(src.len(), line);
    tokens.push(Token { kind: TokenKind::Eof, start: eof, end: eof });
    log::trace!("lexed {} tokens with {} diagnostics", tokens.len(), diags.len());

    (tokens, diags)
}

#[cfg(test)]
mod tests {
    use logos::Logos;

    use crate::ast::reg_consts::{RA, SP, T0, ZERO};
    use crate::ast::Reg;
    use crate::err::Position;

    use super::{lex, LexErr, Lexeme, TokenKind};

    fn ident(s: &str) -> Lexeme {
        Lexeme::Ident(s.to_string())
    }
    fn directive(s: &str) -> Lexeme {
        Lexeme::Directive(s.to_string())
    }
    fn str_literal(s: &str) -> Lexeme {
        Lexeme::Str(s.to_string())
    }
    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_numeric() {
        let mut tokens = Lexeme::lexer("0 123 -456 +789");
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Number(0))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Number(123))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Number(-456))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Number(789))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_numeric_inner_whitespace() {
        // a sign separated from its digits is still one literal
        let mut tokens = Lexeme::lexer("- 5,+\t\t6");
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Number(-5))));
        assert_eq!(tokens.slice(), "- 5");
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Comma)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Number(6))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_numeric_overflow() {
        let mut tokens = Lexeme::lexer("9223372036854775807 99999999999999999999");
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Number(i64::MAX))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Err(LexErr::DoesNotFit)));
    }

    #[test]
    fn test_regs() {
        let mut tokens = Lexeme::lexer("$t0 $sp $ra $zero $31 $0");
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Reg(T0))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Reg(SP))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Reg(RA))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Reg(ZERO))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Reg(Reg(31)))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Reg(ZERO))));
        assert_eq!(tokens.next(), None);

        // Failures:
        assert_eq!(Lexeme::lexer("$32").next(), Some(Err(LexErr::InvalidReg)));
        assert_eq!(Lexeme::lexer("$t10").next(), Some(Err(LexErr::InvalidReg)));
        assert_eq!(Lexeme::lexer("$T0").next(), Some(Err(LexErr::InvalidReg)));
        assert_eq!(Lexeme::lexer("$").next(), Some(Err(LexErr::InvalidReg)));
    }

    #[test]
    fn test_invalid_reg_recovers() {
        let (tokens, diags) = lex("$foo, $t1");
        assert_eq!(tokens[0].kind, TokenKind::Invalid);
        assert_eq!(tokens[0].end.offset, 4);
        assert_eq!(tokens[1].kind, TokenKind::Comma);
        assert_eq!(tokens[3].kind, TokenKind::Reg(Reg(9)));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Invalid register name");
        assert_eq!(diags[0].span(), 0..4);
    }

    #[test]
    fn test_str() {
        let mut tokens = Lexeme::lexer(r#""abc" 'def' "it's" '"'"#);
        assert_eq!(tokens.next(), Some(Ok(str_literal("abc"))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(str_literal("def"))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(str_literal("it's"))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(str_literal("\""))));
        assert_eq!(tokens.next(), None);

        let mut tokens = Lexeme::lexer(r#""""#);
        assert_eq!(tokens.next(), Some(Ok(str_literal(""))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_str_escape() {
        let mut tokens = Lexeme::lexer(r#""\n\t\r\0\\\'\"" "\e" "a\"b""#);
        assert_eq!(tokens.next(), Some(Ok(str_literal("\n\t\r\0\\'\""))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(str_literal("\\e"))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(str_literal("a\"b"))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_str_unclosed() {
        assert_eq!(Lexeme::lexer(r#"""#).next(), Some(Err(LexErr::UnclosedStrLit)));
        assert_eq!(Lexeme::lexer(r#""abc\""#).next(), Some(Err(LexErr::UnclosedStrLit)));

        // the bad string stops at the end of its line
        let (tokens, diags) = lex("\"abc\nadd");
        assert_eq!(tokens[0].kind, TokenKind::Invalid);
        assert_eq!(tokens[0].end.offset, 4);
        assert_eq!(tokens[1].kind, TokenKind::NewLine);
        assert_eq!(tokens[2].kind, TokenKind::Ident("add".to_string()));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Unclosed string");
    }

    #[test]
    fn test_idents_labels() {
        let mut tokens = Lexeme::lexer("add _x main: L1:");
        assert_eq!(tokens.next(), Some(Ok(ident("add"))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(ident("_x"))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Label("main".to_string()))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Label("L1".to_string()))));
        assert_eq!(tokens.next(), None);

        // a space before the colon makes it an identifier and an invalid character
        let mut tokens = Lexeme::lexer("main :");
        assert_eq!(tokens.next(), Some(Ok(ident("main"))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Err(LexErr::InvalidSymbol)));
    }

    #[test]
    fn test_directive() {
        let mut tokens = Lexeme::lexer(".text .asciiz .end_macro 1.5");
        assert_eq!(tokens.next(), Some(Ok(directive("text"))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(directive("asciiz"))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(directive("end_macro"))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Space)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Number(1))));
        assert_eq!(tokens.next(), Some(Ok(directive("5"))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_punct() {
        let mut tokens = Lexeme::lexer("0\n1,2(3)\r\n\t# abc, def");
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Number(0))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::NewLine)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Number(1))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Comma)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Number(2))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::LeftParen)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Number(3))));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::RightParen)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::NewLine)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Tab)));
        assert_eq!(tokens.next(), Some(Ok(Lexeme::Comment)));
        assert_eq!(tokens.slice(), "# abc, def");
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_invalid_symbol() {
        for c in ['@', '%', '^', '&', '*', '!', '~', ';', ':', '[', ']', '{', '}', '|', '/', '<', '>', '?', '=', '`', '.', '+', '-'] {
            let string = c.to_string();
            assert_eq!(
                Lexeme::lexer(&string).next(),
                Some(Err(LexErr::InvalidSymbol)),
                "Expected {string:?} to be an invalid symbol"
            );
        }

        let (tokens, diags) = lex("add @ $t0");
        assert_eq!(tokens[2].kind, TokenKind::Invalid);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Invalid character");
    }

    #[test]
    fn test_lone_sign() {
        let spans = |src: &str| -> Vec<(TokenKind, usize, usize)> {
            lex(src).0.into_iter()
                .map(|t| (t.kind, t.start.offset, t.end.offset))
                .collect()
        };

        let (_, diags) = lex("- x");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].span(), 0..1);
        assert_eq!(spans("- x")[..3], [
            (TokenKind::Invalid, 0, 1),
            (TokenKind::Space, 1, 2),
            (TokenKind::Ident("x".to_string()), 2, 3),
        ]);

        assert_eq!(spans("+\t\ty")[..3], [
            (TokenKind::Invalid, 0, 1),
            (TokenKind::Tab, 1, 2),
            (TokenKind::Tab, 2, 3),
        ]);

        let (_, diags) = lex("li $t0, - \n5");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].span(), 8..9);
        assert_eq!(spans("li $t0, - \n5")[5..8], [
            (TokenKind::Invalid, 8, 9),
            (TokenKind::Space, 9, 10),
            (TokenKind::NewLine, 10, 11),
        ]);

        // a sign followed by digits is still one number
        assert_eq!(spans("- 5")[0], (TokenKind::Number(-5), 0, 3));
    }

    #[test]
    fn test_eof() {
        for src in ["", "add", "add\n", "  # comment", "\"unclosed", "a\r\nb\n\n"] {
            let (tokens, _) = lex(src);
            let last = tokens.last().unwrap();
            assert_eq!(last.kind, TokenKind::Eof);
            assert_eq!(last.start.offset, src.len());
            assert_eq!(last.end.offset, src.len());
            assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
        }
    }

    #[test]
    fn test_lossless() {
        let srcs = [
            ".data\nmsg: .asciiz \"hi\\n\"\n.text\nmain:\n\tli $v0, 4 # print\n\tla $a0, msg\r\n\tsyscall",
            "lw $t0, -4($sp)\n\t\tsw $t0, ( $sp )",
            "weird @@ stuff $nope 'unclosed\n- 5 +",
            "héllo wörld \u{1F600}",
        ];
        for src in srcs {
            let (tokens, _) = lex(src);
            let mut rebuilt = String::new();
            let mut offset = 0;
            for tok in &tokens {
                assert_eq!(tok.start.offset, offset, "gap before {tok:?} in {src:?}");
                assert!(tok.end.offset >= tok.start.offset);
                rebuilt.push_str(tok.slice(src));
                offset = tok.end.offset;
            }
            assert_eq!(rebuilt, src);
        }
    }

    #[test]
    fn test_lines() {
        let (tokens, _) = lex("a\nb\r\n\nc");
        let c = tokens.iter().find(|t| t.kind == TokenKind::Ident("c".to_string())).unwrap();
        assert_eq!(c.start, Position::new(6, 3));
        assert_eq!(tokens.last().unwrap().end, Position::new(7, 3));

        // a newline token ends on the following line
        assert_eq!(tokens[1].start.line, 0);
        assert_eq!(tokens[1].end.line, 1);
    }

    #[test]
    fn test_whitespace_not_merged() {
        assert_eq!(kinds("  \t"), vec![TokenKind::Space, TokenKind::Space, TokenKind::Tab, TokenKind::Eof]);
    }
}
