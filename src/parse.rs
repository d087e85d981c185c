//! Parsing assembly source into syntax nodes.
//!
//! This module is used to convert the token sequence produced by [`lex`]
//! into syntax nodes ([`Node`]), which can then be validated and assembled.
//!
//! Parsing never stops at the first problem. When something unexpected is found,
//! a diagnostic is recorded spanning to the end of the line, the rest of that line is
//! skipped, and parsing resumes on the next line.
//!
//! ```
//! use mips_ensemble::parse::{lex::lex, parse};
//! use mips_ensemble::ast::asm::Node;
//!
//! let src = "main: add $t0, $t1, $t2\n.word 1, 2";
//! let (tokens, _) = lex(src);
//! let (nodes, diags) = parse(src, &tokens);
//!
//! assert!(diags.is_empty());
//! assert!(matches!(nodes[0], Node::Label(_)));
//! assert!(matches!(nodes[1], Node::Instruction(_)));
//! assert!(matches!(nodes[2], Node::Directive(_)));
//! ```
//!
//! [`lex`]: lex::lex
pub mod lex;

use crate::ast::asm::{Directive, DirectiveArg, Instruction, Label, Node, Operand, TokenId};
use crate::err::{Diagnostic, Position};
use crate::isa;
use lex::{Token, TokenKind};

static EOF_KIND: TokenKind = TokenKind::Eof;

/// Parses a token sequence into syntax nodes.
///
/// `tokens` should be the output of [`lex::lex`] on `src`.
/// Returns the nodes that could be parsed and a diagnostic for every
/// line that could not.
pub fn parse(src: &str, tokens: &[Token]) -> (Vec<Node>, Vec<Diagnostic>) {
    let mut parser = Parser::new(src, tokens);
    parser.parse_all();
    log::trace!("parsed {} nodes with {} diagnostics", parser.nodes.len(), parser.diags.len());

    (parser.nodes, parser.diags)
}

/// Marker for a statement that was abandoned.
/// Its diagnostic has already been recorded and the line has been skipped.
struct Recovered;

struct Parser<'a> {
    src: &'a str,
    tokens: &'a [Token],
    index: TokenId,
    nodes: Vec<Node>,
    diags: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, tokens: &'a [Token]) -> Self {
        Self { src, tokens, index: 0, nodes: vec![], diags: vec![] }
    }

    fn peek(&self) -> &'a TokenKind {
        self.tokens.get(self.index).map_or(&EOF_KIND, |t| &t.kind)
    }

    /// Start position of the current token.
    fn pos(&self) -> Position {
        match self.tokens.get(self.index) {
            Some(t) => t.start,
            None => self.tokens.last().map_or(Position::default(), |t| t.end),
        }
    }

    fn advance(&mut self) {
        if self.index < self.tokens.len() {
            self.index += 1;
        }
    }

    fn at_line_end(&self) -> bool {
        self.peek().is_line_end()
    }

    /// Skips spaces, tabs, and comments. Safe to call repeatedly.
    fn skip_trivia(&mut self) {
        while self.peek().is_trivia() {
            self.advance();
        }
    }

    /// Records a diagnostic from `start` to the end of the current line,
    /// then consumes the rest of the line (including the newline).
    fn recover(&mut self, start: Position, message: impl Into<String>) -> Recovered {
        while !self.at_line_end() {
            self.advance();
        }
        self.diags.push(Diagnostic::new(start, self.pos(), message));
        if let TokenKind::NewLine = self.peek() {
            self.advance();
        }
        Recovered
    }

    fn parse_all(&mut self) {
        loop {
            self.skip_trivia();
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::NewLine => self.advance(),
                TokenKind::Label(name) => {
                    let tok = &self.tokens[self.index];
                    self.nodes.push(Node::Label(Label {
                        name: name.clone(),
                        token: self.index,
                        start: tok.start,
                        end: tok.end,
                    }));
                    self.advance();
                },
                TokenKind::Ident(_) => {
                    if let Ok(node) = self.parse_instruction() {
                        self.nodes.push(Node::Instruction(node));
                    }
                },
                TokenKind::Directive(_) => {
                    if let Ok(node) = self.parse_directive() {
                        self.nodes.push(Node::Directive(node));
                    }
                },
                _ => {
                    let start = self.pos();
                    self.recover(start, "Expected an instruction, directive, or label");
                }
            }
        }
    }

    fn parse_instruction(&mut self) -> Result<Instruction, Recovered> {
        let token = self.index;
        let tok = &self.tokens[token];
        let name = tok.slice(self.src);
        let Some(desc) = isa::lookup(name) else {
            return Err(self.recover(tok.start, format!("Unknown instruction '{name}'")));
        };
        self.advance();

        let mut operands = vec![];
        let mut end = tok.end;

        self.skip_trivia();
        if !self.at_line_end() {
            loop {
                let operand = self.parse_operand()?;
                end = operand.span(self.tokens).1;
                operands.push(operand);

                self.skip_trivia();
                match self.peek() {
                    TokenKind::Comma => {
                        self.advance();
                        self.skip_trivia();
                    },
                    TokenKind::NewLine | TokenKind::Eof => break,
                    _ => {
                        // keep what was parsed so far
                        let start = self.pos();
                        self.recover(start, format!("Expected ',' between operands of '{name}'"));
                        break;
                    }
                }
            }
        }

        Ok(Instruction { op: desc.op, token, operands, start: tok.start, end })
    }

    fn parse_operand(&mut self) -> Result<Operand, Recovered> {
        let token = self.index;
        let start = self.pos();
        match self.peek() {
            &TokenKind::Reg(reg) => {
                self.advance();
                Ok(Operand::Register { reg, token })
            },
            TokenKind::Ident(_) | TokenKind::Number(_) => {
                self.advance();
                self.skip_trivia();
                match self.peek() {
                    TokenKind::LeftParen => self.parse_displacement(Some(token), start),
                    _ => Ok(Operand::Immediate { token }),
                }
            },
            TokenKind::LeftParen => self.parse_displacement(None, start),
            _ => Err(self.recover(start, "Expected a register, immediate value, label, or displacement operand")),
        }
    }

    /// Parses the `(register)` part of a displacement operand.
    fn parse_displacement(&mut self, offset: Option<TokenId>, start: Position) -> Result<Operand, Recovered> {
        if !matches!(self.peek(), TokenKind::LeftParen) {
            let pos = self.pos();
            return Err(self.recover(pos, "Expected '(' in displacement operand"));
        }
        self.advance();

        self.skip_trivia();
        let &TokenKind::Reg(base) = self.peek() else {
            let pos = self.pos();
            return Err(self.recover(pos, "Expected register in displacement operand"));
        };
        self.advance();

        self.skip_trivia();
        if !matches!(self.peek(), TokenKind::RightParen) {
            let pos = self.pos();
            return Err(self.recover(pos, "Expected ')' after displacement register"));
        }
        let end = self.tokens[self.index].end;
        self.advance();

        Ok(Operand::Displacement { offset, base, start, end })
    }

    fn parse_directive(&mut self) -> Result<Directive, Recovered> {
        let token = self.index;
        let tok = &self.tokens[token];
        let TokenKind::Directive(name) = &tok.kind else {
            return Err(self.recover(tok.start, "Expected a directive"));
        };
        if isa::directive(name).is_none() {
            return Err(self.recover(tok.start, format!("Unknown directive '.{name}'")));
        }
        self.advance();

        let mut args = vec![];
        let mut end = tok.end;
        let mut expect_more = false;
        loop {
            self.skip_trivia();
            match self.peek() {
                TokenKind::Comma => {
                    let t = &self.tokens[self.index];
                    self.diags.push(Diagnostic::new(t.start, t.end, format!("Empty argument in .{name} directive")));
                    self.advance();
                    expect_more = true;
                    continue;
                },
                TokenKind::NewLine | TokenKind::Eof => {
                    if expect_more {
                        let pos = self.pos();
                        self.diags.push(Diagnostic::new(pos, pos, format!("Expected argument after ',' in .{name} directive")));
                    }
                    break;
                },
                _ => {}
            }

            // collect the run up to the next comma or line end
            let first = self.index;
            let mut last = first;
            while !matches!(self.peek(), TokenKind::Comma | TokenKind::NewLine | TokenKind::Eof) {
                if !self.peek().is_trivia() {
                    last = self.index;
                }
                self.advance();
            }
            let arg = DirectiveArg {
                tokens: first..last + 1,
                start: self.tokens[first].start,
                end: self.tokens[last].end,
            };
            end = arg.end;
            args.push(arg);

            match self.peek() {
                TokenKind::Comma => {
                    self.advance();
                    expect_more = true;
                },
                _ => break,
            }
        }

        Ok(Directive { name: name.clone(), token, args, start: tok.start, end })
    }
}
