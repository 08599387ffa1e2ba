use serde::Serialize;

use crate::lexer::{Token, TokenKind};

/// Parsed program: labels and instructions in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Program {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Item {
    Label { name: String, line: usize },
    Instr(Instruction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub mnemonic: String,
    pub operands: Vec<Operand>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Operand {
    Label(String),
    Constant(i64),
    Register(u8),
    /// `disp[Rn]`
    Ea { disp: Disp, base: u8 },
    Str(String),
}

/// Displacement half of an effective address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Disp {
    Label(String),
    Constant(i64),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: syntax error, {expected}")]
pub struct ParseError {
    pub line: usize,
    pub expected: &'static str,
}

struct Parser<'a> {
    toks: &'a [Token],
    pos: usize,
    line: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a TokenKind> {
        self.toks.get(self.pos).map(|t| &t.kind)
    }

    fn peek2(&self) -> Option<&'a TokenKind> {
        self.toks.get(self.pos + 1).map(|t| &t.kind)
    }

    fn bump(&mut self) -> Option<&'a TokenKind> {
        let t = self.toks.get(self.pos)?;
        self.pos += 1;
        Some(&t.kind)
    }

    fn at_punct(&self, c: char) -> bool {
        matches!(self.peek(), Some(TokenKind::Punct(p)) if *p == c)
    }

    fn at_line_end(&self) -> bool {
        self.peek().is_none() || self.at_punct('\n')
    }

    fn err(&self, expected: &'static str) -> ParseError {
        ParseError { line: self.line, expected }
    }

    fn expect_punct(&mut self, c: char, expected: &'static str) -> Result<(), ParseError> {
        if self.at_punct(c) {
            self.bump();
            Ok(())
        } else {
            Err(self.err(expected))
        }
    }

    /// `[` register `]` following a displacement.
    fn base_register(&mut self) -> Result<u8, ParseError> {
        self.expect_punct('[', "expected '['")?;
        let reg = match self.bump() {
            Some(TokenKind::Register(r)) => *r,
            _ => return Err(self.err("expected base register")),
        };
        self.expect_punct(']', "expected ']'")?;
        Ok(reg)
    }

    fn operand(&mut self) -> Result<Operand, ParseError> {
        let indexed = matches!(self.peek2(), Some(TokenKind::Punct('[')));
        let op = match self.bump() {
            Some(TokenKind::Register(r)) => Operand::Register(*r),
            Some(TokenKind::Str(s)) => Operand::Str(s.clone()),
            Some(TokenKind::Ident(name)) if indexed => Operand::Ea {
                disp: Disp::Label(name.clone()),
                base: self.base_register()?,
            },
            Some(TokenKind::Constant(v)) if indexed => Operand::Ea {
                disp: Disp::Constant(*v),
                base: self.base_register()?,
            },
            Some(TokenKind::Ident(name)) => Operand::Label(name.clone()),
            Some(TokenKind::Constant(v)) => Operand::Constant(*v),
            _ => return Err(self.err("expected operand")),
        };
        Ok(op)
    }

    fn line(&mut self, prog: &mut Program) -> Result<(), ParseError> {
        if let (Some(TokenKind::Ident(name)), Some(TokenKind::Punct(':'))) = (self.peek(), self.peek2()) {
            prog.items.push(Item::Label { name: name.clone(), line: self.line });
            self.pos += 2;
        }

        if let Some(TokenKind::Ident(mnemonic)) = self.peek() {
            self.bump();
            let mut instr = Instruction { mnemonic: mnemonic.clone(), operands: Vec::new(), line: self.line };
            while !self.at_line_end() {
                instr.operands.push(self.operand()?);
                if self.at_punct(',') {
                    self.bump();
                    if self.at_line_end() {
                        return Err(self.err("expected operand after ','"));
                    }
                } else if !self.at_line_end() {
                    return Err(self.err("expected ',' or end of line"));
                }
            }
            prog.items.push(Item::Instr(instr));
        }

        if !self.at_line_end() {
            return Err(self.err("expected end of line"));
        }
        while self.at_punct('\n') {
            self.bump();
            self.line += 1;
        }
        Ok(())
    }
}

/// Build the instruction list from a token stream.
///
/// Only the line grammar is checked here; mnemonics and operand shapes are
/// validated by the assembler.
pub fn parse(toks: &[Token]) -> Result<Program, ParseError> {
    let mut p = Parser { toks, pos: 0, line: 1 };
    let mut prog = Program::default();
    // Leading blank lines
    while p.at_punct('\n') {
        p.bump();
        p.line += 1;
    }
    while p.peek().is_some() {
        p.line(&mut prog)?;
    }
    Ok(prog)
}
