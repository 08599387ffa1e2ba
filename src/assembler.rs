//! Two-pass encoder from the parsed instruction list to machine words.
//!
//! Pass 1 assigns an address to every label; pass 2 packs each instruction
//! into words, resolving label operands through the pass-1 table.

use tracing::debug;

use crate::alu::Word;
use crate::instructions::{self, InstrDesc, Operand as Enc};
use crate::lexer::{tokenize, LexError};
use crate::memory::RAM_WORDS;
use crate::parser::{parse, Disp, Instruction, Item, Operand, ParseError, Program};
use crate::symbols::SymbolTable;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("line {line}: unknown instruction {mnemonic}")]
    UnknownMnemonic { mnemonic: String, line: usize },
    #[error("line {line}: {mnemonic} takes {expected} operand(s), got {got}")]
    OperandCount { mnemonic: &'static str, expected: usize, got: usize, line: usize },
    #[error("line {line}: operand {index} of {mnemonic} must be {expected}")]
    OperandKind { mnemonic: &'static str, index: usize, expected: &'static str, line: usize },
    #[error("line {line}: undefined label {name}")]
    UndefinedLabel { name: String, line: usize },
    #[error("line {line}: label {name} already defined")]
    DuplicateLabel { name: String, line: usize },
    #[error("line {line}: constant {value} does not fit in 16 bits")]
    ConstantOutOfRange { value: i64, line: usize },
    #[error("line {line}: character {ch:?} does not fit in a 16-bit word")]
    CharOutOfRange { ch: char, line: usize },
    #[error("line {line}: label {name} lies past the end of memory")]
    LabelOutOfRange { name: String, line: usize },
    #[error("program does not fit in memory ({words} words)")]
    TooLarge { words: usize },
}

/// Output of a successful assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    pub words: Vec<Word>,
    pub symbols: SymbolTable,
}

impl Assembly {
    /// Serialize the image big-endian, high byte first.
    pub fn to_bytes(&self) -> Vec<u8> {
        crate::memory::words_to_be_bytes(&self.words)
    }
}

fn lookup(instr: &Instruction) -> Result<&'static InstrDesc, AsmError> {
    instructions::lookup(&instr.mnemonic).ok_or_else(|| AsmError::UnknownMnemonic {
        mnemonic: instr.mnemonic.clone(),
        line: instr.line,
    })
}

/// Number of words an instruction occupies.
fn word_count(desc: &InstrDesc, instr: &Instruction) -> usize {
    match (desc.operands, instr.operands.as_slice()) {
        // Characters plus the terminator word
        ([Enc::Ascii], [Operand::Str(s)]) => s.chars().count() + 1,
        _ => desc.length as usize,
    }
}

fn constant(value: i64, line: usize) -> Result<Word, AsmError> {
    if (i16::MIN as i64..=u16::MAX as i64).contains(&value) {
        Ok(value as Word)
    } else {
        Err(AsmError::ConstantOutOfRange { value, line })
    }
}

/// Pass 2 state for one instruction: the output buffer plus lookup context.
struct Emitter<'a> {
    out: &'a mut Vec<Word>,
    symbols: &'a SymbolTable,
    desc: &'static InstrDesc,
    line: usize,
}

impl Emitter<'_> {
    fn kind_err(&self, index: usize, expected: &'static str) -> AsmError {
        AsmError::OperandKind { mnemonic: self.desc.mnemonic, index: index + 1, expected, line: self.line }
    }

    fn resolve(&self, name: &str) -> Result<Word, AsmError> {
        self.symbols
            .get(name)
            .ok_or_else(|| AsmError::UndefinedLabel { name: name.to_string(), line: self.line })
    }

    fn last(&mut self) -> &mut Word {
        let i = self.out.len() - 1;
        &mut self.out[i]
    }

    fn register(&mut self, index: usize, op: &Operand, shift: u32) -> Result<(), AsmError> {
        let Operand::Register(r) = op else {
            return Err(self.kind_err(index, "a register"));
        };
        *self.last() |= (*r as Word & 0xF) << shift;
        Ok(())
    }

    fn operand(&mut self, index: usize, enc: Enc, op: &Operand) -> Result<(), AsmError> {
        match enc {
            Enc::D => self.register(index, op, 8),
            Enc::A => self.register(index, op, 4),
            Enc::B => self.register(index, op, 0),
            Enc::Ea => {
                let Operand::Ea { disp, base } = op else {
                    return Err(self.kind_err(index, "an effective address"));
                };
                *self.last() |= (*base as Word & 0xF) << 4;
                let value = match disp {
                    Disp::Label(name) => self.resolve(name)?,
                    Disp::Constant(v) => constant(*v, self.line)?,
                };
                self.out.push(value);
                Ok(())
            }
            Enc::Const => {
                let value = match op {
                    Operand::Label(name) => self.resolve(name)?,
                    Operand::Constant(v) => constant(*v, self.line)?,
                    _ => return Err(self.kind_err(index, "a constant or label")),
                };
                *self.last() = value;
                Ok(())
            }
            Enc::Ascii => {
                let Operand::Str(s) = op else {
                    return Err(self.kind_err(index, "a string literal"));
                };
                let line = self.line;
                let chars = s
                    .chars()
                    .map(|ch| Word::try_from(ch as u32).map_err(|_| AsmError::CharOutOfRange { ch, line }))
                    .collect::<Result<Vec<Word>, AsmError>>()?;
                // Drop the placeholder opcode word
                self.out.pop();
                self.out.extend(chars);
                self.out.push(0);
                Ok(())
            }
        }
    }
}

/// Pass 1: label addresses. Also rejects unknown mnemonics early.
fn collect_symbols(prog: &Program) -> Result<SymbolTable, AsmError> {
    let mut symbols = SymbolTable::new();
    let mut address: usize = 0;
    for item in &prog.items {
        match item {
            Item::Label { name, line } => {
                let addr = Word::try_from(address)
                    .map_err(|_| AsmError::LabelOutOfRange { name: name.clone(), line: *line })?;
                if symbols.insert(name, addr).is_some() {
                    return Err(AsmError::DuplicateLabel { name: name.clone(), line: *line });
                }
            }
            Item::Instr(instr) => {
                let desc = lookup(instr)?;
                address += word_count(desc, instr);
            }
        }
    }
    if address > RAM_WORDS {
        return Err(AsmError::TooLarge { words: address });
    }
    debug!(labels = symbols.len(), words = address, "pass 1 complete");
    Ok(symbols)
}

/// Assemble a parsed program into memory words.
pub fn assemble(prog: &Program) -> Result<Assembly, AsmError> {
    let symbols = collect_symbols(prog)?;
    let mut words: Vec<Word> = Vec::new();

    for item in &prog.items {
        let Item::Instr(instr) = item else { continue };
        let desc = lookup(instr)?;
        if instr.operands.len() != desc.operands.len() {
            return Err(AsmError::OperandCount {
                mnemonic: desc.mnemonic,
                expected: desc.operands.len(),
                got: instr.operands.len(),
                line: instr.line,
            });
        }

        words.push(desc.opcode);
        let mut em = Emitter { out: &mut words, symbols: &symbols, desc, line: instr.line };
        for (i, (enc, op)) in desc.operands.iter().zip(&instr.operands).enumerate() {
            em.operand(i, *enc, op)?;
        }
    }

    debug!(words = words.len(), "pass 2 complete");
    Ok(Assembly { words, symbols })
}

/// Tokenize, parse and assemble source text in one go.
pub fn assemble_source(src: &str) -> Result<Assembly, AsmError> {
    let toks = tokenize(src)?;
    let prog = parse(&toks)?;
    assemble(&prog)
}
