use serde::{Deserialize, Serialize};

use crate::alu::Word;

/// Primary opcode field values (bits 12..15).
pub const OP_EXP: u8 = 0xE;
pub const OP_RX: u8 = 0xF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    // RRR
    Add,
    Sub,
    Mul,
    Div,
    Cmp,
    Cmplt,
    Cmpeq,
    Cmpgt,
    Inv,
    And,
    Or,
    Xor,
    Addc,
    Trap,
    // EXP, not implemented
    Exp,
    // RX
    Lea,
    Load,
    Store,
    Jump,
    Jumpc0,
    Jumpc1,
    Jumpf,
    Jumpt,
    Jal,
}

/// Instruction shape, derived from the primary opcode alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    Rrr,
    Exp,
    Rx,
}

impl Format {
    pub fn of(ir: Word) -> Self {
        match field_op(ir) {
            OP_RX => Format::Rx,
            OP_EXP => Format::Exp,
            _ => Format::Rrr,
        }
    }

    /// Encoded length in words.
    pub fn width(self) -> u8 {
        match self {
            Format::Rx => 2,
            Format::Rrr | Format::Exp => 1,
        }
    }
}

pub fn field_op(ir: Word) -> u8 {
    (ir >> 12 & 0xF) as u8
}

pub fn field_d(ir: Word) -> u8 {
    (ir >> 8 & 0xF) as u8
}

pub fn field_a(ir: Word) -> u8 {
    (ir >> 4 & 0xF) as u8
}

pub fn field_b(ir: Word) -> u8 {
    (ir & 0xF) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub op: Op,
    pub width: u8, // 1 or 2 words
    pub ir: Word,
    pub d: u8,
    pub a: u8,
    pub b: u8,
    /// Displacement word; zero for single-word instructions
    pub disp: Word,
}

/// Turn an instruction word, plus the following displacement word when the
/// shape needs one, into an operation record. Never touches CPU state.
pub trait Decoder {
    fn decode(&self, ir: Word, disp: Word) -> Option<Decoded>;

    /// Decode from a word slice, reading the displacement only for RX words.
    fn decode_words(&self, words: &[Word]) -> Option<Decoded> {
        let ir = *words.first()?;
        let disp = match Format::of(ir) {
            Format::Rx => *words.get(1)?,
            _ => 0,
        };
        self.decode(ir, disp)
    }
}
