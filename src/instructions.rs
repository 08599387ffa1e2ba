use crate::alu::Word;
use crate::decoder::Op;

/// How one source operand is packed into the instruction words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Register into bits 8..11 of the current word
    D,
    /// Register into bits 4..7 of the current word
    A,
    /// Register into bits 0..3 of the current word
    B,
    /// `disp[Ra]`: base into the `a` field, then a displacement word
    Ea,
    /// Constant or label value overwriting the current word
    Const,
    /// String literal, one word per character plus a zero terminator
    Ascii,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Rrr,
    Rx,
    /// RX jump with the condition register field fixed
    Alias,
    /// Assembler directive, no real opcode
    Pseudo,
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub mnemonic: &'static str,
    pub kind: Kind,
    /// Operation executed by the CPU, `None` for directives
    pub op: Option<Op>,
    /// Encoded length in words (directives: length of the placeholder word)
    pub length: u16,
    /// Initial value of the first word before operands are packed in
    pub opcode: Word,
    pub operands: &'static [Operand],
}

use Operand::*;

const DAB: &[Operand] = &[D, A, B];
const AB: &[Operand] = &[A, B];
const DA: &[Operand] = &[D, A];
const DEA: &[Operand] = &[D, Ea];
const EA: &[Operand] = &[Ea];

const fn rrr(mnemonic: &'static str, op: Op, opcode: Word, operands: &'static [Operand]) -> InstrDesc {
    InstrDesc { mnemonic, kind: Kind::Rrr, op: Some(op), length: 1, opcode, operands }
}

const fn rx(mnemonic: &'static str, op: Op, opcode: Word, operands: &'static [Operand]) -> InstrDesc {
    InstrDesc { mnemonic, kind: Kind::Rx, op: Some(op), length: 2, opcode, operands }
}

const fn alias(mnemonic: &'static str, op: Op, opcode: Word) -> InstrDesc {
    InstrDesc { mnemonic, kind: Kind::Alias, op: Some(op), length: 2, opcode, operands: EA }
}

const fn pseudo(mnemonic: &'static str, operand: &'static [Operand]) -> InstrDesc {
    InstrDesc { mnemonic, kind: Kind::Pseudo, op: None, length: 1, opcode: 0, operands: operand }
}

pub const TABLE: &[InstrDesc] = &[
    rrr("add", Op::Add, 0x0000, DAB),
    rrr("sub", Op::Sub, 0x1000, DAB),
    rrr("mul", Op::Mul, 0x2000, DAB),
    rrr("div", Op::Div, 0x3000, DAB),
    rrr("cmp", Op::Cmp, 0x4000, AB),
    rrr("cmplt", Op::Cmplt, 0x5000, DAB),
    rrr("cmpeq", Op::Cmpeq, 0x6000, DAB),
    rrr("cmpgt", Op::Cmpgt, 0x7000, DAB),
    rrr("inv", Op::Inv, 0x8000, DA),
    rrr("and", Op::And, 0x9000, DAB),
    rrr("or", Op::Or, 0xa000, DAB),
    rrr("xor", Op::Xor, 0xb000, DAB),
    rrr("addc", Op::Addc, 0xc000, DAB),
    rrr("trap", Op::Trap, 0xd000, DAB),
    rx("lea", Op::Lea, 0xf000, DEA),
    rx("load", Op::Load, 0xf001, DEA),
    rx("store", Op::Store, 0xf002, DEA),
    rx("jump", Op::Jump, 0xf003, EA),
    rx("jumpc0", Op::Jumpc0, 0xf004, DEA),
    rx("jumpc1", Op::Jumpc1, 0xf005, DEA),
    rx("jumpf", Op::Jumpf, 0xf006, DEA),
    rx("jumpt", Op::Jumpt, 0xf007, DEA),
    rx("jal", Op::Jal, 0xf008, DEA),
    // d selects a flag bit: 1 = ccg, 2 = ccE, 3 = ccl
    alias("jumplt", Op::Jumpc1, 0xf305),
    alias("jumple", Op::Jumpc0, 0xf104),
    alias("jumpne", Op::Jumpc0, 0xf204),
    alias("jumpeq", Op::Jumpc1, 0xf205),
    alias("jumpge", Op::Jumpc0, 0xf304),
    alias("jumpgt", Op::Jumpc1, 0xf105),
    pseudo("data", &[Const]),
    pseudo("ascii", &[Ascii]),
];

/// Exact, case-sensitive mnemonic lookup.
pub fn lookup(mnemonic: &str) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| d.mnemonic == mnemonic)
}

/// Canonical (non-alias) definition for an operation.
pub fn by_op(op: Op) -> Option<&'static InstrDesc> {
    TABLE
        .iter()
        .find(|d| d.op == Some(op) && matches!(d.kind, Kind::Rrr | Kind::Rx))
}

impl Op {
    pub fn mnemonic(self) -> &'static str {
        by_op(self).map(|d| d.mnemonic).unwrap_or("exp")
    }
}
