use crate::alu::Word;
use crate::decoder::{field_a, field_b, field_d, field_op, Decoded, Decoder, Format, Op};

/// Sigma16 core decoder: RRR opcodes 0x0..0xD, EXP 0xE, RX 0xF with the
/// sub-operation in the `b` field.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sigma16Decoder;

impl Sigma16Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for Sigma16Decoder {
    fn decode(&self, ir: Word, disp: Word) -> Option<Decoded> {
        let b = field_b(ir);
        let op = match field_op(ir) {
            0x0 => Op::Add,
            0x1 => Op::Sub,
            0x2 => Op::Mul,
            0x3 => Op::Div,
            0x4 => Op::Cmp,
            0x5 => Op::Cmplt,
            0x6 => Op::Cmpeq,
            0x7 => Op::Cmpgt,
            0x8 => Op::Inv,
            0x9 => Op::And,
            0xA => Op::Or,
            0xB => Op::Xor,
            0xC => Op::Addc,
            0xD => Op::Trap,
            0xE => Op::Exp,
            _ => match b {
                0 => Op::Lea,
                1 => Op::Load,
                2 => Op::Store,
                3 => Op::Jump,
                4 => Op::Jumpc0,
                5 => Op::Jumpc1,
                6 => Op::Jumpf,
                7 => Op::Jumpt,
                8 => Op::Jal,
                _ => return None,
            },
        };
        let fmt = Format::of(ir);
        Some(Decoded {
            op,
            width: fmt.width(),
            ir,
            d: field_d(ir),
            a: field_a(ir),
            b,
            disp: if fmt == Format::Rx { disp } else { 0 },
        })
    }
}
