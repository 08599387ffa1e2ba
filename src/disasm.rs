use serde::Serialize;

use crate::alu::Word;
use crate::decoder::{Decoded, Decoder, Op};
use crate::symbols::ReverseSymbols;

pub fn fmt_decoded(d: &Decoded, symbols: Option<&ReverseSymbols>) -> String {
    let mn = d.op.mnemonic();
    match d.op {
        Op::Cmp => format!("{mn} R{},R{}", d.a, d.b),
        Op::Inv => format!("{mn} R{},R{}", d.d, d.a),
        Op::Exp => format!("exp {:04x}", d.ir),
        Op::Jump => format!("{mn} {}", ea(d, symbols)),
        Op::Lea | Op::Load | Op::Store | Op::Jumpc0 | Op::Jumpc1 | Op::Jumpf | Op::Jumpt | Op::Jal => {
            format!("{mn} R{},{}", d.d, ea(d, symbols))
        }
        _ => format!("{mn} R{},R{},R{}", d.d, d.a, d.b),
    }
}

fn ea(d: &Decoded, symbols: Option<&ReverseSymbols>) -> String {
    match symbols.and_then(|s| s.get(d.disp)) {
        Some(name) => format!("{name}[R{}]", d.a),
        None => format!("{:04x}[R{}]", d.disp, d.a),
    }
}

/// One line of a linear listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub addr: Word,
    pub words: Vec<Word>,
    pub label: Option<String>,
    pub text: String,
}

/// Walk `words` as if loaded at `start`, one instruction per line. Words
/// that do not decode, including an RX word cut off from its displacement,
/// are shown as `data`.
pub fn disassemble<D: Decoder>(
    dec: &D,
    words: &[Word],
    start: Word,
    symbols: Option<&ReverseSymbols>,
) -> Vec<Line> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < words.len() {
        let addr = start.wrapping_add(i as Word);
        let label = symbols.and_then(|s| s.get(addr)).map(str::to_string);
        let (len, text) = match dec.decode_words(&words[i..]) {
            Some(d) => (d.width as usize, fmt_decoded(&d, symbols)),
            None => (1, format!("data {:04x}", words[i])),
        };
        out.push(Line { addr, words: words[i..i + len].to_vec(), label, text });
        i += len;
    }
    out
}
