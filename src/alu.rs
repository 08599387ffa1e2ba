//! Two's complement arithmetic on 16-bit words.
//!
//! Every flag-setting primitive takes the current condition flags by mutable
//! reference and only touches the eight named bits; anything else stored in
//! the flags register survives untouched.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A raw 16-bit machine word.
pub type Word = u16;

/// Index of the register that doubles as the condition flags.
pub const FLAGS_REG: usize = 15;

bitflags! {
/// Condition flags, numbered most-significant-bit first (bit 0 is `0x8000`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags: u16 {
const UGT = 0x8000 >> 0; // ccG, unsigned greater than
const SGT = 0x8000 >> 1; // ccg, signed greater than
const EQ = 0x8000 >> 2; // ccE, equal
const SLT = 0x8000 >> 3; // ccl, signed less than
const ULT = 0x8000 >> 4; // ccL, unsigned less than
const UOVF = 0x8000 >> 5; // ccV, unsigned overflow
const SOVF = 0x8000 >> 6; // ccv, signed overflow
const CARRY = 0x8000 >> 7; // ccC, carry propagation
}
}

impl Flags {
    /// Wrap a raw register value, keeping bits that are not condition flags.
    pub fn from_word(w: Word) -> Self {
        Self::from_bits_retain(w)
    }

    /// Test condition bit `index` (0 = most significant) of a raw word.
    pub fn test_bit(w: Word, index: u8) -> bool {
        w & (0x8000 >> (index & 0xF)) != 0
    }
}

/// Interpret a word as a two's complement integer.
pub fn to_signed(w: Word) -> i32 {
    w as i16 as i32
}

/// Truncate an integer to its low 16 bits.
pub fn to_word(x: i32) -> Word {
    x as u16
}

fn sign(w: Word) -> bool {
    w & 0x8000 != 0
}

fn set_add_flags(flags: &mut Flags, a: Word, b: Word, wide: u32, d: Word) {
    let wrapped = wide > 0xFFFF;
    flags.set(Flags::UOVF, wrapped);
    flags.set(Flags::CARRY, wrapped);
    flags.set(Flags::SOVF, sign(a) == sign(b) && sign(a) != sign(d));
}

/// `a + b` modulo 2^16.
pub fn add(flags: &mut Flags, a: Word, b: Word) -> Word {
    let wide = a as u32 + b as u32;
    let d = wide as Word;
    set_add_flags(flags, a, b, wide, d);
    d
}

/// `a - b`, computed as `a` plus the two's complement of `b`.
pub fn sub(flags: &mut Flags, a: Word, b: Word) -> Word {
    add(flags, a, (!b).wrapping_add(1))
}

/// `a + b + carry`, with carry taken from the incoming flags.
pub fn addc(flags: &mut Flags, a: Word, b: Word) -> Word {
    let carry_in = flags.contains(Flags::CARRY) as u32;
    let wide = a as u32 + b as u32 + carry_in;
    let d = wide as Word;
    set_add_flags(flags, a, b, wide, d);
    d
}

/// Signed 16x16 multiply, truncated to 16 bits.
pub fn mul(flags: &mut Flags, a: Word, b: Word) -> Word {
    let wide = to_signed(a) * to_signed(b);
    flags.set(Flags::SOVF, wide < i16::MIN as i32 || wide > i16::MAX as i32);
    to_word(wide)
}

/// Floored signed division returning `(quotient, remainder)`.
///
/// The remainder always takes the sign of the divisor. Returns `None` when
/// `b` is zero.
pub fn div(a: Word, b: Word) -> Option<(Word, Word)> {
    let (a, b) = (to_signed(a), to_signed(b));
    if b == 0 {
        return None;
    }
    let mut q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q -= 1;
    }
    Some((to_word(q), to_word(a - b * q)))
}

/// Compare `a` with `b`, writing both the unsigned and the signed flag pairs.
pub fn cmp(flags: &mut Flags, a: Word, b: Word) {
    let (sa, sb) = (to_signed(a), to_signed(b));
    flags.set(Flags::EQ, a == b);
    flags.set(Flags::UGT, a > b);
    flags.set(Flags::ULT, a < b);
    flags.set(Flags::SGT, sa > sb);
    flags.set(Flags::SLT, sa < sb);
}

/// `1` if `a < b` as signed integers, else `0`.
pub fn cmplt(a: Word, b: Word) -> Word {
    (to_signed(a) < to_signed(b)) as Word
}

/// `1` if `a > b` as signed integers, else `0`.
pub fn cmpgt(a: Word, b: Word) -> Word {
    (to_signed(a) > to_signed(b)) as Word
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_conversion_round_trips() {
        for x in [i16::MIN as i32, -1, 0, 1, 12345, i16::MAX as i32] {
            assert_eq!(to_signed(to_word(x)), x);
        }
    }

    #[test]
    fn flag_bits_are_msb_first() {
        assert!(Flags::test_bit(Flags::UGT.bits(), 0));
        assert!(Flags::test_bit(Flags::CARRY.bits(), 7));
        assert!(!Flags::test_bit(Flags::CARRY.bits(), 6));
    }
}
