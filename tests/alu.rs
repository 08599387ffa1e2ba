use pretty_assertions::assert_eq;
use sigma16_rs::alu::{self, to_signed, to_word};
use sigma16_rs::Flags;

fn w(x: i32) -> u16 {
    to_word(x)
}

#[test]
fn add_wraps_and_sets_carry() {
    let mut f = Flags::empty();
    assert_eq!(alu::add(&mut f, 0xFFFF, 1), 0);
    assert!(f.contains(Flags::CARRY | Flags::UOVF));
    assert!(!f.contains(Flags::SOVF));
}

#[test]
fn add_signed_overflow() {
    let mut f = Flags::empty();
    assert_eq!(alu::add(&mut f, 0x7FFF, 1), 0x8000);
    assert!(f.contains(Flags::SOVF));
    assert!(!f.contains(Flags::CARRY));

    let mut f = Flags::empty();
    assert_eq!(alu::add(&mut f, w(-2), w(-3)), w(-5));
    assert!(!f.contains(Flags::SOVF));
    assert!(f.contains(Flags::CARRY));
}

#[test]
fn sub_is_add_of_negation() {
    for (a, b) in [(5, 3), (3, 5), (-100, 7), (0, 0), (i16::MIN as i32, 1)] {
        let mut f1 = Flags::empty();
        let mut f2 = Flags::empty();
        let d = alu::sub(&mut f1, w(a), w(b));
        assert_eq!(d, w(a - b));
        assert_eq!(d, alu::add(&mut f2, w(a), w(-b)));
    }
    let mut f = Flags::empty();
    alu::sub(&mut f, 0x8000, 1);
    assert!(f.contains(Flags::SOVF));
}

#[test]
fn addc_uses_incoming_carry() {
    let mut f = Flags::CARRY;
    assert_eq!(alu::addc(&mut f, 1, 1), 3);
    assert!(!f.contains(Flags::CARRY));

    let mut f = Flags::empty();
    assert_eq!(alu::addc(&mut f, 1, 1), 2);

    // the carry in alone can push the sum past 16 bits
    let mut f = Flags::CARRY;
    assert_eq!(alu::addc(&mut f, 0xFFFF, 0), 0);
    assert!(f.contains(Flags::CARRY));
}

#[test]
fn mul_is_signed_and_truncates() {
    let mut f = Flags::empty();
    assert_eq!(alu::mul(&mut f, w(-3), 4), w(-12));
    assert!(!f.contains(Flags::SOVF));

    let mut f = Flags::empty();
    assert_eq!(alu::mul(&mut f, 0x0100, 0x0100), 0);
    assert!(f.contains(Flags::SOVF));

    let mut f = Flags::empty();
    assert_eq!(alu::mul(&mut f, w(-1), w(-1)), 1);
}

#[test]
fn div_is_floored() {
    assert_eq!(alu::div(w(7), w(2)), Some((w(3), w(1))));
    assert_eq!(alu::div(w(-7), w(2)), Some((w(-4), w(1))));
    assert_eq!(alu::div(w(7), w(-2)), Some((w(-4), w(-1))));
    assert_eq!(alu::div(w(-7), w(-2)), Some((w(3), w(-1))));
    assert_eq!(alu::div(w(6), w(-3)), Some((w(-2), 0)));
    assert_eq!(alu::div(w(5), 0), None);
}

#[test]
fn div_identity_holds() {
    for a in [-300, -7, -1, 0, 1, 7, 300, i16::MAX as i32] {
        for b in [-9, -2, -1, 1, 2, 9] {
            let (q, r) = alu::div(w(a), w(b)).unwrap();
            let (q, r) = (to_signed(q), to_signed(r));
            assert_eq!(q * b + r, a, "{a} / {b}");
            assert!(r == 0 || (r < 0) == (b < 0), "{a} % {b} = {r}");
            assert!(r.abs() < b.abs());
        }
    }
}

#[test]
fn cmp_equal_sets_only_eq() {
    for a in [0u16, 1, 0x7FFF, 0x8000, 0xFFFF] {
        let mut f = Flags::all();
        alu::cmp(&mut f, a, a);
        assert!(f.contains(Flags::EQ));
        assert!(!f.intersects(Flags::UGT | Flags::ULT | Flags::SGT | Flags::SLT));
    }
}

#[test]
fn cmp_signed_and_unsigned_disagree() {
    // 1 vs -1: unsigned 1 < 0xffff, signed 1 > -1
    let mut f = Flags::empty();
    alu::cmp(&mut f, 1, 0xFFFF);
    assert!(f.contains(Flags::ULT | Flags::SGT));
    assert!(!f.intersects(Flags::UGT | Flags::SLT | Flags::EQ));
}

#[test]
fn cmp_leaves_other_bits() {
    let mut f = Flags::from_word(0x0001 | Flags::CARRY.bits());
    alu::cmp(&mut f, 2, 1);
    assert_eq!(f.bits() & 0x07FF, 0x0001 | Flags::CARRY.bits());
}

#[test]
fn boolean_compares() {
    assert_eq!(alu::cmplt(w(-1), 0), 1);
    assert_eq!(alu::cmplt(0, w(-1)), 0);
    assert_eq!(alu::cmpgt(0, w(-1)), 1);
    assert_eq!(alu::cmpgt(3, 3), 0);
}

#[test]
fn twos_complement_laws() {
    let samples = [0u16, 1, 2, 0x7fff, 0x8000, 0x8001, 0xabcd, 0xfffe, 0xffff];
    for &a in &samples {
        for &b in &samples {
            let mut f = Flags::empty();
            let sum = alu::add(&mut f, a, b);
            assert_eq!(alu::sub(&mut f, sum, b), a);
            assert_eq!(sum, alu::add(&mut f, b, a));
            assert_eq!(alu::mul(&mut f, a, b), (a as u32 * b as u32) as u16);
        }
    }
}

#[test]
fn signed_overflow_iff_signs_agree_and_flip() {
    let samples = [0u16, 1, 0x4000, 0x7fff, 0x8000, 0xc000, 0xffff];
    for &a in &samples {
        for &b in &samples {
            let mut f = Flags::empty();
            let d = alu::add(&mut f, a, b);
            let neg = |x: u16| x & 0x8000 != 0;
            let expect = neg(a) == neg(b) && neg(d) != neg(a);
            assert_eq!(f.contains(Flags::SOVF), expect, "{a:04x} + {b:04x}");
        }
    }
}
