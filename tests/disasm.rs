use pretty_assertions::assert_eq;
use sigma16_rs::assemble_source;
use sigma16_rs::disasm::{disassemble, fmt_decoded};
use sigma16_rs::isa::sigma16::Sigma16Decoder;
use sigma16_rs::decoder::Decoder;
use sigma16_rs::symbols::ReverseSymbols;

fn text(ir: u16, disp: u16) -> String {
    fmt_decoded(&Sigma16Decoder::new().decode(ir, disp).unwrap(), None)
}

#[test]
fn operand_shapes() {
    assert_eq!(text(0x0123, 0), "add R1,R2,R3");
    assert_eq!(text(0x4023, 0), "cmp R2,R3");
    assert_eq!(text(0x8450, 0), "inv R4,R5");
    assert_eq!(text(0xd000, 0), "trap R0,R0,R0");
    assert_eq!(text(0xe0ff, 0), "exp e0ff");
    assert_eq!(text(0xf003, 0x0012), "jump 0012[R0]");
    assert_eq!(text(0xf121, 0x00a0), "load R1,00a0[R2]");
    assert_eq!(text(0xfd08, 0x0003), "jal R13,0003[R0]");
}

#[test]
fn listing_of_assembled_program() {
    let asm = assemble_source("start: lea R1,msg[R0]\n trap R0,R0,R0\nmsg: data 0xf00f\n").unwrap();
    let syms = ReverseSymbols::from(&asm.symbols);
    let lines = disassemble(&Sigma16Decoder::new(), &asm.words, 0, Some(&syms));

    let got: Vec<(u16, Option<&str>, &str)> =
        lines.iter().map(|l| (l.addr, l.label.as_deref(), l.text.as_str())).collect();
    assert_eq!(
        got,
        vec![
            (0, Some("start"), "lea R1,msg[R0]"),
            (2, None, "trap R0,R0,R0"),
            // RX word with no displacement left in the image
            (3, Some("msg"), "data f00f"),
        ]
    );
    assert_eq!(lines[0].words, vec![0xf100, 0x0003]);
}

#[test]
fn listing_respects_start_address() {
    let lines = disassemble(&Sigma16Decoder::new(), &[0xd000, 0xf009, 0x0000], 0x100, None);
    let addrs: Vec<u16> = lines.iter().map(|l| l.addr).collect();
    // f009 has no defined sub-operation and is shown one word at a time
    assert_eq!(addrs, vec![0x100, 0x101, 0x102]);
    assert_eq!(lines[1].text, "data f009");
}
