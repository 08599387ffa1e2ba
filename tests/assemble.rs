use pretty_assertions::assert_eq;
use sigma16_rs::{assemble_source, AsmError};

fn words(src: &str) -> Vec<u16> {
    assemble_source(src).unwrap().words
}

#[test]
fn minimal_program() {
    let asm = assemble_source("start: add R1,R0,R0\n  trap R0,R0,R0\n").unwrap();
    assert_eq!(asm.words, vec![0x0100, 0xd000]);
    assert_eq!(asm.symbols.get("start"), Some(0));
}

#[test]
fn rrr_field_packing() {
    assert_eq!(words("sub R15,R14,R13"), vec![0x1fed]);
    assert_eq!(words("cmp R2,R3"), vec![0x4023]);
    assert_eq!(words("inv R4,R5"), vec![0x8450]);
    assert_eq!(words("xor r1,r2,r3"), vec![0xb123]);
}

#[test]
fn forward_reference_resolves() {
    let src = "\
      lea R1,x[R0]
      load R2,x[R1]  ; indexed by the loaded address
      trap R0,R0,R0
x:    data 42
";
    let asm = assemble_source(src).unwrap();
    assert_eq!(asm.words, vec![0xf100, 0x0005, 0xf211, 0x0005, 0xd000, 42]);
    assert_eq!(asm.symbols.get("x"), Some(5));
}

#[test]
fn label_on_own_line_and_at_zero() {
    let asm = assemble_source("top:\n  jump top[R0]\n").unwrap();
    assert_eq!(asm.words, vec![0xf003, 0x0000]);
    assert_eq!(asm.symbols.get("top"), Some(0));
}

#[test]
fn jump_aliases_fill_flag_index() {
    let src = "loop: jumplt loop[R0]\n jumpgt loop[R0]\n jumpeq loop[R0]\n jumpne loop[R0]\n jumple loop[R0]\n jumpge loop[R0]\n";
    assert_eq!(
        words(src),
        vec![0xf305, 0, 0xf105, 0, 0xf205, 0, 0xf204, 0, 0xf104, 0, 0xf304, 0]
    );
}

#[test]
fn conditional_jumps_take_a_register() {
    assert_eq!(words("jumpc1 R2,8[R3]"), vec![0xf235, 8]);
    assert_eq!(words("jumpt R1,3[R0]\njal R13,3[R0]"), vec![0xf107, 3, 0xfd08, 3]);
}

#[test]
fn ascii_reserves_terminator_word() {
    let asm = assemble_source("msg: ascii \"hi\\n\"\nend: data 7\n").unwrap();
    assert_eq!(asm.words, vec![0x68, 0x69, 0x0a, 0, 7]);
    assert_eq!(asm.symbols.get("end"), Some(4));
}

#[test]
fn data_constant_forms() {
    assert_eq!(
        words("data 0x10\ndata -1\ndata 'A'\ndata 65535\ndata 010\ndata -32768"),
        vec![0x10, 0xffff, 65, 0xffff, 8, 0x8000]
    );
}

#[test]
fn data_may_hold_a_label() {
    assert_eq!(words("a: data b\nb: data a"), vec![1, 0]);
}

#[test]
fn image_is_big_endian() {
    let asm = assemble_source("lea R1,0x1234[R2]").unwrap();
    assert_eq!(asm.to_bytes(), vec![0xf1, 0x20, 0x12, 0x34]);
}

#[test]
fn symbol_file_lists_labels_by_address() {
    let asm = assemble_source("b: data 1\na: data 2\n").unwrap();
    assert_eq!(asm.symbols.to_symbol_file(), "b:0\na:1\n");
}

#[test]
fn undefined_label_is_reported_with_line() {
    let err = assemble_source("add R1,R2,R3\njump nowhere[R0]\n").unwrap_err();
    assert_eq!(err, AsmError::UndefinedLabel { name: "nowhere".into(), line: 2 });
}

#[test]
fn duplicate_label_is_rejected() {
    let err = assemble_source("a: data 1\na: data 2\n").unwrap_err();
    assert_eq!(err, AsmError::DuplicateLabel { name: "a".into(), line: 2 });
}

#[test]
fn unknown_mnemonic() {
    let err = assemble_source("nop\n").unwrap_err();
    assert_eq!(err, AsmError::UnknownMnemonic { mnemonic: "nop".into(), line: 1 });
    // mnemonics are case-sensitive
    assert!(matches!(assemble_source("ADD R1,R2,R3"), Err(AsmError::UnknownMnemonic { .. })));
}

#[test]
fn wrong_operand_count() {
    let err = assemble_source("add R1,R2").unwrap_err();
    assert_eq!(err, AsmError::OperandCount { mnemonic: "add", expected: 3, got: 2, line: 1 });
}

#[test]
fn wrong_operand_kind() {
    assert!(matches!(
        assemble_source("add R1,R2,5"),
        Err(AsmError::OperandKind { mnemonic: "add", index: 3, .. })
    ));
    // r16 is not a register, so it reads as a label
    assert!(matches!(
        assemble_source("add R16,R2,R3"),
        Err(AsmError::OperandKind { index: 1, .. })
    ));
    assert!(matches!(
        assemble_source("load R1,R2"),
        Err(AsmError::OperandKind { index: 2, .. })
    ));
}

#[test]
fn constant_out_of_range() {
    assert_eq!(
        assemble_source("data 65536").unwrap_err(),
        AsmError::ConstantOutOfRange { value: 65536, line: 1 }
    );
    assert!(matches!(assemble_source("lea R1,-40000[R0]"), Err(AsmError::ConstantOutOfRange { .. })));
}

#[test]
fn lex_and_parse_errors_pass_through() {
    assert!(matches!(assemble_source("data 1 @"), Err(AsmError::Lex(_))));
    assert!(matches!(assemble_source("add R1,,R2"), Err(AsmError::Parse(_))));
    assert!(matches!(assemble_source("msg: ascii \"open"), Err(AsmError::Lex(_))));
}

#[test]
fn empty_source_is_empty_image() {
    let asm = assemble_source("; nothing here\n\n").unwrap();
    assert!(asm.words.is_empty());
    assert!(asm.symbols.is_empty());
}

#[test]
fn ascii_rejects_characters_wider_than_a_word() {
    let err = assemble_source("msg: ascii \"ok\u{1F600}\"\n").unwrap_err();
    assert_eq!(err, AsmError::CharOutOfRange { ch: '\u{1F600}', line: 1 });
    // anything in the basic plane still fits
    assert_eq!(words("ascii \"\u{00e9}\u{4e2d}\""), vec![0x00e9, 0x4e2d, 0]);
}

#[test]
fn label_past_end_of_memory_is_rejected() {
    let full = "lea R1,0[R0]\n".repeat(0x8000);
    assert_eq!(assemble_source(&full).unwrap().words.len(), 0x10000);

    let err = assemble_source(&format!("{full}end:\n")).unwrap_err();
    assert_eq!(err, AsmError::LabelOutOfRange { name: "end".into(), line: 0x8001 });
}
