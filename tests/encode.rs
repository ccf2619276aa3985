use pretty_assertions::assert_eq;

use raisin64::expr::Expr;
use raisin64::isa::fields::w64;
use raisin64::{AsmError, AsmWarning, Encoder, Fixup, OpcodeTable, RelocKind};

#[test]
fn add_register_fields() {
    let t = OpcodeTable::new();
    let a = Encoder::new(&t).assemble_line("add $r1, $r2, $r3").unwrap();
    assert_eq!(w64::SIZE.get(a.word), 0b11);
    assert_eq!(w64::OPCODE.get(a.word), 0x00);
    assert_eq!(w64::RD.get(a.word), 1);
    assert_eq!(w64::RS1.get(a.word), 2);
    assert_eq!(w64::RS2.get(a.word), 3);
    assert_eq!(a.word, 0xc004_0083_0000_0000);
    assert!(a.fixups.is_empty());
    assert!(a.warnings.is_empty());
}

#[test]
fn separators_allow_whitespace() {
    let t = OpcodeTable::new();
    let enc = Encoder::new(&t);
    let tight = enc.assemble_line("mul $r1,$r2,$r3,$lr").unwrap();
    let loose = enc.assemble_line("   mul\t$r1 ,  $r2,\t$r3 , $lr  ").unwrap();
    assert_eq!(tight, loose);
    assert_eq!(w64::RD2.get(tight.word), 2);
    assert_eq!(w64::RS2.get(tight.word), 63);
}

#[test]
fn ji_to_external_symbol() {
    let t = OpcodeTable::new();
    let a = Encoder::new(&t).assemble_line("ji external_symbol").unwrap();
    assert_eq!(
        a.fixups,
        vec![Fixup {
            offset: 1,
            size: 7,
            expr: Expr { symbol: Some("external_symbol".into()), addend: 0 },
            pcrel: false,
            kind: RelocKind::Abs56,
        }]
    );
    assert_eq!(a.bytes(), [0xff, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(w64::OPCODE.get(a.word), 0x3f);
}

#[test]
fn immediates_and_branches() {
    let t = OpcodeTable::new();
    let enc = Encoder::new(&t);

    let a = enc.assemble_line("addi $r1, $r2, -3").unwrap();
    assert_eq!(w64::IMM.get(a.word), 0xffff_fffd);

    let a = enc.assemble_line("beq $r1, $r2, 16").unwrap();
    assert_eq!(w64::IMM.get(a.word), 8);

    let a = enc.assemble_line("beq $r1, $r2, done").unwrap();
    assert_eq!(a.fixups, vec![Fixup::pcrel32(Expr { symbol: Some("done".into()), addend: 0 })]);
    assert_eq!(a.fixups[0].offset, 4);
    assert!(a.fixups[0].pcrel);

    let a = enc.assemble_line("addi $r1, $r2, sym").unwrap();
    assert_eq!(
        a.fixups,
        vec![Fixup {
            offset: 4,
            size: 4,
            expr: Expr { symbol: Some("sym".into()), addend: 0 },
            pcrel: true,
            kind: RelocKind::Pcrel32,
        }]
    );
    assert_eq!(w64::IMM.get(a.word), 0);

    assert_eq!(enc.assemble_line("beq $r1, $r2, 7"), Err(AsmError::MisalignedBranch(7)));

    let a = enc.assemble_line("lui $r9, 0x1234").unwrap();
    assert_eq!(w64::RD.get(a.word), 9);
    assert_eq!(w64::IMM.get(a.word), 0x1234);

    let a = enc.assemble_line("f* $r1, $r2, $r3, 7").unwrap();
    assert_eq!(w64::OPCODE.get(a.word), 0x1d);
    assert_eq!(w64::IMM.get(a.word), 7);
}

#[test]
fn missing_comma_is_fatal() {
    let t = OpcodeTable::new();
    let enc = Encoder::new(&t);
    assert_eq!(enc.assemble_line("add $r1 $r2, $r3"), Err(AsmError::ExpectingComma));
    assert_eq!(enc.assemble_line("j"), Err(AsmError::IllegalRegisterNumber("".into())));
}

#[test]
fn unknown_and_reserved_mnemonics() {
    let t = OpcodeTable::new();
    let enc = Encoder::new(&t);
    assert_eq!(enc.assemble_line("frob $r1"), Err(AsmError::UnknownOpcode("frob".into())));
    assert_eq!(enc.assemble_line("bad"), Err(AsmError::UnknownOpcode("bad".into())));
    assert_eq!(enc.assemble_line("   "), Err(AsmError::UnknownOpcode("".into())));
    assert_eq!(enc.assemble_line("ADD $r1, $r2, $r3"), Err(AsmError::UnknownOpcode("ADD".into())));
}

#[test]
fn bad_registers() {
    let t = OpcodeTable::new();
    let enc = Encoder::new(&t);
    assert_eq!(
        enc.assemble_line("add $r62, $r1, $r2"),
        Err(AsmError::IllegalRegisterNumber("$r62".into()))
    );
    assert_eq!(
        enc.assemble_line("add $r1, r2, $r3"),
        Err(AsmError::IllegalRegisterNumber("r2".into()))
    );
}

#[test]
fn constant_operands_must_be_constant() {
    let t = OpcodeTable::new();
    assert_eq!(
        Encoder::new(&t).assemble_line("lui $r1, sym+4"),
        Err(AsmError::ExpressionNotConstant("sym+4".into()))
    );
}

#[test]
fn trailing_text_warns_but_emits() {
    let t = OpcodeTable::new();
    let enc = Encoder::new(&t);
    let a = enc.assemble_line("syscall now").unwrap();
    assert_eq!(a.warnings, vec![AsmWarning::ExtraStuffIgnored("now".into())]);
    assert_eq!(w64::OPCODE.get(a.word), 0x1c);

    let a = enc.assemble_line("add $r1, $r2, $r3 extra").unwrap();
    assert_eq!(a.warnings, vec![AsmWarning::ExtraStuffIgnored("extra".into())]);

    let a = enc.assemble_line("syscall \t ").unwrap();
    assert!(a.warnings.is_empty());
}
