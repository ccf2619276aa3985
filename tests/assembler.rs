use pretty_assertions::assert_eq;

use raisin64::assembler::{LineEntry, Relocation, Severity};
use raisin64::isa::fields::w64;
use raisin64::{disassemble_word, Assembler, AssemblerConfig, OpcodeTable, RelocKind};

const SRC: &str = "\
# count down
N = 5
start:  addi $r1, $zero, N
        beq $r1, $r2, done   # forward
        add $r1 $r2, $r3
        j $lr ; ji start
done:   ji far_away
";

fn assemble(src: &str, cfg: AssemblerConfig) -> raisin64::Assembly {
    let t = OpcodeTable::new();
    Assembler::new(&t, cfg).assemble(src).unwrap()
}

#[test]
fn labels_constants_and_fixups() {
    let t = OpcodeTable::new();
    let asm = assemble(SRC, AssemblerConfig { base: 0x1000, ..Default::default() });

    assert_eq!(asm.bytes.len(), 40);
    assert_eq!(asm.labels.get("start"), Some(&0x1000));
    assert_eq!(asm.labels.get("done"), Some(&0x1020));

    let text = |addr| disassemble_word(&t, asm.word_at(addr).unwrap()).text;
    assert_eq!(text(0x1000), "addi\t$r1, $zero, 5");
    assert_eq!(text(0x1008), "beq\t$r1, $r2, 24");
    assert_eq!(text(0x1010), "j\t$lr");
    assert_eq!(w64::TARGET.get(asm.word_at(0x1018).unwrap()), 0x1000);

    assert_eq!(
        asm.relocations,
        vec![Relocation {
            address: 0x1021,
            kind: RelocKind::Abs56,
            symbol: "far_away".into(),
            addend: 0,
            pcrel: false,
        }]
    );
}

#[test]
fn errors_carry_lines_and_do_not_stop_assembly() {
    let asm = assemble(SRC, AssemblerConfig::default());
    assert!(asm.has_errors());
    assert_eq!(asm.diagnostics.len(), 1);
    let d = &asm.diagnostics[0];
    assert_eq!((d.line, d.severity), (5, Severity::Error));
    assert_eq!(d.to_string(), "5: error: expecting comma delimited operands");

    let lines: Vec<_> = asm.lines.iter().map(|l| (l.address, l.line)).collect();
    assert_eq!(lines, vec![(0, 3), (8, 4), (16, 6), (24, 6), (32, 7)]);
    assert_eq!(asm.lines[0], LineEntry { address: 0, line: 3 });
}

#[test]
fn range_errors_are_reported() {
    let asm = assemble("ji -2\nsyscall", AssemblerConfig::default());
    assert_eq!(asm.bytes.len(), 16);
    assert_eq!(asm.diagnostics.len(), 1);
    assert_eq!(asm.diagnostics[0].line, 1);
    assert_eq!(asm.diagnostics[0].message, "R_RAISIN64_56 value -2 out of range");
}

#[test]
fn duplicates_and_warnings() {
    let src = "a: syscall\na: syscall\nK = 1\nK = 2\nsyscall later\n";
    let asm = assemble(src, AssemblerConfig::default());
    let got: Vec<_> = asm.diagnostics.iter().map(|d| (d.line, d.severity)).collect();
    assert_eq!(got, vec![(2, Severity::Error), (4, Severity::Error), (5, Severity::Warning)]);
    assert_eq!(asm.labels.get("a"), Some(&0));
    assert_eq!(asm.bytes.len(), 24);

    let strict = assemble("syscall later", AssemblerConfig { fatal_warnings: true, ..Default::default() });
    assert!(strict.has_errors());
}

#[test]
fn top_of_address_space_is_a_diagnostic() {
    let asm = assemble("syscall\nsyscall\n", AssemblerConfig { base: u64::MAX - 7, ..Default::default() });
    assert_eq!(asm.bytes.len(), 8);
    assert_eq!(asm.lines, vec![LineEntry { address: u64::MAX - 7, line: 1 }]);
    assert_eq!(asm.diagnostics.len(), 1);
    assert_eq!(asm.diagnostics[0].line, 2);
    assert_eq!(asm.diagnostics[0].message, "address space exhausted");

    // not even one word fits
    let asm = assemble("syscall", AssemblerConfig { base: u64::MAX - 3, ..Default::default() });
    assert!(asm.bytes.is_empty());
    assert!(asm.has_errors());
}

#[test]
fn odd_branch_distance_is_reported() {
    let asm = assemble("beq $r1, $r2, next+1\nnext: syscall", AssemblerConfig::default());
    assert_eq!(asm.diagnostics.len(), 1);
    assert_eq!(asm.diagnostics[0].line, 1);
    assert_eq!(asm.diagnostics[0].message, "R_RAISIN64_PCREL32 value 9 is not a multiple of 2");

    let asm = assemble("beq $r1, $r2, 3", AssemblerConfig::default());
    assert_eq!(asm.diagnostics[0].message, "branch offset 3 is not a multiple of 2");
    assert!(asm.bytes.is_empty());
}
