use raisin64::opcodes::{OpcodeTable, Shape, NARROW16_MAP};

#[test]
fn by_opcode_is_self_consistent() {
    let t = OpcodeTable::new();
    for v in 0u8..64 {
        assert_eq!(t.by_opcode(v).opcode, v);
    }
}

#[test]
fn lookup_is_exact_and_case_sensitive() {
    let t = OpcodeTable::new();
    let beq = t.lookup("beq").unwrap();
    assert_eq!(beq.opcode, 0x3c);
    assert_eq!(beq.shape, Shape::Bds1i);
    assert!(beq.signed());
    assert!(t.lookup("BEQ").is_none());
    assert!(t.lookup("be").is_none());
    assert_eq!(t.lookup("f*").unwrap().shape, Shape::Ds1s2i);
}

#[test]
fn narrow_forms() {
    let t = OpcodeTable::new();
    for (sel, &op) in NARROW16_MAP.iter().enumerate() {
        assert_eq!(t.narrow(sel as u8).opcode, op);
    }
    assert_eq!(t.narrow(2).name, "addi");
    assert!(t.narrow(7).is_bad());
    // no 32-bit form
    for name in ["ji", "jali", "lui", "f*"] {
        assert!(!t.lookup(name).unwrap().narrow32(), "{name}");
    }
}

#[test]
fn reserved_slots() {
    let t = OpcodeTable::new();
    let reserved: Vec<u8> = t.iter().filter(|e| e.is_bad()).map(|e| e.opcode).collect();
    assert_eq!(
        reserved,
        vec![0x02, 0x03, 0x0b, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x22, 0x23, 0x2b]
    );
}
