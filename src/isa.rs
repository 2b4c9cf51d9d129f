//! Pure decode helpers for the 16-bit MSP430 instruction encoding: opcode
//! classification, addressing-mode and register field extraction, operand
//! word counts, and jump/call target arithmetic.  No I/O and no state
//! beyond the static opcode table, so everything here is freely reentrant.

/// The three MSP430 instruction formats.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Format {
    /// `[15:7]` opcode, `[6]` B/W, `[5:4]` As, `[3:0]` register.
    Single,
    /// `[15:12]` opcode, `[11:8]` source, `[7]` Ad, `[6]` B/W, `[5:4]` As,
    /// `[3:0]` destination.
    Double,
    /// `001` in `[15:13]`, condition in `[12:10]`, signed offset in `[9:0]`.
    Jump,
}

/// How an operand field addresses its register.  The meaning shifts when
/// the register is the PC or one of the constant generators; see
/// [`operand_words`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AddressingMode {
    Register,
    Indexed,
    Indirect,
    AutoIncrement,
}

pub struct OpCode {
    pub mask: u16,
    pub format: Format,
    pub mnemonic: &'static str,
}

/// The opcode table, scanned linearly with first-match-wins semantics
/// under the rule `word & mask == mask`.
///
/// Order matters: several masks are submasks of others (every CALL word
/// also carries PUSH's and RRC's mask bits, every SUBC word carries
/// ADDC's), so entries are sorted narrowest class first.  Re-ordering this
/// table silently misclassifies.
pub static OPCODES: [OpCode; 27] = [
    OpCode { mask: 0xF000, format: Format::Double, mnemonic: "AND" },
    OpCode { mask: 0xE000, format: Format::Double, mnemonic: "XOR" },
    OpCode { mask: 0xD000, format: Format::Double, mnemonic: "BIS" },
    OpCode { mask: 0xC000, format: Format::Double, mnemonic: "BIC" },
    OpCode { mask: 0xB000, format: Format::Double, mnemonic: "BIT" },
    OpCode { mask: 0xA000, format: Format::Double, mnemonic: "DADD" },
    OpCode { mask: 0x9000, format: Format::Double, mnemonic: "CMP" },
    OpCode { mask: 0x8000, format: Format::Double, mnemonic: "SUB" },
    OpCode { mask: 0x7000, format: Format::Double, mnemonic: "SUBC" },
    OpCode { mask: 0x6000, format: Format::Double, mnemonic: "ADDC" },
    OpCode { mask: 0x5000, format: Format::Double, mnemonic: "ADD" },
    OpCode { mask: 0x4000, format: Format::Double, mnemonic: "MOV" },
    OpCode { mask: 0x3C00, format: Format::Jump, mnemonic: "JMP" },
    OpCode { mask: 0x3800, format: Format::Jump, mnemonic: "JL" },
    OpCode { mask: 0x3400, format: Format::Jump, mnemonic: "JGE" },
    OpCode { mask: 0x3000, format: Format::Jump, mnemonic: "JN" },
    OpCode { mask: 0x2C00, format: Format::Jump, mnemonic: "JC" },
    OpCode { mask: 0x2800, format: Format::Jump, mnemonic: "JNC" },
    OpCode { mask: 0x2400, format: Format::Jump, mnemonic: "JEQ" },
    OpCode { mask: 0x2000, format: Format::Jump, mnemonic: "JNE" },
    OpCode { mask: 0x1300, format: Format::Single, mnemonic: "RETI" },
    OpCode { mask: 0x1280, format: Format::Single, mnemonic: "CALL" },
    OpCode { mask: 0x1200, format: Format::Single, mnemonic: "PUSH" },
    OpCode { mask: 0x1180, format: Format::Single, mnemonic: "SXT" },
    OpCode { mask: 0x1100, format: Format::Single, mnemonic: "RRA" },
    OpCode { mask: 0x1080, format: Format::Single, mnemonic: "SWPB" },
    OpCode { mask: 0x1000, format: Format::Single, mnemonic: "RRC" },
];

/// Classify an instruction word.  `None` means the word matches no entry
/// and cannot be decoded.
pub fn classify(word: u16) -> Option<&'static OpCode> {
    OPCODES.iter().find(|op| word & op.mask == op.mask)
}

/// Addressing mode of the source field (As, bits 4-5).  Also covers the
/// operand field of Single-format instructions, which shares the encoding.
pub fn source_mode(word: u16) -> AddressingMode {
    match word & 0x0030 {
        0x0000 => AddressingMode::Register,
        0x0010 => AddressingMode::Indexed,
        0x0020 => AddressingMode::Indirect,
        _ => AddressingMode::AutoIncrement,
    }
}

/// Addressing mode of the destination field (Ad, bit 7) in Double-format
/// instructions.  Only the Register/Indexed distinction exists here.
pub fn dest_mode(word: u16) -> AddressingMode {
    if word & 0x0080 != 0 {
        AddressingMode::Indexed
    } else {
        AddressingMode::Register
    }
}

/// Source register number.  Double format carries it in bits 8-11, Single
/// format in bits 0-3; Jump format has no register fields.
pub fn source_register(word: u16, format: Format) -> u16 {
    match format {
        Format::Double => (word >> 8) & 0x000F,
        Format::Single => word & 0x000F,
        Format::Jump => 0,
    }
}

/// Destination register number (bits 0-3 in Double format).
pub fn dest_register(word: u16) -> u16 {
    word & 0x000F
}

/// True when the B/W bit (bit 6) selects byte operation.  Meaningless for
/// Jump format.
pub fn is_byte_op(word: u16) -> bool {
    word & 0x0040 != 0
}

/// How many trailing words the operand consumes.  Instruction length is
/// data dependent: Indexed mode carries its offset in the next word, and
/// autoincrement through the PC is the immediate encoding, carrying the
/// literal in the next word.  The constant generators are the exceptions:
/// `X(R3)` in a source field aliases the constant #1 and `@R2+`/`@R3+`
/// alias fixed constants, none of which occupy memory.
pub fn operand_words(reg: u16, mode: AddressingMode, is_source: bool) -> usize {
    match mode {
        AddressingMode::Indexed => {
            if is_source && reg == 3 {
                0
            } else {
                1
            }
        }
        AddressingMode::AutoIncrement => {
            if is_source && reg == 0 {
                1
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Resolve a Jump-format target: sign-extend the 10-bit offset, double it,
/// and add it to the address of the following word.  Arithmetic wraps over
/// the full 16-bit address space.
pub fn jump_target(word: u16, addr: u16) -> u16 {
    let offset = ((word & 0x03FF) << 6) as i16 >> 6;
    addr.wrapping_add(2).wrapping_add((offset as u16).wrapping_mul(2))
}

/// Resolve the destination of a CALL, when it is statically resolvable:
/// `CALL offset(PC)` is PC-relative and `CALL #addr` is immediate.  Every
/// other addressing mode depends on runtime register contents.
pub fn call_target(word: u16, src_extra: u16, addr: u16) -> Option<u16> {
    let reg = source_register(word, Format::Single);
    match source_mode(word) {
        AddressingMode::Indexed if reg == 0 => Some(addr.wrapping_add(src_extra)),
        AddressingMode::AutoIncrement => Some(src_extra),
        _ => None,
    }
}

/// Conventional register names: dedicated roles for R0-R3, `R<n>`
/// otherwise.
pub fn register_name(reg: u16) -> &'static str {
    const NAMES: [&str; 16] = [
        "PC", "SP", "SR", "CG2", "R4", "R5", "R6", "R7", "R8", "R9", "R10", "R11", "R12", "R13",
        "R14", "R15",
    ];
    NAMES[(reg & 0x000F) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submask_order_is_preserved() {
        // 0x1280 carries PUSH's 0x1200 and RRC's 0x1000 as submasks; the
        // narrower CALL entry has to win.
        assert_eq!(classify(0x1280).unwrap().mnemonic, "CALL");
        assert_eq!(classify(0x1290).unwrap().mnemonic, "CALL");
        // RETI words carry PUSH's mask bits too.
        assert_eq!(classify(0x1300).unwrap().mnemonic, "RETI");
        // Every SUBC word matches ADDC's mask.
        assert_eq!(classify(0x7505).unwrap().mnemonic, "SUBC");
        // 0x6795 carries JNE's 0x2000 bit and MOV's 0x4000 bit.
        assert_eq!(classify(0x6795).unwrap().mnemonic, "ADDC");
    }

    #[test]
    fn classify_rejects_unknown_words() {
        assert!(classify(0x0DEA).is_none());
        assert!(classify(0x0000).is_none());
    }

    #[test]
    fn classify_plain_instructions() {
        assert_eq!(classify(0x8321).unwrap().mnemonic, "SUB");
        assert_eq!(classify(0x4031).unwrap().mnemonic, "MOV");
        assert_eq!(classify(0x2404).unwrap().mnemonic, "JEQ");
        assert_eq!(classify(0x3FFF).unwrap().mnemonic, "JMP");
        assert_eq!(classify(0x1102).unwrap().mnemonic, "RRA");
    }

    #[test]
    fn source_field_extraction() {
        assert_eq!(source_register(0x6795, Format::Double), 7);
        assert_eq!(source_register(0x1290, Format::Single), 0);
        assert_eq!(dest_register(0x6795), 5);
        assert_eq!(source_mode(0x6795), AddressingMode::Indexed);
        assert_eq!(source_mode(0x8321), AddressingMode::Indirect);
        assert_eq!(dest_mode(0x6795), AddressingMode::Indexed);
        assert_eq!(dest_mode(0x8321), AddressingMode::Register);
        assert!(is_byte_op(0x1144));
        assert!(!is_byte_op(0x8321));
    }

    #[test]
    fn operand_word_counts() {
        use AddressingMode::*;
        // Indexed consumes the offset word...
        assert_eq!(operand_words(7, Indexed, true), 1);
        assert_eq!(operand_words(5, Indexed, false), 1);
        // ...except X(R3) in a source field, the constant generator for #1.
        assert_eq!(operand_words(3, Indexed, true), 0);
        assert_eq!(operand_words(3, Indexed, false), 1);
        // Immediate mode is @PC+ and consumes the literal word.
        assert_eq!(operand_words(0, AutoIncrement, true), 1);
        // @R2+/@R3+ alias fixed constants; plain @Rn+ needs no word.
        assert_eq!(operand_words(2, AutoIncrement, true), 0);
        assert_eq!(operand_words(3, AutoIncrement, true), 0);
        assert_eq!(operand_words(4, AutoIncrement, true), 0);
        assert_eq!(operand_words(9, Register, true), 0);
        assert_eq!(operand_words(9, Indirect, true), 0);
    }

    #[test]
    fn jump_targets() {
        // Positive offset: 0x2404 at 0x1000 jumps over four words.
        assert_eq!(jump_target(0x2404, 0x1000), 0x100A);
        // Negative offset: 0x3FE is -2 in 10-bit two's complement.
        assert_eq!(jump_target(0x23FE, 0x1000), 0x0FFE);
        // JMP $ (offset -1) targets itself.
        assert_eq!(jump_target(0x3FFF, 0xC010), 0xC010);
        // Backward jumps wrap through zero.
        assert_eq!(jump_target(0x23F8, 0x0002), 0xFFF4);
    }

    #[test]
    fn call_targets() {
        // CALL 0x0020(PC): PC-relative.
        assert_eq!(call_target(0x1290, 0x0020, 0x1000), Some(0x1020));
        // CALL #0xC000: immediate.
        assert_eq!(call_target(0x12B0, 0xC000, 0x1000), Some(0xC000));
        // CALL R10 depends on runtime state.
        assert_eq!(call_target(0x128A, 0xBEEF, 0x1000), None);
    }

    #[test]
    fn register_names() {
        assert_eq!(register_name(0), "PC");
        assert_eq!(register_name(1), "SP");
        assert_eq!(register_name(2), "SR");
        assert_eq!(register_name(3), "CG2");
        assert_eq!(register_name(4), "R4");
        assert_eq!(register_name(15), "R15");
    }
}
