//! Renders decoded instruction words as assembly text.  Feed it a sliding
//! three-word window of target memory and it reports the mnemonic line,
//! how many words the instruction consumed, and where the next instruction
//! starts; instruction length varies with the addressing modes in use.
use alloc::format;
use alloc::string::String;

use crate::isa::{self, AddressingMode, Format};

/// One decoded instruction.
pub struct Decoded {
    /// Assembly text, or the literal `ERROR` for an undecodable word.
    pub text: String,
    /// How many of the three input words belong to this instruction (1-3).
    pub words: usize,
    /// Address of the following instruction.
    pub next_addr: u16,
}

fn hex(word: u16) -> String {
    format!("0x{word:04X}")
}

/// Render one operand.  The constant-generator and PC special cases come
/// first: immediate mode is `@PC+`, `X(PC)` is a symbolic (PC-relative)
/// address, `X(SR)` is an absolute address, and `X(R3)` in a source field
/// is the constant #1 with no offset word at all.  Everything else renders
/// by register name.
fn operand(mode: AddressingMode, reg: u16, extra: u16, pc: u16, is_source: bool) -> String {
    use AddressingMode::*;
    match (mode, reg) {
        (AutoIncrement, 0) => format!("#{}", hex(extra)),
        (Indexed, 0) => hex(pc.wrapping_add(extra)),
        (Indexed, 2) => format!("&{}", hex(extra)),
        (Indexed, 3) if is_source => String::from("#1"),
        (Register, 3) if is_source => String::from("#0"),
        _ => {
            let name = isa::register_name(reg);
            match mode {
                Register => String::from(name),
                Indexed => format!("{}({})", hex(extra), name),
                Indirect => format!("@{name}"),
                AutoIncrement => format!("@{name}+"),
            }
        }
    }
}

fn suffix(word: u16) -> &'static str {
    if isa::is_byte_op(word) {
        ".B"
    } else {
        ".W"
    }
}

/// Certain operand patterns of ADDC are the canonical encodings of
/// documented emulated mnemonics; substitute those before falling back to
/// the generic rendering.  `ADDC #0, dst` (constant generator R3) is ADC,
/// `ADDC Rn, Rn` is RLC.
fn emulated(word: u16) -> Option<String> {
    if word & 0xF000 != 0x6000 {
        return None;
    }
    let src = isa::source_register(word, Format::Double);
    let dst = isa::dest_register(word);
    if isa::source_mode(word) != AddressingMode::Register {
        return None;
    }
    if src == 3 {
        return Some(String::from("ADC"));
    }
    if isa::dest_mode(word) == AddressingMode::Register && src == dst {
        return Some(String::from("RLC"));
    }
    None
}

/// Decode the instruction beginning at `addr`, whose first word is
/// `code[0]`.  The two following memory words must be supplied even when
/// the instruction turns out not to use them.
///
/// An unclassifiable word produces the literal text `ERROR` and consumes
/// exactly one word, so a caller walking an instruction stream
/// resynchronizes on the next word instead of stalling.
pub fn next_instruction(code: &[u16; 3], addr: u16) -> Decoded {
    let Some(op) = isa::classify(code[0]) else {
        return Decoded {
            text: String::from("ERROR"),
            words: 1,
            next_addr: addr.wrapping_add(2),
        };
    };
    let word = code[0];

    let (text, words) = match op.format {
        Format::Jump => {
            let text = format!("{} {}", op.mnemonic, hex(isa::jump_target(word, addr)));
            (text, 1)
        }
        Format::Single => {
            if op.mnemonic == "RETI" {
                (String::from("RETI"), 1)
            } else {
                let mode = isa::source_mode(word);
                let reg = isa::source_register(word, Format::Single);
                let n = isa::operand_words(reg, mode, true);
                let text = format!(
                    "{}{} {}",
                    op.mnemonic,
                    suffix(word),
                    operand(mode, reg, code[1], addr, true)
                );
                (text, 1 + n)
            }
        }
        Format::Double => {
            let src_mode = isa::source_mode(word);
            let src_reg = isa::source_register(word, Format::Double);
            let dst_mode = isa::dest_mode(word);
            let dst_reg = isa::dest_register(word);
            let src_n = isa::operand_words(src_reg, src_mode, true);
            let dst_n = isa::operand_words(dst_reg, dst_mode, false);
            let dst_extra = code[1 + src_n];

            if let Some(mnemonic) = emulated(word) {
                let text = format!(
                    "{}{} {}",
                    mnemonic,
                    suffix(word),
                    operand(dst_mode, dst_reg, dst_extra, addr, false)
                );
                (text, 1 + dst_n)
            } else {
                let text = format!(
                    "{}{} {} {}",
                    op.mnemonic,
                    suffix(word),
                    operand(src_mode, src_reg, code[1], addr, true),
                    operand(dst_mode, dst_reg, dst_extra, addr, false)
                );
                (text, 1 + src_n + dst_n)
            }
        }
    };

    Decoded {
        next_addr: addr.wrapping_add(2 * words as u16),
        text,
        words,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_rendering() {
        let d = next_instruction(&[0x2404, 0, 0], 0x1000);
        assert_eq!(d.text, "JEQ 0x100A");
        assert_eq!(d.words, 1);
        assert_eq!(d.next_addr, 0x1002);
    }

    #[test]
    fn register_and_indirect_operands() {
        let d = next_instruction(&[0x4A0B, 0, 0], 0xC000);
        assert_eq!(d.text, "MOV.W R10 R11");
        let d = next_instruction(&[0x4AAB, 0x0004, 0], 0xC000);
        assert_eq!(d.text, "MOV.W @R10 0x0004(R11)");
        assert_eq!(d.words, 2);
    }

    #[test]
    fn byte_suffix() {
        let d = next_instruction(&[0x1144, 0, 0], 0x1000);
        assert_eq!(d.text, "RRA.B R4");
    }

    #[test]
    fn immediate_and_symbolic_and_absolute() {
        // MOV #0x5A80, &0x0120 (the classic watchdog stop)
        let d = next_instruction(&[0x40B2, 0x5A80, 0x0120], 0xC000);
        assert_eq!(d.text, "MOV.W #0x5A80 &0x0120");
        assert_eq!(d.words, 3);
        assert_eq!(d.next_addr, 0xC006);
        // X(PC) renders as the resolved address
        let d = next_instruction(&[0x4190, 0x0010, 0x0004], 0xC000);
        assert_eq!(d.text, "MOV.W 0x0010(SP) 0xC004");
        assert_eq!(d.words, 3);
    }

    #[test]
    fn call_immediate_consumes_its_literal() {
        let d = next_instruction(&[0x12B0, 0xC55A, 0], 0xC000);
        assert_eq!(d.text, "CALL.W #0xC55A");
        assert_eq!(d.words, 2);
        assert_eq!(d.next_addr, 0xC004);
    }

    #[test]
    fn constant_generator_sources() {
        // #1 via X(R3): no offset word
        let d = next_instruction(&[0x531A, 0, 0], 0x1000);
        assert_eq!(d.text, "ADD.W #1 R10");
        assert_eq!(d.words, 1);
        // #0 via R3 register mode
        let d = next_instruction(&[0x430A, 0, 0], 0x1000);
        assert_eq!(d.text, "MOV.W #0 R10");
        assert_eq!(d.words, 1);
    }

    #[test]
    fn reti_is_bare() {
        let d = next_instruction(&[0x1300, 0, 0], 0x1000);
        assert_eq!(d.text, "RETI");
    }

    #[test]
    fn emulated_adc_and_rlc() {
        let d = next_instruction(&[0x6305, 0, 0], 0x1000);
        assert_eq!(d.text, "ADC.W R5");
        assert_eq!(d.words, 1);
        let d = next_instruction(&[0x6344, 0, 0], 0x1000);
        assert_eq!(d.text, "ADC.B R4");
        let d = next_instruction(&[0x6505, 0, 0], 0x1000);
        assert_eq!(d.text, "RLC.W R5");
        // Indexed source falls through to plain ADDC
        let d = next_instruction(&[0x6795, 0x1A1B, 0x2424], 0x1000);
        assert_eq!(d.text, "ADDC.W 0x1A1B(R7) 0x2424(R5)");
    }

    #[test]
    fn decode_error_consumes_one_word() {
        let d = next_instruction(&[0x0DEA, 0xBEEF, 0xBEEF], 0x1000);
        assert_eq!(d.text, "ERROR");
        assert_eq!(d.words, 1);
        assert_eq!(d.next_addr, 0x1002);
    }
}
