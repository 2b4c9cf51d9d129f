//! End-to-end disassembly vectors.
use msp430_jtag::disasm::next_instruction;

#[test]
fn single_word_double_operand() {
    let d = next_instruction(&[0x8321, 0xBBBB, 0xAAAA], 0x1000);
    assert_eq!(d.text, "SUB.W @CG2 SP");
    assert_eq!(d.words, 1);
    assert_eq!(d.next_addr, 0x1002);
}

#[test]
fn three_word_double_operand() {
    let d = next_instruction(&[0x6795, 0x1A1B, 0x2424], 0x1000);
    assert_eq!(d.text, "ADDC.W 0x1A1B(R7) 0x2424(R5)");
    assert_eq!(d.words, 3);
    assert_eq!(d.next_addr, 0x1006);
}

#[test]
fn undecodable_word_never_stalls() {
    let d = next_instruction(&[0x0DEA, 0x8321, 0x0000], 0x1000);
    assert_eq!(d.text, "ERROR");
    assert_eq!(d.words, 1);
    assert_eq!(d.next_addr, 0x1002);
    // the stream picks back up on the next word
    let d = next_instruction(&[0x8321, 0x0000, 0x0000], 0x1002);
    assert_eq!(d.text, "SUB.W @CG2 SP");
}

#[test]
fn jump_targets_render_resolved() {
    let d = next_instruction(&[0x2404, 0, 0], 0x1000);
    assert_eq!(d.text, "JEQ 0x100A");
    let d = next_instruction(&[0x23FE, 0, 0], 0x1000);
    assert_eq!(d.text, "JNE 0x0FFE");
    let d = next_instruction(&[0x3FFF, 0, 0], 0xC008);
    assert_eq!(d.text, "JMP 0xC008");
}
