//! Hex-dump and listing flows over the full driver stack.
use msp430_jtag::control::Target;
use msp430_jtag::dump;
use msp430_jtag::fsm::JtagFsm;
use msp430_jtag::signal::sim::SimTarget;

fn halted_target(sim: SimTarget) -> Target<SimTarget> {
    let mut fsm = JtagFsm::new(sim);
    fsm.init().expect("init");
    let mut target = Target::new(fsm);
    target.acquire();
    target.halt();
    target
}

#[test]
fn dump_words_formats_eight_per_line() {
    let mut sim = SimTarget::new();
    sim.load(0x0200, &[0x0001, 0x0002, 0x0003, 0x0004]);
    let mut target = halted_target(sim);

    let mut out = String::new();
    dump::dump_words(&mut target, &mut out, 0x0200, 0x0208);
    assert_eq!(out, "0x0200: 0x0001 0x0002 0x0003 0x0004\n");

    let mut out = String::new();
    dump::dump_words(&mut target, &mut out, 0x0200, 0x0214);
    assert_eq!(
        out,
        "0x0200: 0x0001 0x0002 0x0003 0x0004 0xFFFF 0xFFFF 0xFFFF 0xFFFF\n\
         0x0210: 0xFFFF 0xFFFF\n"
    );
}

#[test]
fn listing_resynchronizes_after_an_error() {
    let mut sim = SimTarget::new();
    sim.load(
        0xC000,
        &[0x40B2, 0x5A80, 0x0120, 0x0DEA, 0x3FFF],
    );
    let mut target = halted_target(sim);

    let mut out = String::new();
    dump::disassemble(&mut target, &mut out, 0xC000, 0xC00A);
    assert_eq!(
        out,
        "0xC000  MOV.W #0x5A80 &0x0120\n\
         0xC006  ERROR\n\
         0xC008  JMP 0xC008\n"
    );
}
