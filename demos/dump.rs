//! Walk the full stack against the simulated target: initialize the TAP,
//! acquire and halt the CPU, then hex-dump and disassemble a small
//! program — the same flow a hardware-backed tool runs against a real
//! MSP430 with `signal::gpio` or `signal::ft232r` in place of the sim.
use msp430_jtag::control::Target;
use msp430_jtag::dump::{self, TextSink, WriteSink};
use msp430_jtag::fsm::JtagFsm;
use msp430_jtag::signal::sim::SimTarget;

fn main() {
    env_logger::init();

    let mut sim = SimTarget::new();
    sim.load(
        0xC000,
        &[
            0x40B2, 0x5A80, 0x0120, // MOV #0x5A80, &0x0120 (stop the watchdog)
            0x4031, 0x0400, // MOV #0x0400, SP
            0x12B0, 0xC0F0, // CALL #0xC0F0
            0x3FFF, // JMP $
        ],
    );
    sim.load(0xFFFE, &[0xC000]);

    let mut fsm = JtagFsm::new(sim);
    fsm.init().expect("target did not answer the IR scan");
    let mut target = Target::new(fsm);
    target.acquire();
    target.set_instruction_fetch().expect("instruction fetch");
    target.halt();

    let mut sink = WriteSink(std::io::stdout());
    dump::dump_words(&mut target, &mut sink, 0xC000, 0xC010);
    sink.write("\n");
    dump::disassemble(&mut target, &mut sink, 0xC000, 0xC010);

    target.release_cpu();
    target.release();
}
