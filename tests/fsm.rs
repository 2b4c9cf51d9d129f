//! Shift-register properties of the TAP driver, run against the simulated
//! target.
use msp430_jtag::fsm::{JtagFsm, IR_ADDR_16BIT, IR_BYPASS, JTAG_ID};
use msp430_jtag::signal::sim::SimTarget;
use msp430_jtag::signal::{Signal, SignalIo};

fn init_fsm() -> JtagFsm<SimTarget> {
    let mut fsm = JtagFsm::new(SimTarget::new());
    fsm.init().expect("init");
    fsm
}

#[test]
fn init_reaches_idle() {
    let mut fsm = JtagFsm::new(SimTarget::new());
    assert!(fsm.init().is_ok());
}

#[test]
fn ir_shift_always_captures_the_jtag_id() {
    let mut fsm = init_fsm();
    for value in 0..=255_u8 {
        assert_eq!(fsm.ir_shift(value), JTAG_ID);
    }
}

#[test]
fn dr_shift_returns_the_previous_word() {
    let mut fsm = init_fsm();
    fsm.ir_shift(IR_ADDR_16BIT);
    fsm.dr_shift(0);
    // one-shift latency: each call reads back the word before it
    assert_eq!(fsm.dr_shift(0x4411), 0x0000);
    assert_eq!(fsm.dr_shift(0xDEAD), 0x4411);
    assert_eq!(fsm.dr_shift(0xDEAD), 0xDEAD);
}

#[test]
fn address_register_retains_the_last_written_value() {
    let mut fsm = init_fsm();
    fsm.ir_shift(IR_ADDR_16BIT);
    fsm.dr_shift(0xBEEF);
    assert_eq!(fsm.dr_shift(0), 0xBEEF);
}

#[test]
fn bypass_is_a_one_clock_delay_line() {
    let mut fsm = init_fsm();
    fsm.ir_shift(IR_BYPASS);
    // bypass captures zero, then TDO follows TDI one TCK late
    assert_eq!(fsm.dr_shift(0x4411), 0x2208);
    assert_eq!(fsm.dr_shift(0x8EAD), 0x4756);
}

#[test]
fn shifts_restore_the_tclk_level_on_tdi() {
    let mut fsm = init_fsm();
    fsm.set_tclk();
    fsm.ir_shift(IR_ADDR_16BIT);
    assert!(fsm.io.get(Signal::Tdi));
    fsm.clr_tclk();
    fsm.dr_shift(0xAAAA);
    assert!(!fsm.io.get(Signal::Tdi));
}
