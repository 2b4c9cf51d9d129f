//! Target-control protocol tests against the simulated target.
use msp430_jtag::control::{Target, TargetError};
use msp430_jtag::fsm::JtagFsm;
use msp430_jtag::signal::sim::SimTarget;

fn acquired_target(sim: SimTarget) -> Target<SimTarget> {
    let mut fsm = JtagFsm::new(sim);
    fsm.init().expect("init");
    let mut target = Target::new(fsm);
    target.acquire();
    target
}

#[test]
fn read_write_round_trip() {
    let mut target = acquired_target(SimTarget::new());
    target.halt();
    target.write_mem(0x0332, 0xB0BA);
    target.write_mem(0x0200, 0xCAFE);
    target.release_cpu();

    target.halt();
    assert_eq!(target.read_mem(0x0332), 0xB0BA);
    assert_eq!(target.read_mem(0x0200), 0xCAFE);
    // untouched flash reads erased
    assert_eq!(target.read_mem(0xC555), 0xFFFF);
    target.release_cpu();
}

#[test]
fn acquire_with_limit_succeeds_on_a_live_target() {
    let mut fsm = JtagFsm::new(SimTarget::new());
    fsm.init().expect("init");
    let mut target = Target::new(fsm);
    assert_eq!(target.acquire_with_limit(8), Ok(()));
}

#[test]
fn acquire_with_limit_times_out_on_a_dead_target() {
    let mut sim = SimTarget::new();
    sim.set_sync_latency(u32::MAX);
    let mut fsm = JtagFsm::new(sim);
    fsm.init().expect("init");
    let mut target = Target::new(fsm);
    assert_eq!(
        target.acquire_with_limit(8),
        Err(TargetError::SyncTimeout(8))
    );
}

#[test]
fn instruction_fetch_synchronizes_within_eight_steps() {
    let mut target = acquired_target(SimTarget::new());
    assert!(target.set_instruction_fetch().is_ok());
}

#[test]
fn set_pc_loads_the_program_counter() {
    let mut target = acquired_target(SimTarget::new());
    target.set_pc(0xC010);
    assert_eq!(target.fsm.io.pc(), 0xC010);
}

#[test]
fn por_restarts_from_the_reset_vector() {
    let mut sim = SimTarget::new();
    sim.load(0xFFFE, &[0xC000]);
    let mut target = acquired_target(sim);
    target.execute_por();
    assert_eq!(target.fsm.io.pc(), 0xC000);
}

#[test]
fn release_detaches_jtag() {
    let mut target = acquired_target(SimTarget::new());
    target.release();
    assert!(target.fsm.io.released());
}
