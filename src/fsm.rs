//! Drives the target's JTAG finite state machine (FSM) by bit banging the
//! six signal lines.  This layer knows nothing about the MSP430 CPU; it
//! moves the TAP between states, shifts the instruction and data registers,
//! and toggles TCLK, the virtual CPU clock that is multiplexed onto TDI
//! whenever the TAP sits in Run-Test/Idle.
//!
//! Interrupts on the host won't cause failure because TCK has no minimum
//! switching speed, but no other code may touch the signal lines while a
//! shift is in flight.
//!
//! JTAG interface reference: <https://www.ti.com/lit/ug/slau320aj/slau320aj.pdf>
use log::{debug, warn};
use thiserror::Error;

use crate::signal::{Signal, SignalIo};

// JTAG instructions (pg. 14 of the interface reference):

/// Sets the MAB to the value shifted in with the next 16-bit data access.
/// The previous value in the JTAG MAB register is simultaneously shifted
/// out on TDO while the new address comes in through TDI.
pub const IR_ADDR_16BIT: u8 = 0x83;
/// Readout of the MAB with the next data access; the data sent on TDI is
/// ignored and the MAB is left unchanged.
pub const IR_ADDR_CAPTURE: u8 = 0x84;
/// Sets the MDB to the value shifted in with the next data access, driving
/// the memory location addressed by the JTAG MAB register.  Used to write
/// all memory locations of the target.
pub const IR_DATA_TO_ADDR: u8 = 0x85;
/// Sets the MDB with the next data access while the MAB stays under CPU
/// control (the PC supplies the address).
pub const IR_DATA_16BIT: u8 = 0x41;
/// Like [`IR_DATA_16BIT`] but auto-increments the PC by two on every
/// falling TCLK edge, for fast memory array access.  Cannot be used on
/// flash or dual-ported RAM.
pub const IR_DATA_QUICK: u8 = 0x43;
/// One-TCK delay line between TDI and TDO; loading it also performs
/// [`IR_CNTRL_SIG_RELEASE`].
pub const IR_BYPASS: u8 = 0xFF;
/// Sets the complete JTAG control signal register with the next data
/// access, shifting the previous value out on TDO.  The new value takes
/// effect when the TAP passes Update-DR.
pub const IR_CNTRL_SIG_16BIT: u8 = 0x13;
/// Readout of the JTAG control signal register with the next data access.
pub const IR_CNTRL_SIG_CAPTURE: u8 = 0x14;
/// Completely releases the CPU from JTAG control.
pub const IR_CNTRL_SIG_RELEASE: u8 = 0x15;
/// Switches the JTAG data register into PSA (signature analysis) mode.
pub const IR_DATA_PSA: u8 = 0x44;
/// Shifts out the PSA pattern generated by [`IR_DATA_PSA`].
pub const IR_SHIFT_OUT_PSA: u8 = 0x46;
/// Sets the target into program-fuse mode.
pub const IR_PREPARE_BLOW: u8 = 0x22;
/// Programs (blows) the access-protection fuse; must follow
/// [`IR_PREPARE_BLOW`].
pub const IR_EX_BLOW: u8 = 0x24;
/// JTAG mailbox exchange.
pub const IR_JMB_EXCHANGE: u8 = 0x61;

/// The 8-bit JTAG ID captured into the instruction register on every IR
/// scan.  Identical for all MSP430 devices (pg. 64 of the interface
/// reference).
pub const JTAG_ID: u8 = 0x89;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TapState {
    Reset,
    Idle,
    SelectDr,
    CaptureDr,
    ShiftDr,
    Exit1Dr,
    PauseDr,
    Exit2Dr,
    UpdateDr,
    SelectIr,
    CaptureIr,
    ShiftIr,
    Exit1Ir,
    PauseIr,
    Exit2Ir,
    UpdateIr,
}

impl TapState {
    /// The IEEE 1149.1 state graph: where one TCK pulse moves the TAP,
    /// given the level on TMS.
    pub fn next(self, tms: bool) -> TapState {
        use TapState::*;
        match (self, tms) {
            (Reset, true) => Reset,
            (Reset, false) => Idle,
            (Idle, true) => SelectDr,
            (Idle, false) => Idle,
            (SelectDr, true) => SelectIr,
            (SelectDr, false) => CaptureDr,
            (CaptureDr, true) => Exit1Dr,
            (CaptureDr, false) => ShiftDr,
            (ShiftDr, true) => Exit1Dr,
            (ShiftDr, false) => ShiftDr,
            (Exit1Dr, true) => UpdateDr,
            (Exit1Dr, false) => PauseDr,
            (PauseDr, true) => Exit2Dr,
            (PauseDr, false) => PauseDr,
            (Exit2Dr, true) => UpdateDr,
            (Exit2Dr, false) => ShiftDr,
            (UpdateDr, true) => SelectDr,
            (UpdateDr, false) => Idle,
            (SelectIr, true) => Reset,
            (SelectIr, false) => CaptureIr,
            (CaptureIr, true) => Exit1Ir,
            (CaptureIr, false) => ShiftIr,
            (ShiftIr, true) => Exit1Ir,
            (ShiftIr, false) => ShiftIr,
            (Exit1Ir, true) => UpdateIr,
            (Exit1Ir, false) => PauseIr,
            (PauseIr, true) => Exit2Ir,
            (PauseIr, false) => PauseIr,
            (Exit2Ir, true) => UpdateIr,
            (Exit2Ir, false) => ShiftIr,
            (UpdateIr, true) => SelectDr,
            (UpdateIr, false) => Idle,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum InitError {
    /// The IR scan after the entry sequence did not capture the JTAG ID.
    /// Either no target is present, the wiring is broken, or the security
    /// fuse is blown; the hardware exposes no way to tell these apart.
    #[error("IR scan captured {0:#04X}, expected JTAG ID 0x89")]
    BadJtagId(u8),
}

/// Keeps track of the state of the target's TAP and of the TCLK level, and
/// provides the two fundamental shift primitives everything else is built
/// from.  Every public operation begins and ends in Run-Test/Idle.
pub struct JtagFsm<T> {
    pub io: T,
    state: TapState,
    tclk: bool,
}

impl<T: SignalIo> JtagFsm<T> {
    /// Wrap an existing signal backend.  The TAP is assumed to be in an
    /// unknown state until [`init`](Self::init) walks it into Run-Test/Idle.
    pub fn new(io: T) -> Self {
        Self {
            io,
            state: TapState::Reset,
            tclk: false,
        }
    }

    /// One TCK pulse.  TMS must already be driven to `tms`; the tracked
    /// TAP state advances along the state graph.
    fn pulse(&mut self, tms: bool) {
        self.io.set(Signal::Tck, false);
        self.io.set(Signal::Tck, true);
        self.state = self.state.next(tms);
    }

    /// Drive TMS and clock once.
    fn clock(&mut self, tms: bool) {
        self.io.set(Signal::Tms, tms);
        self.pulse(tms);
    }

    /// Initializes the JTAG FSM to the Run-Test/Idle state.
    ///
    /// Configures the signal lines, runs the JTAG entry sequence for
    /// targets with shared JTAG/GPIO pins (case 2b of the interface
    /// reference, Fig. 2-13), resets the TAP into Test-Logic-Reset,
    /// drops to Run-Test/Idle with TCLK high, and performs the fuse
    /// check.  The fuse check has no status port, so the one detectable
    /// failure is a dead IR scan afterwards: the captured byte is
    /// compared against the fixed JTAG ID.
    pub fn init(&mut self) -> Result<(), InitError> {
        self.io.configure();

        // JTAG entry sequence: case 2b, Fig. 2-13
        self.io.set(Signal::Test, true);
        self.io.set(Signal::Test, false);
        self.io.set(Signal::Test, true);
        self.io.set(Signal::Rst, true);

        // Force the TAP to Test-Logic-Reset in case of a faulty fuse check
        self.io.set(Signal::Tms, true);
        for _ in 0..6 {
            self.pulse(true);
        }

        // One TMS-low clock into Run-Test/Idle, TDI left high so TCLK
        // starts at a defined level
        self.io.set(Signal::Tms, false);
        self.io.set(Signal::Tdi, true);
        self.tclk = true;
        self.pulse(false);
        debug_assert_eq!(self.state, TapState::Idle);

        // Fuse check: three TMS pulses whose low phase must last 5us or
        // more, or the security fuse silently blocks access
        for _ in 0..3 {
            self.io.set(Signal::Tms, false);
            self.io.delay_us(5);
            self.io.set(Signal::Tms, true);
        }
        self.io.set(Signal::Tms, false);
        debug!("TAP in Run-Test/Idle, fuse check done");

        let id = self.ir_shift(IR_BYPASS);
        if id != JTAG_ID {
            warn!("JTAG entry failed: IR scan captured {id:#04X}");
            return Err(InitError::BadJtagId(id));
        }
        Ok(())
    }

    /// Shifts an 8-bit JTAG instruction into the instruction register,
    /// LSB first.  One bit of the TAP's own ID output is captured from TDO
    /// for every bit of `instruction` clocked in; the captured byte is the
    /// JTAG ID whenever a target is answering.
    ///
    /// TDI doubles as TCLK, so the level driven during the return to
    /// Run-Test/Idle is restored to the tracked TCLK level.  Losing that
    /// level corrupts the target clock.
    pub fn ir_shift(&mut self, instruction: u8) -> u8 {
        debug_assert_eq!(self.state, TapState::Idle);
        let mut captured: u8 = 0;

        self.clock(true); // Select-DR
        self.clock(true); // Select-IR
        self.clock(false); // Capture-IR
        self.pulse(false); // Shift-IR

        for i in 0..7 {
            self.io.set(Signal::Tdi, (instruction >> i) & 1 == 1);
            self.pulse(false);
            if self.io.get(Signal::Tdo) {
                captured |= 1 << (7 - i);
            }
        }

        // MSB goes out together with the exit from Shift-IR
        self.io.set(Signal::Tms, true);
        self.io.set(Signal::Tdi, instruction >> 7 == 1);
        self.pulse(true); // Exit1-IR
        if self.io.get(Signal::Tdo) {
            captured |= 1;
        }

        self.io.set(Signal::Tdi, self.tclk);
        self.pulse(true); // Update-IR
        self.clock(false); // Run-Test/Idle

        for _ in 0..4 {
            self.pulse(false);
        }
        debug_assert_eq!(self.state, TapState::Idle);
        captured
    }

    /// Shifts a 16-bit word into whichever data register the last-written
    /// instruction selects, MSB first.
    ///
    /// Returns the value resident in that register *before* this call: the
    /// register captures on Capture-DR and shifts out while the new word
    /// shifts in, so the result is never an echo of `word` itself.  The
    /// TDI/TCLK restoration invariant of [`ir_shift`](Self::ir_shift)
    /// applies here too.
    pub fn dr_shift(&mut self, word: u16) -> u16 {
        debug_assert_eq!(self.state, TapState::Idle);
        let mut captured: u16 = 0;

        self.clock(true); // Select-DR
        self.clock(false); // Capture-DR
        self.pulse(false); // Shift-DR

        for i in (1..16).rev() {
            self.io.set(Signal::Tdi, (word >> i) & 1 == 1);
            self.pulse(false);
            if self.io.get(Signal::Tdo) {
                captured |= 1 << i;
            }
        }

        // LSB goes out together with the exit from Shift-DR
        self.io.set(Signal::Tms, true);
        self.io.set(Signal::Tdi, word & 1 == 1);
        self.pulse(true); // Exit1-DR
        if self.io.get(Signal::Tdo) {
            captured |= 1;
        }

        self.io.set(Signal::Tdi, self.tclk);
        self.pulse(true); // Update-DR
        self.clock(false); // Run-Test/Idle

        for _ in 0..4 {
            self.pulse(false);
        }
        debug_assert_eq!(self.state, TapState::Idle);
        captured
    }

    /// Rising edge of the virtual CPU clock.  Must only be called in
    /// Run-Test/Idle; the target is not pipelined, so a full clr/set cycle
    /// executes exactly one CPU step.
    pub fn set_tclk(&mut self) {
        debug_assert_eq!(self.state, TapState::Idle);
        self.io.set(Signal::Tdi, true);
        self.tclk = true;
    }

    /// Falling edge of the virtual CPU clock.  Must only be called in
    /// Run-Test/Idle.
    pub fn clr_tclk(&mut self) {
        debug_assert_eq!(self.state, TapState::Idle);
        self.io.set(Signal::Tdi, false);
        self.tclk = false;
    }
}
