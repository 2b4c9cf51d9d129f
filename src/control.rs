//! Target-control protocol on top of the TAP primitives: take the CPU
//! under JTAG control, synchronize instruction fetch, load the PC, halt
//! and release, force a power-on reset, and move words in and out of the
//! target's memory space.
//!
//! The electrical layer reports nothing, so the only detectable failures
//! are protocol level: the sync flag never appearing during acquisition
//! and the instruction-fetch flag never appearing while stepping.  All
//! other malfunction shows up as silently wrong data; integration code
//! that cares should verify with read-after-write checks.
use bitflags::bitflags;
use log::{debug, warn};
use thiserror::Error;

use crate::fsm::{
    JtagFsm, IR_ADDR_16BIT, IR_ADDR_CAPTURE, IR_CNTRL_SIG_16BIT, IR_CNTRL_SIG_CAPTURE,
    IR_CNTRL_SIG_RELEASE, IR_DATA_16BIT, IR_DATA_TO_ADDR,
};
use crate::signal::SignalIo;

bitflags! {
    /// Bits of the JTAG control signal register.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct CtrlSig: u16 {
        /// Bus cycle direction: set for read, clear for write.
        const RW = 0x0001;
        /// Parks the CPU while JTAG owns the address and data buses.
        const HALT_JTAG = 0x0008;
        /// Byte-wide rather than word-wide memory transfer.
        const BYTE = 0x0010;
        /// Instruction-fetch phase indicator (read-only).
        const INSTR_LOAD = 0x0080;
        /// Set by the target once it has synchronized to JTAG control
        /// (read-only).
        const TCE = 0x0200;
        /// Requests JTAG control of the CPU.
        const TCE1 = 0x0400;
        /// Holds the CPU in power-on reset while set.
        const POR = 0x0800;
        /// Hands the low byte of the register back to the CPU.
        const RELEASE_LBYTE = 0x1000;
        /// Keeps the high byte under JTAG control.
        const TAGFUNCSAT = 0x2000;
    }
}

impl CtrlSig {
    /// 0x2401: high byte under JTAG, CPU control requested, reset clear.
    pub const JTAG_CONTROL: CtrlSig =
        CtrlSig::TAGFUNCSAT.union(CtrlSig::TCE1).union(CtrlSig::RW);
    /// 0x2409: one-word read transfer (0x2419 would read a byte).
    pub const WORD_READ: CtrlSig = CtrlSig::JTAG_CONTROL.union(CtrlSig::HALT_JTAG);
    /// 0x2408: one-word write transfer (0x2418 would write a byte).
    pub const WORD_WRITE: CtrlSig = CtrlSig::TAGFUNCSAT
        .union(CtrlSig::TCE1)
        .union(CtrlSig::HALT_JTAG);
    /// 0x2C01: power-on reset asserted.
    pub const APPLY_POR: CtrlSig = CtrlSig::JTAG_CONTROL.union(CtrlSig::POR);
    /// 0x3401: low byte released to the CPU for feeding it instructions.
    pub const PC_LOAD: CtrlSig = CtrlSig::JTAG_CONTROL.union(CtrlSig::RELEASE_LBYTE);
}

/// `MOV @PC+, PC`: the instruction fed to the CPU to load its program
/// counter from the next transmitted word.
const MOV_IMM_PC: u16 = 0x4030;
/// `JMP $`: parks the CPU on the spot so no program state advances while
/// halted.
const JMP_SELF: u16 = 0x3FFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TargetError {
    /// The target never acknowledged JTAG ownership.  There is no hardware
    /// timeout signal; this is only reported by the iteration-bounded
    /// acquire variant.
    #[error("target did not assert the JTAG sync flag within {0} polls")]
    SyncTimeout(usize),
    /// The instruction-fetch flag stayed clear for 8 TCLK cycles.  The
    /// JTAG connection is desynchronized; reinitialize the FSM and
    /// reacquire the device.
    #[error("instruction-fetch flag not set after 8 TCLK cycles; reacquire the device")]
    FetchDesync,
}

/// Control of one target CPU over an initialized [`JtagFsm`].
///
/// The expected call order is acquire, optionally instruction-fetch
/// synchronization and PC load, then halt before any memory access, and
/// release when done.  Calling [`read_mem`](Self::read_mem) or
/// [`write_mem`](Self::write_mem) on a CPU that is not halted yields
/// garbage; that precondition is documented, not checked.
pub struct Target<T> {
    pub fsm: JtagFsm<T>,
}

impl<T: SignalIo> Target<T> {
    /// Take control of an initialized FSM.
    pub fn new(fsm: JtagFsm<T>) -> Self {
        Self { fsm }
    }

    /// Select the control-signal register for capture after requesting
    /// JTAG control.
    fn request_control(&mut self) {
        self.fsm.ir_shift(IR_CNTRL_SIG_16BIT);
        self.fsm.dr_shift(CtrlSig::JTAG_CONTROL.bits());
        self.fsm.ir_shift(IR_CNTRL_SIG_CAPTURE);
    }

    fn synced(&mut self) -> bool {
        CtrlSig::from_bits_retain(self.fsm.dr_shift(0)).contains(CtrlSig::TCE)
    }

    /// Takes the target CPU under JTAG control and spins until the target
    /// acknowledges with the sync flag.  This wait is unbounded by design:
    /// no hardware timeout signal exists.  Callers needing a bounded wait
    /// use [`acquire_with_limit`](Self::acquire_with_limit).
    pub fn acquire(&mut self) {
        self.request_control();
        debug!("waiting for JTAG sync");
        let mut polls = 0usize;
        while !self.synced() {
            polls += 1;
        }
        debug!("target synced after {polls} polls");
    }

    /// [`acquire`](Self::acquire) with an iteration cap instead of the
    /// unbounded spin.
    pub fn acquire_with_limit(&mut self, max_polls: usize) -> Result<(), TargetError> {
        self.request_control();
        for _ in 0..max_polls {
            if self.synced() {
                return Ok(());
            }
        }
        warn!("no JTAG sync after {max_polls} polls");
        Err(TargetError::SyncTimeout(max_polls))
    }

    /// Brings the target CPU into the instruction-fetch state, in which it
    /// loads and executes instructions transmitted over JTAG as if they
    /// came from memory.  Steps TCLK up to 8 times waiting for the fetch
    /// flag; failure past that means the JTAG connection is lost and the
    /// device must be reacquired.
    pub fn set_instruction_fetch(&mut self) -> Result<(), TargetError> {
        self.fsm.ir_shift(IR_CNTRL_SIG_CAPTURE);
        for _ in 0..8 {
            let ctrl = CtrlSig::from_bits_retain(self.fsm.dr_shift(0));
            if ctrl.contains(CtrlSig::INSTR_LOAD) {
                return Ok(());
            }
            self.fsm.clr_tclk();
            self.fsm.set_tclk();
        }
        warn!("instruction-fetch flag never came up");
        Err(TargetError::FetchDesync)
    }

    /// Loads the target CPU's program counter by feeding it a
    /// `MOV #addr, PC` over the JTAG data path, then returns the low byte
    /// of the control register to JTAG.
    pub fn set_pc(&mut self, addr: u16) {
        self.fsm.ir_shift(IR_CNTRL_SIG_16BIT);
        self.fsm.dr_shift(CtrlSig::PC_LOAD.bits());
        self.fsm.ir_shift(IR_DATA_16BIT);
        self.fsm.dr_shift(MOV_IMM_PC);
        self.fsm.clr_tclk();
        self.fsm.set_tclk();
        self.fsm.dr_shift(addr);
        self.fsm.clr_tclk();
        self.fsm.set_tclk();
        self.fsm.ir_shift(IR_ADDR_CAPTURE); // deselect the data path
        self.fsm.clr_tclk();
        self.fsm.ir_shift(IR_CNTRL_SIG_16BIT);
        self.fsm.dr_shift(CtrlSig::JTAG_CONTROL.bits());
    }

    /// Sets the target CPU to a defined halt state, parked on a `JMP $`,
    /// so memory can be accessed.  Undo with
    /// [`release_cpu`](Self::release_cpu).
    pub fn halt(&mut self) {
        self.fsm.ir_shift(IR_DATA_16BIT);
        self.fsm.dr_shift(JMP_SELF);
        self.fsm.clr_tclk();
        self.fsm.ir_shift(IR_CNTRL_SIG_16BIT);
        self.fsm.dr_shift((CtrlSig::JTAG_CONTROL | CtrlSig::HALT_JTAG).bits());
        self.fsm.set_tclk();
    }

    /// Returns the target CPU to normal operation after
    /// [`halt`](Self::halt).
    pub fn release_cpu(&mut self) {
        self.fsm.clr_tclk();
        self.fsm.ir_shift(IR_CNTRL_SIG_16BIT);
        self.fsm.dr_shift(CtrlSig::JTAG_CONTROL.bits());
        self.fsm.ir_shift(IR_ADDR_CAPTURE);
        self.fsm.set_tclk();
    }

    /// Forces a power-up reset of the target while it stays under JTAG
    /// control, then resynchronizes the address path.
    pub fn execute_por(&mut self) {
        self.fsm.ir_shift(IR_CNTRL_SIG_16BIT);
        self.fsm.dr_shift(CtrlSig::APPLY_POR.bits());
        self.fsm.dr_shift(CtrlSig::JTAG_CONTROL.bits());
        self.fsm.clr_tclk();
        self.fsm.set_tclk();
        self.fsm.clr_tclk();
        self.fsm.set_tclk();
        self.fsm.clr_tclk();
        self.fsm.ir_shift(IR_ADDR_CAPTURE);
        self.fsm.set_tclk();
    }

    /// Releases the target CPU from JTAG control entirely.  The target
    /// resets and resumes autonomous execution from the address stored at
    /// the reset vector 0xFFFE.
    pub fn release(&mut self) {
        self.fsm.ir_shift(IR_CNTRL_SIG_16BIT);
        self.fsm.dr_shift(CtrlSig::APPLY_POR.bits());
        self.fsm.dr_shift(CtrlSig::JTAG_CONTROL.bits());
        self.fsm.ir_shift(IR_CNTRL_SIG_RELEASE);
        debug!("target released from JTAG control");
    }

    /// Reads one word from any memory location (peripherals, RAM, or
    /// flash).  The CPU must already be halted.
    pub fn read_mem(&mut self, addr: u16) -> u16 {
        self.fsm.clr_tclk();
        self.fsm.ir_shift(IR_CNTRL_SIG_16BIT);
        self.fsm.dr_shift(CtrlSig::WORD_READ.bits());
        self.fsm.ir_shift(IR_ADDR_16BIT);
        self.fsm.dr_shift(addr);
        self.fsm.ir_shift(IR_DATA_TO_ADDR);
        self.fsm.set_tclk();
        self.fsm.clr_tclk();
        self.fsm.dr_shift(0)
    }

    /// Writes one word to peripherals or RAM (not flash).  The CPU must
    /// already be halted.
    pub fn write_mem(&mut self, addr: u16, data: u16) {
        self.fsm.clr_tclk();
        self.fsm.ir_shift(IR_CNTRL_SIG_16BIT);
        self.fsm.dr_shift(CtrlSig::WORD_WRITE.bits());
        self.fsm.ir_shift(IR_ADDR_16BIT);
        self.fsm.dr_shift(addr);
        self.fsm.ir_shift(IR_DATA_TO_ADDR);
        self.fsm.dr_shift(data);
        self.fsm.set_tclk();
    }
}
