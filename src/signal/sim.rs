//! A software model of an MSP430 target, for exercising the driver without
//! hardware.  It answers on the same six lines a real target would: a TAP
//! walked by TMS/TCK, an instruction register that captures the JTAG ID on
//! every IR scan, the bypass/MAB/MDB/control-signal data registers, and
//! word transfers executed on TCLK edges while the TAP sits in
//! Run-Test/Idle.
//!
//! The model is behavioral, not cycle accurate: sync and instruction-fetch
//! flags come up after a fixed number of polls/steps, and the only CPU
//! execution modeled is the `MOV #addr, PC` load sequence the controller
//! feeds over the data path.
use alloc::collections::BTreeMap;

use crate::control::CtrlSig;
use crate::fsm::{
    TapState, IR_ADDR_16BIT, IR_ADDR_CAPTURE, IR_CNTRL_SIG_16BIT, IR_CNTRL_SIG_CAPTURE,
    IR_BYPASS, IR_CNTRL_SIG_RELEASE, IR_DATA_16BIT, IR_DATA_QUICK, IR_DATA_TO_ADDR, JTAG_ID,
};
use crate::signal::{Signal, SignalIo};

/// `MOV @PC+, PC`, as fed by the controller's PC-load sequence.
const MOV_IMM_PC: u16 = 0x4030;

/// Status captures until the sync flag reports set.
const SYNC_LATENCY: u32 = 2;
/// Full TCLK cycles until the instruction-fetch flag reports set.
const FETCH_LATENCY: u32 = 2;

pub struct SimTarget {
    // line levels as driven by the host
    rst: bool,
    test: bool,
    tck: bool,
    tms: bool,
    tdi: bool,
    tdo: bool,

    state: TapState,
    /// IR shift register.  TDO is bit 7; TDI enters at bit 0, so the
    /// latched instruction is the bit reverse of what accumulates here.
    ir_reg: u8,
    dr_reg: u16,
    bypass: bool,
    ir: u8,

    mab: u16,
    mdb: u16,
    ctrl: u16,
    sync_polls: u32,
    fetch_cycles: u32,
    pc: u16,
    pc_load_armed: bool,
    released: bool,
    mem: BTreeMap<u16, u16>,
}

impl SimTarget {
    pub fn new() -> Self {
        Self {
            rst: false,
            test: false,
            tck: false,
            tms: false,
            tdi: false,
            tdo: false,
            state: TapState::Reset,
            ir_reg: 0,
            dr_reg: 0,
            bypass: false,
            // out of reset the IR holds bypass, as on the real part
            ir: IR_BYPASS,
            mab: 0,
            mdb: 0,
            ctrl: 0,
            sync_polls: SYNC_LATENCY,
            fetch_cycles: FETCH_LATENCY,
            pc: 0,
            pc_load_armed: false,
            released: false,
            mem: BTreeMap::new(),
        }
    }

    /// Preload target memory, one word per address step of 2.
    pub fn load(&mut self, addr: u16, words: &[u16]) {
        for (i, w) in words.iter().enumerate() {
            self.mem.insert((addr & !1).wrapping_add(2 * i as u16), *w);
        }
    }

    /// Read target memory directly, bypassing JTAG.  Unprogrammed
    /// locations read as erased flash.
    pub fn peek(&self, addr: u16) -> u16 {
        self.mem.get(&(addr & !1)).copied().unwrap_or(0xFFFF)
    }

    /// The modeled CPU program counter.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// True once `IR_CNTRL_SIG_RELEASE` has been executed.
    pub fn released(&self) -> bool {
        self.released
    }

    /// Override how many status captures pass before the sync flag reports
    /// set.  `u32::MAX` models a target that never synchronizes.
    pub fn set_sync_latency(&mut self, polls: u32) {
        self.sync_polls = polls;
    }

    fn enabled(&self) -> bool {
        self.rst && self.test
    }

    fn status(&mut self) -> u16 {
        let mut s = self.ctrl;
        if self.ctrl & CtrlSig::TCE1.bits() != 0 {
            if self.sync_polls > 0 {
                self.sync_polls -= 1;
                s &= !CtrlSig::TCE.bits();
            } else {
                s |= CtrlSig::TCE.bits();
            }
        }
        if self.fetch_cycles == 0 {
            s |= CtrlSig::INSTR_LOAD.bits();
        } else {
            s &= !CtrlSig::INSTR_LOAD.bits();
        }
        s
    }

    fn dr_capture(&mut self) {
        match self.ir {
            IR_ADDR_16BIT | IR_ADDR_CAPTURE => self.dr_reg = self.mab,
            IR_DATA_TO_ADDR | IR_DATA_16BIT | IR_DATA_QUICK => self.dr_reg = self.mdb,
            IR_CNTRL_SIG_16BIT | IR_CNTRL_SIG_CAPTURE => self.dr_reg = self.status(),
            // the bypass register captures zero
            _ => self.bypass = false,
        }
    }

    fn dr_shift_edge(&mut self) {
        match self.ir {
            IR_ADDR_16BIT | IR_ADDR_CAPTURE | IR_DATA_TO_ADDR | IR_DATA_16BIT | IR_DATA_QUICK
            | IR_CNTRL_SIG_16BIT | IR_CNTRL_SIG_CAPTURE => {
                self.tdo = self.dr_reg & 0x8000 != 0;
                self.dr_reg = self.dr_reg << 1 | self.tdi as u16;
            }
            _ => {
                self.tdo = self.bypass;
                self.bypass = self.tdi;
            }
        }
    }

    fn dr_update(&mut self) {
        match self.ir {
            IR_ADDR_16BIT => self.mab = self.dr_reg,
            IR_DATA_TO_ADDR | IR_DATA_16BIT | IR_DATA_QUICK => self.mdb = self.dr_reg,
            IR_CNTRL_SIG_16BIT => {
                self.ctrl = self.dr_reg;
                if self.ctrl & CtrlSig::POR.bits() != 0 {
                    self.pc = self.peek(0xFFFE);
                    self.fetch_cycles = FETCH_LATENCY;
                }
            }
            _ => {}
        }
    }

    fn ir_update(&mut self) {
        self.ir = self.ir_reg.reverse_bits();
        if self.ir == IR_CNTRL_SIG_RELEASE {
            self.released = true;
            self.ctrl = 0;
            self.sync_polls = SYNC_LATENCY;
            self.fetch_cycles = FETCH_LATENCY;
        }
    }

    fn clock_tck(&mut self) {
        // Shifting belongs to the state the edge leaves; the bit clocked
        // out on the way into Exit1 still counts.
        match self.state {
            TapState::ShiftIr => {
                self.tdo = self.ir_reg & 0x80 != 0;
                self.ir_reg = self.ir_reg << 1 | self.tdi as u8;
            }
            TapState::ShiftDr => self.dr_shift_edge(),
            _ => {}
        }
        self.state = self.state.next(self.tms);
        match self.state {
            TapState::CaptureIr => self.ir_reg = JTAG_ID,
            TapState::CaptureDr => self.dr_capture(),
            TapState::UpdateIr => self.ir_update(),
            TapState::UpdateDr => self.dr_update(),
            _ => {}
        }
    }

    /// A TCLK edge: TDI moved while the TAP sat in Run-Test/Idle.  Word
    /// transfers commit on the rising edge (writes) and falling edge
    /// (reads), matching the order the controller sequences them in.
    fn tclk_edge(&mut self, rising: bool) {
        let ctrl = CtrlSig::from_bits_retain(self.ctrl);
        if !ctrl.contains(CtrlSig::TCE1) {
            return;
        }
        if rising {
            if self.fetch_cycles > 0 {
                self.fetch_cycles -= 1;
            }
            if self.ir == IR_DATA_16BIT {
                if self.mdb == MOV_IMM_PC {
                    self.pc_load_armed = true;
                } else if self.pc_load_armed {
                    self.pc = self.mdb;
                    self.pc_load_armed = false;
                }
            }
            if self.ir == IR_DATA_TO_ADDR
                && ctrl.contains(CtrlSig::HALT_JTAG)
                && !ctrl.contains(CtrlSig::RW)
            {
                self.mem.insert(self.mab & !1, self.mdb);
            }
        } else if self.ir == IR_DATA_TO_ADDR
            && ctrl.contains(CtrlSig::HALT_JTAG)
            && ctrl.contains(CtrlSig::RW)
        {
            self.mdb = self.peek(self.mab);
        }
    }
}

impl Default for SimTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalIo for SimTarget {
    fn configure(&mut self) {
        self.rst = false;
        self.test = false;
        self.tck = false;
        self.tms = false;
        self.tdi = false;
        self.tdo = false;
    }

    fn set(&mut self, sig: Signal, level: bool) {
        match sig {
            Signal::Tck => {
                let rising = level && !self.tck;
                self.tck = level;
                if rising && self.enabled() {
                    self.clock_tck();
                }
            }
            Signal::Tdi => {
                let was = self.tdi;
                self.tdi = level;
                if self.enabled() && self.state == TapState::Idle && level != was {
                    self.tclk_edge(level);
                }
            }
            Signal::Tms => self.tms = level,
            Signal::Rst => self.rst = level,
            Signal::Test => self.test = level,
            Signal::Tdo => {}
        }
    }

    fn get(&mut self, sig: Signal) -> bool {
        match sig {
            Signal::Tdo => self.tdo,
            Signal::Rst => self.rst,
            Signal::Tms => self.tms,
            Signal::Tck => self.tck,
            Signal::Tdi => self.tdi,
            Signal::Test => self.test,
        }
    }

    fn delay_us(&mut self, _us: u32) {}
}
