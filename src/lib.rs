//! This crate provides debug access to MSP430-family targets over their
//! 4-wire JTAG port, at a few levels of abstraction.  At the lowest level,
//! the `signal` module drives the six logical lines (RST, TMS, TCK, TDI,
//! TDO, TEST) through whatever hardware is available: direct GPIO, an
//! FTDI adapter in bitbang mode, or a simulated target for tests.  The
//! `SignalIo` trait is the seam new adapters implement.
//!
//! On top of that, `fsm` tracks the TAP state machine and provides the two
//! fundamental shift primitives (`ir_shift`, `dr_shift`) plus control of
//! TCLK, the virtual CPU clock multiplexed onto TDI.  `control` speaks the
//! target-control protocol: acquiring the CPU, synchronizing instruction
//! fetch, loading the PC, halting, resetting, and reading and writing the
//! memory space one word at a time.
//!
//! The `isa` and `disasm` modules are a pure decoder for the 16-bit
//! MSP430 instruction set; `dump` ties everything together into hex-dump
//! and disassembly-listing flows over a pluggable text sink.
//!
//! # Example
//! ```
//! use msp430_jtag::control::Target;
//! use msp430_jtag::fsm::JtagFsm;
//! use msp430_jtag::signal::sim::SimTarget;
//!
//! let mut sim = SimTarget::new();
//! sim.load(0xC000, &[0x4031, 0x0400]);
//!
//! let mut fsm = JtagFsm::new(sim);
//! fsm.init().expect("no target answered");
//! let mut target = Target::new(fsm);
//! target.acquire();
//! target.halt();
//! assert_eq!(target.read_mem(0xC000), 0x4031);
//! target.release_cpu();
//! target.release();
//! ```

#![no_std]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod control;
pub mod disasm;
pub mod dump;
pub mod fsm;
pub mod isa;
pub mod signal;
