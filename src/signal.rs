//! Implementations for different ways of driving the six JTAG lines live here.
//! Hardware adapters should implement the `SignalIo` trait.
pub mod gpio;
#[cfg(feature = "std")]
pub mod ft232r;
pub mod sim;

/// The six logical lines of the MSP430 4-wire JTAG port.  Names are as seen
/// in the interface reference, viewed from the target's perspective: TDI is
/// data *into* the target and doubles as the TCLK input, TDO is data out of
/// the target, RST and TEST select the JTAG entry mode on parts that share
/// the JTAG pins with GPIO.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Signal {
    Rst,
    Tms,
    Tck,
    Tdi,
    Tdo,
    Test,
}

pub trait SignalIo {
    /// Put all six lines into their defined roles: RST, TMS, TCK, TDI and
    /// TEST driven low, TDO an input with a pulldown.  Called once before
    /// the JTAG entry sequence.
    fn configure(&mut self);
    /// Drive `sig` high or low.  Only meaningful for the five output lines.
    fn set(&mut self, sig: Signal, level: bool);
    /// Sample `sig`.  Only TDO is guaranteed to be readable.
    fn get(&mut self, sig: Signal) -> bool;
    /// Hold for at least `us` microseconds.  The fuse check requires a TMS
    /// low phase of 5us or more; everything else has no minimum timing.
    fn delay_us(&mut self, us: u32);
}

/// Which bit of an 8-bit bitbang word each signal is wired to.  The driver
/// never assumes a fixed pin numbering; adapters that multiplex all six
/// lines onto one port take one of these at construction time.
#[derive(Clone, Copy, Debug)]
pub struct PinMap {
    pub rst: u8,
    pub tms: u8,
    pub tck: u8,
    pub tdi: u8,
    pub tdo: u8,
    pub test: u8,
}

impl PinMap {
    pub fn bit(&self, sig: Signal) -> u8 {
        match sig {
            Signal::Rst => self.rst,
            Signal::Tms => self.tms,
            Signal::Tck => self.tck,
            Signal::Tdi => self.tdi,
            Signal::Tdo => self.tdo,
            Signal::Test => self.test,
        }
    }

    /// Mask of the five driven lines, for adapters that configure output
    /// direction as a bitmask.
    pub fn output_mask(&self) -> u8 {
        1 << self.rst | 1 << self.tms | 1 << self.tck | 1 << self.tdi | 1 << self.test
    }
}
