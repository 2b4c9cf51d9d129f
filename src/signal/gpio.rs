//! Drive the six JTAG lines from `embedded-hal` GPIO pins.  The
//! pin-to-signal mapping is fixed by which concrete pin goes into which
//! constructor slot; TDO should be constructed with its pulldown enabled
//! where the HAL supports that.
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::signal::{Signal, SignalIo};

pub struct Gpio<Rst, Tms, Tck, Tdi, Tdo, Test, Delay>
where
    Rst: OutputPin,
    Tms: OutputPin,
    Tck: OutputPin,
    Tdi: OutputPin,
    Tdo: InputPin,
    Test: OutputPin,
    Delay: DelayNs,
{
    rst: Rst,
    tms: Tms,
    tck: Tck,
    tdi: Tdi,
    tdo: Tdo,
    test: Test,
    delay: Delay,
}

impl<Rst, Tms, Tck, Tdi, Tdo, Test, Delay> Gpio<Rst, Tms, Tck, Tdi, Tdo, Test, Delay>
where
    Rst: OutputPin,
    Tms: OutputPin,
    Tck: OutputPin,
    Tdi: OutputPin,
    Tdo: InputPin,
    Test: OutputPin,
    Delay: DelayNs,
{
    pub fn new(rst: Rst, tms: Tms, tck: Tck, tdi: Tdi, tdo: Tdo, test: Test, delay: Delay) -> Self {
        Gpio {
            rst,
            tms,
            tck,
            tdi,
            tdo,
            test,
            delay,
        }
    }
}

impl<Rst, Tms, Tck, Tdi, Tdo, Test, Delay> SignalIo for Gpio<Rst, Tms, Tck, Tdi, Tdo, Test, Delay>
where
    Rst: OutputPin,
    Tms: OutputPin,
    Tck: OutputPin,
    Tdi: OutputPin,
    Tdo: InputPin,
    Test: OutputPin,
    Delay: DelayNs,
{
    fn configure(&mut self) {
        self.rst.set_low().unwrap();
        self.tms.set_low().unwrap();
        self.tck.set_low().unwrap();
        self.tdi.set_low().unwrap();
        self.test.set_low().unwrap();
    }

    fn set(&mut self, sig: Signal, level: bool) {
        let state = PinState::from(level);
        match sig {
            Signal::Rst => self.rst.set_state(state).unwrap(),
            Signal::Tms => self.tms.set_state(state).unwrap(),
            Signal::Tck => self.tck.set_state(state).unwrap(),
            Signal::Tdi => self.tdi.set_state(state).unwrap(),
            Signal::Test => self.test.set_state(state).unwrap(),
            Signal::Tdo => {}
        }
    }

    fn get(&mut self, sig: Signal) -> bool {
        match sig {
            Signal::Tdo => self.tdo.is_high().unwrap(),
            // output lines are not readable through typed HAL pins
            _ => false,
        }
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}
