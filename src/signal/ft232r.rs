//! Drive the six JTAG lines from an FTDI FT232R-class adapter in
//! synchronous bitbang mode.  Every `set` writes one bitbang byte and
//! every `get` samples one, so this is slow but needs nothing beyond the
//! stock D2XX driver.
use crate::signal::{PinMap, Signal, SignalIo};

use libftd2xx::{BitMode, Ftdi, FtdiCommon};

pub struct Ft232r {
    ft: Ftdi,
    pins: PinMap,
    shadow: u8,
}

impl Ft232r {
    /// Open the adapter matching `description` (the value passed to
    /// `Ftdi::with_description`) and map the six signals onto the bitbang
    /// byte as `pins` says.
    pub fn new(description: &str, baud: u32, pins: PinMap) -> Self {
        let mut ft = Ftdi::with_description(description).expect("new");
        ft.set_baud_rate(baud).expect("set_baud_rate");
        ft.set_bit_mode(pins.output_mask(), BitMode::SyncBitbang)
            .expect("set bit mode");
        ft.purge_all().expect("purge");

        Self {
            ft,
            pins,
            shadow: 0,
        }
    }

    /// Clock the shadow byte out and read the pin states back; sync
    /// bitbang returns one sample per byte written.
    fn exchange(&mut self) -> u8 {
        let mut recv = [0_u8; 1];
        self.ft.write(&[self.shadow]).expect("send");
        self.ft.read(&mut recv).expect("recv");
        recv[0]
    }
}

impl SignalIo for Ft232r {
    fn configure(&mut self) {
        self.shadow = 0;
        self.ft
            .set_bit_mode(self.pins.output_mask(), BitMode::SyncBitbang)
            .expect("set bit mode");
        self.exchange();
    }

    fn set(&mut self, sig: Signal, level: bool) {
        let bit = 1 << self.pins.bit(sig);
        if level {
            self.shadow |= bit;
        } else {
            self.shadow &= !bit;
        }
        self.exchange();
    }

    fn get(&mut self, sig: Signal) -> bool {
        self.exchange() & (1 << self.pins.bit(sig)) != 0
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(u64::from(us)));
    }
}
