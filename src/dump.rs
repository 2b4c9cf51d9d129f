//! Host-side reporting: hex dumps of target memory and sequential
//! disassembly listings, written to a pluggable text sink.  Both flows
//! expect the target to be acquired and halted already.
use alloc::format;
use alloc::string::String;
use log::info;

use crate::control::Target;
use crate::disasm;
use crate::signal::SignalIo;

/// Anywhere text can go: a UART backchannel, a display, stdout, or a
/// plain `String`.  No framing beyond the literal text.
pub trait TextSink {
    fn write(&mut self, text: &str);
}

impl TextSink for String {
    fn write(&mut self, text: &str) {
        self.push_str(text);
    }
}

/// Adapter for any [`std::io::Write`] destination.  Write errors are
/// dropped; a sink has nowhere to report them.
#[cfg(feature = "std")]
pub struct WriteSink<W: std::io::Write>(pub W);

#[cfg(feature = "std")]
impl<W: std::io::Write> TextSink for WriteSink<W> {
    fn write(&mut self, text: &str) {
        let _ = self.0.write_all(text.as_bytes());
    }
}

/// Hex-dump the words in `[start, stop)`, eight per line with a leading
/// address.  Addresses are rounded down to word boundaries.
pub fn dump_words<T: SignalIo, S: TextSink>(
    target: &mut Target<T>,
    sink: &mut S,
    start: u16,
    stop: u16,
) {
    info!("dumping 0x{start:04X}..0x{stop:04X}");
    let mut addr = start & !1;
    let mut col = 0;
    while addr < stop {
        if col == 0 {
            sink.write(&format!("0x{addr:04X}:"));
        }
        sink.write(&format!(" 0x{:04X}", target.read_mem(addr)));
        col += 1;
        if col == 8 {
            sink.write("\n");
            col = 0;
        }
        addr = addr.wrapping_add(2);
        if addr == 0 {
            break; // ran off the top of the address space
        }
    }
    if col != 0 {
        sink.write("\n");
    }
}

/// Disassemble the instruction stream in `[start, stop)`, one line per
/// instruction.  The decode window reads up to two words past `stop`;
/// undecodable words come out as `ERROR` lines and the stream picks back
/// up on the following word.
pub fn disassemble<T: SignalIo, S: TextSink>(
    target: &mut Target<T>,
    sink: &mut S,
    start: u16,
    stop: u16,
) {
    info!("disassembling 0x{start:04X}..0x{stop:04X}");
    let mut addr = start & !1;
    while addr < stop {
        let code = [
            target.read_mem(addr),
            target.read_mem(addr.wrapping_add(2)),
            target.read_mem(addr.wrapping_add(4)),
        ];
        let decoded = disasm::next_instruction(&code, addr);
        sink.write(&format!("0x{addr:04X}  {}\n", decoded.text));
        if decoded.next_addr <= addr {
            break; // ran off the top of the address space
        }
        addr = decoded.next_addr;
    }
}
