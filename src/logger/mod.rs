//! Bootloader event logging
//!
//! Events are rendered with `ufmt` into whatever sink the board provides.
//! Release builds use [`Discard`]; the `debug` feature swaps in the soft
//! UART. A failing sink never stops the bootloader.

use core::convert::Infallible;
use ufmt::{uDisplay, uWrite, uwrite, uwriteln, Formatter};

/// Why the receive loop gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutCause {
    /// No packet within the inactivity window
    Inactivity,
    /// Absolute session ceiling reached
    SessionLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Listening,
    SessionStarted { length: u16 },
    EntryCaptured { entry: u16 },
    PageCommitted { address: u16 },
    TransferComplete { bytes: u16 },
    TimedOut(TimeoutCause),
    TransportFault,
    Jump { address: u16 },
    Halt,
}

/// `0x`-prefixed, zero-padded hex word
pub struct Hex(pub u16);

impl uDisplay for Hex {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        const HEX_CHARS: [u8; 16] = *b"0123456789ABCDEF";
        let mut digits = [b'0', b'x', 0, 0, 0, 0];
        for i in 0..4 {
            let nibble = (self.0 >> (12 - 4 * i)) & 0xF;
            digits[2 + i] = HEX_CHARS[nibble as usize];
        }
        // Only ASCII went in
        f.write_str(core::str::from_utf8(&digits).unwrap_or("0x????"))
    }
}

impl uDisplay for TimeoutCause {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            TimeoutCause::Inactivity => f.write_str("inactivity"),
            TimeoutCause::SessionLimit => f.write_str("session limit"),
        }
    }
}

impl uDisplay for Event {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match *self {
            Event::Listening => f.write_str("listening"),
            Event::SessionStarted { length } => uwrite!(f, "start len={}", length),
            Event::EntryCaptured { entry } => uwrite!(f, "entry {}", Hex(entry)),
            Event::PageCommitted { address } => uwrite!(f, "page {}", Hex(address)),
            Event::TransferComplete { bytes } => uwrite!(f, "complete {}B", bytes),
            Event::TimedOut(cause) => uwrite!(f, "timeout ({})", cause),
            Event::TransportFault => f.write_str("transport fault"),
            Event::Jump { address } => uwrite!(f, "jump {}", Hex(address)),
            Event::Halt => f.write_str("halt"),
        }
    }
}

/// Line-oriented event log
pub struct Log<W> {
    sink: W,
}

impl<W: uWrite> Log<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn event(&mut self, event: Event) {
        uwriteln!(self.sink, "[boot] {}", event).ok();
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Sink that drops everything
pub struct Discard;

impl uWrite for Discard {
    type Error = Infallible;

    fn write_str(&mut self, _: &str) -> Result<(), Infallible> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(event: Event) -> String {
        let mut log = Log::new(String::new());
        log.event(event);
        log.into_inner()
    }

    #[test]
    fn events_render_one_line_each() {
        assert_eq!(render(Event::SessionStarted { length: 64 }), "[boot] start len=64\n");
        assert_eq!(render(Event::EntryCaptured { entry: 0x0102 }), "[boot] entry 0x0102\n");
        assert_eq!(render(Event::PageCommitted { address: 0x03C0 }), "[boot] page 0x03C0\n");
        assert_eq!(
            render(Event::TimedOut(TimeoutCause::SessionLimit)),
            "[boot] timeout (session limit)\n"
        );
        assert_eq!(render(Event::Jump { address: 0xFFFF }), "[boot] jump 0xFFFF\n");
    }

    #[test]
    fn discard_accepts_everything() {
        let mut log = Log::new(Discard);
        log.event(Event::Listening);
        log.event(Event::TransportFault);
    }
}
