//! Radio firmware update session
//!
//! `Idle` waits for a start packet, `Receiving` streams payload into flash
//! page by page, and the session ends either `Complete` (declared length
//! consumed) or `TimedOut`. The first payload chunk has its reset vector
//! captured into EEPROM and redirected to the bootloader before the first
//! page is programmed.

pub mod flash_writer;
pub mod jump;
pub mod page;
pub mod timeout;
pub mod vector;


pub use flash_writer::FlashWriter;
pub use jump::{exit_target, BootTarget, TimeoutPolicy};
#[cfg(target_arch = "avr")]
pub use jump::launch;
pub use page::PageAssembler;
pub use timeout::TimeoutGuard;
pub use vector::VectorPatcher;

use crate::clock::TickSource;
use crate::config::{APP_BASE_ADDRESS, BOOTLOADER_ADDRESS, ENTRY_VECTOR_SLOT, PACKET_SIZE};
use crate::hal::{NonVolatile, PageProgram};
use crate::logger::{Event, Log, TimeoutCause};
use crate::protocol::{Packet, PacketLink, Receiver};
use embedded_hal::digital::v2::OutputPin;
use ufmt::uWrite;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Receiving,
    Complete,
    TimedOut,
}

/// What the current (or last) session did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    /// Length announced by the start packet
    pub declared: u16,
    /// Payload bytes handed to the page assembler
    pub bytes_written: u16,
    pub pages_committed: u16,
    /// Entry persisted by the vector patch, if it happened
    pub entry: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Complete(SessionStats),
    TimedOut(TimeoutCause),
}

pub struct Bootloader<P, S, I> {
    state: State,
    remaining: u16,
    stats: SessionStats,
    assembler: PageAssembler,
    writer: FlashWriter<P>,
    patcher: VectorPatcher,
    store: S,
    indicator: I,
}

impl<P, S, I> Bootloader<P, S, I>
where
    P: PageProgram,
    S: NonVolatile,
    I: OutputPin,
{
    pub fn new(programmer: P, store: S, indicator: I) -> Self {
        Self {
            state: State::Idle,
            remaining: 0,
            stats: SessionStats::default(),
            assembler: PageAssembler::new(),
            writer: FlashWriter::new(programmer),
            patcher: VectorPatcher::new(BOOTLOADER_ADDRESS, ENTRY_VECTOR_SLOT),
            store,
            indicator,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Feed one packet through the state machine
    pub fn handle_packet<W: uWrite>(&mut self, packet: &Packet, log: &mut Log<W>) -> State {
        match self.state {
            State::Idle => {
                if let Some(length) = packet.start_length() {
                    self.begin(length, log);
                }
            }
            State::Receiving => self.consume(packet.payload(), log),
            State::Complete | State::TimedOut => {}
        }
        self.state
    }

    /// The timeout guard fired; a finished session stays finished
    pub fn time_out<W: uWrite>(&mut self, cause: TimeoutCause, log: &mut Log<W>) {
        if self.state == State::Complete {
            return;
        }
        self.state = State::TimedOut;
        self.indicator.set_low().ok();
        log.event(Event::TimedOut(cause));
    }

    /// Receive until the transfer completes or the guard expires
    pub fn run<L, T, W>(
        &mut self,
        receiver: &mut Receiver<L>,
        guard: &mut TimeoutGuard<T>,
        log: &mut Log<W>,
    ) -> Outcome
    where
        L: PacketLink,
        T: TickSource,
        W: uWrite,
    {
        log.event(Event::Listening);
        loop {
            if let Some(cause) = guard.expired() {
                self.time_out(cause, log);
                return Outcome::TimedOut(cause);
            }

            match receiver.poll() {
                Ok(packet) => {
                    guard.activity();
                    if self.handle_packet(&packet, log) == State::Complete {
                        return Outcome::Complete(self.stats);
                    }
                }
                Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(_)) => log.event(Event::TransportFault),
            }
        }
    }

    /// Where to go after `outcome`
    pub fn exit_target(&mut self, outcome: &Outcome, policy: TimeoutPolicy) -> BootTarget {
        exit_target(outcome, policy, &mut self.store, ENTRY_VECTOR_SLOT)
    }

    pub fn indicator_mut(&mut self) -> &mut I {
        &mut self.indicator
    }

    pub fn release(self) -> (P, S, I) {
        (self.writer.release(), self.store, self.indicator)
    }

    fn begin<W: uWrite>(&mut self, length: u16, log: &mut Log<W>) {
        self.stats = SessionStats {
            declared: length,
            ..SessionStats::default()
        };
        self.remaining = length;
        self.assembler.arm(APP_BASE_ADDRESS);
        self.state = State::Receiving;
        self.indicator.set_high().ok();
        log.event(Event::SessionStarted { length });

        if length == 0 {
            self.finish(log);
        }
    }

    fn consume<W: uWrite>(&mut self, payload: &[u8; PACKET_SIZE], log: &mut Log<W>) {
        let first_chunk = self.stats.bytes_written == 0;
        let take = (self.remaining as usize).min(PACKET_SIZE);

        let fed = self.assembler.feed(&payload[..take]) as u16;
        self.remaining -= fed;
        self.stats.bytes_written += fed;

        if first_chunk {
            let entry = self
                .patcher
                .patch(self.assembler.first_chunk_mut(), &mut self.store);
            self.stats.entry = Some(entry);
            log.event(Event::EntryCaptured { entry });
        }

        let complete = self.remaining == 0;
        if self.assembler.should_flush(complete) {
            let address = self.assembler.flush(&mut self.writer);
            self.stats.pages_committed += 1;
            log.event(Event::PageCommitted { address });
        }

        if complete {
            self.finish(log);
        }
    }

    fn finish<W: uWrite>(&mut self, log: &mut Log<W>) {
        self.state = State::Complete;
        self.indicator.set_low().ok();
        log.event(Event::TransferComplete {
            bytes: self.stats.bytes_written,
        });
    }
}
