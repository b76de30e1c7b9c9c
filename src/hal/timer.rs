use crate::clock::{TickCounter, TickSource};
use crate::config::TIMER0_COMPARE;
use avr_device::attiny84::TC0;

// TCCR0A: WGM01 (CTC)
const TCCR0A_CTC: u8 = 1 << 1;
// TCCR0B: CS02 | CS00 (clk/1024)
const TCCR0B_DIV1024: u8 = (1 << 2) | (1 << 0);
// TIFR0: OCF0A
const OCF0A: u8 = 1 << 1;

/// Timer0 in CTC mode as the bootloader's clock source.
///
/// Interrupts are never enabled while the bootloader runs (the vector
/// table at 0x0000 belongs to the application), so the compare flag is
/// polled and each match advances the shared counter.
pub struct Timer0Ticks<'a> {
    counter: &'a TickCounter,
}

impl<'a> Timer0Ticks<'a> {
    pub fn start(counter: &'a TickCounter) -> Self {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0b.write(|w| w.bits(0));
            (*p).tcnt0.write(|w| w.bits(0));
            (*p).ocr0a.write(|w| w.bits(TIMER0_COMPARE));
            (*p).timsk0.write(|w| w.bits(0));
            // Flags clear by writing one
            (*p).tifr0.write(|w| w.bits(OCF0A));
            (*p).tccr0a.write(|w| w.bits(TCCR0A_CTC));
            (*p).tccr0b.write(|w| w.bits(TCCR0B_DIV1024));
        }
        Self { counter }
    }

    /// Stop the timer and hand its registers back in reset state
    pub fn stop(self) {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0b.write(|w| w.bits(0));
            (*p).tccr0a.write(|w| w.bits(0));
            (*p).ocr0a.write(|w| w.bits(0));
            (*p).tcnt0.write(|w| w.bits(0));
            (*p).tifr0.write(|w| w.bits(OCF0A));
        }
    }

    fn poll(&self) {
        unsafe {
            let p = TC0::ptr();
            if (*p).tifr0.read().bits() & OCF0A != 0 {
                (*p).tifr0.write(|w| w.bits(OCF0A));
                self.counter.tick();
            }
        }
    }
}

impl TickSource for Timer0Ticks<'_> {
    fn now(&mut self) -> u8 {
        self.poll();
        self.counter.now()
    }
}

/// Busy-wait for at least `ticks` whole ticks
pub fn delay_ticks(clock: &mut Timer0Ticks<'_>, ticks: u8) {
    let start = clock.now();
    // The first edge may arrive right away, so wait one extra
    let wait = ticks.saturating_add(1);
    while clock.now().wrapping_sub(start) < wait {}
}
