//! Tick counting shared between the clock source and the receive loop

use core::sync::atomic::{AtomicU8, Ordering};

/// Anything that can report the current tick count.
///
/// The count wraps at 256; callers only ever look at differences between
/// two readings, so they must sample more often than every 255 ticks.
pub trait TickSource {
    fn now(&mut self) -> u8;
}

/// Free-running tick counter.
///
/// Exactly one writer (the clock source) calls [`TickCounter::tick`]; any
/// number of readers call [`TickCounter::now`]. AVR only has 8-bit atomic
/// load/store, so the increment is a load followed by a store, which is
/// sound only because there is a single writer.
pub struct TickCounter {
    count: AtomicU8,
}

impl TickCounter {
    /// Create new counter starting at zero
    pub const fn new() -> Self {
        Self {
            count: AtomicU8::new(0),
        }
    }

    /// Advance by one tick (clock source side)
    #[inline]
    pub fn tick(&self) {
        let count = self.count.load(Ordering::Relaxed);
        self.count.store(count.wrapping_add(1), Ordering::Release);
    }

    /// Current tick count (reader side)
    #[inline]
    pub fn now(&self) -> u8 {
        self.count.load(Ordering::Acquire)
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for &TickCounter {
    fn now(&mut self) -> u8 {
        TickCounter::now(self)
    }
}

impl<T: TickSource + ?Sized> TickSource for &mut T {
    fn now(&mut self) -> u8 {
        (**self).now()
    }
}

/// Global tick counter
pub static TICKS: TickCounter = TickCounter::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_advances_and_wraps() {
        let counter = TickCounter::new();
        assert_eq!(counter.now(), 0);
        counter.tick();
        counter.tick();
        assert_eq!(counter.now(), 2);

        for _ in 0..254 {
            counter.tick();
        }
        assert_eq!(counter.now(), 0);
    }

    #[test]
    fn shared_reference_is_a_tick_source() {
        let counter = TickCounter::new();
        let mut source = &counter;
        counter.tick();
        assert_eq!(source.now(), 1);
    }
}
