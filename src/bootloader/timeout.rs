use crate::clock::TickSource;
use crate::logger::TimeoutCause;

/// Bounds the receive loop.
///
/// Tracks ticks since the last packet and, optionally, ticks since the
/// guard was armed. Must be polled at least once every 255 ticks.
pub struct TimeoutGuard<T> {
    ticks: T,
    last: u8,
    idle: u8,
    elapsed: u16,
    inactivity: u8,
    limit: Option<u16>,
}

impl<T: TickSource> TimeoutGuard<T> {
    pub fn new(mut ticks: T, inactivity: u8, limit: Option<u16>) -> Self {
        let last = ticks.now();
        Self {
            ticks,
            last,
            idle: 0,
            elapsed: 0,
            inactivity,
            limit,
        }
    }

    fn advance(&mut self) {
        let now = self.ticks.now();
        let delta = now.wrapping_sub(self.last);
        self.last = now;
        self.idle = self.idle.saturating_add(delta);
        self.elapsed = self.elapsed.saturating_add(delta as u16);
    }

    /// A packet arrived
    pub fn activity(&mut self) {
        self.advance();
        self.idle = 0;
    }

    /// `Some` once the loop has to stop
    pub fn expired(&mut self) -> Option<TimeoutCause> {
        self.advance();
        if let Some(limit) = self.limit {
            if self.elapsed >= limit {
                return Some(TimeoutCause::SessionLimit);
            }
        }
        if self.idle >= self.inactivity {
            return Some(TimeoutCause::Inactivity);
        }
        None
    }

    pub fn idle(&self) -> u8 {
        self.idle
    }

    pub fn elapsed(&self) -> u16 {
        self.elapsed
    }

    pub fn release(self) -> T {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TickCounter;

    fn advance(counter: &TickCounter, ticks: u16) {
        for _ in 0..ticks {
            counter.tick();
        }
    }

    #[test]
    fn inactivity_window() {
        let counter = TickCounter::new();
        let mut guard = TimeoutGuard::new(&counter, 10, None);

        advance(&counter, 9);
        assert_eq!(guard.expired(), None);
        advance(&counter, 1);
        assert_eq!(guard.expired(), Some(TimeoutCause::Inactivity));
    }

    #[test]
    fn activity_resets_idle_count() {
        let counter = TickCounter::new();
        let mut guard = TimeoutGuard::new(&counter, 10, None);

        for _ in 0..5 {
            advance(&counter, 8);
            assert_eq!(guard.expired(), None);
            guard.activity();
            assert_eq!(guard.idle(), 0);
        }
        assert_eq!(guard.elapsed(), 40);
    }

    #[test]
    fn session_limit_overrides_activity() {
        let counter = TickCounter::new();
        let mut guard = TimeoutGuard::new(&counter, 10, Some(300));

        for _ in 0..37 {
            advance(&counter, 8);
            guard.activity();
            assert_eq!(guard.expired(), None);
        }
        advance(&counter, 4);
        assert_eq!(guard.expired(), Some(TimeoutCause::SessionLimit));
    }

    #[test]
    fn counter_wrap_is_harmless() {
        let counter = TickCounter::new();
        advance(&counter, 250);
        let mut guard = TimeoutGuard::new(&counter, 10, None);

        advance(&counter, 8);
        assert_eq!(guard.expired(), None);
        advance(&counter, 2);
        assert_eq!(guard.expired(), Some(TimeoutCause::Inactivity));
    }
}
