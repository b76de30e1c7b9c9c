//! Scoped interrupt suppression

use critical_section::RestoreState;

#[cfg(test)]
std::thread_local! {
    static DEPTH: core::cell::Cell<usize> = core::cell::Cell::new(0);
}

/// Zones currently open on this thread
#[cfg(test)]
pub fn depth() -> usize {
    DEPTH.with(|depth| depth.get())
}

/// Interrupts stay disabled for as long as this guard lives.
///
/// Dropping the guard restores whatever interrupt state was active when
/// it was entered, so nesting is fine.
pub struct InterruptFreeZone {
    restore: RestoreState,
}

impl InterruptFreeZone {
    #[inline]
    pub fn enter() -> Self {
        // Safety: the matching release happens in Drop, in LIFO order with
        // any other zone, because guards cannot outlive their scope.
        let restore = unsafe { critical_section::acquire() };
        #[cfg(test)]
        DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self { restore }
    }
}

impl Drop for InterruptFreeZone {
    #[inline]
    fn drop(&mut self) {
        #[cfg(test)]
        DEPTH.with(|depth| depth.set(depth.get() - 1));
        unsafe { critical_section::release(self.restore) }
    }
}
