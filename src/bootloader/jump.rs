//! Leaving the bootloader

use super::Outcome;
use crate::hal::NonVolatile;

/// Where control goes when no transfer completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Start whatever entry the EEPROM slot holds
    PersistedEntry,
    /// Jump to a fixed word address
    Fixed(u16),
    /// Stay in the bootloader until the next reset
    Halt,
}

/// Final control transfer, addresses are word addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootTarget {
    Jump(u16),
    Halt,
}

/// Decide where to go; reads the entry slot at most once.
pub fn exit_target<S: NonVolatile>(
    outcome: &Outcome,
    policy: TimeoutPolicy,
    store: &mut S,
    slot: u16,
) -> BootTarget {
    match (outcome, policy) {
        (Outcome::Complete(_), _) | (Outcome::TimedOut(_), TimeoutPolicy::PersistedEntry) => {
            BootTarget::Jump(store.read_word(slot))
        }
        (Outcome::TimedOut(_), TimeoutPolicy::Fixed(address)) => BootTarget::Jump(address),
        (Outcome::TimedOut(_), TimeoutPolicy::Halt) => BootTarget::Halt,
    }
}

/// Transfer control for good.
///
/// # Safety
/// Interrupts must be disabled and every peripheral the bootloader used
/// returned to its reset state.
#[cfg(target_arch = "avr")]
pub unsafe fn launch(target: BootTarget) -> ! {
    match target {
        BootTarget::Jump(address) => core::arch::asm!(
            "ijmp",
            in("Z") address,
            options(noreturn)
        ),
        #[allow(clippy::empty_loop)]
        BootTarget::Halt => loop {},
    }
}
