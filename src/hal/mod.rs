//! Hardware capabilities used by the bootloader core.
//!
//! The core only sees the traits below plus `embedded_hal` pins; the AVR
//! implementations live in the submodules and are compiled for the target
//! only.

pub mod interrupt;

#[cfg(target_arch = "avr")]
pub mod eeprom;
#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(all(target_arch = "avr", feature = "debug"))]
pub mod soft_tx;
#[cfg(target_arch = "avr")]
pub mod spm;
#[cfg(target_arch = "avr")]
pub mod timer;
#[cfg(target_arch = "avr")]
pub mod usi;

pub use interrupt::InterruptFreeZone;

#[cfg(target_arch = "avr")]
pub use eeprom::Eeprom;
#[cfg(target_arch = "avr")]
pub use gpio::{board, Output, Pin};
#[cfg(target_arch = "avr")]
pub use spm::SelfProgramming;
#[cfg(target_arch = "avr")]
pub use timer::{delay_ticks, Timer0Ticks};
#[cfg(target_arch = "avr")]
pub use usi::Usi;

/// Self-programmable program memory, one SPM page at a time.
///
/// Addresses are byte addresses. None of these operations wait for the
/// hardware; callers poll [`PageProgram::is_busy`].
pub trait PageProgram {
    /// Erase the page containing `address`
    fn erase_page(&mut self, address: u16);

    /// Load one word into the temporary page buffer
    fn fill_word(&mut self, address: u16, word: u16);

    /// Commit the temporary page buffer to the page containing `address`
    fn write_page(&mut self, address: u16);

    /// Give read access back to the section that was just programmed
    fn enable_rww(&mut self);

    /// True while a self-programming (or EEPROM) operation is running
    fn is_busy(&mut self) -> bool;
}

/// Word-addressable non-volatile storage outside program memory
pub trait NonVolatile {
    fn read_word(&mut self, offset: u16) -> u16;

    /// Store `value` at `offset`. Must not be observable half-written by
    /// the caller.
    fn write_word(&mut self, offset: u16, value: u16);
}
