//! Over-the-air firmware updates for an ATtiny84 with an nRF24L01 radio.
//!
//! The bootloader listens for a short while after reset. A start packet
//! announces the image length, the payload that follows is programmed into
//! flash from address zero, and the application's reset vector is
//! redirected through the bootloader with the real entry kept in EEPROM.
//! When nothing arrives, control goes straight to that stored entry.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

pub mod bootloader;
pub mod clock;
pub mod config;
pub mod drivers;
pub mod hal;
pub mod logger;
pub mod protocol;

#[cfg(test)]
mod testing;
