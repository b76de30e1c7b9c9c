//! USI (Universal Serial Interface) as a three-wire SPI master
//!
//! ATtiny84 has no SPI peripheral; the USI shift register is clocked by
//! software strobes instead.

use avr_device::attiny84::{PORTA, USI};
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::spi::FullDuplex;

// USICR bits
const USIWM0: u8 = 1 << 4;
const USICS1: u8 = 1 << 3;
const USICLK: u8 = 1 << 1;
const USITC: u8 = 1 << 0;

// USISR: USIOIF
const USIOIF: u8 = 1 << 6;

// PORTA: USCK, DO outputs, DI input
const USCK: u8 = 4;
const DO: u8 = 5;
const DI: u8 = 6;

/// USI peripheral driver, SPI mode 0, MSB first
pub struct Usi {
    _usi: PhantomData<USI>,
}

impl Usi {
    /// Create new USI instance
    pub fn new() -> Self {
        unsafe {
            let port = PORTA::ptr();
            (*port).ddra.modify(|r, w| {
                w.bits((r.bits() | (1 << USCK) | (1 << DO)) & !(1 << DI))
            });

            // Three-wire mode, software clock strobe
            (*USI::ptr()).usicr.write(|w| w.bits(USIWM0 | USICS1 | USICLK));
        }

        Self { _usi: PhantomData }
    }

    /// Shift one byte out and one byte in
    pub fn transfer_byte(&mut self, byte: u8) -> u8 {
        unsafe {
            let p = USI::ptr();

            (*p).usidr.write(|w| w.bits(byte));
            (*p).usisr.write(|w| w.bits(USIOIF));

            // Strobe the clock until the 4-bit counter overflows
            while (*p).usisr.read().bits() & USIOIF == 0 {
                (*p).usicr.modify(|r, w| w.bits(r.bits() | USITC));
                (*p).usicr.modify(|r, w| w.bits(r.bits() | USITC));
            }

            (*p).usisr.write(|w| w.bits(USIOIF));
            (*p).usidr.read().bits()
        }
    }
}

impl Default for Usi {
    fn default() -> Self {
        Self::new()
    }
}

impl FullDuplex<u8> for Usi {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        unsafe { Ok((*USI::ptr()).usidr.read().bits()) }
    }

    fn send(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        self.transfer_byte(byte);
        Ok(())
    }
}

impl embedded_hal::blocking::spi::transfer::Default<u8> for Usi {}
impl embedded_hal::blocking::spi::write::Default<u8> for Usi {}
