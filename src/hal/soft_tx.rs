//! Transmit-only software UART for debug logging
//!
//! Timer1 in CTC mode provides the bit clock; the line is driven on the
//! board's LOG_TX pin, 8N1.

use super::board::LOG_TX;
use crate::config::{CPU_FREQ_HZ, LOG_BAUD};
use avr_device::attiny84::TC1;
use core::convert::Infallible;

// TCCR1B: WGM12 (CTC) | CS10 (clk/1)
const TCCR1B_CTC_DIV1: u8 = (1 << 3) | (1 << 0);
// TIFR1: OCF1A
const OCF1A: u8 = 1 << 1;

const BIT_TICKS: u16 = (CPU_FREQ_HZ / LOG_BAUD) as u16 - 1;

pub struct SoftTx {
    pin: LOG_TX,
}

impl SoftTx {
    pub fn new(mut pin: LOG_TX) -> Self {
        // Idle high
        pin.set_high();
        unsafe {
            let p = TC1::ptr();
            (*p).tccr1a.write(|w| w.bits(0));
            (*p).ocr1a.write(|w| w.bits(BIT_TICKS));
            (*p).tcnt1.write(|w| w.bits(0));
            (*p).tccr1b.write(|w| w.bits(TCCR1B_CTC_DIV1));
        }
        Self { pin }
    }

    fn wait_bit(&self) {
        unsafe {
            let p = TC1::ptr();
            while (*p).tifr1.read().bits() & OCF1A == 0 {}
            (*p).tifr1.write(|w| w.bits(OCF1A));
        }
    }

    pub fn write_byte(&mut self, byte: u8) {
        self.wait_bit();
        self.pin.set_low();
        for bit in 0..8 {
            self.wait_bit();
            if byte & (1 << bit) != 0 {
                self.pin.set_high();
            } else {
                self.pin.set_low();
            }
        }
        self.wait_bit();
        self.pin.set_high();
        self.wait_bit();
    }

    /// Stop Timer1 and give the pin back
    pub fn release(self) -> LOG_TX {
        unsafe {
            let p = TC1::ptr();
            (*p).tccr1b.write(|w| w.bits(0));
            (*p).ocr1a.write(|w| w.bits(0));
            (*p).tcnt1.write(|w| w.bits(0));
            (*p).tifr1.write(|w| w.bits(OCF1A));
        }
        self.pin
    }
}

impl ufmt::uWrite for SoftTx {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
        Ok(())
    }
}
