use super::{InterruptFreeZone, NonVolatile};
use avr_device::attiny84::EEPROM;

// EECR bits
const EERE: u8 = 1 << 0;
const EEPE: u8 = 1 << 1;
const EEMPE: u8 = 1 << 2;

/// On-chip EEPROM
pub struct Eeprom {
    _private: (),
}

impl Eeprom {
    #[inline]
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn wait_ready(&self) {
        unsafe { while (*EEPROM::ptr()).eecr.read().bits() & EEPE != 0 {} }
    }

    pub fn read_byte(&mut self, address: u16) -> u8 {
        self.wait_ready();
        unsafe {
            let p = EEPROM::ptr();
            (*p).eear.write(|w| w.bits(address));
            (*p).eecr.write(|w| w.bits(EERE));
            (*p).eedr.read().bits()
        }
    }

    /// Erase-and-write one byte, skipped when it already holds `value`.
    /// Caller must have interrupts disabled (EEMPE/EEPE timing).
    fn update_byte(&mut self, address: u16, value: u8) {
        if self.read_byte(address) == value {
            return;
        }
        self.wait_ready();
        unsafe {
            let p = EEPROM::ptr();
            // EEPM = 00: atomic erase and write
            (*p).eecr.write(|w| w.bits(0));
            (*p).eear.write(|w| w.bits(address));
            (*p).eedr.write(|w| w.bits(value));
            (*p).eecr.write(|w| w.bits(EEMPE));
            (*p).eecr.write(|w| w.bits(EEMPE | EEPE));
        }
    }
}

impl Default for Eeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl NonVolatile for Eeprom {
    fn read_word(&mut self, offset: u16) -> u16 {
        let low = self.read_byte(offset);
        let high = self.read_byte(offset + 1);
        u16::from_le_bytes([low, high])
    }

    fn write_word(&mut self, offset: u16, value: u16) {
        let [low, high] = value.to_le_bytes();
        let _zone = InterruptFreeZone::enter();
        self.update_byte(offset, low);
        self.update_byte(offset + 1, high);
        self.wait_ready();
    }
}
