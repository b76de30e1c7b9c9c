//! Reset vector capture and redirect
//!
//! The image's first instruction is an `rjmp` into the application. It is
//! replaced with an `rjmp` to the bootloader, and the address it used to
//! reach is kept in EEPROM so the bootloader can still start the
//! application.

use crate::hal::NonVolatile;

/// `rjmp k`: 1100 kkkk kkkk kkkk
pub const RJMP_OPCODE: u16 = 0xC000;

/// Word address reached by an `rjmp` located at address 0.
///
/// No opcode check: anything else decodes to a meaningless address.
#[inline]
pub const fn decode_rjmp(word: u16) -> u16 {
    word.wrapping_sub(RJMP_OPCODE).wrapping_add(1)
}

/// `rjmp` placed at address 0 that lands on word address `target`
#[inline]
pub const fn encode_rjmp(target: u16) -> u16 {
    RJMP_OPCODE.wrapping_add(target).wrapping_sub(1)
}

pub struct VectorPatcher {
    slot: u16,
    redirect: u16,
}

impl VectorPatcher {
    /// `bootloader` is the byte address reset should be sent to; `slot` is
    /// the EEPROM offset that keeps the application entry.
    pub const fn new(bootloader: u16, slot: u16) -> Self {
        Self {
            slot,
            redirect: encode_rjmp(bootloader / 2),
        }
    }

    /// Instruction written over the image's first word
    pub fn redirect(&self) -> u16 {
        self.redirect
    }

    /// Persist the entry `first_chunk` jumps to and point it at the
    /// bootloader instead. Returns the persisted word address.
    pub fn patch<S: NonVolatile>(&self, first_chunk: &mut [u8], store: &mut S) -> u16 {
        let original = u16::from_le_bytes([first_chunk[0], first_chunk[1]]);
        let entry = decode_rjmp(original);

        store.write_word(self.slot, entry);
        first_chunk[..2].copy_from_slice(&self.redirect.to_le_bytes());
        entry
    }
}
