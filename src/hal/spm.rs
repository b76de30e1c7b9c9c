//! Self-programming of the ATtiny84 flash through SPM

use super::PageProgram;
use avr_device::attiny84::{CPU, EEPROM};
use core::arch::asm;

// SPMCSR bits
const SPMEN: u8 = 1 << 0;
const PGERS: u8 = 1 << 1;
const PGWRT: u8 = 1 << 2;
// ATtiny has no RWW section; CTPB takes the RWWSRE slot and clears the
// temporary page buffer after a write.
const CTPB: u8 = 1 << 4;

// SPMCSR I/O address (data space 0x57)
const SPMCSR_IO: u8 = 0x37;

// EECR: EEPE
const EEPE: u8 = 1 << 1;

/// Issue one SPM instruction with `command` in SPMCSR.
///
/// SPM must follow the SPMCSR write within four cycles, hence the inline
/// block. r0 is scratch; r1 holds the zero register and has to be
/// restored afterwards.
#[inline(always)]
unsafe fn spm(command: u8, address: u16, word: u16) {
    asm!(
        "movw r0, {word}",
        "out {spmcsr}, {cmd}",
        "spm",
        "clr r1",
        word = in(reg_pair) word,
        cmd = in(reg) command,
        spmcsr = const SPMCSR_IO,
        in("Z") address,
    );
}

/// SPM access to the application section
pub struct SelfProgramming {
    _private: (),
}

impl SelfProgramming {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for SelfProgramming {
    fn default() -> Self {
        Self::new()
    }
}

impl PageProgram for SelfProgramming {
    fn erase_page(&mut self, address: u16) {
        unsafe { spm(PGERS | SPMEN, address, 0) }
    }

    fn fill_word(&mut self, address: u16, word: u16) {
        unsafe { spm(SPMEN, address, word) }
    }

    fn write_page(&mut self, address: u16) {
        unsafe { spm(PGWRT | SPMEN, address, 0) }
    }

    fn enable_rww(&mut self) {
        unsafe { spm(CTPB | SPMEN, 0, 0) }
    }

    fn is_busy(&mut self) -> bool {
        unsafe {
            let spm_busy = (*CPU::ptr()).spmcsr.read().bits() & SPMEN != 0;
            let eeprom_busy = (*EEPROM::ptr()).eecr.read().bits() & EEPE != 0;
            spm_busy || eeprom_busy
        }
    }
}
