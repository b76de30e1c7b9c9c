use crate::config::PAGE_SIZE;
use crate::hal::{InterruptFreeZone, PageProgram};

/// Erase / fill / write sequence for one program memory page
pub struct FlashWriter<P> {
    programmer: P,
    commits: u16,
}

impl<P: PageProgram> FlashWriter<P> {
    pub fn new(programmer: P) -> Self {
        Self {
            programmer,
            commits: 0,
        }
    }

    /// Program `page` at byte address `address` (page aligned).
    ///
    /// Runs with interrupts disabled from the erase until the section is
    /// readable again. Every step waits for the previous SPM (or a pending
    /// EEPROM write) to finish first.
    pub fn write_page(&mut self, address: u16, page: &[u8; PAGE_SIZE]) {
        let _zone = InterruptFreeZone::enter();

        self.wait_idle();
        self.programmer.erase_page(address);

        for (offset, word) in page.chunks_exact(2).enumerate() {
            let word = u16::from_le_bytes([word[0], word[1]]);
            self.wait_idle();
            self.programmer.fill_word(address + (offset * 2) as u16, word);
        }

        self.wait_idle();
        self.programmer.write_page(address);

        self.wait_idle();
        self.programmer.enable_rww();

        self.wait_idle();
        self.commits = self.commits.wrapping_add(1);
    }

    /// Pages programmed through this writer
    pub fn commits(&self) -> u16 {
        self.commits
    }

    pub fn programmer(&self) -> &P {
        &self.programmer
    }

    pub fn release(self) -> P {
        self.programmer
    }

    fn wait_idle(&mut self) {
        while self.programmer.is_busy() {}
    }
}
