use super::flash_writer::FlashWriter;
use crate::config::{PACKET_SIZE, PAGE_SIZE};
use crate::hal::PageProgram;

/// Collects payload bytes until a whole page (or the end of the transfer)
/// is ready to be programmed.
pub struct PageAssembler {
    buffer: [u8; PAGE_SIZE],
    offset: usize,
    address: u16,
}

impl PageAssembler {
    pub const fn new() -> Self {
        Self {
            buffer: [0; PAGE_SIZE],
            offset: 0,
            address: 0,
        }
    }

    /// Start a new image at byte address `base`
    pub fn arm(&mut self, base: u16) {
        self.buffer = [0; PAGE_SIZE];
        self.offset = 0;
        self.address = base;
    }

    /// Append `bytes` at the current offset; returns how many fit
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        let count = bytes.len().min(PAGE_SIZE - self.offset);
        self.buffer[self.offset..self.offset + count].copy_from_slice(&bytes[..count]);
        self.offset += count;
        count
    }

    /// The page is full, or the transfer ended with bytes still pending
    pub fn should_flush(&self, complete: bool) -> bool {
        self.offset == PAGE_SIZE || (complete && self.offset > 0)
    }

    /// Program the pending page and move on to the next one.
    /// Returns the address that was written.
    pub fn flush<P: PageProgram>(&mut self, writer: &mut FlashWriter<P>) -> u16 {
        let address = self.address;
        writer.write_page(address, &self.buffer);

        self.offset = 0;
        self.buffer = [0; PAGE_SIZE];
        self.address = self.address.wrapping_add(PAGE_SIZE as u16);
        address
    }

    /// The first packet-sized chunk of the page being assembled
    pub fn first_chunk_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[..PACKET_SIZE]
    }

    /// Address the pending page will be written to
    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn pending(&self) -> &[u8] {
        &self.buffer[..self.offset]
    }
}

impl Default for PageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryFlash;

    #[test]
    fn fills_until_page_boundary() {
        let mut assembler = PageAssembler::new();
        assembler.arm(0);

        for _ in 0..PAGE_SIZE / PACKET_SIZE - 1 {
            assert_eq!(assembler.feed(&[1; PACKET_SIZE]), PACKET_SIZE);
            assert!(!assembler.should_flush(false));
        }
        assembler.feed(&[2; PACKET_SIZE]);
        assert!(assembler.should_flush(false));

        // Nothing fits into a full page
        assert_eq!(assembler.feed(&[3; PACKET_SIZE]), 0);
    }

    #[test]
    fn flush_advances_and_clears() {
        let mut writer = FlashWriter::new(MemoryFlash::new());
        let mut assembler = PageAssembler::new();
        assembler.arm(0x0040);
        assembler.feed(&[0xEE; PAGE_SIZE]);

        assert_eq!(assembler.flush(&mut writer), 0x0040);
        assert_eq!(assembler.address(), 0x0080);
        assert_eq!(assembler.offset(), 0);
        assert!(assembler.pending().is_empty());
        assert_eq!(writer.programmer().page(0x0040), &[0xEE; PAGE_SIZE][..]);
    }

    #[test]
    fn partial_page_only_flushes_at_end_of_transfer() {
        let mut writer = FlashWriter::new(MemoryFlash::new());
        let mut assembler = PageAssembler::new();
        assembler.arm(0);
        assembler.feed(&[9, 9, 9]);

        assert!(!assembler.should_flush(false));
        assert!(assembler.should_flush(true));
        assembler.flush(&mut writer);

        // The unfilled tail keeps the buffer's zero fill
        let page = writer.programmer().page(0);
        assert_eq!(&page[..4], &[9, 9, 9, 0]);
        assert!(page[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn empty_buffer_never_flushes() {
        let mut assembler = PageAssembler::new();
        assembler.arm(0);
        assert!(!assembler.should_flush(true));
    }

    #[test]
    fn first_chunk_is_packet_sized() {
        let mut assembler = PageAssembler::new();
        assembler.arm(0);
        assembler.feed(&[1, 2, 3, 4]);
        let chunk = assembler.first_chunk_mut();
        assert_eq!(chunk.len(), PACKET_SIZE);
        chunk[0] = 0xFF;
        assert_eq!(assembler.pending()[0], 0xFF);
    }
}
