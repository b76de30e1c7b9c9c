//! Host-side stand-ins for the hardware capabilities

use crate::clock::TickSource;
use crate::config::{EEPROM_SIZE, PACKET_SIZE, PAGE_SIZE};
use crate::hal::{interrupt, NonVolatile, PageProgram};
use crate::protocol::PacketLink;
use core::convert::Infallible;
use embedded_hal::digital::v2::OutputPin;
use std::collections::VecDeque;

pub const FLASH_SIZE: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashOp {
    Erase(u16),
    Fill(u16, u16),
    Write(u16),
    EnableRww,
}

/// Program memory that behaves like SPM: erase to 0xFF, fill a temporary
/// buffer, commit it, clear it again on RWW enable.
pub struct MemoryFlash {
    pub memory: Vec<u8>,
    pub ops: Vec<FlashOp>,
    temp: Vec<Option<u16>>,
    busy_polls: u8,
    busy_left: u8,
    pub busy_checks: usize,
}

impl MemoryFlash {
    pub fn new() -> Self {
        Self::with_contents(&[])
    }

    /// Flash holding `image` from address 0, erased everywhere else
    pub fn with_contents(image: &[u8]) -> Self {
        let mut memory = vec![0xFF; FLASH_SIZE];
        memory[..image.len()].copy_from_slice(image);
        Self {
            memory,
            ops: Vec::new(),
            temp: vec![None; PAGE_SIZE / 2],
            busy_polls: 2,
            busy_left: 0,
            busy_checks: 0,
        }
    }

    pub fn page(&self, address: u16) -> &[u8] {
        let start = address as usize;
        &self.memory[start..start + PAGE_SIZE]
    }

    pub fn word(&self, address: u16) -> u16 {
        let start = address as usize;
        u16::from_le_bytes([self.memory[start], self.memory[start + 1]])
    }

    /// Addresses of every committed page, in order
    pub fn commits(&self) -> Vec<u16> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                FlashOp::Write(address) => Some(*address),
                _ => None,
            })
            .collect()
    }

    fn start(&mut self, op: FlashOp) {
        assert!(interrupt::depth() > 0, "{:?} issued with interrupts enabled", op);
        assert_eq!(self.busy_left, 0, "{:?} issued while busy", op);
        self.ops.push(op);
        self.busy_left = self.busy_polls;
    }

    fn page_base(address: u16) -> usize {
        address as usize & !(PAGE_SIZE - 1)
    }
}

impl Default for MemoryFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl PageProgram for MemoryFlash {
    fn erase_page(&mut self, address: u16) {
        self.start(FlashOp::Erase(address));
        let base = Self::page_base(address);
        self.memory[base..base + PAGE_SIZE].fill(0xFF);
    }

    fn fill_word(&mut self, address: u16, word: u16) {
        self.start(FlashOp::Fill(address, word));
        let slot = (address as usize % PAGE_SIZE) / 2;
        self.temp[slot] = Some(word);
    }

    fn write_page(&mut self, address: u16) {
        self.start(FlashOp::Write(address));
        let base = Self::page_base(address);
        for (slot, word) in self.temp.iter().enumerate() {
            let word = word.unwrap_or(0xFFFF);
            let at = base + slot * 2;
            self.memory[at..at + 2].copy_from_slice(&word.to_le_bytes());
        }
    }

    fn enable_rww(&mut self) {
        self.start(FlashOp::EnableRww);
        self.temp.fill(None);
    }

    fn is_busy(&mut self) -> bool {
        self.busy_checks += 1;
        if self.busy_left > 0 {
            self.busy_left -= 1;
            true
        } else {
            false
        }
    }
}

/// EEPROM image, erased to 0xFF, counting word writes
pub struct MemoryEeprom {
    pub memory: Vec<u8>,
    pub writes: usize,
}

impl MemoryEeprom {
    pub fn new() -> Self {
        Self {
            memory: vec![0xFF; EEPROM_SIZE as usize],
            writes: 0,
        }
    }

    pub fn with_word(offset: u16, value: u16) -> Self {
        let mut eeprom = Self::new();
        let at = offset as usize;
        eeprom.memory[at..at + 2].copy_from_slice(&value.to_le_bytes());
        eeprom
    }

    pub fn word(&self, offset: u16) -> u16 {
        let at = offset as usize;
        u16::from_le_bytes([self.memory[at], self.memory[at + 1]])
    }
}

impl Default for MemoryEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl NonVolatile for MemoryEeprom {
    fn read_word(&mut self, offset: u16) -> u16 {
        let at = offset as usize;
        u16::from_le_bytes([self.memory[at], self.memory[at + 1]])
    }

    fn write_word(&mut self, offset: u16, value: u16) {
        let at = offset as usize;
        self.memory[at..at + 2].copy_from_slice(&value.to_le_bytes());
        self.writes += 1;
    }
}

/// Packet source replaying a script; `None` entries are polls with
/// nothing ready.
pub struct ScriptedLink {
    script: VecDeque<Option<[u8; PACKET_SIZE]>>,
    fail_next: bool,
}

impl ScriptedLink {
    pub fn new(packets: &[[u8; PACKET_SIZE]]) -> Self {
        Self {
            script: packets.iter().copied().map(Some).collect(),
            fail_next: false,
        }
    }

    pub fn push(&mut self, packet: [u8; PACKET_SIZE]) {
        self.script.push_back(Some(packet));
    }

    pub fn push_gap(&mut self, polls: usize) {
        for _ in 0..polls {
            self.script.push_back(None);
        }
    }

    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    pub fn remaining(&self) -> usize {
        self.script.iter().filter(|entry| entry.is_some()).count()
    }
}

impl PacketLink for ScriptedLink {
    type Error = ();

    fn data_ready(&mut self) -> Result<bool, ()> {
        if self.fail_next {
            self.fail_next = false;
            return Err(());
        }
        match self.script.front() {
            Some(Some(_)) => Ok(true),
            Some(None) => {
                self.script.pop_front();
                Ok(false)
            }
            None => Ok(false),
        }
    }

    fn read_packet(&mut self, packet: &mut [u8; PACKET_SIZE]) -> Result<(), ()> {
        match self.script.pop_front() {
            Some(Some(bytes)) => {
                *packet = bytes;
                Ok(())
            }
            _ => Err(()),
        }
    }
}

/// Output pin remembering every level it was driven to
#[derive(Default)]
pub struct RecordingPin {
    pub levels: Vec<bool>,
}

impl RecordingPin {
    pub fn is_high(&self) -> bool {
        self.levels.last().copied().unwrap_or(false)
    }
}

impl OutputPin for RecordingPin {
    type Error = Infallible;

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.levels.push(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.levels.push(false);
        Ok(())
    }
}

/// Clock that advances one tick per reading
#[derive(Default)]
pub struct SteppingTicks {
    now: u8,
}

impl TickSource for SteppingTicks {
    fn now(&mut self) -> u8 {
        self.now = self.now.wrapping_add(1);
        self.now
    }
}
