//! Build-time configuration for the ATtiny84 radio bootloader

use crate::bootloader::TimeoutPolicy;

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 1_000_000;

/// Byte address the bootloader is linked at (see build.rs)
pub const BOOTLOADER_ADDRESS: u16 = 0x0400;

/// Byte address of the first application page
pub const APP_BASE_ADDRESS: u16 = 0x0000;

/// SPM page size in bytes (ATtiny84)
pub const PAGE_SIZE: usize = 64;

/// EEPROM size in bytes (ATtiny84)
pub const EEPROM_SIZE: u16 = 512;

/// EEPROM slot holding the application's real entry (word address)
pub const ENTRY_VECTOR_SLOT: u16 = EEPROM_SIZE - 2;

/// Radio payload width in bytes
pub const PACKET_SIZE: usize = 4;

/// Leading bytes of a start packet
pub const PACKET_MAGIC: u16 = 0x7777;

/// nRF24 RF channel
pub const RF24_CHANNEL: u8 = 0x77;

/// nRF24 receive address (pipe 1)
pub const RF24_ADDRESS: [u8; 5] = [0x31, 0x31, 0x31, 0x31, 0x31];

/// Timer0 compare value at clk/1024: (OCR0A + 1) * 1024 / 1 MHz ~= 10 ms per tick
pub const TIMER0_COMPARE: u8 = 9;

/// Ticks without a packet before the receive loop gives up (~100 ms)
pub const INACTIVITY_TICKS: u8 = 10;

/// Absolute session ceiling in ticks, `None` to disable
pub const SESSION_LIMIT_TICKS: Option<u16> = None;

/// Radio LDO settle time
pub const RADIO_POWER_UP_TICKS: u8 = 2;

/// Status LED blinks before leaving the bootloader
pub const EXIT_BLINKS: u8 = 3;

/// Half period of an exit blink (~500 ms)
pub const EXIT_BLINK_TICKS: u8 = 49;

/// Where to go when no transfer completed
pub const TIMEOUT_POLICY: TimeoutPolicy = TimeoutPolicy::PersistedEntry;

/// Soft UART baud rate for the `debug` log sink
pub const LOG_BAUD: u32 = 9600;

const _: () = assert!(PACKET_SIZE >= 2 && PACKET_SIZE % 2 == 0);
const _: () = assert!(PAGE_SIZE % PACKET_SIZE == 0);
const _: () = assert!(BOOTLOADER_ADDRESS % 2 == 0);
