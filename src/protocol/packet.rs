//! Fixed-size radio packets

use crate::config::{PACKET_MAGIC, PACKET_SIZE};

/// One radio payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    bytes: [u8; PACKET_SIZE],
}

impl Packet {
    pub const fn new(bytes: [u8; PACKET_SIZE]) -> Self {
        Self { bytes }
    }

    /// Start packet announcing `length` payload bytes
    pub fn start(length: u16) -> Self {
        let mut bytes = [0u8; PACKET_SIZE];
        bytes[..2].copy_from_slice(&PACKET_MAGIC.to_le_bytes());
        bytes[PACKET_SIZE - 2..].copy_from_slice(&length.to_le_bytes());
        Self { bytes }
    }

    /// Declared payload length if this is a start packet
    pub fn start_length(&self) -> Option<u16> {
        let marker = u16::from_le_bytes([self.bytes[0], self.bytes[1]]);
        if marker != PACKET_MAGIC {
            return None;
        }
        let tail = &self.bytes[PACKET_SIZE - 2..];
        Some(u16::from_le_bytes([tail[0], tail[1]]))
    }

    pub fn payload(&self) -> &[u8; PACKET_SIZE] {
        &self.bytes
    }
}

impl From<[u8; PACKET_SIZE]> for Packet {
    fn from(bytes: [u8; PACKET_SIZE]) -> Self {
        Self::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_packet_layout() {
        let packet = Packet::start(0x0140);
        assert_eq!(packet.payload(), &[0x77, 0x77, 0x40, 0x01]);
        assert_eq!(packet.start_length(), Some(0x0140));
    }

    #[test]
    fn length_is_little_endian_trailer() {
        let packet = Packet::new([0x77, 0x77, 0x00, 0x02]);
        assert_eq!(packet.start_length(), Some(512));
    }

    #[test]
    fn wrong_marker_is_not_a_start() {
        assert_eq!(Packet::new([0x77, 0x76, 0x40, 0x00]).start_length(), None);
        assert_eq!(Packet::new([0x01, 0xC1, 0x00, 0x00]).start_length(), None);
    }
}
