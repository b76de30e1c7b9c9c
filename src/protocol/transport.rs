//! Transport layer: turns radio polling into a packet stream

use super::{Packet, ProtocolError};
use crate::config::PACKET_SIZE;

/// Receive side of a fixed-payload packet radio
pub trait PacketLink {
    type Error: core::fmt::Debug;

    /// A payload is waiting to be read
    fn data_ready(&mut self) -> Result<bool, Self::Error>;

    /// Pop the oldest payload
    fn read_packet(&mut self, packet: &mut [u8; PACKET_SIZE]) -> Result<(), Self::Error>;
}

pub struct Receiver<L> {
    link: L,
}

impl<L: PacketLink> Receiver<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    /// Next packet, or `WouldBlock` when the radio has nothing yet
    pub fn poll(&mut self) -> nb::Result<Packet, ProtocolError> {
        let ready = self
            .link
            .data_ready()
            .map_err(|_| nb::Error::Other(ProtocolError::TransportError))?;
        if !ready {
            return Err(nb::Error::WouldBlock);
        }

        let mut bytes = [0u8; PACKET_SIZE];
        self.link
            .read_packet(&mut bytes)
            .map_err(|_| nb::Error::Other(ProtocolError::TransportError))?;
        Ok(Packet::new(bytes))
    }

    pub fn release(self) -> L {
        self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedLink;

    #[test]
    fn empty_link_would_block() {
        let mut receiver = Receiver::new(ScriptedLink::new(&[]));
        assert_eq!(receiver.poll(), Err(nb::Error::WouldBlock));
    }

    #[test]
    fn packets_come_out_in_order() {
        let mut receiver = Receiver::new(ScriptedLink::new(&[[1, 2, 3, 4], [5, 6, 7, 8]]));
        assert_eq!(receiver.poll(), Ok(Packet::new([1, 2, 3, 4])));
        assert_eq!(receiver.poll(), Ok(Packet::new([5, 6, 7, 8])));
        assert_eq!(receiver.poll(), Err(nb::Error::WouldBlock));
    }

    #[test]
    fn link_failure_is_a_transport_error() {
        let mut link = ScriptedLink::new(&[[1, 2, 3, 4]]);
        link.fail_next();
        let mut receiver = Receiver::new(link);
        assert_eq!(
            receiver.poll(),
            Err(nb::Error::Other(ProtocolError::TransportError))
        );
        assert_eq!(receiver.poll(), Ok(Packet::new([1, 2, 3, 4])));
    }
}
