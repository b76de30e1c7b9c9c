//! Radio transfer protocol
//!
//! A transfer is a start packet (magic + declared length) followed by raw
//! payload packets, all `PACKET_SIZE` bytes, in arrival order. There are no
//! sequence numbers, no acknowledgements and no checksums.

pub mod packet;
pub mod transport;

pub use packet::Packet;
pub use transport::{PacketLink, Receiver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// The radio link failed while polling or reading
    TransportError,
}
