//! Protocol error types.

use thiserror::Error;

/// Structural violations found while encoding or decoding packets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("invalid packet: length field is {length}, payload requires {expected}")]
    InvalidPacket { length: u32, expected: usize },

    #[error("invalid packet bytes: need at least 14 bytes ending in two nulls")]
    InvalidPacketBytes,

    #[error("incorrect packet length: header declares {declared} bytes, got {actual}")]
    IncorrectLength { declared: u32, actual: usize },

    #[error("invalid packet type: {0}")]
    InvalidPacketType(u32),

    #[error("payload contains non-ASCII characters")]
    NonAsciiPayload,

    #[error("packet too large: {size} bytes buffered without a boundary (max {max})")]
    PacketTooLarge { size: usize, max: usize },
}
