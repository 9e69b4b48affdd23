//! RCON packet layout.
//!
//! Packet layout (all integers little-endian):
//!
//! ```text
//! +---------+---------+---------+-----------------+------+
//! | length  |   id    |  kind   |     payload     | 0x00 |
//! | 4 bytes | 4 bytes | 4 bytes | length-10 bytes | 0x00 |
//! +---------+---------+---------+-----------------+------+
//! ```
//!
//! `length` counts everything after itself, so an empty payload gives a
//! length of 10 and a 14 byte packet.

use crate::error::ProtocolError;
use crate::{MIN_PACKET_SIZE, PACKET_OVERHEAD};
use bytes::{Buf, BufMut, BytesMut};
use std::fmt;

/// Packet kinds understood by the protocol.
///
/// Values 1 and 4 are unused on the wire and are rejected when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PacketKind {
    /// Server reply to a command or to the termination probe.
    Response = 0,
    /// Command to execute (also used by servers for the login reply).
    Command = 2,
    /// Login request carrying the password.
    Login = 3,
    /// Termination probe. Servers do not recognize it and answer with
    /// [`TERMINAL_RESPONSE`](crate::TERMINAL_RESPONSE).
    Termination = 5,
}

impl TryFrom<u32> for PacketKind {
    type Error = ProtocolError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PacketKind::Response),
            2 => Ok(PacketKind::Command),
            3 => Ok(PacketKind::Login),
            5 => Ok(PacketKind::Termination),
            other => Err(ProtocolError::InvalidPacketType(other)),
        }
    }
}

impl From<PacketKind> for u32 {
    fn from(kind: PacketKind) -> Self {
        kind as u32
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketKind::Response => write!(f, "RESPONSE"),
            PacketKind::Command => write!(f, "COMMAND"),
            PacketKind::Login => write!(f, "LOGIN"),
            PacketKind::Termination => write!(f, "TERMINATION"),
        }
    }
}

/// A single RCON packet.
///
/// Fields are public so callers can inspect decoded packets; [`Packet::encode`]
/// re-validates them before anything reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Byte count after the length field: payload + 10.
    pub length: u32,
    /// Request id, echoed back by the server. `-1` signals failed login.
    pub id: i32,
    /// Packet kind.
    pub kind: PacketKind,
    /// ASCII payload.
    pub payload: String,
}

impl Packet {
    /// Creates a packet, computing `length` from the payload.
    pub fn new(id: i32, kind: PacketKind, payload: impl Into<String>) -> Self {
        let payload = payload.into();
        Self {
            length: (payload.len() + PACKET_OVERHEAD) as u32,
            id,
            kind,
            payload,
        }
    }

    /// Returns the encoded size of this packet in bytes.
    pub fn encoded_len(&self) -> usize {
        4 + PACKET_OVERHEAD + self.payload.len()
    }

    /// Encodes the packet into bytes.
    pub fn encode(&self) -> Result<BytesMut, ProtocolError> {
        let expected = self.payload.len() + PACKET_OVERHEAD;
        if self.length as usize != expected {
            return Err(ProtocolError::InvalidPacket {
                length: self.length,
                expected,
            });
        }

        if !self.payload.is_ascii() {
            return Err(ProtocolError::NonAsciiPayload);
        }

        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u32_le(self.length);
        buf.put_i32_le(self.id);
        buf.put_u32_le(self.kind.into());
        buf.put_slice(self.payload.as_bytes());
        buf.put_slice(&[0, 0]);

        Ok(buf)
    }

    /// Decodes exactly one packet from `data`.
    ///
    /// `data` must hold the whole packet and nothing else.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if !has_packet_boundary(data) {
            return Err(ProtocolError::InvalidPacketBytes);
        }

        let mut header = &data[..12];

        let length = header.get_u32_le();
        if data.len() as u64 != length as u64 + 4 {
            return Err(ProtocolError::IncorrectLength {
                declared: length,
                actual: data.len() - 4,
            });
        }

        let id = header.get_i32_le();
        let kind = PacketKind::try_from(header.get_u32_le())?;

        let body = &data[12..data.len() - 2];
        if !body.is_ascii() {
            return Err(ProtocolError::NonAsciiPayload);
        }
        let payload = body.iter().map(|&b| b as char).collect();

        Ok(Self {
            length,
            id,
            kind,
            payload,
        })
    }
}

/// Returns whether `data` could end a packet: at least 14 bytes, last two zero.
pub(crate) fn has_packet_boundary(data: &[u8]) -> bool {
    data.len() >= MIN_PACKET_SIZE && data[data.len() - 2] == 0 && data[data.len() - 1] == 0
}
