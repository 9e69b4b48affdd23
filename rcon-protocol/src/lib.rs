//! # rcon-protocol
//!
//! Wire protocol implementation for RCON (remote console).
//!
//! This crate provides:
//! - The packet layout with little-endian framing and structural validation
//! - A streaming decoder that splits raw transport bytes into packets
//! - Request id generation
//! - Protocol constants, including the termination probe and its sentinel

pub mod codec;
pub mod error;
pub mod id;
pub mod packet;

pub use codec::Decoder;
pub use error::ProtocolError;
pub use id::RequestIds;
pub use packet::{Packet, PacketKind};

/// Default port for RCON servers.
pub const DEFAULT_PORT: u16 = 25575;

/// URI scheme identifying RCON addresses (`rcon://host:port`).
pub const URI_SCHEME: &str = "rcon";

/// Bytes counted by `length` besides the payload: id (4), kind (4), two nulls (2).
pub const PACKET_OVERHEAD: usize = 10;

/// Smallest possible encoded packet: length field plus an empty-payload body.
pub const MIN_PACKET_SIZE: usize = 4 + PACKET_OVERHEAD;

/// Upper bound on bytes buffered while looking for a packet boundary (1 MiB).
pub const MAX_PACKET_SIZE: usize = 1024 * 1024;

/// Payload of the termination probe sent after the first response fragment.
pub const TERMINATION_PAYLOAD: &str = "MESSAGE-END";

/// The server's reply to the termination probe. Marks the end of a response group.
pub const TERMINAL_RESPONSE: &str = "Unknown request 5";
