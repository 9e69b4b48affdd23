//! Streaming decoder for RCON packets.
//!
//! The protocol has no reliable way to size a read up front, so packet
//! boundaries are found the same way a byte-at-a-time reader would find them:
//! a packet ends at the first point where at least 14 bytes are buffered and
//! the last two are zero. Feeding the decoder larger chunks yields the same
//! boundaries; anything past a boundary stays buffered for the next packet.

use crate::error::ProtocolError;
use crate::packet::{has_packet_boundary, Packet};
use crate::{MAX_PACKET_SIZE, MIN_PACKET_SIZE};
use bytes::BytesMut;

/// Splits a byte stream into packets.
pub struct Decoder {
    buffer: BytesMut,
    /// Smallest prefix length not yet checked for a boundary.
    scanned: usize,
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            scanned: MIN_PACKET_SIZE,
        }
    }

    /// Appends data to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Attempts to decode the next packet from the buffer.
    ///
    /// Returns `Ok(None)` if no boundary has been seen yet.
    pub fn decode_packet(&mut self) -> Result<Option<Packet>, ProtocolError> {
        let start = self.scanned.max(MIN_PACKET_SIZE);
        for end in start..=self.buffer.len() {
            if has_packet_boundary(&self.buffer[..end]) {
                let frame = self.buffer.split_to(end);
                self.scanned = MIN_PACKET_SIZE;
                return Packet::decode(&frame).map(Some);
            }
        }

        if self.buffer.len() > MAX_PACKET_SIZE {
            return Err(ProtocolError::PacketTooLarge {
                size: self.buffer.len(),
                max: MAX_PACKET_SIZE,
            });
        }

        self.scanned = self.buffer.len() + 1;
        Ok(None)
    }

    /// Returns the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.scanned = MIN_PACKET_SIZE;
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
