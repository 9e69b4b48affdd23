//! Request id generation.

use crate::packet::{Packet, PacketKind};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// Hands out request ids.
///
/// Clones share one counter, so every packet built from any clone gets a
/// distinct id. Ids start at 1 and wrap from `i32::MAX` back to 1; zero and
/// the server's `-1` failure marker are never issued.
#[derive(Debug, Clone)]
pub struct RequestIds {
    last: Arc<AtomicI32>,
}

impl RequestIds {
    pub fn new() -> Self {
        Self::starting_after(0)
    }

    /// Creates a generator whose first id is the one following `last`.
    pub fn starting_after(last: i32) -> Self {
        Self {
            last: Arc::new(AtomicI32::new(last)),
        }
    }

    /// Returns the next id.
    pub fn next_id(&self) -> i32 {
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| Some(successor(id)))
            .unwrap_or_else(|id| id);
        successor(previous)
    }

    /// Builds a packet stamped with the next id.
    pub fn next_packet(&self, kind: PacketKind, payload: impl Into<String>) -> Packet {
        Packet::new(self.next_id(), kind, payload)
    }
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::new()
    }
}

fn successor(id: i32) -> i32 {
    if id <= 0 || id == i32::MAX {
        1
    } else {
        id + 1
    }
}
