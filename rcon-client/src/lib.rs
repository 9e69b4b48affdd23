//! # rcon-client
//!
//! Client library for RCON servers.
//!
//! This crate provides:
//! - Async TCP connections with login handshake
//! - Serialized command execution with fragmented response reassembly
//! - A one-connection-per-call client for concurrent callers
//! - `rcon://host:port` address parsing

pub mod address;
pub mod client;
pub mod connection;
pub mod error;
pub mod stream;

#[cfg(test)]
mod mock;

pub use address::RconAddr;
pub use client::Client;
pub use connection::{Connection, ConnectionConfig};
pub use error::ClientError;
pub use rcon_protocol::RequestIds;
