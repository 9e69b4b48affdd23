//! Transport abstraction.
//!
//! A connection runs over any ordered, reliable byte stream. TCP is the normal
//! case; tests use in-memory duplex pipes.

use tokio::io::{AsyncRead, AsyncWrite};

/// A byte stream a [`Connection`](crate::Connection) can run over.
pub trait Transport: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

/// Type-erased transport owned by a connection.
pub type ClientStream = Box<dyn Transport>;
