//! Connection management.
//!
//! A [`Connection`] owns one transport. A background task reads the transport,
//! decodes packets and hands them to whichever command is waiting through a
//! channel. Commands are serialized behind a single async mutex held for the
//! whole round trip, because servers cannot tell interleaved requests apart.
//!
//! RCON has no "end of response" marker. After the first packet of a response
//! arrives, the connection sends a termination probe. Servers answer requests
//! in order and reply to the probe's unknown kind with a fixed string, so
//! seeing that string means every fragment of the command's response has been
//! received.

use crate::address::RconAddr;
use crate::error::ClientError;
use crate::stream::{ClientStream, Transport};
use rcon_protocol::{
    Decoder, Packet, PacketKind, RequestIds, TERMINAL_RESPONSE, TERMINATION_PAYLOAD,
};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::AbortHandle;

/// Default read buffer size (4 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4 * 1024;

/// Minimum read buffer size (512 bytes).
pub const MIN_READ_BUFFER_SIZE: usize = 512;

/// Maximum read buffer size (64 KiB).
pub const MAX_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Capacity of the channel between the read loop and waiting commands.
const PACKET_CHANNEL_CAPACITY: usize = 64;

/// Connection configuration.
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Server address.
    pub addr: RconAddr,
    /// Password sent in the login packet.
    pub password: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Read buffer size for socket reads.
    pub read_buffer_size: usize,
}

impl ConnectionConfig {
    pub fn new(addr: RconAddr, password: impl Into<String>) -> Self {
        Self {
            addr,
            password: password.into(),
            connect_timeout: Duration::from_secs(10),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.clamp(MIN_READ_BUFFER_SIZE, MAX_READ_BUFFER_SIZE);
        self
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("addr", &self.addr)
            .field("password", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("read_buffer_size", &self.read_buffer_size)
            .finish()
    }
}

/// What the read loop hands to a waiting command.
type Delivery = Result<Packet, ClientError>;

/// State guarded by the command gate.
struct Session {
    /// Write half of the transport. `None` once the connection is torn down.
    writer: Option<WriteHalf<ClientStream>>,
    /// Packets decoded by the read loop.
    packets: mpsc::Receiver<Delivery>,
}

impl Session {
    async fn write_frame(&mut self, frame: &[u8]) -> Result<(), ClientError> {
        let writer = self.writer.as_mut().ok_or(ClientError::ConnectionClosed)?;
        writer.write_all(frame).await?;
        Ok(())
    }

    /// Writes a request and collects its response group.
    async fn round_trip(
        &mut self,
        frame: &[u8],
        ids: &RequestIds,
    ) -> Result<Vec<Packet>, ClientError> {
        self.write_frame(frame).await?;
        self.read_group(ids).await
    }

    /// Collects packets up to the termination sentinel.
    ///
    /// The probe is written only after the first packet arrives: servers drop
    /// requests that arrive while another one is still being processed.
    async fn read_group(&mut self, ids: &RequestIds) -> Result<Vec<Packet>, ClientError> {
        let mut group = Vec::new();
        let mut probe_sent = false;

        loop {
            let packet = match self.packets.recv().await {
                Some(delivery) => delivery?,
                None => return Err(ClientError::ConnectionClosed),
            };

            if !probe_sent {
                let probe = ids.next_packet(PacketKind::Termination, TERMINATION_PAYLOAD);
                self.write_frame(&probe.encode()?).await?;
                probe_sent = true;
            }

            if packet.payload == TERMINAL_RESPONSE {
                return Ok(group);
            }

            group.push(packet);
        }
    }

    async fn shutdown(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.shutdown().await;
        }
    }
}

/// An authenticated connection to an RCON server.
pub struct Connection {
    /// Remote address, used in log fields.
    peer: String,
    ids: RequestIds,
    /// Command gate. Held for a full request/response round trip.
    session: Mutex<Session>,
    closed: Arc<AtomicBool>,
    reader: AbortHandle,
}

impl Connection {
    /// Connects to the server and logs in.
    pub async fn connect(config: &ConnectionConfig, ids: RequestIds) -> Result<Self, ClientError> {
        let addr = config.addr.to_string();
        tracing::debug!(%addr, "connecting");

        let tcp_stream = tokio::time::timeout(
            config.connect_timeout,
            TcpStream::connect((config.addr.host.as_str(), config.addr.port)),
        )
        .await
        .map_err(|_| {
            tracing::debug!(%addr, "connection timeout");
            ClientError::Timeout
        })?
        .map_err(|source| {
            tracing::debug!(%addr, error = %source, "connection failed");
            ClientError::Dial {
                addr: addr.clone(),
                source,
            }
        })?;

        tcp_stream.set_nodelay(true).ok();

        Self::establish(
            Box::new(tcp_stream),
            addr,
            &config.password,
            ids,
            config.read_buffer_size,
        )
        .await
    }

    /// Logs in over an already open transport.
    ///
    /// On failure the transport is closed and dropped.
    pub async fn handshake<S: Transport>(
        stream: S,
        password: &str,
        ids: RequestIds,
    ) -> Result<Self, ClientError> {
        Self::establish(
            Box::new(stream),
            "stream".to_string(),
            password,
            ids,
            DEFAULT_READ_BUFFER_SIZE,
        )
        .await
    }

    async fn establish(
        stream: ClientStream,
        peer: String,
        password: &str,
        ids: RequestIds,
        read_buffer_size: usize,
    ) -> Result<Self, ClientError> {
        let (read_half, write_half) = tokio::io::split(stream);
        let (tx, rx) = mpsc::channel(PACKET_CHANNEL_CAPACITY);
        let closed = Arc::new(AtomicBool::new(false));

        let reader = tokio::spawn(read_loop(
            read_half,
            tx,
            closed.clone(),
            peer.clone(),
            read_buffer_size,
        ))
        .abort_handle();

        let conn = Self {
            peer,
            ids,
            session: Mutex::new(Session {
                writer: Some(write_half),
                packets: rx,
            }),
            closed,
            reader,
        };

        tracing::debug!(peer = %conn.peer, "authenticating");
        let auth = conn.authenticate(password).await;
        match auth {
            Ok(()) => {
                tracing::debug!(peer = %conn.peer, "authenticated");
                Ok(conn)
            }
            Err(e) => {
                tracing::debug!(peer = %conn.peer, error = %e, "authentication failed");
                let _ = conn.close().await;
                Err(match e {
                    ClientError::AuthenticationFailed(_) => e,
                    other => ClientError::AuthenticationFailed(other.to_string()),
                })
            }
        }
    }

    async fn authenticate(&self, password: &str) -> Result<(), ClientError> {
        let mut session = self.session.lock().await;

        let request = self.ids.next_packet(PacketKind::Login, password);
        let group = session.round_trip(&request.encode()?, &self.ids).await?;

        // Servers echo the login id on success and answer -1 on a bad password.
        match group.as_slice() {
            [reply] if reply.id == request.id => Ok(()),
            [reply] if reply.id == -1 => Err(ClientError::AuthenticationFailed(
                "invalid password".to_string(),
            )),
            [reply] => Err(ClientError::AuthenticationFailed(format!(
                "response id {} does not match request id {}",
                reply.id, request.id
            ))),
            other => Err(ClientError::AuthenticationFailed(format!(
                "expected 1 response packet, got {}",
                other.len()
            ))),
        }
    }

    /// Sends a command and returns the server's response.
    ///
    /// Fragmented responses are joined in arrival order. Only one command runs
    /// at a time; concurrent callers wait their turn. Any I/O or protocol
    /// failure closes the connection. A command that cannot be encoded is
    /// rejected before anything is written and leaves the connection open.
    pub async fn send_command(&self, command: &str) -> Result<String, ClientError> {
        let mut session = self.session.lock().await;

        if self.is_closed() {
            return Err(ClientError::ConnectionClosed);
        }

        let request = self.ids.next_packet(PacketKind::Command, command);
        let frame = request.encode()?;
        tracing::debug!(peer = %self.peer, id = request.id, bytes = frame.len(), "sending command");

        match session.round_trip(&frame, &self.ids).await {
            Ok(group) => {
                tracing::debug!(
                    peer = %self.peer,
                    id = request.id,
                    fragments = group.len(),
                    "command complete"
                );
                Ok(group.iter().map(|p| p.payload.as_str()).collect())
            }
            Err(e) => {
                tracing::debug!(peer = %self.peer, id = request.id, error = %e, "command failed");
                self.teardown(&mut session).await;
                Err(e)
            }
        }
    }

    /// Returns whether the connection has been closed.
    ///
    /// A connection also closes on its own when the server hangs up or sends
    /// something that cannot be decoded.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Returns the remote address this connection was opened to.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Closes the connection.
    ///
    /// A command waiting for a response fails with
    /// [`ClientError::ConnectionClosed`]. Closing twice is a no-op.
    pub async fn close(&self) -> Result<(), ClientError> {
        tracing::debug!(peer = %self.peer, "closing connection");

        // Stopping the reader closes the channel, which releases a command
        // waiting on it and with it the gate.
        self.closed.store(true, Ordering::SeqCst);
        self.reader.abort();

        let mut session = self.session.lock().await;
        session.shutdown().await;
        Ok(())
    }

    async fn teardown(&self, session: &mut Session) {
        self.closed.store(true, Ordering::SeqCst);
        self.reader.abort();
        session.shutdown().await;
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("peer", &self.peer())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Reads the transport and forwards decoded packets (run as a background task).
///
/// Exits on EOF, read error or decode error, marking the connection closed and
/// passing the error to a waiting command. Dropping the sender on exit closes
/// the channel.
async fn read_loop(
    mut reader: ReadHalf<ClientStream>,
    packets: mpsc::Sender<Delivery>,
    closed: Arc<AtomicBool>,
    peer: String,
    buffer_size: usize,
) {
    tracing::debug!(%peer, "read loop started");

    let result = pump(&mut reader, &packets, &peer, buffer_size).await;
    closed.store(true, Ordering::SeqCst);

    match result {
        Ok(()) => tracing::debug!(%peer, "read loop stopped"),
        Err(ClientError::ConnectionClosed) => {
            tracing::debug!(%peer, "server closed the connection");
            let _ = packets.try_send(Err(ClientError::ConnectionClosed));
        }
        Err(e) => {
            tracing::warn!(%peer, error = %e, "read loop failed");
            let _ = packets.try_send(Err(e));
        }
    }
}

async fn pump(
    reader: &mut ReadHalf<ClientStream>,
    packets: &mpsc::Sender<Delivery>,
    peer: &str,
    buffer_size: usize,
) -> Result<(), ClientError> {
    let mut decoder = Decoder::new();
    let mut buf = vec![0u8; buffer_size];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Err(ClientError::ConnectionClosed);
        }
        tracing::trace!(%peer, bytes = n, "read from socket");

        decoder.extend(&buf[..n]);
        while let Some(packet) = decoder.decode_packet()? {
            tracing::debug!(%peer, id = packet.id, kind = %packet.kind, "packet received");
            if packets.send(Ok(packet)).await.is_err() {
                // Connection dropped.
                return Ok(());
            }
        }
    }
}
