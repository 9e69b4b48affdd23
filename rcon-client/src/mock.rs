//! In-process RCON servers for tests.

use crate::address::RconAddr;
use rcon_protocol::{Decoder, Packet, PacketKind, TERMINAL_RESPONSE};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream};
use tokio::net::TcpListener;

/// Every packet a mock server received, in order.
pub(crate) type ReceivedLog = Arc<Mutex<Vec<Packet>>>;

/// A server that answers requests strictly in order, like a real one.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockServer {
    password: String,
    responses: HashMap<String, Vec<String>>,
    silent: HashSet<String>,
    hang_up_on: HashSet<String>,
    duplicate_login_reply: bool,
}

impl MockServer {
    pub fn new(password: &str) -> Self {
        Self {
            password: password.to_string(),
            ..Self::default()
        }
    }

    /// Answers `command` with one packet per fragment.
    pub fn respond(mut self, command: &str, fragments: &[&str]) -> Self {
        self.responses.insert(
            command.to_string(),
            fragments.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    /// Never answers `command`.
    pub fn silent(mut self, command: &str) -> Self {
        self.silent.insert(command.to_string());
        self
    }

    /// Drops the connection on receiving `command`.
    pub fn hang_up_on(mut self, command: &str) -> Self {
        self.hang_up_on.insert(command.to_string());
        self
    }

    /// Answers a successful login with two packets instead of one.
    pub fn duplicate_login_reply(mut self) -> Self {
        self.duplicate_login_reply = true;
        self
    }

    /// Serves one in-memory connection. Returns the client end.
    pub fn spawn(self) -> (DuplexStream, ReceivedLog) {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let log = ReceivedLog::default();
        tokio::spawn(self.serve(server, log.clone()));
        (client, log)
    }

    /// Serves TCP connections on a loopback port.
    pub async fn listen(self) -> (RconAddr, ReceivedLog) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let log = ReceivedLog::default();

        let accept_log = log.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(self.clone().serve(socket, accept_log.clone()));
            }
        });

        (RconAddr::new("127.0.0.1", port), log)
    }

    async fn serve<S>(self, stream: S, log: ReceivedLog)
    where
        S: AsyncRead + AsyncWrite + Send + Unpin,
    {
        let (mut reader, mut writer) = tokio::io::split(stream);
        let mut decoder = Decoder::new();
        let mut buf = [0u8; 1024];

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            decoder.extend(&buf[..n]);

            while let Ok(Some(packet)) = decoder.decode_packet() {
                log.lock().unwrap().push(packet.clone());

                if packet.kind == PacketKind::Command && self.hang_up_on.contains(&packet.payload) {
                    return;
                }

                for reply in self.replies_to(&packet) {
                    if writer.write_all(&reply.encode().unwrap()).await.is_err() {
                        return;
                    }
                }
            }
        }
    }

    fn replies_to(&self, packet: &Packet) -> Vec<Packet> {
        match packet.kind {
            PacketKind::Login if packet.payload == self.password => {
                let reply = Packet::new(packet.id, PacketKind::Command, "");
                if self.duplicate_login_reply {
                    vec![reply.clone(), reply]
                } else {
                    vec![reply]
                }
            }
            PacketKind::Login => vec![Packet::new(-1, PacketKind::Command, "")],
            PacketKind::Command if self.silent.contains(&packet.payload) => Vec::new(),
            PacketKind::Command => match self.responses.get(&packet.payload) {
                Some(fragments) => fragments
                    .iter()
                    .map(|f| Packet::new(packet.id, PacketKind::Response, f.as_str()))
                    .collect(),
                None => vec![Packet::new(
                    packet.id,
                    PacketKind::Response,
                    format!("Unknown command: {}", packet.payload),
                )],
            },
            PacketKind::Termination => {
                vec![Packet::new(packet.id, PacketKind::Response, TERMINAL_RESPONSE)]
            }
            PacketKind::Response => Vec::new(),
        }
    }
}

/// The server end of a duplex pipe, driven step by step from a test.
pub(crate) struct ScriptedPeer {
    stream: DuplexStream,
    decoder: Decoder,
}

impl ScriptedPeer {
    pub fn new(stream: DuplexStream) -> Self {
        Self {
            stream,
            decoder: Decoder::new(),
        }
    }

    /// Waits for the next packet from the client.
    pub async fn recv(&mut self) -> Packet {
        let mut buf = [0u8; 1024];
        loop {
            if let Some(packet) = self.decoder.decode_packet().unwrap() {
                return packet;
            }
            let n = self.stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed the stream");
            self.decoder.extend(&buf[..n]);
        }
    }

    pub async fn send(&mut self, packet: &Packet) {
        self.send_raw(&packet.encode().unwrap()).await;
    }

    pub async fn send_raw(&mut self, data: &[u8]) {
        self.stream.write_all(data).await.unwrap();
    }

    /// Returns whether the client has closed its end.
    pub async fn is_eof(&mut self) -> bool {
        let mut buf = [0u8; 64];
        matches!(self.stream.read(&mut buf).await, Ok(0))
    }
}
