//! Server address parsing.
//!
//! Accepts `rcon://host:port`, `rcon://host`, `host:port` and `host`. The port
//! defaults to [`DEFAULT_PORT`] when omitted. IPv6 literals with a port must
//! be bracketed (`[::1]:25575`).

use crate::error::ClientError;
use rcon_protocol::{DEFAULT_PORT, URI_SCHEME};
use std::fmt;
use std::str::FromStr;

/// Host and port of an RCON server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RconAddr {
    pub host: String,
    pub port: u16,
}

impl RconAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl FromStr for RconAddr {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let authority = match s.split_once("://") {
            Some((scheme, rest)) => {
                if !scheme.eq_ignore_ascii_case(URI_SCHEME) {
                    return Err(ClientError::InvalidAddress(format!(
                        "unsupported scheme '{}'",
                        scheme
                    )));
                }
                rest.trim_end_matches('/')
            }
            None => s,
        };

        let (host, port) = split_host_port(authority)?;
        if host.is_empty() {
            return Err(ClientError::InvalidAddress(format!("missing host in '{}'", s)));
        }

        let port = match port {
            Some(p) => p
                .parse()
                .map_err(|_| ClientError::InvalidAddress(format!("invalid port '{}'", p)))?,
            None => DEFAULT_PORT,
        };

        Ok(Self::new(host, port))
    }
}

fn split_host_port(authority: &str) -> Result<(&str, Option<&str>), ClientError> {
    if let Some(rest) = authority.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(|| {
            ClientError::InvalidAddress(format!("unterminated '[' in '{}'", authority))
        })?;
        return match tail {
            "" => Ok((host, None)),
            _ => match tail.strip_prefix(':') {
                Some(port) => Ok((host, Some(port))),
                None => Err(ClientError::InvalidAddress(format!(
                    "unexpected '{}' after host",
                    tail
                ))),
            },
        };
    }

    match authority.rsplit_once(':') {
        // A bare IPv6 literal has several colons and no port.
        Some((host, _)) if host.contains(':') => Ok((authority, None)),
        Some((host, port)) => Ok((host, Some(port))),
        None => Ok((authority, None)),
    }
}

impl fmt::Display for RconAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
