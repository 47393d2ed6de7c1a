//! The polymorphic send/receive capability connecting two peers.

use core::fmt;
use std::time::Duration;

use crate::wire::Frame;

pub mod loopback;
pub mod tcp;
pub mod udp;

/// One peer-to-peer connection. Implementations deliver whole frames or
/// fail with a [`TransportError`]; partial delivery never reaches callers.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError>;
    async fn recv(&mut self) -> Result<Frame, TransportError>;
}

/// Errors surfaced by transports. All of them are fatal to the session.
///
/// Stale or duplicated datagrams are absorbed inside the datagram
/// transport and never appear here.
#[derive(Debug)]
pub enum TransportError {
    /// No progress within the configured deadline.
    Timeout(Duration),
    /// Received a payload of the wrong length.
    MalformedMessage { len: usize },
    /// Partial read or write on a transport assumed reliable.
    Corrupted,
    /// The peer endpoint is gone.
    Closed,
    /// Unclassified socket failure.
    Io(std::io::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout(d) => write!(f, "no progress within {:?}", d),
            TransportError::MalformedMessage { len } => {
                write!(f, "malformed message of {} bytes", len)
            }
            TransportError::Corrupted => write!(f, "partial transfer on reliable transport"),
            TransportError::Closed => write!(f, "peer endpoint closed"),
            TransportError::Io(err) => write!(f, "socket error: {}", err),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Io(err) => Some(err),
            _ => None,
        }
    }
}
