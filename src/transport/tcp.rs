//! Reliable, ordered transport over a TCP stream.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::transport::{Transport, TransportError};
use crate::wire::{Frame, FRAME_LEN};

/// Default deadline for a single send or receive.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub struct TcpTransport {
    stream: TcpStream,
    timeout_duration: Duration,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_timeout(stream, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(stream: TcpStream, timeout_duration: Duration) -> Self {
        Self {
            stream,
            timeout_duration,
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await.map_err(TransportError::Io)?;
        Ok(Self::new(stream))
    }
}

// The stream is assumed reliable and ordered, so a short transfer means the
// connection itself is broken; it is fatal, never retried.
fn classify(err: std::io::Error) -> TransportError {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::UnexpectedEof | ErrorKind::WriteZero => TransportError::Corrupted,
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset => TransportError::Closed,
        _ => TransportError::Io(err),
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        let bytes = frame.encode();
        timeout(self.timeout_duration, self.stream.write_all(&bytes))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout_duration))?
            .map_err(classify)
    }

    async fn recv(&mut self) -> Result<Frame, TransportError> {
        let mut buf = [0u8; FRAME_LEN];
        timeout(self.timeout_duration, self.stream.read_exact(&mut buf))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout_duration))?
            .map_err(classify)?;
        Frame::decode(&buf)
    }
}
