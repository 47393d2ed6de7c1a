//! Datagram transport with an at-least-once delivery sublayer.
//!
//! Every logical exchange carries a sequence index. `send` hands the packet
//! to a background task that keeps retransmitting it on a cooldown until
//! the shared exchange counter moves past the packet's index, which happens
//! when a later `recv` (or `send`) on this transport advances the counter.
//! The counter is the only shared state; there is no explicit cancellation
//! signal, the task observes the counter and exits on its own.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout, Duration, Instant};

use crate::transport::{Transport, TransportError};
use crate::wire::Frame;

/// Default total deadline for one logical receive.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
/// Default interval between retransmissions of an unacknowledged frame.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(2);

/// Pause before re-reading after discarding a stale or runt datagram.
const DISCARD_BACKOFF: Duration = Duration::from_millis(10);

pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    index: Arc<AtomicU64>,
    timeout_duration: Duration,
    cooldown: Duration,
}

impl UdpTransport {
    /// Wrap a socket already `connect`ed to the peer.
    pub fn new(socket: UdpSocket) -> Self {
        Self::with_config(socket, DEFAULT_TIMEOUT, DEFAULT_COOLDOWN)
    }

    pub fn with_config(socket: UdpSocket, timeout_duration: Duration, cooldown: Duration) -> Self {
        Self {
            socket: Arc::new(socket),
            index: Arc::new(AtomicU64::new(0)),
            timeout_duration,
            cooldown,
        }
    }

    /// Current value of the exchange counter. Advances by one for every
    /// send and every accepted datagram, never regresses.
    pub fn exchanges(&self) -> u64 {
        self.index.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Transport for UdpTransport {
    /// Returns as soon as the retransmitter is launched; the acknowledgment
    /// is implicit in the peer's next reply, not a separate message.
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        let seq = self.index.fetch_add(1, Ordering::SeqCst) + 1;
        let packet = frame.encode_indexed((seq & 0xff) as u8);
        let socket = Arc::clone(&self.socket);
        let index = Arc::clone(&self.index);
        let cooldown = self.cooldown;
        tokio::spawn(async move {
            // Re-send until the counter advances past this exchange. A send
            // failure is not fatal here, the next tick retries anyway.
            while index.load(Ordering::SeqCst) == seq {
                if let Err(err) = socket.send(&packet).await {
                    log::warn!("retransmit of exchange {} failed: {}", seq, err);
                }
                sleep(cooldown).await;
            }
        });
        Ok(())
    }

    async fn recv(&mut self) -> Result<Frame, TransportError> {
        let deadline = Instant::now() + self.timeout_duration;
        // Oversized on purpose so a wrong-length datagram is measurable
        // rather than silently truncated to the frame size.
        let mut buf = [0u8; 64];
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(TransportError::Timeout(self.timeout_duration));
            }
            let n = match timeout(deadline - now, self.socket.recv(&mut buf)).await {
                Ok(Ok(n)) => n,
                Ok(Err(err)) => return Err(TransportError::Io(err)),
                Err(_) => return Err(TransportError::Timeout(self.timeout_duration)),
            };
            let expected = (self.index.load(Ordering::SeqCst).wrapping_add(1) & 0xff) as u8;
            let (frame, seq) = match Frame::decode_indexed(&buf[..n]) {
                Ok(decoded) => decoded,
                Err(_) => {
                    sleep(DISCARD_BACKOFF).await;
                    continue;
                }
            };
            if seq != expected {
                // Duplicate or retransmission from a finished exchange.
                log::debug!("discarding datagram with index {}, expected {}", seq, expected);
                sleep(DISCARD_BACKOFF).await;
                continue;
            }
            // Accepting the datagram completes the exchange: the counter
            // move also stops our previous send's retransmitter and sets
            // the index the next receive will insist on.
            self.index.fetch_add(1, Ordering::SeqCst);
            return Ok(frame);
        }
    }
}
