//! In-process transport: both endpoints share one bounded queue of encoded
//! frames, letting two sessions play each other without any real I/O.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::task::yield_now;
use tokio::time::{timeout, Duration};

use crate::transport::{Transport, TransportError};
use crate::wire::{Frame, FRAME_LEN};

/// Default deadline for a single send or receive.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

// One slot: strict turn alternation never queues more than one frame.
const CAPACITY: usize = 1;

// Frames are tagged with the sender's endpoint id so an endpoint never
// consumes its own message from the shared queue.
type Queue = Arc<Mutex<VecDeque<(u8, [u8; FRAME_LEN])>>>;

pub struct LoopbackTransport {
    queue: Queue,
    me: u8,
    timeout_duration: Duration,
}

impl LoopbackTransport {
    /// Two endpoints over one shared queue.
    pub fn pair() -> (Self, Self) {
        Self::pair_with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn pair_with_timeout(timeout_duration: Duration) -> (Self, Self) {
        let queue: Queue = Arc::new(Mutex::new(VecDeque::new()));
        (
            Self {
                queue: Arc::clone(&queue),
                me: 0,
                timeout_duration,
            },
            Self {
                queue,
                me: 1,
                timeout_duration,
            },
        )
    }
}

#[async_trait::async_trait]
impl Transport for LoopbackTransport {
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        let bytes = frame.encode();
        let push = async {
            loop {
                {
                    let mut queue = self.queue.lock().unwrap();
                    if queue.len() < CAPACITY {
                        queue.push_back((self.me, bytes));
                        return Ok(());
                    }
                }
                if Arc::strong_count(&self.queue) == 1 {
                    return Err(TransportError::Closed);
                }
                yield_now().await;
            }
        };
        timeout(self.timeout_duration, push)
            .await
            .map_err(|_| TransportError::Timeout(self.timeout_duration))?
    }

    async fn recv(&mut self) -> Result<Frame, TransportError> {
        let pop = async {
            loop {
                {
                    let mut queue = self.queue.lock().unwrap();
                    if let Some(&(from, bytes)) = queue.front() {
                        if from != self.me {
                            queue.pop_front();
                            return Frame::decode(&bytes);
                        }
                    }
                }
                if Arc::strong_count(&self.queue) == 1 {
                    return Err(TransportError::Closed);
                }
                yield_now().await;
            }
        };
        timeout(self.timeout_duration, pop)
            .await
            .map_err(|_| TransportError::Timeout(self.timeout_duration))?
    }
}
