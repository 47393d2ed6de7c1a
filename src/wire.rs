//! Fixed-size wire encoding for the move exchange.
//!
//! Reliable transports carry 3-byte frames; the datagram transport appends
//! a sequence index as a fourth byte.

use core::fmt;

use crate::transport::TransportError;

/// Frame length on the stream and loopback transports.
pub const FRAME_LEN: usize = 3;
/// Frame length on the datagram transport (trailing sequence index).
pub const DGRAM_FRAME_LEN: usize = 4;

/// A single attack coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Move {
    pub row: u8,
    pub col: u8,
}

impl Move {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One protocol message: the verdict on the previously received attack.
///
/// `Miss` carries the sender's next target. `Hit` carries no coordinate,
/// because a hit grants the attacker another turn and the sender has
/// nothing to aim yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Hit,
    Miss(Move),
}

impl Frame {
    /// Encode for a reliable transport.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        match self {
            Frame::Hit => [1, 0, 0],
            Frame::Miss(mv) => [0, mv.row, mv.col],
        }
    }

    /// Decode a frame received on a reliable transport. Anything other than
    /// exactly [`FRAME_LEN`] bytes is malformed.
    pub fn decode(buf: &[u8]) -> Result<Self, TransportError> {
        if buf.len() != FRAME_LEN {
            return Err(TransportError::MalformedMessage { len: buf.len() });
        }
        Ok(Self::from_bytes(buf[0], buf[1], buf[2]))
    }

    /// Encode for the datagram transport, tagged with `index`.
    pub fn encode_indexed(&self, index: u8) -> [u8; DGRAM_FRAME_LEN] {
        let base = self.encode();
        [base[0], base[1], base[2], index]
    }

    /// Decode a datagram frame, returning the embedded sequence index.
    pub fn decode_indexed(buf: &[u8]) -> Result<(Self, u8), TransportError> {
        if buf.len() != DGRAM_FRAME_LEN {
            return Err(TransportError::MalformedMessage { len: buf.len() });
        }
        Ok((Self::from_bytes(buf[0], buf[1], buf[2]), buf[3]))
    }

    // A zero tag is a miss; any other value reads as a hit.
    fn from_bytes(tag: u8, row: u8, col: u8) -> Self {
        if tag == 0 {
            Frame::Miss(Move { row, col })
        } else {
            Frame::Hit
        }
    }
}
