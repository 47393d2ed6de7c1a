//! Peer-to-peer turn-based battleship: two endpoints exchange attack
//! coordinates and hit/miss verdicts until one fleet is destroyed.
//!
//! The crate is organized around a single [`Transport`] capability with
//! three implementations (TCP stream, UDP datagram with an at-least-once
//! delivery sublayer, and an in-process loopback queue) and the
//! [`Session`] state machine that sequences turns over whichever
//! transport it is handed.

mod board;
mod config;
mod logging;
mod player;
mod session;
pub mod transport;
mod ui;
pub mod wire;

pub use board::{Board, BoardError, Cell};
pub use config::Rules;
pub use logging::init_logging;
pub use player::{CliPlayer, MoveSource, RandomPlayer};
pub use session::{Outcome, Role, Session};
pub use transport::loopback::LoopbackTransport;
pub use transport::tcp::TcpTransport;
pub use transport::udp::UdpTransport;
pub use transport::{Transport, TransportError};
pub use ui::render_boards;
pub use wire::{Frame, Move, DGRAM_FRAME_LEN, FRAME_LEN};
