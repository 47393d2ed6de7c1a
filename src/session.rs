//! The turn-sequencing state machine driving one side of a match.

use crate::board::{Board, Cell};
use crate::config::Rules;
use crate::player::MoveSource;
use crate::transport::Transport;
use crate::wire::{Frame, Move};

/// Which side of the rendezvous this session plays. The guest fires first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Guest,
}

/// Terminal result of a session. After any of these the session performs
/// no further protocol I/O.
#[derive(Debug)]
pub enum Outcome {
    Won,
    Lost,
    Aborted(anyhow::Error),
}

/// Non-terminal protocol states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Guest only: the opening shot, sent before anything is received.
    AwaitingFirstMove,
    /// Waiting for the peer's verdict or attack.
    AwaitingPeerMessage,
    /// The peer missed our fleet; the turn is ours.
    TakingTurn,
    /// Our last shot hit, which grants us another shot immediately. Kept
    /// separate from `TakingTurn` so the hit-grants-another-turn rule reads
    /// off the state machine instead of hiding in a fallthrough.
    AttackingAgain,
}

pub struct Session {
    own_board: Board,
    enemy_board: Board,
    own_health: u16,
    enemy_health: u16,
    /// Our outstanding attack, settled by the peer's next verdict.
    pending: Option<Move>,
    moves_made: u32,
    transport: Box<dyn Transport>,
    mover: Box<dyn MoveSource>,
    role: Role,
}

impl Session {
    pub fn new(
        rules: &Rules,
        own_board: Board,
        transport: Box<dyn Transport>,
        mover: Box<dyn MoveSource>,
        role: Role,
    ) -> Self {
        Self {
            own_board,
            enemy_board: Board::unknown(rules),
            own_health: rules.max_health,
            enemy_health: rules.max_health,
            pending: None,
            moves_made: 0,
            transport,
            mover,
            role,
        }
    }

    pub fn own_health(&self) -> u16 {
        self.own_health
    }

    pub fn enemy_health(&self) -> u16 {
        self.enemy_health
    }

    pub fn moves_made(&self) -> u32 {
        self.moves_made
    }

    /// Own fleet and the enemy fleet as known so far.
    pub fn boards(&self) -> (&Board, &Board) {
        (&self.own_board, &self.enemy_board)
    }

    /// Drive the match to its end. Terminates only in [`Outcome::Won`],
    /// [`Outcome::Lost`] or [`Outcome::Aborted`]; transport failures are
    /// never retried at this level.
    pub async fn run(&mut self) -> Outcome {
        let mut state = match self.role {
            Role::Guest => State::AwaitingFirstMove,
            Role::Host => State::AwaitingPeerMessage,
        };
        loop {
            let step = match state {
                State::AwaitingFirstMove | State::TakingTurn | State::AttackingAgain => {
                    self.fire_next_shot().await
                }
                State::AwaitingPeerMessage => self.handle_peer_message().await,
            };
            match step {
                Ok(next) => state = next,
                Err(outcome) => return outcome,
            }
        }
    }

    /// Choose a target, remember it, and send it inside a MISS envelope:
    /// the sender cannot know the verdict yet, the peer replies with it.
    async fn fire_next_shot(&mut self) -> Result<State, Outcome> {
        let mv = self.mover.next_move(&self.enemy_board);
        self.pending = Some(mv);
        self.moves_made += 1;
        log::info!("firing at {}", mv);
        if let Err(err) = self.transport.send(Frame::Miss(mv)).await {
            return Err(Outcome::Aborted(err.into()));
        }
        Ok(State::AwaitingPeerMessage)
    }

    async fn handle_peer_message(&mut self) -> Result<State, Outcome> {
        let frame = match self.transport.recv().await {
            Ok(frame) => frame,
            Err(err) => return Err(Outcome::Aborted(err.into())),
        };
        match frame {
            Frame::Miss(theirs) => self.on_peer_attack(theirs).await,
            Frame::Hit => self.on_hit_confirmed(),
        }
    }

    /// A MISS envelope settles our outstanding shot (it missed) and carries
    /// the peer's attack on our own fleet.
    async fn on_peer_attack(&mut self, theirs: Move) -> Result<State, Outcome> {
        if let Some(prev) = self.pending.take() {
            self.enemy_board.mark_empty(prev);
        }
        if !self.own_board.contains(theirs) {
            return Err(Outcome::Aborted(anyhow::anyhow!(
                "peer attack {} is off the board",
                theirs
            )));
        }
        if self.own_board.cell(theirs) == Cell::Ship {
            self.own_board.mark_wreck(theirs);
            self.own_health = self.own_health.saturating_sub(1);
            log::info!(
                "opponent hit our ship at {} and moves again; our health {}",
                theirs,
                self.own_health
            );
            self.report();
            if let Err(err) = self.transport.send(Frame::Hit).await {
                return Err(Outcome::Aborted(err.into()));
            }
            if self.own_health == 0 {
                return Err(Outcome::Lost);
            }
            // The hit reply grants the peer another turn; we keep waiting.
            Ok(State::AwaitingPeerMessage)
        } else {
            log::info!("opponent missed at {}", theirs);
            self.report();
            Ok(State::TakingTurn)
        }
    }

    /// HIT verdict for our outstanding shot: record the wreck and attack
    /// again without waiting for another inbound message.
    fn on_hit_confirmed(&mut self) -> Result<State, Outcome> {
        let Some(prev) = self.pending.take() else {
            return Err(Outcome::Aborted(anyhow::anyhow!(
                "peer confirmed a hit but no shot of ours is outstanding"
            )));
        };
        self.enemy_board.mark_wreck(prev);
        self.enemy_health = self.enemy_health.saturating_sub(1);
        log::info!(
            "we hit an enemy ship at {} and move again; enemy health {}",
            prev,
            self.enemy_health
        );
        self.report();
        if self.enemy_health == 0 {
            return Err(Outcome::Won);
        }
        Ok(State::AttackingAgain)
    }

    fn report(&self) {
        log::debug!("own board:\n{}", self.own_board);
        log::debug!("known enemy board:\n{}", self.enemy_board);
    }
}
