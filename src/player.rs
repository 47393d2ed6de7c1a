//! Move selection: the session asks a move source for its next target.

use std::io::{self, BufRead};

use rand::rngs::SmallRng;
use rand::Rng;

use crate::board::{Board, Cell};
use crate::wire::Move;

/// Supplies attack coordinates, one per turn. Implementations must stay
/// within the bounds of the board they are given.
pub trait MoveSource: Send {
    fn next_move(&mut self, enemy: &Board) -> Move;
}

/// Picks a uniformly random square that has not been probed yet.
pub struct RandomPlayer {
    rng: SmallRng,
}

impl RandomPlayer {
    pub fn new(rng: SmallRng) -> Self {
        Self { rng }
    }
}

impl MoveSource for RandomPlayer {
    fn next_move(&mut self, enemy: &Board) -> Move {
        let n = enemy.size();
        for _ in 0..1000 {
            let mv = Move::new(self.rng.random_range(0..n), self.rng.random_range(0..n));
            if enemy.cell(mv) == Cell::Unknown {
                return mv;
            }
        }
        // Nearly everything is probed; fall back to a scan.
        for row in 0..n {
            for col in 0..n {
                let mv = Move::new(row, col);
                if enemy.cell(mv) == Cell::Unknown {
                    return mv;
                }
            }
        }
        Move::new(0, 0)
    }
}

/// Interactive entry: reads `row col` pairs from stdin, re-prompting until
/// the input parses and lands on the board.
pub struct CliPlayer;

impl CliPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CliPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSource for CliPlayer {
    fn next_move(&mut self, enemy: &Board) -> Move {
        let n = enemy.size();
        println!("\nENEMY BOARD:\n\n{}", enemy);
        println!("Please enter your move (row col):");
        let stdin = io::stdin();
        loop {
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => {
                    // stdin is gone; keep the game moving rather than spin
                    println!("Input closed, firing at 0 0.");
                    return Move::new(0, 0);
                }
                Ok(_) => {}
            }
            let mut parts = line.split_whitespace();
            let parsed = match (parts.next(), parts.next(), parts.next()) {
                (Some(r), Some(c), None) => r.parse::<u8>().ok().zip(c.parse::<u8>().ok()),
                _ => None,
            };
            match parsed {
                Some((row, col)) if row < n && col < n => return Move::new(row, col),
                Some(_) => println!(
                    "Both values should be between 0 and {}. Try again:",
                    n - 1
                ),
                None => println!("Invalid input format. Correct format is: \"row col\". Try again:"),
            }
        }
    }
}
