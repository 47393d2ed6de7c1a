//! Fleet grids: parsing, validation against the rules, hit tracking.

use std::fmt;
use std::path::Path;

use rand::Rng;

use crate::config::Rules;
use crate::wire::Move;

/// One grid square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Ship,
    Wreck,
    /// Enemy-board squares we have not probed yet.
    Unknown,
}

impl Cell {
    fn glyph(self) -> char {
        match self {
            Cell::Empty => '-',
            Cell::Ship => 'O',
            Cell::Wreck => 'X',
            Cell::Unknown => '?',
        }
    }
}

/// Errors from board parsing, validation and generation.
#[derive(Debug, PartialEq, Eq)]
pub enum BoardError {
    /// Row `row` (1-based) is not exactly `expected` characters long.
    RowLength {
        row: usize,
        len: usize,
        expected: usize,
    },
    /// More rows than the grid allows.
    TooManyRows,
    /// Fewer rows than the grid requires.
    TooFewRows { rows: usize, expected: usize },
    /// A character other than '0' or '1' in row `row` (1-based).
    IllegalCharacter { row: usize, ch: char },
    /// Two ships touch, or a ship bends, at (row, col).
    CollidingShips { row: usize, col: usize },
    /// A ship longer than any size the rules allow.
    ShipTooLong { size: usize },
    /// Census mismatch for ships of length `size`.
    WrongShipCount {
        size: usize,
        expected: u8,
        actual: u8,
    },
    /// Random generation gave up finding a legal layout.
    UnableToPlaceShips,
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::RowLength { row, len, expected } => write!(
                f,
                "row {} is of invalid length {}, must be {}",
                row, len, expected
            ),
            BoardError::TooManyRows => write!(f, "too many rows"),
            BoardError::TooFewRows { rows, expected } => {
                write!(f, "only {} rows, must be {}", rows, expected)
            }
            BoardError::IllegalCharacter { row, ch } => {
                write!(f, "row {} has illegal character {:?}", row, ch)
            }
            BoardError::CollidingShips { row, col } => {
                write!(f, "colliding ships: row {} column {}", row, col)
            }
            BoardError::ShipTooLong { size } => {
                write!(f, "ship of size {} exceeds every allowed length", size)
            }
            BoardError::WrongShipCount {
                size,
                expected,
                actual,
            } => write!(
                f,
                "wrong amount of ships of size {}, must be {}, is {}",
                size, expected, actual
            ),
            BoardError::UnableToPlaceShips => write!(f, "unable to place ships"),
        }
    }
}

impl std::error::Error for BoardError {}

/// A square grid of [`Cell`]s, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: u8,
    cells: Vec<Cell>,
}

impl Board {
    fn filled(size: u8, fill: Cell) -> Self {
        let n = size as usize;
        Self {
            size,
            cells: vec![fill; n * n],
        }
    }

    /// Enemy-tracking board: everything unknown until probed.
    pub fn unknown(rules: &Rules) -> Self {
        Self::filled(rules.board_size, Cell::Unknown)
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn contains(&self, mv: Move) -> bool {
        mv.row < self.size && mv.col < self.size
    }

    pub fn cell(&self, mv: Move) -> Cell {
        self.at(mv.row as usize, mv.col as usize)
    }

    pub fn mark_wreck(&mut self, mv: Move) {
        self.set(mv.row as usize, mv.col as usize, Cell::Wreck);
    }

    /// Resolve a probed square that turned out to hold no ship.
    pub fn mark_empty(&mut self, mv: Move) {
        self.set(mv.row as usize, mv.col as usize, Cell::Empty);
    }

    fn at(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.size as usize + col]
    }

    fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row * self.size as usize + col] = cell;
    }

    /// Parse a fleet grid: `board_size` lines of exactly `board_size`
    /// characters, '1' for a ship cell and '0' for water.
    pub fn parse(text: &str, rules: &Rules) -> Result<Self, BoardError> {
        let size = rules.board_size as usize;
        let mut board = Self::filled(rules.board_size, Cell::Empty);
        let mut rows = 0usize;
        for (row, line) in text.lines().enumerate() {
            if row >= size {
                if line.trim().is_empty() {
                    continue;
                }
                return Err(BoardError::TooManyRows);
            }
            if line.len() != size {
                return Err(BoardError::RowLength {
                    row: row + 1,
                    len: line.len(),
                    expected: size,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                match ch {
                    '1' => board.set(row, col, Cell::Ship),
                    '0' => {}
                    _ => return Err(BoardError::IllegalCharacter { row: row + 1, ch }),
                }
            }
            rows += 1;
        }
        if rows < size {
            return Err(BoardError::TooFewRows {
                rows,
                expected: size,
            });
        }
        Ok(board)
    }

    /// Read, parse and validate a board file.
    pub fn from_file(path: impl AsRef<Path>, rules: &Rules) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let annotate = |msg: String| anyhow::anyhow!("in {}:\n{}", path.display(), msg);
        let text = std::fs::read_to_string(path).map_err(|e| annotate(e.to_string()))?;
        let board = Self::parse(&text, rules).map_err(|e| annotate(e.to_string()))?;
        board.validate(rules).map_err(|e| annotate(e.to_string()))?;
        Ok(board)
    }

    /// Check the collision rule and the fleet census against the rules.
    pub fn validate(&self, rules: &Rules) -> Result<(), BoardError> {
        let n = self.size as usize;
        let mut counts = vec![0u8; rules.ships_per_size.len()];
        for i in 0..n {
            for j in 0..n {
                if self.at(i, j) == Cell::Empty {
                    continue;
                }
                if !self.no_collision(i, j) {
                    return Err(BoardError::CollidingShips { row: i, col: j });
                }
                if self.is_ship_end(i, j) {
                    let len = self.ship_size(i, j);
                    if len > counts.len() {
                        return Err(BoardError::ShipTooLong { size: len });
                    }
                    counts[len - 1] += 1;
                }
            }
        }
        for (idx, (&expected, &actual)) in
            rules.ships_per_size.iter().zip(counts.iter()).enumerate()
        {
            if expected != actual {
                return Err(BoardError::WrongShipCount {
                    size: idx + 1,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    // A filled square may not have filled neighbours both vertically and
    // horizontally; that would mean a bent ship or two ships touching.
    fn no_collision(&self, i: usize, j: usize) -> bool {
        let n = self.size as usize;
        let filled = |r: usize, c: usize| self.at(r, c) != Cell::Empty;
        !((i > 0 && j > 0 && filled(i, j - 1) && filled(i - 1, j))
            || (i > 0 && j < n - 1 && filled(i, j + 1) && filled(i - 1, j))
            || (i < n - 1 && j > 0 && filled(i, j - 1) && filled(i + 1, j))
            || (i < n - 1 && j < n - 1 && filled(i, j + 1) && filled(i + 1, j)))
    }

    // Bottom/right end of a ship: filled, with nothing filled below or to
    // the right. Each ship has exactly one such square.
    fn is_ship_end(&self, i: usize, j: usize) -> bool {
        let n = self.size as usize;
        if self.at(i, j) == Cell::Empty {
            return false;
        }
        if i < n - 1 && self.at(i + 1, j) != Cell::Empty {
            return false;
        }
        if j < n - 1 && self.at(i, j + 1) != Cell::Empty {
            return false;
        }
        true
    }

    // Length of the ship ending at (i, j): walk up if the square above is
    // filled, left otherwise.
    fn ship_size(&self, i: usize, j: usize) -> usize {
        let mut size = 0;
        if i > 0 && self.at(i - 1, j) != Cell::Empty {
            let mut r = i as isize;
            while r >= 0 && self.at(r as usize, j) == Cell::Ship {
                size += 1;
                r -= 1;
            }
        } else {
            let mut c = j as isize;
            while c >= 0 && self.at(i, c as usize) == Cell::Ship {
                size += 1;
                c -= 1;
            }
        }
        size
    }

    /// Generate a layout that passes [`Board::validate`]: straight ships
    /// with at least one clear square around each.
    pub fn random<R: Rng>(rules: &Rules, rng: &mut R) -> Result<Self, BoardError> {
        for _ in 0..100 {
            if let Some(board) = Self::try_random(rules, rng) {
                return Ok(board);
            }
        }
        Err(BoardError::UnableToPlaceShips)
    }

    fn try_random<R: Rng>(rules: &Rules, rng: &mut R) -> Option<Self> {
        let mut board = Self::filled(rules.board_size, Cell::Empty);
        // Longest first; they are the hardest to fit.
        for size in (1..=rules.ships_per_size.len()).rev() {
            for _ in 0..rules.ships_per_size[size - 1] {
                if !board.place_random_ship(size, rng) {
                    return None;
                }
            }
        }
        Some(board)
    }

    fn place_random_ship<R: Rng>(&mut self, len: usize, rng: &mut R) -> bool {
        let n = self.size as usize;
        if len > n {
            return false;
        }
        for _ in 0..200 {
            let horizontal: bool = rng.random();
            let (rows, cols) = if horizontal {
                (n, n - len + 1)
            } else {
                (n - len + 1, n)
            };
            let r = rng.random_range(0..rows);
            let c = rng.random_range(0..cols);
            if self.fits_with_margin(r, c, len, horizontal) {
                for k in 0..len {
                    let (rr, cc) = if horizontal { (r, c + k) } else { (r + k, c) };
                    self.set(rr, cc, Cell::Ship);
                }
                return true;
            }
        }
        false
    }

    fn fits_with_margin(&self, r: usize, c: usize, len: usize, horizontal: bool) -> bool {
        let n = self.size as isize;
        for k in 0..len {
            let (rr, cc) = if horizontal { (r, c + k) } else { (r + k, c) };
            for dr in -1i32..=1 {
                for dc in -1i32..=1 {
                    let nr = rr as isize + dr as isize;
                    let nc = cc as isize + dc as isize;
                    if nr < 0 || nc < 0 || nr >= n || nc >= n {
                        continue;
                    }
                    if self.at(nr as usize, nc as usize) != Cell::Empty {
                        return false;
                    }
                }
            }
        }
        true
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.size as usize;
        for i in 0..n {
            for j in 0..n {
                write!(f, "{}", self.at(i, j).glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
