//! Match rules, passed explicitly to boards and sessions at construction.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Rule set for one match. Both peers must agree on it out of band; the
/// protocol itself never carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    /// Side length of the square grid.
    pub board_size: u8,
    /// Total ship cells, which is also the starting health of each fleet.
    pub max_health: u16,
    /// `ships_per_size[i]` is the number of ships of length `i + 1`.
    pub ships_per_size: Vec<u8>,
}

impl Default for Rules {
    /// The classic rule set: 10x10 grid, fleets of four singles, three
    /// two-deckers, two three-deckers and one four-decker.
    fn default() -> Self {
        Self {
            board_size: 10,
            max_health: 20,
            ships_per_size: vec![4, 3, 2, 1],
        }
    }
}

impl Rules {
    /// Load rules from a JSON file and sanity-check them.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("in {}: {}", path.display(), err))?;
        let rules: Rules = serde_json::from_str(&text)
            .map_err(|err| anyhow::anyhow!("in {}: {}", path.display(), err))?;
        rules.check()?;
        Ok(rules)
    }

    /// Total cells the declared fleet occupies.
    pub fn fleet_cells(&self) -> u16 {
        self.ships_per_size
            .iter()
            .enumerate()
            .map(|(i, &n)| (i as u16 + 1) * n as u16)
            .sum()
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.board_size == 0 {
            anyhow::bail!("board size must be positive");
        }
        if self.ships_per_size.len() > self.board_size as usize {
            anyhow::bail!("a ship cannot be longer than the board");
        }
        let cells = self.fleet_cells();
        if cells != self.max_health {
            anyhow::bail!(
                "fleet occupies {} cells but max health is {}",
                cells,
                self.max_health
            );
        }
        Ok(())
    }
}
