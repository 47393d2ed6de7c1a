//! Plain-text rendering of the two fleet grids.

use crate::board::Board;

/// Render both grids the way the player sees them.
pub fn render_boards(own: &Board, enemy: &Board) -> String {
    format!("\nYOUR BOARD:\n\n{}\nENEMY BOARD:\n\n{}", own, enemy)
}
