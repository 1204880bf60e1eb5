//! Card construction and line scoring for word bingo.

mod grid;
mod marks;

pub use grid::{Grid, InsufficientPoolError, generate_grid};
pub use marks::{Line, LineKind, MarkMatrix, completed_lines, count_completed_lines, is_win};

/// Side length of every card.
pub const GRID_SIZE: usize = 4;

/// Completed lines needed to call bingo.
pub const REQUIRED_LINES: usize = 3;
