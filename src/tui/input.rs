//! Keyboard navigation helpers.

use crossterm::event::KeyCode;

/// Moves a `(row, col)` cursor on a `size x size` card. Stops at the edges.
pub fn move_cursor(cursor: (usize, usize), key: KeyCode, size: usize) -> (usize, usize) {
    let (row, col) = cursor;
    let last = size.saturating_sub(1);

    match key {
        KeyCode::Up | KeyCode::Char('k') => (row.saturating_sub(1), col),
        KeyCode::Down | KeyCode::Char('j') => ((row + 1).min(last), col),
        KeyCode::Left | KeyCode::Char('h') => (row, col.saturating_sub(1)),
        KeyCode::Right | KeyCode::Char('l') => (row, (col + 1).min(last)),
        _ => cursor,
    }
}

/// Moves a list selection, wrapping at both ends.
pub fn move_selection(index: usize, key: KeyCode, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    match key {
        KeyCode::Up | KeyCode::Char('k') => {
            if index == 0 {
                len - 1
            } else {
                index - 1
            }
        }
        KeyCode::Down | KeyCode::Char('j') => (index + 1) % len,
        _ => index.min(len - 1),
    }
}
