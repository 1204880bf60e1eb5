//! Mark state and line completion.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::instrument;

use super::REQUIRED_LINES;

/// One boolean per grid cell, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkMatrix {
    size: usize,
    marks: Vec<bool>,
}

impl MarkMatrix {
    /// Creates an all-false matrix.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            marks: vec![false; size * size],
        }
    }

    /// Creates a matrix by evaluating `f(row, col)` for every cell.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let marks = (0..size * size).map(|i| f(i / size, i % size)).collect();
        Self { size, marks }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether `(row, col)` is marked. Out of bounds reads as unmarked.
    pub fn is_marked(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.marks[row * self.size + col]
    }

    /// Flips one cell and returns its new value, or `None` when out of bounds.
    pub fn toggle(&mut self, row: usize, col: usize) -> Option<bool> {
        if row >= self.size || col >= self.size {
            return None;
        }
        let cell = &mut self.marks[row * self.size + col];
        *cell = !*cell;
        Some(*cell)
    }

    /// Number of marked cells.
    pub fn marked_count(&self) -> usize {
        self.marks.iter().filter(|m| **m).count()
    }
}

/// Direction of a scoring line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum LineKind {
    /// Left to right.
    Row,
    /// Top to bottom.
    Column,
    /// Index 0 runs top-left to bottom-right, index 1 top-right to bottom-left.
    Diagonal,
}

/// A single row, column, or diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    /// Direction.
    pub kind: LineKind,
    /// Row or column number, or diagonal number (0 or 1).
    pub index: usize,
}

impl Line {
    /// Cells `(row, col)` covered by this line on a `size x size` card.
    pub fn cells(self, size: usize) -> impl Iterator<Item = (usize, usize)> {
        (0..size).map(move |i| match (self.kind, self.index) {
            (LineKind::Row, r) => (r, i),
            (LineKind::Column, c) => (i, c),
            (LineKind::Diagonal, 0) => (i, i),
            (LineKind::Diagonal, _) => (i, size - 1 - i),
        })
    }

    /// Every line on a `size x size` card: `size` rows, `size` columns, 2 diagonals.
    pub fn all(size: usize) -> impl Iterator<Item = Line> {
        LineKind::iter().flat_map(move |kind| {
            let count = match kind {
                LineKind::Row | LineKind::Column => size,
                LineKind::Diagonal => 2,
            };
            (0..count).map(move |index| Line { kind, index })
        })
    }
}

/// Lines whose every cell is marked.
#[instrument(skip(marks), fields(size = marks.size()))]
pub fn completed_lines(marks: &MarkMatrix) -> Vec<Line> {
    let size = marks.size();
    if size == 0 {
        return Vec::new();
    }
    Line::all(size)
        .filter(|line| line.cells(size).all(|(r, c)| marks.is_marked(r, c)))
        .collect()
}

/// Counts completed rows, columns, and diagonals. A full 4x4 card scores 10.
pub fn count_completed_lines(marks: &MarkMatrix) -> usize {
    completed_lines(marks).len()
}

/// Whether `lines` reaches the bingo threshold.
pub fn is_win(lines: usize) -> bool {
    lines >= REQUIRED_LINES
}
