//! Random grid generation from a word pool.

use derive_more::{Display, Error};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// The pool holds fewer words than the card has cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Not enough words for a card (required: {required}, provided: {provided})")]
pub struct InsufficientPoolError {
    /// Cells on the card (`size * size`).
    pub required: usize,
    /// Words in the pool.
    pub provided: usize,
}

/// An immutable `size x size` arrangement of words.
///
/// Cells are stored row-major. A grid is never edited in place; a new card
/// means a new `Grid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<String>,
}

impl Grid {
    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Word at `(row, col)`, if in bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.cells.get(row * self.size + col).map(String::as_str)
    }

    /// Iterates over rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        // chunks(0) panics, an empty grid has no rows anyway
        self.cells.chunks(self.size.max(1))
    }

    /// All words in row-major order.
    pub fn words(&self) -> &[String] {
        &self.cells
    }
}

/// Builds a card by shuffling the whole pool and laying the first
/// `size * size` words out row by row.
///
/// The shuffle is an unbiased Fisher-Yates pass, so both the chosen subset
/// and its placement are uniform.
///
/// # Errors
///
/// Returns [`InsufficientPoolError`] when `pool` has fewer than
/// `size * size` words.
#[instrument(skip(pool, rng), fields(pool_len = pool.len()))]
pub fn generate_grid<R: Rng + ?Sized>(
    pool: &[String],
    size: usize,
    rng: &mut R,
) -> Result<Grid, InsufficientPoolError> {
    let required = size * size;
    if pool.len() < required {
        warn!(required, provided = pool.len(), "Word pool too small");
        return Err(InsufficientPoolError {
            required,
            provided: pool.len(),
        });
    }

    let mut shuffled: Vec<&String> = pool.iter().collect();
    shuffled.shuffle(rng);

    let cells: Vec<String> = shuffled.into_iter().take(required).cloned().collect();
    debug!(size, "Generated grid");

    Ok(Grid { size, cells })
}
