//! # Clue generator
//!
//! Herein is the construction of the [`ClueGrid`] for a solver run: a few
//! symbols scattered at random over the board such that, taken alone, they
//! repeat no symbol within any row, column, or block.

use log::trace;
use rand::{seq::SliceRandom, Rng};

use crate::{
	grid::{is_corner, Alphabet, ClueGrid, Grid, CORNERS, SIZE},
	solver::SolverError
};

/// The number of placement attempts allowed before generation gives up. Every
/// attempt consumes budget, whether or not its placement is accepted.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 200;

/// The largest number of clues that a board can hold once the corners are
/// reserved.
pub const MAX_CLUES: usize = SIZE * SIZE - CORNERS.len();

/// Generate a clue grid with exactly `clue_count` clues. Each attempt picks a
/// uniformly random empty non-corner cell and a uniformly random symbol, and
/// keeps the placement only if it duplicates no clue already placed in the
/// same row, column, or block. The corners are cleared at the end, so that
/// an edge word can always be placed.
///
/// # Arguments
///
/// * `alphabet` - The symbols of the puzzle.
/// * `clue_count` - The number of clues to place.
/// * `rng` - The random source.
///
/// # Returns
///
/// The clue grid.
///
/// # Errors
///
/// * [`SolverError::InvalidClueCount`] if `clue_count` exceeds
///   [`MAX_CLUES`].
/// * [`SolverError::ClueGenerationInfeasible`] if the attempt budget is
///   exhausted before every clue is placed.
pub fn generate<R: Rng + ?Sized>(
	alphabet: &Alphabet,
	clue_count: usize,
	rng: &mut R
) -> Result<ClueGrid, SolverError>
{
	if clue_count > MAX_CLUES
	{
		return Err(SolverError::InvalidClueCount {
			requested: clue_count,
			maximum: MAX_CLUES
		})
	}
	let mut grid = Grid::new();
	let mut placed = 0;
	let mut attempts = 0;
	while placed < clue_count && attempts < MAX_PLACEMENT_ATTEMPTS
	{
		attempts += 1;
		let empty = (0..SIZE * SIZE)
			.map(|i| (i / SIZE, i % SIZE))
			.filter(|&(r, c)| !is_corner(r, c) && grid.get(r, c).is_none())
			.collect::<Vec<_>>();
		// `clue_count <= MAX_CLUES` guarantees an empty cell while placing.
		let Some(&(row, col)) = empty.choose(rng) else { break };
		let symbol = alphabet.symbols()[rng.gen_range(0..SIZE)];
		if grid.can_place(row, col, symbol)
		{
			trace!("clue {} at ({}, {})", symbol, row, col);
			grid.set(row, col, Some(symbol));
			placed += 1;
		}
	}
	if placed < clue_count
	{
		return Err(SolverError::ClueGenerationInfeasible {
			placed,
			requested: clue_count
		})
	}
	for &(r, c) in CORNERS.iter()
	{
		grid.set(r, c, None);
	}
	ClueGrid::new(grid)
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
