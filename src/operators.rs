//! # Population operators
//!
//! Herein are the genetic operators: population initialization, tournament
//! selection, crossover, and mutation. Every operator takes its random source
//! explicitly and returns fresh values, and every operator preserves the clues
//! of the run: an individual that leaves an operator agrees with the
//! [`ClueGrid`] on every fixed cell.

use rand::{
	seq::{index, SliceRandom},
	Rng
};

use crate::grid::{Alphabet, ClueGrid, Individual, SIZE};

/// The number of contestants drawn for each tournament.
pub const TOURNAMENT_SIZE: usize = 3;

/// A population is an ordered sequence of individuals. The order is only used
/// for indexed access.
pub type Population = Vec<Individual>;

/// Create a population of `size` individuals. Each row of each individual
/// keeps its clues and fills its free cells with a random permutation of the
/// symbols not already fixed in that row. Rows are therefore always valid,
/// while columns and blocks may repeat symbols.
///
/// # Arguments
///
/// * `size` - The number of individuals.
/// * `alphabet` - The symbols of the puzzle.
/// * `clues` - The clue grid.
/// * `rng` - The random source.
///
/// # Returns
///
/// The initial population.
pub fn initialize<R: Rng + ?Sized>(
	size: usize,
	alphabet: &Alphabet,
	clues: &ClueGrid,
	rng: &mut R
) -> Population
{
	(0..size).map(|_| random_individual(alphabet, clues, rng)).collect()
}

/// Create one individual for [`initialize`].
fn random_individual<R: Rng + ?Sized>(
	alphabet: &Alphabet,
	clues: &ClueGrid,
	rng: &mut R
) -> Individual
{
	let mut rows = [[' '; SIZE]; SIZE];
	for (r, row) in rows.iter_mut().enumerate()
	{
		let mut remaining = alphabet.symbols()
			.iter()
			.copied()
			.filter(|&s| (0..SIZE).all(|c| clues.clue(r, c) != Some(s)))
			.collect::<Vec<_>>();
		remaining.shuffle(rng);
		let mut remaining = remaining.into_iter();
		for (c, cell) in row.iter_mut().enumerate()
		{
			// A consistent clue grid never repeats a symbol within a row, so
			// there are exactly as many remaining symbols as free cells.
			*cell = match clues.clue(r, c)
			{
				Some(clue) => clue,
				None => remaining.next().unwrap_or(alphabet.symbols()[0])
			};
		}
	}
	Individual::from_rows(rows)
}

/// Select a parent by tournament: draw [`TOURNAMENT_SIZE`] indices uniformly
/// at random, with replacement, and answer the contestant with the lowest
/// score. Ties go to the contestant drawn first.
///
/// # Arguments
///
/// * `population` - The current population. Must not be empty.
/// * `scores` - The fitness scores, parallel to `population`.
/// * `rng` - The random source.
///
/// # Returns
///
/// A copy of the winning individual.
pub fn select<R: Rng + ?Sized>(
	population: &[Individual],
	scores: &[u32],
	rng: &mut R
) -> Individual
{
	debug_assert_eq!(population.len(), scores.len());
	let mut best = rng.gen_range(0..population.len());
	for _ in 1..TOURNAMENT_SIZE
	{
		let candidate = rng.gen_range(0..population.len());
		if scores[candidate] < scores[best]
		{
			best = candidate;
		}
	}
	population[best]
}

/// Recombine two parents by a single cut. With even odds, the cut is either
/// horizontal (rows above the cut come from `first`, the rest from `second`)
/// or vertical (columns left of the cut come from `first`, the rest from
/// `second`). The cut falls uniformly after the first, second, or third line.
/// Finally every clue is written back into the child.
///
/// # Arguments
///
/// * `first` - The first parent.
/// * `second` - The second parent.
/// * `clues` - The clue grid.
/// * `rng` - The random source.
///
/// # Returns
///
/// The child.
pub fn crossover<R: Rng + ?Sized>(
	first: &Individual,
	second: &Individual,
	clues: &ClueGrid,
	rng: &mut R
) -> Individual
{
	let by_rows = rng.gen_bool(0.5);
	let cut = rng.gen_range(1..SIZE);
	let mut child = *second;
	for r in 0..SIZE
	{
		for c in 0..SIZE
		{
			let from_first = if by_rows { r < cut } else { c < cut };
			if from_first
			{
				child.set(r, c, first.get(r, c));
			}
		}
	}
	for (r, c, clue) in clues.clues()
	{
		child.set(r, c, clue);
	}
	child
}

/// Swap two free cells of one line. With even odds, the line is a uniformly
/// random row or a uniformly random column; two distinct free positions of
/// that line are chosen uniformly and their symbols exchanged. If the line has
/// fewer than two free positions, the individual is returned unchanged. Clue
/// cells are never candidates, so clues are never touched.
///
/// # Arguments
///
/// * `individual` - The individual to mutate.
/// * `clues` - The clue grid.
/// * `rng` - The random source.
///
/// # Returns
///
/// The mutant.
pub fn mutate<R: Rng + ?Sized>(
	individual: &Individual,
	clues: &ClueGrid,
	rng: &mut R
) -> Individual
{
	let by_row = rng.gen_bool(0.5);
	let line = rng.gen_range(0..SIZE);
	let free = if by_row
	{
		clues.free_columns(line)
	}
	else
	{
		clues.free_rows(line)
	};
	if free.len() < 2
	{
		return *individual
	}
	let picks = index::sample(rng, free.len(), 2);
	let (a, b) = (free[picks.index(0)], free[picks.index(1)]);
	let (first, second) = if by_row
	{
		((line, a), (line, b))
	}
	else
	{
		((a, line), (b, line))
	};
	let mut mutant = *individual;
	mutant.set(first.0, first.1, individual.get(second.0, second.1));
	mutant.set(second.0, second.1, individual.get(first.0, first.1));
	mutant
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
