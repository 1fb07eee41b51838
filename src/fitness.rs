//! # Fitness
//!
//! Herein is the constraint evaluator. The fitness of an [`Individual`] is a
//! non-negative score that counts how far it is from a valid, clue-respecting
//! solution; `0` denotes a solution. All functions are pure.

use crate::grid::{distinct, ClueGrid, EdgeWord, Individual, SIZE, UNITS};

/// The penalty for each clue cell that an individual contradicts. It exceeds
/// the largest possible structural score (`12 × 3`) plus the largest edge
/// distance, so a single clue violation outweighs everything else combined.
pub const CLUE_PENALTY: u32 = 10_000;

/// Count the structural violations of an individual: for every row, column,
/// and block, the number of symbols missing from it (`4 − distinct`).
///
/// # Arguments
///
/// * `individual` - The candidate grid.
///
/// # Returns
///
/// The structural violation count. `0` if and only if the individual is
/// [valid](Individual::is_valid).
#[must_use]
pub fn structural_violations(individual: &Individual) -> u32
{
	UNITS.iter()
		.map(|unit| (SIZE - distinct(&individual.unit(unit))) as u32)
		.sum()
}

/// Count the clue cells that an individual contradicts.
#[must_use]
pub fn clue_violations(individual: &Individual, clues: &ClueGrid) -> u32
{
	clues.clues()
		.filter(|&(r, c, s)| individual.get(r, c) != s)
		.count() as u32
}

/// Compute the edge distance: `0` if the word appears exactly on some edge,
/// and otherwise the smallest Hamming distance between the word and any of
/// the four edges.
#[must_use]
pub fn edge_distance(individual: &Individual, word: &EdgeWord) -> u32
{
	individual.edges()
		.iter()
		.map(|edge| word.hamming(edge) as u32)
		.min()
		.unwrap_or(0)
}

/// Score an individual against the clues and, optionally, a target edge word.
///
/// # Arguments
///
/// * `individual` - The candidate grid.
/// * `clues` - The clue grid of the run.
/// * `word` - The target edge word, if any.
///
/// # Returns
///
/// The fitness score. `0` if and only if the individual is valid, respects
/// every clue, and (when `word` is given) shows `word` along some edge.
#[must_use]
pub fn score(
	individual: &Individual,
	clues: &ClueGrid,
	word: Option<&EdgeWord>
) -> u32
{
	let edge = word.map_or(0, |word| edge_distance(individual, word));
	structural_violations(individual)
		+ CLUE_PENALTY * clue_violations(individual, clues)
		+ edge
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test
{
	use crate::{
		fitness::{
			clue_violations, edge_distance, score, structural_violations,
			CLUE_PENALTY
		},
		grid::{ClueGrid, EdgeWord, Grid, Individual}
	};

	fn solution() -> Individual
	{
		Individual::parse(["W O R D", "R D W O", "O W D R", "D R O W"]).unwrap()
	}

	fn clues() -> ClueGrid
	{
		ClueGrid::new(
			Grid::parse(["_ O _ _", "_ _ _ O", "_ _ _ _", "_ _ _ _"]).unwrap()
		).unwrap()
	}

	/// A valid solution that respects the clues scores zero, with or without
	/// an edge word that it shows.
	#[test]
	fn test_zero_score()
	{
		let word: EdgeWord = "WORD".parse().unwrap();
		assert_eq!(score(&solution(), &clues(), None), 0);
		assert_eq!(score(&solution(), &clues(), Some(&word)), 0);
	}

	/// Structural violations count missing symbols per row, column, and block.
	#[test]
	fn test_structural_violations()
	{
		// Every row is a permutation, but every column and block is constant
		// or nearly so.
		let stripes =
			Individual::parse(["W O R D", "W O R D", "W O R D", "W O R D"])
				.unwrap();
		// Rows: 0. Columns: 4 × 3. Blocks: 4 × 2.
		assert_eq!(structural_violations(&stripes), 20);

		let mut swapped = solution();
		swapped.set(0, 0, 'O');
		swapped.set(0, 1, 'W');
		// Row 0 and block 0 stay valid; columns 0 and 1 lose a symbol each.
		assert_eq!(structural_violations(&swapped), 2);
	}

	/// A single clue violation dominates every structural violation.
	#[test]
	fn test_clue_penalty()
	{
		let mut broken = solution();
		broken.set(0, 1, 'W');
		assert_eq!(clue_violations(&broken, &clues()), 1);
		let total = score(&broken, &clues(), None);
		assert!(total >= CLUE_PENALTY);
		assert_eq!(total, CLUE_PENALTY + structural_violations(&broken));
		let worst =
			Individual::parse(["W W W W", "W W W W", "W W W W", "W W W W"])
				.unwrap();
		let word: EdgeWord = "WORD".parse().unwrap();
		let clues = ClueGrid::default();
		assert!(score(&worst, &clues, Some(&word)) < CLUE_PENALTY);
	}

	/// The edge term is the minimum Hamming distance over the four edges.
	#[test]
	fn test_edge_distance()
	{
		let word: EdgeWord = "WORD".parse().unwrap();
		assert_eq!(edge_distance(&solution(), &word), 0);
		// The bottom row spells the word.
		let shifted =
			Individual::parse(["O W D R", "R D W O", "D R O W", "W O R D"])
				.unwrap();
		assert_eq!(edge_distance(&shifted, &word), 0);
		let inner =
			Individual::parse(["R D W O", "W O R D", "O W D R", "D R O W"])
				.unwrap();
		// Top RDWO: 4; bottom DROW: 4; left RWOD: 3; right ODRW: 3.
		assert_eq!(edge_distance(&inner, &word), 3);
		assert_eq!(score(&inner, &ClueGrid::default(), Some(&word)), 3);
		assert_eq!(score(&inner, &ClueGrid::default(), None), 0);
	}
}
