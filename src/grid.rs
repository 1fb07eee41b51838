//! # Grid
//!
//! Herein are the value types of the puzzle: the [`Alphabet`] of symbols, the
//! target [`EdgeWord`], partially filled [`Grid`]s and their read-only
//! [`ClueGrid`] role, and the fully filled [`Individual`]s that make up a
//! population. Every type is a small `Copy` value, so an operator that
//! produces a new grid never aliases the cells of its inputs.

use std::{
	fmt::{self, Display, Formatter},
	str::FromStr
};

use serde::{Deserialize, Serialize};

use crate::solver::SolverError;

////////////////////////////////////////////////////////////////////////////////
//                                 Geometry.                                  //
////////////////////////////////////////////////////////////////////////////////

/// The number of rows, columns, blocks, and symbols.
pub const SIZE: usize = 4;

/// The side length of a block.
pub const BLOCK: usize = 2;

/// The four corner cells, as `(row, column)` pairs. Corners are never clues,
/// so that an edge word can always be placed without contradicting one.
pub const CORNERS: [(usize, usize); 4] =
	[(0, 0), (0, SIZE - 1), (SIZE - 1, 0), (SIZE - 1, SIZE - 1)];

/// Every unit of the board that must hold distinct symbols: first the 4 rows,
/// then the 4 columns, then the 4 blocks (in row-major block order). Each
/// unit is a list of `(row, column)` coordinates.
pub const UNITS: [[(usize, usize); SIZE]; 3 * SIZE] = units();

/// Compute [`UNITS`].
const fn units() -> [[(usize, usize); SIZE]; 3 * SIZE]
{
	let mut units = [[(0, 0); SIZE]; 3 * SIZE];
	let mut i = 0;
	while i < SIZE
	{
		let mut j = 0;
		while j < SIZE
		{
			units[i][j] = (i, j);
			units[SIZE + i][j] = (j, i);
			units[2 * SIZE + i][j] = (
				(i / BLOCK) * BLOCK + j / BLOCK,
				(i % BLOCK) * BLOCK + j % BLOCK
			);
			j += 1;
		}
		i += 1;
	}
	units
}

/// Check whether the given cell is one of the [corners](CORNERS).
///
/// # Arguments
///
/// * `row` - The row index.
/// * `col` - The column index.
///
/// # Returns
///
/// `true` if the cell is a corner, `false` otherwise.
#[inline]
#[must_use]
pub fn is_corner(row: usize, col: usize) -> bool
{
	CORNERS.contains(&(row, col))
}

/// Count the distinct symbols in a unit.
///
/// # Arguments
///
/// * `symbols` - The symbols of the unit.
///
/// # Returns
///
/// The number of distinct symbols, between 1 and [`SIZE`].
#[must_use]
pub fn distinct(symbols: &[char; SIZE]) -> usize
{
	(0..SIZE)
		.filter(|&i| !symbols[..i].contains(&symbols[i]))
		.count()
}

////////////////////////////////////////////////////////////////////////////////
//                                 Alphabet.                                  //
////////////////////////////////////////////////////////////////////////////////

/// The four distinct symbols of a puzzle. Deserialization checks the symbols
/// just as [`Alphabet::new`] does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[char; SIZE]", into = "[char; SIZE]")]
#[must_use]
pub struct Alphabet([char; SIZE]);

impl Alphabet
{
	/// Construct an alphabet from exactly four symbols.
	///
	/// # Arguments
	///
	/// * `symbols` - The symbols.
	///
	/// # Returns
	///
	/// The alphabet.
	///
	/// # Errors
	///
	/// [`SolverError::InvalidAlphabet`] if the symbols are not distinct.
	pub fn new(symbols: [char; SIZE]) -> Result<Self, SolverError>
	{
		if distinct(&symbols) != SIZE
		{
			return Err(SolverError::InvalidAlphabet(symbols.iter().collect()))
		}
		Ok(Self(symbols))
	}

	/// Get the symbols, in their original order.
	#[inline]
	#[must_use]
	pub fn symbols(&self) -> &[char; SIZE]
	{
		&self.0
	}

	/// Check if the alphabet contains the given symbol.
	#[inline]
	#[must_use]
	pub fn contains(&self, symbol: char) -> bool
	{
		self.0.contains(&symbol)
	}
}

impl TryFrom<[char; SIZE]> for Alphabet
{
	type Error = SolverError;

	fn try_from(symbols: [char; SIZE]) -> Result<Self, Self::Error>
	{
		Self::new(symbols)
	}
}

impl From<Alphabet> for [char; SIZE]
{
	fn from(alphabet: Alphabet) -> Self
	{
		alphabet.0
	}
}

impl FromStr for Alphabet
{
	type Err = SolverError;

	/// Parse an alphabet such as `"WORD"`. Letters are upper-cased.
	fn from_str(s: &str) -> Result<Self, Self::Err>
	{
		let symbols = s.trim().to_uppercase().chars().collect::<Vec<_>>();
		let symbols = <[char; SIZE]>::try_from(symbols)
			.map_err(|_| SolverError::InvalidAlphabet(s.to_string()))?;
		Self::new(symbols)
	}
}

impl Display for Alphabet
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		self.0.iter().try_for_each(|c| write!(f, "{}", c))
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                Edge words.                                 //
////////////////////////////////////////////////////////////////////////////////

/// A sequence of four symbols that must appear, read forward, along one edge
/// of a solution: the top row, the bottom row, the left column, or the right
/// column (columns are read top to bottom).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[must_use]
pub struct EdgeWord([char; SIZE]);

impl EdgeWord
{
	/// Get the symbols of the word.
	#[inline]
	#[must_use]
	pub fn symbols(&self) -> &[char; SIZE]
	{
		&self.0
	}

	/// Check that every symbol of the word belongs to the given alphabet.
	///
	/// # Arguments
	///
	/// * `alphabet` - The alphabet.
	///
	/// # Returns
	///
	/// `true` if the word is spelled with the alphabet, `false` otherwise.
	#[must_use]
	pub fn is_drawn_from(&self, alphabet: &Alphabet) -> bool
	{
		self.0.iter().all(|&c| alphabet.contains(c))
	}

	/// Count the positions at which the word differs from the given sequence.
	///
	/// # Arguments
	///
	/// * `other` - The sequence to compare against.
	///
	/// # Returns
	///
	/// The Hamming distance, between 0 and [`SIZE`].
	#[must_use]
	pub fn hamming(&self, other: &[char; SIZE]) -> usize
	{
		self.0.iter().zip(other.iter()).filter(|(a, b)| a != b).count()
	}
}

impl From<&Alphabet> for EdgeWord
{
	/// The alphabet, read in order, is the conventional target word.
	fn from(alphabet: &Alphabet) -> Self
	{
		Self(alphabet.0)
	}
}

impl FromStr for EdgeWord
{
	type Err = SolverError;

	fn from_str(s: &str) -> Result<Self, Self::Err>
	{
		let symbols = s.trim().to_uppercase().chars().collect::<Vec<_>>();
		<[char; SIZE]>::try_from(symbols)
			.map(Self)
			.map_err(|_| SolverError::InvalidEdgeWord(s.to_string()))
	}
}

impl Display for EdgeWord
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		self.0.iter().try_for_each(|c| write!(f, "{}", c))
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Grids.                                   //
////////////////////////////////////////////////////////////////////////////////

/// A partially filled 4×4 grid. `None` marks an empty cell.
#[derive(
	Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize
)]
#[must_use]
pub struct Grid([[Option<char>; SIZE]; SIZE]);

impl Grid
{
	/// Construct an empty grid. Same as [`Default::default`].
	#[inline]
	pub fn new() -> Self { Self::default() }

	/// Construct a grid from rows of text, where `_` (or `.`) marks an empty
	/// cell and whitespace is ignored, e.g. `["W _ _ _", ...]`.
	///
	/// # Arguments
	///
	/// * `rows` - The rows of the grid.
	///
	/// # Returns
	///
	/// The grid, or `None` if any row does not hold exactly 4 cells.
	pub fn parse(rows: [&str; SIZE]) -> Option<Self>
	{
		let mut grid = Self::new();
		for (r, text) in rows.iter().enumerate()
		{
			let cells = text.chars()
				.filter(|c| !c.is_whitespace())
				.map(|c| match c
				{
					'_' | '.' => None,
					c => Some(c)
				})
				.collect::<Vec<_>>();
			grid.0[r] = cells.try_into().ok()?;
		}
		Some(grid)
	}

	/// Get the content of a cell.
	#[inline]
	#[must_use]
	pub fn get(&self, row: usize, col: usize) -> Option<char>
	{
		self.0[row][col]
	}

	/// Set the content of a cell.
	#[inline]
	pub fn set(&mut self, row: usize, col: usize, value: Option<char>)
	{
		self.0[row][col] = value;
	}

	/// Count the filled cells.
	#[must_use]
	pub fn filled(&self) -> usize
	{
		self.0.iter().flatten().filter(|c| c.is_some()).count()
	}

	/// Check whether `symbol` can be placed at the given cell without
	/// duplicating a symbol already present in the same row, column, or block.
	/// The cell itself is not considered.
	///
	/// # Arguments
	///
	/// * `row` - The row index.
	/// * `col` - The column index.
	/// * `symbol` - The candidate symbol.
	///
	/// # Returns
	///
	/// `true` if the placement is safe, `false` otherwise.
	#[must_use]
	pub fn can_place(&self, row: usize, col: usize, symbol: char) -> bool
	{
		UNITS.iter()
			.filter(|unit| unit.contains(&(row, col)))
			.flat_map(|unit| unit.iter())
			.filter(|&&cell| cell != (row, col))
			.all(|&(r, c)| self.0[r][c] != Some(symbol))
	}

	/// Check that the filled cells, taken alone, repeat no symbol within any
	/// row, column, or block.
	#[must_use]
	pub fn is_consistent(&self) -> bool
	{
		UNITS.iter().all(|unit| {
			let filled = unit.iter()
				.filter_map(|&(r, c)| self.0[r][c])
				.collect::<Vec<_>>();
			(0..filled.len()).all(|i| !filled[..i].contains(&filled[i]))
		})
	}
}

impl Display for Grid
{
	/// Render one line per row, with cells separated by a space and `_` for
	/// empty cells.
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		for row in self.0.iter()
		{
			let line = row.iter()
				.map(|c| c.unwrap_or('_').to_string())
				.collect::<Vec<_>>()
				.join(" ");
			writeln!(f, "{}", line)?;
		}
		Ok(())
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                Clue grids.                                 //
////////////////////////////////////////////////////////////////////////////////

/// The fixed clues of one solver run. A clue grid is created once per run and
/// never mutated thereafter; every individual of the run must agree with it.
#[derive(
	Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize
)]
#[must_use]
pub struct ClueGrid(Grid);

impl ClueGrid
{
	/// Adopt the given grid as a clue grid.
	///
	/// # Arguments
	///
	/// * `grid` - The grid whose filled cells are the clues.
	///
	/// # Returns
	///
	/// The clue grid.
	///
	/// # Errors
	///
	/// [`SolverError::InvalidClueGrid`] if the clues repeat a symbol within a
	/// row, column, or block, or if any corner holds a clue.
	pub fn new(grid: Grid) -> Result<Self, SolverError>
	{
		if !grid.is_consistent()
		{
			return Err(SolverError::InvalidClueGrid("clues repeat a symbol"))
		}
		if CORNERS.iter().any(|&(r, c)| grid.get(r, c).is_some())
		{
			return Err(SolverError::InvalidClueGrid("a corner holds a clue"))
		}
		Ok(Self(grid))
	}

	/// Get the underlying grid.
	#[inline]
	pub fn grid(&self) -> &Grid
	{
		&self.0
	}

	/// Get the clue at the given cell, if any.
	#[inline]
	#[must_use]
	pub fn clue(&self, row: usize, col: usize) -> Option<char>
	{
		self.0.get(row, col)
	}

	/// Check whether the given cell is fixed.
	#[inline]
	#[must_use]
	pub fn is_clue(&self, row: usize, col: usize) -> bool
	{
		self.clue(row, col).is_some()
	}

	/// Count the clues.
	#[inline]
	#[must_use]
	pub fn clue_count(&self) -> usize
	{
		self.0.filled()
	}

	/// Iterate over the clues as `(row, column, symbol)` triples.
	pub fn clues(&self) -> impl Iterator<Item = (usize, usize, char)> + '_
	{
		(0..SIZE).flat_map(move |r| {
			(0..SIZE).filter_map(move |c| self.clue(r, c).map(|s| (r, c, s)))
		})
	}

	/// Get the free column positions of the given row.
	#[must_use]
	pub fn free_columns(&self, row: usize) -> Vec<usize>
	{
		(0..SIZE).filter(|&c| !self.is_clue(row, c)).collect()
	}

	/// Get the free row positions of the given column.
	#[must_use]
	pub fn free_rows(&self, col: usize) -> Vec<usize>
	{
		(0..SIZE).filter(|&r| !self.is_clue(r, col)).collect()
	}
}

impl Display for ClueGrid
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		Display::fmt(&self.0, f)
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                Individuals.                                //
////////////////////////////////////////////////////////////////////////////////

/// A fully filled candidate grid belonging to a population.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[must_use]
pub struct Individual([[char; SIZE]; SIZE]);

impl Individual
{
	/// Construct an individual from its rows.
	#[inline]
	pub fn from_rows(rows: [[char; SIZE]; SIZE]) -> Self
	{
		Self(rows)
	}

	/// Construct an individual from rows of text, ignoring whitespace.
	///
	/// # Returns
	///
	/// The individual, or `None` if any row does not hold exactly 4 symbols.
	pub fn parse(rows: [&str; SIZE]) -> Option<Self>
	{
		let mut cells = [[' '; SIZE]; SIZE];
		for (r, text) in rows.iter().enumerate()
		{
			let row = text.chars()
				.filter(|c| !c.is_whitespace())
				.collect::<Vec<_>>();
			cells[r] = row.try_into().ok()?;
		}
		Some(Self(cells))
	}

	/// Get the symbol at the given cell.
	#[inline]
	#[must_use]
	pub fn get(&self, row: usize, col: usize) -> char
	{
		self.0[row][col]
	}

	/// Set the symbol at the given cell.
	#[inline]
	pub fn set(&mut self, row: usize, col: usize, symbol: char)
	{
		self.0[row][col] = symbol;
	}

	/// Get the rows.
	#[inline]
	#[must_use]
	pub fn rows(&self) -> &[[char; SIZE]; SIZE]
	{
		&self.0
	}

	/// Get a row.
	#[inline]
	#[must_use]
	pub fn row(&self, row: usize) -> [char; SIZE]
	{
		self.0[row]
	}

	/// Get a column, read top to bottom.
	#[inline]
	#[must_use]
	pub fn column(&self, col: usize) -> [char; SIZE]
	{
		[self.0[0][col], self.0[1][col], self.0[2][col], self.0[3][col]]
	}

	/// Get a 2×2 block, in row-major order within the block. Blocks are
	/// numbered row-major too, so block `1` is the top right one.
	#[inline]
	#[must_use]
	pub fn block(&self, block: usize) -> [char; SIZE]
	{
		self.unit(&UNITS[2 * SIZE + block])
	}

	/// Get the symbols of a [unit](UNITS).
	#[inline]
	#[must_use]
	pub fn unit(&self, unit: &[(usize, usize); SIZE]) -> [char; SIZE]
	{
		unit.map(|(r, c)| self.0[r][c])
	}

	/// Get the four edges: top row, bottom row, left column, and right column,
	/// in that order. Columns are read top to bottom.
	#[must_use]
	pub fn edges(&self) -> [[char; SIZE]; 4]
	{
		[
			self.row(0),
			self.row(SIZE - 1),
			self.column(0),
			self.column(SIZE - 1)
		]
	}

	/// Check whether the given word appears exactly along some edge.
	#[must_use]
	pub fn has_edge_word(&self, word: &EdgeWord) -> bool
	{
		self.edges().iter().any(|edge| edge == word.symbols())
	}

	/// Check that no row, column, or block repeats a symbol.
	#[must_use]
	pub fn is_valid(&self) -> bool
	{
		UNITS.iter().all(|unit| distinct(&self.unit(unit)) == SIZE)
	}

	/// Check that the individual agrees with every clue of the given grid.
	#[must_use]
	pub fn respects(&self, clues: &ClueGrid) -> bool
	{
		clues.clues().all(|(r, c, s)| self.0[r][c] == s)
	}
}

impl Display for Individual
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		for row in self.rows().iter()
		{
			let line = row.iter()
				.map(|c| c.to_string())
				.collect::<Vec<_>>()
				.join(" ");
			writeln!(f, "{}", line)?;
		}
		Ok(())
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
