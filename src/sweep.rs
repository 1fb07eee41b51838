//! # Sweep
//!
//! Herein is the parameter sweep: the solver is run many times for every
//! combination of population size and mutation rate, and the outcomes of each
//! combination are aggregated into a [`SweepResult`]. Trial `t` of every cell
//! is seeded with `t`, so a sweep is reproducible. Trials share nothing, so in
//! parallel mode they run on the [`rayon`] pool; their outcomes are collected
//! in trial order and only then reduced.

use std::fmt::{self, Display, Formatter};

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
	grid::{Alphabet, EdgeWord},
	solver::{run, ElitismPolicy, SolverConfig, SolverError}
};

/// The mean generation count that stands in for "none" when ranking a cell
/// without any success, so that such cells sort last.
pub const UNSOLVED_SENTINEL: f64 = 1e9;

////////////////////////////////////////////////////////////////////////////////
//                              Configuration.                                //
////////////////////////////////////////////////////////////////////////////////

/// The parameters of a sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig
{
	/// The population sizes to try.
	pub population_sizes: Vec<usize>,

	/// The mutation rates to try.
	pub mutation_rates: Vec<f64>,

	/// The number of independent trials per cell.
	pub trials: usize,

	/// The number of clues per trial.
	pub clue_count: usize,

	/// The generation limit per trial.
	pub max_generations: usize,

	/// Whether the alphabet, read in order, must appear along an edge.
	pub use_edge_word: bool,

	/// How the elite is carried forward.
	pub elitism: ElitismPolicy,

	/// Whether to run the trials of a cell in parallel.
	pub parallel: bool
}

impl Default for SweepConfig
{
	fn default() -> Self
	{
		Self {
			population_sizes: vec![20, 40, 60, 80, 120],
			mutation_rates: vec![0.05, 0.08, 0.10, 0.15],
			trials: 1000,
			clue_count: 2,
			max_generations: 500,
			use_edge_word: true,
			elitism: ElitismPolicy::default(),
			parallel: true
		}
	}
}

/// One combination of hyperparameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepCell
{
	/// The number of individuals per generation.
	pub population_size: usize,

	/// The probability that a freshly bred child is mutated.
	pub mutation_rate: f64
}

impl SweepConfig
{
	/// Enumerate the cells of the sweep: the Cartesian product of the
	/// population sizes and the mutation rates, population-major.
	#[must_use]
	pub fn cells(&self) -> Vec<SweepCell>
	{
		self.population_sizes.iter()
			.flat_map(|&population_size| {
				self.mutation_rates.iter().map(move |&mutation_rate| SweepCell {
					population_size,
					mutation_rate
				})
			})
			.collect()
	}

	/// Build the solver configuration of a cell.
	///
	/// # Arguments
	///
	/// * `alphabet` - The symbols of the puzzle.
	/// * `cell` - The hyperparameters.
	///
	/// # Returns
	///
	/// The solver configuration.
	pub fn solver_config(
		&self,
		alphabet: Alphabet,
		cell: SweepCell
	) -> SolverConfig
	{
		SolverConfig {
			alphabet,
			clue_count: self.clue_count,
			population_size: cell.population_size,
			mutation_rate: cell.mutation_rate,
			max_generations: self.max_generations,
			edge_word: self.use_edge_word.then(|| EdgeWord::from(&alphabet)),
			elitism: self.elitism
		}
	}

	/// Check every cell before any trial runs.
	///
	/// # Errors
	///
	/// * [`SweepError::NoTrials`] if there are no trials per cell.
	/// * [`SweepError::Solver`] if any cell has an invalid configuration.
	pub fn validate(&self, alphabet: Alphabet) -> Result<(), SweepError>
	{
		if self.trials == 0
		{
			return Err(SweepError::NoTrials)
		}
		self.cells()
			.into_iter()
			.try_for_each(|cell| self.solver_config(alphabet, cell).validate())
			.map_err(SweepError::Solver)
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                  Trials.                                   //
////////////////////////////////////////////////////////////////////////////////

/// The outcome of one trial.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trial
{
	/// Whether a solution was found.
	pub success: bool,

	/// The generations used by the run.
	pub generations_used: usize,

	/// The time spent in the generational loop, in seconds.
	pub elapsed_seconds: f64,

	/// Whether the clues could not be generated, so that no generation ran.
	pub infeasible: bool
}

impl Trial
{
	/// Run one trial. An infeasible clue generation is an ordinary failed
	/// trial; it does not abort the sweep.
	///
	/// # Arguments
	///
	/// * `config` - The solver configuration, already validated.
	/// * `seed` - The seed of the trial.
	///
	/// # Returns
	///
	/// The outcome of the trial.
	pub fn run(config: SolverConfig, seed: u64) -> Self
	{
		match run(config, seed)
		{
			Ok(result) => Self {
				success: result.success,
				generations_used: result.generations_used,
				elapsed_seconds: result.elapsed_seconds(),
				infeasible: false
			},
			Err(e) =>
			{
				debug!("trial {} did not start: {}", seed, e);
				Self {
					success: false,
					generations_used: 0,
					elapsed_seconds: 0.0,
					infeasible: true
				}
			}
		}
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                  Results.                                  //
////////////////////////////////////////////////////////////////////////////////

/// The aggregated outcome of all trials of one cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepResult
{
	/// The hyperparameters.
	pub cell: SweepCell,

	/// The number of trials.
	pub trials: usize,

	/// The number of successful trials.
	pub successes: usize,

	/// The number of trials whose clues could not be generated.
	pub infeasible: usize,

	/// `successes / trials`.
	pub success_rate: f64,

	/// The mean generations of the successful trials, or `None` if there were
	/// none.
	pub mean_generations: Option<f64>,

	/// The mean elapsed time over all trials, in seconds.
	pub mean_elapsed_seconds: f64
}

impl SweepResult
{
	/// Reduce the trials of a cell. Sums are accumulated in trial order.
	///
	/// # Arguments
	///
	/// * `cell` - The hyperparameters.
	/// * `trials` - The outcomes of the trials. Must not be empty.
	///
	/// # Returns
	///
	/// The aggregated result.
	pub fn aggregate(cell: SweepCell, trials: &[Trial]) -> Self
	{
		let count = trials.len();
		let (successes, generations, seconds, infeasible) = trials.iter()
			.fold((0, 0, 0.0, 0), |(n, g, s, i), t| (
				n + t.success as usize,
				g + if t.success { t.generations_used } else { 0 },
				s + t.elapsed_seconds,
				i + t.infeasible as usize
			));
		Self {
			cell,
			trials: count,
			successes,
			infeasible,
			success_rate: successes as f64 / count as f64,
			mean_generations: (successes > 0)
				.then(|| generations as f64 / successes as f64),
			mean_elapsed_seconds: seconds / count as f64
		}
	}

	/// The secondary ranking key: the mean generations, or
	/// [`UNSOLVED_SENTINEL`] if no trial succeeded.
	#[inline]
	#[must_use]
	pub fn rank_key(&self) -> f64
	{
		self.mean_generations.unwrap_or(UNSOLVED_SENTINEL)
	}
}

/// Rank results: descending success rate, then ascending mean generations.
/// The sort is stable, so equal results keep their sweep order.
pub fn rank(results: &mut [SweepResult])
{
	results.sort_by(|a, b| {
		b.success_rate.total_cmp(&a.success_rate)
			.then_with(|| a.rank_key().total_cmp(&b.rank_key()))
	});
}

////////////////////////////////////////////////////////////////////////////////
//                                  Sweep.                                    //
////////////////////////////////////////////////////////////////////////////////

/// Run all trials of one cell. Trial `t` is seeded with `t`.
///
/// # Arguments
///
/// * `config` - The sweep configuration.
/// * `alphabet` - The symbols of the puzzle.
/// * `cell` - The hyperparameters.
///
/// # Returns
///
/// The outcomes, in trial order.
pub fn run_cell(
	config: &SweepConfig,
	alphabet: Alphabet,
	cell: SweepCell
) -> Vec<Trial>
{
	run_cell_with(config, alphabet, cell, |_| {})
}

/// Run all trials of one cell, reporting each trial as it finishes. In
/// parallel mode the trials finish in no particular order, so `on_trial` may
/// be called from several threads at once.
///
/// # Arguments
///
/// * `config` - The sweep configuration.
/// * `alphabet` - The symbols of the puzzle.
/// * `cell` - The hyperparameters.
/// * `on_trial` - Called with every finished trial.
///
/// # Returns
///
/// The outcomes, in trial order.
pub fn run_cell_with<T>(
	config: &SweepConfig,
	alphabet: Alphabet,
	cell: SweepCell,
	on_trial: T
) -> Vec<Trial>
	where T: Fn(&Trial) + Sync
{
	let solver_config = config.solver_config(alphabet, cell);
	let run_trial = |seed: u64| {
		let trial = Trial::run(solver_config, seed);
		on_trial(&trial);
		trial
	};
	let seeds = 0..config.trials as u64;
	if config.parallel
	{
		seeds.into_par_iter().map(run_trial).collect()
	}
	else
	{
		seeds.map(run_trial).collect()
	}
}

/// Run the sweep and rank its results.
///
/// # Arguments
///
/// * `config` - The sweep configuration.
/// * `alphabet` - The symbols of the puzzle.
///
/// # Returns
///
/// One result per cell, [ranked](rank).
///
/// # Errors
///
/// Any error of [`SweepConfig::validate`]. No trial runs in that case.
pub fn sweep(
	config: &SweepConfig,
	alphabet: Alphabet
) -> Result<Vec<SweepResult>, SweepError>
{
	sweep_with_progress(config, alphabet, |_| {}, |_, _, _| {})
}

/// Run the sweep and rank its results, reporting each trial and each cell as
/// it finishes.
///
/// # Arguments
///
/// * `config` - The sweep configuration.
/// * `alphabet` - The symbols of the puzzle.
/// * `on_trial` - Called with every finished trial, as by
///   [`run_cell_with`].
/// * `on_cell` - Called with the 0-based index of the finished cell, the
///   number of cells, and the result of the cell.
///
/// # Returns
///
/// One result per cell, [ranked](rank).
///
/// # Errors
///
/// Any error of [`SweepConfig::validate`]. No trial runs in that case.
pub fn sweep_with_progress<T, C>(
	config: &SweepConfig,
	alphabet: Alphabet,
	on_trial: T,
	mut on_cell: C
) -> Result<Vec<SweepResult>, SweepError>
	where
		T: Fn(&Trial) + Sync,
		C: FnMut(usize, usize, &SweepResult)
{
	config.validate(alphabet)?;
	let cells = config.cells();
	let mut results = Vec::with_capacity(cells.len());
	for (index, &cell) in cells.iter().enumerate()
	{
		let trials = run_cell_with(config, alphabet, cell, &on_trial);
		let result = SweepResult::aggregate(cell, &trials);
		info!(
			"cell {}/{}: population={} mutation={:.2} success={:.2}%",
			index + 1,
			cells.len(),
			cell.population_size,
			cell.mutation_rate,
			result.success_rate * 100.0
		);
		on_cell(index, cells.len(), &result);
		results.push(result);
	}
	rank(&mut results);
	Ok(results)
}

////////////////////////////////////////////////////////////////////////////////
//                                  Report.                                   //
////////////////////////////////////////////////////////////////////////////////

/// A table of sweep results, rendered in GitHub's Markdown table format.
#[derive(Clone, Copy, Debug)]
pub struct SweepReport<'a>(pub &'a [SweepResult]);

impl Display for SweepReport<'_>
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		let headers = [
			"population",
			"mutation rate",
			"success",
			"average generation",
			"average seconds"
		];
		let rows = self.0.iter()
			.map(|r| [
				r.cell.population_size.to_string(),
				format!("{:.2}", r.cell.mutation_rate),
				format!("{:.2}%", r.success_rate * 100.0),
				r.mean_generations
					.map_or_else(|| "-".to_string(), |g| format!("{:.1}", g)),
				format!("{:.2}", r.mean_elapsed_seconds)
			])
			.collect::<Vec<_>>();
		let widths = headers.map(str::len);
		let widths = rows.iter().fold(widths, |mut widths, row| {
			for (width, cell) in widths.iter_mut().zip(row.iter())
			{
				*width = (*width).max(cell.len());
			}
			widths
		});
		let header = headers.iter()
			.zip(widths.iter())
			.map(|(h, &w)| format!(" {:<w$} ", h, w = w))
			.collect::<Vec<_>>();
		writeln!(f, "|{}|", header.join("|"))?;
		let rule = widths.iter()
			.map(|&w| format!("{}:", "-".repeat(w + 1)))
			.collect::<Vec<_>>();
		writeln!(f, "|{}|", rule.join("|"))?;
		for row in rows.iter()
		{
			let cells = row.iter()
				.zip(widths.iter())
				.map(|(c, &w)| format!(" {:>w$} ", c, w = w))
				.collect::<Vec<_>>();
			writeln!(f, "|{}|", cells.join("|"))?;
		}
		Ok(())
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                  Errors.                                   //
////////////////////////////////////////////////////////////////////////////////

/// The complete enumeration of errors that prevent a sweep from starting.
#[derive(Clone, Debug, PartialEq)]
pub enum SweepError
{
	/// A cell has an invalid solver configuration.
	Solver(SolverError),

	/// No trials were requested, so no rate can be computed.
	NoTrials
}

impl Display for SweepError
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		match self
		{
			Self::Solver(e) => write!(f, "invalid sweep cell: {}", e),
			Self::NoTrials => write!(f, "trials per cell must be positive")
		}
	}
}

impl std::error::Error for SweepError
{
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)>
	{
		match self
		{
			Self::Solver(e) => Some(e),
			Self::NoTrials => None
		}
	}
}

impl From<SolverError> for SweepError
{
	fn from(e: SolverError) -> Self
	{
		Self::Solver(e)
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test
{
	use std::sync::atomic::{AtomicUsize, Ordering};

	use crate::{
		grid::Alphabet,
		solver::SolverError,
		sweep::{
			rank, run_cell, run_cell_with, sweep, sweep_with_progress,
			SweepCell, SweepConfig, SweepError, SweepReport, SweepResult,
			Trial, UNSOLVED_SENTINEL
		}
	};

	fn alphabet() -> Alphabet
	{
		"WORD".parse().unwrap()
	}

	fn small() -> SweepConfig
	{
		SweepConfig {
			population_sizes: vec![10, 30],
			mutation_rates: vec![0.05, 0.15],
			trials: 4,
			max_generations: 40,
			..Default::default()
		}
	}

	fn trial(success: bool, generations_used: usize, seconds: f64) -> Trial
	{
		Trial {
			success,
			generations_used,
			elapsed_seconds: seconds,
			infeasible: false
		}
	}

	fn cell(population_size: usize, mutation_rate: f64) -> SweepCell
	{
		SweepCell { population_size, mutation_rate }
	}

	/// The cells are the population-major Cartesian product of the grids.
	#[test]
	fn test_cells()
	{
		let cells = small().cells();
		assert_eq!(
			cells,
			vec![cell(10, 0.05), cell(10, 0.15), cell(30, 0.05), cell(30, 0.15)]
		);
		assert_eq!(SweepConfig::default().cells().len(), 20);
	}

	/// Aggregation averages generations over successes only, and time over
	/// all trials.
	#[test]
	fn test_aggregate()
	{
		let trials = [
			trial(true, 10, 1.0),
			trial(false, 500, 2.0),
			trial(true, 30, 3.0),
			trial(false, 500, 2.0)
		];
		let result = SweepResult::aggregate(cell(40, 0.1), &trials);
		assert_eq!(result.trials, 4);
		assert_eq!(result.successes, 2);
		assert_eq!(result.success_rate, 0.5);
		assert_eq!(result.mean_generations, Some(20.0));
		assert_eq!(result.mean_elapsed_seconds, 2.0);
		assert_eq!(result.rank_key(), 20.0);
	}

	/// A cell in which every trial fails has no mean generation count, and
	/// ranks after every cell with a success.
	#[test]
	fn test_all_failed()
	{
		let failed = SweepResult::aggregate(
			cell(20, 0.05),
			&[trial(false, 500, 1.0), trial(false, 500, 1.0)]
		);
		assert_eq!(failed.success_rate, 0.0);
		assert_eq!(failed.mean_generations, None);
		assert_eq!(failed.rank_key(), UNSOLVED_SENTINEL);

		let slow = SweepResult::aggregate(
			cell(40, 0.05),
			&[trial(true, 400, 1.0), trial(false, 500, 1.0)]
		);
		let fast = SweepResult::aggregate(
			cell(60, 0.05),
			&[trial(true, 20, 1.0), trial(false, 500, 1.0)]
		);
		let best = SweepResult::aggregate(
			cell(80, 0.05),
			&[trial(true, 300, 1.0), trial(true, 300, 1.0)]
		);
		let mut results =
			vec![failed.clone(), slow.clone(), fast.clone(), best.clone()];
		rank(&mut results);
		assert_eq!(results, vec![best, fast, slow, failed]);
	}

	/// Invalid cells are reported before any trial runs.
	#[test]
	fn test_validate()
	{
		let mut config = small();
		config.mutation_rates.push(2.0);
		assert_eq!(
			sweep(&config, alphabet()),
			Err(SweepError::Solver(SolverError::InvalidMutationRate(2.0)))
		);
		let mut config = small();
		config.trials = 0;
		assert_eq!(sweep(&config, alphabet()), Err(SweepError::NoTrials));
		let mut config = small();
		config.population_sizes = vec![0];
		let mut called = false;
		let result = sweep_with_progress(
			&config,
			alphabet(),
			|_| panic!("no trial may run"),
			|_, _, _| called = true
		);
		assert!(result.is_err());
		assert!(!called);
	}

	/// A sweep yields one ranked result per cell, and parallel and serial
	/// execution agree on everything but timing.
	#[test]
	fn test_sweep()
	{
		let parallel = small();
		let serial = SweepConfig { parallel: false, ..small() };
		let mut seen = Vec::new();
		let finished = AtomicUsize::new(0);
		let a = sweep_with_progress(
			&parallel,
			alphabet(),
			|_| {
				finished.fetch_add(1, Ordering::Relaxed);
			},
			|i, n, _| seen.push((i, n))
		).unwrap();
		let b = sweep(&serial, alphabet()).unwrap();
		assert_eq!(seen, vec![(0, 4), (1, 4), (2, 4), (3, 4)]);
		assert_eq!(finished.load(Ordering::Relaxed), 4 * 4);
		assert_eq!(a.len(), 4);
		for (x, y) in a.iter().zip(b.iter())
		{
			assert_eq!(x.cell, y.cell);
			assert_eq!(x.successes, y.successes);
			assert_eq!(x.mean_generations, y.mean_generations);
			assert_eq!(x.trials, 4);
			assert!((0.0..=1.0).contains(&x.success_rate));
		}
		for pair in a.windows(2)
		{
			assert!(pair[0].success_rate >= pair[1].success_rate);
		}
	}

	/// Trial `t` of a cell runs the solver with seed `t`, in both serial and
	/// parallel mode, and every trial is reported exactly once.
	#[test]
	fn test_run_cell_seeds()
	{
		let config = SweepConfig { trials: 8, ..small() };
		let cell = cell(20, 0.1);
		let solver_config = config.solver_config(alphabet(), cell);
		let serial = SweepConfig { parallel: false, ..config.clone() };
		for config in [config, serial]
		{
			let reported = AtomicUsize::new(0);
			let trials = run_cell_with(&config, alphabet(), cell, |_| {
				reported.fetch_add(1, Ordering::Relaxed);
			});
			assert_eq!(trials.len(), 8);
			assert_eq!(reported.load(Ordering::Relaxed), 8);
			for (t, trial) in trials.iter().enumerate()
			{
				let expected = Trial::run(solver_config, t as u64);
				assert_eq!(trial.success, expected.success, "trial {}", t);
				assert_eq!(
					trial.generations_used,
					expected.generations_used,
					"trial {}",
					t
				);
				assert_eq!(trial.infeasible, expected.infeasible);
			}
			let plain = run_cell(&config, alphabet(), cell);
			assert_eq!(
				plain.iter().map(|t| t.generations_used).collect::<Vec<_>>(),
				trials.iter().map(|t| t.generations_used).collect::<Vec<_>>()
			);
		}
	}

	/// The report is a Markdown table with one line per result.
	#[test]
	fn test_report()
	{
		let results = vec![
			SweepResult::aggregate(cell(40, 0.15), &[trial(true, 12, 0.5)]),
			SweepResult::aggregate(cell(20, 0.05), &[trial(false, 500, 0.25)])
		];
		let report = SweepReport(&results).to_string();
		let lines = report.lines().collect::<Vec<_>>();
		assert_eq!(lines.len(), 4);
		assert!(lines[0].starts_with("| population | mutation rate |"));
		assert!(lines[1].starts_with("|-"));
		assert!(lines[2].contains("100.00%"));
		assert!(lines[2].contains("12.0"));
		assert!(lines[3].contains("0.00%"));
		assert!(lines[3].contains(" - "));
		assert!(lines.iter().all(|l| l.len() == lines[0].len()));
	}
}
