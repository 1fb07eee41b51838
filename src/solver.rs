//! # Solver
//!
//! Herein is the genetic solver. A [`Solver`] is the complete context of one
//! run: the clue grid, the current population, and a private random stream.
//! The run advances one generation per [`step`](Solver::step), so that a
//! caller can interleave runs with other work, or simply call
//! [`solve_fully`](Solver::solve_fully) to drive it to a terminal state.

use std::{
	error::Error,
	fmt::{self, Display, Formatter},
	time::{Duration, Instant}
};

use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::{
	fitness::score,
	generator::{generate, MAX_CLUES},
	grid::{Alphabet, ClueGrid, EdgeWord, Individual},
	operators::{crossover, initialize, mutate, select, Population}
};

////////////////////////////////////////////////////////////////////////////////
//                              Configuration.                                //
////////////////////////////////////////////////////////////////////////////////

/// How the elite individual re-enters the next generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElitismPolicy
{
	/// Append the elite to the bred generation, then discard one uniformly
	/// random member. The discarded member may be the elite itself, with
	/// probability `1 / (population_size + 1)`.
	#[default]
	RandomTrim,

	/// Replace one uniformly random bred child with the elite, so that the
	/// elite always survives.
	Protected
}

/// The parameters of one solver run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig
{
	/// The symbols of the puzzle.
	pub alphabet: Alphabet,

	/// The number of clues to place on the board.
	pub clue_count: usize,

	/// The number of individuals per generation.
	pub population_size: usize,

	/// The probability that a freshly bred child is mutated.
	pub mutation_rate: f64,

	/// The number of generations after which the run gives up.
	pub max_generations: usize,

	/// The word that must appear along an edge of the solution, if any.
	pub edge_word: Option<EdgeWord>,

	/// How the elite is carried forward.
	pub elitism: ElitismPolicy
}

impl SolverConfig
{
	/// Construct the default configuration for the given alphabet. The
	/// alphabet, read in order, is the target edge word.
	///
	/// # Arguments
	///
	/// * `alphabet` - The symbols of the puzzle.
	///
	/// # Returns
	///
	/// The configuration.
	pub fn new(alphabet: Alphabet) -> Self
	{
		Self {
			alphabet,
			clue_count: 2,
			population_size: 40,
			mutation_rate: 0.15,
			max_generations: 500,
			edge_word: Some(EdgeWord::from(&alphabet)),
			elitism: ElitismPolicy::default()
		}
	}

	/// Check the configuration before any work begins.
	///
	/// # Errors
	///
	/// * [`SolverError::InvalidClueCount`] if the board cannot hold the clues.
	/// * [`SolverError::InvalidPopulationSize`] if the population is empty.
	/// * [`SolverError::InvalidMutationRate`] if the rate is not a probability.
	/// * [`SolverError::InvalidGenerationLimit`] if no generation may run.
	/// * [`SolverError::InvalidEdgeWord`] if the edge word uses a symbol
	///   outside the alphabet.
	pub fn validate(&self) -> Result<(), SolverError>
	{
		if self.clue_count > MAX_CLUES
		{
			return Err(SolverError::InvalidClueCount {
				requested: self.clue_count,
				maximum: MAX_CLUES
			})
		}
		if self.population_size == 0
		{
			return Err(SolverError::InvalidPopulationSize(self.population_size))
		}
		if !(0.0..=1.0).contains(&self.mutation_rate)
		{
			return Err(SolverError::InvalidMutationRate(self.mutation_rate))
		}
		if self.max_generations == 0
		{
			return Err(SolverError::InvalidGenerationLimit)
		}
		match self.edge_word
		{
			Some(word) if !word.is_drawn_from(&self.alphabet) =>
				Err(SolverError::InvalidEdgeWord(word.to_string())),
			_ => Ok(())
		}
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                  Results.                                  //
////////////////////////////////////////////////////////////////////////////////

/// The state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverState
{
	/// Generations remain to be run.
	Running,

	/// A solution was found in the given generation.
	Succeeded { generation: usize },

	/// The generation limit was reached without a solution.
	Exhausted
}

impl SolverState
{
	/// Check if the state is terminal.
	#[inline]
	#[must_use]
	pub fn is_terminal(&self) -> bool
	{
		!matches!(self, Self::Running)
	}
}

/// The outcome of one run. Exhaustion is an ordinary outcome, reported with
/// `success == false`, and not an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunResult
{
	/// Whether a solution was found.
	pub success: bool,

	/// The generation in which the solution was found, or the generation limit
	/// if none was found.
	pub generations_used: usize,

	/// The time spent in the generational loop.
	pub elapsed: Duration,

	/// The clues of the run.
	pub clues: ClueGrid,

	/// The best individual of the last evaluated generation. This is the
	/// solution if the run succeeded.
	pub best: Individual,

	/// The fitness score of [`best`](Self::best).
	pub best_score: u32
}

impl RunResult
{
	/// Get the elapsed time in seconds.
	#[inline]
	#[must_use]
	pub fn elapsed_seconds(&self) -> f64
	{
		self.elapsed.as_secs_f64()
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                  Solver.                                   //
////////////////////////////////////////////////////////////////////////////////

/// The complete context of one genetic run.
#[derive(Clone, Debug)]
#[must_use]
pub struct Solver
{
	/// The parameters of the run.
	config: SolverConfig,

	/// The private random stream of the run.
	rng: ChaCha8Rng,

	/// The clues, fixed for the lifetime of the run.
	clues: ClueGrid,

	/// The current generation.
	population: Population,

	/// The number of generations evaluated so far.
	generation: usize,

	/// The best individual of the last evaluated generation, with its score.
	best: Option<(Individual, u32)>,

	/// The state of the run.
	state: SolverState,

	/// The time spent in [`step`](Self::step) so far.
	elapsed: Duration
}

impl Solver
{
	/// Prepare a run: check the configuration, generate the clues, and create
	/// the initial population. All randomness of the run derives from `seed`.
	///
	/// # Arguments
	///
	/// * `config` - The parameters of the run.
	/// * `seed` - The seed of the random stream.
	///
	/// # Returns
	///
	/// The solver, ready to run its first generation.
	///
	/// # Errors
	///
	/// * Any error of [`SolverConfig::validate`].
	/// * [`SolverError::ClueGenerationInfeasible`] if the clues cannot be
	///   placed.
	pub fn new(config: SolverConfig, seed: u64) -> Result<Self, SolverError>
	{
		config.validate()?;
		let mut rng = ChaCha8Rng::seed_from_u64(seed);
		let clues = generate(&config.alphabet, config.clue_count, &mut rng)?;
		let population = initialize(
			config.population_size,
			&config.alphabet,
			&clues,
			&mut rng
		);
		debug!(
			"run seed={} alphabet={} clues={} population={} mutation={}",
			seed,
			config.alphabet,
			clues.clue_count(),
			config.population_size,
			config.mutation_rate
		);
		Ok(Self {
			config,
			rng,
			clues,
			population,
			generation: 0,
			best: None,
			state: SolverState::Running,
			elapsed: Duration::ZERO
		})
	}

	/// Get the clues of the run.
	#[inline]
	pub fn clues(&self) -> &ClueGrid
	{
		&self.clues
	}

	/// Get the current population.
	#[inline]
	#[must_use]
	pub fn population(&self) -> &[Individual]
	{
		&self.population
	}

	/// Get the state of the run.
	#[inline]
	#[must_use]
	pub fn state(&self) -> SolverState
	{
		self.state
	}

	/// Get the number of generations evaluated so far.
	#[inline]
	#[must_use]
	pub fn generation(&self) -> usize
	{
		self.generation
	}

	/// Run one generation: score the population, stop if its best member is a
	/// solution or the generation limit is reached, and otherwise breed the
	/// next generation and carry the elite forward. A terminal generation
	/// leaves the population as scored. Does nothing once the run is terminal.
	///
	/// # Returns
	///
	/// The state after the generation.
	pub fn step(&mut self) -> SolverState
	{
		if self.state.is_terminal()
		{
			return self.state
		}
		let start = Instant::now();
		self.generation += 1;
		let word = self.config.edge_word;
		let scores = self.population.iter()
			.map(|individual| score(individual, &self.clues, word.as_ref()))
			.collect::<Vec<_>>();
		// Ties go to the first occurrence.
		let elite_index = (1..scores.len())
			.fold(0, |best, i| if scores[i] < scores[best] { i } else { best });
		let best_score = scores[elite_index];
		let elite = self.population[elite_index];
		self.best = Some((elite, best_score));
		trace!("generation {}: best={}", self.generation, best_score);

		let solved = best_score == 0
			&& word.map_or(true, |word| elite.has_edge_word(&word));
		if solved
		{
			debug!("solved in generation {}", self.generation);
			self.state = SolverState::Succeeded { generation: self.generation };
		}
		else if self.generation >= self.config.max_generations
		{
			debug!("exhausted after {} generations", self.generation);
			self.state = SolverState::Exhausted;
		}
		else
		{
			self.population = self.breed(&scores, elite);
		}
		self.elapsed += start.elapsed();
		self.state
	}

	/// Run generations until the run is terminal.
	///
	/// # Returns
	///
	/// The outcome of the run.
	pub fn solve_fully(mut self) -> RunResult
	{
		while !self.state.is_terminal()
		{
			self.step();
		}
		self.result()
	}

	/// Summarize the run so far.
	///
	/// # Returns
	///
	/// The outcome of the run. Before the first generation, the best
	/// individual is the first member of the initial population.
	pub fn result(&self) -> RunResult
	{
		let (best, best_score) = self.best.unwrap_or_else(|| {
			let first = self.population[0];
			let word = self.config.edge_word;
			(first, score(&first, &self.clues, word.as_ref()))
		});
		let (success, generations_used) = match self.state
		{
			SolverState::Succeeded { generation } => (true, generation),
			SolverState::Exhausted => (false, self.config.max_generations),
			SolverState::Running => (false, self.generation)
		};
		RunResult {
			success,
			generations_used,
			elapsed: self.elapsed,
			clues: self.clues,
			best,
			best_score
		}
	}

	/// Breed the next generation from the current one.
	///
	/// # Arguments
	///
	/// * `scores` - The fitness scores of the current generation.
	/// * `elite` - The best individual of the current generation.
	///
	/// # Returns
	///
	/// The next generation, of the configured size, including `elite` unless
	/// the [random trim](ElitismPolicy::RandomTrim) discarded it.
	fn breed(&mut self, scores: &[u32], elite: Individual) -> Population
	{
		let size = self.config.population_size;
		let mut next = Population::with_capacity(size + 1);
		while next.len() < size
		{
			let first = select(&self.population, scores, &mut self.rng);
			let second = select(&self.population, scores, &mut self.rng);
			let mut child =
				crossover(&first, &second, &self.clues, &mut self.rng);
			if self.rng.gen::<f64>() < self.config.mutation_rate
			{
				child = mutate(&child, &self.clues, &mut self.rng);
			}
			next.push(child);
		}
		match self.config.elitism
		{
			ElitismPolicy::RandomTrim =>
			{
				next.push(elite);
				let victim = self.rng.gen_range(0..next.len());
				next.remove(victim);
			},
			ElitismPolicy::Protected =>
			{
				let victim = self.rng.gen_range(0..next.len());
				next[victim] = elite;
			}
		}
		next
	}
}

/// Run the solver once, from clue generation to a terminal state.
///
/// # Arguments
///
/// * `config` - The parameters of the run.
/// * `seed` - The seed of the random stream.
///
/// # Returns
///
/// The outcome of the run.
///
/// # Errors
///
/// Any error of [`Solver::new`]. Exhaustion is not an error.
pub fn run(config: SolverConfig, seed: u64) -> Result<RunResult, SolverError>
{
	Ok(Solver::new(config, seed)?.solve_fully())
}

////////////////////////////////////////////////////////////////////////////////
//                                  Errors.                                   //
////////////////////////////////////////////////////////////////////////////////

/// The complete enumeration of errors that can prevent a run from starting.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverError
{
	/// The symbols are not exactly four distinct characters.
	InvalidAlphabet(String),

	/// The edge word is not four symbols of the alphabet.
	InvalidEdgeWord(String),

	/// The clues are inconsistent or occupy a corner.
	InvalidClueGrid(&'static str),

	/// The board cannot hold the requested number of clues.
	InvalidClueCount { requested: usize, maximum: usize },

	/// The population is empty.
	InvalidPopulationSize(usize),

	/// The mutation rate is not a probability.
	InvalidMutationRate(f64),

	/// The generation limit is zero.
	InvalidGenerationLimit,

	/// The placement budget ran out before every clue was placed.
	ClueGenerationInfeasible { placed: usize, requested: usize }
}

impl SolverError
{
	/// Check if the error denotes an invalid configuration, as opposed to an
	/// unlucky clue generation.
	#[inline]
	#[must_use]
	pub fn is_configuration_error(&self) -> bool
	{
		!matches!(self, Self::ClueGenerationInfeasible { .. })
	}
}

impl Display for SolverError
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		match self
		{
			Self::InvalidAlphabet(s) =>
				write!(f, "alphabet must be 4 distinct symbols: {:?}", s),
			Self::InvalidEdgeWord(s) => write!(
				f,
				"edge word must be 4 symbols of the alphabet: {:?}",
				s
			),
			Self::InvalidClueGrid(reason) =>
				write!(f, "invalid clue grid: {}", reason),
			Self::InvalidClueCount { requested, maximum } => write!(
				f,
				"cannot place {} clues: at most {} fit outside the corners",
				requested,
				maximum
			),
			Self::InvalidPopulationSize(size) =>
				write!(f, "population size must be positive: {}", size),
			Self::InvalidMutationRate(rate) =>
				write!(f, "mutation rate must lie in [0, 1]: {}", rate),
			Self::InvalidGenerationLimit =>
				write!(f, "generation limit must be positive"),
			Self::ClueGenerationInfeasible { placed, requested } => write!(
				f,
				"could not generate a consistent starting grid: placed {} of \
					{} clues",
				placed,
				requested
			)
		}
	}
}

impl Error for SolverError {}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test
{
	use crate::{
		fitness::score,
		grid::{Alphabet, EdgeWord},
		solver::{
			run, ElitismPolicy, Solver, SolverConfig, SolverError, SolverState
		}
	};

	fn config() -> SolverConfig
	{
		SolverConfig::new("WORD".parse::<Alphabet>().unwrap())
	}

	/// Invalid configurations fail before any work begins.
	#[test]
	fn test_validate()
	{
		assert_eq!(config().validate(), Ok(()));
		let mut bad = config();
		bad.clue_count = 13;
		assert!(matches!(
			Solver::new(bad, 0),
			Err(SolverError::InvalidClueCount { requested: 13, maximum: 12 })
		));
		let mut bad = config();
		bad.population_size = 0;
		assert_eq!(bad.validate(), Err(SolverError::InvalidPopulationSize(0)));
		let mut bad = config();
		bad.mutation_rate = 1.5;
		assert_eq!(bad.validate(), Err(SolverError::InvalidMutationRate(1.5)));
		let mut bad = config();
		bad.max_generations = 0;
		assert_eq!(bad.validate(), Err(SolverError::InvalidGenerationLimit));
		let mut bad = config();
		bad.edge_word = Some("RISK".parse::<EdgeWord>().unwrap());
		assert!(matches!(
			bad.validate(),
			Err(SolverError::InvalidEdgeWord(_))
		));
		assert!(bad.validate().unwrap_err().is_configuration_error());
	}

	/// The reference scenario terminates within its generation limit, and a
	/// success shows the word along an edge of a valid, clue-respecting grid.
	#[test]
	fn test_run_word()
	{
		let config = config();
		let result = run(config, 0).unwrap();
		assert!(result.generations_used >= 1);
		assert!(result.generations_used <= 500);
		if result.success
		{
			let word = EdgeWord::from(&config.alphabet);
			assert!(result.best.has_edge_word(&word));
			assert!(result.best.is_valid());
			assert!(result.best.respects(&result.clues));
			assert_eq!(result.best_score, 0);
		}
		else
		{
			assert_eq!(result.generations_used, 500);
		}
	}

	/// A configuration survives a JSON round trip, but one whose alphabet
	/// repeats a symbol is rejected on load.
	#[test]
	fn test_config_serde()
	{
		let json = serde_json::to_string(&config()).unwrap();
		let loaded: SolverConfig = serde_json::from_str(&json).unwrap();
		assert_eq!(loaded, config());
		let book = json.replacen(
			r#""alphabet":["W","O","R","D"]"#,
			r#""alphabet":["B","O","O","K"]"#,
			1
		);
		assert_ne!(book, json);
		assert!(serde_json::from_str::<SolverConfig>(&book).is_err());
	}

	/// A successful run with an edge word yields a valid, clue-respecting grid
	/// that scores zero and shows the word exactly along one edge.
	#[test]
	fn test_run_word_success()
	{
		let config = config();
		let word = EdgeWord::from(&config.alphabet);
		let (seed, result) = (0..50)
			.map(|seed| (seed, run(config, seed).unwrap()))
			.find(|(_, result)| result.success)
			.expect("some seed in 0..50 solves the puzzle");
		assert!(result.best.has_edge_word(&word), "seed {}", seed);
		assert!(result.best.is_valid());
		assert!(result.best.respects(&result.clues));
		assert_eq!(result.best_score, 0);
		assert!((1..=500).contains(&result.generations_used));
		assert_eq!(run(config, seed).unwrap().best, result.best);
	}

	/// The last generation of an exhausted run is scored but not bred.
	#[test]
	fn test_exhausted_population()
	{
		let mut config = config();
		config.max_generations = 1;
		for seed in 0..10
		{
			let mut solver = Solver::new(config, seed).unwrap();
			let initial = solver.population().to_vec();
			assert!(solver.step().is_terminal());
			assert_eq!(solver.population(), initial.as_slice());
			let result = solver.result();
			assert_eq!(result.generations_used, 1);
			assert!(initial.contains(&result.best));
		}
	}

	/// Identical seeds and parameters yield identical outcomes.
	#[test]
	fn test_reproducible()
	{
		let mut config = config();
		config.population_size = 20;
		config.max_generations = 100;
		for seed in 0..5
		{
			let a = run(config, seed).unwrap();
			let b = run(config, seed).unwrap();
			assert_eq!(a.success, b.success);
			assert_eq!(a.generations_used, b.generations_used);
			assert_eq!(a.best, b.best);
			assert_eq!(a.clues, b.clues);
		}
	}

	/// Every generation keeps the population size and the clues, under both
	/// elitism policies; a run only becomes terminal by success or exhaustion.
	#[test]
	fn test_step()
	{
		for elitism in [ElitismPolicy::RandomTrim, ElitismPolicy::Protected]
		{
			let mut config = config();
			config.population_size = 12;
			config.max_generations = 30;
			config.elitism = elitism;
			let mut solver = Solver::new(config, 11).unwrap();
			assert_eq!(solver.generation(), 0);
			assert_eq!(solver.state(), SolverState::Running);
			while !solver.step().is_terminal()
			{
				assert_eq!(solver.population().len(), 12);
				for individual in solver.population()
				{
					assert!(individual.respects(solver.clues()));
				}
			}
			match solver.state()
			{
				SolverState::Succeeded { generation } =>
				{
					assert_eq!(generation, solver.generation());
					assert!(generation <= 30);
				},
				SolverState::Exhausted => assert_eq!(solver.generation(), 30),
				SolverState::Running => unreachable!()
			}
			let generation = solver.generation();
			assert!(solver.step().is_terminal());
			assert_eq!(solver.generation(), generation);
		}
	}

	/// Under protected elitism, the best score never worsens from one
	/// generation to the next.
	#[test]
	fn test_protected_elite()
	{
		let mut config = config();
		config.population_size = 10;
		config.max_generations = 60;
		config.elitism = ElitismPolicy::Protected;
		let mut solver = Solver::new(config, 3).unwrap();
		let mut previous = u32::MAX;
		while !solver.state().is_terminal()
		{
			solver.step();
			let best = solver.population()
				.iter()
				.map(|i| score(i, solver.clues(), config.edge_word.as_ref()))
				.min()
				.unwrap();
			if !solver.state().is_terminal()
			{
				assert!(best <= previous);
				previous = best;
			}
		}
	}

	/// Without an edge word, a success only requires a valid grid that keeps
	/// the clues; a run that never steps reports no success.
	#[test]
	fn test_without_edge_word()
	{
		let mut config = config();
		config.edge_word = None;
		config.population_size = 60;
		let solver = Solver::new(config, 5).unwrap();
		let idle = solver.result();
		assert!(!idle.success);
		assert_eq!(idle.generations_used, 0);
		let result = solver.solve_fully();
		if result.success
		{
			assert!(result.best.is_valid());
			assert!(result.best.respects(&result.clues));
		}
	}
}
