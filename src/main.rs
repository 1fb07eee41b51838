//! # Edge Word GA
//!
//! An edge word puzzle is a 4×4 board over four letters. Every row, column,
//! and 2×2 block must hold each letter exactly once, a few cells are given as
//! clues, and one edge of the finished board must spell a chosen word.
//!
//! This program solves such puzzles with a genetic algorithm. Via command line
//! options, the user can solve a single randomly generated puzzle, sweep the
//! hyperparameters of the algorithm over many puzzles to find the most
//! reliable combination, or just pick a fresh set of letters from the
//! dictionary.

use std::{
	error::Error,
	fs::File,
	io::BufWriter,
	path::PathBuf,
	process::ExitCode
};

use clap::{Args, Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, trace};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use edge_word_ga::{
	dictionary::Dictionary,
	grid::{Alphabet, EdgeWord, SIZE},
	run_log::RunLog,
	solver::{run, ElitismPolicy, SolverConfig},
	sweep::{
		sweep_with_progress, SweepConfig, SweepReport, SweepResult, Trial
	}
};

////////////////////////////////////////////////////////////////////////////////
//                           Command line options.                            //
////////////////////////////////////////////////////////////////////////////////

/// CLI for solving edge word puzzles with a genetic algorithm.
#[derive(Clone, Debug, Parser)]
#[command(version = "1.0", author = "Todd L Smith")]
struct Opts
{
	/// The path to the directory containing the dictionary files. Only
	/// consulted when the letters are not given explicitly.
	#[arg(short = 'd', long, default_value = "dict")]
	directory: String,

	/// The name of the dictionary. This is the name shared by the text and
	/// binary files, sans the extension.
	#[arg(short = 'n', long, default_value = "english")]
	dictionary: String,

	#[command(subcommand)]
	command: Command
}

/// The subcommands of the CLI.
#[derive(Clone, Debug, Subcommand)]
enum Command
{
	/// Generate one puzzle and solve it.
	Solve(SolveArgs),

	/// Solve many puzzles for every combination of population size and
	/// mutation rate, then rank the combinations.
	Sweep(SweepArgs),

	/// Choose letters from the dictionary and print them.
	Letters {
		/// The seed for choosing the letters. Omit for a fresh choice.
		#[arg(short = 's', long)]
		seed: Option<u64>
	}
}

/// Options shared by every subcommand that runs the solver.
#[derive(Clone, Debug, Args)]
struct PuzzleArgs
{
	/// The four distinct letters of the puzzle. If omitted, a word with four
	/// distinct letters is chosen from the dictionary.
	#[arg(short = 'l', long)]
	letters: Option<String>,

	/// The number of clues placed on the board.
	#[arg(short = 'c', long, default_value_t = 2)]
	clues: usize,

	/// The number of generations after which a run gives up.
	#[arg(short = 'g', long, default_value_t = 500)]
	generations: usize,

	/// Do not require an edge word.
	#[arg(long)]
	no_edge_word: bool,

	/// Always carry the best individual into the next generation, instead of
	/// letting it compete for a place with the bred children.
	#[arg(long)]
	protect_elite: bool,

	/// Append a summary of every run to this file.
	#[arg(long)]
	log: Option<PathBuf>
}

impl PuzzleArgs
{
	/// Get the elitism policy requested on the command line.
	fn elitism(&self) -> ElitismPolicy
	{
		if self.protect_elite
		{
			ElitismPolicy::Protected
		}
		else
		{
			ElitismPolicy::RandomTrim
		}
	}
}

/// Options of the `solve` subcommand.
#[derive(Clone, Debug, Args)]
struct SolveArgs
{
	#[command(flatten)]
	puzzle: PuzzleArgs,

	/// The number of individuals per generation.
	#[arg(short = 'p', long, default_value_t = 40)]
	population: usize,

	/// The probability that a freshly bred child is mutated.
	#[arg(short = 'm', long, default_value_t = 0.15)]
	mutation_rate: f64,

	/// The word that must appear along an edge. Defaults to the letters in
	/// order.
	#[arg(short = 'e', long, conflicts_with = "no_edge_word")]
	edge_word: Option<String>,

	/// The seed of the run. The same seed and options give the same run.
	#[arg(short = 's', long, default_value_t = 0)]
	seed: u64
}

/// Options of the `sweep` subcommand.
#[derive(Clone, Debug, Args)]
struct SweepArgs
{
	#[command(flatten)]
	puzzle: PuzzleArgs,

	/// The population sizes to try, separated by commas.
	#[arg(
		short = 'p',
		long,
		value_delimiter = ',',
		default_values_t = [20, 40, 60, 80, 120]
	)]
	populations: Vec<usize>,

	/// The mutation rates to try, separated by commas.
	#[arg(
		short = 'm',
		long,
		value_delimiter = ',',
		default_values_t = [0.05, 0.08, 0.10, 0.15]
	)]
	mutation_rates: Vec<f64>,

	/// The number of trials per combination.
	#[arg(short = 't', long, default_value_t = 1000)]
	trials: usize,

	/// Run the trials one after another instead of in parallel.
	#[arg(long)]
	serial: bool,

	/// Write the ranked results to this file as JSON.
	#[arg(long)]
	json: Option<PathBuf>,

	/// Suppress the progress bars.
	#[arg(short = 'q', long)]
	quiet: bool,

	/// The seed for choosing the letters from the dictionary. Omit for a fresh
	/// choice.
	#[arg(short = 's', long)]
	seed: Option<u64>
}

////////////////////////////////////////////////////////////////////////////////
//                               Main program.                                //
////////////////////////////////////////////////////////////////////////////////

/// Parse the command line options and execute the appropriate subcommand.
fn main() -> ExitCode
{
	env_logger::init();

	// Parse the command line options.
	let opts = Opts::parse();
	debug!("Command line options: {:?}", opts);

	// Execute the appropriate subcommand.
	let outcome = match &opts.command
	{
		Command::Solve(args) => solve(&opts, args),
		Command::Sweep(args) => sweep(&opts, args),
		Command::Letters { seed } =>
			choose_letters(&opts, None, *seed).map(|letters| {
				println!("{}", letters);
			})
	};
	match outcome
	{
		Ok(()) => ExitCode::SUCCESS,
		Err(e) =>
		{
			error!("{}", e);
			eprintln!("error: {}", e);
			ExitCode::FAILURE
		}
	}
}

/// Solve one puzzle and print the clues, the outcome, and the best board.
///
/// # Arguments
///
/// * `opts` - The command line options.
/// * `args` - The options of the `solve` subcommand.
///
/// # Errors
///
/// Any error that prevents the run from starting.
fn solve(opts: &Opts, args: &SolveArgs) -> Result<(), Box<dyn Error>>
{
	let puzzle = &args.puzzle;
	let alphabet =
		choose_letters(opts, puzzle.letters.as_deref(), Some(args.seed))?;
	let edge_word = match (&args.edge_word, puzzle.no_edge_word)
	{
		(_, true) => None,
		(Some(word), false) => Some(word.parse::<EdgeWord>()?),
		(None, false) => Some(EdgeWord::from(&alphabet))
	};
	let config = SolverConfig {
		clue_count: puzzle.clues,
		population_size: args.population,
		mutation_rate: args.mutation_rate,
		max_generations: puzzle.generations,
		edge_word,
		elitism: puzzle.elitism(),
		..SolverConfig::new(alphabet)
	};
	let mut run_log = open_run_log(puzzle)?;
	trace!("Solving with {:?}", config);
	let result = run(config, args.seed)?;

	println!("Letters: {}", alphabet);
	if let Some(word) = edge_word
	{
		println!("Edge word: {}", word);
	}
	println!("Clues:\n{}", result.clues);
	if result.success
	{
		println!(
			"Solved in generation {} ({:.3} s):",
			result.generations_used,
			result.elapsed_seconds()
		);
	}
	else
	{
		println!(
			"No solution after {} generations ({:.3} s); best score {}:",
			result.generations_used,
			result.elapsed_seconds(),
			result.best_score
		);
	}
	println!("{}", result.best);

	if let Some(run_log) = run_log.as_mut()
	{
		run_log.log(format!(
			"solve letters={} clues={} population={} mutation={:.2} seed={} \
				success={} generations={} seconds={:.3}",
			alphabet,
			puzzle.clues,
			args.population,
			args.mutation_rate,
			args.seed,
			result.success,
			result.generations_used,
			result.elapsed_seconds()
		));
		run_log.flush()?;
	}
	Ok(())
}

/// Sweep the hyperparameters, print the ranked report, and optionally write
/// it as JSON.
///
/// # Arguments
///
/// * `opts` - The command line options.
/// * `args` - The options of the `sweep` subcommand.
///
/// # Errors
///
/// Any error that prevents the sweep from starting, or a failure to write
/// the results.
fn sweep(opts: &Opts, args: &SweepArgs) -> Result<(), Box<dyn Error>>
{
	let puzzle = &args.puzzle;
	let alphabet = choose_letters(opts, puzzle.letters.as_deref(), args.seed)?;
	let config = SweepConfig {
		population_sizes: args.populations.clone(),
		mutation_rates: args.mutation_rates.clone(),
		trials: args.trials,
		clue_count: puzzle.clues,
		max_generations: puzzle.generations,
		use_edge_word: !puzzle.no_edge_word,
		elitism: puzzle.elitism(),
		parallel: !args.serial
	};
	config.validate(alphabet)?;
	let mut run_log = open_run_log(puzzle)?;
	println!("Letters: {}", alphabet);
	let (cell_bar, trial_bar) =
		progress_bars(config.cells().len(), config.trials, args.quiet)?;
	let on_trial = |_: &Trial| trial_bar.inc(1);
	let on_cell = |index: usize, count: usize, r: &SweepResult| {
		cell_bar.inc(1);
		trial_bar.reset();
		if let Some(run_log) = run_log.as_mut()
		{
			run_log.log(format!(
				"sweep {}/{} letters={} population={} mutation={:.2} \
					trials={} success={:.4} infeasible={}",
				index + 1,
				count,
				alphabet,
				r.cell.population_size,
				r.cell.mutation_rate,
				r.trials,
				r.success_rate,
				r.infeasible
			));
		}
	};
	let results = sweep_with_progress(&config, alphabet, on_trial, on_cell)?;
	trial_bar.finish_and_clear();
	cell_bar.finish_and_clear();
	print!("{}", SweepReport(&results));

	if let Some(path) = &args.json
	{
		let writer = BufWriter::new(File::create(path)?);
		serde_json::to_writer_pretty(writer, &results)?;
		trace!("Wrote sweep results: {}", path.display());
	}
	if let Some(run_log) = run_log.as_mut()
	{
		run_log.flush()?;
	}
	Ok(())
}

/// Create the progress bars of a sweep: one over the cells, and one over the
/// trials of the current cell.
///
/// # Arguments
///
/// * `cells` - The number of cells.
/// * `trials` - The number of trials per cell.
/// * `quiet` - Whether to hide both bars.
///
/// # Returns
///
/// The cell bar and the trial bar.
///
/// # Errors
///
/// If the bar template is malformed.
fn progress_bars(
	cells: usize,
	trials: usize,
	quiet: bool
) -> Result<(ProgressBar, ProgressBar), Box<dyn Error>>
{
	if quiet
	{
		return Ok((ProgressBar::hidden(), ProgressBar::hidden()))
	}
	let style = ProgressStyle::with_template(
		"{prefix:>6} {bar:40.green/dim} {pos}/{len} [{elapsed_precise}]"
	)?;
	let bars = MultiProgress::new();
	let cell_bar = bars.add(
		ProgressBar::new(cells as u64)
			.with_style(style.clone())
			.with_prefix("cells")
	);
	let trial_bar = bars.add(
		ProgressBar::new(trials as u64)
			.with_style(style)
			.with_prefix("trials")
	);
	Ok((cell_bar, trial_bar))
}

/// Determine the letters of the puzzle: the given letters if any, otherwise a
/// word chosen from the dictionary.
///
/// # Arguments
///
/// * `opts` - The command line options.
/// * `letters` - The letters given on the command line, if any.
/// * `seed` - The seed for choosing from the dictionary, if any.
///
/// # Errors
///
/// * If the given letters are not four distinct symbols.
/// * If the dictionary cannot be opened or offers no suitable word.
fn choose_letters(
	opts: &Opts,
	letters: Option<&str>,
	seed: Option<u64>
) -> Result<Alphabet, Box<dyn Error>>
{
	if let Some(letters) = letters
	{
		return Ok(letters.parse()?)
	}
	// Open the dictionary, creating the binary dictionary if necessary.
	let dictionary = Dictionary::open(&opts.directory, &opts.dictionary)
		.map_err(|e| format!(
			"failed to open dictionary: {}/{}.dict or {0}/{1}.txt: {}",
			opts.directory,
			opts.dictionary,
			e
		))?;
	let mut rng = match seed
	{
		Some(seed) => ChaCha8Rng::seed_from_u64(seed),
		None => ChaCha8Rng::from_entropy()
	};
	dictionary.choose_alphabet(&mut rng).ok_or_else(|| {
		format!(
			"no word with {} distinct letters in dictionary: {}",
			SIZE,
			opts.dictionary
		)
		.into()
	})
}

/// Open the run log requested on the command line, if any.
///
/// # Errors
///
/// If the log file cannot be opened for appending.
fn open_run_log(puzzle: &PuzzleArgs) -> Result<Option<RunLog>, Box<dyn Error>>
{
	Ok(puzzle.log.as_ref().map(RunLog::open).transpose()?)
}
