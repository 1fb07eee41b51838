use std::{hint::black_box, time::Duration};

use const_format::concatcp;
use criterion::{measurement::Measurement, BenchmarkGroup, Criterion};
use edge_word_ga::{
	dictionary::Dictionary,
	fitness::score,
	grid::{Alphabet, ClueGrid, EdgeWord, Individual},
	solver::{run, SolverConfig},
	sweep::{sweep, SweepConfig}
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The path of the directory containing the dictionaries.
#[inline]
#[must_use]
const fn dir() -> &'static str
{
	"dict"
}

/// The name of the dictionary file.
#[inline]
#[must_use]
const fn name() -> &'static str
{
	"english"
}

/// The path to the text file.
#[inline]
#[must_use]
const fn path_txt() -> &'static str
{
	concatcp!(dir(), "/", name(), ".txt")
}

/// The path to the binary file.
#[inline]
#[must_use]
const fn path_dict() -> &'static str
{
	concatcp!(dir(), "/", name(), ".dict")
}

/// The letters of every benchmarked puzzle.
#[inline]
#[must_use]
fn alphabet() -> Alphabet
{
	"WORD".parse().unwrap()
}

/// Benchmark reading a dictionary from a file.
///
/// # Arguments
///
/// * `g` - The benchmark group.
fn bench_read_from_file<M: Measurement>(g: &mut BenchmarkGroup<M>)
{
	g.bench_function("read_from_file", |b| {
		b.iter(|| Dictionary::read_from_file(path_txt()).unwrap());
	});
}

/// Benchmark deserializing a dictionary from a file.
///
/// # Arguments
///
/// * `g` - The benchmark group.
fn bench_deserialize_from_file<M: Measurement>(g: &mut BenchmarkGroup<M>)
{
	g.bench_function("deserialize_from_file", |b| {
		b.iter(|| Dictionary::deserialize_from_file(path_dict()).unwrap());
	});
}

/// Benchmark choosing letters from the dictionary.
///
/// # Arguments
///
/// * `g` - The benchmark group.
fn bench_choose_alphabet<M: Measurement>(g: &mut BenchmarkGroup<M>)
{
	let dictionary = Dictionary::open(dir(), name()).unwrap();
	let mut rng = ChaCha8Rng::seed_from_u64(0);
	g.bench_function("choose_alphabet", |b| {
		b.iter(|| dictionary.choose_alphabet(&mut rng).unwrap());
	});
}

/// Benchmark scoring a candidate board.
///
/// # Arguments
///
/// * `g` - The benchmark group.
fn bench_score<M: Measurement>(g: &mut BenchmarkGroup<M>)
{
	let individual = Individual::parse(
		["W O R D", "R D W O", "O R D W", "D W O R"]
	).unwrap();
	let word = EdgeWord::from(&alphabet());
	let clues = ClueGrid::default();
	g.bench_function("score", |b| {
		b.iter(|| score(black_box(&individual), &clues, Some(&word)));
	});
}

/// Benchmark one complete solver run.
///
/// # Arguments
///
/// * `g` - The benchmark group.
fn bench_run<M: Measurement>(g: &mut BenchmarkGroup<M>)
{
	let config = SolverConfig::new(alphabet());
	g.bench_function("run", |b| {
		b.iter(|| run(config, black_box(0)).unwrap());
	});
}

/// Benchmark a small parallel sweep.
///
/// # Arguments
///
/// * `g` - The benchmark group.
fn bench_sweep<M: Measurement>(g: &mut BenchmarkGroup<M>)
{
	let config = SweepConfig {
		population_sizes: vec![20, 40],
		mutation_rates: vec![0.05, 0.15],
		trials: 16,
		..Default::default()
	};
	g.bench_function("sweep", |b| {
		b.iter(|| sweep(&config, alphabet()).unwrap());
	});
}

/// Run all benchmarks.
///
/// Besides timing the solver, the benchmarking ensures that
/// [`deserialize_from_file`](Dictionary::deserialize_from_file) stays faster
/// than [`read_from_file`](Dictionary::read_from_file).
fn main()
{
	// Ensure that both the text and binary files exist.
	let _ = Dictionary::open(dir(), name()).unwrap();

	// Run the benchmarks.
	let mut criterion = Criterion::default().configure_from_args();
	let mut group = criterion.benchmark_group("benchmarks");
	group.measurement_time(Duration::from_secs(30));
	bench_read_from_file(&mut group);
	bench_deserialize_from_file(&mut group);
	bench_choose_alphabet(&mut group);
	bench_score(&mut group);
	bench_run(&mut group);
	bench_sweep(&mut group);
	group.finish();

	// Generate the final summary.
	criterion.final_summary();
}
