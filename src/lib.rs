//! # Edge Word GA
//!
//! An edge word puzzle is a 4×4 Latin-square variant over four symbols: every
//! row, every column, and every 2×2 block must contain each symbol exactly
//! once. A handful of cells are fixed in advance as clues, the corners are
//! always left free, and the completed board must additionally spell a given
//! four-letter word along one of its edges, reading left-to-right or
//! top-to-bottom.
//!
//! This crate solves such puzzles with a genetic algorithm: a population of
//! candidate boards evolves by tournament selection, single-cut crossover, and
//! swap mutation, scored by a fitness function that counts constraint
//! violations. A [sweep](sweep) runs the solver many times over a grid of
//! hyperparameters and ranks the combinations by success rate and speed.

pub mod dictionary;
pub mod fitness;
pub mod generator;
pub mod grid;
pub mod operators;
pub mod run_log;
pub mod solver;
pub mod sweep;
