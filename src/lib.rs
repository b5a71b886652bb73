//! Binary-encoded genetic algorithm for locating the minimum or maximum of a
//! single-variable function over a bounded interval.
//!
//! The search space `[min, max]` is sampled every `precision` units and each
//! sample point is addressed by a fixed-length bit string. The
//! [`EvolutionEngine`] evolves a population of those bit strings and records
//! the best, worst and mean fitness of every generation.

pub mod config;
pub mod engines;
pub mod error;
pub mod report;
pub mod types;

pub use crate::config::{AppConfig, ConfigManager, EvolutionConfig, ObjectiveConfig};
pub use engines::evaluation::{FnObjective, Formula, Objective};
pub use engines::generation::{
    EvolutionEngine, GenerationRecord, GenomeCodec, Genotype, Individual, ProgressCallback,
    RunHistory,
};
pub use error::{BitgaError, EvaluationError, Result};
pub use report::RunReport;
pub use types::{OptimizationDirection, PruningPolicy};
