use super::codec::Individual;
use super::operators::compare;
use crate::types::OptimizationDirection;

/// Statistics of one generation, taken from the merged and ranked population
/// before pruning.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRecord {
    pub generation: usize,
    pub best: Individual,
    pub worst: Individual,
    /// Mean over evaluated individuals; NaN if none were evaluated
    pub mean_fitness: f64,
    pub unevaluated: usize,
    pub population_size: usize,
}

/// Append-only per-generation statistics of a run.
///
/// The sequences are parallel: index `g` of each belongs to generation `g`.
#[derive(Debug, Clone, Default)]
pub struct RunHistory {
    best_cases: Vec<Individual>,
    worst_cases: Vec<Individual>,
    mean_fitness: Vec<f64>,
    unevaluated: Vec<usize>,
    population_sizes: Vec<usize>,
}

impl RunHistory {
    pub fn push(&mut self, record: &GenerationRecord) {
        debug_assert_eq!(record.generation, self.len());
        self.best_cases.push(record.best.clone());
        self.worst_cases.push(record.worst.clone());
        self.mean_fitness.push(record.mean_fitness);
        self.unevaluated.push(record.unevaluated);
        self.population_sizes.push(record.population_size);
    }

    pub fn len(&self) -> usize {
        self.mean_fitness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean_fitness.is_empty()
    }

    pub fn best_cases(&self) -> &[Individual] {
        &self.best_cases
    }

    pub fn worst_cases(&self) -> &[Individual] {
        &self.worst_cases
    }

    pub fn mean_fitness(&self) -> &[f64] {
        &self.mean_fitness
    }

    pub fn unevaluated(&self) -> &[usize] {
        &self.unevaluated
    }

    pub fn record(&self, generation: usize) -> Option<GenerationRecord> {
        Some(GenerationRecord {
            generation,
            best: self.best_cases.get(generation)?.clone(),
            worst: self.worst_cases.get(generation)?.clone(),
            mean_fitness: *self.mean_fitness.get(generation)?,
            unevaluated: *self.unevaluated.get(generation)?,
            population_size: *self.population_sizes.get(generation)?,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = GenerationRecord> + '_ {
        (0..self.len()).filter_map(move |g| self.record(g))
    }

    /// Best individual seen in any generation; earliest wins ties
    pub fn best_overall(&self, direction: OptimizationDirection) -> Option<&Individual> {
        self.best_cases.iter().reduce(|incumbent, candidate| {
            if compare(direction, candidate, incumbent).is_lt() {
                candidate
            } else {
                incumbent
            }
        })
    }
}
