use crate::config::EvolutionConfig;
use crate::engines::evaluation::Objective;
use crate::engines::generation::{EvolutionEngine, Individual};
use crate::error::Result;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Flat view of an individual for display and export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualSummary {
    pub genotype: String,
    pub integer_value: u64,
    pub phenotype: f64,
    pub fitness: Option<f64>,
    pub error: Option<String>,
}

impl From<&Individual> for IndividualSummary {
    fn from(individual: &Individual) -> Self {
        Self {
            genotype: individual.genotype().to_string(),
            integer_value: individual.integer_value(),
            phenotype: individual.phenotype(),
            fitness: individual.fitness(),
            error: individual.evaluation_error().map(|e| e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRow {
    pub generation: usize,
    pub best: IndividualSummary,
    pub worst: IndividualSummary,
    /// `None` when no individual of the generation could be evaluated
    pub mean_fitness: Option<f64>,
    pub unevaluated: usize,
}

/// End-of-run summary, serialized by the CLI's `--report`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub objective: String,
    pub config: EvolutionConfig,
    pub genome_length: usize,
    pub crossover_point: usize,
    pub generations: Vec<GenerationRow>,
    pub best_overall: Option<IndividualSummary>,
    pub final_population: Vec<IndividualSummary>,
}

impl RunReport {
    pub fn from_engine<O: Objective, R: Rng>(engine: &EvolutionEngine<O, R>) -> Self {
        let generations = engine
            .history()
            .records()
            .map(|record| GenerationRow {
                generation: record.generation,
                best: (&record.best).into(),
                worst: (&record.worst).into(),
                mean_fitness: Some(record.mean_fitness).filter(|m| !m.is_nan()),
                unevaluated: record.unevaluated,
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            objective: engine.codec().objective().describe(),
            config: engine.config().clone(),
            genome_length: engine.codec().bit_length(),
            crossover_point: engine.crossover_point(),
            generations,
            best_overall: engine.best_overall().map(IndividualSummary::from),
            final_population: engine.population().iter().map(IndividualSummary::from).collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
