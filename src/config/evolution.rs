use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::engines::generation::codec::genome_length;
use crate::error::BitgaError;
use crate::types::{OptimizationDirection, PruningPolicy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Distance between two adjacent representable phenotypes
    pub precision: f64,
    pub range_min: f64,
    pub range_max: f64,
    pub max_generations: usize,
    /// Population cap applied by pruning after every generation
    pub max_population: usize,
    pub initial_population: usize,
    pub individual_mutation_probability: f64,
    pub gene_mutation_probability: f64,
    pub direction: OptimizationDirection,
    pub pruning: PruningPolicy,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            precision: 0.05,
            range_min: -4.0,
            range_max: 4.0,
            max_generations: 50,
            max_population: 20,
            initial_population: 10,
            individual_mutation_probability: 0.25,
            gene_mutation_probability: 0.1,
            direction: OptimizationDirection::Maximize,
            pruning: PruningPolicy::RandomSample,
            seed: None,
        }
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), BitgaError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(BitgaError::Configuration(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )));
    }
    Ok(())
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), BitgaError> {
        if !self.precision.is_finite() || self.precision <= 0.0 {
            return Err(BitgaError::Configuration(
                "Precision must be a positive number".to_string()
            ));
        }
        if !self.range_min.is_finite() || !self.range_max.is_finite() {
            return Err(BitgaError::Configuration(
                "Range bounds must be finite".to_string()
            ));
        }
        if self.range_min >= self.range_max {
            return Err(BitgaError::Configuration(format!(
                "Range minimum ({}) must be below range maximum ({})",
                self.range_min, self.range_max
            )));
        }
        if self.max_generations == 0 {
            return Err(BitgaError::Configuration(
                "Generation count must be at least 1".to_string()
            ));
        }
        if self.max_population == 0 {
            return Err(BitgaError::Configuration(
                "Population cap must be at least 1".to_string()
            ));
        }
        if self.initial_population == 0 {
            return Err(BitgaError::Configuration(
                "Initial population must be at least 1".to_string()
            ));
        }
        check_probability("Individual mutation probability", self.individual_mutation_probability)?;
        check_probability("Gene mutation probability", self.gene_mutation_probability)?;

        genome_length(self.precision, self.range_min, self.range_max)?;
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        let defaults = Self::default();
        ConfigManifest {
            section: "Evolution".to_string(),
            fields: vec![
                FieldManifest::new(
                    "precision",
                    "float",
                    serde_json::json!(defaults.precision),
                    (Some(f64::MIN_POSITIVE), None),
                    "Step between adjacent representable x values",
                ),
                FieldManifest::new(
                    "range_min",
                    "float",
                    serde_json::json!(defaults.range_min),
                    (None, None),
                    "Lower bound of the search interval",
                ),
                FieldManifest::new(
                    "range_max",
                    "float",
                    serde_json::json!(defaults.range_max),
                    (None, None),
                    "Upper bound of the search interval",
                ),
                FieldManifest::new(
                    "max_generations",
                    "integer",
                    serde_json::json!(defaults.max_generations),
                    (Some(1.0), None),
                    "Number of generations to run",
                ),
                FieldManifest::new(
                    "max_population",
                    "integer",
                    serde_json::json!(defaults.max_population),
                    (Some(1.0), None),
                    "Population size kept after each pruning step",
                ),
                FieldManifest::new(
                    "initial_population",
                    "integer",
                    serde_json::json!(defaults.initial_population),
                    (Some(1.0), None),
                    "Number of random individuals in generation zero",
                ),
                FieldManifest::new(
                    "individual_mutation_probability",
                    "float",
                    serde_json::json!(defaults.individual_mutation_probability),
                    (Some(0.0), Some(1.0)),
                    "Chance that an offspring is considered for mutation",
                ),
                FieldManifest::new(
                    "gene_mutation_probability",
                    "float",
                    serde_json::json!(defaults.gene_mutation_probability),
                    (Some(0.0), Some(1.0)),
                    "Chance that each bit of a mutating offspring flips",
                ),
                FieldManifest::new(
                    "direction",
                    "enum",
                    serde_json::json!(defaults.direction),
                    (None, None),
                    "maximize or minimize",
                ),
                FieldManifest::new(
                    "pruning",
                    "enum",
                    serde_json::json!(defaults.pruning),
                    (None, None),
                    "random_sample or truncation",
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EvolutionConfig::default().validate().is_ok());
    }

    fn rejected(mutate: impl Fn(&mut EvolutionConfig)) -> bool {
        let mut config = EvolutionConfig::default();
        mutate(&mut config);
        matches!(config.validate(), Err(BitgaError::Configuration(_)))
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(rejected(|c| c.precision = 0.0));
        assert!(rejected(|c| c.precision = -0.1));
        assert!(rejected(|c| c.precision = f64::NAN));
        assert!(rejected(|c| c.range_min = 4.0));
        assert!(rejected(|c| c.range_max = f64::INFINITY));
        assert!(rejected(|c| c.max_generations = 0));
        assert!(rejected(|c| c.max_population = 0));
        assert!(rejected(|c| c.initial_population = 0));
        assert!(rejected(|c| c.individual_mutation_probability = 1.5));
        assert!(rejected(|c| c.gene_mutation_probability = -0.1));
        // needs far more than 63 bits
        assert!(rejected(|c| c.precision = 1e-30));
    }

    #[test]
    fn test_manifest_lists_every_field() {
        let manifest = EvolutionConfig::default().to_manifest();
        assert_eq!(manifest.fields.len(), 10);
        assert!(manifest.fields.iter().any(|f| f.name == "gene_mutation_probability"));
    }
}
