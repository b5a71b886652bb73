use super::genome::Genotype;
use crate::config::EvolutionConfig;
use crate::engines::evaluation::Objective;
use crate::error::{BitgaError, EvaluationError, Result};
use rand::Rng;

/// Widest genome the codec accepts; keeps every integer value exact in a `u64`
pub const MAX_GENOME_BITS: usize = 63;

/// Number of bits needed for the interval `[min, max]` sampled every `precision`.
///
/// With `points = ceil((max - min) / precision) + 1`, this is the bit length of
/// `points` written in binary, i.e. `floor(log2(points)) + 1`.
pub fn genome_length(precision: f64, min: f64, max: f64) -> Result<usize> {
    let steps = ((max - min) / precision).ceil();
    if !steps.is_finite() || steps < 0.0 || steps >= (1u64 << MAX_GENOME_BITS) as f64 {
        return Err(BitgaError::Configuration(format!(
            "Range [{}, {}] at precision {} needs more than {} bits",
            min, max, precision, MAX_GENOME_BITS
        )));
    }

    let points = steps as u64 + 1;
    let bits = (u64::BITS - points.leading_zeros()) as usize;
    if bits > MAX_GENOME_BITS {
        return Err(BitgaError::Configuration(format!(
            "Genome length {} exceeds the {}-bit limit",
            bits, MAX_GENOME_BITS
        )));
    }
    Ok(bits)
}

/// A decoded candidate solution.
///
/// Only [`GenomeCodec::decode`] builds one, so the integer value, phenotype
/// and fitness always describe the genotype it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    genotype: Genotype,
    integer_value: u64,
    phenotype: f64,
    fitness: std::result::Result<f64, EvaluationError>,
}

impl Individual {
    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    pub fn integer_value(&self) -> u64 {
        self.integer_value
    }

    pub fn phenotype(&self) -> f64 {
        self.phenotype
    }

    /// Objective value at the phenotype, `None` if evaluation failed
    pub fn fitness(&self) -> Option<f64> {
        self.fitness.as_ref().ok().copied()
    }

    pub fn evaluation_error(&self) -> Option<&EvaluationError> {
        self.fitness.as_ref().err()
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_ok()
    }

    pub fn into_genotype(self) -> Genotype {
        self.genotype
    }
}

/// Maps genotypes to individuals for one search interval and objective
pub struct GenomeCodec<O> {
    precision: f64,
    min: f64,
    max: f64,
    bits: usize,
    objective: O,
}

impl<O: Objective> GenomeCodec<O> {
    pub fn new(config: &EvolutionConfig, objective: O) -> Result<Self> {
        let bits = genome_length(config.precision, config.range_min, config.range_max)?;
        Ok(Self {
            precision: config.precision,
            min: config.range_min,
            max: config.range_max,
            bits,
            objective,
        })
    }

    pub fn bit_length(&self) -> usize {
        self.bits
    }

    pub fn objective(&self) -> &O {
        &self.objective
    }

    /// `min + i * precision`, clamped to `max`.
    ///
    /// Integers near the top of the bit range may all land on `max`.
    pub fn phenotype_of(&self, integer_value: u64) -> f64 {
        let x = self.min + integer_value as f64 * self.precision;
        x.min(self.max)
    }

    pub fn decode(&self, genotype: Genotype) -> Individual {
        debug_assert_eq!(genotype.len(), self.bits);

        let integer_value = genotype.to_integer();
        let phenotype = self.phenotype_of(integer_value);
        let fitness = self.objective.evaluate(phenotype);
        if let Err(e) = &fitness {
            log::debug!("Genotype {} left unevaluated: {}", genotype, e);
        }

        Individual {
            genotype,
            integer_value,
            phenotype,
            fitness,
        }
    }

    /// Every bit drawn independently and uniformly
    pub fn random_genotype<R: Rng>(&self, rng: &mut R) -> Genotype {
        Genotype::from_bits((0..self.bits).map(|_| rng.gen::<bool>()).collect())
    }

    pub fn random_individual<R: Rng>(&self, rng: &mut R) -> Individual {
        let genotype = self.random_genotype(rng);
        self.decode(genotype)
    }
}
