use crate::config::{ConfigSection, EvolutionConfig};
use crate::engines::evaluation::Objective;
use crate::engines::generation::{
    codec::{GenomeCodec, Individual},
    history::{GenerationRecord, RunHistory},
    operators::{fixed_point_crossover, mean_fitness, mutate, prune, rank_population, select_parent},
    progress::{ProgressCallback, SilentProgressCallback},
};
use crate::error::{BitgaError, Result};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Initialized,
    Running,
    Finished,
}

/// Generational search over one configuration.
///
/// Each generation draws `len / 2` parent pairs with replacement, recombines
/// them at the fixed crossover point, mutates the children, appends them to
/// the population, ranks and records statistics, then prunes back to the
/// population cap. An engine runs once; build a new one for another run.
pub struct EvolutionEngine<O, R = StdRng> {
    config: EvolutionConfig,
    codec: GenomeCodec<O>,
    crossover_point: usize,
    population: Vec<Individual>,
    history: RunHistory,
    state: EngineState,
    rng: R,
}

impl<O: Objective> EvolutionEngine<O, StdRng> {
    /// Seeds from `config.seed`, or from OS entropy when it is unset
    pub fn from_seed(config: EvolutionConfig, objective: O) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config, objective, rng)
    }
}

impl<O: Objective, R: Rng> EvolutionEngine<O, R> {
    pub fn new(config: EvolutionConfig, objective: O, rng: R) -> Result<Self> {
        config.validate()?;
        let codec = GenomeCodec::new(&config, objective)?;
        let crossover_point = codec.bit_length() / 2;

        Ok(Self {
            config,
            codec,
            crossover_point,
            population: Vec::new(),
            history: RunHistory::default(),
            state: EngineState::Initialized,
            rng,
        })
    }

    /// Runs every configured generation
    pub fn run(&mut self) -> Result<&RunHistory> {
        self.run_with_callback(&mut SilentProgressCallback)
    }

    pub fn run_with_callback<C: ProgressCallback + ?Sized>(
        &mut self,
        callback: &mut C,
    ) -> Result<&RunHistory> {
        if self.state != EngineState::Initialized {
            return Err(BitgaError::AlreadyRun);
        }

        log::info!(
            "Starting run: {} generations, {} bits, crossover at {}, {}",
            self.config.max_generations,
            self.codec.bit_length(),
            self.crossover_point,
            self.config.direction.label()
        );

        while self.advance(callback).is_some() {}
        callback.on_run_complete(self.history.len());

        if let Some(best) = self.best_overall() {
            log::info!(
                "Best individual: x = {}, fitness = {:?}",
                best.phenotype(),
                best.fitness()
            );
        }
        Ok(&self.history)
    }

    /// Runs exactly one generation and returns its record.
    ///
    /// Lets the caller pace the run, e.g. to redraw a chart between
    /// generations. Returns `None` once the configured count is reached.
    pub fn step(&mut self) -> Option<GenerationRecord> {
        self.advance(&mut SilentProgressCallback)
    }

    fn advance<C: ProgressCallback + ?Sized>(&mut self, callback: &mut C) -> Option<GenerationRecord> {
        match self.state {
            EngineState::Finished => return None,
            EngineState::Initialized => {
                self.populate_initial();
                self.state = EngineState::Running;
            }
            EngineState::Running => {}
        }

        let generation = self.history.len();
        callback.on_generation_start(generation);
        let record = self.next_generation(generation);
        callback.on_generation_complete(&record);
        self.prune();

        if self.history.len() >= self.config.max_generations {
            self.state = EngineState::Finished;
        }
        Some(record)
    }

    fn populate_initial(&mut self) {
        self.population = (0..self.config.initial_population)
            .map(|_| self.codec.random_individual(&mut self.rng))
            .collect();
        log::debug!("Generated initial population of {}", self.population.len());
    }

    fn next_generation(&mut self, generation: usize) -> GenerationRecord {
        let matings = self.population.len() / 2;
        let mut offspring = Vec::with_capacity(matings * 2);

        for _ in 0..matings {
            let parent1 = select_parent(&self.population, &mut self.rng);
            let parent2 = select_parent(&self.population, &mut self.rng);
            let (genotype_a, genotype_b) =
                fixed_point_crossover(parent1.genotype(), parent2.genotype(), self.crossover_point);

            for genotype in [genotype_a, genotype_b] {
                let child = self.codec.decode(genotype);
                offspring.push(self.mutate_child(child));
            }
        }

        self.population.extend(offspring);
        rank_population(&mut self.population, self.config.direction);

        let unevaluated = self.population.iter().filter(|i| !i.is_evaluated()).count();
        let mean = mean_fitness(&self.population).unwrap_or_else(|| {
            log::warn!("Generation {}: no individual could be evaluated", generation + 1);
            f64::NAN
        });
        if unevaluated > 0 {
            log::warn!(
                "Generation {}: {} of {} individuals have undefined fitness",
                generation + 1,
                unevaluated,
                self.population.len()
            );
        }

        // never empty: initial_population >= 1 and pruning keeps the elite
        let best = self.population[0].clone();
        let worst = self.population[self.population.len() - 1].clone();
        let record = GenerationRecord {
            generation,
            best,
            worst,
            mean_fitness: mean,
            unevaluated,
            population_size: self.population.len(),
        };
        self.history.push(&record);

        log::debug!(
            "Generation {}: {} individuals, best x = {}, mean = {}",
            generation + 1,
            record.population_size,
            record.best.phenotype(),
            record.mean_fitness
        );
        record
    }

    fn mutate_child(&mut self, child: Individual) -> Individual {
        let mut genotype = child.genotype().clone();
        let selected = mutate(
            &mut genotype,
            self.config.individual_mutation_probability,
            self.config.gene_mutation_probability,
            &mut self.rng,
        );

        if selected {
            self.codec.decode(genotype)
        } else {
            child
        }
    }

    fn prune(&mut self) {
        let ranked = std::mem::take(&mut self.population);
        self.population = prune(
            ranked,
            self.config.max_population,
            self.config.pruning,
            &mut self.rng,
        );
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn codec(&self) -> &GenomeCodec<O> {
        &self.codec
    }

    pub fn crossover_point(&self) -> usize {
        self.crossover_point
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Current population; after a completed run, the pruned final population
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    pub fn history(&self) -> &RunHistory {
        &self.history
    }

    pub fn best_overall(&self) -> Option<&Individual> {
        self.history.best_overall(self.config.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evaluation::{FnObjective, Formula};
    use crate::types::OptimizationDirection;

    fn seeded(config: EvolutionConfig) -> EvolutionEngine<Formula> {
        EvolutionEngine::new(config, Formula::default_objective(), StdRng::seed_from_u64(42)).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config_before_running() {
        let config = EvolutionConfig { range_min: 5.0, ..EvolutionConfig::default() };
        let result = EvolutionEngine::new(config, Formula::default_objective(), StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(BitgaError::Configuration(_))));
    }

    #[test]
    fn test_crossover_point_is_half_genome() {
        let engine = seeded(EvolutionConfig::default());
        assert_eq!(engine.codec().bit_length(), 8);
        assert_eq!(engine.crossover_point(), 4);
    }

    #[test]
    fn test_zero_mutation_children_are_pure_recombinations() {
        let config = EvolutionConfig {
            precision: 0.05,
            range_min: -4.0,
            range_max: 4.0,
            initial_population: 4,
            max_population: 4,
            max_generations: 1,
            individual_mutation_probability: 0.0,
            gene_mutation_probability: 0.0,
            ..EvolutionConfig::default()
        };
        let mut engine = seeded(config);
        engine.populate_initial();
        engine.state = EngineState::Running;
        let parents: Vec<Individual> = engine.population.clone();

        let record = engine.next_generation(0);
        let merged = engine.population.clone();
        assert_eq!(merged.len(), 8);
        assert_eq!(record.best, merged[0]);
        assert_eq!(record.worst, merged[7]);

        let point = engine.crossover_point();
        for individual in &merged {
            let bits = individual.genotype().bits();
            let recombined = parents.iter().any(|p1| {
                parents.iter().any(|p2| {
                    bits[..point] == p1.genotype().bits()[..point]
                        && bits[point..] == p2.genotype().bits()[point..]
                })
            });
            assert!(recombined, "{} is not a recombination", individual.genotype());
        }

        let best = record.best.fitness().unwrap();
        assert!(merged.iter().all(|i| i.fitness().unwrap() <= best));

        engine.prune();
        assert_eq!(engine.population.len(), 4);
        assert_eq!(engine.population[0], record.best);
    }

    #[test]
    fn test_engine_is_single_use() {
        let mut engine = seeded(EvolutionConfig { max_generations: 3, ..EvolutionConfig::default() });
        assert_eq!(engine.run().unwrap().len(), 3);
        assert_eq!(engine.state(), EngineState::Finished);
        assert!(matches!(engine.run(), Err(BitgaError::AlreadyRun)));
        assert!(engine.step().is_none());
    }

    #[test]
    fn test_run_rejects_partly_stepped_engine() {
        let mut engine = seeded(EvolutionConfig { max_generations: 3, ..EvolutionConfig::default() });
        assert!(engine.step().is_some());
        assert_eq!(engine.state(), EngineState::Running);
        assert!(matches!(engine.run(), Err(BitgaError::AlreadyRun)));
        assert_eq!(engine.history().len(), 1);

        // stepping still finishes the remaining generations
        while engine.step().is_some() {}
        assert_eq!(engine.history().len(), 3);
        assert_eq!(engine.state(), EngineState::Finished);
    }

    #[test]
    fn test_step_paces_generations() {
        let mut engine = seeded(EvolutionConfig { max_generations: 4, ..EvolutionConfig::default() });
        let mut generations = Vec::new();
        while let Some(record) = engine.step() {
            assert!(engine.population().len() <= engine.config().max_population);
            generations.push(record.generation);
        }
        assert_eq!(generations, vec![0, 1, 2, 3]);
        assert_eq!(engine.history().len(), 4);
    }

    #[test]
    fn test_single_individual_population_never_breeds() {
        let config = EvolutionConfig {
            initial_population: 1,
            max_population: 1,
            max_generations: 5,
            ..EvolutionConfig::default()
        };
        let mut engine = seeded(config);
        let history = engine.run().unwrap();
        let first = history.best_cases()[0].clone();
        assert!(history.best_cases().iter().all(|b| *b == first));
        assert_eq!(engine.population().len(), 1);
    }

    #[test]
    fn test_undefined_fitness_does_not_abort_run() {
        let config = EvolutionConfig {
            range_min: -1.0,
            range_max: 1.0,
            precision: 0.5,
            max_generations: 10,
            ..EvolutionConfig::default()
        };
        let objective = FnObjective::new("log", |x: f64| x.ln());
        let mut engine = EvolutionEngine::new(config, objective, StdRng::seed_from_u64(5)).unwrap();
        let history = engine.run().unwrap();
        assert_eq!(history.len(), 10);

        for record in history.records() {
            if record.best.is_evaluated() {
                assert!(record.mean_fitness.is_finite());
            } else {
                assert!(record.mean_fitness.is_nan());
                assert_eq!(record.unevaluated, record.population_size);
            }
        }
    }

    #[test]
    fn test_minimize_tracks_lower_fitness() {
        let config = EvolutionConfig {
            direction: OptimizationDirection::Minimize,
            max_generations: 30,
            ..EvolutionConfig::default()
        };
        let mut engine = seeded(config);
        let history = engine.run().unwrap();
        for record in history.records() {
            let best = record.best.fitness().unwrap();
            let worst = record.worst.fitness().unwrap();
            assert!(best <= worst);
        }
    }
}
