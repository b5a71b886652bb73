use crate::engines::generation::codec::Individual;
use crate::engines::generation::genome::Genotype;
use crate::types::{OptimizationDirection, PruningPolicy};
use rand::seq::index;
use rand::Rng;
use std::cmp::Ordering;

/// Uniform pick with replacement; callers draw once per parent slot
pub fn select_parent<'a, R: Rng>(population: &'a [Individual], rng: &mut R) -> &'a Individual {
    &population[rng.gen_range(0..population.len())]
}

/// Single-point crossover at a run-constant `point`.
///
/// Child A takes `a[..point]` and `b[point..]`; child B is the complement.
pub fn fixed_point_crossover(a: &Genotype, b: &Genotype, point: usize) -> (Genotype, Genotype) {
    let (a, b) = (a.bits(), b.bits());
    let point = point.min(a.len()).min(b.len());

    let mut child_a = a[..point].to_vec();
    child_a.extend_from_slice(&b[point..]);
    let mut child_b = b[..point].to_vec();
    child_b.extend_from_slice(&a[point..]);

    (Genotype::from_bits(child_a), Genotype::from_bits(child_b))
}

/// Two-stage bit-flip mutation.
///
/// With `individual_probability` the genotype is selected at all; a selected
/// genotype then flips each bit independently with `gene_probability`.
/// Returns whether the genotype was selected.
pub fn mutate<R: Rng>(
    genotype: &mut Genotype,
    individual_probability: f64,
    gene_probability: f64,
    rng: &mut R,
) -> bool {
    if rng.gen::<f64>() >= individual_probability {
        return false;
    }

    for i in 0..genotype.len() {
        if rng.gen::<f64>() < gene_probability {
            genotype.flip(i);
        }
    }
    true
}

/// Comparator placing the optimum first; unevaluated individuals sort last
pub fn compare(direction: OptimizationDirection, a: &Individual, b: &Individual) -> Ordering {
    match (a.fitness(), b.fitness()) {
        (Some(fa), Some(fb)) => direction.rank(fa, fb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn rank_population(population: &mut [Individual], direction: OptimizationDirection) {
    population.sort_by(|a, b| compare(direction, a, b));
}

/// Arithmetic mean over evaluated individuals, `None` if there are none
pub fn mean_fitness(population: &[Individual]) -> Option<f64> {
    let (sum, count) = population
        .iter()
        .filter_map(Individual::fitness)
        .fold((0.0, 0usize), |(sum, count), f| (sum + f, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Cuts a ranked population down to `cap`.
///
/// Index 0 (the elite) always survives. The remaining `cap - 1` places go to
/// a uniform sample without replacement of the rest under
/// [`PruningPolicy::RandomSample`], or to the next best under
/// [`PruningPolicy::Truncation`]. A pool smaller than the free places is
/// kept whole.
pub fn prune<R: Rng>(
    ranked: Vec<Individual>,
    cap: usize,
    policy: PruningPolicy,
    rng: &mut R,
) -> Vec<Individual> {
    let mut iter = ranked.into_iter();
    let Some(elite) = iter.next() else {
        return Vec::new();
    };
    let rest: Vec<Individual> = iter.collect();
    let slots = cap.saturating_sub(1).min(rest.len());

    let mut survivors = Vec::with_capacity(slots + 1);
    survivors.push(elite);

    match policy {
        PruningPolicy::Truncation => {
            survivors.extend(rest.into_iter().take(slots));
        }
        PruningPolicy::RandomSample => {
            let mut pool: Vec<Option<Individual>> = rest.into_iter().map(Some).collect();
            for i in index::sample(rng, pool.len(), slots) {
                if let Some(individual) = pool[i].take() {
                    survivors.push(individual);
                }
            }
        }
    }

    survivors
}
