//! Generational genetic algorithm over bit-string genomes.
//!
//! Each generation is produced from the previous one as follows:
//!
//! 1. **Elitism** - Every genome whose fitness is strictly above the lower
//!    median is copied unchanged, in population order.
//! 2. **Roulette selection** - Two parents are drawn with probability
//!    proportional to fitness.
//! 3. **Crossover** - The parents are spliced at a single random point
//!    ([`bits::crossover`]).
//! 4. **Mutation** - Every bit of the child flips with probability
//!    `mutation_rate` ([`bits::mutate`]).
//!
//! Steps 2-4 repeat until the new population has the old population's size.
//!
//! # Degenerate Populations
//!
//! Roulette selection needs a positive, finite fitness total. When that does
//! not hold the evolver reports [`SelectionError::DegeneratePopulation`] and
//! then follows its [`SelectionFallback`]: either select parents uniformly or
//! fail the generation.
//!
//! ```
//! use gensnake_training::genetic::{Population, PopulationEvolver, SelectionFallback};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let mut rng = Pcg32::seed_from_u64(0);
//! let population = Population::random(&mut rng, 6, 16);
//! let evolver = PopulationEvolver { mutation_rate: 0.01, fallback: SelectionFallback::Fail };
//! let fitness = [1.0, 5.0, 2.0, 8.0, 3.0, 1.0];
//! let next = evolver.evolve(&population, &fitness, &mut rng).unwrap();
//! assert_eq!(next.len(), 6);
//! // Genomes 1, 3 and 4 beat the lower median (2.0) and come first, in order.
//! assert_eq!(next.genomes()[0], population.genomes()[1]);
//! assert_eq!(next.genomes()[1], population.genomes()[3]);
//! assert_eq!(next.genomes()[2], population.genomes()[4]);
//! ```

use gensnake_evaluator::genome::{Genome, GenomeError, Topology};
use gensnake_stats::descriptive::DescriptiveStats;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bits;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SelectionError {
    #[display("fitness values cannot drive roulette selection (total {total_fitness})")]
    DegeneratePopulation { total_fitness: f64 },
}

/// What to do when roulette selection is impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionFallback {
    /// Draw parents uniformly at random.
    #[default]
    Uniform,
    /// Fail the generation.
    Fail,
}

/// An ordered collection of genomes of equal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    genomes: Vec<Genome>,
}

impl Population {
    /// `count` uniformly random genomes of `genome_len` bits.
    pub fn random<R>(rng: &mut R, count: usize, genome_len: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        let genomes = (0..count).map(|_| bits::random(rng, genome_len)).collect();
        Self { genomes }
    }

    #[must_use]
    pub fn from_genomes(genomes: Vec<Genome>) -> Self {
        Self { genomes }
    }

    #[must_use]
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    #[must_use]
    pub fn into_genomes(self) -> Vec<Genome> {
        self.genomes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Checks every genome against `topology`, returning the index of the
    /// first one that does not fit.
    pub fn validate(&self, topology: &Topology) -> Result<(), (usize, GenomeError)> {
        let expected = topology.genome_len();
        match self.genomes.iter().position(|g| g.len() != expected) {
            Some(index) => Err((
                index,
                GenomeError::LengthMismatch {
                    expected,
                    actual: self.genomes[index].len(),
                },
            )),
            None => Ok(()),
        }
    }
}

/// Cumulative fitness ratios for roulette selection.
///
/// `cutoffs[i]` is the share of total fitness held by genomes `0..=i`. The
/// last cutoff is 1 up to rounding; a draw that lands beyond it selects the
/// last genome.
#[derive(Debug, Clone, PartialEq)]
pub struct RouletteWheel {
    cutoffs: Vec<f64>,
}

impl RouletteWheel {
    pub fn new(fitness: &[f64]) -> Result<Self, SelectionError> {
        let total_fitness: f64 = fitness.iter().sum();
        let valid = fitness.iter().all(|f| f.is_finite() && *f >= 0.0);
        if !valid || !total_fitness.is_finite() || total_fitness <= 0.0 {
            return Err(SelectionError::DegeneratePopulation { total_fitness });
        }
        let cutoffs = fitness
            .iter()
            .scan(0.0, |acc, f| {
                *acc += f / total_fitness;
                Some(*acc)
            })
            .collect();
        Ok(Self { cutoffs })
    }

    #[must_use]
    pub fn cutoffs(&self) -> &[f64] {
        &self.cutoffs
    }

    /// Index of the first cutoff above a uniform draw in `[0, 1)`.
    pub fn select<R>(&self, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        let draw: f64 = rng.random();
        self.index_for(draw)
    }

    #[must_use]
    pub fn index_for(&self, draw: f64) -> usize {
        self.cutoffs
            .iter()
            .position(|&cutoff| draw < cutoff)
            .unwrap_or(self.cutoffs.len().saturating_sub(1))
    }
}

/// Indices of genomes with fitness strictly above the lower median, in
/// population order.
#[must_use]
pub fn elite_indices(fitness: &[f64]) -> Vec<usize> {
    let Some(stats) = DescriptiveStats::new(fitness.iter().copied()) else {
        return vec![];
    };
    fitness
        .iter()
        .enumerate()
        .filter(|&(_, &f)| f > stats.median)
        .map(|(i, _)| i)
        .collect()
}

enum ParentSelector {
    Roulette(RouletteWheel),
    Uniform(usize),
}

impl ParentSelector {
    fn select<R>(&self, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Roulette(wheel) => wheel.select(rng),
            Self::Uniform(len) => rng.random_range(0..*len),
        }
    }
}

/// Produces the next generation from an evaluated population.
#[derive(Debug, Clone)]
pub struct PopulationEvolver {
    /// Per-bit flip probability applied to every child.
    pub mutation_rate: f64,
    pub fallback: SelectionFallback,
}

impl PopulationEvolver {
    /// Builds the next generation.
    ///
    /// `fitness[i]` is the fitness of `population.genomes()[i]`. The result
    /// has the same size: the elites first, then new children.
    ///
    /// # Panics
    ///
    /// Panics if `fitness` and `population` differ in length.
    pub fn evolve<R>(
        &self,
        population: &Population,
        fitness: &[f64],
        rng: &mut R,
    ) -> Result<Population, SelectionError>
    where
        R: Rng + ?Sized,
    {
        assert_eq!(
            population.len(),
            fitness.len(),
            "one fitness value per genome"
        );
        if population.is_empty() {
            return Ok(population.clone());
        }

        let mut next: Vec<Genome> = elite_indices(fitness)
            .into_iter()
            .map(|i| population.genomes[i].clone())
            .collect();

        let selector = match RouletteWheel::new(fitness) {
            Ok(wheel) => ParentSelector::Roulette(wheel),
            Err(err) => match self.fallback {
                SelectionFallback::Uniform => {
                    warn!(%err, "falling back to uniform parent selection");
                    ParentSelector::Uniform(population.len())
                }
                SelectionFallback::Fail => return Err(err),
            },
        };

        while next.len() < population.len() {
            let first = &population.genomes[selector.select(rng)];
            let second = &population.genomes[selector.select(rng)];
            let child = bits::crossover(first, second, rng);
            next.push(bits::mutate(&child, self.mutation_rate, rng));
        }

        Ok(Population { genomes: next })
    }
}
