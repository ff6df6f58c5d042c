//! Training loop state machine.
//!
//! A [`Trainer`] evaluates the genomes of the current population one after
//! another, then evolves the next population. It can be driven at three
//! granularities:
//!
//! - [`Trainer::tick`] advances the genome under evaluation by one frame, so a
//!   caller can interleave training with rendering
//! - [`Trainer::run_generation`] ticks until a generation completes
//! - [`Trainer::run_generation_parallel`] evaluates a whole generation on
//!   worker threads with the same result as ticking
//!
//! ```text
//!        ┌──────── next genome ────────┐
//!        v                             │
//!      Idle ──> Evaluating ──> Terminated
//!                   │  ^
//!                   └──┘ frame
//! ```
//!
//! After the last genome of a generation terminates, the same tick evolves the
//! population and notifies every [`GenerationObserver`].

use std::{io, mem, num::NonZero, panic, thread};

use gensnake_engine::{FruitSeed, GameConfig, GameState};
use gensnake_evaluator::{
    action_source::NeuralPolicy,
    fitness::{FitnessFunction as _, FitnessRecord, FoodSeekingFitness},
    genome::{Genome, Topology},
    session::Session,
};
use gensnake_stats::descriptive::mean;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    TrainingError,
    config::TrainingConfig,
    genetic::{Population, PopulationEvolver},
};

/// Per-generation report handed to observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    /// 1-based number of the generation that was just evaluated.
    pub generation: usize,
    pub best_index: usize,
    pub best_genome: Genome,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub mean_score: f64,
    pub max_score: usize,
}

impl GenerationSummary {
    /// Summarizes an evaluated population. Ties for best go to the lowest index.
    ///
    /// # Panics
    ///
    /// Panics if `records` is empty or differs in length from `population`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(generation: usize, population: &Population, records: &[FitnessRecord]) -> Self {
        assert_eq!(population.len(), records.len());
        let mut best_index = 0;
        for (i, record) in records.iter().enumerate() {
            if record.fitness > records[best_index].fitness {
                best_index = i;
            }
        }
        Self {
            generation,
            best_index,
            best_genome: population.genomes()[best_index].clone(),
            best_fitness: records[best_index].fitness,
            mean_fitness: mean(records.iter().map(|r| r.fitness)).unwrap_or_default(),
            mean_score: mean(records.iter().map(|r| r.score as f64)).unwrap_or_default(),
            max_score: records.iter().map(|r| r.score).max().unwrap_or_default(),
        }
    }
}

/// Receives each completed generation.
pub trait GenerationObserver {
    fn on_generation(
        &mut self,
        summary: &GenerationSummary,
        next_population: &Population,
    ) -> io::Result<()>;
}

impl<F> GenerationObserver for F
where
    F: FnMut(&GenerationSummary, &Population) -> io::Result<()>,
{
    fn on_generation(
        &mut self,
        summary: &GenerationSummary,
        next_population: &Population,
    ) -> io::Result<()> {
        self(summary, next_population)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TrainerPhase {
    /// No genome is loaded; the next tick starts one.
    Idle,
    Evaluating,
    /// The genome's game just ended; its final board is still inspectable.
    Terminated,
}

#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum TickOutcome {
    Stepped,
    GenomeFinished { genome: usize, record: FitnessRecord },
    GenerationFinished(GenerationSummary),
}

/// Best genome seen across all generations of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Champion {
    pub generation: usize,
    pub genome: Genome,
    pub fitness: f64,
    pub score: usize,
}

#[derive(Debug, Clone)]
struct Evaluator {
    topology: Topology,
    game_config: GameConfig,
    fitness: FoodSeekingFitness,
    frame_limit: Option<usize>,
}

impl Evaluator {
    fn open(
        &self,
        genome: &Genome,
        seed: FruitSeed,
        generation: usize,
        index: usize,
    ) -> Result<Session<NeuralPolicy>, TrainingError> {
        let policy = NeuralPolicy::new(genome, &self.topology).map_err(|source| {
            TrainingError::MalformedGenome {
                generation,
                genome: index,
                source,
            }
        })?;
        let game = GameState::new(self.game_config, seed).map_err(|err| TrainingError::Config {
            reason: err.to_string(),
        })?;
        Ok(Session::new(game, policy, self.frame_limit))
    }

    fn evaluate(
        &self,
        genome: &Genome,
        seed: FruitSeed,
        generation: usize,
        index: usize,
    ) -> Result<FitnessRecord, TrainingError> {
        let stats = self
            .open(genome, seed, generation, index)?
            .play()
            .map_err(|source| TrainingError::Simulation {
                generation,
                genome: index,
                source,
            })?;
        let record = self.fitness.record(&stats);
        debug!(
            generation,
            genome = index,
            fitness = record.fitness,
            score = record.score,
            end = %stats.end,
            "genome evaluated"
        );
        Ok(record)
    }
}

enum Phase {
    Idle,
    Evaluating(Box<Session<NeuralPolicy>>),
    Terminated(Box<Session<NeuralPolicy>>),
}

pub struct Trainer {
    config: TrainingConfig,
    evaluator: Evaluator,
    evolver: PopulationEvolver,
    rng: Pcg32,
    population: Population,
    generation: usize,
    records: Vec<FitnessRecord>,
    phase: Phase,
    champion: Option<Champion>,
    observers: Vec<Box<dyn GenerationObserver>>,
}

impl Trainer {
    /// Starts a run from a random population.
    pub fn new(config: TrainingConfig) -> Result<Self, TrainingError> {
        config.validate()?;
        let mut rng = master_rng(config.seed, 0);
        let population = Population::random(
            &mut rng,
            config.population_size,
            config.topology().genome_len(),
        );
        Ok(Self::with_parts(config, rng, population, 0))
    }

    /// Continues a run from a saved population.
    ///
    /// `completed_generations` sets the generation numbering and is mixed into
    /// the configured seed, so a resumed run does not replay the fruit seeds
    /// of its first generations. Every genome must fit the configured
    /// topology and the population must have the configured size.
    pub fn resume(
        config: TrainingConfig,
        population: Population,
        completed_generations: usize,
    ) -> Result<Self, TrainingError> {
        config.validate()?;
        if population.len() != config.population_size {
            return Err(TrainingError::Config {
                reason: format!(
                    "population has {} genomes but the configuration asks for {}",
                    population.len(),
                    config.population_size
                ),
            });
        }
        population
            .validate(&config.topology())
            .map_err(|(genome, source)| TrainingError::MalformedGenome {
                generation: completed_generations + 1,
                genome,
                source,
            })?;
        let rng = master_rng(config.seed, completed_generations);
        Ok(Self::with_parts(config, rng, population, completed_generations))
    }

    fn with_parts(
        config: TrainingConfig,
        rng: Pcg32,
        population: Population,
        generation: usize,
    ) -> Self {
        let evaluator = Evaluator {
            topology: config.topology(),
            game_config: config.game_config(),
            fitness: config.fitness(),
            frame_limit: config.frame_limit(),
        };
        let evolver = PopulationEvolver {
            mutation_rate: config.mutation_rate,
            fallback: config.selection_fallback,
        };
        Self {
            config,
            evaluator,
            evolver,
            rng,
            population,
            generation,
            records: Vec::new(),
            phase: Phase::Idle,
            champion: None,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn GenerationObserver>) {
        self.observers.push(observer);
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Number of completed generations.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Fitness records of the current generation evaluated so far.
    #[must_use]
    pub fn records(&self) -> &[FitnessRecord] {
        &self.records
    }

    #[must_use]
    pub fn champion(&self) -> Option<&Champion> {
        self.champion.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> TrainerPhase {
        match self.phase {
            Phase::Idle => TrainerPhase::Idle,
            Phase::Evaluating(_) => TrainerPhase::Evaluating,
            Phase::Terminated(_) => TrainerPhase::Terminated,
        }
    }

    /// Game of the genome under evaluation, or of the one that just ended.
    #[must_use]
    pub fn current_game(&self) -> Option<&GameState> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Evaluating(session) | Phase::Terminated(session) => Some(session.game()),
        }
    }

    /// Advances the training by one simulation frame.
    pub fn tick(&mut self) -> Result<TickOutcome, TrainingError> {
        let mut session = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Evaluating(session) => session,
            Phase::Idle | Phase::Terminated(_) => Box::new(self.start_genome()?),
        };
        let index = self.records.len();
        let generation = self.generation + 1;
        let finished = session
            .advance()
            .map_err(|source| TrainingError::Simulation {
                generation,
                genome: index,
                source,
            })?;
        let Some(stats) = finished else {
            self.phase = Phase::Evaluating(session);
            return Ok(TickOutcome::Stepped);
        };

        let record = self.evaluator.fitness.record(&stats);
        debug!(
            generation,
            genome = index,
            fitness = record.fitness,
            score = record.score,
            end = %stats.end,
            "genome evaluated"
        );
        self.records.push(record);
        self.phase = Phase::Terminated(session);
        if self.records.len() < self.population.len() {
            return Ok(TickOutcome::GenomeFinished {
                genome: index,
                record,
            });
        }
        Ok(TickOutcome::GenerationFinished(self.finish_generation()?))
    }

    fn start_genome(&mut self) -> Result<Session<NeuralPolicy>, TrainingError> {
        let index = self.records.len();
        let seed: FruitSeed = self.rng.random();
        self.evaluator.open(
            &self.population.genomes()[index],
            seed,
            self.generation + 1,
            index,
        )
    }

    /// Ticks until the current generation completes.
    pub fn run_generation(&mut self) -> Result<GenerationSummary, TrainingError> {
        loop {
            if let TickOutcome::GenerationFinished(summary) = self.tick()? {
                return Ok(summary);
            }
        }
    }

    /// Evaluates a whole generation on worker threads.
    ///
    /// Fruit seeds are drawn from the master generator in population order
    /// before any worker starts, so the outcome matches [`Self::run_generation`].
    /// A generation that is already partially evaluated is finished by ticking.
    pub fn run_generation_parallel(&mut self) -> Result<GenerationSummary, TrainingError> {
        if !self.records.is_empty() || matches!(self.phase, Phase::Evaluating(_)) {
            return self.run_generation();
        }
        self.phase = Phase::Idle;

        let generation = self.generation + 1;
        let seeds: Vec<FruitSeed> = (0..self.population.len())
            .map(|_| self.rng.random())
            .collect();
        let evaluator = &self.evaluator;
        let genomes = self.population.genomes();
        let workers = thread::available_parallelism()
            .map_or(1, NonZero::get)
            .min(genomes.len())
            .max(1);
        let chunk_len = genomes.len().div_ceil(workers).max(1);

        let results: Vec<Result<FitnessRecord, TrainingError>> = thread::scope(|s| {
            let handles: Vec<_> = genomes
                .chunks(chunk_len)
                .zip(seeds.chunks(chunk_len))
                .enumerate()
                .map(|(chunk, (genomes, seeds))| {
                    s.spawn(move || {
                        genomes
                            .iter()
                            .zip(seeds)
                            .enumerate()
                            .map(|(i, (genome, &seed))| {
                                evaluator.evaluate(genome, seed, generation, chunk * chunk_len + i)
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| panic::resume_unwind(payload))
                })
                .collect()
        });
        self.records = results.into_iter().collect::<Result<_, _>>()?;
        self.finish_generation()
    }

    /// Runs `generations` more generations, in parallel when configured.
    ///
    /// Returns the summary of the last one, or `None` if `generations` is 0.
    pub fn run(&mut self, generations: usize) -> Result<Option<GenerationSummary>, TrainingError> {
        let mut last = None;
        for _ in 0..generations {
            let summary = if self.config.parallel {
                self.run_generation_parallel()?
            } else {
                self.run_generation()?
            };
            last = Some(summary);
        }
        Ok(last)
    }

    /// Evolves the evaluated population. On failure the generation is
    /// discarded and the next tick evaluates it again from its first genome.
    fn finish_generation(&mut self) -> Result<GenerationSummary, TrainingError> {
        let result = self.complete_generation();
        if result.is_err() {
            self.records.clear();
            self.phase = Phase::Idle;
        }
        result
    }

    fn complete_generation(&mut self) -> Result<GenerationSummary, TrainingError> {
        let generation = self.generation + 1;
        let summary = GenerationSummary::new(generation, &self.population, &self.records);
        let fitness: Vec<f64> = self.records.iter().map(|r| r.fitness).collect();
        let next = self
            .evolver
            .evolve(&self.population, &fitness, &mut self.rng)
            .map_err(|source| TrainingError::Selection { generation, source })?;

        info!(
            generation,
            best_fitness = summary.best_fitness,
            mean_fitness = summary.mean_fitness,
            mean_score = summary.mean_score,
            max_score = summary.max_score,
            "generation complete"
        );

        for observer in &mut self.observers {
            observer
                .on_generation(&summary, &next)
                .map_err(|source| TrainingError::Artifact { generation, source })?;
        }

        let best_record = self.records[summary.best_index];
        if self
            .champion
            .as_ref()
            .is_none_or(|champion| best_record.fitness > champion.fitness)
        {
            self.champion = Some(Champion {
                generation,
                genome: summary.best_genome.clone(),
                fitness: best_record.fitness,
                score: best_record.score,
            });
        }

        self.population = next;
        self.records.clear();
        self.generation = generation;
        Ok(summary)
    }
}

fn master_rng(seed: Option<u64>, completed_generations: usize) -> Pcg32 {
    match seed {
        Some(seed) => {
            let offset = u64::try_from(completed_generations).unwrap_or(u64::MAX);
            Pcg32::seed_from_u64(seed ^ offset.wrapping_mul(0x9e37_79b9_7f4a_7c15))
        }
        None => Pcg32::from_rng(&mut rand::rng()),
    }
}
