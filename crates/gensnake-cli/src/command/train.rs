use std::path::PathBuf;

use anyhow::Context as _;
use gensnake_training::{
    artifact::ArtifactWriter,
    config::TrainingConfig,
    orchestrator::{GenerationObserver as _, Trainer},
};
use tracing::info;

use crate::{
    model::SnakeModel,
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training configuration file (JSON). Flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Resume from a population snapshot (`population_<N>.txt`)
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Directory for the generation log and population snapshots
    #[arg(long, default_value = "./data/training/")]
    out_dir: PathBuf,
    /// Model output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Name recorded in the model file
    #[arg(long, default_value = "snake")]
    name: String,
    #[arg(long)]
    population_size: Option<usize>,
    #[arg(long)]
    generations: Option<usize>,
    #[arg(long)]
    hidden_nodes: Option<usize>,
    #[arg(long)]
    bits_per_weight: Option<usize>,
    #[arg(long)]
    mutation_rate: Option<f64>,
    #[arg(long)]
    rows: Option<usize>,
    #[arg(long)]
    cols: Option<usize>,
    /// Frames without fruit before a game ends (0 disables)
    #[arg(long)]
    idle_bound: Option<i64>,
    /// Hard cap on frames per genome (0 disables)
    #[arg(long)]
    max_frames: Option<usize>,
    /// Write a population snapshot every this many generations (0 disables)
    #[arg(long)]
    snapshot_interval: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Evaluate genomes on worker threads
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

impl TrainArg {
    fn training_config(&self) -> anyhow::Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_training_config_file(path)?,
            None => TrainingConfig::default(),
        };
        let overrides = [
            (self.population_size, &mut config.population_size),
            (self.generations, &mut config.max_generations),
            (self.hidden_nodes, &mut config.hidden_nodes),
            (self.bits_per_weight, &mut config.bits_per_weight),
            (self.rows, &mut config.rows),
            (self.cols, &mut config.cols),
            (self.max_frames, &mut config.max_frames_per_genome),
            (self.snapshot_interval, &mut config.snapshot_interval),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(rate) = self.mutation_rate {
            config.mutation_rate = rate;
        }
        if let Some(bound) = self.idle_bound {
            config.idle_bound = bound;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.parallel |= self.parallel;
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.training_config()?;
    let topology = config.topology();

    let mut trainer = match &arg.resume {
        Some(path) => {
            let (population, completed) = util::read_population_snapshot(path)?;
            info!(
                path = %path.display(),
                completed_generations = completed,
                "resuming from snapshot"
            );
            Trainer::resume(config.clone(), population, completed)?
        }
        None => Trainer::new(config.clone())?,
    };
    let generations = remaining_generations(&config, trainer.generation());
    let mut writer = ArtifactWriter::create(&arg.out_dir, config.snapshot_interval)
        .with_context(|| {
            format!(
                "Failed to open training directory: {}",
                arg.out_dir.display()
            )
        })?;

    eprintln!(
        "Training {} genomes of {} bits for {generations} more generations",
        config.population_size,
        topology.genome_len()
    );
    for _ in 0..generations {
        let summary = if config.parallel {
            trainer.run_generation_parallel()?
        } else {
            trainer.run_generation()?
        };
        writer
            .on_generation(&summary, trainer.population())
            .with_context(|| {
                format!(
                    "Failed to record generation {} in {}",
                    summary.generation,
                    arg.out_dir.display()
                )
            })?;
        eprintln!(
            "Generation #{:4}: best {:10.3}  mean {:10.3}  mean score {:6.2}  best score {:3}",
            summary.generation,
            summary.best_fitness,
            summary.mean_fitness,
            summary.mean_score,
            summary.max_score
        );
    }
    writer
        .finish()
        .with_context(|| format!("Failed to write artifacts to {}", arg.out_dir.display()))?;

    let champion = trainer
        .champion()
        .context("No generation was evaluated, nothing to save")?;
    let model = SnakeModel::from_champion(arg.name.clone(), topology, champion);
    Output::save_json(&model, arg.output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Generation: {}", model.generation);
    eprintln!("  Final fitness: {:.3}", model.final_fitness);
    eprintln!("  Score: {}", model.score);

    Ok(())
}

/// Generations left before `max_generations` is reached.
fn remaining_generations(config: &TrainingConfig, completed: usize) -> usize {
    config.max_generations.saturating_sub(completed)
}
