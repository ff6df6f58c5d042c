use chrono::{DateTime, Utc};
use gensnake_evaluator::{
    action_source::NeuralPolicy,
    genome::{Genome, Topology},
};
use gensnake_training::orchestrator::Champion;
use serde::{Deserialize, Serialize};

/// Best genome of a training run, as exported to JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnakeModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub topology: Topology,
    /// Generation the genome was found in.
    pub generation: usize,
    pub final_fitness: f64,
    pub score: usize,
    pub genome: Genome,
}

impl SnakeModel {
    pub fn from_champion(name: String, topology: Topology, champion: &Champion) -> Self {
        Self {
            name,
            trained_at: Utc::now(),
            topology,
            generation: champion.generation,
            final_fitness: champion.fitness,
            score: champion.score,
            genome: champion.genome.clone(),
        }
    }

    pub fn to_policy(&self) -> anyhow::Result<NeuralPolicy> {
        NeuralPolicy::new(&self.genome, &self.topology).map_err(|err| {
            anyhow::anyhow!("Model {} does not match its topology: {err}", self.name)
        })
    }
}
