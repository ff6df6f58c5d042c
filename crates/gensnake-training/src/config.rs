use gensnake_engine::{GameConfig, IdleLimits};
use gensnake_evaluator::{
    action_source::NeuralPolicy, fitness::FoodSeekingFitness, genome::Topology,
};
use serde::{Deserialize, Serialize};

use crate::{TrainingError, genetic::SelectionFallback};

/// All knobs of a training run.
///
/// Loadable from JSON; missing fields take their defaults.
///
/// ```
/// use gensnake_training::config::TrainingConfig;
///
/// let config: TrainingConfig = serde_json::from_str(r#"{ "population_size": 50 }"#).unwrap();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.hidden_nodes, 10);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    pub population_size: usize,
    pub bits_per_weight: usize,
    pub inputs: usize,
    pub hidden_nodes: usize,
    pub outputs: usize,
    pub rows: usize,
    pub cols: usize,
    pub mutation_rate: f64,
    /// Frames without fruit before a game ends. Non-positive disables it.
    pub idle_bound: i64,
    /// Tighter idle bound for low scorers. Non-positive disables it.
    pub short_idle_bound: i64,
    pub short_idle_score_cutoff: usize,
    pub starvation_window: usize,
    /// Hard cap on frames per genome. Zero means no cap.
    pub max_frames_per_genome: usize,
    pub max_generations: usize,
    /// Write a population snapshot every this many generations. Zero disables snapshots.
    pub snapshot_interval: usize,
    pub selection_fallback: SelectionFallback,
    pub parallel: bool,
    /// Master seed. A random seed is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            population_size: 200,
            bits_per_weight: 8,
            inputs: 9,
            hidden_nodes: 10,
            outputs: 4,
            rows: 10,
            cols: 10,
            mutation_rate: 0.008,
            idle_bound: IdleLimits::DEFAULT.long_bound,
            short_idle_bound: IdleLimits::DEFAULT.short_bound,
            short_idle_score_cutoff: IdleLimits::DEFAULT.short_score_cutoff,
            starvation_window: FoodSeekingFitness::DEFAULT_STARVATION_WINDOW,
            max_frames_per_genome: 0,
            max_generations: 200,
            snapshot_interval: 10,
            selection_fallback: SelectionFallback::default(),
            parallel: false,
            seed: None,
        }
    }
}

impl TrainingConfig {
    #[must_use]
    pub fn topology(&self) -> Topology {
        Topology {
            bits_per_weight: self.bits_per_weight,
            inputs: self.inputs,
            hidden: self.hidden_nodes,
            outputs: self.outputs,
        }
    }

    #[must_use]
    pub fn game_config(&self) -> GameConfig {
        GameConfig::new(self.rows, self.cols).with_idle(IdleLimits {
            long_bound: self.idle_bound,
            short_bound: self.short_idle_bound,
            short_score_cutoff: self.short_idle_score_cutoff,
        })
    }

    #[must_use]
    pub fn fitness(&self) -> FoodSeekingFitness {
        FoodSeekingFitness::new(self.starvation_window)
    }

    #[must_use]
    pub fn frame_limit(&self) -> Option<usize> {
        (self.max_frames_per_genome > 0).then_some(self.max_frames_per_genome)
    }

    pub fn validate(&self) -> Result<(), TrainingError> {
        let invalid = |reason: String| Err(TrainingError::Config { reason });
        if self.population_size == 0 {
            return invalid("population size must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return invalid(format!(
                "mutation rate {} is outside [0, 1]",
                self.mutation_rate
            ));
        }
        if let Err(err) = NeuralPolicy::check_topology(&self.topology()) {
            return invalid(err.to_string());
        }
        if let Err(err) = self.game_config().validate() {
            return invalid(err.to_string());
        }
        if self.idle_bound <= 0 && self.frame_limit().is_none() {
            return invalid(
                "either idle_bound or max_frames_per_genome must be positive, \
                 otherwise a genome may never finish"
                    .into(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TrainingConfig::default();
        config.validate().unwrap();
        assert_eq!(config.topology(), Topology::default());
        assert_eq!(config.game_config(), GameConfig::default());
    }

    #[test]
    fn test_rejects_invalid_values() {
        let cases: [fn(&mut TrainingConfig); 6] = [
            |c| c.population_size = 0,
            |c| c.mutation_rate = 1.5,
            |c| c.inputs = 5,
            |c| c.bits_per_weight = 0,
            |c| c.rows = 0,
            |c| c.idle_bound = 0,
        ];
        for (i, mutate) in cases.into_iter().enumerate() {
            let mut config = TrainingConfig::default();
            mutate(&mut config);
            assert!(
                matches!(config.validate(), Err(TrainingError::Config { .. })),
                "case {i}"
            );
        }
    }

    #[test]
    fn test_frame_cap_allows_unbounded_idle() {
        let config = TrainingConfig {
            idle_bound: 0,
            max_frames_per_genome: 500,
            ..TrainingConfig::default()
        };
        config.validate().unwrap();
        assert_eq!(config.frame_limit(), Some(500));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<TrainingConfig, _> = serde_json::from_str(r#"{ "populaton": 3 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_fallback_serialization() {
        let config: TrainingConfig =
            serde_json::from_str(r#"{ "selection_fallback": "fail" }"#).unwrap();
        assert_eq!(config.selection_fallback, SelectionFallback::Fail);
    }
}
