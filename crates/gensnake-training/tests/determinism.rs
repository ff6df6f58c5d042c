use gensnake_training::{config::TrainingConfig, orchestrator::Trainer};

fn config(seed: u64) -> TrainingConfig {
    TrainingConfig {
        population_size: 12,
        hidden_nodes: 5,
        rows: 8,
        cols: 8,
        idle_bound: 60,
        short_idle_bound: 20,
        max_frames_per_genome: 400,
        seed: Some(seed),
        ..TrainingConfig::default()
    }
}

#[test]
fn test_parallel_generation_matches_sequential() {
    let mut sequential = Trainer::new(config(11)).unwrap();
    let mut parallel = Trainer::new(config(11)).unwrap();
    assert_eq!(sequential.population(), parallel.population());

    for _ in 0..3 {
        let a = sequential.run_generation().unwrap();
        let b = parallel.run_generation_parallel().unwrap();
        assert_eq!(a, b);
        assert_eq!(sequential.population(), parallel.population());
    }
    assert_eq!(sequential.champion(), parallel.champion());
}

#[test]
fn test_same_seed_replays_run() {
    let run = |seed| {
        let mut trainer = Trainer::new(config(seed)).unwrap();
        let last = trainer.run(2).unwrap().unwrap();
        (last, trainer.population().clone())
    };
    assert_eq!(run(5), run(5));
    assert_ne!(run(5).1, run(6).1);
}

#[test]
fn test_resume_continues_numbering() {
    let mut first = Trainer::new(config(3)).unwrap();
    first.run(2).unwrap();
    let population = first.population().clone();

    let mut resumed = Trainer::resume(config(3), population, 2).unwrap();
    let summary = resumed.run_generation().unwrap();
    assert_eq!(summary.generation, 3);
    assert_eq!(resumed.generation(), 3);
}

#[test]
fn test_resume_does_not_replay_first_generation_stream() {
    let population = Trainer::new(config(3)).unwrap().population().clone();

    let mut fresh = Trainer::resume(config(3), population.clone(), 0).unwrap();
    let mut resumed = Trainer::resume(config(3), population.clone(), 2).unwrap();
    let mut resumed_again = Trainer::resume(config(3), population, 2).unwrap();
    fresh.run_generation().unwrap();
    resumed.run_generation().unwrap();
    resumed_again.run_generation().unwrap();

    assert_ne!(fresh.population(), resumed.population());
    assert_eq!(resumed.population(), resumed_again.population());
}

#[test]
fn test_champion_fitness_never_decreases() {
    let mut trainer = Trainer::new(config(8)).unwrap();
    let mut best = f64::NEG_INFINITY;
    for _ in 0..4 {
        let summary = trainer.run_generation().unwrap();
        let champion = trainer.champion().unwrap();
        assert!(champion.fitness >= best);
        assert!(champion.fitness >= summary.best_fitness);
        assert_eq!(champion.genome.len(), trainer.config().topology().genome_len());
        best = champion.fitness;
    }
}
