use gensnake_engine::{Cell, Direction, FruitSeed, GameConfig, GameState, StepOutcome};
use gensnake_evaluator::{
    action_source::{ActionSource as _, NeuralPolicy},
    fitness::{FitnessFunction as _, FoodSeekingFitness},
    genome::{Topology, WeightSet, decode, encode},
    session::{Session, SessionEnd},
};

/// A genome whose network always prefers `direction`: every weight is zero
/// except that output node's bias weight, which is pushed to -3.
fn always(direction: Direction, topology: &Topology) -> gensnake_evaluator::genome::Genome {
    let [(h0, f0), (h1, f1), (o, f2)] = topology.layer_shapes();
    let mut output = vec![vec![0.0; f2 + 1]; o];
    output[direction.index()][f2] = -3.0;
    let layers = [vec![vec![0.0; f0 + 1]; h0], vec![vec![0.0; f1 + 1]; h1], output];
    let weights = WeightSet::from_layers(layers, topology).unwrap();
    encode(&weights, topology).unwrap()
}

#[test]
fn test_encoded_right_policy_eats_adjacent_fruit() {
    let topology = Topology::default();
    let genome = always(Direction::Right, &topology);
    assert_eq!(genome.len(), topology.genome_len());

    let decoded = decode(&genome, &topology).unwrap();
    assert_eq!(decoded.layers()[2][Direction::Right.index()][topology.hidden], -3.0);

    let mut policy = NeuralPolicy::new(&genome, &topology).unwrap();
    let mut game = GameState::with_layout(
        GameConfig::new(5, 5),
        vec![Cell::new(2, 2)],
        vec![],
        Cell::new(2, 3),
        FruitSeed::from_u64(11),
    )
    .unwrap();

    let direction = policy.next_direction(&game);
    assert_eq!(direction, Direction::Right);
    assert_eq!(
        game.tick(direction).unwrap(),
        StepOutcome::Alive { ate_fruit: true }
    );
    assert_eq!(game.score(), 1);
    assert_eq!(game.len(), 2);
    assert_eq!(game.body(), &[Cell::new(2, 3), Cell::new(2, 2)]);
}

#[test]
fn test_every_direction_is_reachable() {
    let topology = Topology::default();
    let game = GameState::new(GameConfig::default(), FruitSeed::from_u64(2)).unwrap();
    for direction in Direction::ALL {
        let mut policy = NeuralPolicy::new(&always(direction, &topology), &topology).unwrap();
        assert_eq!(policy.next_direction(&game), direction);
    }
}

#[test]
fn test_session_ends_at_wall_with_floored_fitness() {
    let topology = Topology::default();
    let policy = NeuralPolicy::new(&always(Direction::Up, &topology), &topology).unwrap();
    let game = GameState::with_layout(
        GameConfig::new(5, 5),
        vec![Cell::new(2, 2)],
        vec![],
        Cell::new(4, 4),
        FruitSeed::from_u64(3),
    )
    .unwrap();
    let stats = Session::new(game, policy, None).play().unwrap();
    assert!(matches!(stats.end, SessionEnd::GameOver(reason) if reason.is_wall_collision()));
    assert_eq!(stats.frames_alive, 3);
    let record = FoodSeekingFitness::default().record(&stats);
    assert!((record.fitness - 3f64.powf(1.5)).abs() < 1e-9);
}
