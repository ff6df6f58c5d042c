use std::path::PathBuf;

use anyhow::Context as _;
use gensnake_engine::{Direction, FruitSeed, GameConfig, GameState, IdleLimits};
use gensnake_evaluator::{
    action_source::{ActionSource, ScriptedPolicy},
    session::{Session, SessionStats},
};
use rand::Rng as _;

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Path to the model file (JSON format)
    #[arg(conflicts_with = "script")]
    model_path: Option<PathBuf>,
    /// Comma-separated directions to cycle through instead of a model
    #[arg(long, value_delimiter = ',')]
    script: Vec<Direction>,
    /// Fruit seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 10)]
    rows: usize,
    #[arg(long, default_value_t = 10)]
    cols: usize,
    /// Frames without fruit before the game ends (0 disables)
    #[arg(long, default_value_t = IdleLimits::DEFAULT.long_bound)]
    idle_bound: i64,
    /// Stop after this many frames
    #[arg(long, default_value_t = 10_000)]
    max_frames: usize,
    /// Print the board after every frame
    #[arg(long, default_value_t = false)]
    trace: bool,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let source: Box<dyn ActionSource> = match (&arg.model_path, arg.script.is_empty()) {
        (Some(path), _) => {
            let model = util::read_model_file(path)?;
            eprintln!(
                "Model {} (generation {}, fitness {:.3})",
                model.name, model.generation, model.final_fitness
            );
            Box::new(model.to_policy()?)
        }
        (None, false) => Box::new(ScriptedPolicy::new(arg.script.clone())),
        (None, true) => anyhow::bail!("Either a model file or --script is required"),
    };

    let seed = arg
        .seed
        .map_or_else(|| rand::rng().random(), FruitSeed::from_u64);
    let config = GameConfig::new(arg.rows, arg.cols).with_idle(IdleLimits {
        long_bound: arg.idle_bound,
        ..IdleLimits::DEFAULT
    });
    let game = GameState::new(config, seed).context("Invalid board")?;

    let stats = play(Session::new(game, source, Some(arg.max_frames)), arg.trace)?;
    println!("{}", stats.board);
    println!("Score: {}", stats.summary.score);
    println!("Length: {}", stats.summary.length);
    println!("Frames: {}", stats.summary.frames_alive);
    println!("End: {}", stats.summary.end);
    Ok(())
}

struct FinishedGame {
    summary: SessionStats,
    board: String,
}

fn play<A: ActionSource>(mut session: Session<A>, trace: bool) -> anyhow::Result<FinishedGame> {
    loop {
        let finished = session.advance().context("Simulation fault")?;
        if trace {
            eprintln!(
                "frame {}  score {}\n{}",
                session.game().frames_alive(),
                session.game().score(),
                session.game().snapshot()
            );
        }
        if let Some(summary) = finished {
            return Ok(FinishedGame {
                summary,
                board: session.game().snapshot().to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use gensnake_evaluator::session::SessionEnd;

    use super::*;

    #[test]
    fn test_scripted_game_hits_wall() {
        let game = GameState::new(GameConfig::new(5, 5), FruitSeed::from_u64(1)).unwrap();
        let session = Session::new(game, ScriptedPolicy::constant(Direction::Up), Some(100));
        let finished = play(session, false).unwrap();
        assert!(matches!(finished.summary.end, SessionEnd::GameOver(_)));
        assert_eq!(finished.board.lines().count(), 5);
    }
}
