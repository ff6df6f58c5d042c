use gensnake_engine::{GameState, LogicFault, StepOutcome, TerminalReason};

use crate::action_source::ActionSource;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum SessionEnd {
    #[display("{_0}")]
    GameOver(TerminalReason),
    #[display("reached the frame limit")]
    FrameLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub score: usize,
    pub length: usize,
    pub frames_alive: usize,
    pub frames_since_fruit: usize,
    pub end: SessionEnd,
}

impl SessionStats {
    fn of(game: &GameState, end: SessionEnd) -> Self {
        Self {
            score: game.score(),
            length: game.len(),
            frames_alive: game.frames_alive(),
            frames_since_fruit: game.frames_since_fruit(),
            end,
        }
    }
}

/// A game driven frame by frame by an [`ActionSource`].
#[derive(Debug, Clone)]
pub struct Session<A> {
    game: GameState,
    source: A,
    frame_limit: Option<usize>,
    end: Option<SessionEnd>,
}

impl<A: ActionSource> Session<A> {
    /// `frame_limit` caps `frames_alive`; `None` plays until the game ends.
    pub fn new(game: GameState, source: A, frame_limit: Option<usize>) -> Self {
        Self {
            game,
            source,
            frame_limit,
            end: None,
        }
    }

    #[must_use]
    pub fn game(&self) -> &GameState {
        &self.game
    }

    #[must_use]
    pub fn source(&self) -> &A {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut A {
        &mut self.source
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.end.is_some()
    }

    /// Plays one frame. Returns the final statistics once the session is over.
    pub fn advance(&mut self) -> Result<Option<SessionStats>, LogicFault> {
        if let Some(end) = self.end {
            return Ok(Some(SessionStats::of(&self.game, end)));
        }
        let direction = self.source.next_direction(&self.game);
        let end = match self.game.tick(direction)? {
            StepOutcome::GameOver(reason) => Some(SessionEnd::GameOver(reason)),
            StepOutcome::Alive { .. } => self
                .frame_limit
                .is_some_and(|limit| self.game.frames_alive() >= limit)
                .then_some(SessionEnd::FrameLimit),
        };
        self.end = end;
        Ok(end.map(|end| SessionStats::of(&self.game, end)))
    }

    /// Plays until the session ends.
    pub fn play(mut self) -> Result<SessionStats, LogicFault> {
        loop {
            if let Some(stats) = self.advance()? {
                return Ok(stats);
            }
        }
    }
}
