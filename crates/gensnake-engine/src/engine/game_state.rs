use std::collections::VecDeque;

use arrayvec::ArrayVec;
use rand::seq::IndexedRandom as _;
use rand_pcg::Pcg32;

use crate::{
    BoardSnapshot, Cell, CellKind, Direction, DirectionQueue, FruitSeed, GameConfig, LayoutError,
    LogicFault, SnapshotCell,
};

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum TerminalReason {
    #[display("hit the wall")]
    WallCollision,
    #[display("ran into its own body")]
    BodyCollision,
    #[display("went too long without eating")]
    Idle,
    #[display("filled the board")]
    BoardFilled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum StepOutcome {
    Alive { ate_fruit: bool },
    GameOver(TerminalReason),
}

/// One snake game: board, body, fruit and counters.
///
/// The head is `body[0]`. The fruit stream is driven by a generator seeded
/// from a [`FruitSeed`], so a game is fully reproducible from its seed and
/// move sequence.
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    body: Vec<Cell>,
    directions: DirectionQueue,
    fruit: Option<Cell>,
    score: usize,
    frames_alive: usize,
    frames_since_fruit: usize,
    terminal: Option<TerminalReason>,
    rng: Pcg32,
}

impl GameState {
    /// Starts a game with a one-segment snake at the board center.
    pub fn new(config: GameConfig, seed: FruitSeed) -> Result<Self, LayoutError> {
        config.validate()?;
        let mut game = Self {
            config,
            body: Vec::new(),
            directions: DirectionQueue::with_capacity(config.cell_count()),
            fruit: None,
            score: 0,
            frames_alive: 0,
            frames_since_fruit: 0,
            terminal: None,
            rng: seed.rng(),
        };
        game.reset();
        Ok(game)
    }

    /// Starts a game from an explicit layout.
    ///
    /// `body` is head first and must be a connected chain of distinct
    /// on-board cells. `directions` holds either one entry per segment or,
    /// as right after growth, one fewer. Entry `i - 1` must carry segment `i`
    /// onto segment `i - 1`, since that is the move it makes on the next
    /// step. The seed drives later fruit placements only.
    pub fn with_layout(
        config: GameConfig,
        body: Vec<Cell>,
        directions: Vec<Direction>,
        fruit: Cell,
        seed: FruitSeed,
    ) -> Result<Self, LayoutError> {
        config.validate()?;
        if body.is_empty() {
            return Err(LayoutError::EmptyBody);
        }
        let mut occupied = vec![false; config.cell_count()];
        for &cell in &body {
            let index = config
                .index_of(cell)
                .ok_or(LayoutError::OutOfBounds { cell })?;
            if occupied[index] {
                return Err(LayoutError::OverlappingBody { cell });
            }
            occupied[index] = true;
        }
        if let Some(index) = body.windows(2).position(|w| !w[0].is_adjacent(w[1])) {
            return Err(LayoutError::DisconnectedBody {
                index,
                next: index + 1,
            });
        }
        if directions.len() > body.len() || directions.len() + 1 < body.len() {
            return Err(LayoutError::DirectionCount {
                directions: directions.len(),
                body_len: body.len(),
            });
        }
        if let Some((index, &direction)) = directions
            .iter()
            .enumerate()
            .map(|(i, d)| (i + 1, d))
            .take_while(|&(index, _)| index < body.len())
            .find(|&(index, &direction)| body[index].moved(direction) != body[index - 1])
        {
            return Err(LayoutError::MisalignedDirection { index, direction });
        }
        let fruit_index = config
            .index_of(fruit)
            .ok_or(LayoutError::OutOfBounds { cell: fruit })?;
        if occupied[fruit_index] {
            return Err(LayoutError::FruitInBody { cell: fruit });
        }

        let mut queue = DirectionQueue::with_capacity(config.cell_count());
        for &direction in directions.iter().rev() {
            queue
                .push_head(direction, body.len())
                .map_err(|_| LayoutError::DirectionCount {
                    directions: directions.len(),
                    body_len: body.len(),
                })?;
        }
        Ok(Self {
            config,
            body,
            directions: queue,
            fruit: Some(fruit),
            score: 0,
            frames_alive: 0,
            frames_since_fruit: 0,
            terminal: None,
            rng: seed.rng(),
        })
    }

    /// Returns the game to its initial layout.
    ///
    /// The fruit generator is not reseeded, so successive resets keep
    /// drawing from the same stream.
    pub fn reset(&mut self) {
        self.body.clear();
        self.body.push(self.config.center());
        self.directions.clear();
        self.score = 0;
        self.frames_alive = 0;
        self.frames_since_fruit = 0;
        self.terminal = None;
        self.fruit = None;
        self.spawn_fruit();
    }

    /// Advances one full frame.
    ///
    /// Once the game has ended, further ticks change nothing and report the
    /// same terminal reason.
    pub fn tick(&mut self, direction: Direction) -> Result<StepOutcome, LogicFault> {
        if let Some(reason) = self.terminal {
            return Ok(StepOutcome::GameOver(reason));
        }
        self.step(direction)?;
        self.frames_alive += 1;
        let ate_fruit = self.check_fruit()?;
        if self.check_wall() || self.check_body() {
            return Ok(self.outcome(ate_fruit));
        }
        if self.terminal.is_none() {
            self.frames_since_fruit += 1;
            self.check_idle();
        }
        Ok(self.outcome(ate_fruit))
    }

    fn outcome(&self, ate_fruit: bool) -> StepOutcome {
        match self.terminal {
            Some(reason) => StepOutcome::GameOver(reason),
            None => StepOutcome::Alive { ate_fruit },
        }
    }

    /// Moves every segment one cell.
    ///
    /// `direction` becomes the head's entry in the direction queue and each
    /// other segment takes the entry of the segment ahead of it. Reversing
    /// into the body is not prevented here; the body check reports it.
    pub fn step(&mut self, direction: Direction) -> Result<(), LogicFault> {
        self.directions.push_head(direction, self.body.len())?;
        let body_len = self.body.len();
        self.directions.check_covers(body_len)?;
        for (segment, cell) in self.body.iter_mut().enumerate() {
            let moved = self
                .directions
                .get(segment)
                .ok_or(LogicFault::DirectionQueueDesync {
                    segment,
                    queued: self.directions.len(),
                    body_len,
                })?;
            *cell = cell.moved(moved);
        }
        Ok(())
    }

    /// Eats the fruit if the head is on it.
    ///
    /// Eating grows the tail, bumps the score, resets the idle counter and
    /// places a new fruit. Returns whether a fruit was eaten.
    pub fn check_fruit(&mut self) -> Result<bool, LogicFault> {
        if self.terminal.is_some() || self.fruit != Some(self.head()) {
            return Ok(false);
        }
        self.grow()?;
        self.score += 1;
        self.frames_since_fruit = 0;
        self.spawn_fruit();
        Ok(true)
    }

    /// Ends the game if the head left the board.
    pub fn check_wall(&mut self) -> bool {
        self.end_if(!self.config.contains(self.head()), TerminalReason::WallCollision)
    }

    /// Ends the game if the head overlaps another segment.
    pub fn check_body(&mut self) -> bool {
        let head = self.head();
        let hit = self.body[1..].contains(&head);
        self.end_if(hit, TerminalReason::BodyCollision)
    }

    /// Ends the game if the idle limits are exceeded.
    pub fn check_idle(&mut self) -> bool {
        let exceeded = self
            .config
            .idle
            .is_exceeded(self.frames_since_fruit, self.score);
        self.end_if(exceeded, TerminalReason::Idle)
    }

    fn end_if(&mut self, condition: bool, reason: TerminalReason) -> bool {
        if self.terminal.is_some() {
            return true;
        }
        if condition {
            self.terminal = Some(reason);
        }
        condition
    }

    fn grow(&mut self) -> Result<(), LogicFault> {
        let tail = *self.body.last().unwrap_or(&self.config.center());
        let tail_direction = self.directions.back().ok_or(LogicFault::DirectionQueueDesync {
            segment: self.body.len() - 1,
            queued: self.directions.len(),
            body_len: self.body.len(),
        })?;
        self.body.push(tail.moved(tail_direction.opposite()));
        self.directions.check_within(self.body.len())
    }

    fn occupancy(&self) -> Vec<bool> {
        let mut occupied = vec![false; self.config.cell_count()];
        for &cell in &self.body {
            if let Some(index) = self.config.index_of(cell) {
                occupied[index] = true;
            }
        }
        occupied
    }

    fn spawn_fruit(&mut self) {
        let occupied = self.occupancy();
        let free: Vec<usize> = (0..occupied.len()).filter(|&i| !occupied[i]).collect();
        match free.choose(&mut self.rng) {
            Some(&index) => self.fruit = Some(self.config.cell_at(index)),
            None => {
                self.fruit = None;
                self.terminal = Some(TerminalReason::BoardFilled);
            }
        }
    }

    /// Number of free cells reachable from `start` by orthogonal moves.
    ///
    /// Returns 0 if `start` is off the board or on the body. The start cell
    /// itself is not counted.
    #[must_use]
    pub fn open_space_count(&self, start: Cell) -> usize {
        let mut visited = self.occupancy();
        let Some(start_index) = self.config.index_of(start) else {
            return 0;
        };
        if visited[start_index] {
            return 0;
        }
        visited[start_index] = true;
        let mut queue = VecDeque::from([start]);
        let mut count = 0;
        while let Some(cell) = queue.pop_front() {
            let neighbors: ArrayVec<usize, 4> = cell
                .neighbors()
                .into_iter()
                .filter_map(|n| self.config.index_of(n))
                .collect();
            for index in neighbors {
                if !visited[index] {
                    visited[index] = true;
                    count += 1;
                    queue.push_back(self.config.cell_at(index));
                }
            }
        }
        count
    }

    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        let mut snapshot = BoardSnapshot::empty(self.config.rows, self.config.cols);
        let mut put = |cell: Cell, entry: SnapshotCell| {
            if let Some(index) = self.config.index_of(cell) {
                snapshot.set(index / self.config.cols, index % self.config.cols, entry);
            }
        };
        if let Some(fruit) = self.fruit {
            put(
                fruit,
                SnapshotCell {
                    kind: CellKind::Fruit,
                    direction: None,
                },
            );
        }
        for (segment, &cell) in self.body.iter().enumerate().rev() {
            let kind = if segment == 0 {
                CellKind::Head
            } else {
                CellKind::Body
            };
            put(
                cell,
                SnapshotCell {
                    kind,
                    direction: self.directions.get(segment),
                },
            );
        }
        snapshot
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn head(&self) -> Cell {
        self.body[0]
    }

    /// Direction the head moved on the previous frame.
    #[must_use]
    pub fn head_direction(&self) -> Option<Direction> {
        self.directions.front()
    }

    #[must_use]
    pub fn body(&self) -> &[Cell] {
        &self.body
    }

    #[must_use]
    pub fn directions(&self) -> &DirectionQueue {
        &self.directions
    }

    #[must_use]
    pub fn fruit(&self) -> Option<Cell> {
        self.fruit
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    /// Snake length, always `score + 1` for games started with [`Self::new`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    #[must_use]
    pub fn frames_alive(&self) -> usize {
        self.frames_alive
    }

    #[must_use]
    pub fn frames_since_fruit(&self) -> usize {
        self.frames_since_fruit
    }

    #[must_use]
    pub fn terminal(&self) -> Option<TerminalReason> {
        self.terminal
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.terminal.is_some()
    }
}
