use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use tracing::{debug, info, trace};

use super::{
    action::Direction,
    clock::StepSchedule,
    config::{Acceleration, Difficulty, GameConfig, RoundSetup},
    food::FoodSpawner,
    grid::Grid,
    occupancy::OccupancyIndex,
    snapshot::{RoundSnapshot, SnakeView},
    state::{CollisionType, PlayerId, Position, RoundState, Snake},
};

/// Information about one snake's step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Snake that moved or died
    pub player: PlayerId,
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
}

/// Result of one pass of the stepping loop
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    /// Snakes whose deadline elapsed, in evaluation order
    pub steps: Vec<StepInfo>,
    /// Round state after the pass
    pub state: RoundState,
}

impl TickResult {
    fn idle(state: RoundState) -> Self {
        Self {
            steps: Vec::new(),
            state,
        }
    }

    /// Whether the round has ended
    pub fn terminated(&self) -> bool {
        self.state == RoundState::GameOver
    }
}

/// Owns one round: the board, the snakes, the food, and their clocks.
///
/// All mutation goes through `start`, `toggle_pause`, `reset`, `set_heading`
/// and `tick`; everything else reads.
pub struct GameEngine {
    config: GameConfig,
    grid: Grid,
    spawner: FoodSpawner,
    acceleration: Acceleration,
    rng: StdRng,

    snakes: Vec<Snake>,
    food: Option<Position>,
    schedule: StepSchedule,
    state: RoundState,
    difficulty: Difficulty,
    paused_at: Option<Duration>,
    rounds_started: u64,
}

impl GameEngine {
    /// Create a new game engine, rejecting configurations the board can't hold
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate().context("Invalid game configuration")?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            grid: Grid::new(config.grid_width, config.grid_height),
            spawner: FoodSpawner::new(config.food_spawn_attempts),
            acceleration: config.acceleration(),
            config,
            rng,
            snakes: Vec::new(),
            food: None,
            schedule: StepSchedule::default(),
            state: RoundState::NotStarted,
            difficulty: Difficulty::default(),
            paused_at: None,
            rounds_started: 0,
        })
    }

    /// Begin a fresh round, discarding whatever came before
    pub fn start(&mut self, setup: &RoundSetup, now: Duration) {
        self.reset();

        let interval = setup.difficulty.base_step_interval();
        self.snakes = (0..setup.player_count())
            .map(|slot| {
                let (spawn, heading) = self.grid.spawn_point(slot);
                Snake::new(
                    slot as PlayerId + 1,
                    spawn,
                    heading,
                    interval,
                    setup.color_for(slot),
                    self.config.initial_snake_length,
                )
            })
            .collect();
        self.schedule = StepSchedule::start(now, self.snakes.iter().map(Snake::step_interval));
        self.difficulty = setup.difficulty;
        self.respawn_food();
        self.state = RoundState::Running;
        self.rounds_started += 1;

        info!(
            round = self.rounds_started,
            players = self.snakes.len(),
            difficulty = setup.difficulty.label(),
            step_ms = interval.as_millis() as u64,
            "round started"
        );
    }

    /// Flip between running and paused; ignored in any other state
    pub fn toggle_pause(&mut self, now: Duration) -> RoundState {
        match self.state {
            RoundState::Running => {
                self.state = RoundState::Paused;
                self.paused_at = Some(now);
                debug!("round paused");
            }
            RoundState::Paused => {
                let paused_for = self
                    .paused_at
                    .take()
                    .map(|at| now.saturating_sub(at))
                    .unwrap_or_default();
                self.schedule.shift(paused_for);
                self.state = RoundState::Running;
                debug!(paused_ms = paused_for.as_millis() as u64, "round resumed");
            }
            RoundState::NotStarted | RoundState::GameOver => {}
        }
        self.state
    }

    /// Drop every snake and the food and return to `NotStarted`
    pub fn reset(&mut self) {
        if self.state.is_active() {
            info!(round = self.rounds_started, "round reset");
        }
        self.snakes.clear();
        self.food = None;
        self.schedule.clear();
        self.paused_at = None;
        self.state = RoundState::NotStarted;
    }

    /// Steer a snake. Unknown players, dead snakes and reversals are ignored.
    pub fn set_heading(&mut self, player: PlayerId, direction: Direction) -> bool {
        self.snakes
            .iter_mut()
            .find(|snake| snake.id() == player)
            .is_some_and(|snake| snake.set_heading(direction))
    }

    /// Advance every snake whose deadline has passed.
    ///
    /// Snakes are evaluated by ascending id against the occupancy as it stood
    /// when the pass began.
    pub fn tick(&mut self, now: Duration) -> TickResult {
        if self.state != RoundState::Running {
            return TickResult::idle(self.state);
        }

        if self.food.is_none() {
            self.respawn_food();
        }

        let index = OccupancyIndex::from_snakes(&self.snakes);
        let mut steps = Vec::new();

        for slot in 0..self.snakes.len() {
            if !self.snakes[slot].is_alive() || !self.schedule.is_due(slot, now) {
                continue;
            }

            let info = self.step_snake(slot, &index);
            if info.collision_type.is_none() {
                let next = now + self.snakes[slot].step_interval();
                self.schedule.arm(slot, next);
            }
            steps.push(info);
        }

        if !steps.is_empty() {
            trace!(now_ms = now.as_millis() as u64, stepped = steps.len(), "tick");
        }

        TickResult {
            steps,
            state: self.state,
        }
    }

    /// Execute one step of a single snake
    fn step_snake(&mut self, slot: usize, index: &OccupancyIndex) -> StepInfo {
        let snake = &self.snakes[slot];
        let player = snake.id();
        let new_head = snake.next_head();
        let ate_food = self.food == Some(new_head);

        if let Some(collision_type) = self.check_collision(snake, new_head, ate_food, index) {
            self.snakes[slot].kill();
            debug!(player, ?collision_type, x = new_head.x, y = new_head.y, "snake died");
            self.check_game_over();

            return StepInfo {
                player,
                ate_food: false,
                collision_type: Some(collision_type),
            };
        }

        self.snakes[slot].advance(ate_food, &self.acceleration);

        if ate_food {
            let snake = &self.snakes[slot];
            debug!(
                player,
                score = snake.score(),
                step_ms = snake.step_interval().as_millis() as u64,
                "food eaten"
            );
            self.food = None;
            self.respawn_food();
        }

        StepInfo {
            player,
            ate_food,
            collision_type: None,
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(
        &self,
        snake: &Snake,
        pos: Position,
        ate_food: bool,
        index: &OccupancyIndex,
    ) -> Option<CollisionType> {
        if !self.grid.in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        let vacating_tail = (!ate_food).then(|| snake.tail());
        index
            .blocker(pos, snake.id(), vacating_tail)
            .map(|owner| {
                if owner == snake.id() {
                    CollisionType::SelfCollision
                } else {
                    CollisionType::Snake(owner)
                }
            })
    }

    fn check_game_over(&mut self) {
        let alive = self.alive_count();
        if alive <= 1 && self.state != RoundState::GameOver {
            self.state = RoundState::GameOver;
            info!(
                round = self.rounds_started,
                alive,
                winner = ?self.snakes.iter().find(|s| s.is_alive()).map(Snake::id),
                "game over"
            );
        }
    }

    /// Spawn food at a random empty position, if one can be found
    fn respawn_food(&mut self) {
        self.food = self.spawner.spawn(&self.grid, &self.snakes, &mut self.rng);
        if self.food.is_none() {
            debug!("no free cell for food, retrying next tick");
        }
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            grid_width: self.grid.width(),
            grid_height: self.grid.height(),
            snakes: self.snakes.iter().map(SnakeView::from).collect(),
            food: self.food,
            state: self.state,
            difficulty: self.difficulty,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    /// True while a round exists, including paused and finished rounds
    pub fn is_running(&self) -> bool {
        self.state.is_active()
    }

    pub fn alive_count(&self) -> usize {
        self.snakes.iter().filter(|s| s.is_alive()).count()
    }

    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    pub fn food(&self) -> Option<Position> {
        self.food
    }
}
