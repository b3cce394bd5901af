use std::collections::VecDeque;
use std::time::Duration;

use super::action::Direction;
use super::config::{Acceleration, PlayerColor};

/// Player identity, 1-based and stable for a round
pub type PlayerId = u8;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// One player's snake
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    id: PlayerId,
    /// Body segments, with head at the front
    body: VecDeque<Position>,
    direction: Direction,
    alive: bool,
    step_interval: Duration,
    score: u32,
    color: PlayerColor,
}

impl Snake {
    /// Create a snake with every segment stacked on the spawn cell
    pub fn new(
        id: PlayerId,
        spawn: Position,
        direction: Direction,
        step_interval: Duration,
        color: PlayerColor,
        length: usize,
    ) -> Self {
        Self {
            id,
            body: std::iter::repeat_n(spawn, length.max(1)).collect(),
            direction,
            alive: true,
            step_interval,
            score: 0,
            color,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn body(&self) -> &VecDeque<Position> {
        &self.body
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn step_interval(&self) -> Duration {
        self.step_interval
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn color(&self) -> PlayerColor {
        self.color
    }

    /// Check if any segment, head included, sits on `pos`
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Request a new heading for the next step.
    ///
    /// Returns false and leaves the heading alone for dead snakes and
    /// 180-degree turns.
    pub fn set_heading(&mut self, requested: Direction) -> bool {
        if !self.alive || self.direction.is_opposite(requested) {
            return false;
        }
        self.direction = requested;
        true
    }

    /// Cell the head would move into this step
    pub fn next_head(&self) -> Position {
        self.head().moved_in_direction(self.direction)
    }

    /// Move one cell forward. Eating keeps the tail, scores, and speeds the
    /// snake up.
    pub fn advance(&mut self, consumed_food: bool, acceleration: &Acceleration) {
        if !self.alive {
            return;
        }

        let new_head = self.next_head();
        self.body.push_front(new_head);

        if consumed_food {
            self.score += 1;
            self.step_interval = acceleration.apply(self.step_interval);
        } else {
            self.body.pop_back();
        }
    }

    /// Mark the snake dead; true only on the first call
    pub fn kill(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// Snake hit another player's body
    Snake(PlayerId),
}

/// Lifecycle of one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundState {
    #[default]
    NotStarted,
    Running,
    Paused,
    GameOver,
}

impl RoundState {
    /// A round exists, whether moving, paused, or finished
    pub fn is_active(&self) -> bool {
        !matches!(self, RoundState::NotStarted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::{GameConfig, PlayerColor};

    fn snake_at(x: i32, y: i32, direction: Direction) -> Snake {
        Snake::new(
            1,
            Position::new(x, y),
            direction,
            Duration::from_millis(120),
            PlayerColor::for_slot(0),
            4,
        )
    }

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), Position::new(4, 5));
        assert_eq!(pos.moved_by(0, 1), Position::new(5, 6));
        assert_eq!(pos.moved_by(0, -1), Position::new(5, 4));
    }

    #[test]
    fn test_snake_creation() {
        let snake = snake_at(5, 5, Direction::Right);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.head(), Position::new(5, 5));
        assert!(snake.body().iter().all(|p| *p == Position::new(5, 5)));
        assert!(snake.is_alive());
        assert_eq!(snake.score(), 0);
    }

    #[test]
    fn test_snake_movement() {
        let accel = GameConfig::default().acceleration();
        let mut snake = snake_at(5, 5, Direction::Right);

        snake.advance(false, &accel);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.head(), Position::new(6, 5));

        snake.advance(true, &accel);
        assert_eq!(snake.len(), 5);
        assert_eq!(snake.head(), Position::new(7, 5));
        assert_eq!(snake.score(), 1);
        assert_eq!(snake.step_interval(), Duration::from_millis(112));
    }

    #[test]
    fn test_stacked_spawn_unfolds() {
        let accel = GameConfig::default().acceleration();
        let mut snake = snake_at(5, 5, Direction::Right);
        for _ in 0..3 {
            snake.advance(false, &accel);
        }
        let body: Vec<_> = snake.body().iter().copied().collect();
        assert_eq!(
            body,
            vec![
                Position::new(8, 5),
                Position::new(7, 5),
                Position::new(6, 5),
                Position::new(5, 5),
            ]
        );
    }

    #[test]
    fn test_reversal_is_ignored() {
        let mut snake = snake_at(5, 5, Direction::Right);
        assert!(!snake.set_heading(Direction::Left));
        assert_eq!(snake.direction(), Direction::Right);

        assert!(snake.set_heading(Direction::Up));
        assert_eq!(snake.direction(), Direction::Up);
        assert!(!snake.set_heading(Direction::Down));
        assert_eq!(snake.direction(), Direction::Up);
    }

    #[test]
    fn test_heading_only_affects_next_step() {
        let mut snake = snake_at(5, 5, Direction::Right);
        assert_eq!(snake.next_head(), Position::new(6, 5));
        snake.set_heading(Direction::Down);
        assert_eq!(snake.next_head(), Position::new(5, 6));
    }

    #[test]
    fn test_kill_is_idempotent_and_freezes() {
        let accel = GameConfig::default().acceleration();
        let mut snake = snake_at(5, 5, Direction::Right);
        assert!(snake.kill());
        assert!(!snake.kill());
        assert!(!snake.is_alive());

        let before = snake.clone();
        snake.advance(true, &accel);
        assert!(!snake.set_heading(Direction::Up));
        assert_eq!(snake, before);
    }

    #[test]
    fn test_round_state_activity() {
        assert!(!RoundState::NotStarted.is_active());
        assert!(RoundState::Running.is_active());
        assert!(RoundState::Paused.is_active());
        assert!(RoundState::GameOver.is_active());
        assert_eq!(RoundState::default(), RoundState::NotStarted);
    }
}
