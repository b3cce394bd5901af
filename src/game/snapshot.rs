use std::time::Duration;

use super::action::Direction;
use super::config::{Difficulty, PlayerColor};
use super::state::{PlayerId, Position, RoundState, Snake};

/// Read-only copy of one snake for renderers
#[derive(Debug, Clone, PartialEq)]
pub struct SnakeView {
    pub id: PlayerId,
    pub body: Vec<Position>,
    pub direction: Direction,
    pub alive: bool,
    pub color: PlayerColor,
    pub score: u32,
    pub step_interval: Duration,
}

impl SnakeView {
    pub fn head(&self) -> Option<Position> {
        self.body.first().copied()
    }
}

impl From<&Snake> for SnakeView {
    fn from(snake: &Snake) -> Self {
        Self {
            id: snake.id(),
            body: snake.body().iter().copied().collect(),
            direction: snake.direction(),
            alive: snake.is_alive(),
            color: snake.color(),
            score: snake.score(),
            step_interval: snake.step_interval(),
        }
    }
}

/// Consistent copy of a whole round, taken in one read
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoundSnapshot {
    pub grid_width: usize,
    pub grid_height: usize,
    pub snakes: Vec<SnakeView>,
    pub food: Option<Position>,
    pub state: RoundState,
    pub difficulty: Difficulty,
}

impl RoundSnapshot {
    pub fn is_paused(&self) -> bool {
        self.state == RoundState::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.state == RoundState::GameOver
    }

    pub fn alive_count(&self) -> usize {
        self.snakes.iter().filter(|s| s.alive).count()
    }

    /// Snake currently ahead: the last one standing, else the top scorer.
    /// Ties on score go to the lower id.
    pub fn leader(&self) -> Option<&SnakeView> {
        if self.snakes.len() > 1 && self.alive_count() == 1 {
            return self.snakes.iter().find(|s| s.alive);
        }
        self.snakes
            .iter()
            .max_by(|a, b| a.score.cmp(&b.score).then(b.id.cmp(&a.id)))
    }

    pub fn best_score(&self) -> u32 {
        self.snakes.iter().map(|s| s.score).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: PlayerId, alive: bool, score: u32) -> SnakeView {
        SnakeView {
            id,
            body: vec![Position::new(id as i32, 0)],
            direction: Direction::Right,
            alive,
            color: PlayerColor::for_slot(id as usize - 1),
            score,
            step_interval: Duration::from_millis(120),
        }
    }

    #[test]
    fn test_leader_is_last_alive() {
        let snapshot = RoundSnapshot {
            snakes: vec![view(1, false, 9), view(2, true, 1), view(3, false, 4)],
            state: RoundState::GameOver,
            ..Default::default()
        };
        assert_eq!(snapshot.leader().map(|s| s.id), Some(2));
        assert_eq!(snapshot.best_score(), 9);
        assert!(snapshot.is_game_over());
    }

    #[test]
    fn test_leader_falls_back_to_score() {
        let snapshot = RoundSnapshot {
            snakes: vec![view(1, false, 3), view(2, false, 5), view(3, false, 5)],
            ..Default::default()
        };
        assert_eq!(snapshot.leader().map(|s| s.id), Some(2));
        assert_eq!(snapshot.alive_count(), 0);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = RoundSnapshot::default();
        assert!(snapshot.leader().is_none());
        assert_eq!(snapshot.best_score(), 0);
        assert!(!snapshot.is_paused());
        assert_eq!(snapshot.state, RoundState::NotStarted);
    }
}
