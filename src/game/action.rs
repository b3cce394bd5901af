use serde::{Deserialize, Serialize};

use super::state::PlayerId;

/// Direction a snake can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// The direction pointing the other way
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Command an input collaborator can push into a running round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Steer one player's snake
    Turn {
        player: PlayerId,
        direction: Direction,
    },
    /// Pause or resume the round
    TogglePause,
    /// Discard the round and return to the setup screen
    Reset,
}

impl Action {
    pub fn turn(player: PlayerId, direction: Direction) -> Self {
        Action::Turn { player, direction }
    }
}
