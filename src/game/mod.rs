//! Core simulation for multiplayer Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Time comes in through [`Clock`] and randomness through a seeded RNG, so a
//! round can be driven step by step from tests as easily as from the runtime.

pub mod action;
pub mod clock;
pub mod config;
pub mod engine;
pub mod food;
pub mod grid;
pub mod occupancy;
pub mod snapshot;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use clock::{Clock, ManualClock, StepSchedule, SystemClock};
pub use config::{Difficulty, GameConfig, PlayerColor, RoundSetup, MAX_PLAYERS};
pub use engine::{GameEngine, StepInfo, TickResult};
pub use food::FoodSpawner;
pub use grid::Grid;
pub use occupancy::OccupancyIndex;
pub use snapshot::{RoundSnapshot, SnakeView};
pub use state::{CollisionType, PlayerId, Position, RoundState, Snake};
