//! Snake Arena - local multiplayer Snake where every player moves on their own clock
//!
//! This library provides:
//! - Core simulation (game module): grid, snakes, occupancy, food, stepping
//! - Background stepping task and thread-safe handle (runtime module)
//! - Keyboard mapping for four players (input module)
//! - TUI rendering (render module)
//! - Session statistics (metrics module)
//! - The interactive terminal mode (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod runtime;
