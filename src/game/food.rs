use rand::Rng;

use super::grid::Grid;
use super::occupancy::is_occupied;
use super::state::{Position, Snake};

/// Places food on a random free cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoodSpawner {
    attempts: u32,
}

impl FoodSpawner {
    pub fn new(attempts: u32) -> Self {
        Self { attempts }
    }

    /// Sample cells uniformly until one is free.
    ///
    /// Returns `None` once the attempt budget is spent; callers treat that as
    /// a full board and try again later.
    pub fn spawn<R: Rng>(
        &self,
        grid: &Grid,
        snakes: &[Snake],
        rng: &mut R,
    ) -> Option<Position> {
        (0..self.attempts)
            .map(|_| {
                Position::new(
                    rng.gen_range(0..grid.width()) as i32,
                    rng.gen_range(0..grid.height()) as i32,
                )
            })
            .find(|pos| !is_occupied(*pos, snakes))
    }
}
