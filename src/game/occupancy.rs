//! Which cells are covered by snake bodies.
//!
//! Two views exist. [`is_occupied`] looks at the bodies as they are right now
//! and backs food placement. [`OccupancyIndex`] freezes the board at the start
//! of a tick; every snake stepping in that tick is checked against it, in
//! ascending id order, so a lower id moving first never changes what a higher
//! id sees. Two heads entering the same free cell in one tick both survive.

use std::collections::HashMap;

use super::state::{PlayerId, Position, Snake};

/// True if `cell` equals any segment of any snake, dead ones included
pub fn is_occupied(cell: Position, snakes: &[Snake]) -> bool {
    snakes.iter().any(|snake| snake.occupies(cell))
}

/// Tick-start snapshot of every body segment
#[derive(Debug, Clone, Default)]
pub struct OccupancyIndex {
    /// One owner entry per segment; stacked segments repeat the owner
    cells: HashMap<Position, Vec<PlayerId>>,
}

impl OccupancyIndex {
    pub fn from_snakes(snakes: &[Snake]) -> Self {
        let mut cells: HashMap<Position, Vec<PlayerId>> = HashMap::new();
        for snake in snakes {
            for segment in snake.body() {
                cells.entry(*segment).or_default().push(snake.id());
            }
        }
        Self { cells }
    }

    pub fn is_occupied(&self, cell: Position) -> bool {
        self.cells.contains_key(&cell)
    }

    /// Owner of a segment that blocks `mover` from entering `cell`.
    ///
    /// When `vacating_tail` is the mover's own tail and equals `cell`, one of
    /// the mover's segments on that cell is not counted: the tail leaves in
    /// the same step. Other snakes still collide with it.
    pub fn blocker(
        &self,
        cell: Position,
        mover: PlayerId,
        vacating_tail: Option<Position>,
    ) -> Option<PlayerId> {
        let owners = self.cells.get(&cell)?;
        let mut exempt = vacating_tail == Some(cell);
        owners.iter().copied().find(|&owner| {
            if exempt && owner == mover {
                exempt = false;
                false
            } else {
                true
            }
        })
    }

    /// Number of distinct occupied cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::Direction;
    use crate::game::config::{GameConfig, PlayerColor};
    use std::time::Duration;

    fn snake(id: PlayerId, x: i32, y: i32, direction: Direction) -> Snake {
        Snake::new(
            id,
            Position::new(x, y),
            direction,
            Duration::from_millis(120),
            PlayerColor::for_slot(id as usize - 1),
            4,
        )
    }

    /// Unfold a stacked snake into a straight line behind its head
    fn stretched(id: PlayerId, x: i32, y: i32, direction: Direction) -> Snake {
        let accel = GameConfig::default().acceleration();
        let (dx, dy) = direction.delta();
        let mut s = snake(id, x - 3 * dx, y - 3 * dy, direction);
        for _ in 0..3 {
            s.advance(false, &accel);
        }
        s
    }

    #[test]
    fn test_live_occupancy_covers_every_snake() {
        let snakes = vec![stretched(1, 5, 5, Direction::Right), snake(2, 9, 9, Direction::Up)];
        assert!(is_occupied(Position::new(5, 5), &snakes));
        assert!(is_occupied(Position::new(2, 5), &snakes));
        assert!(is_occupied(Position::new(9, 9), &snakes));
        assert!(!is_occupied(Position::new(1, 5), &snakes));
    }

    #[test]
    fn test_dead_bodies_still_occupy() {
        let mut dead = snake(1, 3, 3, Direction::Right);
        dead.kill();
        assert!(is_occupied(Position::new(3, 3), &[dead]));
    }

    #[test]
    fn test_index_matches_live_view() {
        let snakes = vec![
            stretched(1, 5, 5, Direction::Right),
            stretched(2, 8, 8, Direction::Down),
        ];
        let index = OccupancyIndex::from_snakes(&snakes);
        assert_eq!(index.len(), 8);
        for y in 0..12 {
            for x in 0..12 {
                let cell = Position::new(x, y);
                assert_eq!(index.is_occupied(cell), is_occupied(cell, &snakes));
            }
        }
    }

    #[test]
    fn test_own_vacating_tail_is_exempt() {
        let snakes = vec![stretched(1, 5, 5, Direction::Right)];
        let index = OccupancyIndex::from_snakes(&snakes);
        let tail = snakes[0].tail();

        assert_eq!(index.blocker(tail, 1, Some(tail)), None);
        assert_eq!(index.blocker(tail, 1, None), Some(1));
    }

    #[test]
    fn test_other_snakes_tail_still_blocks() {
        let snakes = vec![stretched(1, 5, 5, Direction::Right), snake(2, 2, 6, Direction::Up)];
        let index = OccupancyIndex::from_snakes(&snakes);
        let tail = snakes[0].tail();

        assert_eq!(index.blocker(tail, 2, Some(snakes[1].tail())), Some(1));
        assert_eq!(index.blocker(tail, 2, Some(tail)), Some(1));
    }

    #[test]
    fn test_stacked_tail_exempts_only_one_segment() {
        let snakes = vec![snake(1, 4, 4, Direction::Right)];
        let index = OccupancyIndex::from_snakes(&snakes);
        let cell = Position::new(4, 4);
        assert_eq!(index.blocker(cell, 1, Some(cell)), Some(1));
    }

    #[test]
    fn test_free_cell_has_no_blocker() {
        let index = OccupancyIndex::from_snakes(&[snake(1, 4, 4, Direction::Right)]);
        assert_eq!(index.blocker(Position::new(0, 0), 1, None), None);
        assert!(OccupancyIndex::default().is_empty());
    }
}
