use super::action::Direction;
use super::config::MAX_PLAYERS;
use super::state::Position;

/// Fixed-size board every actor and the food live on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
        }
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }

    /// Check if a position is within the grid bounds
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Spawn cell and starting heading for a zero-based player slot.
    ///
    /// Slots sit on the quarter lines, each heading into open board.
    pub fn spawn_point(&self, slot: usize) -> (Position, Direction) {
        let (w, h) = (self.width, self.height);
        match slot % MAX_PLAYERS {
            0 => (Position::new(w / 4, h / 2), Direction::Right),
            1 => (Position::new(3 * w / 4, h / 2), Direction::Left),
            2 => (Position::new(w / 2, h / 4), Direction::Down),
            _ => (Position::new(w / 2, 3 * h / 4), Direction::Up),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_checking() {
        let grid = Grid::new(20, 20);

        assert!(grid.in_bounds(Position::new(0, 0)));
        assert!(grid.in_bounds(Position::new(19, 19)));
        assert!(!grid.in_bounds(Position::new(-1, 0)));
        assert!(!grid.in_bounds(Position::new(20, 0)));
        assert!(!grid.in_bounds(Position::new(0, 20)));
        assert!(!grid.in_bounds(Position::new(0, -1)));
    }

    #[test]
    fn test_default_spawn_layout() {
        let grid = Grid::new(33, 30);
        assert_eq!(grid.spawn_point(0), (Position::new(8, 15), Direction::Right));
        assert_eq!(grid.spawn_point(1), (Position::new(24, 15), Direction::Left));
        assert_eq!(grid.spawn_point(2), (Position::new(16, 7), Direction::Down));
        assert_eq!(grid.spawn_point(3), (Position::new(16, 22), Direction::Up));
    }

    #[test]
    fn test_spawn_points_are_distinct_and_in_bounds() {
        let grid = Grid::new(10, 10);
        let spawns: Vec<_> = (0..MAX_PLAYERS).map(|slot| grid.spawn_point(slot).0).collect();
        for (i, a) in spawns.iter().enumerate() {
            assert!(grid.in_bounds(*a));
            for b in &spawns[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
