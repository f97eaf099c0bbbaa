// Board geometry: an N x N field addressed with 1-based coordinates

use crate::types::{Coord, Direction};

/// Default side length of the playing field
pub const DEFAULT_BOARD_SIZE: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    size: i32,
}

impl Grid {
    pub fn new(size: i32) -> Self {
        Grid { size }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    /// True when both axes lie in [1, N]
    pub fn is_in_bounds(&self, coord: &Coord) -> bool {
        coord.x >= 1 && coord.x <= self.size && coord.y >= 1 && coord.y <= self.size
    }

    /// In-bounds orthogonal neighbours, in direction code order
    pub fn neighbors(&self, coord: &Coord) -> impl Iterator<Item = (Direction, Coord)> + '_ {
        let origin = *coord;
        Direction::all()
            .into_iter()
            .map(move |dir| (dir, dir.apply(&origin)))
            .filter(move |(_, next)| self.is_in_bounds(next))
    }

    /// Every cell, row by row
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        let size = self.size;
        (1..=size).flat_map(move |y| (1..=size).map(move |x| Coord::new(x, y)))
    }

    pub fn cell_count(&self) -> usize {
        (self.size.max(0) as usize).pow(2)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new(DEFAULT_BOARD_SIZE)
    }
}
