// Reachability oracle
//
// Ground-truth check used to filter generated scenarios. Only head-to-target
// connectivity is reported, never a path.

use std::collections::{HashSet, VecDeque};

use crate::grid::Grid;
use crate::types::{BarrierSet, Coord, Snake};

/// Cells the oracle treats as impassable for a given snake and barrier set.
///
/// Only the interior body segments are included: the head is the search
/// origin and the tail vacates its cell on the next move.
pub fn obstacles(snake: &Snake, barriers: &BarrierSet) -> HashSet<Coord> {
    snake
        .interior()
        .iter()
        .chain(barriers.active())
        .copied()
        .collect()
}

/// Breadth-first search over the 4-connected grid.
///
/// Returns true as soon as `target` is dequeued (or equals `source`), false
/// once the frontier is exhausted.
pub fn is_reachable(grid: &Grid, source: Coord, target: Coord, obstacles: &HashSet<Coord>) -> bool {
    let mut queue = VecDeque::with_capacity(grid.cell_count());
    let mut visited = HashSet::with_capacity(grid.cell_count());
    queue.push_back(source);
    visited.insert(source);

    while let Some(current) = queue.pop_front() {
        if current == target {
            return true;
        }
        for (_, next) in grid.neighbors(&current) {
            if !obstacles.contains(&next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    false
}

/// Convenience wrapper: is every food item reachable from the snake head?
pub fn all_reachable(grid: &Grid, snake: &Snake, foods: &[Coord], barriers: &BarrierSet) -> bool {
    let blocked = obstacles(snake, barriers);
    foods
        .iter()
        .all(|food| is_reachable(grid, snake.head(), *food, &blocked))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake(flat: &[i32]) -> Snake {
        Snake::from_flat(flat).unwrap()
    }

    #[test]
    fn test_source_equals_target() {
        let grid = Grid::default();
        let c = Coord::new(3, 3);
        assert!(is_reachable(&grid, c, c, &HashSet::new()));
    }

    #[test]
    fn test_open_board_is_connected() {
        let grid = Grid::default();
        assert!(is_reachable(&grid, Coord::new(1, 1), Coord::new(8, 8), &HashSet::new()));
    }

    #[test]
    fn test_wall_blocks_target() {
        let grid = Grid::default();
        // Full row at y = 5
        let wall: HashSet<Coord> = (1..=8).map(|x| Coord::new(x, 5)).collect();
        assert!(!is_reachable(&grid, Coord::new(1, 1), Coord::new(1, 8), &wall));
        assert!(is_reachable(&grid, Coord::new(1, 1), Coord::new(8, 4), &wall));
    }

    #[test]
    fn test_obstacles_exclude_head_and_tail() {
        let s = snake(&[4, 4, 4, 3, 4, 2, 4, 1]);
        let barriers = BarrierSet::from_flat(&[6, 6, -1, -1]).unwrap();
        let blocked = obstacles(&s, &barriers);
        assert_eq!(blocked.len(), 3);
        assert!(blocked.contains(&Coord::new(4, 3)));
        assert!(blocked.contains(&Coord::new(4, 2)));
        assert!(blocked.contains(&Coord::new(6, 6)));
        assert!(!blocked.contains(&Coord::new(4, 4)));
        assert!(!blocked.contains(&Coord::new(4, 1)));
    }

    #[test]
    fn test_tail_cell_is_passable() {
        // Head in the corner, only exit is the tail cell
        let grid = Grid::new(4);
        let s = snake(&[1, 1, 2, 1, 2, 2, 1, 2]);
        let barriers = BarrierSet::from_flat(&[-1, -1]).unwrap();
        let blocked = obstacles(&s, &barriers);
        // (1,2) is the tail and therefore passable
        assert!(is_reachable(&grid, s.head(), Coord::new(1, 4), &blocked));
    }

    #[test]
    fn test_fixed_unreachable_layout() {
        let grid = Grid::default();
        let s = snake(&[1, 4, 1, 3, 1, 2, 1, 1]);
        let barriers = BarrierSet::from_flat(&[
            2, 7, 2, 6, 3, 7, 3, 6, 4, 7, 4, 6, 5, 7, 5, 6, 1, 6, 6, 6, 7, 6, 8, 6,
        ])
        .unwrap();
        assert!(!all_reachable(&grid, &s, &[Coord::new(1, 7)], &barriers));
    }
}
