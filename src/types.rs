// Arena data model
// Coordinates are 1-based on both axes. Everything that crosses the decision
// function boundary is flattened to plain `i32` pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of segments in every snake body
pub const SNAKE_LEN: usize = 4;

/// Sentinel meaning "unused barrier slot" (as a coordinate) or "no path" (as a direction)
pub const SENTINEL: i32 = -1;

/// 2D coordinate on the board
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const UNUSED: Coord = Coord {
        x: SENTINEL,
        y: SENTINEL,
    };

    pub fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    pub fn is_sentinel(&self) -> bool {
        self.x == SENTINEL && self.y == SENTINEL
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// The four movement directions, encoded 0..=3 on the wire
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    /// Returns all directions in code order
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Left, Direction::Down, Direction::Right]
    }

    /// Decodes a wire value; anything outside 0..=3 is rejected
    pub fn from_code(code: i32) -> Option<Direction> {
        match code {
            0 => Some(Direction::Up),
            1 => Some(Direction::Left),
            2 => Some(Direction::Down),
            3 => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Direction::Up => 0,
            Direction::Left => 1,
            Direction::Down => 2,
            Direction::Right => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Left => "left",
            Direction::Down => "down",
            Direction::Right => "right",
        }
    }

    /// Calculates the next coordinate when moving in this direction
    pub fn apply(&self, coord: &Coord) -> Coord {
        match self {
            Direction::Up => Coord { x: coord.x, y: coord.y + 1 },
            Direction::Down => Coord { x: coord.x, y: coord.y - 1 },
            Direction::Left => Coord { x: coord.x - 1, y: coord.y },
            Direction::Right => Coord { x: coord.x + 1, y: coord.y },
        }
    }
}

/// Four-segment snake, head first
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Snake {
    pub body: [Coord; SNAKE_LEN],
}

impl Snake {
    pub fn new(body: [Coord; SNAKE_LEN]) -> Self {
        Snake { body }
    }

    /// Builds a snake from 8 flattened integers
    pub fn from_flat(flat: &[i32]) -> Result<Self, String> {
        if flat.len() != SNAKE_LEN * 2 {
            return Err(format!(
                "Invalid snake length: expected {} numbers, got {}",
                SNAKE_LEN * 2,
                flat.len()
            ));
        }
        let mut body = [Coord::UNUSED; SNAKE_LEN];
        for (i, seg) in body.iter_mut().enumerate() {
            *seg = Coord::new(flat[2 * i], flat[2 * i + 1]);
        }
        Ok(Snake { body })
    }

    pub fn head(&self) -> Coord {
        self.body[0]
    }

    pub fn tail(&self) -> Coord {
        self.body[SNAKE_LEN - 1]
    }

    /// Segments strictly between head and tail
    pub fn interior(&self) -> &[Coord] {
        &self.body[1..SNAKE_LEN - 1]
    }

    pub fn contains(&self, coord: &Coord) -> bool {
        self.body.contains(coord)
    }

    /// Returns a new snake advanced one cell to `new_head`; the old tail is dropped
    pub fn advanced(&self, new_head: Coord) -> Snake {
        let mut body = [new_head; SNAKE_LEN];
        body[1..].copy_from_slice(&self.body[..SNAKE_LEN - 1]);
        Snake { body }
    }

    pub fn flatten(&self) -> Vec<i32> {
        flatten_coords(&self.body)
    }
}

/// Ordered food items; removal is positional and keeps the remaining order
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FoodSet {
    pub items: Vec<Coord>,
}

impl FoodSet {
    pub fn new(items: Vec<Coord>) -> Self {
        FoodSet { items }
    }

    pub fn from_flat(flat: &[i32]) -> Result<Self, String> {
        Ok(FoodSet {
            items: parse_pairs(flat, "food")?,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, coord: &Coord) -> Option<usize> {
        self.items.iter().position(|c| c == coord)
    }

    /// Returns a copy without the item at `index`
    pub fn without(&self, index: usize) -> FoodSet {
        let mut items = self.items.clone();
        items.remove(index);
        FoodSet { items }
    }

    pub fn flatten(&self) -> Vec<i32> {
        flatten_coords(&self.items)
    }
}

/// Fixed-size barrier slots; unused slots hold the (-1, -1) sentinel
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BarrierSet {
    pub slots: Vec<Coord>,
}

impl BarrierSet {
    /// All slots unused
    pub fn empty(slot_count: usize) -> Self {
        BarrierSet {
            slots: vec![Coord::UNUSED; slot_count],
        }
    }

    pub fn from_flat(flat: &[i32]) -> Result<Self, String> {
        Ok(BarrierSet {
            slots: parse_pairs(flat, "barrier")?,
        })
    }

    /// Iterates the occupied slots only
    pub fn active(&self) -> impl Iterator<Item = &Coord> + '_ {
        self.slots.iter().filter(|c| !c.is_sentinel())
    }

    pub fn contains(&self, coord: &Coord) -> bool {
        !coord.is_sentinel() && self.slots.contains(coord)
    }

    pub fn flatten(&self) -> Vec<i32> {
        flatten_coords(&self.slots)
    }
}

/// Whether the food in a scenario is meant to be reachable from the head
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

impl Reachability {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Reachability::Reachable)
    }
}

/// One complete initial configuration plus its reachability intent
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub snake: Snake,
    pub foods: FoodSet,
    pub barriers: BarrierSet,
    pub reachability: Reachability,
}

impl Scenario {
    /// Builds a scenario from the flattened wire layout
    pub fn from_flat(
        snake: &[i32],
        foods: &[i32],
        barriers: &[i32],
        reachability: Reachability,
    ) -> Result<Self, String> {
        Ok(Scenario {
            snake: Snake::from_flat(snake)?,
            foods: FoodSet::from_flat(foods)?,
            barriers: BarrierSet::from_flat(barriers)?,
            reachability,
        })
    }
}

/// Terminal result of one scenario
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioOutcome {
    Success(u32),
    OutOfBounds,
    HitBarrier,
    Timeout,
    InvalidDirection,
    UnreachableConfirmed,
    UnreachableViolation,
}

impl ScenarioOutcome {
    /// Numeric result as reported by the legacy checker
    pub fn code(&self) -> i32 {
        match self {
            ScenarioOutcome::Success(turns) => *turns as i32,
            ScenarioOutcome::OutOfBounds => -1,
            ScenarioOutcome::HitBarrier => -2,
            ScenarioOutcome::Timeout => -3,
            ScenarioOutcome::InvalidDirection => -4,
            ScenarioOutcome::UnreachableViolation => -5,
            ScenarioOutcome::UnreachableConfirmed => 1,
        }
    }

    /// A reachable scenario passes on success, an unreachable one on confirmation
    pub fn is_pass(&self, reachability: Reachability) -> bool {
        match reachability {
            Reachability::Reachable => matches!(self, ScenarioOutcome::Success(_)),
            Reachability::Unreachable => matches!(self, ScenarioOutcome::UnreachableConfirmed),
        }
    }

    /// Stable label used for tallies and reports
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioOutcome::Success(_) => "success",
            ScenarioOutcome::OutOfBounds => "out_of_bounds",
            ScenarioOutcome::HitBarrier => "hit_barrier",
            ScenarioOutcome::Timeout => "timeout",
            ScenarioOutcome::InvalidDirection => "invalid_direction",
            ScenarioOutcome::UnreachableConfirmed => "unreachable_confirmed",
            ScenarioOutcome::UnreachableViolation => "unreachable_violation",
        }
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioOutcome::Success(turns) => write!(f, "success in {} turns", turns),
            other => f.write_str(other.label()),
        }
    }
}

pub fn flatten_coords(coords: &[Coord]) -> Vec<i32> {
    coords.iter().flat_map(|c| [c.x, c.y]).collect()
}

fn parse_pairs(flat: &[i32], what: &str) -> Result<Vec<Coord>, String> {
    if flat.len() % 2 != 0 {
        return Err(format!(
            "Invalid {} list: odd number of values ({})",
            what,
            flat.len()
        ));
    }
    Ok(flat
        .chunks_exact(2)
        .map(|pair| Coord::new(pair[0], pair[1]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_codes_round_trip_and_reject_others() {
        for dir in Direction::all() {
            assert_eq!(Direction::from_code(dir.code()), Some(dir));
        }
        assert_eq!(Direction::from_code(4), None);
        assert_eq!(Direction::from_code(-1), None);
    }

    #[test]
    fn test_directions_are_distinct_unit_vectors() {
        let origin = Coord::new(4, 4);
        assert_eq!(Direction::Up.apply(&origin), Coord::new(4, 5));
        assert_eq!(Direction::Down.apply(&origin), Coord::new(4, 3));
        assert_eq!(Direction::Left.apply(&origin), Coord::new(3, 4));
        assert_eq!(Direction::Right.apply(&origin), Coord::new(5, 4));
    }

    #[test]
    fn test_snake_advance_drops_tail() {
        let snake = Snake::from_flat(&[4, 4, 4, 3, 4, 2, 4, 1]).unwrap();
        let moved = snake.advanced(Coord::new(4, 5));
        assert_eq!(moved.flatten(), vec![4, 5, 4, 4, 4, 3, 4, 2]);
        // Original untouched
        assert_eq!(snake.head(), Coord::new(4, 4));
        assert_eq!(snake.interior(), &[Coord::new(4, 3), Coord::new(4, 2)]);
    }

    #[test]
    fn test_snake_from_flat_rejects_wrong_length() {
        assert!(Snake::from_flat(&[1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_food_removal_keeps_order() {
        let foods = FoodSet::from_flat(&[1, 1, 2, 2, 3, 3]).unwrap();
        let remaining = foods.without(1);
        assert_eq!(remaining.flatten(), vec![1, 1, 3, 3]);
        assert_eq!(foods.len(), 3);
    }

    #[test]
    fn test_barrier_sentinels_are_ignored() {
        let barriers = BarrierSet::from_flat(&[2, 2, -1, -1, 3, 3]).unwrap();
        assert_eq!(barriers.active().count(), 2);
        assert!(barriers.contains(&Coord::new(3, 3)));
        assert!(!barriers.contains(&Coord::UNUSED));
        assert!(BarrierSet::from_flat(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_outcome_codes_match_legacy_checker() {
        assert_eq!(ScenarioOutcome::Success(7).code(), 7);
        assert_eq!(ScenarioOutcome::OutOfBounds.code(), -1);
        assert_eq!(ScenarioOutcome::HitBarrier.code(), -2);
        assert_eq!(ScenarioOutcome::Timeout.code(), -3);
        assert_eq!(ScenarioOutcome::InvalidDirection.code(), -4);
        assert_eq!(ScenarioOutcome::UnreachableViolation.code(), -5);
        assert_eq!(ScenarioOutcome::UnreachableConfirmed.code(), 1);
    }

    #[test]
    fn test_outcome_pass_depends_on_intent() {
        assert!(ScenarioOutcome::Success(3).is_pass(Reachability::Reachable));
        assert!(!ScenarioOutcome::Success(3).is_pass(Reachability::Unreachable));
        assert!(ScenarioOutcome::UnreachableConfirmed.is_pass(Reachability::Unreachable));
        assert!(!ScenarioOutcome::Timeout.is_pass(Reachability::Reachable));
    }
}
