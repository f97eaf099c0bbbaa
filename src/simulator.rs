// Turn simulator
//
// Applies one decision to the current state and returns the next state or a
// terminal classification. Inputs are never mutated; the next snake and food
// set are fresh values.

use crate::grid::Grid;
use crate::types::{BarrierSet, Direction, FoodSet, ScenarioOutcome, Snake};

/// Result of a single turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub snake: Snake,
    pub foods: FoodSet,
    pub consumed: bool,
    /// Set when the move ended the scenario
    pub terminal: Option<ScenarioOutcome>,
}

impl TurnResult {
    fn terminal(snake: Snake, foods: FoodSet, outcome: ScenarioOutcome) -> Self {
        TurnResult {
            snake,
            foods,
            consumed: false,
            terminal: Some(outcome),
        }
    }
}

/// Applies `direction_code` to the given state.
///
/// Rule order: invalid code, move, out of bounds, barrier, food.
pub fn apply_turn(
    grid: &Grid,
    snake: &Snake,
    foods: &FoodSet,
    barriers: &BarrierSet,
    direction_code: i32,
) -> TurnResult {
    let direction = match Direction::from_code(direction_code) {
        Some(dir) => dir,
        None => {
            return TurnResult::terminal(*snake, foods.clone(), ScenarioOutcome::InvalidDirection)
        }
    };

    let next = snake.advanced(direction.apply(&snake.head()));
    let head = next.head();

    if !grid.is_in_bounds(&head) {
        return TurnResult::terminal(next, foods.clone(), ScenarioOutcome::OutOfBounds);
    }

    if barriers.contains(&head) {
        return TurnResult::terminal(next, foods.clone(), ScenarioOutcome::HitBarrier);
    }

    match foods.position(&head) {
        Some(index) => TurnResult {
            snake: next,
            foods: foods.without(index),
            consumed: true,
            terminal: None,
        },
        None => TurnResult {
            snake: next,
            foods: foods.clone(),
            consumed: false,
            terminal: None,
        },
    }
}
