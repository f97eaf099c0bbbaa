// Match runner: drives the turn simulator for one scenario and one decision function

use log::debug;

use crate::decider::DecisionFunction;
use crate::grid::Grid;
use crate::simulator::apply_turn;
use crate::types::{Reachability, Scenario, ScenarioOutcome, SENTINEL};

/// Default turn budget per scenario
pub const DEFAULT_MAX_TURNS: u32 = 200;

/// Outcome of one match plus how often the decision function was called
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub outcome: ScenarioOutcome,
    pub invocations: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchRunner {
    grid: Grid,
    max_turns: u32,
}

impl MatchRunner {
    pub fn new(grid: Grid, max_turns: u32) -> Self {
        MatchRunner { grid, max_turns }
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Runs `scenario` to a terminal outcome.
    ///
    /// Unreachable scenarios get exactly one call, which must answer the
    /// "no path" sentinel. Reachable scenarios loop until every food is
    /// eaten, a rule is broken, or `max_turns` calls have been made.
    ///
    /// # Returns
    /// * `Err` only when the decision function itself fails
    pub fn run<D: DecisionFunction + ?Sized>(
        &self,
        decider: &mut D,
        scenario: &Scenario,
    ) -> Result<MatchResult, String> {
        let barriers_flat = scenario.barriers.flatten();

        if scenario.reachability == Reachability::Unreachable {
            let direction = decider.decide(
                &scenario.snake.flatten(),
                &scenario.foods.flatten(),
                &barriers_flat,
            )?;
            let outcome = if direction == SENTINEL {
                ScenarioOutcome::UnreachableConfirmed
            } else {
                ScenarioOutcome::UnreachableViolation
            };
            debug!(
                "{}: unreachable scenario answered {} -> {}",
                decider.name(),
                direction,
                outcome
            );
            return Ok(MatchResult {
                outcome,
                invocations: 1,
            });
        }

        let mut snake = scenario.snake;
        let mut foods = scenario.foods.clone();

        for turn in 1..=self.max_turns {
            let direction = decider.decide(&snake.flatten(), &foods.flatten(), &barriers_flat)?;
            let result = apply_turn(&self.grid, &snake, &foods, &scenario.barriers, direction);

            if let Some(outcome) = result.terminal {
                debug!("{}: turn {} direction {} -> {}", decider.name(), turn, direction, outcome);
                return Ok(MatchResult {
                    outcome,
                    invocations: turn,
                });
            }

            if result.consumed {
                debug!(
                    "{}: turn {} ate food at {}, {} left",
                    decider.name(),
                    turn,
                    result.snake.head(),
                    result.foods.len()
                );
            }

            if result.foods.is_empty() {
                debug!("{}: all food eaten in {} turns", decider.name(), turn);
                return Ok(MatchResult {
                    outcome: ScenarioOutcome::Success(turn),
                    invocations: turn,
                });
            }

            snake = result.snake;
            foods = result.foods;
        }

        debug!("{}: no completion within {} turns", decider.name(), self.max_turns);
        Ok(MatchResult {
            outcome: ScenarioOutcome::Timeout,
            invocations: self.max_turns,
        })
    }
}

impl Default for MatchRunner {
    fn default() -> Self {
        MatchRunner::new(Grid::default(), DEFAULT_MAX_TURNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decider::FnDecider;

    fn scenario(reachability: Reachability) -> Scenario {
        Scenario::from_flat(
            &[4, 4, 4, 3, 4, 2, 4, 1],
            &[4, 6],
            &[-1, -1, -1, -1],
            reachability,
        )
        .unwrap()
    }

    #[test]
    fn test_straight_line_success() {
        let mut up = FnDecider::new("up", |_: &[i32], _: &[i32], _: &[i32]| Ok(0));
        let result = MatchRunner::default()
            .run(&mut up, &scenario(Reachability::Reachable))
            .unwrap();
        assert_eq!(result.outcome, ScenarioOutcome::Success(2));
        assert_eq!(result.invocations, 2);
    }

    #[test]
    fn test_running_off_board() {
        let mut left = FnDecider::new("left", |_: &[i32], _: &[i32], _: &[i32]| Ok(1));
        let result = MatchRunner::default()
            .run(&mut left, &scenario(Reachability::Reachable))
            .unwrap();
        assert_eq!(result.outcome, ScenarioOutcome::OutOfBounds);
        assert_eq!(result.invocations, 4);
    }

    #[test]
    fn test_timeout_respects_budget() {
        let mut calls = 0u32;
        // Circle the 2x2 block at (4..5, 4..5) without touching (4,6)
        let cycle = [3, 0, 1, 2];
        let mut circler = FnDecider::new("circler", |_: &[i32], _: &[i32], _: &[i32]| {
            let dir = cycle[(calls % 4) as usize];
            calls += 1;
            Ok(dir)
        });
        let runner = MatchRunner::new(Grid::default(), 17);
        let result = runner.run(&mut circler, &scenario(Reachability::Reachable)).unwrap();
        assert_eq!(result.outcome, ScenarioOutcome::Timeout);
        assert_eq!(result.invocations, 17);
        drop(circler);
        assert_eq!(calls, 17);
    }

    #[test]
    fn test_unreachable_single_call() {
        let mut calls = 0;
        let mut honest = FnDecider::new("honest", |_: &[i32], _: &[i32], _: &[i32]| {
            calls += 1;
            Ok(-1)
        });
        let result = MatchRunner::default()
            .run(&mut honest, &scenario(Reachability::Unreachable))
            .unwrap();
        assert_eq!(result.outcome, ScenarioOutcome::UnreachableConfirmed);
        assert_eq!(result.invocations, 1);
        drop(honest);
        assert_eq!(calls, 1);

        let mut liar = FnDecider::new("liar", |_: &[i32], _: &[i32], _: &[i32]| Ok(0));
        let result = MatchRunner::default()
            .run(&mut liar, &scenario(Reachability::Unreachable))
            .unwrap();
        assert_eq!(result.outcome, ScenarioOutcome::UnreachableViolation);
    }

    #[test]
    fn test_decider_error_propagates() {
        let mut broken = FnDecider::new("broken", |_: &[i32], _: &[i32], _: &[i32]| {
            Err("module crashed".to_string())
        });
        let result = MatchRunner::default().run(&mut broken, &scenario(Reachability::Reachable));
        assert_eq!(result, Err("module crashed".to_string()));
    }
}
