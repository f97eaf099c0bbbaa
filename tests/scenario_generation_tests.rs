// Integration tests for scenario generation against the reachability oracle
//
// Sweeps many derived seeds and checks the properties every generated
// scenario must satisfy, then runs a small validation suite end to end.

use snake_arena::baseline::BfsDecider;
use snake_arena::config::Config;
use snake_arena::grid::Grid;
use snake_arena::oracle;
use snake_arena::runner::MatchRunner;
use snake_arena::scenario::{derive_seed, ScenarioGenerator, SeededRng};
use snake_arena::suite::{SuitePlan, ValidationSuite};
use snake_arena::trial_log::ScenarioLogger;
use snake_arena::types::{Reachability, ScenarioOutcome};

const SWEEP: u64 = 300;

fn generator() -> ScenarioGenerator {
    let config = Config::default_hardcoded();
    ScenarioGenerator::new(Grid::new(config.board.size), config.generator)
}

#[test]
fn test_reachable_scenarios_satisfy_oracle() {
    let gen = generator();
    for i in 0..SWEEP {
        let seed = derive_seed(1000, i);
        let s = gen
            .generate(&mut SeededRng::new(seed), Reachability::Reachable)
            .expect("generation succeeds on the default board");

        assert!(
            oracle::all_reachable(gen.grid(), &s.snake, &s.foods.items, &s.barriers),
            "seed {} produced an unreachable food",
            seed
        );
        assert_eq!(s.barriers.slots.len(), 12, "seed {}: barrier slot count", seed);
        for barrier in s.barriers.active() {
            assert!(!s.snake.contains(barrier), "seed {}: barrier on snake", seed);
            assert!(s.foods.position(barrier).is_none(), "seed {}: barrier on food", seed);
        }
    }
}

#[test]
fn test_unreachable_scenarios_wall_in_the_head() {
    let gen = generator();
    for i in 0..SWEEP {
        let seed = derive_seed(2000, i);
        let s = gen
            .generate(&mut SeededRng::new(seed), Reachability::Unreachable)
            .expect("generation succeeds on the default board");

        for (_, neighbor) in gen.grid().neighbors(&s.snake.head()) {
            assert!(
                s.barriers.contains(&neighbor),
                "seed {}: neighbor {} of head {} is open",
                seed,
                neighbor,
                s.snake.head()
            );
        }
        for food in &s.foods.items {
            let blocked = oracle::obstacles(&s.snake, &s.barriers);
            assert!(!oracle::is_reachable(gen.grid(), s.snake.head(), *food, &blocked));
        }
    }
}

#[test]
fn test_generated_entities_are_in_bounds_and_disjoint() {
    let gen = generator();
    for i in 0..SWEEP {
        let s = gen
            .generate(&mut SeededRng::new(derive_seed(3000, i)), Reachability::Reachable)
            .unwrap();
        for seg in s.snake.body.iter() {
            assert!(gen.grid().is_in_bounds(seg));
        }
        let head = s.snake.head();
        assert!(
            (3..=6).contains(&head.x) && (3..=6).contains(&head.y),
            "head {} outside margin",
            head
        );
        for food in &s.foods.items {
            assert!(gen.grid().is_in_bounds(food));
            assert!(!s.snake.contains(food));
        }
    }
}

#[test]
fn test_bfs_clears_generated_reachable_scenarios() {
    let gen = generator();
    let runner = MatchRunner::default();
    let mut decider = BfsDecider::new(*gen.grid());
    for i in 0..SWEEP {
        let s = gen
            .generate(&mut SeededRng::new(derive_seed(4000, i)), Reachability::Reachable)
            .unwrap();
        let result = runner.run(&mut decider, &s).unwrap();
        assert!(
            matches!(result.outcome, ScenarioOutcome::Success(_)),
            "scenario {} ended with {}",
            i,
            result.outcome
        );
    }
}

#[test]
fn test_small_suite_passes_with_bfs() {
    let config = Config::default_hardcoded();
    let grid = Grid::new(config.board.size);
    let suite = ValidationSuite::new(
        ScenarioGenerator::new(grid, config.generator.clone()),
        MatchRunner::new(grid, config.match_rules.max_turns),
        ScenarioLogger::disabled(),
    );
    let plan = SuitePlan {
        include_fixed: true,
        reachable_cases: 50,
        unreachable_cases: 50,
        base_seed: config.validation.base_seed,
    };

    let report = suite.run(&mut BfsDecider::new(grid), &plan);
    assert_eq!(report.total, 103);
    assert!(report.all_passed(), "failures: {:?}", report.failures);
    assert_eq!(report.outcome_counts["unreachable_confirmed"], 51);
}

#[test]
fn test_suite_records_decider_faults_and_continues() {
    let config = Config::default_hardcoded();
    let grid = Grid::new(config.board.size);
    let suite = ValidationSuite::new(
        ScenarioGenerator::new(grid, config.generator.clone()),
        MatchRunner::new(grid, config.match_rules.max_turns),
        ScenarioLogger::disabled(),
    );
    let plan = SuitePlan {
        include_fixed: false,
        reachable_cases: 5,
        unreachable_cases: 5,
        base_seed: 7,
    };

    let fault = |_: &[i32], _: &[i32], _: &[i32]| Err("segfault".to_string());
    let mut decider = snake_arena::decider::FnDecider::new("broken", fault);
    let report = suite.run(&mut decider, &plan);
    assert_eq!(report.total, 10);
    assert_eq!(report.decider_errors, 10);
    assert_eq!(report.passed, 0);
}
