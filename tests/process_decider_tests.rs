// Integration tests for external decision processes
//
// Runs the validation suite against small shell scripts to check that a
// crashing process costs exactly one scenario.

#![cfg(unix)]

use snake_arena::config::Config;
use snake_arena::decider::ProcessDecider;
use snake_arena::grid::Grid;
use snake_arena::runner::MatchRunner;
use snake_arena::scenario::ScenarioGenerator;
use snake_arena::suite::{SuitePlan, ValidationSuite};
use snake_arena::trial_log::ScenarioLogger;

fn suite() -> ValidationSuite {
    let config = Config::default_hardcoded();
    let grid = Grid::new(config.board.size);
    ValidationSuite::new(
        ScenarioGenerator::new(grid, config.generator.clone()),
        MatchRunner::new(grid, config.match_rules.max_turns),
        ScenarioLogger::disabled(),
    )
}

#[test]
fn test_crashed_process_is_restarted_for_next_scenario() {
    let marker =
        std::env::temp_dir().join(format!("snake_arena_crash_once_{}", std::process::id()));
    std::fs::remove_file(&marker).ok();

    // First instance dies on its first request; later instances always answer "no path"
    let script = format!(
        r#"if [ ! -e "{marker}" ]; then touch "{marker}"; read line; exit 1; fi
           while read line; do echo -1; done"#,
        marker = marker.display()
    );
    let mut decider = ProcessDecider::spawn("sh", &["-c".to_string(), script]).unwrap();

    let plan = SuitePlan {
        include_fixed: false,
        reachable_cases: 0,
        unreachable_cases: 5,
        base_seed: 11,
    };
    let report = suite().run(&mut decider, &plan);

    assert_eq!(report.total, 5);
    assert_eq!(report.decider_errors, 1, "failures: {:?}", report.failures);
    assert_eq!(report.failures[0].index, 0);
    assert_eq!(report.outcome_counts["unreachable_confirmed"], 4);

    std::fs::remove_file(&marker).ok();
}

#[test]
fn test_process_answering_no_path_fails_reachable_cases_only() {
    let script = "while read line; do echo -1; done".to_string();
    let mut decider = ProcessDecider::spawn("sh", &["-c".to_string(), script]).unwrap();

    let plan = SuitePlan {
        include_fixed: true,
        reachable_cases: 0,
        unreachable_cases: 0,
        base_seed: 0,
    };
    let report = suite().run(&mut decider, &plan);

    assert_eq!(report.total, 3);
    assert_eq!(report.decider_errors, 0);
    assert_eq!(report.passed, 1, "only the enclosed fixed case expects no path");
    assert_eq!(report.outcome_counts["invalid_direction"], 2);
}
