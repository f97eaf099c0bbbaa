// Validation suite
//
// Judges one decision function over the fixed legacy cases and over two
// randomized batches (reachable, then unreachable). Each random scenario has
// its own derived seed so any failure can be regenerated in isolation.

use log::{error, info, warn};
use std::collections::BTreeMap;

use crate::decider::DecisionFunction;
use crate::runner::MatchRunner;
use crate::scenario::{derive_seed, ScenarioGenerator, SeededRng};
use crate::trial_log::{ScenarioLogger, ScenarioRecord};
use crate::types::{Reachability, Scenario, ScenarioOutcome};

/// Offset separating the unreachable batch's seeds from the reachable batch's
const UNREACHABLE_SEED_OFFSET: u64 = 1 << 32;

/// The three hand-written scenarios of the legacy checker
pub fn fixed_cases() -> Vec<Scenario> {
    let cases: [(&[i32], &[i32], &[i32], Reachability); 3] = [
        (
            &[4, 4, 4, 3, 4, 2, 4, 1],
            &[4, 5],
            &[5, 4, 8, 8, 8, 7, 8, 6, 8, 5, 8, 4, 8, 3, 8, 2, 8, 1, 7, 8, 7, 7, 7, 6],
            Reachability::Reachable,
        ),
        (
            &[1, 4, 1, 3, 1, 2, 1, 1],
            &[5, 5],
            &[2, 7, 2, 6, 3, 7, 3, 6, 4, 6, 5, 6, 6, 6, 7, 6, 4, 5, 4, 4, 4, 3, 5, 4],
            Reachability::Reachable,
        ),
        (
            &[1, 4, 1, 3, 1, 2, 1, 1],
            &[1, 7],
            &[2, 7, 2, 6, 3, 7, 3, 6, 4, 7, 4, 6, 5, 7, 5, 6, 1, 6, 6, 6, 7, 6, 8, 6],
            Reachability::Unreachable,
        ),
    ];

    cases
        .iter()
        .enumerate()
        .filter_map(|(i, (snake, foods, barriers, reach))| {
            Scenario::from_flat(snake, foods, barriers, *reach)
                .map_err(|e| error!("Fixed case {} is malformed: {}", i, e))
                .ok()
        })
        .collect()
}

/// A scenario that did not pass
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteFailure {
    pub index: usize,
    pub seed: Option<u64>,
    pub reachability: Reachability,
    /// `None` when the decision function itself faulted
    pub outcome: Option<ScenarioOutcome>,
    pub detail: String,
}

/// Aggregated verdict of a suite run
#[derive(Debug, Default, Clone)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub decider_errors: usize,
    pub outcome_counts: BTreeMap<&'static str, usize>,
    pub failures: Vec<SuiteFailure>,
    pub total_success_turns: u64,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    fn record_outcome(
        &mut self,
        index: usize,
        seed: Option<u64>,
        reach: Reachability,
        outcome: ScenarioOutcome,
    ) {
        self.total += 1;
        *self.outcome_counts.entry(outcome.label()).or_insert(0) += 1;
        if let ScenarioOutcome::Success(turns) = outcome {
            self.total_success_turns += turns as u64;
        }
        if outcome.is_pass(reach) {
            self.passed += 1;
        } else {
            self.failed += 1;
            self.failures.push(SuiteFailure {
                index,
                seed,
                reachability: reach,
                outcome: Some(outcome),
                detail: format!("code {}", outcome.code()),
            });
        }
    }

    fn record_error(
        &mut self,
        index: usize,
        seed: Option<u64>,
        reach: Reachability,
        detail: String,
    ) {
        self.total += 1;
        self.failed += 1;
        self.decider_errors += 1;
        self.failures.push(SuiteFailure {
            index,
            seed,
            reachability: reach,
            outcome: None,
            detail,
        });
    }

    /// Prints a summary of the run
    pub fn print_report(&self, decider_name: &str) {
        println!("\n═══════════════════════════════════════════════════════════");
        println!("              VALIDATION REPORT: {}", decider_name);
        println!("═══════════════════════════════════════════════════════════");
        println!("Scenarios:      {}", self.total);
        println!("Passed:         {}", self.passed);
        println!("Failed:         {}", self.failed);
        println!("Decider errors: {}", self.decider_errors);
        println!("═══════════════════════════════════════════════════════════\n");

        for (label, count) in &self.outcome_counts {
            println!("  {:<24}{}", label, count);
        }

        let successes = self.outcome_counts.get("success").copied().unwrap_or(0);
        if successes > 0 {
            println!(
                "\nAverage turns to clear food: {:.2}",
                self.total_success_turns as f64 / successes as f64
            );
        }

        if !self.failures.is_empty() {
            println!("\n═══════════════════════════════════════════════════════════");
            println!("                      FAILURES");
            println!("═══════════════════════════════════════════════════════════");
            for failure in &self.failures {
                let seed = failure
                    .seed
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "fixed".to_string());
                match failure.outcome {
                    Some(outcome) => println!(
                        "#{} seed {} {:?}: {} ({})",
                        failure.index, seed, failure.reachability, outcome, failure.detail
                    ),
                    None => println!(
                        "#{} seed {} {:?}: decider error: {}",
                        failure.index, seed, failure.reachability, failure.detail
                    ),
                }
            }
        }
        println!();
    }
}

/// Batch sizes and seeding for one suite run
#[derive(Debug, Clone, Copy)]
pub struct SuitePlan {
    pub include_fixed: bool,
    pub reachable_cases: usize,
    pub unreachable_cases: usize,
    pub base_seed: u64,
}

pub struct ValidationSuite {
    generator: ScenarioGenerator,
    runner: MatchRunner,
    logger: ScenarioLogger,
}

impl ValidationSuite {
    pub fn new(generator: ScenarioGenerator, runner: MatchRunner, logger: ScenarioLogger) -> Self {
        ValidationSuite {
            generator,
            runner,
            logger,
        }
    }

    /// Runs the plan against `decider`; faults are recorded, never propagated
    pub fn run<D: DecisionFunction + ?Sized>(
        &self,
        decider: &mut D,
        plan: &SuitePlan,
    ) -> SuiteReport {
        let mut report = SuiteReport::default();
        let mut index = 0;

        if plan.include_fixed {
            for scenario in fixed_cases() {
                self.judge(decider, index, None, &scenario, &mut report);
                index += 1;
            }
        }

        let batches = [
            (Reachability::Reachable, plan.reachable_cases, plan.base_seed),
            (
                Reachability::Unreachable,
                plan.unreachable_cases,
                derive_seed(plan.base_seed, UNREACHABLE_SEED_OFFSET),
            ),
        ];

        for (reach, count, batch_seed) in batches {
            info!("Running {} {:?} scenarios against {}", count, reach, decider.name());
            for i in 0..count {
                let seed = derive_seed(batch_seed, i as u64);
                let mut rng = SeededRng::new(seed);
                match self.generator.generate(&mut rng, reach) {
                    Ok(scenario) => {
                        self.judge(decider, index, Some(seed), &scenario, &mut report)
                    }
                    Err(e) => {
                        error!("Scenario generation failed for seed {}: {}", seed, e);
                        let detail = format!("generation: {}", e);
                        report.record_error(index, Some(seed), reach, detail);
                    }
                }
                index += 1;
            }
        }

        info!(
            "{}: {}/{} scenarios passed",
            decider.name(),
            report.passed,
            report.total
        );
        report
    }

    fn judge<D: DecisionFunction + ?Sized>(
        &self,
        decider: &mut D,
        index: usize,
        seed: Option<u64>,
        scenario: &Scenario,
        report: &mut SuiteReport,
    ) {
        match self.runner.run(decider, scenario) {
            Ok(result) => {
                if !result.outcome.is_pass(scenario.reachability) {
                    warn!(
                        "Scenario #{} ({:?}) failed: {}",
                        index, scenario.reachability, result.outcome
                    );
                }
                report.record_outcome(index, seed, scenario.reachability, result.outcome);
                self.logger.log(&ScenarioRecord::new(
                    index,
                    seed,
                    scenario.clone(),
                    result.outcome,
                    result.invocations,
                ));
            }
            Err(e) => {
                error!(
                    "Decision function {} faulted on scenario #{}: {}",
                    decider.name(),
                    index,
                    e
                );
                self.logger
                    .log(&ScenarioRecord::faulted(index, seed, scenario.clone(), e.clone()));
                report.record_error(index, seed, scenario.reachability, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_cases_parse() {
        let cases = fixed_cases();
        assert_eq!(cases.len(), 3);
        assert_eq!(cases[2].reachability, Reachability::Unreachable);
        assert_eq!(cases[0].barriers.slots.len(), 12);
    }

    #[test]
    fn test_report_counts_failures() {
        let mut report = SuiteReport::default();
        report.record_outcome(0, None, Reachability::Reachable, ScenarioOutcome::Success(4));
        report.record_outcome(1, Some(5), Reachability::Reachable, ScenarioOutcome::HitBarrier);
        let confirmed = ScenarioOutcome::UnreachableConfirmed;
        report.record_outcome(2, Some(6), Reachability::Unreachable, confirmed);
        report.record_error(3, Some(7), Reachability::Reachable, "boom".to_string());

        assert_eq!(report.total, 4);
        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.decider_errors, 1);
        assert_eq!(report.outcome_counts["hit_barrier"], 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[1].outcome, None);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_faulted_scenarios_are_logged() {
        use crate::config::Config;
        use crate::decider::FnDecider;
        use crate::grid::Grid;
        use std::io::{BufRead, BufReader};

        let path = std::env::temp_dir()
            .join(format!("snake_arena_suite_faults_{}.jsonl", std::process::id()));
        let config = Config::default_hardcoded();
        let grid = Grid::new(config.board.size);
        let suite = ValidationSuite::new(
            ScenarioGenerator::new(grid, config.generator.clone()),
            MatchRunner::new(grid, config.match_rules.max_turns),
            ScenarioLogger::new(true, path.to_str().unwrap()),
        );
        let plan = SuitePlan {
            include_fixed: true,
            reachable_cases: 2,
            unreachable_cases: 2,
            base_seed: 5,
        };

        let mut decider =
            FnDecider::new("broken", |_: &[i32], _: &[i32], _: &[i32]| Err("crashed".to_string()));
        let report = suite.run(&mut decider, &plan);
        assert_eq!(report.failed, 7);

        let records: Vec<ScenarioRecord> = BufReader::new(std::fs::File::open(&path).unwrap())
            .lines()
            .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
            .collect();
        assert_eq!(records.len(), 7, "every faulted scenario is logged");
        assert!(records.iter().all(|r| r.outcome.is_none()));
        assert!(records.iter().all(|r| r.error.as_deref() == Some("crashed")));
        assert_eq!(records[3].seed, Some(5));

        std::fs::remove_file(&path).ok();
    }
}
