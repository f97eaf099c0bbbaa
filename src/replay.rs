// Replay of logged scenarios
//
// Reads a JSONL scenario log, runs a decision function over the recorded
// scenarios again and compares the new outcome with the logged one. Used to
// confirm fixes against past failures without regenerating whole suites.

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::decider::DecisionFunction;
use crate::runner::MatchRunner;
use crate::trial_log::ScenarioRecord;
use crate::types::{Reachability, ScenarioOutcome};

/// Result of replaying a single record.
///
/// An outcome of `None` means the decision function faulted on that run.
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub index: usize,
    pub reachability: Reachability,
    pub original_outcome: Option<ScenarioOutcome>,
    pub replayed_outcome: Option<ScenarioOutcome>,
    pub replay_error: Option<String>,
    pub matches: bool,
    pub passed: bool,
    pub invocations: u32,
    pub computation_time_ms: u128,
}

/// Outcome or fault, for reports
fn describe(outcome: Option<ScenarioOutcome>) -> String {
    match outcome {
        Some(outcome) => outcome.to_string(),
        None => "decider error".to_string(),
    }
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub passed: usize,
    pub match_rate: f64,
}

/// Replay engine for scenario logs
pub struct ReplayEngine {
    runner: MatchRunner,
    verbose: bool,
}

impl ReplayEngine {
    pub fn new(runner: MatchRunner, verbose: bool) -> Self {
        ReplayEngine { runner, verbose }
    }

    /// Loads all records from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(
        &self,
        log_path: P,
    ) -> Result<Vec<ScenarioRecord>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let record: ScenarioRecord = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            records.push(record);
        }

        info!("Loaded {} scenario records", records.len());
        Ok(records)
    }

    /// Runs `decider` on one recorded scenario and compares outcomes.
    ///
    /// A fault during replay is part of the result; it matches a record that
    /// was logged as a fault.
    pub fn replay_record<D: DecisionFunction + ?Sized>(
        &self,
        decider: &mut D,
        record: &ScenarioRecord,
    ) -> ReplayResult {
        let started = Instant::now();
        let run = self.runner.run(decider, &record.scenario);
        let computation_time = started.elapsed().as_millis();

        let (replayed_outcome, invocations, replay_error) = match run {
            Ok(result) => (Some(result.outcome), result.invocations, None),
            Err(e) => (None, 0, Some(e)),
        };
        let reachability = record.scenario.reachability;
        let replay = ReplayResult {
            index: record.index,
            reachability,
            original_outcome: record.outcome,
            replayed_outcome,
            replay_error,
            matches: record.outcome == replayed_outcome,
            passed: replayed_outcome.is_some_and(|o| o.is_pass(reachability)),
            invocations,
            computation_time_ms: computation_time,
        };

        if let Some(e) = &replay.replay_error {
            warn!("Scenario #{}: decision function faulted: {}", record.index, e);
        }

        if self.verbose {
            if replay.matches {
                info!(
                    "Scenario #{}: ✓ MATCH - {} ({} calls, {}ms)",
                    record.index,
                    describe(replay.replayed_outcome),
                    replay.invocations,
                    computation_time
                );
            } else {
                warn!(
                    "Scenario #{}: ✗ MISMATCH - Original: {}, Replayed: {} ({} calls, {}ms)",
                    record.index,
                    describe(replay.original_outcome),
                    describe(replay.replayed_outcome),
                    replay.invocations,
                    computation_time
                );
            }
        }

        replay
    }

    /// Replays every record
    pub fn replay_all<D: DecisionFunction + ?Sized>(
        &self,
        decider: &mut D,
        records: &[ScenarioRecord],
    ) -> Vec<ReplayResult> {
        records
            .iter()
            .map(|record| self.replay_record(decider, record))
            .collect()
    }

    /// Replays the records with the given scenario indices
    pub fn replay_indices<D: DecisionFunction + ?Sized>(
        &self,
        decider: &mut D,
        records: &[ScenarioRecord],
        indices: &[usize],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for index in indices {
            let record = records
                .iter()
                .find(|r| r.index == *index)
                .ok_or_else(|| format!("Scenario #{} not found in log file", index))?;

            results.push(self.replay_record(decider, record));
        }

        Ok(results)
    }

    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let passed = results.iter().filter(|r| r.passed).count();
        let match_rate = if total > 0 {
            (matches as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total,
            matches,
            mismatches: total - matches,
            passed,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Scenarios: {}", stats.total);
        println!("Matches:         {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:      {}", stats.mismatches);
        println!("Passing now:     {}", stats.passed);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_ms as f64)
                .sum::<f64>()
                / results.len() as f64;
            let avg_calls: f64 =
                results.iter().map(|r| r.invocations as f64).sum::<f64>() / results.len() as f64;

            println!("Average Invocations:        {:.1}", avg_calls);
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Scenario #{} ({:?}): {} → {} ({} calls, {}ms)",
                    result.index,
                    result.reachability,
                    describe(result.original_outcome),
                    describe(result.replayed_outcome),
                    result.invocations,
                    result.computation_time_ms
                );
            }
            println!();
        }
    }
}
