// Tournament aggregation
//
// Plays many seeded multi-snake games, ranks the participants of each game
// and folds the rankings into a `TournamentStats` value. A trial only touches
// the statistics once it has fully completed; a faulted trial is logged and
// skipped.

use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::config::GameMode;
use crate::engine::{FinalResults, GameEngine, StepDecider};
use crate::scenario::derive_seed;

/// Builds a fresh decision function for every trial
pub type StepperFactory = Arc<dyn Fn() -> Box<dyn StepDecider> + Send + Sync>;

/// A named competitor
#[derive(Clone)]
pub struct Participant {
    pub name: String,
    factory: StepperFactory,
}

impl Participant {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn StepDecider> + Send + Sync + 'static,
    {
        Participant {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn instantiate(&self) -> Box<dyn StepDecider> {
        (self.factory)()
    }
}

/// One participant's result in one trial
#[derive(Debug, Clone, PartialEq)]
pub struct TrialEntry {
    pub score: u32,
    pub time: f64,
    pub alive: bool,
    pub dead_round: Option<u32>,
}

/// Result of one completed trial
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    pub trial: u64,
    pub seed: u64,
    pub entries: Vec<TrialEntry>,
}

impl TrialRecord {
    pub fn from_results(trial: u64, seed: u64, results: &FinalResults) -> Self {
        let entries = (0..results.scores.len())
            .map(|i| TrialEntry {
                score: results.scores[i],
                time: results.time.get(i).copied().unwrap_or(0.0),
                alive: results.alive.get(i).copied().unwrap_or(false),
                dead_round: results.dead_round.get(i).copied().flatten(),
            })
            .collect();
        TrialRecord {
            trial,
            seed,
            entries,
        }
    }

    /// Participant indices best first: higher score, then less time, then index
    pub fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| {
            let (ea, eb) = (&self.entries[a], &self.entries[b]);
            eb.score
                .cmp(&ea.score)
                .then_with(|| ea.time.partial_cmp(&eb.time).unwrap_or(Ordering::Equal))
        });
        order
    }
}

/// Accumulated results for one participant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantStats {
    pub name: String,
    pub wins: u64,
    pub runner_ups: u64,
    pub total_score: u64,
    pub total_time: f64,
    pub points: u64,
    pub survivals: u64,
    pub trials: u64,
}

impl ParticipantStats {
    pub fn average_score(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.total_score as f64 / self.trials as f64
        }
    }

    pub fn average_time(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.total_time / self.trials as f64
        }
    }
}

/// Aggregate over any number of trials
#[derive(Debug, Clone, PartialEq)]
pub struct TournamentStats {
    pub participants: Vec<ParticipantStats>,
}

impl TournamentStats {
    pub fn new(names: &[String]) -> Self {
        TournamentStats {
            participants: names
                .iter()
                .map(|name| ParticipantStats {
                    name: name.clone(),
                    ..ParticipantStats::default()
                })
                .collect(),
        }
    }

    /// Folds one completed trial in.
    ///
    /// Rank 0 wins, rank 1 is runner-up, and each rank earns
    /// `participants - rank` points.
    pub fn record(&mut self, record: &TrialRecord) {
        let count = self.participants.len();
        for (rank, &idx) in record.ranking().iter().enumerate() {
            let Some(stats) = self.participants.get_mut(idx) else {
                continue;
            };
            let entry = &record.entries[idx];
            stats.trials += 1;
            stats.total_score += entry.score as u64;
            stats.total_time += entry.time;
            stats.points += (count - rank) as u64;
            if entry.alive {
                stats.survivals += 1;
            }
            match rank {
                0 => stats.wins += 1,
                1 => stats.runner_ups += 1,
                _ => {}
            }
        }
    }

    /// Combines statistics gathered independently over the same roster
    pub fn merge(&mut self, other: &TournamentStats) {
        for (mine, theirs) in self.participants.iter_mut().zip(other.participants.iter()) {
            mine.wins += theirs.wins;
            mine.runner_ups += theirs.runner_ups;
            mine.total_score += theirs.total_score;
            mine.total_time += theirs.total_time;
            mine.points += theirs.points;
            mine.survivals += theirs.survivals;
            mine.trials += theirs.trials;
        }
    }

    /// Participant indices for display: most wins first, then most points.
    /// Stable, so full ties keep roster order.
    pub fn standings(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.participants.len()).collect();
        order.sort_by(|&a, &b| {
            let (pa, pb) = (&self.participants[a], &self.participants[b]);
            pb.wins.cmp(&pa.wins).then_with(|| pb.points.cmp(&pa.points))
        });
        order
    }
}

/// Everything a tournament run produced
#[derive(Debug, Clone)]
pub struct TournamentSummary {
    pub mode: GameMode,
    pub base_seed: u64,
    pub stats: TournamentStats,
    pub completed: u64,
    pub aborted: Vec<(u64, String)>,
}

impl TournamentSummary {
    /// Prints the final table
    pub fn print_report(&self) {
        let total = self.completed.max(1) as f64;

        println!("\n═══════════════════════════════════════════════════════════");
        println!("          TOURNAMENT SUMMARY ({} mode)", self.mode.as_str());
        println!("═══════════════════════════════════════════════════════════");
        println!("Base seed:      0x{:016x}", self.base_seed);
        println!("Completed:      {}", self.completed);
        println!("Aborted:        {}", self.aborted.len());
        println!("═══════════════════════════════════════════════════════════\n");

        for idx in self.stats.standings() {
            let p = &self.stats.participants[idx];
            println!(
                "Snake {} ({}): {} wins, {} runner-up, {} points (avg score: {:.2}, avg time: {:.3}, survived: {:.1}%)",
                idx + 1,
                p.name,
                p.wins,
                p.runner_ups,
                p.points,
                p.average_score(),
                p.average_time(),
                p.survivals as f64 / total * 100.0
            );
        }

        if !self.aborted.is_empty() {
            println!("\nAborted trials:");
            for (trial, reason) in &self.aborted {
                println!("  trial {}: {}", trial, reason);
            }
        }
        println!();
    }
}

/// Drives repeated games through an engine
pub struct Tournament<'a, E: GameEngine> {
    engine: &'a E,
    mode: GameMode,
    roster: Vec<Participant>,
}

impl<'a, E: GameEngine> Tournament<'a, E> {
    pub fn new(engine: &'a E, mode: GameMode, roster: Vec<Participant>) -> Self {
        Tournament {
            engine,
            mode,
            roster,
        }
    }

    fn names(&self) -> Vec<String> {
        self.roster.iter().map(|p| p.name.clone()).collect()
    }

    /// Plays one trial to completion
    pub fn run_trial(&self, trial: u64, seed: u64) -> Result<TrialRecord, String> {
        let participants = self.roster.iter().map(Participant::instantiate).collect();
        let mut state = self.engine.initialize(self.mode, participants, seed)?;

        while !self.engine.is_over(&state) {
            let output = self.engine.process_turn(state)?;
            for warning in &output.messages.warnings {
                debug!("Trial {}: {}", trial, warning);
            }
            for problem in &output.messages.errors {
                warn!("Trial {}: {}", trial, problem);
            }
            state = output.state;
        }

        let record = TrialRecord::from_results(trial, seed, &self.engine.final_results(&state));
        info!(
            "Trial {} (seed {}): scores {:?}, alive {:?}",
            trial,
            seed,
            record.entries.iter().map(|e| e.score).collect::<Vec<_>>(),
            record.entries.iter().map(|e| e.alive).collect::<Vec<_>>()
        );
        Ok(record)
    }

    /// Runs `trials` games one after another
    pub fn run(&self, trials: u64, base_seed: u64) -> TournamentSummary {
        info!(
            "Starting {} tournament: {} trials, {} participants",
            self.mode.as_str(),
            trials,
            self.roster.len()
        );
        let outcomes = (0..trials).map(|t| (t, self.run_trial(t, derive_seed(base_seed, t))));
        self.summarize(outcomes, base_seed)
    }

    fn summarize<I>(&self, outcomes: I, base_seed: u64) -> TournamentSummary
    where
        I: Iterator<Item = (u64, Result<TrialRecord, String>)>,
    {
        let mut summary = TournamentSummary {
            mode: self.mode,
            base_seed,
            stats: TournamentStats::new(&self.names()),
            completed: 0,
            aborted: Vec::new(),
        };

        for (trial, outcome) in outcomes {
            match outcome {
                Ok(record) => {
                    summary.stats.record(&record);
                    summary.completed += 1;
                }
                Err(e) => {
                    error!("Trial {} aborted: {}", trial, e);
                    summary.aborted.push((trial, e));
                }
            }
        }

        info!(
            "Tournament finished: {} completed, {} aborted",
            summary.completed,
            summary.aborted.len()
        );
        summary
    }
}

impl<'a, E: GameEngine + Sync> Tournament<'a, E> {
    /// Same as `run`, with trials spread over the rayon pool.
    ///
    /// Results are folded in trial order, so the tables match a sequential run.
    pub fn run_parallel(&self, trials: u64, base_seed: u64) -> TournamentSummary {
        info!(
            "Starting parallel {} tournament: {} trials on {} threads",
            self.mode.as_str(),
            trials,
            rayon::current_num_threads()
        );
        let outcomes: Vec<(u64, Result<TrialRecord, String>)> = (0..trials)
            .into_par_iter()
            .map(|t| (t, self.run_trial(t, derive_seed(base_seed, t))))
            .collect();
        self.summarize(outcomes.into_iter(), base_seed)
    }
}
