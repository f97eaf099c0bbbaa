// Snake arena command line
//
// Usage:
//   snake-arena validate [--command <cmd>] [--config <path>]
//   snake-arena tournament [--config <path>] [--trials N] [--seed S]

use log::{error, info};
use std::env;
use std::process;

use snake_arena::baseline::{baseline_roster, BfsDecider};
use snake_arena::config::Config;
use snake_arena::decider::{DecisionFunction, ProcessDecider};
use snake_arena::engine::ArenaEngine;
use snake_arena::grid::Grid;
use snake_arena::runner::MatchRunner;
use snake_arena::scenario::ScenarioGenerator;
use snake_arena::suite::{SuitePlan, ValidationSuite};
use snake_arena::tournament::Tournament;
use snake_arena::trial_log::ScenarioLogger;

fn print_usage() {
    eprintln!("Snake Arena");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  snake-arena validate [OPTIONS]");
    eprintln!("  snake-arena tournament [OPTIONS]");
    eprintln!();
    eprintln!("VALIDATE OPTIONS:");
    eprintln!("  --command <cmd>         Decision process to test (default: built-in BFS)");
    eprintln!();
    eprintln!("TOURNAMENT OPTIONS:");
    eprintln!("  --trials <N>            Number of trials (default: from config)");
    eprintln!("  --seed <S>              Base seed (default: from config)");
    eprintln!();
    eprintln!("COMMON OPTIONS:");
    eprintln!("  --config <path>         Path to Arena.toml (default: Arena.toml)");
    eprintln!("  --help                  Show this help message");
}

/// Options shared by both subcommands
struct Options {
    config_path: Option<String>,
    command: Option<String>,
    trials: Option<u64>,
    seed: Option<u64>,
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        config_path: None,
        command: None,
        trials: None,
        seed: None,
    };

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = || {
            args.get(i + 1)
                .cloned()
                .ok_or_else(|| format!("{} requires an argument", flag))
        };
        match flag {
            "--config" => options.config_path = Some(value()?),
            "--command" => options.command = Some(value()?),
            "--trials" => {
                let raw = value()?;
                options.trials = Some(
                    raw.parse()
                        .map_err(|e| format!("Invalid trial count '{}': {}", raw, e))?,
                );
            }
            "--seed" => {
                let raw = value()?;
                options.seed = Some(
                    raw.parse()
                        .map_err(|e| format!("Invalid seed '{}': {}", raw, e))?,
                );
            }
            other => return Err(format!("Unknown option '{}'", other)),
        }
        i += 2;
    }

    Ok(options)
}

fn load_config(path: &Option<String>) -> Config {
    match path {
        Some(path) => Config::from_file(path).unwrap_or_else(|e| {
            eprintln!("Warning: Could not load config from '{}': {}", path, e);
            eprintln!("Using default configuration");
            Config::default_hardcoded()
        }),
        None => Config::load_or_default(),
    }
}

fn run_validation(config: &Config, options: &Options) -> Result<bool, String> {
    let grid = Grid::new(config.board.size);
    let generator = ScenarioGenerator::new(grid, config.generator.clone());
    let runner = MatchRunner::new(grid, config.match_rules.max_turns);
    let logger = ScenarioLogger::new(config.logging.enabled, &config.logging.log_file_path);
    let suite = ValidationSuite::new(generator, runner, logger);

    let mut decider: Box<dyn DecisionFunction> = match &options.command {
        Some(command) => Box::new(ProcessDecider::from_command_line(command)?),
        None => Box::new(BfsDecider::new(grid)),
    };

    let plan = SuitePlan {
        include_fixed: true,
        reachable_cases: config.validation.reachable_cases,
        unreachable_cases: config.validation.unreachable_cases,
        base_seed: config.validation.base_seed,
    };

    let report = suite.run(&mut decider, &plan);
    report.print_report(decider.name());
    Ok(report.all_passed())
}

fn run_tournament(config: &Config, options: &Options) {
    let settings = &config.tournament;
    let trials = options.trials.unwrap_or(settings.trials);
    let seed = options.seed.unwrap_or(settings.base_seed);
    let snake_count = config.modes.for_mode(settings.mode).snake_count;

    let engine = ArenaEngine::new(config.modes.clone(), settings.timing);
    let tournament = Tournament::new(&engine, settings.mode, baseline_roster(snake_count));

    let summary = if settings.parallel {
        tournament.run_parallel(trials, seed)
    } else {
        tournament.run(trials, seed)
    };
    summary.print_report();
}

fn main() {
    // Default to 'info' level logging unless RUST_LOG says otherwise
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) { 0 } else { 1 });
    }

    let options = match parse_options(&args[2..]) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            process::exit(1);
        }
    };
    let config = load_config(&options.config_path);

    match args[1].as_str() {
        "validate" => match run_validation(&config, &options) {
            Ok(true) => info!("Validation passed"),
            Ok(false) => {
                error!("Validation failed");
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        "tournament" => run_tournament(&config, &options),
        other => {
            eprintln!("Error: Unknown command '{}'", other);
            print_usage();
            process::exit(1);
        }
    }
}
