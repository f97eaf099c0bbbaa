// Standalone replay tool for JSONL scenario logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --all                      Replay every logged scenario
//   --indices <i1,i2>          Replay specific scenario indices (comma-separated)
//   --command <cmd>            Decision process to replay against (default: built-in BFS)
//   --verbose                  Show detailed output for each scenario
//   --config <path>            Path to Arena.toml (default: Arena.toml)

use std::env;
use std::process;

use snake_arena::baseline::BfsDecider;
use snake_arena::config::Config;
use snake_arena::decider::{DecisionFunction, ProcessDecider};
use snake_arena::grid::Grid;
use snake_arena::replay::ReplayEngine;
use snake_arena::runner::MatchRunner;

fn print_usage() {
    eprintln!("Snake Arena Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                   Replay all scenarios in the log");
    eprintln!("  --indices <I1,I2,...>   Replay specific scenarios (comma-separated)");
    eprintln!("  --command <cmd>         Decision process to test (default: built-in BFS)");
    eprintln!("  --verbose               Show detailed output for each scenario");
    eprintln!("  --config <path>         Path to Arena.toml (default: Arena.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  # Replay every failure logged by a validation run");
    eprintln!("  replay arena_scenarios.jsonl --all --command ./my_solver");
    eprintln!();
    eprintln!("  # Replay specific scenarios verbosely");
    eprintln!("  replay arena_scenarios.jsonl --indices 5,10,15 --verbose");
}

fn parse_indices(s: &str) -> Result<Vec<usize>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<usize>()
                .map_err(|e| format!("Invalid scenario index '{}': {}", t, e))
        })
        .collect()
}

enum Mode {
    All,
    Indices(Vec<usize>),
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) { 0 } else { 1 });
    }

    let log_file = &args[1];
    let mut config_path = "Arena.toml".to_string();
    let mut command: Option<String> = None;
    let mut verbose = false;
    let mut mode = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => {
                mode = Some(Mode::All);
            }
            "--indices" | "--config" | "--command" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("Error: {} requires an argument", args[i]);
                    process::exit(1);
                };
                match args[i].as_str() {
                    "--indices" => match parse_indices(value) {
                        Ok(indices) => mode = Some(Mode::Indices(indices)),
                        Err(e) => {
                            eprintln!("Error parsing indices: {}", e);
                            process::exit(1);
                        }
                    },
                    "--config" => config_path = value.clone(),
                    _ => command = Some(value.clone()),
                }
                i += 1;
            }
            "--verbose" => {
                verbose = true;
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(mode) = mode else {
        eprintln!("Error: Must specify --all or --indices");
        print_usage();
        process::exit(1);
    };

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", config_path);
    println!("Replay log file: {}", log_file);
    println!();

    let grid = Grid::new(config.board.size);
    let engine = ReplayEngine::new(MatchRunner::new(grid, config.match_rules.max_turns), verbose);

    let mut decider: Box<dyn DecisionFunction> = match &command {
        Some(cmd) => match ProcessDecider::from_command_line(cmd) {
            Ok(decider) => Box::new(decider),
            Err(e) => {
                eprintln!("Error starting decision process: {}", e);
                process::exit(1);
            }
        },
        None => Box::new(BfsDecider::new(grid)),
    };

    let records = match engine.load_log_file(log_file) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error loading log file: {}", e);
            process::exit(1);
        }
    };

    if records.is_empty() {
        eprintln!("Error: Log file is empty");
        process::exit(1);
    }

    println!("Loaded {} scenario records\n", records.len());

    let results = match mode {
        Mode::All => {
            println!("Replaying all {} scenarios against {}...\n", records.len(), decider.name());
            engine.replay_all(&mut decider, &records)
        }
        Mode::Indices(indices) => {
            println!(
                "Replaying {} specific scenario(s) against {}...\n",
                indices.len(),
                decider.name()
            );
            match engine.replay_indices(&mut decider, &records, &indices) {
                Ok(results) => results,
                Err(e) => {
                    eprintln!("Error during replay: {}", e);
                    process::exit(1);
                }
            }
        }
    };

    engine.print_report(&results);
}
