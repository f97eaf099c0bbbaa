// Configuration module for reading Arena.toml
// All tunables for scenario generation, match rules, validation batches and tournaments

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub board: BoardConfig,
    pub generator: GeneratorConfig,
    pub match_rules: MatchRulesConfig,
    pub validation: ValidationConfig,
    pub tournament: TournamentConfig,
    pub modes: ModesConfig,
    pub logging: LoggingConfig,
}

/// Playing field for single-snake scenarios
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BoardConfig {
    pub size: i32,
}

/// Scenario generation limits
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Barrier slots per scenario (flattened length is twice this)
    pub barrier_count: usize,
    /// Resamples per barrier slot before the slot is left unused
    pub barrier_placement_retries: usize,
    /// Whole-layout attempts before falling back to no barriers
    pub layout_attempts: usize,
    pub snake_attempts: usize,
    /// Head is drawn from [head_margin + 1, size - head_margin]
    pub head_margin: i32,
    pub food_count: usize,
}

/// Single-snake match rules
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MatchRulesConfig {
    pub max_turns: u32,
}

/// Randomized validation batches
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ValidationConfig {
    pub reachable_cases: usize,
    pub unreachable_cases: usize,
    pub base_seed: u64,
}

/// How participant compute time is charged in multi-snake games
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimingMode {
    /// Wall-clock milliseconds spent inside the decision function
    Measured,
    /// One unit per decision call; reproducible across runs
    Counted,
}

/// Built-in multi-snake game modes
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    OneVsOne,
    FourSnake,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::OneVsOne => "1v1",
            GameMode::FourSnake => "4-snake",
        }
    }
}

/// Tournament parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TournamentConfig {
    pub mode: GameMode,
    pub trials: u64,
    pub base_seed: u64,
    pub parallel: bool,
    pub timing: TimingMode,
}

/// Parameters for one multi-snake mode
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ModeConfig {
    pub board_size: i32,
    pub snake_count: usize,
    pub food_count: usize,
    pub max_rounds: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ModesConfig {
    pub one_vs_one: ModeConfig,
    pub four_snake: ModeConfig,
}

impl ModesConfig {
    pub fn for_mode(&self, mode: GameMode) -> &ModeConfig {
        match mode {
            GameMode::OneVsOne => &self.one_vs_one,
            GameMode::FourSnake => &self.four_snake,
        }
    }
}

/// JSONL scenario log
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Arena.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Arena.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Arena.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the values in Arena.toml
    pub fn default_hardcoded() -> Self {
        Config {
            board: BoardConfig { size: 8 },
            generator: GeneratorConfig {
                barrier_count: 12,
                barrier_placement_retries: 20,
                layout_attempts: 1000,
                snake_attempts: 1000,
                head_margin: 2,
                food_count: 1,
            },
            match_rules: MatchRulesConfig { max_turns: 200 },
            validation: ValidationConfig {
                reachable_cases: 20000,
                unreachable_cases: 20000,
                base_seed: 0x5EED_0001,
            },
            tournament: TournamentConfig {
                mode: GameMode::FourSnake,
                trials: 10000,
                base_seed: 0x5EED_0002,
                parallel: false,
                timing: TimingMode::Measured,
            },
            modes: ModesConfig {
                one_vs_one: ModeConfig {
                    board_size: 5,
                    snake_count: 2,
                    food_count: 5,
                    max_rounds: 50,
                },
                four_snake: ModeConfig {
                    board_size: 8,
                    snake_count: 4,
                    food_count: 10,
                    max_rounds: 100,
                },
            },
            logging: LoggingConfig {
                enabled: false,
                log_file_path: "arena_scenarios.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Arena.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.board.size, 8);
        assert_eq!(config.generator.barrier_count, 12);
        assert_eq!(config.match_rules.max_turns, 200);
    }

    #[test]
    fn test_arena_toml_can_be_parsed() {
        let result = Config::from_file("Arena.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Arena.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Arena.toml").expect("Arena.toml should be parseable");
        let hardcoded = Config::default_hardcoded();

        assert_eq!(file_config.board, hardcoded.board, "[board] differs");
        assert_eq!(file_config.generator, hardcoded.generator, "[generator] differs");
        assert_eq!(file_config.match_rules, hardcoded.match_rules, "[match_rules] differs");
        assert_eq!(file_config.validation, hardcoded.validation, "[validation] differs");
        assert_eq!(file_config.tournament, hardcoded.tournament, "[tournament] differs");
        assert_eq!(file_config.modes, hardcoded.modes, "[modes] differs");
        assert_eq!(file_config.logging, hardcoded.logging, "[logging] differs");
        assert_eq!(file_config, hardcoded);
    }

    #[test]
    fn test_mode_lookup() {
        let config = Config::default_hardcoded();
        assert_eq!(config.modes.for_mode(GameMode::OneVsOne).snake_count, 2);
        assert_eq!(config.modes.for_mode(GameMode::FourSnake).board_size, 8);
    }

    #[test]
    fn test_missing_file_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
