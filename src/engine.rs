// Multi-snake game engine
//
// The tournament only talks to the `GameEngine` contract: initialize, process
// one turn, ask whether the game is over, read the final results. `ArenaEngine`
// is the built-in implementation: simultaneous moves, fixed-length snakes,
// one point per food eaten.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::config::{GameMode, ModeConfig, ModesConfig, TimingMode};
use crate::grid::Grid;
use crate::scenario::{place_straight_snake, SeededRng};
use crate::types::{flatten_coords, Coord, Direction, Snake, SENTINEL, SNAKE_LEN};

const PLACEMENT_ATTEMPTS: usize = 1000;

/// What one participant sees when asked for a move
#[derive(Debug, Clone, Copy)]
pub struct StepView<'a> {
    pub board_size: i32,
    /// Own body, 8 ints head first
    pub own: &'a [i32],
    pub snake_count: usize,
    /// Every other snake, 8 ints each; eliminated snakes are all -1
    pub others: &'a [i32],
    pub food_count: usize,
    pub foods: &'a [i32],
    /// 1-based round number
    pub round: u32,
}

/// A multi-snake decision function
pub trait StepDecider {
    fn name(&self) -> &str;

    /// Returns a direction code for this round
    fn step(&mut self, view: &StepView<'_>) -> Result<i32, String>;
}

/// Non-fatal notices produced while processing a turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnMessages {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug)]
pub struct TurnOutput<S> {
    pub state: S,
    pub messages: TurnMessages,
}

/// Per-participant results once a game is over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResults {
    pub scores: Vec<u32>,
    pub alive: Vec<bool>,
    pub dead_round: Vec<Option<u32>>,
    /// Compute time charged to each participant (ms or call units)
    pub time: Vec<f64>,
}

/// Opaque game state machine driven by the tournament
pub trait GameEngine {
    type State;

    fn initialize(
        &self,
        mode: GameMode,
        participants: Vec<Box<dyn StepDecider>>,
        seed: u64,
    ) -> Result<Self::State, String>;

    /// Advances one round. `Err` means a participant faulted and the game
    /// cannot continue.
    fn process_turn(&self, state: Self::State) -> Result<TurnOutput<Self::State>, String>;

    fn is_over(&self, state: &Self::State) -> bool;

    fn final_results(&self, state: &Self::State) -> FinalResults;
}

/// Per-snake bookkeeping inside an arena game
#[derive(Debug, Clone)]
struct SnakeSlot {
    body: Option<Snake>,
    score: u32,
    dead_round: Option<u32>,
    time: f64,
}

impl SnakeSlot {
    fn is_alive(&self) -> bool {
        self.body.is_some()
    }

    fn flatten(&self) -> Vec<i32> {
        match &self.body {
            Some(snake) => snake.flatten(),
            None => vec![SENTINEL; SNAKE_LEN * 2],
        }
    }
}

/// State of one arena game
pub struct ArenaState {
    mode: GameMode,
    rules: ModeConfig,
    grid: Grid,
    round: u32,
    slots: Vec<SnakeSlot>,
    foods: Vec<Coord>,
    participants: Vec<Box<dyn StepDecider>>,
    rng: SeededRng,
}

impl ArenaState {
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_alive()).count()
    }

    pub fn scores(&self) -> Vec<u32> {
        self.slots.iter().map(|s| s.score).collect()
    }

    pub fn foods(&self) -> &[Coord] {
        &self.foods
    }

    fn occupied(&self) -> HashSet<Coord> {
        self.slots
            .iter()
            .filter_map(|s| s.body.as_ref())
            .flat_map(|snake| snake.body.iter().copied())
            .chain(self.foods.iter().copied())
            .collect()
    }

    /// Tops the food up to the mode's count on free cells
    fn replenish_food(&mut self) {
        let occupied = self.occupied();
        let mut free: Vec<Coord> = self.grid.cells().filter(|c| !occupied.contains(c)).collect();
        while self.foods.len() < self.rules.food_count && !free.is_empty() {
            let pick = self.rng.index(free.len());
            self.foods.push(free.swap_remove(pick));
        }
    }
}

/// Built-in engine
pub struct ArenaEngine {
    modes: ModesConfig,
    timing: TimingMode,
}

impl ArenaEngine {
    pub fn new(modes: ModesConfig, timing: TimingMode) -> Self {
        ArenaEngine { modes, timing }
    }

    /// Asks every living snake for a move, charging compute time
    fn collect_moves(&self, state: &mut ArenaState) -> Result<Vec<Option<i32>>, String> {
        let round = state.round + 1;
        let flat: Vec<Vec<i32>> = state.slots.iter().map(SnakeSlot::flatten).collect();
        let foods = flatten_coords(&state.foods);
        let mut moves = vec![None; state.slots.len()];

        for i in 0..state.slots.len() {
            if !state.slots[i].is_alive() {
                continue;
            }

            let others: Vec<i32> = flat
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .flat_map(|(_, body)| body.iter().copied())
                .collect();
            let view = StepView {
                board_size: state.rules.board_size,
                own: &flat[i],
                snake_count: state.slots.len(),
                others: &others,
                food_count: state.foods.len(),
                foods: &foods,
                round,
            };

            let started = Instant::now();
            let participant = &mut state.participants[i];
            let code = participant.step(&view).map_err(|e| {
                format!(
                    "Snake {} ({}) failed in round {}: {}",
                    i + 1,
                    participant.name(),
                    round,
                    e
                )
            })?;

            state.slots[i].time += match self.timing {
                TimingMode::Measured => started.elapsed().as_secs_f64() * 1000.0,
                TimingMode::Counted => 1.0,
            };
            moves[i] = Some(code);
        }

        Ok(moves)
    }
}

impl GameEngine for ArenaEngine {
    type State = ArenaState;

    fn initialize(
        &self,
        mode: GameMode,
        participants: Vec<Box<dyn StepDecider>>,
        seed: u64,
    ) -> Result<ArenaState, String> {
        let rules = *self.modes.for_mode(mode);
        if participants.len() != rules.snake_count {
            return Err(format!(
                "Mode {} needs {} participants, got {}",
                mode.as_str(),
                rules.snake_count,
                participants.len()
            ));
        }

        let grid = Grid::new(rules.board_size);
        let mut rng = SeededRng::new(seed);
        let mut occupied = HashSet::new();
        let mut slots = Vec::with_capacity(rules.snake_count);

        for i in 0..rules.snake_count {
            let snake = place_straight_snake(
                &grid,
                &mut rng,
                (1, rules.board_size),
                &occupied,
                PLACEMENT_ATTEMPTS,
            )
            .ok_or_else(|| {
                format!(
                    "Could not place snake {} on a {}x{} board",
                    i + 1,
                    rules.board_size,
                    rules.board_size
                )
            })?;
            occupied.extend(snake.body.iter().copied());
            slots.push(SnakeSlot {
                body: Some(snake),
                score: 0,
                dead_round: None,
                time: 0.0,
            });
        }

        let mut state = ArenaState {
            mode,
            rules,
            grid,
            round: 0,
            slots,
            foods: Vec::with_capacity(rules.food_count),
            participants,
            rng,
        };
        state.replenish_food();

        debug!(
            "Initialized {} game (seed {}): {} snakes, {} food",
            mode.as_str(),
            seed,
            state.slots.len(),
            state.foods.len()
        );
        Ok(state)
    }

    fn process_turn(&self, mut state: ArenaState) -> Result<TurnOutput<ArenaState>, String> {
        let moves = self.collect_moves(&mut state)?;
        let round = state.round + 1;
        let mut messages = TurnMessages::default();

        // Bodies after movement; snakes without a valid move keep theirs
        let mut next: Vec<Option<Snake>> = Vec::with_capacity(state.slots.len());
        let mut dying: Vec<bool> = vec![false; state.slots.len()];

        for (i, slot) in state.slots.iter().enumerate() {
            let body = match &slot.body {
                Some(body) => body,
                None => {
                    next.push(None);
                    continue;
                }
            };
            let code = moves[i].unwrap_or(SENTINEL);
            match Direction::from_code(code) {
                Some(dir) => next.push(Some(body.advanced(dir.apply(&body.head())))),
                None => {
                    messages.warnings.push(format!(
                        "Snake {} returned invalid direction {} in round {}",
                        i + 1,
                        code,
                        round
                    ));
                    dying[i] = true;
                    next.push(Some(*body));
                }
            }
        }

        // Count how many bodies cover each cell, heads included
        let mut cover: HashMap<Coord, usize> = HashMap::new();
        for body in next.iter().flatten() {
            for seg in body.body.iter() {
                *cover.entry(*seg).or_insert(0) += 1;
            }
        }

        for (i, body) in next.iter().enumerate() {
            let body = match body {
                Some(body) if !dying[i] => body,
                _ => continue,
            };
            let head = body.head();
            if !state.grid.is_in_bounds(&head) {
                messages
                    .warnings
                    .push(format!("Snake {} left the board in round {}", i + 1, round));
                dying[i] = true;
            } else if cover.get(&head).copied().unwrap_or(0) > 1 {
                messages
                    .warnings
                    .push(format!("Snake {} collided at {} in round {}", i + 1, head, round));
                dying[i] = true;
            }
        }

        for (i, body) in next.into_iter().enumerate() {
            let body = match body {
                Some(body) => body,
                None => continue,
            };
            let slot = &mut state.slots[i];
            if dying[i] {
                slot.body = None;
                slot.dead_round = Some(round);
                continue;
            }
            if let Some(index) = state.foods.iter().position(|f| *f == body.head()) {
                state.foods.remove(index);
                slot.score += 1;
            }
            slot.body = Some(body);
        }

        state.replenish_food();
        state.round = round;

        Ok(TurnOutput { state, messages })
    }

    fn is_over(&self, state: &ArenaState) -> bool {
        state.round >= state.rules.max_rounds || state.alive_count() == 0
    }

    fn final_results(&self, state: &ArenaState) -> FinalResults {
        FinalResults {
            scores: state.slots.iter().map(|s| s.score).collect(),
            alive: state.slots.iter().map(|s| s.is_alive()).collect(),
            dead_round: state.slots.iter().map(|s| s.dead_round).collect(),
            time: state.slots.iter().map(|s| s.time).collect(),
        }
    }
}
