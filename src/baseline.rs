// Reference decision functions
//
// Simple strategies used by the CLI and the test suite as stand-ins for the
// real function under test. They are participants, not part of the arena.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::decider::DecisionFunction;
use crate::engine::{StepDecider, StepView};
use crate::grid::Grid;
use crate::oracle;
use crate::tournament::Participant;
use crate::types::{BarrierSet, Coord, Direction, Snake, SENTINEL};

/// Breadth-first search from `start` to the nearest cell in `targets`.
///
/// Returns the first direction of a shortest path, or `None` when no target
/// is reachable or `start` is already a target.
pub fn first_step(
    grid: &Grid,
    start: Coord,
    targets: &HashSet<Coord>,
    blocked: &HashSet<Coord>,
) -> Option<Direction> {
    let mut queue = VecDeque::new();
    let mut first: HashMap<Coord, Direction> = HashMap::new();
    let mut visited = HashSet::new();
    visited.insert(start);

    for (dir, next) in grid.neighbors(&start) {
        if !blocked.contains(&next) && visited.insert(next) {
            first.insert(next, dir);
            queue.push_back(next);
        }
    }

    while let Some(current) = queue.pop_front() {
        let dir = first[&current];
        if targets.contains(&current) {
            return Some(dir);
        }
        for (_, next) in grid.neighbors(&current) {
            if !blocked.contains(&next) && visited.insert(next) {
                first.insert(next, dir);
                queue.push_back(next);
            }
        }
    }

    None
}

/// Single-snake BFS toward the nearest food; answers -1 when none is reachable
pub struct BfsDecider {
    grid: Grid,
}

impl BfsDecider {
    pub fn new(grid: Grid) -> Self {
        BfsDecider { grid }
    }
}

impl DecisionFunction for BfsDecider {
    fn name(&self) -> &str {
        "bfs"
    }

    fn decide(&mut self, snake: &[i32], foods: &[i32], barriers: &[i32]) -> Result<i32, String> {
        let snake = Snake::from_flat(snake)?;
        let barriers = BarrierSet::from_flat(barriers)?;
        let targets: HashSet<Coord> = foods
            .chunks_exact(2)
            .map(|pair| Coord::new(pair[0], pair[1]))
            .collect();

        let blocked = oracle::obstacles(&snake, &barriers);
        Ok(first_step(&self.grid, snake.head(), &targets, &blocked)
            .map(|dir| dir.code())
            .unwrap_or(SENTINEL))
    }
}

/// Coordinates of all live segments in a flattened multi-snake list
fn live_cells(flat: &[i32]) -> impl Iterator<Item = Coord> + '_ {
    flat.chunks_exact(2)
        .map(|pair| Coord::new(pair[0], pair[1]))
        .filter(|c| !c.is_sentinel())
}

/// Cells a head may move into this round without certain death
fn safe_moves(grid: &Grid, head: Coord, blocked: &HashSet<Coord>) -> Vec<Direction> {
    grid.neighbors(&head)
        .filter(|(_, next)| !blocked.contains(next))
        .map(|(dir, _)| dir)
        .collect()
}

fn blocked_cells(view: &StepView<'_>) -> HashSet<Coord> {
    // Own tail moves away this round
    let own: Vec<Coord> = live_cells(view.own).collect();
    let keep = own.len().saturating_sub(1);
    own.into_iter()
        .take(keep)
        .chain(live_cells(view.others))
        .collect()
}

/// Multi-snake: shortest path to the nearest food, any safe move otherwise
pub struct GreedyStepper;

impl StepDecider for GreedyStepper {
    fn name(&self) -> &str {
        "greedy"
    }

    fn step(&mut self, view: &StepView<'_>) -> Result<i32, String> {
        let grid = Grid::new(view.board_size);
        let head = live_cells(view.own)
            .next()
            .ok_or_else(|| "Asked to move a snake with no body".to_string())?;
        let blocked = blocked_cells(view);
        let targets: HashSet<Coord> = live_cells(view.foods).collect();

        if let Some(dir) = first_step(&grid, head, &targets, &blocked) {
            return Ok(dir.code());
        }
        Ok(safe_moves(&grid, head, &blocked)
            .first()
            .map(|dir| dir.code())
            .unwrap_or(Direction::Up.code()))
    }
}

/// Multi-snake: uniformly random safe move from a seeded stream
pub struct WanderStepper {
    rng: StdRng,
}

impl WanderStepper {
    pub fn new(seed: u64) -> Self {
        WanderStepper {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl StepDecider for WanderStepper {
    fn name(&self) -> &str {
        "wander"
    }

    fn step(&mut self, view: &StepView<'_>) -> Result<i32, String> {
        let grid = Grid::new(view.board_size);
        let head = live_cells(view.own)
            .next()
            .ok_or_else(|| "Asked to move a snake with no body".to_string())?;
        let options = safe_moves(&grid, head, &blocked_cells(view));
        if options.is_empty() {
            return Ok(Direction::Up.code());
        }
        Ok(options[self.rng.random_range(0..options.len())].code())
    }
}

/// Alternating greedy and wandering participants, `count` in total
pub fn baseline_roster(count: usize) -> Vec<Participant> {
    (0..count)
        .map(|i| {
            if i % 2 == 0 {
                Participant::new(format!("greedy-{}", i + 1), || {
                    Box::new(GreedyStepper) as Box<dyn StepDecider>
                })
            } else {
                let seed = i as u64;
                Participant::new(format!("wander-{}", i + 1), move || {
                    Box::new(WanderStepper::new(seed)) as Box<dyn StepDecider>
                })
            }
        })
        .collect()
}
