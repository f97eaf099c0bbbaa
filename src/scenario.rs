// Scenario generation
//
// Builds random snake / food / barrier layouts that are guaranteed reachable
// (filtered through the oracle) or guaranteed unreachable (head walled in).
// Every sampling loop is bounded.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

use crate::config::GeneratorConfig;
use crate::grid::Grid;
use crate::oracle;
use crate::types::{BarrierSet, Coord, Direction, FoodSet, Reachability, Scenario, Snake, SNAKE_LEN};

/// Derives the seed for item `index` of a run started from `base`.
///
/// The sum is taken in 128 bits and truncated, so large indices wrap instead
/// of overflowing.
pub fn derive_seed(base: u64, index: u64) -> u64 {
    ((base as u128 + index as u128) & u64::MAX as u128) as u64
}

/// Seedable RNG that remembers its seed for logging
pub struct SeededRng {
    rng: StdRng,
    seed: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in [min, max]
    pub fn int_in(&mut self, min: i32, max: i32) -> i32 {
        self.rng.random_range(min..=max)
    }

    /// Uniform index in [0, len)
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Lays out a straight 4-segment snake with its head drawn from `head_range`
/// on both axes and a random orientation.
///
/// Candidates leaving the board or touching `occupied` are resampled, at most
/// `attempts` times.
pub fn place_straight_snake(
    grid: &Grid,
    rng: &mut SeededRng,
    head_range: (i32, i32),
    occupied: &HashSet<Coord>,
    attempts: usize,
) -> Option<Snake> {
    let (low, high) = head_range;
    let orientations = Direction::all();

    for _ in 0..attempts {
        let head = Coord::new(rng.int_in(low, high), rng.int_in(low, high));
        let facing = orientations[rng.index(orientations.len())];
        let step = facing.apply(&Coord::new(0, 0));

        let mut body = [head; SNAKE_LEN];
        for (k, seg) in body.iter_mut().enumerate().skip(1) {
            let k = k as i32;
            *seg = Coord::new(head.x - step.x * k, head.y - step.y * k);
        }

        if body
            .iter()
            .all(|c| grid.is_in_bounds(c) && !occupied.contains(c))
        {
            return Some(Snake::new(body));
        }
    }

    None
}

/// Produces scenarios for one board according to the generator limits
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    grid: Grid,
    config: GeneratorConfig,
}

impl ScenarioGenerator {
    pub fn new(grid: Grid, config: GeneratorConfig) -> Self {
        ScenarioGenerator { grid, config }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of barrier slots emitted; unreachable layouts need at least four
    fn slot_count(&self, reachability: Reachability) -> usize {
        match reachability {
            Reachability::Reachable => self.config.barrier_count,
            Reachability::Unreachable => self.config.barrier_count.max(4),
        }
    }

    /// Generates a full scenario with the requested reachability property
    pub fn generate(
        &self,
        rng: &mut SeededRng,
        reachability: Reachability,
    ) -> Result<Scenario, String> {
        let snake = self.generate_snake(rng)?;

        let mut reserved: HashSet<Coord> = snake.body.iter().copied().collect();
        if reachability == Reachability::Unreachable {
            // Keep food off the cells that will be walled
            reserved.extend(self.grid.neighbors(&snake.head()).map(|(_, c)| c));
        }

        let mut items = Vec::with_capacity(self.config.food_count);
        for _ in 0..self.config.food_count {
            let food = self.generate_food(rng, &reserved)?;
            reserved.insert(food);
            items.push(food);
        }
        let foods = FoodSet::new(items);

        let barriers = match reachability {
            Reachability::Reachable => self.reachable_barriers(rng, &snake, &foods),
            Reachability::Unreachable => self.unreachable_barriers(&snake),
        };

        debug!(
            "Generated {:?} scenario (seed {}): head {}, {} food, {} barriers",
            reachability,
            rng.seed(),
            snake.head(),
            foods.len(),
            barriers.active().count()
        );

        Ok(Scenario {
            snake,
            foods,
            barriers,
            reachability,
        })
    }

    /// Straight snake with its head inside the margin and a random orientation
    pub fn generate_snake(&self, rng: &mut SeededRng) -> Result<Snake, String> {
        let low = self.config.head_margin + 1;
        let high = self.grid.size() - self.config.head_margin;
        if low > high {
            return Err(format!(
                "Board of size {} leaves no room for a head with margin {}",
                self.grid.size(),
                self.config.head_margin
            ));
        }

        let attempts = self.config.snake_attempts;
        place_straight_snake(&self.grid, rng, (low, high), &HashSet::new(), attempts)
            .ok_or_else(|| {
                format!(
                    "No in-bounds snake found after {} attempts",
                    self.config.snake_attempts
                )
            })
    }

    /// Uniformly picks a free cell outside `reserved`
    pub fn generate_food(
        &self,
        rng: &mut SeededRng,
        reserved: &HashSet<Coord>,
    ) -> Result<Coord, String> {
        let free: Vec<Coord> = self.grid.cells().filter(|c| !reserved.contains(c)).collect();
        if free.is_empty() {
            return Err("No free cell left for food".to_string());
        }
        Ok(free[rng.index(free.len())])
    }

    /// Random barriers that keep every food reachable; all-sentinel fallback
    pub fn reachable_barriers(
        &self,
        rng: &mut SeededRng,
        snake: &Snake,
        foods: &FoodSet,
    ) -> BarrierSet {
        let slot_count = self.slot_count(Reachability::Reachable);

        for attempt in 0..self.config.layout_attempts {
            let barriers = self.sample_barriers(rng, snake, foods, slot_count);
            if oracle::all_reachable(&self.grid, snake, &foods.items, &barriers) {
                if attempt > 0 {
                    debug!("Reachable barrier layout found on attempt {}", attempt + 1);
                }
                return barriers;
            }
        }

        warn!(
            "No reachable barrier layout after {} attempts, falling back to an open board",
            self.config.layout_attempts
        );
        BarrierSet::empty(slot_count)
    }

    /// One candidate layout; a slot whose retries run out stays unused
    fn sample_barriers(
        &self,
        rng: &mut SeededRng,
        snake: &Snake,
        foods: &FoodSet,
        slot_count: usize,
    ) -> BarrierSet {
        let mut used: HashSet<Coord> =
            snake.body.iter().chain(foods.items.iter()).copied().collect();
        let mut barriers = BarrierSet::empty(slot_count);
        let size = self.grid.size();

        for slot in barriers.slots.iter_mut() {
            for _ in 0..self.config.barrier_placement_retries {
                let candidate = Coord::new(rng.int_in(1, size), rng.int_in(1, size));
                if used.insert(candidate) {
                    *slot = candidate;
                    break;
                }
            }
        }

        barriers
    }

    /// Walls in the head on all four sides; remaining slots are sentinels.
    ///
    /// The neck is one of the walled cells, so this layout intentionally
    /// overlaps the snake body there.
    pub fn unreachable_barriers(&self, snake: &Snake) -> BarrierSet {
        let mut barriers = BarrierSet::empty(self.slot_count(Reachability::Unreachable));
        let head = snake.head();
        for (slot, dir) in barriers.slots.iter_mut().zip(Direction::all()) {
            *slot = dir.apply(&head);
        }
        barriers
    }
}
