//! Double-buffered simulation state.

use crate::grid::Grid;
use crate::render::Renderer;
use crate::rules;
use life_core::{EdgePolicy, Result, SimulationConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

/// A Game of Life grid pair: `current` is read, `next` is written, then they swap.
pub struct Simulation {
    current: Grid,
    next: Grid,
    edge_policy: EdgePolicy,
    generation: u64,
    rng: ChaCha8Rng,
}

impl Simulation {
    /// Random initial grid sized from the configured canvas and cell size
    pub fn new(config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config.grid_size(), config.edge_policy, rng)
    }

    fn with_rng(size: usize, edge_policy: EdgePolicy, mut rng: ChaCha8Rng) -> Self {
        let current = Grid::initialize(size, true, &mut rng);
        let next = Grid::initialize(size, false, &mut rng);

        info!(
            grid_size = size,
            population = current.population(),
            ?edge_policy,
            "Simulation initialized"
        );

        Self {
            current,
            next,
            edge_policy,
            generation: 0,
            rng,
        }
    }

    /// Start from a given grid instead of a random fill
    pub fn from_grid(grid: Grid, edge_policy: EdgePolicy) -> Self {
        let next = Grid::new(grid.size());
        Self {
            current: grid,
            next,
            edge_policy,
            generation: 0,
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }

    /// Advance one generation
    pub fn step(&mut self) {
        rules::step(&self.current, &mut self.next, self.edge_policy);
        std::mem::swap(&mut self.current, &mut self.next);
        self.generation += 1;
    }

    /// Advance one generation and redraw
    #[instrument(skip(self, renderer), fields(generation = self.generation))]
    pub fn tick<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> Result<()> {
        self.step();
        renderer.draw(&self.current)?;

        if self.generation % 100 == 0 {
            debug!(
                generation = self.generation,
                population = self.current.population(),
                "Generation milestone"
            );
        }

        Ok(())
    }

    /// Throw the current state away and start over from a new random fill
    pub fn reset(&mut self) {
        let size = self.current.size();
        self.current = Grid::random(size, &mut self.rng);
        self.next.clear();
        self.generation = 0;

        info!(
            grid_size = size,
            population = self.current.population(),
            "Simulation reset"
        );
    }

    pub fn current(&self) -> &Grid {
        &self.current
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> usize {
        self.current.population()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{BLINKER, BLOCK, GLIDER};
    use life_core::CellPos;

    struct CountingRenderer {
        draws: usize,
        last_population: usize,
    }

    impl Renderer for CountingRenderer {
        fn draw(&mut self, grid: &Grid) -> Result<()> {
            self.draws += 1;
            self.last_population = grid.population();
            Ok(())
        }
    }

    fn bounded(size: usize, live: impl IntoIterator<Item = CellPos>) -> Simulation {
        Simulation::from_grid(Grid::from_cells(size, live), EdgePolicy::Bounded)
    }

    #[test]
    fn test_simulation_creation() {
        let config = SimulationConfig {
            seed: Some(42),
            ..Default::default()
        };
        let sim = Simulation::new(&config);
        assert_eq!(sim.current().size(), 40);
        assert_eq!(sim.generation(), 0);
        assert!(sim.population() > 0);
    }

    #[test]
    fn test_same_seed_same_history() {
        let config = SimulationConfig {
            seed: Some(9),
            ..Default::default()
        };
        let mut a = Simulation::new(&config);
        let mut b = Simulation::new(&config);
        for _ in 0..10 {
            a.step();
            b.step();
        }
        assert_eq!(a.current(), b.current());
    }

    #[test]
    fn test_all_dead_stays_dead() {
        let mut sim = bounded(8, []);
        sim.step();
        assert_eq!(sim.population(), 0);
        sim.step();
        assert_eq!(sim.population(), 0);
    }

    #[test]
    fn test_isolated_cell_dies() {
        let mut sim = bounded(5, [CellPos::new(2, 2)]);
        sim.step();
        assert_eq!(sim.population(), 0);
    }

    #[test]
    fn test_block_is_still_life() {
        let start = Grid::from_cells(6, BLOCK.at(CellPos::new(2, 2)));
        let mut sim = Simulation::from_grid(start.clone(), EdgePolicy::Bounded);

        sim.step();
        assert_eq!(sim.current(), &start);
        for pos in BLOCK.at(CellPos::new(2, 2)) {
            assert!(sim.current().get(pos));
        }
        for row in 1..=4 {
            for col in 1..=4 {
                let pos = CellPos::new(row, col);
                if !start.get(pos) {
                    assert!(!sim.current().get(pos), "neighbor {} came alive", pos);
                }
            }
        }
    }

    #[test]
    fn test_blinker_oscillates() {
        let start = Grid::from_cells(5, BLINKER.at(CellPos::new(2, 1)));
        let mut sim = Simulation::from_grid(start.clone(), EdgePolicy::Bounded);

        sim.step();
        let vertical = Grid::from_cells(
            5,
            [CellPos::new(1, 2), CellPos::new(2, 2), CellPos::new(3, 2)],
        );
        assert_eq!(sim.current(), &vertical);

        sim.step();
        assert_eq!(sim.current(), &start);
        assert_eq!(sim.generation(), 2);
    }

    #[test]
    fn test_two_steps_match_precomputed_generations() {
        let config = SimulationConfig {
            seed: Some(1234),
            canvas_width: 320,
            cell_size: 20,
            ..Default::default()
        };
        let mut sim = Simulation::new(&config);
        let start = sim.current().clone();

        let mut gen1 = Grid::new(start.size());
        rules::step(&start, &mut gen1, EdgePolicy::Bounded);
        let mut gen2 = Grid::new(start.size());
        rules::step(&gen1, &mut gen2, EdgePolicy::Bounded);

        sim.step();
        assert_eq!(sim.current(), &gen1);
        sim.step();
        assert_eq!(sim.current(), &gen2);
    }

    #[test]
    fn test_glider_translates_on_bounded_grid() {
        let size = 20;
        let mut sim = bounded(size, GLIDER.at(CellPos::new(2, 2)));

        for cycle in 1..=3 {
            for _ in 0..4 {
                sim.step();
            }
            let expected = Grid::from_cells(size, GLIDER.at(CellPos::new(2 + cycle, 2 + cycle)));
            assert_eq!(sim.current(), &expected, "{} after {} cycles", GLIDER.name, cycle);
        }
    }

    #[test]
    fn test_glider_does_not_wrap_on_bounded_grid() {
        let size = 8;
        let mut sim = bounded(size, GLIDER.at(CellPos::new(0, 0)));
        for _ in 0..40 {
            sim.step();
        }

        // The glider crashes into the corner and settles into a block
        let settled = Grid::from_cells(size, BLOCK.at(CellPos::new(6, 6)));
        assert_eq!(sim.current(), &settled);
    }

    #[test]
    fn test_glider_wraps_on_toroidal_grid() {
        let size = 8;
        let start = Grid::from_cells(size, GLIDER.at(CellPos::new(0, 0)));
        let mut sim = Simulation::from_grid(start.clone(), EdgePolicy::Toroidal);

        // 8 translations of (1, 1) bring it back to the start on an 8x8 torus
        for _ in 0..32 {
            sim.step();
        }
        assert_eq!(sim.current(), &start);
    }

    #[test]
    fn test_tick_steps_then_draws() {
        let mut sim = bounded(5, BLINKER.at(CellPos::new(2, 1)));
        let mut renderer = CountingRenderer {
            draws: 0,
            last_population: 0,
        };

        sim.tick(&mut renderer).unwrap();
        sim.tick(&mut renderer).unwrap();

        assert_eq!(renderer.draws, 2);
        assert_eq!(renderer.last_population, 3);
        assert_eq!(sim.generation(), 2);
    }

    #[test]
    fn test_reset_reseeds_grid() {
        let config = SimulationConfig {
            seed: Some(5),
            ..Default::default()
        };
        let mut sim = Simulation::new(&config);
        let initial = sim.current().clone();
        for _ in 0..3 {
            sim.step();
        }

        sim.reset();
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.current().size(), initial.size());
        assert_ne!(sim.current(), &initial);
    }
}
