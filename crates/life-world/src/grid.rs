//! Square boolean grid.

use life_core::{CellPos, EdgePolicy, NEIGHBOR_OFFSETS};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A dense N×N grid of live/dead cells, stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// All-dead grid
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![false; size * size],
        }
    }

    /// Each cell alive independently with probability 0.5
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let cells = (0..size * size).map(|_| rng.gen::<f64>() > 0.5).collect();
        Self { size, cells }
    }

    /// Random fill when `random` is set, all dead otherwise
    pub fn initialize<R: Rng + ?Sized>(size: usize, random: bool, rng: &mut R) -> Self {
        if random {
            Self::random(size, rng)
        } else {
            Self::new(size)
        }
    }

    /// All-dead grid with the given cells set alive. Out-of-range cells are ignored.
    pub fn from_cells<I>(size: usize, live: I) -> Self
    where
        I: IntoIterator<Item = CellPos>,
    {
        let mut grid = Self::new(size);
        for pos in live {
            if pos.row < size && pos.col < size {
                grid.set(pos, true);
            }
        }
        grid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell state. Panics if `pos` is outside the grid.
    pub fn get(&self, pos: CellPos) -> bool {
        self.cells[self.pos_to_index(pos)]
    }

    pub fn set(&mut self, pos: CellPos, alive: bool) {
        let index = self.pos_to_index(pos);
        self.cells[index] = alive;
    }

    /// Mark every cell dead without reallocating
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Count the live cells among the distinct neighbors of `pos`.
    ///
    /// On a torus narrower than three cells several offsets wrap onto the
    /// same cell or onto `pos` itself; each distinct neighbor counts once and
    /// `pos` never counts.
    pub fn count_live_neighbors(&self, pos: CellPos, policy: EdgePolicy) -> u8 {
        let mut count = 0;
        let mut visited: [Option<CellPos>; 8] = [None; 8];

        for (i, (dr, dc)) in NEIGHBOR_OFFSETS.into_iter().enumerate() {
            let neighbor = match policy {
                EdgePolicy::Bounded => pos.offset(dr, dc, self.size),
                EdgePolicy::Toroidal => Some(pos.wrap(dr, dc, self.size)),
            };

            let Some(neighbor) = neighbor else { continue };
            if neighbor == pos || visited[..i].contains(&Some(neighbor)) {
                continue;
            }
            visited[i] = Some(neighbor);

            if self.get(neighbor) {
                count += 1;
            }
        }

        count
    }

    /// Number of live cells
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|alive| **alive).count()
    }

    fn pos_to_index(&self, pos: CellPos) -> usize {
        assert!(
            pos.row < self.size && pos.col < self.size,
            "cell {} outside {}x{} grid",
            pos,
            self.size,
            self.size
        );
        pos.row * self.size + pos.col
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> CellPos {
        CellPos::new(index / self.size, index % self.size)
    }

    /// Iterator over all positions, row by row
    pub fn positions(&self) -> impl Iterator<Item = CellPos> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_pos(i))
    }

    /// Iterator over live positions, row by row
    pub fn live_cells(&self) -> impl Iterator<Item = CellPos> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(move |(i, _)| self.index_to_pos(i))
    }
}
