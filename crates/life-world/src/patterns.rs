//! A few well-known patterns, relative to their top-left corner.

use life_core::CellPos;

pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(usize, usize)],
}

impl Pattern {
    /// Cells of the pattern with its top-left corner at `origin`
    pub fn at(&self, origin: CellPos) -> impl Iterator<Item = CellPos> + '_ {
        self.cells
            .iter()
            .map(move |(r, c)| CellPos::new(origin.row + r, origin.col + c))
    }
}

/// Moves one cell down and one cell right every 4 generations
pub const GLIDER: Pattern = Pattern {
    name: "Glider",
    cells: &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
};

pub const BLOCK: Pattern = Pattern {
    name: "Block",
    cells: &[(0, 0), (0, 1), (1, 0), (1, 1)],
};

/// Period-2 oscillator, horizontal phase
pub const BLINKER: Pattern = Pattern {
    name: "Blinker",
    cells: &[(0, 0), (0, 1), (0, 2)],
};
