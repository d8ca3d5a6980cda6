//! The B3/S23 update rule.

use crate::grid::Grid;
use life_core::EdgePolicy;

/// State of a cell in the next generation given its state and live-neighbor count
#[inline]
pub fn next_state(alive: bool, live_neighbors: u8) -> bool {
    if alive {
        live_neighbors == 2 || live_neighbors == 3
    } else {
        live_neighbors == 3
    }
}

/// Write the generation after `current` into `next`.
///
/// Every cell of `next` is overwritten and only `current` is read, so `next`
/// may hold anything beforehand. Both grids must have the same size.
pub fn step(current: &Grid, next: &mut Grid, policy: EdgePolicy) {
    assert_eq!(
        current.size(),
        next.size(),
        "read and write buffers must match"
    );

    for pos in current.positions() {
        let neighbors = current.count_live_neighbors(pos, policy);
        next.set(pos, next_state(current.get(pos), neighbors));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_core::CellPos;

    #[test]
    fn test_rule_table() {
        for n in 0..=8u8 {
            assert_eq!(next_state(true, n), n == 2 || n == 3, "alive with {}", n);
            assert_eq!(next_state(false, n), n == 3, "dead with {}", n);
        }
    }

    #[test]
    fn test_step_overwrites_stale_buffer() {
        let current = Grid::new(4);
        let mut next = Grid::from_cells(4, [CellPos::new(0, 0), CellPos::new(3, 3)]);

        step(&current, &mut next, EdgePolicy::Bounded);
        assert_eq!(next.population(), 0);
    }

    #[test]
    fn test_step_reads_only_current() {
        // Updated in place, (1, 2) would die before (2, 1) counts it
        // and the horizontal phase would never be born.
        let current = Grid::from_cells(
            5,
            [CellPos::new(1, 2), CellPos::new(2, 2), CellPos::new(3, 2)],
        );
        let mut next = Grid::new(5);

        step(&current, &mut next, EdgePolicy::Bounded);

        let expected = Grid::from_cells(
            5,
            [CellPos::new(2, 1), CellPos::new(2, 2), CellPos::new(2, 3)],
        );
        assert_eq!(next, expected);
    }

    #[test]
    #[should_panic(expected = "read and write buffers must match")]
    fn test_step_rejects_mismatched_buffers() {
        let current = Grid::new(3);
        let mut next = Grid::new(4);
        step(&current, &mut next, EdgePolicy::Bounded);
    }
}
